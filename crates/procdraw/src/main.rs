use std::path::{Path, PathBuf};

use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing_subscriber::EnvFilter;

use procdraw::{BalancedState, Interpreter, LispError, Value};

#[derive(Parser)]
#[command(name = "procdraw", about = "procdraw: a small Lisp for live coding", version)]
struct Cli {
    /// File to execute
    file: Option<PathBuf>,

    /// Evaluate an expression
    #[arg(short, long)]
    eval: Option<String>,

    /// Right margin for printed results
    #[arg(short, long, env = "PROCDRAW_MARGIN", default_value_t = 80)]
    margin: usize,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let interpreter = Interpreter::new();
    register_host_fns(&interpreter, cli.margin);

    if let Some(expr) = &cli.eval {
        match interpreter.eval_str(expr) {
            Ok(val) => print_result(&interpreter, &val, cli.margin),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    if let Some(file) = &cli.file {
        if let Err(e) = run_file(&interpreter, file) {
            eprintln!("Error in {}: {e}", file.display());
            std::process::exit(1);
        }
        return;
    }

    repl(&interpreter, cli.margin);
}

/// Functions the command-line host adds on top of the built-ins.
fn register_host_fns(interpreter: &Interpreter, margin: usize) {
    interpreter.register_native_fn("print", move |ctx, args, _| {
        let parts: Vec<String> = args
            .iter()
            .map(|arg| ctx.pretty_print_to_string(&arg, margin))
            .collect();
        println!("{}", parts.join(" "));
        Value::Null
    });
}

fn run_file(interpreter: &Interpreter, path: &Path) -> Result<(), LispError> {
    let content = std::fs::read_to_string(path)?;
    for form in interpreter.read_many(&content)? {
        if form.is_eof() {
            tracing::warn!(path = %path.display(), "ignoring incomplete expression at end of file");
            break;
        }
        interpreter.eval_global(&form);
    }
    Ok(())
}

fn print_result(interpreter: &Interpreter, val: &Value, margin: usize) {
    if !val.is_null() {
        println!("{}", interpreter.pretty_print_to_string(val, margin));
    }
}

fn repl(interpreter: &Interpreter, margin: usize) {
    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("Error: failed to create line editor: {e}");
            std::process::exit(1);
        }
    };
    let history_path = dirs_path().join("history.txt");
    let _ = rl.load_history(&history_path);

    println!("procdraw v{}", env!("CARGO_PKG_VERSION"));
    println!("Type ,help for help, ,quit to exit\n");

    let mut buffer = String::new();

    loop {
        let prompt = if buffer.is_empty() { "procdraw> " } else { "      ... " };
        match rl.readline(prompt) {
            Ok(line) => {
                if buffer.is_empty() {
                    match line.trim() {
                        ",quit" | ",exit" | ",q" => break,
                        ",help" | ",h" => {
                            print_help();
                            continue;
                        }
                        ",env" => {
                            print_env(interpreter, margin);
                            continue;
                        }
                        _ => {}
                    }
                } else {
                    buffer.push('\n');
                }
                buffer.push_str(&line);

                if buffer.trim().is_empty() {
                    buffer.clear();
                    continue;
                }

                match interpreter.check_balanced(&buffer) {
                    BalancedState::NotClosed => continue,
                    BalancedState::TooManyClosingParens => {
                        eprintln!("Error: too many closing parentheses");
                        buffer.clear();
                        continue;
                    }
                    BalancedState::Balanced => {}
                }

                let forms = match interpreter.read_many(&buffer) {
                    Ok(forms) => forms,
                    Err(e) => {
                        eprintln!("Error: {e}");
                        buffer.clear();
                        continue;
                    }
                };
                let _ = rl.add_history_entry(buffer.trim());
                buffer.clear();
                for form in forms {
                    let val = interpreter.eval_global(&form);
                    print_result(interpreter, &val, margin);
                }
            }
            Err(ReadlineError::Interrupted) => {
                if !buffer.is_empty() {
                    buffer.clear();
                    println!("^C");
                    continue;
                }
                break;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Error: {e}");
                break;
            }
        }
    }

    let _ = std::fs::create_dir_all(dirs_path());
    let _ = rl.save_history(&history_path);
}

fn print_help() {
    println!("procdraw REPL Commands:");
    println!("  ,quit / ,q    Exit the REPL");
    println!("  ,help / ,h    Show this help");
    println!("  ,env          Show global bindings");
    println!();
    println!("Special Forms:");
    println!("  def, if, lambda, progn, quote, setq");
    println!();
    println!("Syntax:");
    println!("  'x is (quote x), $x is (sigval x), (a . b) is a pair");
}

fn print_env(interpreter: &Interpreter, margin: usize) {
    let mut bindings: Vec<(String, Value)> = interpreter
        .symbols()
        .symbols()
        .into_iter()
        .map(|sym| (sym.symbol_name().to_string(), sym.symbol_value()))
        .filter(|(_, val)| !val.is_null() && !matches!(val, Value::NativeFn(_)))
        .collect();
    bindings.sort_by(|a, b| a.0.cmp(&b.0));
    if bindings.is_empty() {
        println!("(no global bindings)");
        return;
    }
    for (name, val) in bindings {
        println!("  {name} = {}", interpreter.pretty_print_to_string(&val, margin));
    }
}

fn dirs_path() -> PathBuf {
    dirs_home().join(".procdraw")
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}
