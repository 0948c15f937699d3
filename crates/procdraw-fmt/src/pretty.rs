use procdraw_core::Value;

const LIST_INDENT: usize = 1;
const LAMBDA_INDENT: usize = 2;

// ---------------------------------------------------------------------------
// Token stream
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    /// Opens a block. `size` is the block's flat width, filled in once the
    /// block (and any text glued to its end) has been scanned.
    Begin { indent: usize, size: usize },
    End,
    Str(String),
    /// A space that may become a line break.
    Blank,
}

#[derive(Debug, Clone, Copy)]
enum Layout {
    Fits,
    /// The block is broken; blanks wrap to this column.
    Break(usize),
}

/// Oppen-style pretty-printer.
///
/// Scanning a value produces a token stream in which every block knows how
/// wide it would be if printed flat. The print pass then walks the stream
/// once, deciding per block whether it fits in the remaining line.
pub struct PrettyPrinter {
    margin: usize,
    stream: Vec<Token>,
    stream_len: usize,
    // (index of the Begin token, stream_len when it was emitted)
    blocks: Vec<(usize, usize)>,
    ended_since_blank: Vec<usize>,
    out: String,
    col: usize,
    layouts: Vec<Layout>,
}

impl PrettyPrinter {
    pub fn new(margin: usize) -> Self {
        PrettyPrinter {
            margin,
            stream: Vec::new(),
            stream_len: 0,
            blocks: Vec::new(),
            ended_since_blank: Vec::new(),
            out: String::new(),
            col: 0,
            layouts: Vec::new(),
        }
    }

    pub fn margin(&self) -> usize {
        self.margin
    }

    /// Render `obj`, breaking lines to stay within the margin where possible.
    pub fn print_to_string(mut self, obj: &Value) -> String {
        self.scan(obj);
        let stream = std::mem::take(&mut self.stream);
        for token in stream {
            self.print(token);
        }
        self.out
    }

    // -----------------------------------------------------------------------
    // Scan
    // -----------------------------------------------------------------------

    fn scan(&mut self, obj: &Value) {
        if !matches!(obj, Value::Cons(_)) {
            self.emit_str(obj.to_string());
            return;
        }
        if let Some(prefix) = obj.reader_prefix() {
            self.emit_str(prefix.to_string());
            self.scan(&obj.cadr());
            return;
        }
        let head = obj.car();
        if head.is_symbol_named("lambda") && matches!(obj.cdr(), Value::Cons(_)) {
            self.emit_begin(LAMBDA_INDENT);
            self.emit_str("(lambda ".to_string());
            self.scan(&obj.cadr());
            self.scan_tail(obj.cddr());
        } else {
            self.emit_begin(LIST_INDENT);
            self.emit_str("(".to_string());
            self.scan(&head);
            self.scan_tail(obj.cdr());
        }
        self.emit_str(")".to_string());
        self.emit_end();
    }

    /// The remaining elements of a list, each preceded by a blank.
    fn scan_tail(&mut self, mut rest: Value) {
        loop {
            match rest {
                Value::Null => return,
                Value::Cons(_) => {
                    self.emit_blank();
                    self.scan(&rest.car());
                    rest = rest.cdr();
                }
                tail => {
                    self.emit_str(" . ".to_string());
                    self.scan(&tail);
                    return;
                }
            }
        }
    }

    fn emit_begin(&mut self, indent: usize) {
        self.blocks.push((self.stream.len(), self.stream_len));
        self.stream.push(Token::Begin { indent, size: 0 });
    }

    fn emit_end(&mut self) {
        self.stream.push(Token::End);
        if let Some((index, start)) = self.blocks.pop() {
            if let Some(Token::Begin { size, .. }) = self.stream.get_mut(index) {
                *size = self.stream_len - start;
            }
            self.ended_since_blank.push(index);
        }
    }

    fn emit_str(&mut self, s: String) {
        let len = s.chars().count();
        self.stream_len += len;
        // Text glued to the end of a closed block counts towards its width
        for &index in &self.ended_since_blank {
            if let Some(Token::Begin { size, .. }) = self.stream.get_mut(index) {
                *size += len;
            }
        }
        self.stream.push(Token::Str(s));
    }

    fn emit_blank(&mut self) {
        self.stream_len += 1;
        self.ended_since_blank.clear();
        self.stream.push(Token::Blank);
    }

    // -----------------------------------------------------------------------
    // Print
    // -----------------------------------------------------------------------

    fn print(&mut self, token: Token) {
        match token {
            Token::Begin { indent, size } => {
                let layout = if size <= self.margin.saturating_sub(self.col) {
                    Layout::Fits
                } else {
                    Layout::Break(self.col + indent)
                };
                self.layouts.push(layout);
            }
            Token::End => {
                self.layouts.pop();
            }
            Token::Str(s) => {
                self.col += s.chars().count();
                self.out.push_str(&s);
            }
            Token::Blank => match self.layouts.last() {
                Some(Layout::Break(wrap_col)) => {
                    let wrap_col = *wrap_col;
                    self.out.push('\n');
                    self.out.extend(std::iter::repeat_n(' ', wrap_col));
                    self.col = wrap_col;
                }
                _ => {
                    self.out.push(' ');
                    self.col += 1;
                }
            },
        }
    }
}

/// Pretty-print `obj` within `margin` columns.
pub fn pretty_print(obj: &Value, margin: usize) -> String {
    PrettyPrinter::new(margin).print_to_string(obj)
}

/// Print `obj` on a single line.
pub fn print_flat(obj: &Value) -> String {
    pretty_print(obj, usize::MAX)
}
