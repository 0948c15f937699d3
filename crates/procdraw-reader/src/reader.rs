use procdraw_core::{LispError, Position, Result, SymbolTable, Value};

use crate::lexer::{tokenize, SpannedToken, Token};

/// Classification of partially typed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalancedState {
    Balanced,
    NotClosed,
    TooManyClosingParens,
}

struct Parser<'a> {
    symbols: &'a SymbolTable,
    tokens: Vec<SpannedToken>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(symbols: &'a SymbolTable, input: &str) -> Self {
        Parser {
            symbols,
            tokens: tokenize(input),
            pos: 0,
        }
    }

    fn peek(&self) -> &Token {
        // tokenize always ends the stream with a terminal token
        self.tokens
            .get(self.pos)
            .map(|t| &t.token)
            .unwrap_or(&Token::EndOfInput)
    }

    fn position(&self) -> Position {
        self.tokens
            .get(self.pos)
            .map(|t| t.position)
            .unwrap_or_default()
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn at_end(&self) -> bool {
        matches!(self.peek(), Token::EndOfInput)
    }

    fn parse_expr(&mut self) -> Result<Value> {
        let token = self.peek().clone();
        match token {
            Token::Dollar => self.parse_prefixed("sigval"),
            Token::SingleQuote => self.parse_prefixed("quote"),
            Token::LParen => self.parse_list(),
            // A stray close paren is skipped over and reads as nil
            Token::RParen => {
                self.advance();
                Ok(Value::Null)
            }
            Token::Dot => {
                self.advance();
                Ok(self.symbols.intern("."))
            }
            Token::Number(n) => {
                self.advance();
                Ok(Value::number(n))
            }
            Token::Symbol(name) => {
                self.advance();
                Ok(self.parse_symbol(&name))
            }
            Token::String(s) => {
                self.advance();
                Ok(Value::string(&s))
            }
            Token::NonClosedString => {
                let position = self.position();
                tracing::debug!(%position, "unterminated string literal");
                Err(LispError::reader("unterminated string literal", position))
            }
            Token::EndOfInput => Ok(Value::Eof),
        }
    }

    fn parse_symbol(&self, name: &str) -> Value {
        match name {
            "nil" => Value::Null,
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => self.symbols.intern(name),
        }
    }

    /// `'x` and `$x`: wrap the next expression as `(head x)`.
    fn parse_prefixed(&mut self, head: &str) -> Result<Value> {
        self.advance();
        let inner = self.parse_expr()?;
        if inner.is_eof() {
            return Ok(Value::Eof);
        }
        Ok(Value::list(vec![self.symbols.intern(head), inner]))
    }

    fn parse_list(&mut self) -> Result<Value> {
        self.advance(); // (
        let mut items = Vec::new();
        loop {
            match self.peek() {
                Token::EndOfInput => return Ok(Value::Eof),
                Token::RParen => {
                    self.advance();
                    return Ok(Value::list(items));
                }
                Token::Dot if !items.is_empty() => {
                    self.advance();
                    return self.parse_dotted_tail(items);
                }
                _ => {
                    let item = self.parse_expr()?;
                    if item.is_eof() {
                        return Ok(Value::Eof);
                    }
                    items.push(item);
                }
            }
        }
    }

    /// Finish `(a b . tail)` once the dot has been consumed.
    fn parse_dotted_tail(&mut self, items: Vec<Value>) -> Result<Value> {
        let tail = match self.peek() {
            Token::EndOfInput => return Ok(Value::Eof),
            Token::RParen => Value::Null,
            _ => self.parse_expr()?,
        };
        if tail.is_eof() {
            return Ok(Value::Eof);
        }
        // Anything between the tail and the close paren is read and dropped
        loop {
            match self.peek() {
                Token::EndOfInput => return Ok(Value::Eof),
                Token::RParen => {
                    self.advance();
                    break;
                }
                _ => {
                    let extra = self.parse_expr()?;
                    tracing::trace!(%extra, "discarding form after dotted tail");
                    if extra.is_eof() {
                        return Ok(Value::Eof);
                    }
                }
            }
        }
        Ok(items
            .into_iter()
            .rev()
            .fold(tail, |cdr, car| Value::cons(car, cdr)))
    }
}

/// Read one expression from `input`, interning symbols into `symbols`.
///
/// Incomplete input (an unclosed list, empty input, a dangling `'`) gives
/// `Ok(Value::Eof)`. The only error is an unterminated string literal.
pub fn read(symbols: &SymbolTable, input: &str) -> Result<Value> {
    Parser::new(symbols, input).parse_expr()
}

/// Read every top-level expression in `input`.
///
/// Stops at the first incomplete expression, which is returned as a final
/// `Value::Eof`.
pub fn read_many(symbols: &SymbolTable, input: &str) -> Result<Vec<Value>> {
    let mut parser = Parser::new(symbols, input);
    let mut exprs = Vec::new();
    while !parser.at_end() {
        let expr = parser.parse_expr()?;
        let incomplete = expr.is_eof();
        exprs.push(expr);
        if incomplete {
            break;
        }
    }
    Ok(exprs)
}

/// Decide whether `input` is ready to be read, without building any values.
///
/// Over-closed input wins over everything else, so `") \"abc"` is
/// `TooManyClosingParens` even though its string never closes. A trailing
/// `'` or `$` still waits for its expression, so it is `NotClosed`.
pub fn check_balanced(input: &str) -> BalancedState {
    let mut depth: i64 = 0;
    // A `'` or `$` that has not yet been given its expression
    let mut sigil_pending = false;
    for tok in tokenize(input) {
        match tok.token {
            Token::SingleQuote | Token::Dollar => sigil_pending = true,
            // The reader takes `)` right after a sigil as a stray paren
            // reading as nil, so it closes nothing
            Token::RParen if sigil_pending => sigil_pending = false,
            Token::LParen => {
                sigil_pending = false;
                depth += 1;
            }
            Token::RParen => {
                depth -= 1;
                if depth < 0 {
                    return BalancedState::TooManyClosingParens;
                }
            }
            Token::NonClosedString => return BalancedState::NotClosed,
            Token::EndOfInput => {}
            _ => sigil_pending = false,
        }
    }
    if depth > 0 || sigil_pending {
        BalancedState::NotClosed
    } else {
        BalancedState::Balanced
    }
}
