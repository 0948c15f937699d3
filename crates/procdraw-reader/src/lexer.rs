use procdraw_core::Position;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `$`, sugar for `(sigval x)`
    Dollar,
    SingleQuote,
    LParen,
    RParen,
    Dot,
    Number(f64),
    Symbol(String),
    String(String),
    /// A string whose closing quote never arrived.
    NonClosedString,
    EndOfInput,
}

#[derive(Debug, Clone)]
pub struct SpannedToken {
    pub token: Token,
    pub position: Position,
}

fn is_delimiter(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '(' | ')' | '\'' | '"' | '$')
}

/// Single-character-lookahead tokenizer over one input string.
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            chars: input.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn at_digit(&self, offset: usize) -> bool {
        self.peek_at(offset).is_some_and(|c| c.is_ascii_digit())
    }

    pub fn next_token(&mut self) -> SpannedToken {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        let position = Position::new(self.line, self.col);
        let token = self.scan_token();
        SpannedToken { token, position }
    }

    fn scan_token(&mut self) -> Token {
        let Some(ch) = self.peek() else {
            return Token::EndOfInput;
        };
        match ch {
            '"' => self.scan_string(),
            '$' => {
                self.bump();
                Token::Dollar
            }
            '\'' => {
                self.bump();
                Token::SingleQuote
            }
            '(' => {
                self.bump();
                Token::LParen
            }
            ')' => {
                self.bump();
                Token::RParen
            }
            // A sign is numeric only when a digit follows it directly
            '+' | '-' if self.at_digit(1) => {
                self.bump();
                let magnitude = self.scan_number();
                Token::Number(if ch == '-' { -magnitude } else { magnitude })
            }
            '.' if self.peek_at(1).is_none_or(is_delimiter) => {
                self.bump();
                Token::Dot
            }
            _ if ch.is_ascii_digit() => Token::Number(self.scan_number()),
            _ => self.scan_symbol(),
        }
    }

    fn scan_string(&mut self) -> Token {
        // opening quote
        self.bump();
        let mut s = String::new();
        loop {
            match self.bump() {
                None => return Token::NonClosedString,
                Some('"') => return Token::String(s),
                Some(c) => s.push(c),
            }
        }
    }

    fn scan_number(&mut self) -> f64 {
        let mut text = String::new();
        while let Some(c) = self.peek().filter(char::is_ascii_digit) {
            text.push(c);
            self.bump();
        }
        if self.peek() == Some('.') && self.at_digit(1) {
            text.push('.');
            self.bump();
            while let Some(c) = self.peek().filter(char::is_ascii_digit) {
                text.push(c);
                self.bump();
            }
        }
        // Digits past the f64 range saturate instead of reading as infinity
        text.parse().map_or(f64::MAX, |n: f64| n.min(f64::MAX))
    }

    fn scan_symbol(&mut self) -> Token {
        let mut name = String::new();
        while let Some(c) = self.peek().filter(|c| !is_delimiter(*c)) {
            name.push(c);
            self.bump();
        }
        Token::Symbol(name)
    }
}

/// Tokenize all of `input`. The final token is always `EndOfInput` or
/// `NonClosedString`.
pub fn tokenize(input: &str) -> Vec<SpannedToken> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let tok = lexer.next_token();
        let last = matches!(tok.token, Token::EndOfInput | Token::NonClosedString);
        tokens.push(tok);
        if last {
            return tokens;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        tokenize(input).into_iter().map(|t| t.token).collect()
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            kinds("$'( ) ."),
            vec![
                Token::Dollar,
                Token::SingleQuote,
                Token::LParen,
                Token::RParen,
                Token::Dot,
                Token::EndOfInput
            ]
        );
    }

    #[test]
    fn test_signed_numbers() {
        assert_eq!(
            kinds("42 +42 -42 3.25"),
            vec![
                Token::Number(42.0),
                Token::Number(42.0),
                Token::Number(-42.0),
                Token::Number(3.25),
                Token::EndOfInput
            ]
        );
    }

    #[test]
    fn test_overflowing_numbers_saturate() {
        let huge = "9".repeat(400);
        assert_eq!(
            kinds(&format!("{huge} -{huge}")),
            vec![
                Token::Number(f64::MAX),
                Token::Number(-f64::MAX),
                Token::EndOfInput
            ]
        );
    }

    #[test]
    fn test_sign_chars_without_digit_are_symbols() {
        assert_eq!(
            kinds("+ - * / =>"),
            vec![
                Token::Symbol("+".into()),
                Token::Symbol("-".into()),
                Token::Symbol("*".into()),
                Token::Symbol("/".into()),
                Token::Symbol("=>".into()),
                Token::EndOfInput
            ]
        );
    }

    #[test]
    fn test_symbol_stops_at_delimiters() {
        assert_eq!(
            kinds("(map-range$x)"),
            vec![
                Token::LParen,
                Token::Symbol("map-range".into()),
                Token::Dollar,
                Token::Symbol("x".into()),
                Token::RParen,
                Token::EndOfInput
            ]
        );
    }

    #[test]
    fn test_number_followed_by_symbol() {
        assert_eq!(
            kinds("42abc"),
            vec![
                Token::Number(42.0),
                Token::Symbol("abc".into()),
                Token::EndOfInput
            ]
        );
    }

    #[test]
    fn test_dot_inside_symbol() {
        assert_eq!(
            kinds("a.b"),
            vec![Token::Symbol("a.b".into()), Token::EndOfInput]
        );
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            kinds("\"a (b)\" \"\""),
            vec![
                Token::String("a (b)".into()),
                Token::String(String::new()),
                Token::EndOfInput
            ]
        );
        assert_eq!(kinds("\"abc"), vec![Token::NonClosedString]);
    }

    #[test]
    fn test_positions() {
        let tokens = tokenize("(a\n  b)");
        assert_eq!(tokens[0].position, Position::new(1, 1));
        assert_eq!(tokens[1].position, Position::new(1, 2));
        assert_eq!(tokens[2].position, Position::new(2, 3));
        assert_eq!(tokens[3].position, Position::new(2, 4));
    }
}
