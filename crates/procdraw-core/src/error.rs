use std::fmt;

/// A location in reader input, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub fn new(line: usize, col: usize) -> Self {
        Position { line, col }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position { line: 1, col: 1 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Errors raised by the core.
///
/// Evaluation never produces one of these: type and shape mismatches degrade
/// to `nil`. Only unrecoverable reader input and host I/O surface as errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LispError {
    #[error("Reader error at {position}: {message}")]
    Reader { message: String, position: Position },

    #[error("IO error: {0}")]
    Io(String),
}

impl LispError {
    pub fn reader(message: impl Into<String>, position: Position) -> Self {
        LispError::Reader {
            message: message.into(),
            position,
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        LispError::Io(message.into())
    }

    /// True for errors caused by malformed reader input.
    pub fn is_reader_error(&self) -> bool {
        matches!(self, LispError::Reader { .. })
    }
}

impl From<std::io::Error> for LispError {
    fn from(e: std::io::Error) -> Self {
        LispError::Io(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LispError>;
