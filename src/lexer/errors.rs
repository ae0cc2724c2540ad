use thiserror::Error;

/// Lexer error types. Every variant carries the source file and the
/// 1-based line on which scanning stopped.
#[derive(Error, Debug)]
pub enum LexerError {
    #[error("{file}:{line}: unrecognized character '{ch}'")]
    UnexpectedChar { file: String, line: usize, ch: char },

    #[error("{file}:{line}: unterminated string literal")]
    UnterminatedString { file: String, line: usize },

    #[error("{file}:{line}: unterminated block comment")]
    UnterminatedBlockComment { file: String, line: usize },

    #[error("{file}:{line}: expected '//' or '/*' after '/'")]
    InvalidComment { file: String, line: usize },

    #[error("{file}:{line}: invalid number format '{text}'")]
    InvalidNumber { file: String, line: usize, text: String },

    #[error("{file}:{line}: identifier may not contain a digit after ':'")]
    InvalidIdentifier { file: String, line: usize },

    #[error("{file}:{line}: namespace qualifier '::' is illegal in '{text}'")]
    InvalidNamespace { file: String, line: usize, text: String },

    #[error("{file}:{line}: only #include is supported after '#'")]
    ExpectedInclude { file: String, line: usize },
}
