use std::path::PathBuf;

use thiserror::Error;

/// Parser and resolution error types.
#[derive(Error, Debug)]
pub enum ParserError {
    #[error("{file}:{line}: expected {expected}, found '{found}'")]
    ExpectedToken {
        file: String,
        line: usize,
        expected: String,
        found: String,
    },

    #[error("{file}:{line}: {message}")]
    Syntax {
        file: String,
        line: usize,
        message: String,
    },

    #[error("{file}:{line}: {name} redefined")]
    Redefine {
        file: String,
        line: usize,
        name: String,
    },

    #[error("{file}:{line}: tag {tag} duplicated")]
    DuplicateTag {
        file: String,
        line: usize,
        tag: i32,
    },

    #[error("{file}: type '{name}' is not defined")]
    UnresolvedType { file: String, name: String },

    #[error("{file}: cannot find default value '{name}'")]
    UnresolvedDefault { file: String, name: String },

    #[error("{file}: '{name}' is ambiguous: {first} or {second}")]
    AmbiguousEnumMember {
        file: String,
        name: String,
        first: String,
        second: String,
    },

    #[error("circular include: {}", .path.display())]
    CircularInclude { path: PathBuf },

    #[error("failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Lexer(#[from] crate::lexer::LexerError),
}
