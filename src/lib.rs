//! JCE IDL Compiler
//!
//! A compiler front-end and Go code generator for the JCE interface
//! definition language. Each input `.jce` file yields one Go source file
//! containing native type definitions plus `WriteTo`/`ReadFrom` codec
//! methods implementing the JCE tagged binary wire format.

pub mod codegen;
pub mod lexer;
pub mod parser;
pub mod utils;

/// Tool version stamped into the banner of every generated file.
pub const VERSION: &str = "v1.0";
