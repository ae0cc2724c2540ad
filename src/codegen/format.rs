use std::io::Write;
use std::process::{Command, Stdio};

use thiserror::Error;

/// Formatter error types.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("formatter reported: {0}")]
    Rejected(String),

    #[error("failed to run formatter: {0}")]
    Io(#[from] std::io::Error),
}

/// Pretty-printer for generated target-language source. The compiler only
/// depends on this contract; the concrete formatter is external.
pub trait Formatter {
    /// Format a buffer of source text, returning the pretty-printed bytes.
    ///
    /// # Errors
    /// Returns `FormatError` when the formatter rejects the source or
    /// cannot be executed.
    fn format(&self, source: &[u8]) -> Result<Vec<u8>, FormatError>;
}

/// Pipes the buffer through `gofmt`. When the binary is not installed the
/// source passes through unformatted rather than failing the build.
#[derive(Debug, Default)]
pub struct GofmtFormatter;

impl Formatter for GofmtFormatter {
    fn format(&self, source: &[u8]) -> Result<Vec<u8>, FormatError> {
        let mut child = match Command::new("gofmt")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(source.to_vec()),
            Err(e) => return Err(e.into()),
        };

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(source)?;
        }
        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(FormatError::Rejected(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(output.stdout)
    }
}

/// Identity formatter, used by tests and as an explicit opt-out.
#[derive(Debug, Default)]
pub struct PassthroughFormatter;

impl Formatter for PassthroughFormatter {
    fn format(&self, source: &[u8]) -> Result<Vec<u8>, FormatError> {
        Ok(source.to_vec())
    }
}
