use std::fs;
use std::mem;
use std::path::{Path, PathBuf};

use crate::lexer::{Lexer, Token, TokenKind};
use crate::parser::{resolve, ParserError, Unit};

/// Parse one `.jce` file into a fully resolved compilation unit.
///
/// Includes are resolved relative to the file's directory and parsed
/// recursively; `inc_chain` lists the ancestor files and guards against
/// circular includes.
///
/// # Errors
/// Returns `ParserError` on any lex, parse, resolve, or read failure.
pub fn parse_file(path: &Path, inc_chain: &[PathBuf]) -> Result<Unit, ParserError> {
    for ancestor in inc_chain {
        if ancestor == path {
            return Err(ParserError::CircularInclude {
                path: path.to_path_buf(),
            });
        }
    }

    let source = fs::read(path).map_err(|e| ParserError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut chain = inc_chain.to_vec();
    chain.push(path.to_path_buf());

    let mut parser = Parser::new(path, source, chain);
    parser.run()?;
    Ok(parser.unit)
}

/// Recursive-descent parser over the token stream of a single file.
pub struct Parser {
    pub(crate) lexer: Lexer,
    pub(crate) token: Token,
    pub(crate) unit: Unit,
    filename: String,
}

impl Parser {
    #[must_use]
    pub fn new(path: &Path, source: Vec<u8>, inc_chain: Vec<PathBuf>) -> Self {
        let filename = path.display().to_string();
        Self {
            lexer: Lexer::new(&filename, source),
            token: Token::new(TokenKind::Eos, None, 0),
            unit: Unit::new(path, inc_chain),
            filename,
        }
    }

    /// Top-level loop: `#include` directives and `module` blocks until EOS,
    /// then include resolution and the analysis passes.
    pub fn run(&mut self) -> Result<(), ParserError> {
        loop {
            self.next()?;
            match self.token.kind {
                TokenKind::Eos => break,
                TokenKind::Include => self.parse_include()?,
                TokenKind::Module => self.parse_module()?,
                _ => return Err(self.syntax("expect include or module")),
            }
        }
        resolve::analyze_depend(&mut self.unit)
    }

    /// Advance to the next semantically relevant token (comments skipped).
    pub(crate) fn next(&mut self) -> Result<(), ParserError> {
        loop {
            self.token = self.lexer.next_token()?;
            if self.token.kind != TokenKind::Comment {
                return Ok(());
            }
        }
    }

    /// Advance and require a specific token kind.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> Result<(), ParserError> {
        self.next()?;
        if self.token.kind != kind {
            return Err(ParserError::ExpectedToken {
                file: self.filename.clone(),
                line: self.token.line,
                expected: kind.to_string(),
                found: self.token.kind.to_string(),
            });
        }
        Ok(())
    }

    pub(crate) fn syntax(&self, message: impl Into<String>) -> ParserError {
        ParserError::Syntax {
            file: self.filename.clone(),
            line: self.token.line,
            message: message.into(),
        }
    }

    pub(crate) fn file(&self) -> &str {
        &self.filename
    }

    fn parse_include(&mut self) -> Result<(), ParserError> {
        self.expect(TokenKind::StringLit)?;
        self.unit.includes.push(self.token.text().to_string());
        Ok(())
    }

    /// `module Name { ... };` — the first module claims the unit; later
    /// modules in the same file are hoisted into a synthetic sibling unit
    /// named `<proto>_<module>.jce`.
    fn parse_module(&mut self) -> Result<(), ParserError> {
        self.expect(TokenKind::Name)?;
        let name = self.token.text().to_string();

        if self.unit.module.is_empty() {
            self.unit.module = name;
            return self.parse_module_segment();
        }

        let dir = self
            .unit
            .source
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let synth_path = dir.join(format!("{}_{}.jce", self.unit.proto_name, name));

        let mut synth = Unit::new(&synth_path, self.unit.inc_chain.clone());
        synth.module = name;
        synth.includes = self.unit.includes.clone();

        // Parse the segment into the synthetic unit by swapping it in as
        // the current unit, restoring the parent afterwards.
        mem::swap(&mut self.unit, &mut synth);
        let segment = self.parse_module_segment();
        mem::swap(&mut self.unit, &mut synth);
        segment?;

        // The synthetic unit may reference anything the parent has declared
        // so far: resolve against a snapshot, then drop it again so the
        // parent is never emitted through the synthetic unit.
        synth.included_units.push(self.unit.clone());
        resolve::analyze_depend(&mut synth)?;
        let parent_source = self.unit.source.clone();
        synth.included_units.retain(|u| u.source != parent_source);

        if let Some(existing) = self
            .unit
            .included_units
            .iter_mut()
            .find(|u| u.source == synth.source)
        {
            existing.structs.extend(synth.structs);
            existing.enums.extend(synth.enums);
            existing.consts.extend(synth.consts);
        } else {
            self.unit.included_units.push(synth);
        }
        Ok(())
    }

    /// `{ const | enum | struct ... };`
    fn parse_module_segment(&mut self) -> Result<(), ParserError> {
        self.expect(TokenKind::BraceLeft)?;
        loop {
            self.next()?;
            match self.token.kind {
                TokenKind::BraceRight => {
                    self.expect(TokenKind::Semi)?;
                    return Ok(());
                }
                TokenKind::Const => self.parse_const()?,
                TokenKind::Enum => self.parse_enum()?,
                TokenKind::Struct => self.parse_struct()?,
                kind => return Err(self.syntax(format!("unexpected '{kind}' in module body"))),
            }
        }
    }
}
