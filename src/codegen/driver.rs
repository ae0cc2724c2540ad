use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::codegen::format::Formatter;
use crate::codegen::generator::Generator;
use crate::parser::{parse_file, Unit};

/// Code generation options, mirroring the CLI surface.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Output root directory; normalized to carry a trailing slash.
    pub outdir: String,
    /// Project root module path used to compose cross-module import paths.
    pub module_path: String,
    /// Known import paths searched by suffix before composing one.
    pub imports: Vec<String>,
    /// Emit json field tags with an omitempty hint.
    pub json_omit_empty: bool,
    /// Keep the numeric jce tag attribute alongside omitempty json tags.
    pub add_tag: bool,
    /// Decode every member as if it were declared `require`.
    pub no_optional: bool,
    /// Verbose diagnostics on stderr.
    pub debug: bool,
}

/// Orchestrates parsing and emission per input file. Units are emitted at
/// most once per distinct source path; the dedup set lives here rather
/// than in process-global state.
pub struct Compiler {
    options: Options,
    formatter: Box<dyn Formatter>,
    emitted: HashSet<PathBuf>,
}

impl Compiler {
    #[must_use]
    pub fn new(mut options: Options, formatter: Box<dyn Formatter>) -> Self {
        if !options.outdir.is_empty() && !options.outdir.ends_with('/') {
            options.outdir.push('/');
        }
        Self {
            options,
            formatter,
            emitted: HashSet::new(),
        }
    }

    /// Compile one `.jce` file: parse and resolve the include tree, run the
    /// rename pass, then emit every unit of the tree that has content.
    ///
    /// # Errors
    /// Returns an error on any parse, resolve, emit, format, or I/O failure.
    pub fn compile_file(&mut self, path: &Path) -> Result<()> {
        let mut unit = parse_file(path, &[])
            .with_context(|| format!("failed to compile '{}'", path.display()))?;
        if self.options.debug {
            eprintln!("{unit:#?}");
        }
        unit.rename_all();
        self.emit_unit(&unit)
    }

    // Includes are emitted before the unit that pulled them in. The dedup
    // set is marked on entry so a unit reachable along two paths (or a
    // snapshot of a partially parsed parent) is only ever written once.
    fn emit_unit(&mut self, unit: &Unit) -> Result<()> {
        if !self.emitted.insert(unit.source.clone()) {
            return Ok(());
        }
        for inc in &unit.included_units {
            self.emit_unit(inc)?;
        }
        if unit.is_empty() {
            return Ok(());
        }

        let code = Generator::new(unit, &self.options).generate()?;
        let pretty = self.formatter.format(code.as_bytes()).with_context(|| {
            format!("failed to format generated code for '{}'", unit.source.display())
        })?;

        let dir = PathBuf::from(format!("{}{}", self.options.outdir, unit.module));
        fs::DirBuilder::new()
            .recursive(true)
            .mode(0o766)
            .create(&dir)
            .with_context(|| format!("failed to create output directory '{}'", dir.display()))?;

        let out_path = dir.join(format!("{}.jce.go", unit.proto_name));
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o666)
            .open(&out_path)
            .with_context(|| format!("failed to open '{}'", out_path.display()))?;
        file.write_all(&pretty)
            .with_context(|| format!("failed to write '{}'", out_path.display()))?;

        if self.options.debug {
            eprintln!("generated {}", out_path.display());
        }
        Ok(())
    }
}
