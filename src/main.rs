use anyhow::Result;
use clap::Parser as ClapParser;
use std::path::PathBuf;

use jce2go::codegen::{Compiler, GofmtFormatter, Options};

#[derive(ClapParser)]
#[command(name = "jce2go")]
#[command(about = "Compile JCE IDL files to Go codec bindings", long_about = None)]
struct Cli {
    /// Input .jce files; other extensions are skipped
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Output root directory for generated code
    #[arg(short = 'o', value_name = "DIR", default_value = "")]
    outdir: String,

    /// Project root module path used to compose cross-module import paths
    #[arg(long = "mod", value_name = "PATH", default_value = "")]
    module_path: String,

    /// Emit json field tags with an omitempty hint
    #[arg(long)]
    json: bool,

    /// Keep the numeric jce tag attribute alongside omitempty json tags
    #[arg(long)]
    tag: bool,

    /// Decode every field as if it were declared require
    #[arg(long = "no-optional")]
    no_optional: bool,

    /// Verbose diagnostics
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let options = Options {
        outdir: cli.outdir,
        module_path: cli.module_path,
        imports: Vec::new(),
        json_omit_empty: cli.json,
        add_tag: cli.tag,
        no_optional: cli.no_optional,
        debug: cli.debug,
    };
    let mut compiler = Compiler::new(options, Box::new(GofmtFormatter));

    for file in &cli.files {
        if file.extension().and_then(|e| e.to_str()) != Some("jce") {
            continue;
        }
        if cli.debug {
            eprintln!("begin parse file: {}", file.display());
        }
        compiler.compile_file(file)?;
    }

    Ok(())
}
