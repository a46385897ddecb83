//! step2stl - convert a STEP or IGES file to STL
//!
//! Tries OpenCASCADE, truck, and FreeCAD in that order and stops at the
//! first one that writes a non-empty STL.

use anyhow::{bail, Result};
use clap::error::ErrorKind;
use clap::Parser;
use partscope::{Config, ConvertError};
use partscope_cli::{init_tracing, remediation_text, LinePrinter};
use partscope_convert::{validate_input, ConversionPipeline, ConversionResult, InputKind};
use std::io;
use std::path::PathBuf;

const INSTALL_HELP: &str = "\
step2stl needs a STEP converter. Either:
  - install FreeCAD (macOS: brew install --cask freecad, Debian/Ubuntu: sudo apt install freecad,
    Windows: https://www.freecad.org/downloads.php), or
  - build with a CAD kernel: cargo install partscope-cli --features occt (or --features truck)";

#[derive(Parser)]
#[command(name = "step2stl")]
#[command(about = "Convert a STEP or IGES file to STL", long_about = None)]
#[command(after_help = INSTALL_HELP)]
struct Args {
    /// STEP or IGES file
    input: PathBuf,
    /// STL file to write
    output: PathBuf,

    /// TOML config file for FreeCAD commands and timeout
    #[arg(long)]
    config: Option<PathBuf>,

    /// Show debug logs
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            eprintln!("{e}");
            eprintln!("Usage: step2stl <input.step> <output.stl>\n");
            eprintln!("{INSTALL_HELP}");
            std::process::exit(1);
        }
    };
    init_tracing(args.verbose);

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if let InputKind::Mesh(_) = validate_input(&args.input)? {
        bail!("{} is already a mesh file", args.input.display());
    }

    println!("Converting {} -> {}", args.input.display(), args.output.display());
    let pipeline = ConversionPipeline::new(&config.conversion);
    let mut printer = LinePrinter::new(io::stdout());

    match pipeline.convert_exchange(&args.input, &args.output, &mut printer) {
        ConversionResult::Success { output, method } => {
            println!("Wrote {} using {method}", output.display());
            Ok(())
        }
        ConversionResult::Failure { reasons } => {
            let err = ConvertError::PipelineExhausted { failures: reasons };
            eprint!("{}", remediation_text(err.remediation()));
            Err(err.into())
        }
    }
}
