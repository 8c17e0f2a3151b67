use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cpu16_asm::{assemble, AsmConfig, ImageFormat};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Assemble a source file into a 4096-word memory image"
)]
struct Opts {
    /// Assembly source, one statement per line
    #[arg(short = 'F', long = "file", default_value = "./asm_example.asm")]
    input: PathBuf,
    /// Memory image to write
    #[arg(short = 'O', long = "output", default_value = "./program.mem")]
    output: PathBuf,
    /// Line format of the written image
    #[arg(long, value_enum, default_value_t = ImageFormat::Addressed)]
    format: ImageFormat,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let cfg = AsmConfig {
        format: opts.format,
    };

    let source = fs::read_to_string(&opts.input)
        .with_context(|| format!("cannot read {}", opts.input.display()))?;
    let image = assemble(&source).with_context(|| format!("{}", opts.input.display()))?;

    let file = File::create(&opts.output)
        .with_context(|| format!("cannot create {}", opts.output.display()))?;
    image
        .write_to(BufWriter::new(file), cfg.format)
        .with_context(|| format!("cannot write {}", opts.output.display()))?;

    tracing::info!(
        input = %opts.input.display(),
        output = %opts.output.display(),
        format = ?cfg.format,
        "image written"
    );
    Ok(())
}
