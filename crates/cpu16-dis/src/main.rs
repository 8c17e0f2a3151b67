use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use cpu16_asm::IMAGE_WORDS;
use cpu16_dis::{load_image, parse_addr, Report};

#[derive(Parser, Debug)]
#[command(author, version, about = "cpu16 memory image disassembler", long_about = None)]
struct Cli {
    /// Memory image written by cpu16-asm (addressed or bare format)
    #[arg(value_name = "MEMFILE")]
    input: PathBuf,
    /// First address to list (hex or dec)
    #[arg(long, default_value = "0")]
    start: String,
    /// End address, exclusive (hex or dec)
    #[arg(long)]
    end: Option<String>,
    /// Leave zero words out of the listing
    #[arg(long)]
    skip_zero: bool,
    /// Show the binary words next to each line (text format only)
    #[arg(long)]
    show_words: bool,
    /// Output format: text or json
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Write output to file instead of stdout
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let image = load_image(&cli.input)?;

    let start = parse_addr(&cli.start)?;
    let end = match &cli.end {
        Some(end) => parse_addr(end)?,
        None => IMAGE_WORDS,
    };
    anyhow::ensure!(end >= start, "end must be >= start");

    let report = Report::build(&image, start..end, cli.skip_zero);
    tracing::debug!(entries = report.entries.len(), used = report.used, "listing built");

    let text = match cli.format {
        OutputFormat::Text => report.to_text(cli.show_words),
        OutputFormat::Json => serde_json::to_string_pretty(&report)? + "\n",
    };
    match cli.out {
        Some(path) => std::fs::write(path, text)?,
        None => print!("{text}"),
    }
    Ok(())
}
