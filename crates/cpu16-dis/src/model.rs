use anyhow::{Context, Result};
use std::path::Path;

use cpu16_asm::{MemoryImage, IMAGE_WORDS};

/// Load a rendered image in either the addressed or the bare format.
pub fn load_image(path: &Path) -> Result<MemoryImage> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let image = MemoryImage::parse(&text).with_context(|| format!("{}", path.display()))?;
    Ok(image)
}

/// Parse an address given as `0x..` hex or decimal.
pub fn parse_addr(s: &str) -> Result<usize> {
    let s = s.trim();
    let addr = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        usize::from_str_radix(hex, 16)?
    } else {
        s.parse::<usize>()?
    };
    anyhow::ensure!(addr <= IMAGE_WORDS, "address {addr:#x} is past the end of the image");
    Ok(addr)
}
