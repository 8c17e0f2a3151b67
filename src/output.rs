//! Text renderings of a memory image.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::encoding::to_binary;
use crate::error::ImageParseError;
use crate::image::{MemoryImage, IMAGE_WORDS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// `0042: 0100001001100100`, decimal address then the word
    #[default]
    Addressed,
    /// One bare 16-digit binary word per line
    Bare,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AsmConfig {
    pub format: ImageFormat,
}

impl MemoryImage {
    pub fn render_line(address: usize, word: u16, format: ImageFormat) -> String {
        match format {
            ImageFormat::Addressed => format!("{address:04}: {}", to_binary(word)),
            ImageFormat::Bare => to_binary(word),
        }
    }

    /// Write all 4096 lines, one per address, in address order.
    pub fn write_to<W: Write>(&self, mut w: W, format: ImageFormat) -> io::Result<()> {
        for (address, &word) in self.words().iter().enumerate() {
            writeln!(w, "{}", Self::render_line(address, word, format))?;
        }
        w.flush()
    }

    pub fn render(&self, format: ImageFormat) -> String {
        let mut out = Vec::with_capacity(IMAGE_WORDS * 23);
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut out, format);
        String::from_utf8_lossy(&out).into_owned()
    }

    /// Read an image in either format. Addressed and bare lines may be mixed;
    /// a bare line lands at the address after the previous line's.
    pub fn parse(text: &str) -> Result<Self, ImageParseError> {
        let mut image = MemoryImage::new();
        let mut next = 0usize;
        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            let (address, word_text) = match raw.split_once(':') {
                Some((addr, word)) => {
                    let address = addr.trim().parse::<usize>().map_err(|_| {
                        ImageParseError::BadAddress {
                            line,
                            text: addr.trim().to_string(),
                        }
                    })?;
                    if address >= IMAGE_WORDS {
                        return Err(ImageParseError::BadAddress {
                            line,
                            text: addr.trim().to_string(),
                        });
                    }
                    (address, word.trim())
                }
                None => (next, raw),
            };
            let word = parse_word(word_text).ok_or_else(|| ImageParseError::BadWord {
                line,
                text: word_text.to_string(),
            })?;
            if !image.set(address, word) {
                return Err(ImageParseError::TooManyWords {
                    line,
                    capacity: IMAGE_WORDS,
                });
            }
            next = address + 1;
        }
        Ok(image)
    }
}

fn parse_word(text: &str) -> Option<u16> {
    if text.len() != 16 || !text.bytes().all(|b| b == b'0' || b == b'1') {
        return None;
    }
    u16::from_str_radix(text, 2).ok()
}
