use std::fmt::Write as _;
use std::ops::Range;

use serde::Serialize;

use cpu16_asm::disasm::{listing, ListingEntry};
use cpu16_asm::MemoryImage;

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub start: usize,
    pub end: usize,
    /// Addresses holding a non-zero word.
    pub used: usize,
    pub entries: Vec<ListingEntry>,
}

impl Report {
    /// Disassemble `range`. With `skip_zero`, zero words (which decode as
    /// `NOP`) are left out of the entries.
    pub fn build(image: &MemoryImage, range: Range<usize>, skip_zero: bool) -> Self {
        let mut entries = listing(image, range.clone());
        if skip_zero {
            entries.retain(|e| e.words.iter().any(|&w| w != 0));
        }
        let used = image
            .words()
            .get(range.clone())
            .map_or(0, |ws| ws.iter().filter(|&&w| w != 0).count());
        Self {
            start: range.start,
            end: range.end,
            used,
            entries,
        }
    }

    /// Render as assembly source. Each listed address is preceded by a
    /// `.ORG` whenever it does not follow on from the previous entry, so the
    /// text assembles back to the same words.
    pub fn to_text(&self, show_words: bool) -> String {
        let mut buf = String::new();
        let mut next = None;
        for e in &self.entries {
            if next != Some(e.address) {
                let _ = writeln!(buf, ".ORG {:X}", e.address);
            }
            if show_words {
                let words: Vec<String> = e.words.iter().map(|w| format!("{w:016b}")).collect();
                let _ = writeln!(buf, "{:<24} # {:04x}: {}", e.text, e.address, words.join(" "));
            } else {
                let _ = writeln!(buf, "{}", e.text);
            }
            next = Some(e.address + e.words.len());
        }
        buf
    }
}
