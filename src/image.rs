use std::fmt;

use crate::error::AsmError;
use crate::translator::Emission;

/// Number of words in instruction memory.
pub const IMAGE_WORDS: usize = 4096;

/// A complete, zero-filled instruction memory image.
#[derive(Clone, PartialEq, Eq)]
pub struct MemoryImage {
    words: Vec<u16>,
}

impl Default for MemoryImage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryImage {
    pub fn new() -> Self {
        Self {
            words: vec![0; IMAGE_WORDS],
        }
    }

    /// Lay every emission into a fresh image in order. A later word at the
    /// same address replaces the earlier one.
    pub fn from_emissions<'a, I>(emissions: I) -> Result<Self, AsmError>
    where
        I: IntoIterator<Item = &'a Emission>,
    {
        let mut image = Self::new();
        let mut placed = 0usize;
        for e in emissions {
            image.place(e)?;
            placed += 1;
        }
        tracing::debug!(placed, "image assembled");
        Ok(image)
    }

    pub fn place(&mut self, e: &Emission) -> Result<(), AsmError> {
        let slot = self
            .words
            .get_mut(e.address as usize)
            .ok_or(AsmError::AddressOutOfRange {
                line: e.line,
                address: e.address as i64,
            })?;
        if *slot != 0 && *slot != e.word {
            tracing::trace!(address = e.address, line = e.line, "overwriting earlier word");
        }
        *slot = e.word;
        Ok(())
    }

    pub fn get(&self, address: usize) -> Option<u16> {
        self.words.get(address).copied()
    }

    pub(crate) fn set(&mut self, address: usize, word: u16) -> bool {
        match self.words.get_mut(address) {
            Some(slot) => {
                *slot = word;
                true
            }
            None => false,
        }
    }

    pub fn words(&self) -> &[u16] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_blank(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }
}

impl fmt::Debug for MemoryImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Only the written addresses; 4096 zeroes are noise.
        let mut map = f.debug_map();
        for (addr, word) in self.words.iter().enumerate().filter(|(_, w)| **w != 0) {
            map.entry(&format_args!("{addr:#05x}"), &format_args!("{word:016b}"));
        }
        map.finish()
    }
}
