//! Canonical 16-bit instruction word layout.
//!
//! ```text
//!  15      11 10   8 7    5 4    2   1     0
//! +----------+------+------+------+-----+-----+
//! |  opcode  | src1 | src2 | dest | idx | imm |
//! +----------+------+------+------+-----+-----+
//! ```
//!
//! Field positions below are expressed as `Msb0` bit ranges, so they read
//! left to right in the same order as the diagram.

use std::ops::Range;

use bitflags::bitflags;
use bitvec::prelude::*;
use serde::{Deserialize, Serialize};

pub const WORD_BITS: u32 = 16;
pub const OPCODE_BITS: u32 = 5;
pub const REG_BITS: u32 = 3;

const OPCODE: Range<usize> = 0..5;
const SRC1: Range<usize> = 5..8;
const SRC2: Range<usize> = 8..11;
const DEST: Range<usize> = 11..14;

bitflags! {
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WordFlags: u16 {
const IMM = 1 << 0; // trailing immediate word follows
const INDEX = 1 << 1; // INT vector index
}
}

/// The unpacked fields of one instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Fields {
    pub opcode: u8,
    pub src1: u8,
    pub src2: u8,
    pub dest: u8,
    pub flags: WordFlags,
}

impl Fields {
    pub fn new(opcode: u8) -> Self {
        Self {
            opcode,
            ..Self::default()
        }
    }

    pub fn pack(&self) -> u16 {
        let mut raw = 0u16;
        let bits = raw.view_bits_mut::<Msb0>();
        bits[OPCODE].store_be(self.opcode);
        bits[SRC1].store_be(self.src1);
        bits[SRC2].store_be(self.src2);
        bits[DEST].store_be(self.dest);
        raw | self.flags.bits()
    }

    pub fn unpack(raw: u16) -> Self {
        let bits = raw.view_bits::<Msb0>();
        Self {
            opcode: bits[OPCODE].load_be(),
            src1: bits[SRC1].load_be(),
            src2: bits[SRC2].load_be(),
            dest: bits[DEST].load_be(),
            flags: WordFlags::from_bits_truncate(raw),
        }
    }
}

/// Encode `n` into a field `width` bits wide.
///
/// Non-negative values must be below `2^width`; negative values must be
/// representable in two's complement (`n >= -2^(width-1)`) and are stored as
/// `2^width + n`. Anything else is rejected rather than truncated.
pub fn encode_field(n: i64, width: u32) -> Option<u16> {
    debug_assert!((1..=WORD_BITS).contains(&width));
    let span = 1i64 << width;
    if n >= span || n < -(span >> 1) {
        return None;
    }
    let v = if n < 0 { span + n } else { n };
    Some(v as u16)
}

/// Parse an operand written in hexadecimal, with an optional leading `-`.
pub fn parse_hex(text: &str) -> Option<i64> {
    i64::from_str_radix(text, 16).ok()
}

/// Render a word as its 16-character binary string.
pub fn to_binary(word: u16) -> String {
    format!("{word:016b}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn pack_places_fields_msb_first() {
        let f = Fields {
            opcode: 0b01000,
            src1: 2,
            src2: 3,
            dest: 1,
            flags: WordFlags::empty(),
        };
        let expected = (0b01000u16 << 11) | (2 << 8) | (3 << 5) | (1 << 2);
        assert_eq!(f.pack(), expected);
        assert_eq!(to_binary(f.pack()), "0100001001100100");
    }

    #[test]
    fn flags_occupy_low_bits() {
        let mut f = Fields::new(0b10111);
        f.flags |= WordFlags::INDEX;
        assert_eq!(f.pack() & 0b11, 0b10);
        f.flags = WordFlags::IMM;
        assert_eq!(f.pack() & 0b11, 0b01);
    }

    #[test]
    fn unpack_inverts_pack() {
        let f = Fields {
            opcode: 0b10000,
            src1: 7,
            src2: 5,
            dest: 0,
            flags: WordFlags::IMM,
        };
        assert_eq!(Fields::unpack(f.pack()), f);
    }

    #[test]
    fn encode_field_limits() {
        assert_eq!(encode_field(7, 3), Some(7));
        assert_eq!(encode_field(8, 3), None);
        assert_eq!(encode_field(-1, 16), Some(0xFFFF));
        assert_eq!(encode_field(-0x8000, 16), Some(0x8000));
        assert_eq!(encode_field(-0x8001, 16), None);
        assert_eq!(encode_field(0xFFFF, 16), Some(0xFFFF));
        assert_eq!(encode_field(0x10000, 16), None);
        assert_eq!(encode_field(1, 1), Some(1));
        assert_eq!(encode_field(2, 1), None);
    }

    #[test]
    fn parse_hex_accepts_sign() {
        assert_eq!(parse_hex("2A"), Some(0x2A));
        assert_eq!(parse_hex("-10"), Some(-16));
        assert_eq!(parse_hex("FFFFFFFFFFFFFFFFFF"), None);
    }
}
