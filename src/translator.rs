//! Line-by-line translation of assembly source into addressed words.

use serde::Serialize;

use crate::encoding::{encode_field, parse_hex, Fields, WordFlags, REG_BITS, WORD_BITS};
use crate::error::AsmError;
use crate::image::IMAGE_WORDS;
use crate::isa::{isa, Instruction, Isa, OperandRole};

/// One word placed at one address, tagged with the line that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Emission {
    pub line: usize,
    pub address: u16,
    pub word: u16,
}

/// Strip a `#` comment, surrounding whitespace, and fold to uppercase.
pub fn normalize(raw: &str) -> String {
    let code = match raw.find('#') {
        Some(idx) => &raw[..idx],
        None => raw,
    };
    code.trim().to_ascii_uppercase()
}

fn is_hex_literal(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// Translates source lines in order, owning the origin counter for one run.
#[derive(Debug)]
pub struct Translator {
    isa: &'static Isa,
    origin: u32,
}

impl Default for Translator {
    fn default() -> Self {
        Self::new()
    }
}

impl Translator {
    pub fn new() -> Self {
        Self { isa: isa(), origin: 0 }
    }

    /// Address the next emitted word will be placed at.
    pub fn origin(&self) -> u32 {
        self.origin
    }

    /// Translate a whole source text. Stops at the first error.
    pub fn translate(&mut self, source: &str) -> Result<Vec<Emission>, AsmError> {
        let mut out = Vec::new();
        for (idx, raw) in source.lines().enumerate() {
            out.extend(self.translate_line(idx + 1, raw)?);
        }
        tracing::debug!(words = out.len(), origin = self.origin, "translation finished");
        Ok(out)
    }

    /// Translate one raw source line. `line` is its 1-based number.
    pub fn translate_line(&mut self, line: usize, raw: &str) -> Result<Vec<Emission>, AsmError> {
        let text = normalize(raw);
        let mut out = Vec::with_capacity(2);
        if text.is_empty() {
            return Ok(out);
        }

        if is_hex_literal(&text) && self.isa.lookup(&text).is_none() {
            let word = value(line, &text, WORD_BITS)?;
            self.emit(line, word, &mut out)?;
            return Ok(out);
        }

        let (mnemonic, operands) = text
            .split_once(char::is_whitespace)
            .unwrap_or((text.as_str(), ""));
        let isa = self.isa;
        let instr = isa
            .lookup(mnemonic)
            .ok_or_else(|| AsmError::UnknownInstruction {
                line,
                mnemonic: mnemonic.to_string(),
            })?;
        let captured = instr
            .capture(operands)
            .ok_or_else(|| malformed(line, instr, operands))?;

        let Some(opcode) = instr.opcode() else {
            return self.set_origin(line, &captured).map(|()| out);
        };

        let mut fields = Fields::new(opcode);
        let mut immediate = None;
        for (token, roles) in captured.iter().zip(instr.roles()) {
            for role in roles.iter() {
                match role {
                    OperandRole::Dest => fields.dest = register(line, token)?,
                    OperandRole::Src1 => fields.src1 = register(line, token)?,
                    OperandRole::Src2 => fields.src2 = register(line, token)?,
                    OperandRole::Imm => immediate = Some(value(line, token, WORD_BITS)?),
                    OperandRole::Index => {
                        if value(line, token, 1)? == 1 {
                            fields.flags |= WordFlags::INDEX;
                        }
                    }
                }
            }
        }
        if immediate.is_some() {
            fields.flags |= WordFlags::IMM;
        }

        self.emit(line, fields.pack(), &mut out)?;
        if let Some(imm) = immediate {
            self.emit(line, imm, &mut out)?;
        }
        Ok(out)
    }

    fn set_origin(&mut self, line: usize, captured: &[&str]) -> Result<(), AsmError> {
        let token = captured.first().copied().unwrap_or_default();
        let address = parse_hex(token).ok_or_else(|| AsmError::NumericOverflow {
            line,
            value: token.to_string(),
            width: WORD_BITS,
        })?;
        if !(0..IMAGE_WORDS as i64).contains(&address) {
            return Err(AsmError::AddressOutOfRange { line, address });
        }
        tracing::debug!(line, from = self.origin, to = address, ".ORG");
        self.origin = address as u32;
        Ok(())
    }

    fn emit(&mut self, line: usize, word: u16, out: &mut Vec<Emission>) -> Result<(), AsmError> {
        if self.origin as usize >= IMAGE_WORDS {
            return Err(AsmError::AddressOutOfRange {
                line,
                address: self.origin as i64,
            });
        }
        let address = self.origin as u16;
        tracing::trace!(line, address, word, "emit");
        out.push(Emission { line, address, word });
        self.origin += 1;
        Ok(())
    }
}

fn malformed(line: usize, instr: &Instruction, operands: &str) -> AsmError {
    AsmError::MalformedOperands {
        line,
        mnemonic: instr.mnemonic(),
        expected: instr.syntax(),
        found: operands.trim().to_string(),
    }
}

fn register(line: usize, token: &str) -> Result<u8, AsmError> {
    token
        .parse::<i64>()
        .ok()
        .and_then(|n| encode_field(n, REG_BITS))
        .map(|v| v as u8)
        .ok_or_else(|| AsmError::NumericOverflow {
            line,
            value: token.to_string(),
            width: REG_BITS,
        })
}

fn value(line: usize, token: &str, width: u32) -> Result<u16, AsmError> {
    parse_hex(token)
        .and_then(|n| encode_field(n, width))
        .ok_or_else(|| AsmError::NumericOverflow {
            line,
            value: token.to_string(),
            width,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn words(src: &str) -> Vec<(u16, u16)> {
        Translator::new()
            .translate(src)
            .unwrap()
            .into_iter()
            .map(|e| (e.address, e.word))
            .collect()
    }

    #[test]
    fn normalize_strips_comments_and_case() {
        assert_eq!(normalize("  mov r1, r2   # copy"), "MOV R1, R2");
        assert_eq!(normalize("# only a comment"), "");
        assert_eq!(normalize("\t"), "");
    }

    #[test]
    fn blank_and_comment_lines_emit_nothing() {
        let mut t = Translator::new();
        assert!(t.translate_line(1, "").unwrap().is_empty());
        assert!(t.translate_line(2, "   # nothing").unwrap().is_empty());
        assert_eq!(t.origin(), 0);
    }

    #[test]
    fn register_fields_follow_roles() {
        // ADD R1, R2, R3: opcode 01000, src1 010, src2 011, dest 001
        assert_eq!(words("ADD R1, R2, R3"), vec![(0, 0b01000_010_011_001_0_0)]);
        // OUT uses src1 only, IN uses dest only
        assert_eq!(words("OUT R5"), vec![(0, 0b00101_101_000_000_0_0)]);
        assert_eq!(words("IN R5"), vec![(0, 0b00110_000_000_101_0_0)]);
    }

    #[test]
    fn std_assigns_value_and_base_registers() {
        // STD R2, 10(R6): src1 = base R6, src2 = value R2
        assert_eq!(
            words("STD R2, 10(R6)"),
            vec![(0, 0b10000_110_010_000_0_1), (1, 0x0010)]
        );
        // LDD R3, 4(R1): dest R3, src1 = base R1
        assert_eq!(
            words("ldd r3,4(r1)"),
            vec![(0, 0b01111_001_000_011_0_1), (1, 0x0004)]
        );
    }

    #[test]
    fn int_sets_index_flag_only() {
        assert_eq!(words("INT 0"), vec![(0, 0b10111_000_000_000_0_0)]);
        assert_eq!(words("INT 1"), vec![(0, 0b10111_000_000_000_1_0)]);
        let err = Translator::new().translate("INT 2").unwrap_err();
        assert!(matches!(err, AsmError::NumericOverflow { width: 1, .. }));
    }

    #[test]
    fn negative_immediate_is_twos_complement() {
        assert_eq!(
            words("IADD R1, R1, -1"),
            vec![(0, 0b01011_001_000_001_0_1), (1, 0xFFFF)]
        );
    }

    #[test]
    fn literal_versus_mnemonic() {
        // DEC is not a mnemonic, so it is a data word.
        assert_eq!(words("DEC"), vec![(0, 0x0DEC)]);
        // ADD is, so a bare ADD is an instruction with missing operands.
        let err = Translator::new().translate("ADD").unwrap_err();
        assert!(matches!(err, AsmError::MalformedOperands { mnemonic: "ADD", .. }));
    }

    #[test]
    fn org_moves_the_counter() {
        let mut t = Translator::new();
        assert!(t.translate_line(1, ".org 10").unwrap().is_empty());
        assert_eq!(t.origin(), 0x10);
        let out = t.translate_line(2, "LDM R0, 5").unwrap();
        assert_eq!(out.iter().map(|e| e.address).collect::<Vec<_>>(), vec![0x10, 0x11]);
        assert_eq!(t.origin(), 0x12);
    }

    #[test]
    fn org_outside_image_is_rejected() {
        let err = Translator::new().translate("NOP\n.ORG 1000").unwrap_err();
        assert_eq!(err, AsmError::AddressOutOfRange { line: 2, address: 0x1000 });
        let err = Translator::new().translate(".ORG -1").unwrap_err();
        assert_eq!(err, AsmError::AddressOutOfRange { line: 1, address: -1 });
    }

    #[test]
    fn emission_past_the_end_is_rejected() {
        let err = Translator::new().translate(".ORG FFF\nLDM R1, 1").unwrap_err();
        assert_eq!(err, AsmError::AddressOutOfRange { line: 2, address: 0x1000 });
    }

    #[test]
    fn malformed_operands_name_the_expected_construct() {
        let err = Translator::new().translate("\nMOV R1 R2").unwrap_err();
        assert_eq!(
            err,
            AsmError::MalformedOperands {
                line: 2,
                mnemonic: "MOV",
                expected: "MOV Rdst, Rsrc1",
                found: "R1 R2".to_string(),
            }
        );
        assert!(Translator::new().translate("PUSH R8").is_err());
        assert!(Translator::new().translate("HLT R1").is_err());
    }
}
