//! Instruction set table.
//!
//! Every mnemonic the assembler understands is described by one
//! [`InstrDesc`] entry in [`TABLE`]. The translator never branches on a
//! mnemonic: it looks the entry up, matches the operand pattern and assigns
//! each captured group to the field(s) named by its roles.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Where a captured operand lands in the encoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperandRole {
    /// Destination register field.
    Dest,
    /// First source register field.
    Src1,
    /// Second source register field.
    Src2,
    /// Full 16-bit value emitted as a trailing word.
    Imm,
    /// 1-bit index flag inside the instruction word (`INT`).
    Index,
}

use OperandRole::*;

#[derive(Debug, Clone, Copy)]
pub struct InstrDesc {
    pub mnemonic: &'static str,
    /// `None` for assembler directives, which never emit a word of their own.
    pub opcode: Option<u8>,
    /// One entry per capture group of `pattern`, in source order.
    pub roles: &'static [&'static [OperandRole]],
    /// Operand matcher applied to the text after the mnemonic. Anchoring and
    /// surrounding whitespace are added when the table is compiled.
    pub pattern: &'static str,
    /// Expected construct, shown in diagnostics and used by the disassembler.
    pub syntax: &'static str,
}

const NONE: &str = "";
const R: &str = r"R([0-7])";
const RR: &str = r"R([0-7])\s*,\s*R([0-7])";
const RRR: &str = r"R([0-7])\s*,\s*R([0-7])\s*,\s*R([0-7])";
const RRI: &str = r"R([0-7])\s*,\s*R([0-7])\s*,\s*(-?[0-9A-F]+)";
const RI: &str = r"R([0-7])\s*,\s*(-?[0-9A-F]+)";
const RIB: &str = r"R([0-7])\s*,\s*(-?[0-9A-F]+)\s*\(\s*R([0-7])\s*\)";
const I: &str = r"(-?[0-9A-F]+)";

macro_rules! instr {
    ($mn:literal, $op:expr, [$($roles:expr),*], $pat:expr, $syntax:literal) => {
        InstrDesc {
            mnemonic: $mn,
            opcode: $op,
            roles: &[$($roles),*],
            pattern: $pat,
            syntax: $syntax,
        }
    };
}

pub const TABLE: &[InstrDesc] = &[
    instr!("NOP", Some(0b00000), [], NONE, "NOP"),
    instr!("HLT", Some(0b00001), [], NONE, "HLT"),
    instr!("SETC", Some(0b00010), [], NONE, "SETC"),
    instr!("NOT", Some(0b00011), [&[Dest], &[Src1]], RR, "NOT Rdst, Rsrc1"),
    instr!("INC", Some(0b00100), [&[Dest], &[Src1]], RR, "INC Rdst, Rsrc1"),
    instr!("OUT", Some(0b00101), [&[Src1]], R, "OUT Rsrc1"),
    instr!("IN", Some(0b00110), [&[Dest]], R, "IN Rdst"),
    instr!("MOV", Some(0b00111), [&[Dest], &[Src1]], RR, "MOV Rdst, Rsrc1"),
    instr!("ADD", Some(0b01000), [&[Dest], &[Src1], &[Src2]], RRR, "ADD Rdst, Rsrc1, Rsrc2"),
    instr!("SUB", Some(0b01001), [&[Dest], &[Src1], &[Src2]], RRR, "SUB Rdst, Rsrc1, Rsrc2"),
    instr!("AND", Some(0b01010), [&[Dest], &[Src1], &[Src2]], RRR, "AND Rdst, Rsrc1, Rsrc2"),
    instr!("IADD", Some(0b01011), [&[Dest], &[Src1], &[Imm]], RRI, "IADD Rdst, Rsrc1, IMM"),
    instr!("PUSH", Some(0b01100), [&[Src1]], R, "PUSH Rsrc1"),
    instr!("POP", Some(0b01101), [&[Dest]], R, "POP Rdst"),
    instr!("LDM", Some(0b01110), [&[Dest], &[Imm]], RI, "LDM Rdst, IMM"),
    instr!("LDD", Some(0b01111), [&[Dest], &[Imm], &[Src1]], RIB, "LDD Rdst, IMM(Rsrc1)"),
    instr!("STD", Some(0b10000), [&[Src2], &[Imm], &[Src1]], RIB, "STD Rsrc2, IMM(Rsrc1)"),
    instr!("JZ", Some(0b10001), [&[Src1]], R, "JZ Rsrc1"),
    instr!("JN", Some(0b10010), [&[Src1]], R, "JN Rsrc1"),
    instr!("JC", Some(0b10011), [&[Src1]], R, "JC Rsrc1"),
    instr!("JMP", Some(0b10100), [&[Src1]], R, "JMP Rsrc1"),
    instr!("CALL", Some(0b10101), [&[Src1]], R, "CALL Rsrc1"),
    instr!("RET", Some(0b10110), [], NONE, "RET"),
    instr!("INT", Some(0b10111), [&[Index]], I, "INT IDX"),
    instr!("RTI", Some(0b11000), [], NONE, "RTI"),
    instr!(".ORG", None, [&[Imm]], I, ".ORG IMM"),
];

/// A table entry with its operand pattern compiled.
#[derive(Debug)]
pub struct Instruction {
    desc: &'static InstrDesc,
    operands: Regex,
}

impl Instruction {
    fn compile(desc: &'static InstrDesc) -> Self {
        let anchored = format!(r"^\s*{}\s*$", desc.pattern);
        let operands = match Regex::new(&anchored) {
            Ok(r) => r,
            Err(e) => panic!("operand pattern for {} is not valid: {e}", desc.mnemonic),
        };
        Self { desc, operands }
    }

    pub fn desc(&self) -> &'static InstrDesc {
        self.desc
    }

    pub fn mnemonic(&self) -> &'static str {
        self.desc.mnemonic
    }

    pub fn opcode(&self) -> Option<u8> {
        self.desc.opcode
    }

    pub fn roles(&self) -> &'static [&'static [OperandRole]] {
        self.desc.roles
    }

    pub fn syntax(&self) -> &'static str {
        self.desc.syntax
    }

    pub fn is_directive(&self) -> bool {
        self.desc.opcode.is_none()
    }

    pub fn has_role(&self, role: OperandRole) -> bool {
        self.desc.roles.iter().any(|group| group.contains(&role))
    }

    /// Number of words this entry places in memory.
    pub fn words(&self) -> u32 {
        match (self.is_directive(), self.has_role(Imm)) {
            (true, _) => 0,
            (false, true) => 2,
            (false, false) => 1,
        }
    }

    pub fn capture_groups(&self) -> usize {
        self.operands.captures_len() - 1
    }

    /// Match the operand text and return the captured tokens in source
    /// order, or `None` if the text does not have the expected shape.
    pub fn capture<'t>(&self, operands: &'t str) -> Option<Vec<&'t str>> {
        let caps = self.operands.captures(operands)?;
        caps.iter()
            .skip(1)
            .map(|m| m.map(|m| m.as_str()))
            .collect()
    }
}

/// The compiled instruction table, indexed by mnemonic and by opcode.
#[derive(Debug)]
pub struct Isa {
    by_mnemonic: HashMap<&'static str, Instruction>,
    by_opcode: [Option<&'static str>; 32],
}

impl Isa {
    fn build() -> Self {
        let mut by_mnemonic = HashMap::with_capacity(TABLE.len());
        let mut by_opcode = [None; 32];
        for desc in TABLE {
            if let Some(op) = desc.opcode {
                by_opcode[op as usize] = Some(desc.mnemonic);
            }
            by_mnemonic.insert(desc.mnemonic, Instruction::compile(desc));
        }
        tracing::debug!(entries = by_mnemonic.len(), "instruction table compiled");
        Self { by_mnemonic, by_opcode }
    }

    /// `mnemonic` must already be uppercase.
    pub fn lookup(&self, mnemonic: &str) -> Option<&Instruction> {
        self.by_mnemonic.get(mnemonic)
    }

    pub fn by_opcode(&self, opcode: u8) -> Option<&Instruction> {
        let mnemonic = (*self.by_opcode.get(opcode as usize)?)?;
        self.by_mnemonic.get(mnemonic)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instruction> {
        TABLE.iter().filter_map(|d| self.by_mnemonic.get(d.mnemonic))
    }
}

/// Process-wide instruction table, compiled on first use.
pub fn isa() -> &'static Isa {
    static ISA: OnceLock<Isa> = OnceLock::new();
    ISA.get_or_init(Isa::build)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn capture_groups_match_roles() {
        for instr in isa().iter() {
            assert_eq!(
                instr.capture_groups(),
                instr.roles().len(),
                "{}",
                instr.mnemonic()
            );
        }
    }

    #[test]
    fn opcodes_are_distinct_and_fit_five_bits() {
        let mut seen = HashSet::new();
        for desc in TABLE.iter().filter(|d| d.opcode.is_some()) {
            let op = desc.opcode.unwrap();
            assert!(op < 32, "{}", desc.mnemonic);
            assert!(seen.insert(op), "duplicate opcode for {}", desc.mnemonic);
        }
        assert_eq!(seen.len(), 25);
    }

    #[test]
    fn lookup_by_opcode_and_mnemonic_agree() {
        let table = isa();
        let ldd = table.lookup("LDD").unwrap();
        assert_eq!(ldd.opcode(), Some(0b01111));
        assert_eq!(table.by_opcode(0b01111).unwrap().mnemonic(), "LDD");
        assert!(table.by_opcode(0b11111).is_none());
        assert!(table.lookup("ldd").is_none());
    }

    #[test]
    fn word_counts() {
        let table = isa();
        for (mn, words) in [("NOP", 1), ("INT", 1), ("ADD", 1), ("IADD", 2), ("LDM", 2), ("LDD", 2), ("STD", 2), (".ORG", 0)] {
            assert_eq!(table.lookup(mn).unwrap().words(), words, "{mn}");
        }
    }

    #[test]
    fn capture_keeps_source_order() {
        let std = isa().lookup("STD").unwrap();
        assert_eq!(std.capture(" R1 , 2A ( R5 ) "), Some(vec!["1", "2A", "5"]));
        assert_eq!(std.capture("R1, 2A"), None);
        let nop = isa().lookup("NOP").unwrap();
        assert_eq!(nop.capture("  "), Some(vec![]));
        assert_eq!(nop.capture("R1"), None);
    }
}
