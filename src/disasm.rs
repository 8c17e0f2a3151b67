use std::ops::Range;

use serde::Serialize;

use crate::encoding::{Fields, WordFlags};
use crate::image::MemoryImage;
use crate::isa::{isa, Instruction, OperandRole};

/// An instruction word that matches a table entry exactly.
#[derive(Debug, Clone, Copy)]
pub struct DecodedWord {
    pub instr: &'static Instruction,
    pub fields: Fields,
}

/// Decode a word against the instruction table.
///
/// Only canonical encodings decode: fields the instruction does not use must
/// be zero and the immediate flag must agree with the table. Anything else is
/// data as far as the disassembler is concerned.
pub fn decode(word: u16) -> Option<DecodedWord> {
    let fields = Fields::unpack(word);
    let instr = isa().by_opcode(fields.opcode)?;

    let mut canonical = Fields::new(fields.opcode);
    if instr.has_role(OperandRole::Dest) {
        canonical.dest = fields.dest;
    }
    if instr.has_role(OperandRole::Src1) {
        canonical.src1 = fields.src1;
    }
    if instr.has_role(OperandRole::Src2) {
        canonical.src2 = fields.src2;
    }
    if instr.has_role(OperandRole::Index) {
        canonical.flags |= fields.flags & WordFlags::INDEX;
    }
    if instr.has_role(OperandRole::Imm) {
        canonical.flags |= WordFlags::IMM;
    }
    (canonical == fields).then_some(DecodedWord { instr, fields })
}

impl DecodedWord {
    pub fn mnemonic(&self) -> &'static str {
        self.instr.mnemonic()
    }

    pub fn has_immediate(&self) -> bool {
        self.fields.flags.contains(WordFlags::IMM)
    }

    /// Render back to source syntax. `immediate` is the trailing word, if any.
    pub fn render(&self, immediate: Option<u16>) -> String {
        let f = &self.fields;
        let index = u8::from(f.flags.contains(WordFlags::INDEX));
        let imm = immediate.map_or_else(|| "?".to_string(), |v| format!("{v:X}"));
        self.instr
            .syntax()
            .replace("Rdst", &format!("R{}", f.dest))
            .replace("Rsrc1", &format!("R{}", f.src1))
            .replace("Rsrc2", &format!("R{}", f.src2))
            .replace("IMM", &imm)
            .replace("IDX", &index.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingEntry {
    pub address: usize,
    pub words: Vec<u16>,
    pub text: String,
}

fn data(address: usize, word: u16) -> ListingEntry {
    ListingEntry {
        address,
        words: vec![word],
        text: format!("{word:04X}"),
    }
}

/// Walk `range` of the image, pairing two-word instructions with their
/// trailing immediate. Words that do not decode are listed as hex literals,
/// so the listing assembles back to the same image.
pub fn listing(image: &MemoryImage, range: Range<usize>) -> Vec<ListingEntry> {
    let end = range.end.min(image.len());
    let mut out = Vec::new();
    let mut pc = range.start;
    while pc < end {
        let Some(word) = image.get(pc) else { break };
        let Some(d) = decode(word) else {
            out.push(data(pc, word));
            pc += 1;
            continue;
        };
        if !d.has_immediate() {
            out.push(ListingEntry {
                address: pc,
                words: vec![word],
                text: d.render(None),
            });
            pc += 1;
            continue;
        }
        match image.get(pc + 1).filter(|_| pc + 1 < end) {
            Some(imm) => {
                out.push(ListingEntry {
                    address: pc,
                    words: vec![word, imm],
                    text: d.render(Some(imm)),
                });
                pc += 2;
            }
            None => {
                out.push(data(pc, word));
                pc += 1;
            }
        }
    }
    out
}
