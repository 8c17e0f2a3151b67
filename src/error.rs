use thiserror::Error;

/// Fatal translation errors. Every variant names the 1-based source line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    #[error("line {line}: unknown instruction `{mnemonic}`")]
    UnknownInstruction { line: usize, mnemonic: String },
    #[error("line {line}: malformed operands `{found}`; expected `{expected}`")]
    MalformedOperands {
        line: usize,
        mnemonic: &'static str,
        expected: &'static str,
        found: String,
    },
    #[error("line {line}: value `{value}` does not fit in {width} bits")]
    NumericOverflow { line: usize, value: String, width: u32 },
    #[error("line {line}: address {address:#x} is outside 0x000..=0xfff")]
    AddressOutOfRange { line: usize, address: i64 },
}

impl AsmError {
    pub fn line(&self) -> usize {
        match self {
            AsmError::UnknownInstruction { line, .. }
            | AsmError::MalformedOperands { line, .. }
            | AsmError::NumericOverflow { line, .. }
            | AsmError::AddressOutOfRange { line, .. } => *line,
        }
    }
}

/// Errors reading a rendered memory image back in.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageParseError {
    #[error("line {line}: `{text}` is not a 16-bit binary word")]
    BadWord { line: usize, text: String },
    #[error("line {line}: bad address `{text}`")]
    BadAddress { line: usize, text: String },
    #[error("line {line}: image holds more than {capacity} words")]
    TooManyWords { line: usize, capacity: usize },
}
