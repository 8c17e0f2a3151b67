pub mod disasm;
pub mod encoding;
pub mod error;
pub mod image;
pub mod isa;
pub mod output;
pub mod translator;

pub use error::{AsmError, ImageParseError};
pub use image::{MemoryImage, IMAGE_WORDS};
pub use output::{AsmConfig, ImageFormat};
pub use translator::{Emission, Translator};

/// Translate a complete source text into a memory image.
///
/// Nothing is returned unless every line translates.
pub fn assemble(source: &str) -> Result<MemoryImage, AsmError> {
    let emissions = Translator::new().translate(source)?;
    MemoryImage::from_emissions(&emissions)
}
