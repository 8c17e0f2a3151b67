pub mod model;
pub mod report;

// Re-export commonly used types/functions for the CLI
pub use model::{load_image, parse_addr};
pub use report::Report;
