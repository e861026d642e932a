//! Domain models for document analysis.

mod analysis;
mod document;
mod enums;

pub use analysis::*;
pub use document::*;
pub use enums::*;
