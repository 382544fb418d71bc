pub mod commands;
pub mod error;
pub mod extractor;
pub mod logging;
pub mod ir {
    pub mod model;
    pub mod validate;
}

// Re-export selected API for consumers
pub use error::{EntryError, ExtractError, ValidationError};
pub use extractor::{Extractor, ExtractorConfig};
pub use ir::model::{EntryKind, Extraction, IrDocument, IrEntry, Parameter};
pub use ir::validate::{validate_document, validate_entry, validate_reader};
