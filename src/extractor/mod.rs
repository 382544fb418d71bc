//! Extraction gateways: anything that can produce an [`Extraction`].
//!
//! The core never cares how the IR was derived. `script` runs the Node
//! extraction script out of process, `dts` parses a declaration file in
//! process with swc.

pub mod dts;
pub mod script;

use std::path::PathBuf;
use tracing::debug;

use crate::error::ExtractResult;
use crate::ir::model::{Extraction, IrDocument};

pub use dts::DtsExtractor;
pub use script::ScriptExtractor;

pub trait Extractor {
    fn extract(&self) -> ExtractResult<Extraction>;
}

impl<F> Extractor for F
where
    F: Fn() -> ExtractResult<Extraction>,
{
    fn extract(&self) -> ExtractResult<Extraction> {
        self()
    }
}

/// Where extraction comes from, as configured on the command line or environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    pub dts: Option<PathBuf>,
    pub script: PathBuf,
    pub node: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            dts: None,
            script: PathBuf::from(script::DEFAULT_SCRIPT),
            node: script::DEFAULT_NODE.to_string(),
        }
    }
}

impl ExtractorConfig {
    /// A declaration file, when given, takes precedence over the script.
    pub fn build(&self) -> Box<dyn Extractor> {
        match &self.dts {
            Some(path) => {
                debug!(path = %path.display(), "using in-process declaration extractor");
                Box::new(DtsExtractor::new(path))
            }
            None => {
                debug!(script = %self.script.display(), node = %self.node, "using script extractor");
                Box::new(ScriptExtractor::new(&self.node, &self.script))
            }
        }
    }
}

/// Keeps only the requested interfaces. Names absent from the document are ignored;
/// an empty selection keeps everything.
pub fn filter_document(document: IrDocument, selected: &[String]) -> IrDocument {
    if selected.is_empty() {
        return document;
    }
    let before = document.len();
    let filtered: IrDocument = document
        .into_iter()
        .filter(|(name, _)| selected.iter().any(|s| s == name))
        .collect();
    debug!(requested = selected.len(), kept = filtered.len(), of = before, "filtered IR document");
    filtered
}

pub fn sorted_names(extraction: &Extraction) -> Vec<String> {
    let mut names = extraction.interface_names.clone();
    names.sort();
    names
}
