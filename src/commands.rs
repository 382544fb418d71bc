//! Bodies of the `extract`, `interfaces` and `validate` subcommands.
//!
//! Each writes its normal output to the sink it is given; errors are returned
//! to the caller, which owns stderr and the exit status.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;
use tracing::info;

use crate::extractor::{filter_document, sorted_names, Extractor};
use crate::ir::validate::{validate_reader, DocumentSummary};

pub const PASS_BANNER: &str = "✅ Schema validation passed";
pub const FAIL_BANNER: &str = "❌ Schema validation failed";

/// Extracts the IR, keeps only `selected` interfaces (all when empty) and
/// writes it as 2-space indented JSON to `output`, or to `out` when no path is given.
pub fn run_extract<W: Write>(
    extractor: &dyn Extractor,
    selected: &[String],
    output: Option<&Path>,
    out: &mut W,
) -> Result<()> {
    let extraction = extractor.extract().context("extraction failed")?;
    let document = filter_document(extraction.ir, selected);
    let json = serde_json::to_string_pretty(&document).context("failed to serialize IR")?;

    match output {
        Some(path) => {
            std::fs::write(path, &json).with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), interfaces = document.len(), "wrote IR");
            writeln!(out, "✅ IR written to {}", path.display())?;
        }
        None => writeln!(out, "{}", json)?,
    }
    Ok(())
}

/// Prints every known interface name, one per line, sorted ascending.
pub fn run_interfaces<W: Write>(extractor: &dyn Extractor, out: &mut W) -> Result<()> {
    let extraction = extractor.extract().context("extraction failed")?;
    for name in sorted_names(&extraction) {
        writeln!(out, "{}", name)?;
    }
    Ok(())
}

/// Opens the document to validate; `None` or `-` means standard input.
pub fn open_input(path: Option<&Path>) -> Result<Box<dyn Read>> {
    match path {
        Some(path) if path != Path::new("-") => {
            let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        _ => Ok(Box::new(io::stdin().lock())),
    }
}

/// Validates a full document read from `reader`, printing the pass or fail banner to `out`.
///
/// A failed validation is returned as the error so the caller can report it.
pub fn run_validate<R: Read, W: Write>(reader: R, out: &mut W) -> Result<DocumentSummary> {
    match validate_reader(reader) {
        Ok(summary) => {
            info!(interfaces = summary.interfaces, entries = summary.entries, "document is valid");
            writeln!(out, "{}", PASS_BANNER)?;
            Ok(summary)
        }
        Err(err) => {
            writeln!(out, "{}", FAIL_BANNER)?;
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExtractError, ExtractResult};
    use crate::ir::model::{Extraction, IrDocument};
    use serde_json::json;
    use tempfile::TempDir;

    fn gateway(keys: &[&str], names: &[&str]) -> impl Fn() -> ExtractResult<Extraction> {
        let ir: IrDocument = keys
            .iter()
            .map(|k| (k.to_string(), vec![json!({"kind": "property", "interface": k, "name": "x", "type": "t"})]))
            .collect();
        let interface_names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        move || Ok(Extraction { ir: ir.clone(), interface_names: interface_names.clone() })
    }

    fn failing() -> ExtractResult<Extraction> {
        Err(ExtractError::Parse { path: "lib.dom.d.ts".into(), message: "boom".into() })
    }

    #[test]
    fn extract_filters_requested_interfaces() {
        let mut out = Vec::new();
        run_extract(&gateway(&["A", "C"], &["A", "C"]), &["A".into(), "B".into()], None, &mut out).unwrap();
        let printed: IrDocument = serde_json::from_slice(&out).unwrap();
        assert_eq!(printed.keys().collect::<Vec<_>>(), vec!["A"]);
    }

    #[test]
    fn extract_prints_indented_json() {
        let mut out = Vec::new();
        run_extract(&gateway(&["A"], &["A"]), &[], None, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("{\n  \"A\": [\n    {"), "got {}", text);
    }

    #[test]
    fn extract_writes_file_and_banner() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ir.json");
        let mut out = Vec::new();
        run_extract(&gateway(&["A", "C"], &["A", "C"]), &[], Some(&path), &mut out).unwrap();

        let written: IrDocument = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(String::from_utf8(out).unwrap(), format!("✅ IR written to {}\n", path.display()));
    }

    #[test]
    fn extract_propagates_gateway_failure() {
        let mut out = Vec::new();
        let err = run_extract(&failing, &[], None, &mut out).unwrap_err();
        assert!(format!("{:#}", err).contains("boom"));
        assert!(out.is_empty());
    }

    #[test]
    fn interfaces_are_printed_sorted() {
        let mut out = Vec::new();
        run_interfaces(&gateway(&[], &["Zeta", "Alpha"]), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Alpha\nZeta\n");
    }

    #[test]
    fn validate_prints_pass_banner() {
        let input = r#"{"Foo":[{"kind":"property","interface":"Foo","name":"bar","type":"string"}]}"#;
        let mut out = Vec::new();
        let summary = run_validate(input.as_bytes(), &mut out).unwrap();
        assert_eq!(summary.entries, 1);
        assert_eq!(String::from_utf8(out).unwrap(), format!("{}\n", PASS_BANNER));
    }

    #[test]
    fn validate_prints_fail_banner_and_returns_reason() {
        let input = r#"{"Foo":[{"kind":"method","interface":"Foo","name":"bar","returnType":"void","parameters":[{"name":"x"}]}]}"#;
        let mut out = Vec::new();
        let err = run_validate(input.as_bytes(), &mut out).unwrap_err();
        assert_eq!(format!("{:#}", err), "Foo: invalid parameter 0: missing type");
        assert_eq!(String::from_utf8(out).unwrap(), format!("{}\n", FAIL_BANNER));
    }

    #[test]
    fn unknown_kind_is_reported_once() {
        let input = r#"{"A":[{"kind":"zap","interface":"A","name":"x"}]}"#;
        let err = run_validate(input.as_bytes(), &mut Vec::new()).unwrap_err();
        assert_eq!(format!("{:#}", err), "A: unknown kind zap");
    }

    #[test]
    fn decode_failure_chain_names_the_cause_once() {
        let err = run_validate("{1: []}".as_bytes(), &mut Vec::new()).unwrap_err();
        let rendered = format!("{:#}", err);
        assert!(rendered.starts_with("malformed IR document: key must be a string"), "got {}", rendered);
        assert_eq!(rendered.matches("key must be a string").count(), 1);
    }

    #[test]
    fn gateway_failure_chain_names_the_cause_once() {
        let spawn = || -> ExtractResult<Extraction> {
            Err(ExtractError::Spawn {
                program: "node".into(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            })
        };
        let err = run_interfaces(&spawn, &mut Vec::new()).unwrap_err();
        assert_eq!(format!("{:#}", err), "extraction failed: failed to start node: not found");
    }

    #[test]
    fn missing_input_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(open_input(Some(&dir.path().join("absent.json"))).is_err());
    }
}
