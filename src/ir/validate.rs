use serde_json::{Map, Value};
use std::io::Read;

use super::model::{EntryKind, IrDocument};
use crate::error::{EntryError, ParameterDefect, ValidationError};

/// Borrowed view of an entry that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckedEntry<'a> {
    pub kind: EntryKind,
    pub interface: &'a str,
    pub name: &'a str,
}

/// Counts reported for a document that passed validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentSummary {
    pub interfaces: usize,
    pub entries: usize,
}

fn str_field<'a>(record: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    record.get(field).and_then(Value::as_str)
}

fn required_str<'a>(record: &'a Map<String, Value>, field: &'static str) -> Result<&'a str, EntryError> {
    str_field(record, field)
        .filter(|s| !s.is_empty())
        .ok_or(EntryError::MissingField(field))
}

fn check_parameter(value: &Value) -> Result<(), ParameterDefect> {
    let record = value.as_object().ok_or(ParameterDefect::NotARecord)?;
    str_field(record, "name").ok_or(ParameterDefect::MissingName)?;
    str_field(record, "type").ok_or(ParameterDefect::MissingType)?;
    Ok(())
}

/// Checks one decoded entry against the shape required by its `kind`.
///
/// Stops at the first violation. `kind`, `interface` and `name` are checked
/// before the kind-specific fields, so an entry with an unknown kind but no
/// name reports the missing name.
pub fn validate_entry(record: &Map<String, Value>) -> Result<CheckedEntry<'_>, EntryError> {
    let kind = str_field(record, "kind").ok_or(EntryError::MissingField("kind"))?;
    let interface = required_str(record, "interface")?;
    let name = required_str(record, "name")?;

    let kind = EntryKind::parse(kind).ok_or_else(|| EntryError::UnknownKind(kind.to_string()))?;
    match kind {
        EntryKind::Method => {
            str_field(record, "returnType").ok_or(EntryError::MissingField("returnType"))?;
            let parameters = record
                .get("parameters")
                .and_then(Value::as_array)
                .ok_or(EntryError::MissingField("parameters"))?;
            for (index, parameter) in parameters.iter().enumerate() {
                check_parameter(parameter).map_err(|defect| EntryError::InvalidParameter { index, defect })?;
            }
        }
        EntryKind::Property | EntryKind::Event => {
            str_field(record, "type").ok_or(EntryError::MissingField("type"))?;
        }
    }

    Ok(CheckedEntry { kind, interface, name })
}

/// Validates every entry of a document, interfaces in key order.
///
/// Reports only the first failure, tagged with the interface it belongs to.
pub fn validate_document(document: &IrDocument) -> Result<DocumentSummary, ValidationError> {
    let mut summary = DocumentSummary::default();
    for (interface, entries) in document {
        for (index, entry) in entries.iter().enumerate() {
            let record = entry.as_object().ok_or_else(|| ValidationError::InvalidEntry {
                interface: interface.clone(),
                index,
            })?;
            validate_entry(record).map_err(|reason| ValidationError::Entry {
                interface: interface.clone(),
                index,
                reason,
            })?;
            summary.entries += 1;
        }
        summary.interfaces += 1;
    }
    Ok(summary)
}

/// Decodes a complete JSON document from `reader` and validates it.
pub fn validate_reader<R: Read>(reader: R) -> Result<DocumentSummary, ValidationError> {
    let document: IrDocument = serde_json::from_reader(reader)?;
    validate_document(&document)
}

pub fn validate_str(input: &str) -> Result<DocumentSummary, ValidationError> {
    let document: IrDocument = serde_json::from_str(input)?;
    validate_document(&document)
}
