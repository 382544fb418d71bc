use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Raw IR document: interface name to its entries, as decoded from JSON.
///
/// Entries stay untyped here; `ir::validate` decides whether they are well formed.
pub type IrDocument = BTreeMap<String, Vec<Value>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub optional: bool,
    pub rest: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Method,
    Property,
    Event,
}

impl EntryKind {
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "method" => Some(EntryKind::Method),
            "property" => Some(EntryKind::Property),
            "event" => Some(EntryKind::Event),
            _ => None,
        }
    }
}

/// One member of an interface, in the shape written by `extract`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum IrEntry {
    #[serde(rename_all = "camelCase")]
    Method {
        interface: String,
        name: String,
        parameters: Vec<Parameter>,
        arity: usize,
        required: usize,
        return_type: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        this_type: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        doc: Option<String>,
    },
    Property {
        interface: String,
        name: String,
        #[serde(rename = "type")]
        type_: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        doc: Option<String>,
    },
    Event {
        interface: String,
        name: String,
        #[serde(rename = "type")]
        type_: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        doc: Option<String>,
    },
}

impl IrEntry {
    /// Builds a method entry, deriving `arity` and `required` from the parameter list.
    pub fn method(
        interface: impl Into<String>,
        name: impl Into<String>,
        parameters: Vec<Parameter>,
        return_type: impl Into<String>,
        this_type: Option<String>,
        doc: Option<String>,
    ) -> Self {
        let arity = parameters.len();
        let required = parameters.iter().filter(|p| !p.optional && !p.rest).count();
        IrEntry::Method {
            interface: interface.into(),
            name: name.into(),
            parameters,
            arity,
            required,
            return_type: return_type.into(),
            this_type,
            doc,
        }
    }
}

/// What an extraction gateway hands back: the IR plus every interface it saw.
///
/// `interface_names` may list interfaces that have no key in `ir`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extraction {
    pub ir: IrDocument,
    #[serde(default)]
    pub interface_names: Vec<String>,
}
