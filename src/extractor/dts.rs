use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use swc_common::comments::{CommentKind, Comments, SingleThreadedComments};
use swc_common::{sync::Lrc, BytePos, FileName, SourceMap, SourceMapper, Spanned};
use swc_ecma_ast::*;
use swc_ecma_parser::{Parser, StringInput, Syntax, TsConfig};
use swc_ecma_visit::{Visit, VisitWith};
use tracing::{debug, warn};

use super::Extractor;
use crate::error::{ExtractError, ExtractResult};
use crate::ir::model::{Extraction, IrDocument, IrEntry, Parameter};

static EVENT_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^on\w+").unwrap());

/// Extracts IR in process from a TypeScript declaration file such as `lib.dom.d.ts`.
#[derive(Debug, Clone)]
pub struct DtsExtractor {
    path: PathBuf,
}

impl DtsExtractor {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }
}

impl Extractor for DtsExtractor {
    fn extract(&self) -> ExtractResult<Extraction> {
        let source = std::fs::read_to_string(&self.path)
            .map_err(|source| ExtractError::Read { path: self.path.clone(), source })?;
        extract_source(&source, &self.path)
    }
}

/// Parses declaration source and collects every interface it declares.
pub fn extract_source(source: &str, path: &Path) -> ExtractResult<Extraction> {
    let cm: Lrc<SourceMap> = Default::default();
    let comments = SingleThreadedComments::default();
    let fm = cm.new_source_file(Lrc::new(FileName::Custom(path.display().to_string())), source.into());
    let syntax = Syntax::Typescript(TsConfig {
        dts: path.to_string_lossy().ends_with(".d.ts"),
        no_early_errors: true,
        ..Default::default()
    });

    let mut parser = Parser::new(syntax, StringInput::from(&*fm), Some(&comments));
    let module = parser.parse_module().map_err(|err| {
        let loc = cm.lookup_char_pos(err.span().lo);
        ExtractError::Parse {
            path: path.to_path_buf(),
            message: format!("{}:{}: {}", loc.line, loc.col_display + 1, err.kind().msg()),
        }
    })?;
    let recovered = parser.take_errors();
    if !recovered.is_empty() {
        warn!(path = %path.display(), count = recovered.len(), "recovered from syntax errors");
    }

    let mut collector = InterfaceCollector { cm: &*cm, comments: &comments, names: Vec::new(), entries: BTreeMap::new() };
    module.visit_with(&mut collector);
    debug!(
        path = %path.display(),
        interfaces = collector.names.len(),
        with_members = collector.entries.len(),
        "parsed declaration file"
    );

    let mut ir = IrDocument::new();
    for (name, entries) in collector.entries {
        let values = entries.iter().map(serde_json::to_value).collect::<Result<Vec<_>, _>>()?;
        ir.insert(name, values);
    }
    Ok(Extraction { ir, interface_names: collector.names })
}

struct InterfaceCollector<'a> {
    cm: &'a SourceMap,
    comments: &'a SingleThreadedComments,
    names: Vec<String>,
    entries: BTreeMap<String, Vec<IrEntry>>,
}

fn member_name(key: &Expr, computed: bool) -> Option<String> {
    if computed {
        return None;
    }
    match key {
        Expr::Ident(id) => Some(id.sym.to_string()),
        Expr::Lit(Lit::Str(s)) => Some(s.value.to_string()),
        _ => None,
    }
}

/// Strips JSDoc markers from a block comment body.
fn clean_doc(text: &str) -> String {
    text.lines()
        .map(|line| line.trim().trim_start_matches('*').trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

impl InterfaceCollector<'_> {
    fn type_text(&self, ann: Option<&TsTypeAnn>) -> Option<String> {
        let ann = ann?;
        self.cm.span_to_snippet(ann.type_ann.span()).ok().map(|s| s.trim().to_string())
    }

    fn doc_at(&self, pos: BytePos) -> Option<String> {
        let leading = self.comments.get_leading(pos)?;
        let doc = leading
            .iter()
            .filter(|c| c.kind == CommentKind::Block && c.text.starts_with('*'))
            .map(|c| clean_doc(&c.text))
            .filter(|d| !d.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        (!doc.is_empty()).then_some(doc)
    }

    fn method(&self, interface: &str, m: &TsMethodSignature) -> Option<IrEntry> {
        let name = member_name(&m.key, m.computed)?;
        let mut this_type = None;
        let mut parameters = Vec::new();
        for (index, param) in m.params.iter().enumerate() {
            let (name, type_ann, optional, rest) = match param {
                TsFnParam::Ident(b) => {
                    if b.id.sym.as_ref() == "this" {
                        this_type = Some(self.type_text(b.type_ann.as_deref()).unwrap_or_else(|| "any".into()));
                        continue;
                    }
                    (b.id.sym.to_string(), b.type_ann.as_deref(), b.id.optional, false)
                }
                TsFnParam::Rest(r) => match &*r.arg {
                    Pat::Ident(b) => (b.id.sym.to_string(), r.type_ann.as_deref().or(b.type_ann.as_deref()), false, true),
                    _ => (format!("arg{}", index), r.type_ann.as_deref(), false, true),
                },
                TsFnParam::Array(a) => (format!("arg{}", index), a.type_ann.as_deref(), a.optional, false),
                TsFnParam::Object(o) => (format!("arg{}", index), o.type_ann.as_deref(), o.optional, false),
            };
            parameters.push(Parameter {
                name,
                type_: self.type_text(type_ann).unwrap_or_else(|| "any".into()),
                optional,
                rest,
            });
        }
        let return_type = self.type_text(m.type_ann.as_deref()).unwrap_or_else(|| "void".into());
        Some(IrEntry::method(interface, name, parameters, return_type, this_type, self.doc_at(m.span.lo)))
    }

    fn property(&self, interface: &str, p: &TsPropertySignature) -> Option<IrEntry> {
        let name = member_name(&p.key, p.computed)?;
        let type_ = self.type_text(p.type_ann.as_deref()).unwrap_or_else(|| "any".into());
        let doc = self.doc_at(p.span.lo);
        let interface = interface.to_string();
        Some(if EVENT_NAME.is_match(&name) {
            IrEntry::Event { interface, name, type_, doc }
        } else {
            IrEntry::Property { interface, name, type_, doc }
        })
    }
}

impl Visit for InterfaceCollector<'_> {
    fn visit_ts_interface_decl(&mut self, n: &TsInterfaceDecl) {
        let interface = n.id.sym.to_string();
        if !self.names.contains(&interface) {
            self.names.push(interface.clone());
        }

        let members: Vec<IrEntry> = n
            .body
            .body
            .iter()
            .filter_map(|member| match member {
                TsTypeElement::TsMethodSignature(m) => self.method(&interface, m),
                TsTypeElement::TsPropertySignature(p) => self.property(&interface, p),
                // call, construct, index and accessor signatures carry no named member
                _ => None,
            })
            .collect();

        // declaration merging: later declarations extend the same interface
        if !members.is_empty() {
            self.entries.entry(interface).or_default().extend(members);
        }
    }
}
