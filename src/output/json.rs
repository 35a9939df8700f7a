//! JSON output formatting

use std::io;

use serde::Serialize;

use crate::crawl::{Label, Match};
use crate::heap::Heap;

use super::render::to_json;

/// Serializable form of a [`Match`].
#[derive(Debug, Clone, Serialize)]
pub struct JsonMatch {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub back_reference: Option<String>,
    pub line: String,
    pub value: serde_json::Value,
}

impl JsonMatch {
    pub fn new(heap: &Heap, found: &Match) -> Self {
        let (kind, back_reference) = match &found.label {
            Label::Kind(kind) => (Some(kind.clone()), None),
            Label::BackRef(path) => (None, Some(path.clone())),
        };
        Self {
            path: found.path.clone(),
            kind,
            back_reference,
            line: found.line(),
            value: to_json(heap, &found.value),
        }
    }
}

/// Print matches as a pretty-printed JSON array to stdout.
pub fn print_json(heap: &Heap, matches: &[Match]) -> io::Result<()> {
    let items: Vec<JsonMatch> = matches.iter().map(|m| JsonMatch::new(heap, m)).collect();
    let json = serde_json::to_string_pretty(&items).map_err(io::Error::other)?;
    println!("{}", json);
    Ok(())
}
