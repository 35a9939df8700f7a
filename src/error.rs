//! Error types shared across the crate

use std::io;

use thiserror::Error;

/// A search operation was handed an argument of the wrong kind.
///
/// This is the "invalid" outcome of a search: it is logged once and no
/// traversal happens, so it can never be confused with an empty result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{preview}` must be a {}", expected.join(" or "))]
pub struct InvalidArgument {
    /// Rendered preview of the rejected argument.
    pub preview: String,
    /// The kinds the operation accepts, e.g. `["function", "string"]`.
    pub expected: Vec<&'static str>,
}

/// Reading or evaluating a single property failed.
///
/// The crawler always recovers from these by skipping the property.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("getter for `{key}` failed: {reason}")]
    Getter { key: String, reason: String },

    #[error("`{0}` is not a function")]
    NotCallable(String),

    #[error("{0}")]
    Other(String),
}

/// An object refused enumeration as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnumerationError {
    #[error("object is opaque to enumeration")]
    Opaque,
}

/// Building a graph from a JSON document failed.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read graph: {0}")]
    Io(#[from] io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("graph root must be a JSON object")]
    RootNotObject,

    #[error("unknown special value `{0}`")]
    UnknownSpecial(String),

    #[error("reference `{0}` does not resolve to an object")]
    UnresolvedRef(String),

    #[error("`{key}` must be {expected}")]
    Malformed { key: &'static str, expected: &'static str },
}
