//! Configuration types for the finder

use crate::enumerate::EnumerationMode;
use crate::heap::ObjectId;

use super::traversal::Composites;

/// Per-instance settings of a [`Finder`](super::Finder).
#[derive(Debug, Clone, Default)]
pub struct FinderConfig {
    /// Return collected matches from search operations instead of only logging them.
    pub debug: bool,
    pub mode: EnumerationMode,
    pub composites: Composites,
}

/// Per-call options of a search operation.
#[derive(Debug, Clone, Default)]
pub struct CrawlOptions {
    /// Crawl this object instead of the default roots.
    pub object: Option<ObjectId>,
    /// Display name for `object`. Ignored without `object`.
    pub path: Option<String>,
}

impl CrawlOptions {
    pub fn at(object: ObjectId) -> Self {
        Self {
            object: Some(object),
            path: None,
        }
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}
