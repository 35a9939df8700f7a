//! Object-graph crawling
//!
//! - `traversal` - the worklist walk, path entries and matches
//! - `filter` - by-kind, by-name, by-value and custom predicates
//! - `finder` - public search operations and root resolution
//! - `config` - finder settings and per-call options

mod config;
mod filter;
mod finder;
mod traversal;

pub use config::{CrawlOptions, FinderConfig};
pub use filter::{Callback, Candidate, Filter, KindQuery};
pub use finder::{Finder, SearchResult, UNNAMED_OBJECT};
pub use traversal::{
    Composites, CrawlStats, Label, Match, MatchSink, PathEntry, Traversal, join_path,
};
