//! Waldo - find where things live in a tangled object graph

pub mod crawl;
pub mod enumerate;
pub mod environment;
pub mod error;
pub mod heap;
pub mod kind;
pub mod load;
pub mod output;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use crawl::{CrawlOptions, Filter, Finder, FinderConfig, Match, SearchResult};
pub use enumerate::{EnumerationMode, OwnProperties, PropertyEnumerator};
pub use environment::{Environment, EnvironmentResolver, Root};
pub use error::{AccessError, EnumerationError, InvalidArgument, LoadError};
pub use heap::{Heap, ObjectId, Value};
pub use kind::{Kind, kind_of};
pub use output::{ConsoleLogger, Logger, MemoryLogger, NullLogger, Severity, print_json};
