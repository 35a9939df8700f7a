//! Reporting matches
//!
//! - `logger` - logger collaborators (console, memory, null)
//! - `report` - formats matches and errors for a logger
//! - `render` - one-line value previews
//! - `json` - JSON output

mod json;
mod logger;
mod render;
mod report;

pub use json::{JsonMatch, print_json};
pub use logger::{ConsoleLogger, LogEntry, Logger, MemoryLogger, NullLogger, Severity};
pub use render::{preview, to_json};
pub use report::{Reporter, report_error};
