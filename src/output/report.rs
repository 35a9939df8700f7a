//! Result reporter: formats matches and forwards them to a logger

use crate::crawl::{Match, MatchSink};
use crate::error::InvalidArgument;
use crate::heap::Heap;

use super::logger::{Logger, Severity};
use super::render::preview;

/// Logs each match as it arrives and keeps them for the caller.
pub struct Reporter<'a> {
    heap: &'a Heap,
    logger: &'a dyn Logger,
    matches: Vec<Match>,
}

impl<'a> Reporter<'a> {
    pub fn new(heap: &'a Heap, logger: &'a dyn Logger) -> Self {
        Self {
            heap,
            logger,
            matches: Vec::new(),
        }
    }

    pub fn report(&mut self, found: Match) {
        let detail = preview(self.heap, &found.value);
        self.logger.log(Severity::Text, &found.line(), Some(&detail));
        self.matches.push(found);
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn into_matches(self) -> Vec<Match> {
        self.matches
    }
}

impl MatchSink for Reporter<'_> {
    fn on_match(&mut self, found: Match) {
        self.report(found);
    }
}

/// Log an argument-validation failure.
pub fn report_error(logger: &dyn Logger, error: &InvalidArgument) {
    logger.log(Severity::Error, &error.to_string(), None);
}
