//! Finder - the public search operations

use std::rc::Rc;

use crate::enumerate::OwnProperties;
use crate::environment::{EnvironmentResolver, Root};
use crate::error::{AccessError, InvalidArgument};
use crate::heap::{Heap, Value};
use crate::output::{ConsoleLogger, Logger, Reporter, report_error};

use super::config::{CrawlOptions, FinderConfig};
use super::filter::{Candidate, Filter};
use super::traversal::{Match, Traversal};

/// Placeholder path for a caller-supplied object that is not a default root.
pub const UNNAMED_OBJECT: &str = "<object>";

/// Result of a search operation.
///
/// `Ok(Some(..))` in debug mode, `Ok(None)` otherwise. `Err` is the
/// invalid-argument outcome, returned in both modes.
pub type SearchResult = Result<Option<Vec<Match>>, InvalidArgument>;

/// Searches a heap for properties, starting from an environment's roots.
///
/// Each instance carries its own roots, logger and settings; nothing is
/// shared through process-wide state.
pub struct Finder<'h> {
    heap: &'h Heap,
    environment: Rc<dyn EnvironmentResolver>,
    logger: Rc<dyn Logger>,
    config: FinderConfig,
}

impl<'h> Finder<'h> {
    /// A finder logging to the console.
    pub fn new(heap: &'h Heap, environment: impl EnvironmentResolver + 'static) -> Self {
        Self {
            heap,
            environment: Rc::new(environment),
            logger: Rc::new(ConsoleLogger::default()),
            config: FinderConfig::default(),
        }
    }

    pub fn with_logger(mut self, logger: Rc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_config(mut self, config: FinderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.config.debug = debug;
    }

    /// An independent finder bound to another environment.
    ///
    /// Shares the heap, logger and settings; `self` is left untouched.
    pub fn in_context(&self, environment: impl EnvironmentResolver + 'static) -> Finder<'h> {
        Finder {
            heap: self.heap,
            environment: Rc::new(environment),
            logger: Rc::clone(&self.logger),
            config: self.config.clone(),
        }
    }

    /// Properties whose values are instances of a constructor, or whose
    /// kind, class or `typeof` equals a name. `"*"` matches everything.
    pub fn by_kind(&self, kind: impl Into<Value>, options: &CrawlOptions) -> SearchResult {
        let filter = Filter::by_kind(self.heap, &kind.into());
        self.checked(filter, options)
    }

    /// Properties with exactly this key.
    pub fn by_name(&self, name: impl Into<Value>, options: &CrawlOptions) -> SearchResult {
        let filter = Filter::by_name(self.heap, &name.into());
        self.checked(filter, options)
    }

    /// Properties holding this value (SameValueZero).
    pub fn by_value(&self, value: impl Into<Value>, options: &CrawlOptions) -> SearchResult {
        self.checked(Ok(Filter::by_value(value.into())), options)
    }

    /// Properties for which the heap function `callback` returns a truthy
    /// value when called as `callback(value, key, owner)`.
    pub fn custom(&self, callback: impl Into<Value>, options: &CrawlOptions) -> SearchResult {
        let filter = Filter::custom(self.heap, &callback.into());
        self.checked(filter, options)
    }

    /// Properties accepted by a Rust predicate.
    pub fn custom_fn<F>(&self, predicate: F, options: &CrawlOptions) -> SearchResult
    where
        F: Fn(&Candidate<'_>) -> Result<bool, AccessError> + 'static,
    {
        self.checked(Ok(Filter::custom_fn(predicate)), options)
    }

    /// Crawl with a ready-made filter and always return the matches.
    ///
    /// Matches are still reported to the logger as they are found.
    pub fn crawl(&self, filter: &Filter, options: &CrawlOptions) -> Vec<Match> {
        let roots = self.resolve_roots(options);
        let enumerator = OwnProperties::new(self.config.mode);
        let traversal = Traversal::new(
            self.heap,
            &enumerator,
            self.environment.global(),
            self.config.composites,
        );

        let mut reporter = Reporter::new(self.heap, self.logger.as_ref());
        traversal.run(filter, &roots, &mut reporter);
        reporter.into_matches()
    }

    /// The roots a crawl with `options` starts from.
    pub fn resolve_roots(&self, options: &CrawlOptions) -> Vec<Root> {
        match options.object {
            Some(object) => {
                let path = options
                    .path
                    .clone()
                    .or_else(|| self.environment.name_of(object))
                    .unwrap_or_else(|| UNNAMED_OBJECT.to_string());
                vec![Root::new(object, path)]
            }
            None => self.environment.roots(),
        }
    }

    fn checked(
        &self,
        filter: Result<Filter, InvalidArgument>,
        options: &CrawlOptions,
    ) -> SearchResult {
        match filter {
            Ok(filter) => {
                let matches = self.crawl(&filter, options);
                Ok(self.config.debug.then_some(matches))
            }
            Err(invalid) => {
                report_error(self.logger.as_ref(), &invalid);
                Err(invalid)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use crate::heap::NativeFn;
    use crate::output::{MemoryLogger, Severity};

    struct Setup {
        heap: Heap,
        global: crate::heap::ObjectId,
    }

    impl Setup {
        fn new() -> Self {
            let mut heap = Heap::new();
            let global = heap.object();
            Self { heap, global }
        }

        fn finder(&self, logger: Rc<MemoryLogger>) -> Finder<'_> {
            let mut finder = Finder::new(&self.heap, Environment::new(self.global, "window"))
                .with_logger(logger);
            finder.set_debug(true);
            finder
        }
    }

    fn lines(result: SearchResult) -> Vec<String> {
        result.unwrap().unwrap().iter().map(Match::line).collect()
    }

    #[test]
    fn test_path_options() {
        let mut s = Setup::new();
        let b = s.heap.object_from([("c", Value::from(12))]);
        let inner = s.heap.object_from([("b", Value::Object(b))]);
        let a = s.heap.object_from([("a", Value::Object(inner))]);
        let logger = Rc::new(MemoryLogger::new());
        let finder = s.finder(logger);

        let named = finder.by_name("a", &CrawlOptions::at(a).path("<path>"));
        assert_eq!(lines(named), vec!["<path>.a -> (object)"]);

        let empty = finder.by_name("a", &CrawlOptions::at(a).path(""));
        assert_eq!(lines(empty), vec!["a -> (object)"]);

        let unnamed = finder.by_name("a", &CrawlOptions::at(a));
        assert_eq!(lines(unnamed), vec!["<object>.a -> (object)"]);
    }

    #[test]
    fn test_default_root_name_inferred() {
        let mut s = Setup::new();
        let child = s.heap.object();
        s.heap.set(s.global, "a", Value::Object(child));
        let finder = s.finder(Rc::new(MemoryLogger::new()));

        let result = finder.by_name("a", &CrawlOptions::at(s.global));
        assert_eq!(lines(result), vec!["window.a -> (object)"]);
    }

    #[test]
    fn test_invalid_argument_short_circuits() {
        let mut s = Setup::new();
        s.heap.set(s.global, "x", Value::from(12));
        let logger = Rc::new(MemoryLogger::new());
        let finder = s.finder(Rc::clone(&logger));

        let err = finder.by_name(12, &CrawlOptions::default()).unwrap_err();
        assert_eq!(err.expected, vec!["string"]);
        assert!(logger.messages(Severity::Text).is_empty());
        assert_eq!(logger.messages(Severity::Error), vec!["`12` must be a string"]);
    }

    #[test]
    fn test_invalid_argument_reported_outside_debug() {
        let s = Setup::new();
        let logger = Rc::new(MemoryLogger::new());
        let mut finder = s.finder(Rc::clone(&logger));
        finder.set_debug(false);

        assert!(finder.custom("type", &CrawlOptions::default()).is_err());
        assert_eq!(logger.messages(Severity::Error).len(), 1);
    }

    #[test]
    fn test_quiet_mode_logs_but_returns_nothing() {
        let mut s = Setup::new();
        s.heap.set(s.global, "c", Value::from(1));
        let logger = Rc::new(MemoryLogger::new());
        let mut finder = s.finder(Rc::clone(&logger));
        finder.set_debug(false);

        let result = finder.by_name("c", &CrawlOptions::default());
        assert!(matches!(result, Ok(None)));
        assert_eq!(logger.messages(Severity::Text), vec!["window.c -> (number)"]);
        assert_eq!(logger.entries()[0].detail.as_deref(), Some("1"));
    }

    #[test]
    fn test_custom_heap_function() {
        let mut s = Setup::new();
        s.heap.set(s.global, "zero", Value::from(0));
        s.heap.set(s.global, "one", Value::from(1));
        let falsy = s
            .heap
            .native_function(NativeFn::new(|_, args| Ok(Value::Bool(!args[0].is_truthy()))));
        let finder = s.finder(Rc::new(MemoryLogger::new()));

        let result = finder.custom(falsy, &CrawlOptions::at(s.global));
        assert_eq!(lines(result), vec!["window.zero -> (number)"]);
    }

    #[test]
    fn test_in_context_is_independent() {
        let mut s = Setup::new();
        let sandbox = s.heap.object_from([("v", Value::from(1))]);
        s.heap.set(s.global, "v", Value::from(2));
        let finder = s.finder(Rc::new(MemoryLogger::new()));
        let sandboxed = finder.in_context(Environment::new(sandbox, "sandbox"));

        let inner = sandboxed.by_name("v", &CrawlOptions::default());
        assert_eq!(lines(inner), vec!["sandbox.v -> (number)"]);
        let outer = finder.by_name("v", &CrawlOptions::default());
        assert_eq!(lines(outer), vec!["window.v -> (number)"]);
    }

    #[test]
    fn test_global_kind_reported() {
        let mut s = Setup::new();
        s.heap.set(s.global, "window", Value::Object(s.global));
        let holder = s.heap.object_from([("g", Value::Object(s.global))]);
        let finder = s.finder(Rc::new(MemoryLogger::new()));

        // reached from outside the global root: classified, not pooled
        let result = finder.by_name("g", &CrawlOptions::at(holder).path("h"));
        assert_eq!(lines(result), vec!["h.g -> (global)"]);

        // the global pointing at itself closes a cycle
        let result = finder.by_name("window", &CrawlOptions::default());
        assert_eq!(lines(result), vec!["window.window -> (<window>)"]);
    }
}
