//! Worklist-driven graph walk.
//!
//! The walk is depth-first but not recursive: pending objects sit on an
//! explicit stack, so graph depth never turns into call-stack depth.
//!
//! Cycle detection is per branch. Every [`PathEntry`] links to its parent, and
//! the chain from an entry back to its root is that branch's pool. An object
//! already in the pool is reported as a back-reference and not expanded again;
//! the same object reached through a sibling branch is expanded again.

use std::fmt;
use std::iter;
use std::ops::ControlFlow;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::enumerate::PropertyEnumerator;
use crate::environment::Root;
use crate::heap::{Class, Heap, ObjectId, Value};
use crate::kind::kind_of;

use super::filter::{Candidate, Filter};

/// Which object values the walk descends into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Composites {
    /// Only plain objects (class `Object`).
    #[default]
    Plain,
    /// Every object: arrays, functions, host objects too.
    All,
}

/// A node of the worklist: an object, the key it was reached through and its
/// ancestors.
///
/// Only the last path segment is stored; [`PathEntry::path`] rebuilds the
/// full display path from the ancestors, so a branch costs memory linear in
/// its depth.
#[derive(Debug)]
pub struct PathEntry {
    object: ObjectId,
    /// The root's display path, or the property key for other entries.
    segment: String,
    parent: Option<Rc<PathEntry>>,
}

impl PathEntry {
    /// An entry with no ancestors.
    pub fn root(object: ObjectId, path: impl Into<String>) -> Self {
        Self {
            object,
            segment: path.into(),
            parent: None,
        }
    }

    fn child(parent: &Rc<PathEntry>, object: ObjectId, key: &str) -> Self {
        Self {
            object,
            segment: key.to_string(),
            parent: Some(Rc::clone(parent)),
        }
    }

    pub fn object(&self) -> ObjectId {
        self.object
    }

    /// The dotted display path from the root to this entry.
    pub fn path(&self) -> String {
        let mut segments: Vec<&str> = self.pool().map(|entry| entry.segment.as_str()).collect();
        segments.reverse();
        let mut parts = segments.into_iter();
        let root = parts.next().unwrap_or_default().to_string();
        parts.fold(root, |path, key| join_path(&path, key))
    }

    /// This entry followed by its ancestors, up to and including the root.
    pub fn pool(&self) -> impl Iterator<Item = &PathEntry> {
        iter::successors(Some(self), |entry| entry.parent.as_deref())
    }

    /// The pooled entry holding `object`, if any.
    pub fn pooled(&self, object: ObjectId) -> Option<&PathEntry> {
        self.pool().find(|entry| entry.object == object)
    }

    pub fn depth(&self) -> usize {
        self.pool().count() - 1
    }
}

impl Drop for PathEntry {
    fn drop(&mut self) {
        // unlink ancestors in a loop so long branches never recurse
        let mut next = self.parent.take();
        while let Some(parent) = next {
            next = match Rc::try_unwrap(parent) {
                Ok(mut entry) => entry.parent.take(),
                Err(_) => None,
            };
        }
    }
}

/// Build the display path of `key` under `path`.
pub fn join_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

/// What a match shows in parentheses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Label {
    /// Lowercased kind of the matched value.
    Kind(String),
    /// Path of the ancestor the value points back to.
    BackRef(String),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Kind(kind) => f.write_str(kind),
            Label::BackRef(path) => write!(f, "<{}>", path),
        }
    }
}

/// One reported hit.
#[derive(Debug, Clone)]
pub struct Match {
    pub path: String,
    pub label: Label,
    pub value: Value,
}

impl Match {
    /// `"<path> -> (<kind-or-backref>)"`
    pub fn line(&self) -> String {
        format!("{} -> ({})", self.path, self.label)
    }

    pub fn is_back_reference(&self) -> bool {
        matches!(self.label, Label::BackRef(_))
    }
}

/// Receives matches as the walk finds them.
pub trait MatchSink {
    fn on_match(&mut self, found: Match);
}

impl MatchSink for Vec<Match> {
    fn on_match(&mut self, found: Match) {
        self.push(found);
    }
}

/// Counters gathered over one crawl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStats {
    pub roots: usize,
    pub expanded: usize,
    pub properties: usize,
    pub back_references: usize,
    /// Properties whose filter evaluation failed.
    pub skipped: usize,
    /// Objects that refused enumeration.
    pub opaque: usize,
    pub matches: usize,
}

/// The traversal engine.
pub struct Traversal<'a> {
    heap: &'a Heap,
    enumerator: &'a dyn PropertyEnumerator,
    global: Option<ObjectId>,
    composites: Composites,
}

impl<'a> Traversal<'a> {
    pub fn new(
        heap: &'a Heap,
        enumerator: &'a dyn PropertyEnumerator,
        global: Option<ObjectId>,
        composites: Composites,
    ) -> Self {
        Self {
            heap,
            enumerator,
            global,
            composites,
        }
    }

    /// Crawl every root, last one first, feeding matches to `sink`.
    pub fn run(&self, filter: &Filter, roots: &[Root], sink: &mut dyn MatchSink) -> CrawlStats {
        let mut stats = CrawlStats::default();
        let mut pending: Vec<&Root> = roots.iter().collect();

        while let Some(root) = pending.pop() {
            stats.roots += 1;
            debug!(root = %root.path, "crawling root");

            let mut worklist = vec![Rc::new(PathEntry::root(root.object, root.path.as_str()))];
            while let Some(entry) = worklist.pop() {
                self.expand(&entry, filter, &mut worklist, sink, &mut stats);
            }
        }

        debug!(
            roots = stats.roots,
            objects = stats.expanded,
            properties = stats.properties,
            matches = stats.matches,
            skipped = stats.skipped,
            "crawl done"
        );
        stats
    }

    fn is_traversable(&self, id: ObjectId) -> bool {
        match self.composites {
            Composites::Plain => self.heap.get(id).class == Class::Object,
            Composites::All => true,
        }
    }

    fn expand(
        &self,
        entry: &Rc<PathEntry>,
        filter: &Filter,
        worklist: &mut Vec<Rc<PathEntry>>,
        sink: &mut dyn MatchSink,
        stats: &mut CrawlStats,
    ) {
        stats.expanded += 1;
        // built on first use, most objects produce no match
        let mut owner_path: Option<String> = None;

        let result = self
            .enumerator
            .for_own_properties(self.heap, entry.object, &mut |key, value| {
                stats.properties += 1;

                let mut pooled = None;
                if let Value::Object(id) = value {
                    if self.is_traversable(id) {
                        match entry.pooled(id) {
                            Some(ancestor) => pooled = Some(ancestor),
                            None => worklist.push(Rc::new(PathEntry::child(entry, id, key))),
                        }
                    }
                }

                let candidate = Candidate {
                    heap: self.heap,
                    value: &value,
                    key,
                    owner: entry.object,
                    entry: entry.as_ref(),
                    global: self.global,
                };
                match filter.matches(&candidate) {
                    Ok(true) => {
                        let label = match pooled {
                            Some(ancestor) => {
                                stats.back_references += 1;
                                Label::BackRef(ancestor.path())
                            }
                            None => Label::Kind(kind_of(self.heap, &value, self.global).label()),
                        };
                        let owner = owner_path.get_or_insert_with(|| entry.path());
                        let path = join_path(owner, key);
                        stats.matches += 1;
                        sink.on_match(Match { path, label, value });
                    }
                    Ok(false) => {}
                    Err(e) => {
                        stats.skipped += 1;
                        trace!(key, error = %e, "filter failed, skipping property");
                    }
                }
                ControlFlow::Continue(())
            });

        if let Err(e) = result {
            stats.opaque += 1;
            debug!(path = %entry.path(), error = %e, "treating object as empty");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enumerate::OwnProperties;

    fn crawl(heap: &Heap, root: ObjectId, path: &str, filter: &Filter) -> Vec<String> {
        let enumerator = OwnProperties::default();
        let traversal = Traversal::new(heap, &enumerator, None, Composites::Plain);
        let mut found = Vec::new();
        traversal.run(filter, &[Root::new(root, path)], &mut found);
        found.iter().map(Match::line).collect()
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("", "a"), "a");
        assert_eq!(join_path("<path>", "a"), "<path>.a");
    }

    #[test]
    fn test_pool_runs_to_root() {
        let mut heap = Heap::new();
        let a = heap.object();
        let b = heap.object();
        let root = Rc::new(PathEntry::root(a, "r"));
        let child = PathEntry::child(&root, b, "b");
        let paths: Vec<_> = child.pool().map(PathEntry::path).collect();
        assert_eq!(paths, vec!["r.b", "r"]);
        assert_eq!(child.depth(), 1);
        assert_eq!(child.pooled(a).map(PathEntry::path).as_deref(), Some("r"));
    }

    #[test]
    fn test_end_to_end_nested() {
        let mut heap = Heap::new();
        let b = heap.object_from([("c", Value::from(12))]);
        let a = heap.object_from([("b", Value::Object(b))]);
        let root = heap.object_from([("a", Value::Object(a))]);

        let filter = Filter::Name("c".into());
        assert_eq!(crawl(&heap, root, "", &filter), vec!["a.b.c -> (number)"]);
    }

    #[test]
    fn test_cycle_reports_back_reference() {
        let mut heap = Heap::new();
        let c = heap.object();
        let b = heap.object_from([("c", Value::Object(c))]);
        let a = heap.object_from([("b", Value::Object(b))]);
        heap.set(c, "a", Value::Object(a));
        let root = heap.object_from([("a", Value::Object(a))]);

        let filter = Filter::Name("a".into());
        assert_eq!(
            crawl(&heap, root, "root", &filter),
            vec!["root.a -> (object)", "root.a.b.c.a -> (<root.a>)"]
        );
    }

    #[test]
    fn test_cycle_to_root() {
        let mut heap = Heap::new();
        let root = heap.object();
        heap.set(root, "me", Value::Object(root));
        let filter = Filter::Name("me".into());
        assert_eq!(crawl(&heap, root, "g", &filter), vec!["g.me -> (<g>)"]);
    }

    #[test]
    fn test_siblings_expand_shared_object_independently() {
        let mut heap = Heap::new();
        let shared = heap.object_from([("z", Value::from(1))]);
        let foo = heap.object_from([("x", Value::Object(shared))]);
        let bar = heap.object_from([("x", Value::Object(shared))]);
        let root = heap.object_from([("foo", Value::Object(foo)), ("bar", Value::Object(bar))]);

        let filter = Filter::Name("z".into());
        // last discovered sibling is expanded first
        assert_eq!(
            crawl(&heap, root, "root", &filter),
            vec!["root.bar.x.z -> (number)", "root.foo.x.z -> (number)"]
        );
    }

    #[test]
    fn test_depth_first_order() {
        let mut heap = Heap::new();
        let c = heap.object_from([("foo", Value::from(12))]);
        let inner = heap.object_from([("c", Value::Object(c))]);
        let b = heap.object_from([("foo", Value::Object(inner))]);
        let foo = heap.object_from([("b", Value::Object(b))]);
        let a = heap.object_from([("foo", Value::Object(foo))]);
        let root = heap.object_from([("a", Value::Object(a))]);

        let filter = Filter::Name("foo".into());
        assert_eq!(
            crawl(&heap, root, "g", &filter),
            vec![
                "g.a.foo -> (object)",
                "g.a.foo.b.foo -> (object)",
                "g.a.foo.b.foo.c.foo -> (number)",
            ]
        );
    }

    #[test]
    fn test_plain_mode_does_not_enter_arrays() {
        let mut heap = Heap::new();
        let inner = heap.object_from([("z", Value::from(1))]);
        let arr = heap.array([Value::Object(inner)]);
        let root = heap.object_from([("list", Value::Object(arr))]);

        let filter = Filter::Name("z".into());
        assert!(crawl(&heap, root, "r", &filter).is_empty());

        let enumerator = OwnProperties::default();
        let traversal = Traversal::new(&heap, &enumerator, None, Composites::All);
        let mut found = Vec::new();
        traversal.run(&filter, &[Root::new(root, "r")], &mut found);
        assert_eq!(
            found.iter().map(Match::line).collect::<Vec<_>>(),
            vec!["r.list.0.z -> (number)"]
        );
    }

    #[test]
    fn test_failing_filter_skips_only_that_property() {
        let mut heap = Heap::new();
        let root = heap.object_from([("bad", Value::from(1)), ("good", Value::from(2))]);
        let filter = Filter::custom_fn(|cx| {
            if cx.key == "bad" {
                Err(crate::error::AccessError::Other("boom".into()))
            } else {
                Ok(true)
            }
        });
        let enumerator = OwnProperties::default();
        let traversal = Traversal::new(&heap, &enumerator, None, Composites::Plain);
        let mut found = Vec::new();
        let stats = traversal.run(&filter, &[Root::new(root, "r")], &mut found);
        assert_eq!(
            found.iter().map(Match::line).collect::<Vec<_>>(),
            vec!["r.good -> (number)"]
        );
        assert_eq!(stats.skipped, 1);
    }

    #[test]
    fn test_opaque_object_counts_as_empty() {
        let mut heap = Heap::new();
        let hostile = heap.object();
        heap.get_mut(hostile).opaque = true;
        let root = heap.object_from([("h", Value::Object(hostile)), ("n", Value::from(1))]);

        let enumerator = OwnProperties::default();
        let traversal = Traversal::new(&heap, &enumerator, None, Composites::Plain);
        let mut found = Vec::new();
        let filter = Filter::Kind(crate::crawl::KindQuery::Any);
        let stats = traversal.run(&filter, &[Root::new(root, "r")], &mut found);
        assert_eq!(found.len(), 2);
        assert_eq!(stats.opaque, 1);
    }

    #[test]
    fn test_roots_crawled_last_first() {
        let mut heap = Heap::new();
        let first = heap.object_from([("x", Value::from(1))]);
        let second = heap.object_from([("x", Value::from(2))]);
        let enumerator = OwnProperties::default();
        let traversal = Traversal::new(&heap, &enumerator, None, Composites::Plain);
        let mut found = Vec::new();
        let roots = [Root::new(first, "exports"), Root::new(second, "global")];
        traversal.run(&Filter::Name("x".into()), &roots, &mut found);
        assert_eq!(
            found.iter().map(Match::line).collect::<Vec<_>>(),
            vec!["global.x -> (number)", "exports.x -> (number)"]
        );
    }

    #[test]
    fn test_deep_chain_does_not_exhaust_stack() {
        const DEPTH: usize = 25_000;
        let mut heap = Heap::new();
        let root = heap.object();
        let mut current = root;
        for _ in 0..DEPTH {
            let next = heap.object();
            heap.set(current, "k", Value::Object(next));
            current = next;
        }
        heap.set(current, "end", Value::from(1));

        let enumerator = OwnProperties::default();
        let traversal = Traversal::new(&heap, &enumerator, None, Composites::Plain);
        let mut found = Vec::new();
        let stats = traversal.run(&Filter::Name("end".into()), &[Root::new(root, "")], &mut found);

        assert_eq!(stats.expanded, DEPTH + 1);
        assert_eq!(found.len(), 1);
        assert!(found[0].path.ends_with("k.k.end"));
        assert_eq!(found[0].path.len(), DEPTH * 2 + 3);
    }

    #[test]
    fn test_dropping_long_branch_is_iterative() {
        let mut heap = Heap::new();
        let object = heap.object();
        let mut entry = Rc::new(PathEntry::root(object, "r"));
        for _ in 0..100_000 {
            entry = Rc::new(PathEntry::child(&entry, object, "k"));
        }
        assert_eq!(entry.depth(), 100_000);
        drop(entry);
    }
}
