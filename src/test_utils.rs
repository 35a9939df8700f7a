//! Fixture graphs for tests and benchmarks.
//!
//! This module is only compiled for tests and benchmarks.

use crate::heap::{Heap, ObjectId, Value};

/// A heap with a named global object to hang fixtures off.
pub struct TestGraph {
    pub heap: Heap,
    pub global: ObjectId,
}

impl TestGraph {
    pub fn new() -> Self {
        let mut heap = Heap::new();
        let global = heap.object();
        Self { heap, global }
    }

    /// Set `global.<key>`.
    pub fn add_global(&mut self, key: &str, value: Value) {
        self.heap.set(self.global, key, value);
    }

    /// Build a chain of nested plain objects, `keys[0]` outermost, ending in `leaf`.
    ///
    /// Returns the outermost object.
    pub fn chain(&mut self, keys: &[&str], leaf: Value) -> ObjectId {
        let mut value = leaf;
        let mut outer = None;
        for key in keys.iter().rev() {
            let id = self.heap.object_from([(*key, value)]);
            outer = Some(id);
            value = Value::Object(id);
        }
        outer.unwrap_or_else(|| self.heap.object())
    }
}

impl Default for TestGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// A complete tree of plain objects `depth` levels deep with `width` children
/// per object, each object also holding a numeric `leaf`.
pub fn wide_tree(heap: &mut Heap, width: usize, depth: usize) -> ObjectId {
    let root = heap.object();
    let mut level = vec![root];
    for _ in 0..depth {
        let mut next = Vec::with_capacity(level.len() * width);
        for parent in level {
            heap.set(parent, "leaf", Value::Number(parent.index() as f64));
            for i in 0..width {
                let child = heap.object();
                heap.set(parent, format!("n{}", i), Value::Object(child));
                next.push(child);
            }
        }
        level = next;
    }
    root
}

/// A layered graph where every object of one layer points at every object of
/// the next, plus a back-link to the root. Paths multiply with depth.
pub fn cross_linked(heap: &mut Heap, width: usize, layers: usize) -> ObjectId {
    let root = heap.object();
    let mut previous = vec![root];
    for layer in 0..layers {
        let current: Vec<ObjectId> = (0..width).map(|_| heap.object()).collect();
        for &parent in &previous {
            for (i, &child) in current.iter().enumerate() {
                heap.set(parent, format!("l{}_{}", layer, i), Value::Object(child));
            }
        }
        for &child in &current {
            heap.set(child, "root", Value::Object(root));
        }
        previous = current;
    }
    root
}
