//! Own-property enumeration
//!
//! The crawler never reads object internals directly: every property it sees
//! comes through a [`PropertyEnumerator`]. The stock implementation,
//! [`OwnProperties`], walks an object's own properties in insertion order.

use std::ops::ControlFlow;

use tracing::trace;

use crate::error::EnumerationError;
use crate::heap::{Heap, ObjectId, Value};

/// Which own properties an enumerator yields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EnumerationMode {
    /// Every own property, enumerable or not.
    #[default]
    AllOwn,
    /// Only enumerable own properties.
    EnumerableOnly,
}

/// Capability boundary between the crawler and the host object model.
pub trait PropertyEnumerator {
    /// Visit the own properties of `object` as `(key, value)` pairs.
    ///
    /// Properties whose read fails are skipped. Returning
    /// [`ControlFlow::Break`] from `visit` stops enumeration immediately.
    /// An `Err` means the object could not be enumerated at all.
    fn for_own_properties(
        &self,
        heap: &Heap,
        object: ObjectId,
        visit: &mut dyn FnMut(&str, Value) -> ControlFlow<()>,
    ) -> Result<(), EnumerationError>;
}

/// Insertion-ordered enumeration of an object's own properties.
///
/// A function's `prototype` property is never yielded.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnProperties {
    mode: EnumerationMode,
}

impl OwnProperties {
    pub fn new(mode: EnumerationMode) -> Self {
        Self { mode }
    }
}

impl PropertyEnumerator for OwnProperties {
    fn for_own_properties(
        &self,
        heap: &Heap,
        object: ObjectId,
        visit: &mut dyn FnMut(&str, Value) -> ControlFlow<()>,
    ) -> Result<(), EnumerationError> {
        let target = heap.get(object);
        if target.opaque {
            return Err(EnumerationError::Opaque);
        }
        let skip_proto = target.is_function();

        for property in &target.properties {
            if self.mode == EnumerationMode::EnumerableOnly && !property.enumerable {
                continue;
            }
            if skip_proto && property.key == "prototype" {
                continue;
            }
            let value = match property.read(heap) {
                Ok(v) => v,
                Err(e) => {
                    trace!(key = %property.key, error = %e, "skipping unreadable property");
                    continue;
                }
            };
            if visit(&property.key, value).is_break() {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AccessError;
    use crate::heap::{Getter, Property};

    fn keys(enumerator: &OwnProperties, heap: &Heap, id: ObjectId) -> Vec<String> {
        let mut keys = Vec::new();
        enumerator
            .for_own_properties(heap, id, &mut |key, _| {
                keys.push(key.to_string());
                ControlFlow::Continue(())
            })
            .unwrap();
        keys
    }

    #[test]
    fn test_insertion_order() {
        let mut heap = Heap::new();
        let id = heap.object_from([("b", Value::from(1)), ("a", Value::from(2))]);
        assert_eq!(keys(&OwnProperties::default(), &heap, id), vec!["b", "a"]);
    }

    #[test]
    fn test_mode_controls_hidden_properties() {
        let mut heap = Heap::new();
        let arr = heap.array([Value::from(1)]);
        assert_eq!(
            keys(&OwnProperties::new(EnumerationMode::AllOwn), &heap, arr),
            vec!["0", "length"]
        );
        assert_eq!(
            keys(&OwnProperties::new(EnumerationMode::EnumerableOnly), &heap, arr),
            vec!["0"]
        );
    }

    #[test]
    fn test_skips_function_prototype() {
        let mut heap = Heap::new();
        let f = heap.function();
        heap.set(f, "helper", Value::from(1));
        heap.define(f, Property::data("prototype", Value::Null));
        assert_eq!(keys(&OwnProperties::default(), &heap, f), vec!["helper"]);
    }

    #[test]
    fn test_prototype_key_kept_on_plain_objects() {
        let mut heap = Heap::new();
        let o = heap.object_from([("prototype", Value::from(1))]);
        assert_eq!(keys(&OwnProperties::default(), &heap, o), vec!["prototype"]);
    }

    #[test]
    fn test_skips_throwing_getter() {
        let mut heap = Heap::new();
        let o = heap.object();
        heap.set(o, "before", Value::from(1));
        heap.define(
            o,
            Property::accessor("bad", Getter::new(|_| Err(AccessError::Other("nope".into())))),
        );
        heap.set(o, "after", Value::from(2));
        assert_eq!(keys(&OwnProperties::default(), &heap, o), vec!["before", "after"]);
    }

    #[test]
    fn test_break_stops_enumeration() {
        let mut heap = Heap::new();
        let o = heap.object_from([
            ("a", Value::from(1)),
            ("b", Value::from(2)),
            ("c", Value::from(3)),
        ]);
        let mut seen = Vec::new();
        OwnProperties::default()
            .for_own_properties(&heap, o, &mut |key, _| {
                seen.push(key.to_string());
                if key == "b" {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .unwrap();
        assert_eq!(seen, vec!["a", "b"]);
    }

    #[test]
    fn test_opaque_object_fails() {
        let mut heap = Heap::new();
        let o = heap.object();
        heap.get_mut(o).opaque = true;
        let result = OwnProperties::default().for_own_properties(&heap, o, &mut |_, _| {
            ControlFlow::Continue(())
        });
        assert_eq!(result, Err(EnumerationError::Opaque));
    }
}
