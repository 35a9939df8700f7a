//! Build a heap graph from a JSON document
//!
//! Plain JSON maps onto plain objects, arrays and primitives. A few reserved
//! keys describe what JSON alone cannot:
//!
//! - `{"$ref": "a.b"}` is the object at dotted path `a.b` from the document
//!   root (`""` is the root). Refs create shared references and cycles.
//! - `"$class"` on an object sets its class tag; `"Function"` makes a
//!   function whose `"prototype"` member becomes its prototype object.
//! - `"$proto"` on an object is a ref path to its prototype.
//! - `{"$special": "undefined" | "NaN" | "Infinity" | "-Infinity"}`.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value as Json};

use crate::error::LoadError;
use crate::heap::{Class, Heap, Object, ObjectId, Property, Value};

const REF: &str = "$ref";
const CLASS: &str = "$class";
const PROTO: &str = "$proto";
const SPECIAL: &str = "$special";

/// Where a ref's target must be written once resolved.
enum Hole {
    Property { owner: ObjectId, key: String },
    Proto { owner: ObjectId },
}

struct PendingRef {
    hole: Hole,
    path: String,
}

/// Read and load a JSON graph file. Returns the root object.
pub fn load_file(heap: &mut Heap, path: &Path) -> Result<ObjectId, LoadError> {
    let text = fs::read_to_string(path)?;
    load_str(heap, &text)
}

pub fn load_str(heap: &mut Heap, text: &str) -> Result<ObjectId, LoadError> {
    let doc: Json = serde_json::from_str(text)?;
    load(heap, &doc)
}

/// Load a parsed document. The root must be a JSON object.
pub fn load(heap: &mut Heap, doc: &Json) -> Result<ObjectId, LoadError> {
    let Json::Object(map) = doc else {
        return Err(LoadError::RootNotObject);
    };
    if map.contains_key(REF) || map.contains_key(SPECIAL) {
        return Err(LoadError::RootNotObject);
    }

    let mut loader = Loader {
        heap,
        pending: Vec::new(),
    };
    let root = loader.object(map)?;
    loader.resolve(root)?;
    Ok(root)
}

struct Loader<'a> {
    heap: &'a mut Heap,
    pending: Vec<PendingRef>,
}

impl Loader<'_> {
    /// Convert a member value. `None` means it is a ref, recorded for later.
    fn member(
        &mut self,
        owner: ObjectId,
        key: &str,
        json: &Json,
    ) -> Result<Option<Value>, LoadError> {
        let value = match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            Json::String(s) => Value::String(s.clone()),
            Json::Array(items) => Value::Object(self.array(items)?),
            Json::Object(map) => {
                for reserved in [REF, SPECIAL] {
                    if map.contains_key(reserved) && map.len() > 1 {
                        return Err(LoadError::Malformed {
                            key: reserved,
                            expected: "the only key of its object",
                        });
                    }
                }
                if let Some(target) = map.get(REF) {
                    let path = target.as_str().ok_or(LoadError::Malformed {
                        key: REF,
                        expected: "a path string",
                    })?;
                    self.pending.push(PendingRef {
                        hole: Hole::Property {
                            owner,
                            key: key.to_string(),
                        },
                        path: path.to_string(),
                    });
                    return Ok(None);
                }
                if let Some(special) = map.get(SPECIAL) {
                    return special_value(special).map(Some);
                }
                Value::Object(self.object(map)?)
            }
        };
        Ok(Some(value))
    }

    fn object(&mut self, map: &Map<String, Json>) -> Result<ObjectId, LoadError> {
        let class = match map.get(CLASS) {
            None => Class::Object,
            Some(Json::String(tag)) => Class::from_tag(tag),
            Some(_) => {
                return Err(LoadError::Malformed {
                    key: CLASS,
                    expected: "a class name string",
                });
            }
        };

        let id = if class == Class::Function {
            self.heap.function()
        } else {
            self.heap.alloc(Object::new(class.clone()))
        };

        if let Some(proto) = map.get(PROTO) {
            let path = proto.as_str().ok_or(LoadError::Malformed {
                key: PROTO,
                expected: "a path string",
            })?;
            self.pending.push(PendingRef {
                hole: Hole::Proto { owner: id },
                path: path.to_string(),
            });
        }

        for (key, json) in map {
            if key == CLASS || key == PROTO {
                continue;
            }
            let hidden = class == Class::Function && key == "prototype";
            // placeholder keeps insertion order for refs resolved later
            let value = self.member(id, key, json)?.unwrap_or(Value::Undefined);
            let property = if hidden {
                Property::hidden(key.as_str(), value)
            } else {
                Property::data(key.as_str(), value)
            };
            self.heap.define(id, property);
        }
        Ok(id)
    }

    fn array(&mut self, items: &[Json]) -> Result<ObjectId, LoadError> {
        let id = self.heap.array(std::iter::repeat_n(Value::Undefined, items.len()));
        for (i, json) in items.iter().enumerate() {
            let key = i.to_string();
            if let Some(value) = self.member(id, &key, json)? {
                self.heap.set(id, key, value);
            }
        }
        Ok(id)
    }

    fn resolve(&mut self, root: ObjectId) -> Result<(), LoadError> {
        // refs may point through other refs, so settle them until no progress
        let mut pending = std::mem::take(&mut self.pending);
        while !pending.is_empty() {
            let before = pending.len();
            let mut unresolved = Vec::new();
            for item in pending {
                match self.heap.resolve_path(root, &item.path) {
                    Some(Value::Object(target)) => self.fill(item.hole, target),
                    _ => unresolved.push(item),
                }
            }
            if unresolved.len() == before {
                let first = &unresolved[0];
                return Err(LoadError::UnresolvedRef(first.path.clone()));
            }
            pending = unresolved;
        }
        Ok(())
    }

    fn fill(&mut self, hole: Hole, target: ObjectId) {
        match hole {
            Hole::Property { owner, key } => {
                let enumerable = self
                    .heap
                    .get(owner)
                    .property(&key)
                    .is_none_or(|p| p.enumerable);
                let mut property = Property::data(key, Value::Object(target));
                property.enumerable = enumerable;
                self.heap.define(owner, property);
            }
            Hole::Proto { owner } => self.heap.get_mut(owner).proto = Some(target),
        }
    }
}

fn special_value(json: &Json) -> Result<Value, LoadError> {
    match json.as_str() {
        Some("undefined") => Ok(Value::Undefined),
        Some("NaN") => Ok(Value::Number(f64::NAN)),
        Some("Infinity") => Ok(Value::Number(f64::INFINITY)),
        Some("-Infinity") => Ok(Value::Number(f64::NEG_INFINITY)),
        Some(other) => Err(LoadError::UnknownSpecial(other.to_string())),
        None => Err(LoadError::Malformed {
            key: SPECIAL,
            expected: "a string",
        }),
    }
}
