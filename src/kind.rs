//! Descriptive "kind" labels for values

use std::fmt;

use crate::heap::{Class, Heap, ObjectId, Value};

/// The classifier's label for a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    Null,
    Undefined,
    /// The configured global object.
    Global,
    /// A function with evidence of being used as a class.
    Constructor,
    /// Anything else, labelled by its internal class.
    Class(Class),
}

impl Kind {
    pub fn name(&self) -> &str {
        match self {
            Kind::Null => "Null",
            Kind::Undefined => "Undefined",
            Kind::Global => "Global",
            Kind::Constructor => "Constructor",
            Kind::Class(class) => class.tag(),
        }
    }

    /// Lowercased name, as shown in match lines.
    pub fn label(&self) -> String {
        self.name().to_lowercase()
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classify a value. Never fails: errors while inspecting a function's
/// `prototype` count as "no constructor evidence".
pub fn kind_of(heap: &Heap, value: &Value, global: Option<ObjectId>) -> Kind {
    match value {
        Value::Null => return Kind::Null,
        Value::Undefined => return Kind::Undefined,
        Value::Object(id) if Some(*id) == global => return Kind::Global,
        Value::Object(id) if is_constructor(heap, *id) => return Kind::Constructor,
        _ => {}
    }
    match heap.class_of(value) {
        Some(class) => Kind::Class(class),
        // typeof fallback
        None => Kind::Class(Class::Host(capitalize(heap.type_of(value)))),
    }
}

/// A function is a constructor when its `prototype` is a non-plain object,
/// or a plain object carrying at least one own member besides the
/// `constructor` back-link.
fn is_constructor(heap: &Heap, id: ObjectId) -> bool {
    if !heap.get(id).is_function() {
        return false;
    }
    let proto = match heap.get_own(id, "prototype") {
        Ok(Some(Value::Object(proto))) => proto,
        _ => return false,
    };
    let proto_object = heap.get(proto);
    if proto_object.class != Class::Object {
        return true;
    }
    proto_object.properties.iter().any(|p| {
        if p.key != "constructor" {
            return true;
        }
        // a `constructor` that is not the back-link is real evidence
        !matches!(p.read(heap), Ok(Value::Object(back)) if back == id)
    })
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
