//! Filter predicates applied to every enumerated property

use std::fmt;
use std::rc::Rc;

use crate::error::{AccessError, InvalidArgument};
use crate::heap::{Heap, ObjectId, Value};
use crate::kind::kind_of;
use crate::output::preview;

use super::traversal::PathEntry;

/// One enumerated property, as seen by a filter.
pub struct Candidate<'a> {
    pub heap: &'a Heap,
    pub value: &'a Value,
    pub key: &'a str,
    /// The object the property belongs to.
    pub owner: ObjectId,
    /// The worklist entry being expanded; its pool lists the branch ancestors.
    pub entry: &'a PathEntry,
    pub global: Option<ObjectId>,
}

/// What a by-kind search compares against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KindQuery {
    /// `"*"`: every property.
    Any,
    /// A `typeof` result or a kind name such as `"Array"` or `"constructor"`.
    Named(String),
    /// Instances of this constructor function.
    Constructor(ObjectId),
}

type ClosureFn = dyn Fn(&Candidate<'_>) -> Result<bool, AccessError>;

/// A caller-supplied predicate.
#[derive(Clone)]
pub enum Callback {
    /// A function living in the heap, called as `f(value, key, owner)`.
    Function(ObjectId),
    Closure(Rc<ClosureFn>),
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callback::Function(id) => f.debug_tuple("Function").field(id).finish(),
            Callback::Closure(_) => f.write_str("Closure(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Filter {
    Kind(KindQuery),
    Name(String),
    Value(Value),
    Custom(Callback),
}

impl Filter {
    /// By-kind filter; `arg` must be a function or a string.
    pub fn by_kind(heap: &Heap, arg: &Value) -> Result<Self, InvalidArgument> {
        match arg {
            Value::String(s) if s == "*" => Ok(Filter::Kind(KindQuery::Any)),
            Value::String(s) => Ok(Filter::Kind(KindQuery::Named(s.clone()))),
            Value::Object(id) if heap.get(*id).is_function() => {
                Ok(Filter::Kind(KindQuery::Constructor(*id)))
            }
            _ => Err(invalid(heap, arg, &["function", "string"])),
        }
    }

    /// By-name filter; `arg` must be a string.
    pub fn by_name(heap: &Heap, arg: &Value) -> Result<Self, InvalidArgument> {
        match arg {
            Value::String(s) => Ok(Filter::Name(s.clone())),
            _ => Err(invalid(heap, arg, &["string"])),
        }
    }

    /// By-value filter; any value is accepted.
    pub fn by_value(arg: Value) -> Self {
        Filter::Value(arg)
    }

    /// Custom filter backed by a heap function; `arg` must be callable.
    pub fn custom(heap: &Heap, arg: &Value) -> Result<Self, InvalidArgument> {
        match arg {
            Value::Object(id) if heap.get(*id).is_function() => {
                Ok(Filter::Custom(Callback::Function(*id)))
            }
            _ => Err(invalid(heap, arg, &["function"])),
        }
    }

    /// Custom filter backed by a Rust closure.
    pub fn custom_fn<F>(predicate: F) -> Self
    where
        F: Fn(&Candidate<'_>) -> Result<bool, AccessError> + 'static,
    {
        Filter::Custom(Callback::Closure(Rc::new(predicate)))
    }

    /// Decide whether a property matches.
    pub fn matches(&self, cx: &Candidate<'_>) -> Result<bool, AccessError> {
        match self {
            Filter::Kind(query) => kind_matches(query, cx),
            Filter::Name(name) => Ok(cx.key == name),
            Filter::Value(expected) => Ok(cx.value.same_value_zero(expected)),
            Filter::Custom(Callback::Function(func)) => {
                let args = [
                    cx.value.clone(),
                    Value::String(cx.key.to_string()),
                    Value::Object(cx.owner),
                ];
                Ok(cx.heap.call(*func, &args)?.is_truthy())
            }
            Filter::Custom(Callback::Closure(predicate)) => predicate(cx),
        }
    }
}

fn kind_matches(query: &KindQuery, cx: &Candidate<'_>) -> Result<bool, AccessError> {
    match query {
        KindQuery::Any => Ok(true),
        KindQuery::Constructor(ctor) => cx.heap.instance_of(cx.value, *ctor),
        KindQuery::Named(name) => {
            // typeof is compared as-is, the kind name case-insensitively
            if cx.heap.type_of(cx.value) == name {
                return Ok(true);
            }
            Ok(kind_of(cx.heap, cx.value, cx.global)
                .name()
                .eq_ignore_ascii_case(name))
        }
    }
}

fn invalid(heap: &Heap, arg: &Value, expected: &[&'static str]) -> InvalidArgument {
    InvalidArgument {
        preview: preview(heap, arg),
        expected: expected.to_vec(),
    }
}
