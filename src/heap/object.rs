//! Objects, their class tags and property slots

use std::fmt;
use std::rc::Rc;

use crate::error::AccessError;

use super::{Heap, Value};

/// Internal class tag of an object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Class {
    Object,
    Array,
    Function,
    Arguments,
    Boolean,
    Number,
    String,
    Date,
    RegExp,
    Error,
    /// Any other host-provided tag, e.g. `"Environment"`.
    Host(String),
}

impl Class {
    pub fn tag(&self) -> &str {
        match self {
            Class::Object => "Object",
            Class::Array => "Array",
            Class::Function => "Function",
            Class::Arguments => "Arguments",
            Class::Boolean => "Boolean",
            Class::Number => "Number",
            Class::String => "String",
            Class::Date => "Date",
            Class::RegExp => "RegExp",
            Class::Error => "Error",
            Class::Host(tag) => tag,
        }
    }

    /// Parse a class tag. Unknown tags become [`Class::Host`].
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "Object" => Class::Object,
            "Array" => Class::Array,
            "Function" => Class::Function,
            "Arguments" => Class::Arguments,
            "Boolean" => Class::Boolean,
            "Number" => Class::Number,
            "String" => Class::String,
            "Date" => Class::Date,
            "RegExp" => Class::RegExp,
            "Error" => Class::Error,
            other => Class::Host(other.to_string()),
        }
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Getter body of an accessor property.
#[derive(Clone)]
pub struct Getter(Rc<dyn Fn(&Heap) -> Result<Value, AccessError>>);

impl Getter {
    pub fn new(f: impl Fn(&Heap) -> Result<Value, AccessError> + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn get(&self, heap: &Heap) -> Result<Value, AccessError> {
        (self.0)(heap)
    }
}

impl fmt::Debug for Getter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Getter(..)")
    }
}

/// Native body of a callable object. Receives the call arguments.
#[derive(Clone)]
pub struct NativeFn(Rc<dyn Fn(&Heap, &[Value]) -> Result<Value, AccessError>>);

impl NativeFn {
    pub fn new(f: impl Fn(&Heap, &[Value]) -> Result<Value, AccessError> + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, heap: &Heap, args: &[Value]) -> Result<Value, AccessError> {
        (self.0)(heap, args)
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NativeFn(..)")
    }
}

#[derive(Debug, Clone)]
pub enum Slot {
    Data(Value),
    Accessor(Getter),
}

/// One own property of an object.
#[derive(Debug, Clone)]
pub struct Property {
    pub key: String,
    pub slot: Slot,
    pub enumerable: bool,
}

impl Property {
    pub fn data(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            slot: Slot::Data(value),
            enumerable: true,
        }
    }

    pub fn hidden(key: impl Into<String>, value: Value) -> Self {
        Self {
            enumerable: false,
            ..Self::data(key, value)
        }
    }

    pub fn accessor(key: impl Into<String>, getter: Getter) -> Self {
        Self {
            key: key.into(),
            slot: Slot::Accessor(getter),
            enumerable: true,
        }
    }

    /// Read the property's current value, running its getter if it has one.
    pub fn read(&self, heap: &Heap) -> Result<Value, AccessError> {
        match &self.slot {
            Slot::Data(value) => Ok(value.clone()),
            Slot::Accessor(getter) => getter.get(heap),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Object {
    pub class: Class,
    pub properties: Vec<Property>,
    pub proto: Option<super::ObjectId>,
    pub call: Option<NativeFn>,
    /// Host objects that refuse enumeration altogether.
    pub opaque: bool,
}

impl Object {
    pub fn new(class: Class) -> Self {
        Self {
            class,
            properties: Vec::new(),
            proto: None,
            call: None,
            opaque: false,
        }
    }

    pub fn is_function(&self) -> bool {
        self.class == Class::Function
    }

    pub fn property(&self, key: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.key == key)
    }

    /// Insert or replace an own property, keeping the original position on replace.
    pub fn define(&mut self, property: Property) {
        match self.properties.iter_mut().find(|p| p.key == property.key) {
            Some(existing) => *existing = property,
            None => self.properties.push(property),
        }
    }
}
