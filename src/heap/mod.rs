//! Arena-backed object graph
//!
//! The crawler inspects values living in a [`Heap`]. Objects are addressed by
//! [`ObjectId`], so identity is id equality and reference cycles are just ids
//! pointing back up the graph.

mod object;
mod value;

pub use object::{Class, Getter, NativeFn, Object, Property, Slot};
pub use value::{Value, format_number};

use crate::error::AccessError;

/// Handle to an object in a [`Heap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(usize);

impl ObjectId {
    pub fn index(self) -> usize {
        self.0
    }

    #[cfg(test)]
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index)
    }
}

#[derive(Debug, Default)]
pub struct Heap {
    objects: Vec<Object>,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn alloc(&mut self, object: Object) -> ObjectId {
        self.objects.push(object);
        ObjectId(self.objects.len() - 1)
    }

    /// # Panics
    ///
    /// Panics if `id` was not allocated by this heap.
    pub fn get(&self, id: ObjectId) -> &Object {
        &self.objects[id.0]
    }

    /// # Panics
    ///
    /// Panics if `id` was not allocated by this heap.
    pub fn get_mut(&mut self, id: ObjectId) -> &mut Object {
        &mut self.objects[id.0]
    }

    /// Allocate an empty plain object.
    pub fn object(&mut self) -> ObjectId {
        self.alloc(Object::new(Class::Object))
    }

    /// Allocate a plain object holding the given enumerable data properties.
    pub fn object_from<K, I>(&mut self, entries: I) -> ObjectId
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let id = self.object();
        for (key, value) in entries {
            self.set(id, key, value);
        }
        id
    }

    /// Allocate an array: indexed elements plus a non-enumerable `length`.
    pub fn array(&mut self, items: impl IntoIterator<Item = Value>) -> ObjectId {
        let id = self.alloc(Object::new(Class::Array));
        let mut len = 0usize;
        for (i, item) in items.into_iter().enumerate() {
            self.set(id, i.to_string(), item);
            len = i + 1;
        }
        self.define(id, Property::hidden("length", Value::Number(len as f64)));
        id
    }

    /// Allocate a function with a fresh `prototype` object.
    ///
    /// Both `prototype` and the prototype's `constructor` back-link are
    /// non-enumerable, as the host defines them.
    pub fn function(&mut self) -> ObjectId {
        let func = self.alloc(Object::new(Class::Function));
        let proto = self.object();
        self.define(proto, Property::hidden("constructor", Value::Object(func)));
        self.define(func, Property::hidden("prototype", Value::Object(proto)));
        func
    }

    /// Allocate a function with a native body.
    pub fn native_function(&mut self, body: NativeFn) -> ObjectId {
        let func = self.function();
        self.get_mut(func).call = Some(body);
        func
    }

    /// Allocate an object whose prototype is `ctor.prototype`.
    pub fn instance(&mut self, ctor: ObjectId) -> ObjectId {
        let proto = match self.get(ctor).property("prototype").map(|p| &p.slot) {
            Some(Slot::Data(Value::Object(proto))) => Some(*proto),
            _ => None,
        };
        let id = self.object();
        self.get_mut(id).proto = proto;
        id
    }

    /// Set an enumerable data property.
    pub fn set(&mut self, id: ObjectId, key: impl Into<String>, value: Value) {
        self.define(id, Property::data(key, value));
    }

    pub fn define(&mut self, id: ObjectId, property: Property) {
        self.get_mut(id).define(property);
    }

    /// Read an own property. `Ok(None)` when the key is absent.
    pub fn get_own(&self, id: ObjectId, key: &str) -> Result<Option<Value>, AccessError> {
        self.get(id)
            .property(key)
            .map(|p| p.read(self))
            .transpose()
    }

    /// Follow a dotted path of own properties from `from`.
    ///
    /// The empty path resolves to `from` itself.
    pub fn resolve_path(&self, from: ObjectId, path: &str) -> Option<Value> {
        let mut current = Value::Object(from);
        if path.is_empty() {
            return Some(current);
        }
        for segment in path.split('.') {
            let id = current.as_object()?;
            current = self.get_own(id, segment).ok()??;
        }
        Some(current)
    }

    /// The host's `typeof` operator.
    pub fn type_of(&self, value: &Value) -> &'static str {
        match value {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Object(id) if self.get(*id).is_function() => "function",
            Value::Object(_) => "object",
        }
    }

    /// Internal class of a value. Primitives report their wrapper class.
    pub fn class_of(&self, value: &Value) -> Option<Class> {
        match value {
            Value::Undefined | Value::Null => None,
            Value::Bool(_) => Some(Class::Boolean),
            Value::Number(_) => Some(Class::Number),
            Value::String(_) => Some(Class::String),
            Value::Object(id) => Some(self.get(*id).class.clone()),
        }
    }

    /// `value instanceof ctor`: walk the prototype chain of `value`
    /// looking for `ctor.prototype`.
    pub fn instance_of(&self, value: &Value, ctor: ObjectId) -> Result<bool, AccessError> {
        if !self.get(ctor).is_function() {
            return Err(AccessError::NotCallable(format!("#{}", ctor.index())));
        }
        let target = match self.get_own(ctor, "prototype")? {
            Some(Value::Object(proto)) => proto,
            _ => return Err(AccessError::Other("prototype is not an object".into())),
        };
        let Some(id) = value.as_object() else {
            return Ok(false);
        };
        let mut link = self.get(id).proto;
        let mut hops = 0usize;
        while let Some(proto) = link {
            if proto == target {
                return Ok(true);
            }
            hops += 1;
            if hops > self.objects.len() {
                // prototype cycle
                return Err(AccessError::Other("cyclic prototype chain".into()));
            }
            link = self.get(proto).proto;
        }
        Ok(false)
    }

    /// Invoke a function. Functions without a native body return undefined.
    pub fn call(&self, func: ObjectId, args: &[Value]) -> Result<Value, AccessError> {
        let object = self.get(func);
        if !object.is_function() {
            return Err(AccessError::NotCallable(format!("#{}", func.index())));
        }
        match &object.call {
            Some(body) => body.call(self, args),
            None => Ok(Value::Undefined),
        }
    }
}
