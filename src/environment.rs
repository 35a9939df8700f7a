//! Default crawl roots and their display names

use crate::heap::ObjectId;

/// A named starting point for a crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Root {
    pub object: ObjectId,
    pub path: String,
}

impl Root {
    pub fn new(object: ObjectId, path: impl Into<String>) -> Self {
        Self {
            object,
            path: path.into(),
        }
    }
}

/// Supplies the roots a crawl starts from when the caller names none.
pub trait EnvironmentResolver {
    /// Default roots in registration order. Crawled last-registered first.
    fn roots(&self) -> Vec<Root>;

    /// The object the classifier reports as `"Global"`.
    fn global(&self) -> Option<ObjectId>;

    /// Display name for `object` if it is one of the default roots,
    /// searching the last-registered root first.
    fn name_of(&self, object: ObjectId) -> Option<String> {
        self.roots()
            .into_iter()
            .rev()
            .find(|root| root.object == object)
            .map(|root| root.path)
    }
}

/// A global object, optionally alongside a module-exports object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    global: Option<ObjectId>,
    roots: Vec<Root>,
}

impl Environment {
    /// A browser-like environment: one global root.
    pub fn new(global: ObjectId, name: impl Into<String>) -> Self {
        Self {
            global: Some(global),
            roots: vec![Root::new(global, name)],
        }
    }

    /// A server-like environment: `exports` then `global`.
    pub fn with_exports(global: ObjectId, exports: ObjectId) -> Self {
        Self {
            global: Some(global),
            roots: vec![Root::new(exports, "exports"), Root::new(global, "global")],
        }
    }

    /// An explicit root list with no distinguished global object.
    pub fn from_roots(roots: Vec<Root>) -> Self {
        Self {
            global: None,
            roots,
        }
    }
}

impl EnvironmentResolver for Environment {
    fn roots(&self) -> Vec<Root> {
        self.roots.clone()
    }

    fn global(&self) -> Option<ObjectId> {
        self.global
    }
}
