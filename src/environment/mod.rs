pub mod native;

use crate::value::Value;
use compact_str::{CompactString, ToCompactString};
use std::{cell::RefCell, collections::HashMap, fmt, rc::Rc};

/// A handle to a chain of variable scopes.
///
/// Cloning the handle is cheap and shares the scope, which is how closures keep the
/// scope they were created in alive.
#[derive(Clone, Default)]
pub struct Environment {
    inner: Rc<RefCell<Scope>>,
}

#[derive(Default)]
struct Scope {
    values: HashMap<CompactString, Value>,
    parent: Option<Environment>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty scope whose parent is this one.
    pub fn new_scope(&self) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Scope {
                values: HashMap::new(),
                parent: Some(self.clone()),
            })),
        }
    }

    /// Looks the name up in this scope and then in each enclosing scope.
    pub fn access(&self, name: &str) -> Option<Value> {
        let inner = self.inner.borrow();
        if let Some(value) = inner.values.get(name) {
            Some(value.clone())
        } else if let Some(ref parent) = inner.parent {
            parent.access(name)
        } else {
            None
        }
    }

    /// Binds the name in this scope, shadowing any outer binding.
    pub fn declare(&self, name: &str, value: Value) {
        self.inner
            .borrow_mut()
            .values
            .insert(name.to_compact_string(), value);
    }

    /// Rebinds the nearest existing binding of the name. Returns the value back when
    /// no scope binds it.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), Value> {
        let mut inner = self.inner.borrow_mut();
        if let Some(slot) = inner.values.get_mut(name) {
            *slot = value;
            Ok(())
        } else if let Some(ref parent) = inner.parent {
            parent.assign(name, value)
        } else {
            Err(value)
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.access(name).is_some()
    }

    fn depth(&self) -> usize {
        match self.inner.borrow().parent {
            Some(ref parent) => parent.depth() + 1,
            None => 0,
        }
    }
}

// Values are left out: closures stored in a scope refer back to it.
impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        let mut names: Vec<&CompactString> = inner.values.keys().collect();
        names.sort();
        f.debug_struct("Environment")
            .field("names", &names)
            .field("depth", &self.depth())
            .finish()
    }
}
