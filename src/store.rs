// ABOUTME: The variable-store adapter: name/page-scoped formula lookup

use crate::error::EngineError;
use std::collections::HashMap;
use std::sync::Mutex;

/// A single variable binding returned by a store lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub formula: String,
}

/// The external collaborator (§4.G, §6): a name → formula lookup scoped by
/// page. The resolver never mutates the store; it only reads.
pub trait VariableStore {
    /// Looks up `name` within `page_id`, matching case-insensitively.
    /// Returns `None` when no variable with that name exists on the page.
    /// Errors from the underlying store are propagated as fatal evaluation
    /// errors (wrapped in `EngineError::StoreLookupFailed`).
    fn lookup(&self, page_id: &str, name: &str) -> Result<Option<Variable>, EngineError>;
}

/// An in-memory `VariableStore` keyed by `(page_id, normalised name)`.
/// Provided for embedding and for the scenario tests in §8; the external
/// contract is satisfied purely by the `VariableStore` trait above.
#[derive(Debug, Default)]
pub struct InMemoryVariableStore {
    vars: Mutex<HashMap<(String, String), Variable>>,
}

impl InMemoryVariableStore {
    pub fn new() -> Self {
        InMemoryVariableStore {
            vars: Mutex::new(HashMap::new()),
        }
    }

    pub fn set(&self, page_id: &str, name: &str, formula: &str) {
        let key = (page_id.to_string(), normalize(name));
        let mut vars = self.vars.lock().expect("variable store lock poisoned");
        vars.insert(
            key,
            Variable {
                name: name.to_string(),
                formula: formula.to_string(),
            },
        );
    }
}

impl VariableStore for InMemoryVariableStore {
    fn lookup(&self, page_id: &str, name: &str) -> Result<Option<Variable>, EngineError> {
        let key = (page_id.to_string(), normalize(name));
        let vars = self.vars.lock().expect("variable store lock poisoned");
        Ok(vars.get(&key).cloned())
    }
}

pub fn normalize(name: &str) -> String {
    name.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive_on_name() {
        let store = InMemoryVariableStore::new();
        store.set("P", "Var1", "1");
        let found = store.lookup("P", "var1").unwrap();
        assert_eq!(found.unwrap().formula, "1");
    }

    #[test]
    fn lookup_is_scoped_by_page() {
        let store = InMemoryVariableStore::new();
        store.set("P1", "x", "1");
        assert!(store.lookup("P2", "x").unwrap().is_none());
    }

    #[test]
    fn missing_variable_is_none() {
        let store = InMemoryVariableStore::new();
        assert!(store.lookup("P", "missing").unwrap().is_none());
    }
}
