//! The runtime variable store.

use std::sync::Mutex;

use indexmap::IndexMap;

use flowkit_core::{config::Expr, value::Value};

use crate::error::Error;

/// Named runtime values, populated by scenario `init` blocks and preset
/// application.
///
/// Interior mutability lets the store be shared between the evaluator
/// and the runner without threading `&mut` through every step.
#[derive(Default)]
pub struct VariableStore {
    values: Mutex<IndexMap<String, Value>>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.lock().get(name).cloned()
    }

    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.lock().insert(name.into(), value.into());
    }

    pub fn has(&self, name: &str) -> bool {
        self.lock().contains_key(name)
    }

    pub fn delete(&self, name: &str) -> bool {
        self.lock().shift_remove(name).is_some()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Variable names in insertion order.
    pub fn names(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    /// Copies the full contents in insertion order.
    pub fn all(&self) -> IndexMap<String, Value> {
        self.lock().clone()
    }

    /// Bulk-assigns a map of expressions, resolving each through the
    /// given evaluator callback. The callback keeps this store free of
    /// a dependency on the evaluator itself.
    pub fn set_from_exprs(
        &self,
        exprs: &IndexMap<String, Expr>,
        mut eval: impl FnMut(&Expr) -> Result<Value, Error>,
    ) -> Result<(), Error> {
        for (name, expr) in exprs {
            let value = eval(expr)?;
            self.lock().insert(name.clone(), value);
        }
        Ok(())
    }

    /// Copies the current contents for a later [`restore`](Self::restore).
    pub fn snapshot(&self) -> IndexMap<String, Value> {
        self.lock().clone()
    }

    /// Replaces the contents with a previously taken snapshot.
    pub fn restore(&self, snapshot: IndexMap<String, Value>) {
        *self.lock() = snapshot;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, IndexMap<String, Value>> {
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_operations() {
        let store = VariableStore::new();
        assert!(store.is_empty());

        store.set("x", 3.0);
        store.set("name", "alpha");
        assert!(store.has("x"));
        assert_eq!(store.get("x"), Some(Value::Number(3.0)));
        assert_eq!(store.get("missing"), None);

        assert!(store.delete("x"));
        assert!(!store.delete("x"));

        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn names_and_all_keep_insertion_order() {
        let store = VariableStore::new();
        store.set("rate", 0.5);
        store.set("burst", 10.0);
        store.set("label", "peak");

        assert_eq!(store.names(), ["rate", "burst", "label"]);

        let all = store.all();
        assert_eq!(all.len(), 3);
        assert_eq!(all.get("burst"), Some(&Value::Number(10.0)));
        assert_eq!(
            all.keys().collect::<Vec<_>>(),
            ["rate", "burst", "label"]
        );
    }

    #[test]
    fn snapshot_restore() {
        let store = VariableStore::new();
        store.set("x", 1.0);
        let snapshot = store.snapshot();

        store.set("x", 2.0);
        store.set("y", true);
        store.restore(snapshot);

        assert_eq!(store.get("x"), Some(Value::Number(1.0)));
        assert!(!store.has("y"));
    }
}
