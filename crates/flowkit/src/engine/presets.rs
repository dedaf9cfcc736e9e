//! The preset store.

use indexmap::IndexMap;
use log::debug;

use flowkit_core::config::{Expr, PresetConfig};

use crate::error::Error;

/// Lightweight preset listing for embedding UIs.
#[derive(Debug, Clone, PartialEq)]
pub struct PresetInfo {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_default: bool,
}

/// Registered presets plus which one is the default.
#[derive(Default)]
pub struct PresetStore {
    presets: IndexMap<String, PresetConfig>,
    default_id: Option<String>,
}

impl PresetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers presets, replacing any previous registration. The
    /// first preset marked `default` wins.
    pub fn load(&mut self, presets: &[PresetConfig]) {
        self.presets = presets
            .iter()
            .cloned()
            .map(|preset| (preset.id.clone(), preset))
            .collect();
        self.default_id = self
            .presets
            .values()
            .find(|preset| preset.is_default)
            .map(|preset| preset.id.clone());
        debug!(count = self.presets.len(); "presets loaded");
    }

    pub fn clear(&mut self) {
        self.presets.clear();
        self.default_id = None;
    }

    pub fn has(&self, id: &str) -> bool {
        self.presets.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&PresetConfig> {
        self.presets.get(id)
    }

    pub fn default_preset_id(&self) -> Option<&str> {
        self.default_id.as_deref()
    }

    pub fn list(&self) -> Vec<PresetInfo> {
        self.presets
            .values()
            .map(|preset| PresetInfo {
                id: preset.id.clone(),
                name: preset.name.clone(),
                description: preset.description.clone(),
                is_default: preset.is_default,
            })
            .collect()
    }

    /// Resolves a preset's effective variables, walking the `extends`
    /// chain parent-first so the child's own entries win on conflict.
    ///
    /// Validation rejects `extends` cycles up front; the visited set
    /// here keeps a hand-built config from looping anyway.
    pub fn get_variables(&self, id: &str) -> Result<IndexMap<String, Expr>, Error> {
        let mut visited = Vec::new();
        self.resolve(id, &mut visited)
    }

    fn resolve(&self, id: &str, visited: &mut Vec<String>) -> Result<IndexMap<String, Expr>, Error> {
        if visited.iter().any(|seen| seen == id) {
            return Err(Error::execution(format!(
                "preset inheritance cycle through \"{id}\""
            )));
        }
        let preset = self
            .get(id)
            .ok_or_else(|| Error::execution(format!("unknown preset: {id}")))?;
        visited.push(id.to_string());

        let mut variables = match &preset.extends {
            Some(parent) => self.resolve(parent, visited)?,
            None => IndexMap::new(),
        };
        for (name, expr) in &preset.variables {
            variables.insert(name.clone(), expr.clone());
        }
        Ok(variables)
    }
}
