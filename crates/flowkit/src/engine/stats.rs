//! The stat store.

use std::sync::Mutex;

use indexmap::IndexMap;
use log::warn;

use flowkit_core::config::{StatConfig, StatFormat};

/// Runtime snapshot of one stat.
#[derive(Debug, Clone, PartialEq)]
pub struct StatState {
    pub id: String,
    pub label: String,
    pub value: f64,
    pub format: StatFormat,
    pub unit: Option<String>,
}

/// Old/new pair reported after a successful mutation, for
/// animated-counter UIs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatChange {
    pub old: f64,
    pub new: f64,
}

struct StatEntry {
    config: StatConfig,
    value: f64,
}

/// Named numeric displays, independent of the variable store.
///
/// Mutations on an unknown stat id are logged and ignored rather than
/// failing the running scenario.
#[derive(Default)]
pub struct StatStore {
    stats: Mutex<IndexMap<String, StatEntry>>,
}

impl StatStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers stats at their initial values, replacing any previous
    /// registration.
    pub fn initialize(&self, configs: &[StatConfig]) {
        let mut stats = self.lock();
        stats.clear();
        for config in configs {
            stats.insert(
                config.id.clone(),
                StatEntry {
                    value: config.initial_value,
                    config: config.clone(),
                },
            );
        }
    }

    pub fn get(&self, id: &str) -> Option<f64> {
        self.lock().get(id).map(|entry| entry.value)
    }

    pub fn get_stat(&self, id: &str) -> Option<StatState> {
        self.lock().get(id).map(state_of)
    }

    pub fn has(&self, id: &str) -> bool {
        self.lock().contains_key(id)
    }

    pub fn all(&self) -> Vec<StatState> {
        self.lock().values().map(state_of).collect()
    }

    pub fn set(&self, id: &str, value: f64) -> Option<StatChange> {
        let mut stats = self.lock();
        let Some(entry) = stats.get_mut(id) else {
            warn!(stat = id; "ignoring update to unknown stat");
            return None;
        };
        let old = entry.value;
        entry.value = value;
        Some(StatChange { old, new: value })
    }

    pub fn increment(&self, id: &str, amount: f64) -> Option<StatChange> {
        let current = self.get(id)?;
        self.set(id, current + amount)
    }

    pub fn decrement(&self, id: &str, amount: f64) -> Option<StatChange> {
        self.increment(id, -amount)
    }

    /// Resets every stat to its declared initial value.
    pub fn reset(&self) {
        for entry in self.lock().values_mut() {
            entry.value = entry.config.initial_value;
        }
    }

    /// Formats a stat's current value for display. Unknown ids format
    /// as the empty string.
    pub fn format_value(&self, id: &str) -> String {
        let stats = self.lock();
        let Some(entry) = stats.get(id) else {
            return String::new();
        };
        let value = entry.value;
        let formatted = match entry.config.format {
            StatFormat::Percentage => format!("{value:.1}%"),
            StatFormat::Duration => format!("{}ms", trim_number(value)),
            StatFormat::Bytes => format_bytes(value),
            StatFormat::Number => group_thousands(value),
        };
        match &entry.config.unit {
            Some(unit) => format!("{formatted} {unit}"),
            None => formatted,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, IndexMap<String, StatEntry>> {
        self.stats
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn state_of(entry: &StatEntry) -> StatState {
    StatState {
        id: entry.config.id.clone(),
        label: entry.config.label.clone(),
        value: entry.value,
        format: entry.config.format,
        unit: entry.config.unit.clone(),
    }
}

/// Renders integral floats without a trailing `.0`.
fn trim_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Binary-scaled size with one decimal, e.g. `1.5 KB`.
fn format_bytes(bytes: f64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes <= 0.0 {
        return "0 B".to_string();
    }
    let exponent = (bytes.log2() / 10.0).floor().clamp(0.0, 3.0) as usize;
    let scaled = bytes / f64::powi(1024.0, exponent as i32);
    let rounded = (scaled * 10.0).round() / 10.0;
    format!("{} {}", trim_number(rounded), UNITS[exponent])
}

/// Integral part grouped into thousands with commas.
fn group_thousands(value: f64) -> String {
    let text = trim_number(value);
    let (mantissa, fraction) = match text.split_once('.') {
        Some((m, f)) => (m.to_string(), Some(f.to_string())),
        None => (text, None),
    };
    let (sign, digits) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa.as_str()),
    };
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    match fraction {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> StatStore {
        let store = StatStore::new();
        store.initialize(&[
            StatConfig {
                id: "requests".into(),
                label: "Requests".into(),
                initial_value: 5.0,
                format: StatFormat::Number,
                unit: Some("req".into()),
            },
            StatConfig {
                id: "cpu".into(),
                label: "CPU".into(),
                format: StatFormat::Percentage,
                ..StatConfig::default()
            },
            StatConfig {
                id: "latency".into(),
                label: "Latency".into(),
                format: StatFormat::Duration,
                ..StatConfig::default()
            },
            StatConfig {
                id: "transferred".into(),
                label: "Transferred".into(),
                format: StatFormat::Bytes,
                ..StatConfig::default()
            },
        ]);
        store
    }

    #[test]
    fn mutations_report_old_and_new() {
        let store = store();
        assert_eq!(
            store.set("requests", 8.0),
            Some(StatChange { old: 5.0, new: 8.0 })
        );
        assert_eq!(
            store.increment("requests", 2.0),
            Some(StatChange { old: 8.0, new: 10.0 })
        );
        assert_eq!(
            store.decrement("requests", 1.0),
            Some(StatChange { old: 10.0, new: 9.0 })
        );
        assert_eq!(store.set("missing", 1.0), None);
    }

    #[test]
    fn reset_restores_initial_values() {
        let store = store();
        store.set("requests", 100.0);
        store.set("cpu", 50.0);
        store.reset();
        assert_eq!(store.get("requests"), Some(5.0));
        assert_eq!(store.get("cpu"), Some(0.0));
    }

    #[test]
    fn display_formats() {
        let store = store();
        store.set("requests", 1234567.0);
        assert_eq!(store.format_value("requests"), "1,234,567 req");

        store.set("cpu", 42.25);
        assert_eq!(store.format_value("cpu"), "42.2%");

        store.set("latency", 150.0);
        assert_eq!(store.format_value("latency"), "150ms");

        store.set("transferred", 1536.0);
        assert_eq!(store.format_value("transferred"), "1.5 KB");
        store.set("transferred", 0.0);
        assert_eq!(store.format_value("transferred"), "0 B");
        store.set("transferred", 3.0 * 1024.0 * 1024.0);
        assert_eq!(store.format_value("transferred"), "3 MB");

        assert_eq!(store.format_value("missing"), "");
    }
}
