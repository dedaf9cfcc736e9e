//! The typed event stream.
//!
//! Everything observable about a run — state changes, step boundaries,
//! branch decisions, progress, stat changes, render requests — flows
//! through [`EngineEvent`], a closed sum type. Consumers subscribe a
//! callback on the [`Player`](crate::Player) and match on the variants
//! they care about; adding a variant is a compile-visible change rather
//! than a new magic string.
//!
//! Events are emitted synchronously at the execution point they
//! describe, so a subscriber observes a total order consistent with step
//! order (interleaved only for `parallel` children).

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicU64, Ordering},
};

use flowkit_core::config::{ActionKind, LogLevel};

/// Scenario runner lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    /// Declared for embedders; no public transition targets it.
    Paused,
    Completed,
}

impl RunState {
    pub fn as_str(self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Paused => "paused",
            RunState::Completed => "completed",
        }
    }
}

/// Structured progress for UI consumption, emitted once per visible step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepProgress {
    /// Id of the scenario whose steps are being counted.
    pub scenario: String,
    /// 1-based index of the visible step just reached.
    pub current: usize,
    /// Total visible steps in the scenario.
    pub total: usize,
    /// Human-readable step label.
    pub label: String,
    /// Conditional branch path, e.g. `["then"]`, when inside a branch.
    pub branch_path: Vec<String>,
    /// Name of the calling scenario when reached through `goto`.
    pub parent_scenario: Option<String>,
}

/// One engine event.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// Visual state changed; consumers should redraw.
    Render,
    /// A run aborted with the given error message.
    Error { message: String },
    ScenarioStart { scenario: String },
    ScenarioEnd { scenario: String },
    StepStart {
        scenario: String,
        action: ActionKind,
        index: usize,
    },
    StepEnd {
        scenario: String,
        action: ActionKind,
        index: usize,
    },
    /// A conditional chose a side.
    Branch {
        scenario: String,
        took_then: bool,
    },
    StateChange { from: RunState, to: RunState },
    PresetChange { preset: String },
    Progress(StepProgress),
    StatChange { stat: String, old: f64, new: f64 },
    Log { message: String, level: LogLevel },
}

/// Handle returned by [`EventHub::subscribe`]; pass it back to
/// unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Arc<dyn Fn(&EngineEvent) + Send + Sync>;

/// Subscriber registry; shared between the player and the runner.
#[derive(Default)]
pub(crate) struct EventHub {
    next_id: AtomicU64,
    subscribers: Mutex<Vec<(u64, Callback)>>,
}

impl EventHub {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn subscribe(
        &self,
        callback: impl Fn(&EngineEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock().push((id, Arc::new(callback)));
        SubscriptionId(id)
    }

    /// Removes a subscriber; returns whether it was registered.
    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.lock();
        let before = subscribers.len();
        subscribers.retain(|(sub_id, _)| *sub_id != id.0);
        subscribers.len() != before
    }

    pub(crate) fn emit(&self, event: &EngineEvent) {
        // Callbacks run outside the lock so a subscriber may subscribe
        // or unsubscribe without deadlocking.
        let callbacks: Vec<Callback> = self
            .lock()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for callback in callbacks {
            callback(event);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(u64, Callback)>> {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_emit_unsubscribe() {
        let hub = EventHub::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let seen_clone = Arc::clone(&seen);
        let id = hub.subscribe(move |event| {
            if let EngineEvent::Render = event {
                seen_clone.lock().unwrap().push(());
            }
        });

        hub.emit(&EngineEvent::Render);
        assert_eq!(seen.lock().unwrap().len(), 1);

        assert!(hub.unsubscribe(id));
        hub.emit(&EngineEvent::Render);
        assert_eq!(seen.lock().unwrap().len(), 1);

        assert!(!hub.unsubscribe(id), "already removed");
    }

    #[test]
    fn subscribers_receive_events_in_registration_order() {
        let hub = EventHub::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for tag in ["first", "second"] {
            let order = Arc::clone(&order);
            hub.subscribe(move |_| order.lock().unwrap().push(tag));
        }
        hub.emit(&EngineEvent::Render);
        assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
    }
}
