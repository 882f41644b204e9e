//! Gate Event Bus
//!
//! Broadcast channel for everything guarded views decide and do. Used for
//! telemetry and by tests that need to watch a view from the outside.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::config::DEFAULT_EVENT_CAPACITY;

/// Events emitted by guarded views
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum GateEvent {
    /// A guarded view started observing identity
    ViewMounted { instance: Uuid, view: String, at: DateTime<Utc> },
    /// A new identity was evaluated
    DecisionMade { instance: Uuid, identity: String, decision: String },
    /// The redirect notice went out
    NoticeIssued { instance: Uuid, title: String },
    /// Navigation away from the guarded view
    Redirected { instance: Uuid, target: String },
    /// A batch was due but the view was already gone
    EffectsSuppressed { instance: Uuid, identity: String },
    /// The view stopped observing
    ViewUnmounted { instance: Uuid },
}

impl GateEvent {
    pub fn instance(&self) -> Uuid {
        match self {
            GateEvent::ViewMounted { instance, .. }
            | GateEvent::DecisionMade { instance, .. }
            | GateEvent::NoticeIssued { instance, .. }
            | GateEvent::Redirected { instance, .. }
            | GateEvent::EffectsSuppressed { instance, .. }
            | GateEvent::ViewUnmounted { instance } => *instance,
        }
    }
}

pub struct EventBus {
    tx: broadcast::Sender<GateEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: GateEvent) {
        // No subscribers is fine
        let _ = self.tx.send(event);
    }

    /// Create a new subscriber
    pub fn subscribe(&self) -> broadcast::Receiver<GateEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

lazy_static::lazy_static! {
    /// Process-wide bus used by views that were not given their own
    pub static ref GATE_EVENT_BUS: Arc<EventBus> = Arc::new(EventBus::default());
}
