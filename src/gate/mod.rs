//! Role Gate Module
//!
//! Decides whether a non-privileged view is shown, held in a loading state, or
//! swapped for a redirect, and carries out the redirect exactly once per
//! identity change.

mod effects;
pub mod event_bus;
mod policy;
mod resolver;
mod view;

pub use effects::{BatchOutcome, Effects, Liveness, Navigator, Notifier, ViewRenderer};
pub use event_bus::{EventBus, GateEvent, GATE_EVENT_BUS};
pub use policy::{Frame, GatePolicy, Notice, ViewDecision};
pub use resolver::{EffectBatch, Evaluation, RoleGate};
pub use view::{GuardedView, ViewHandle};
