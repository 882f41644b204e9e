//! Guarded View
//!
//! One activation of a view behind a [`RoleGate`]. Mounting spawns an observer
//! task on the identity provider; every snapshot is rendered, and redirect
//! batches go out once per identity change through the view's [`Liveness`].

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::effects::{BatchOutcome, Effects, Liveness, ViewRenderer};
use super::event_bus::{EventBus, GateEvent, GATE_EVENT_BUS};
use super::policy::{GatePolicy, ViewDecision};
use super::resolver::RoleGate;
use crate::identity::{Identity, IdentityProvider};

pub struct GuardedView {
    id: Uuid,
    gate: RoleGate,
    effects: Effects,
    renderer: Arc<dyn ViewRenderer>,
    bus: Arc<EventBus>,
}

impl GuardedView {
    pub fn new(policy: GatePolicy, effects: Effects, renderer: Arc<dyn ViewRenderer>) -> Self {
        Self {
            id: Uuid::new_v4(),
            gate: RoleGate::new(policy),
            effects,
            renderer,
            bus: GATE_EVENT_BUS.clone(),
        }
    }

    /// Publish events on `bus` instead of the global one
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.bus = bus;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Start observing `provider`. Must be called from within a Tokio runtime.
    ///
    /// The current snapshot is evaluated right away, then again on every change
    /// until the handle is unmounted or the provider goes away.
    pub fn mount(self, provider: &dyn IdentityProvider) -> ViewHandle {
        let rx = provider.subscribe();
        let liveness = Liveness::new();
        let mounted_at = Utc::now();
        let id = self.id;
        let view = self.gate.policy().view.clone();
        let bus = self.bus.clone();

        info!(view = %view, instance = %id, "Mounting guarded view");
        bus.publish(GateEvent::ViewMounted {
            instance: id,
            view: view.clone(),
            at: mounted_at,
        });

        let task = tokio::spawn(self.observe(rx, liveness.clone()));

        ViewHandle {
            id,
            view,
            mounted_at,
            liveness,
            task: Some(task),
            bus,
        }
    }

    async fn observe(mut self, mut rx: watch::Receiver<Identity>, liveness: Liveness) {
        loop {
            if !liveness.is_alive() {
                break;
            }

            let identity = rx.borrow_and_update().clone();
            self.evaluate(identity, &liveness);

            if rx.changed().await.is_err() {
                debug!(instance = %self.id, "Identity provider closed");
                break;
            }
        }
    }

    fn evaluate(&mut self, identity: Identity, liveness: &Liveness) {
        let eval = self.gate.observe(identity.clone());

        if !liveness.render(self.renderer.as_ref(), &eval.decision.frame()) {
            debug!(instance = %self.id, "View gone, frame dropped");
        }

        if eval.changed {
            info!(
                view = %self.gate.policy().view,
                instance = %self.id,
                identity = %identity,
                decision = ?eval.decision,
                "Gate decision"
            );
            self.bus.publish(GateEvent::DecisionMade {
                instance: self.id,
                identity: identity.to_string(),
                decision: describe(&eval.decision),
            });
        }

        let Some(batch) = eval.batch else {
            return;
        };

        match liveness.apply(&batch, &self.effects) {
            BatchOutcome::Applied => {
                info!(instance = %self.id, target = %batch.target, "Redirected privileged role");
                self.bus.publish(GateEvent::NoticeIssued {
                    instance: self.id,
                    title: batch.notice.title.clone(),
                });
                self.bus.publish(GateEvent::Redirected {
                    instance: self.id,
                    target: batch.target,
                });
            }
            BatchOutcome::Suppressed => {
                warn!(instance = %self.id, identity = %identity, "View unmounted before redirect, effects dropped");
                self.bus.publish(GateEvent::EffectsSuppressed {
                    instance: self.id,
                    identity: identity.to_string(),
                });
            }
        }
    }
}

fn describe(decision: &ViewDecision) -> String {
    match decision {
        ViewDecision::Pending => "pending".to_string(),
        ViewDecision::Render { caption: Some(_), .. } => "render_with_caption".to_string(),
        ViewDecision::Render { caption: None, .. } => "render".to_string(),
        ViewDecision::Redirect { target, .. } => format!("redirect:{}", target),
    }
}

/// Owner of a mounted view. Dropping it unmounts the view.
pub struct ViewHandle {
    id: Uuid,
    view: String,
    mounted_at: DateTime<Utc>,
    liveness: Liveness,
    task: Option<JoinHandle<()>>,
    bus: Arc<EventBus>,
}

impl ViewHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn view(&self) -> &str {
        &self.view
    }

    pub fn mounted_at(&self) -> DateTime<Utc> {
        self.mounted_at
    }

    pub fn is_mounted(&self) -> bool {
        self.liveness.is_alive()
    }

    /// Shared liveness flag, for hosts whose router tears views down itself
    pub fn liveness(&self) -> Liveness {
        self.liveness.clone()
    }

    /// Tear the view down. No effect fires for it once this returns. Idempotent.
    pub fn unmount(&mut self) {
        if self.liveness.revoke() {
            info!(view = %self.view, instance = %self.id, "Unmounted guarded view");
            self.bus.publish(GateEvent::ViewUnmounted { instance: self.id });
        }
        if let Some(task) = &self.task {
            task.abort();
        }
    }

    /// Wait for the observer task to stop
    pub async fn closed(&mut self) {
        if let Some(task) = self.task.as_mut() {
            // Aborted tasks report a JoinError; that is the normal way out
            let _ = task.await;
            self.task = None;
        }
    }
}

impl Drop for ViewHandle {
    fn drop(&mut self) {
        self.unmount();
    }
}
