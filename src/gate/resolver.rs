//! Role Gate
//!
//! Wraps a [`GatePolicy`] with a last-applied identity memo so that side effects
//! fire once per identity change, no matter how often the view re-evaluates.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::policy::{GatePolicy, Notice, ViewDecision};
use crate::identity::Identity;

/// Notify-then-redirect pair for a privileged identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectBatch {
    pub notice: Notice,
    pub target: String,
}

/// Result of one evaluation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub decision: ViewDecision,
    /// Present only on a genuine identity change into a redirect
    pub batch: Option<EffectBatch>,
    /// Whether the identity differed from the last one seen
    pub changed: bool,
}

pub struct RoleGate {
    policy: GatePolicy,
    last_applied: Option<Identity>,
}

impl RoleGate {
    pub fn new(policy: GatePolicy) -> Self {
        Self {
            policy,
            last_applied: None,
        }
    }

    pub fn policy(&self) -> &GatePolicy {
        &self.policy
    }

    /// Identity the last side-effect decision was taken for
    pub fn last_applied(&self) -> Option<&Identity> {
        self.last_applied.as_ref()
    }

    /// Evaluate a snapshot. Same identity as last time: same decision, no batch.
    pub fn observe(&mut self, identity: Identity) -> Evaluation {
        let decision = self.policy.decide(&identity);

        if self.last_applied.as_ref() == Some(&identity) {
            debug!(view = %self.policy.view, identity = %identity, "Identity unchanged, effects skipped");
            return Evaluation {
                decision,
                batch: None,
                changed: false,
            };
        }

        self.last_applied = Some(identity);

        let batch = match &decision {
            ViewDecision::Redirect { target, notice } => Some(EffectBatch {
                notice: notice.clone(),
                target: target.clone(),
            }),
            _ => None,
        };

        Evaluation {
            decision,
            batch,
            changed: true,
        }
    }

    /// Forget the memo; the next snapshot counts as a change
    pub fn reset(&mut self) {
        self.last_applied = None;
    }
}
