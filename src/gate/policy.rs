//! Gate Policy
//!
//! The pure decision function: identity in, view decision out.

use serde::{Deserialize, Serialize};

use crate::config::GateConfig;
use crate::identity::{Identity, Role};

/// Message shown to the user when they are sent elsewhere
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub body: String,
}

/// Outcome of evaluating a guarded view against an identity snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum ViewDecision {
    /// Identity not known yet; show the loading state
    Pending,
    /// Show the guarded content, optionally with a role caption
    Render { view: String, caption: Option<String> },
    /// Privileged role: tell the user why, then leave
    Redirect { target: String, notice: Notice },
}

impl ViewDecision {
    pub fn is_redirect(&self) -> bool {
        matches!(self, ViewDecision::Redirect { .. })
    }

    /// Frame the renderer should draw for this decision
    pub fn frame(&self) -> Frame {
        match self {
            ViewDecision::Pending => Frame::Loading,
            ViewDecision::Render { view, caption } => Frame::Content {
                view: view.clone(),
                caption: caption.clone(),
            },
            ViewDecision::Redirect { .. } => Frame::Blank,
        }
    }
}

/// What a [`ViewRenderer`](super::ViewRenderer) is asked to draw
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "frame", rename_all = "snake_case")]
pub enum Frame {
    Loading,
    Content { view: String, caption: Option<String> },
    /// Redirect in flight; guarded content must not appear
    Blank,
}

/// Policy for a view that only non-privileged roles may see
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatePolicy {
    pub view: String,
    pub redirect_target: String,
    pub admin_notice: Notice,
    pub client_caption: String,
    pub service_provider_caption: String,
}

impl GatePolicy {
    /// Profile page policy with the stock wording
    pub fn profile() -> Self {
        Self::from_config("profile", &GateConfig::default())
    }

    pub fn from_config(view: impl Into<String>, config: &GateConfig) -> Self {
        Self {
            view: view.into(),
            redirect_target: config.dashboard_address.clone(),
            admin_notice: Notice {
                title: config.admin_notice_title.clone(),
                body: config.admin_notice_body.clone(),
            },
            client_caption: config.client_caption.clone(),
            service_provider_caption: config.service_provider_caption.clone(),
        }
    }

    /// Total over every identity, including roles nobody planned for
    pub fn decide(&self, identity: &Identity) -> ViewDecision {
        let role = match identity {
            Identity::Unknown => return ViewDecision::Pending,
            Identity::Resolved(role) => role,
        };

        if role.is_privileged() {
            return ViewDecision::Redirect {
                target: self.redirect_target.clone(),
                notice: self.admin_notice.clone(),
            };
        }

        ViewDecision::Render {
            view: self.view.clone(),
            caption: self.caption_for(role).map(str::to_string),
        }
    }

    pub fn caption_for(&self, role: &Role) -> Option<&str> {
        match role {
            Role::ServiceProvider => Some(self.service_provider_caption.as_str()),
            Role::Client => Some(self.client_caption.as_str()),
            Role::Admin | Role::Other(_) => None,
        }
    }
}
