//! Gate Configuration
//!
//! Policy text and addresses with compiled-in defaults. Deployments can override
//! them from the environment (`ROLE_GATE_*`) or from a JSON base
//! file with an optional customization file layered on top.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_DASHBOARD_ADDRESS: &str = "/dashboard";
pub const DEFAULT_ADMIN_NOTICE_TITLE: &str = "Admin Profile";
pub const DEFAULT_ADMIN_NOTICE_BODY: &str =
    "Admins do not have a public profile. Redirecting you to the dashboard.";
pub const DEFAULT_CLIENT_CAPTION: &str = "Complete your client profile to start posting gigs.";
pub const DEFAULT_SERVICE_PROVIDER_CAPTION: &str =
    "Complete your service provider profile to start offering your services.";
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Everything the role gate needs to know that is not code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Where privileged roles are sent
    pub dashboard_address: String,
    pub admin_notice_title: String,
    pub admin_notice_body: String,
    pub client_caption: String,
    pub service_provider_caption: String,
    /// Buffer size of the gate event bus
    pub event_capacity: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            dashboard_address: DEFAULT_DASHBOARD_ADDRESS.to_string(),
            admin_notice_title: DEFAULT_ADMIN_NOTICE_TITLE.to_string(),
            admin_notice_body: DEFAULT_ADMIN_NOTICE_BODY.to_string(),
            client_caption: DEFAULT_CLIENT_CAPTION.to_string(),
            service_provider_caption: DEFAULT_SERVICE_PROVIDER_CAPTION.to_string(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl GateConfig {
    /// Defaults overridden by `ROLE_GATE_*` environment variables.
    /// Loading `.env` is the binary's job, before anything reads the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`GateConfig::from_env`] with an injectable variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup("ROLE_GATE_DASHBOARD") {
            config.dashboard_address = v;
        }
        if let Some(v) = lookup("ROLE_GATE_NOTICE_TITLE") {
            config.admin_notice_title = v;
        }
        if let Some(v) = lookup("ROLE_GATE_NOTICE_BODY") {
            config.admin_notice_body = v;
        }
        if let Some(v) = lookup("ROLE_GATE_CLIENT_CAPTION") {
            config.client_caption = v;
        }
        if let Some(v) = lookup("ROLE_GATE_PROVIDER_CAPTION") {
            config.service_provider_caption = v;
        }
        if let Some(v) = lookup("ROLE_GATE_EVENT_CAPACITY") {
            config.event_capacity = v.trim().parse().map_err(|e| ConfigError::Invalid {
                key: "event_capacity",
                reason: format!("{:?} is not a number ({})", v, e),
            })?;
        }

        config.validate()?;
        debug!(?config, "Loaded gate config from environment");
        Ok(config)
    }

    /// Load a JSON base file and deep-merge an optional customization file over it.
    /// A missing customization file is ignored.
    pub fn load_with_customization(
        base: impl AsRef<Path>,
        custom: impl AsRef<Path>,
    ) -> Result<Self, ConfigError> {
        let mut merged = read_json(base.as_ref())?;

        let custom = custom.as_ref();
        if custom.exists() {
            let overlay = read_json(custom)?;
            merge_json(&mut merged, overlay);
            info!("Applied config customization from {}", custom.display());
        }

        let config: Self = serde_json::from_value(merged).map_err(|source| ConfigError::Parse {
            path: base.as_ref().to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dashboard_address.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "dashboard_address",
                reason: "must not be empty".to_string(),
            });
        }
        if !self.dashboard_address.starts_with('/') {
            return Err(ConfigError::Invalid {
                key: "dashboard_address",
                reason: format!("{:?} is not an absolute path", self.dashboard_address),
            });
        }
        if self.admin_notice_title.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "admin_notice_title",
                reason: "must not be empty".to_string(),
            });
        }
        if self.event_capacity == 0 {
            return Err(ConfigError::Invalid {
                key: "event_capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn read_json(path: &Path) -> Result<Value, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Objects merge key by key; anything else in the overlay replaces the base
fn merge_json(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
