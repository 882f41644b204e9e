//! Role-Gated Views
//!
//! Decides, per identity snapshot, whether a view meant for clients and service
//! providers is rendered, held while identity loads, or replaced by a redirect:
//! - Pure decision policy with role captions
//! - Once-per-change side effects (notice, then navigation)
//! - Reactive guarded views with safe teardown
//! - Event bus, configuration and tracing setup

pub mod config;
pub mod gate;
pub mod identity;
pub mod utils;

// Re-exports for convenience
pub use config::{ConfigError, GateConfig};
pub use gate::{GatePolicy, GuardedView, RoleGate, ViewDecision, ViewHandle};
pub use identity::{Identity, IdentityProvider, Role, SessionIdentity};
