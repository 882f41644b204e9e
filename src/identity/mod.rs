//! Identity Module
//!
//! The authenticated user's role as seen by the view layer. Identity is owned by
//! an external authentication collaborator; this crate only reads snapshots.

mod provider;

pub use provider::{IdentityProvider, SessionIdentity};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Role tags understood by the marketplace
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    /// Platform administrator (privileged)
    Admin,
    /// Offers services to clients
    ServiceProvider,
    /// Posts gigs for service providers
    Client,
    /// Any tag the marketplace does not know about, kept verbatim
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::ServiceProvider => "service_provider",
            Role::Client => "client",
            Role::Other(tag) => tag,
        }
    }

    /// Privileged roles are redirected away from non-privileged views
    pub fn is_privileged(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        let normalized = tag.to_ascii_lowercase().replace('-', "_");
        Ok(match normalized.as_str() {
            "admin" => Role::Admin,
            "service_provider" | "serviceprovider" => Role::ServiceProvider,
            "client" => Role::Client,
            _ => Role::Other(tag.to_string()),
        })
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        match tag.parse::<Role>() {
            Ok(role) => Ok(role),
            Err(never) => match never {},
        }
    }
}

/// Snapshot of the current user, as handed out by an [`IdentityProvider`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "role", rename_all = "snake_case")]
#[serde(from = "IdentityRepr")]
pub enum Identity {
    /// Not loaded yet, or no session at all
    #[default]
    Unknown,
    Resolved(Role),
}

/// Wire shape of [`Identity`]; a blank role tag reads back as `Unknown`
#[derive(Deserialize)]
#[serde(tag = "state", content = "role", rename_all = "snake_case")]
enum IdentityRepr {
    Unknown,
    Resolved(Role),
}

impl From<IdentityRepr> for Identity {
    fn from(repr: IdentityRepr) -> Self {
        match repr {
            IdentityRepr::Unknown => Identity::Unknown,
            IdentityRepr::Resolved(Role::Other(tag)) if tag.trim().is_empty() => Identity::Unknown,
            IdentityRepr::Resolved(role) => Identity::Resolved(role),
        }
    }
}

impl Identity {
    /// Parse a raw role tag; an empty tag means nobody is signed in
    pub fn from_tag(tag: &str) -> Self {
        if tag.trim().is_empty() {
            return Identity::Unknown;
        }
        match tag.parse::<Role>() {
            Ok(role) => Identity::Resolved(role),
            Err(never) => match never {},
        }
    }

    pub fn role(&self) -> Option<&Role> {
        match self {
            Identity::Unknown => None,
            Identity::Resolved(role) => Some(role),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Identity::Resolved(_))
    }
}

impl From<Role> for Identity {
    fn from(role: Role) -> Self {
        Identity::Resolved(role)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Unknown => f.write_str("unknown"),
            Identity::Resolved(role) => write!(f, "{}", role),
        }
    }
}
