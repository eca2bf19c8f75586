//! Shopify access modes.

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown [`AccessMode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid access mode: {0}")]
pub struct AccessModeError(String);

/// Whether an auth context is scoped to a user or to the whole shop.
///
/// Online tokens belong to a single staff member and expire with their
/// session. Offline tokens belong to the shop and are used for background
/// work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccessMode {
    /// User-scoped access.
    Online,
    /// Shop-scoped access.
    #[default]
    Offline,
}

impl AccessMode {
    /// Returns `true` for [`AccessMode::Online`].
    #[must_use]
    pub const fn is_online(self) -> bool {
        matches!(self, Self::Online)
    }
}

impl std::fmt::Display for AccessMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Online => write!(f, "online"),
            Self::Offline => write!(f, "offline"),
        }
    }
}

impl std::str::FromStr for AccessMode {
    type Err = AccessModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "online" => Ok(Self::Online),
            "offline" => Ok(Self::Offline),
            _ => Err(AccessModeError(s.to_owned())),
        }
    }
}
