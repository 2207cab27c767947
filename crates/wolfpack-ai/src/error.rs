use thiserror::Error;

use wolfpack_core::PackKey;

/// Errors reported by construction-time and command APIs.
///
/// Per-tick work never fails: bad indices return defaults and bad inputs are sanitized.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HuntError {
    #[error("invalid configuration `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("pack limit reached ({limit} live packs)")]
    PackLimit { limit: usize },

    #[error("cannot spawn a pack without members")]
    EmptyPack,

    #[error("unknown pack: {0}")]
    UnknownPack(PackKey),
}

impl HuntError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}
