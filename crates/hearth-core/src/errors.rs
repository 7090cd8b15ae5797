//! Unified error system for the capability core
//!
//! Every engine (restore, drop, mint, requirement evaluation) reports failures through
//! [`HearthError`]. Authorization denials and infrastructure failures share one type so that
//! chain-walk failures propagate unchanged to the caller.

use serde::{Deserialize, Serialize};

/// Unified error type for all Hearth operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum HearthError {
    /// No token is stored under the presented id
    #[error("No token found: {token}")]
    NotFound {
        /// Token id (base64) or description of the missing record
        token: String,
    },

    /// The token has been revoked
    #[error("Token has been revoked: {token}")]
    Revoked {
        /// Revoked token id
        token: String,
    },

    /// The token's deadline has passed
    #[error("Token expired: {token}")]
    Expired {
        /// Expired token id
        token: String,
    },

    /// The token's owner does not match what the caller is willing to honor
    #[error("Owner mismatch: {message}")]
    OwnerMismatch {
        /// Description of the mismatch
        message: String,
    },

    /// A membrane requirement does not currently hold
    #[error("Requirements not satisfied: {token}")]
    RequirementsNotSatisfied {
        /// Token whose requirements failed, or `<extra>` for caller-supplied requirements
        token: String,
    },

    /// A stored requirement carries a tag this core does not understand
    #[error("Unknown requirement kind: {tag}")]
    UnknownRequirementKind {
        /// The unrecognized tag
        tag: String,
    },

    /// A stored token carries a kind this operation does not understand
    #[error("Unknown token kind: {message}")]
    UnknownTokenKind {
        /// Description of the unrecognized kind
        message: String,
    },

    /// Minting a child failed because the parent record does not exist
    #[error("Parent token not found: {token}")]
    ParentNotFound {
        /// Missing parent id
        token: String,
    },

    /// The requested owner may not hold a capability of this kind
    #[error("Invalid owner for kind: {message}")]
    InvalidOwnerForKind {
        /// Description of the rejected owner
        message: String,
    },

    /// A parent chain or `tokenValid` requirement graph loops back on itself
    #[error("Cycle detected at token {token}")]
    CycleDetected {
        /// First token id seen twice
        token: String,
    },

    /// A chain walk exceeded the configured depth bound
    #[error("Chain exceeds maximum depth of {max_depth}")]
    ChainTooDeep {
        /// Configured bound
        max_depth: usize,
    },

    /// Token or notification storage failed
    #[error("Storage error: {message}")]
    Storage {
        /// Error message describing the storage failure
        message: String,
    },

    /// The external grain runtime failed
    #[error("Runtime error: {message}")]
    Runtime {
        /// Error message reported by the runtime
        message: String,
    },

    /// An external oracle (permissions, admin membership) failed
    #[error("Oracle error: {message}")]
    Oracle {
        /// Error message reported by the oracle
        message: String,
    },

    /// Invalid input, record, or configuration
    #[error("Invalid: {message}")]
    Invalid {
        /// Error message describing the invalid input
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message describing the serialization failure
        message: String,
    },

    /// The capability does not offer the requested method
    #[error("Unsupported: {message}")]
    Unsupported {
        /// Error message naming the unsupported method
        message: String,
    },
}

impl HearthError {
    /// Create a not found error
    pub fn not_found(token: impl Into<String>) -> Self {
        Self::NotFound {
            token: token.into(),
        }
    }

    /// Create a revoked error
    pub fn revoked(token: impl Into<String>) -> Self {
        Self::Revoked {
            token: token.into(),
        }
    }

    /// Create an expired error
    pub fn expired(token: impl Into<String>) -> Self {
        Self::Expired {
            token: token.into(),
        }
    }

    /// Create an owner mismatch error
    pub fn owner_mismatch(message: impl Into<String>) -> Self {
        Self::OwnerMismatch {
            message: message.into(),
        }
    }

    /// Create a requirements-not-satisfied error
    pub fn requirements_not_satisfied(token: impl Into<String>) -> Self {
        Self::RequirementsNotSatisfied {
            token: token.into(),
        }
    }

    /// Create an unknown requirement kind error
    pub fn unknown_requirement_kind(tag: impl Into<String>) -> Self {
        Self::UnknownRequirementKind { tag: tag.into() }
    }

    /// Create an unknown token kind error
    pub fn unknown_token_kind(message: impl Into<String>) -> Self {
        Self::UnknownTokenKind {
            message: message.into(),
        }
    }

    /// Create a parent not found error
    pub fn parent_not_found(token: impl Into<String>) -> Self {
        Self::ParentNotFound {
            token: token.into(),
        }
    }

    /// Create an invalid owner error
    pub fn invalid_owner_for_kind(message: impl Into<String>) -> Self {
        Self::InvalidOwnerForKind {
            message: message.into(),
        }
    }

    /// Create a cycle detected error
    pub fn cycle_detected(token: impl Into<String>) -> Self {
        Self::CycleDetected {
            token: token.into(),
        }
    }

    /// Create a chain-too-deep error
    pub fn chain_too_deep(max_depth: usize) -> Self {
        Self::ChainTooDeep { max_depth }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a runtime error
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
        }
    }

    /// Create an oracle error
    pub fn oracle(message: impl Into<String>) -> Self {
        Self::Oracle {
            message: message.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create an unsupported method error
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }

    /// Whether this error is an authorization denial rather than an infrastructure failure.
    ///
    /// Unknown kinds and cycles are not denials: they stop the operation loudly.
    pub fn is_denial(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::Revoked { .. }
                | Self::Expired { .. }
                | Self::OwnerMismatch { .. }
                | Self::RequirementsNotSatisfied { .. }
                | Self::ParentNotFound { .. }
                | Self::InvalidOwnerForKind { .. }
        )
    }
}

/// Standard Result type for Hearth operations
pub type Result<T> = std::result::Result<T, HearthError>;

impl From<serde_json::Error> for HearthError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<toml::de::Error> for HearthError {
    fn from(err: toml::de::Error) -> Self {
        Self::invalid(format!("Invalid TOML: {err}"))
    }
}

impl From<std::io::Error> for HearthError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::not_found(err.to_string()),
            _ => Self::storage(err.to_string()),
        }
    }
}
