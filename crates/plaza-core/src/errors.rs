//! Unified error type for Plaza operations.
//!
//! One flat error enum for the whole client, in place of per-layer error
//! hierarchies. Per-effect error enums (`StoreError`, `IdentityError`,
//! `ObjectStoreError`) convert into it at the service boundary.

use crate::effects::{IdentityError, ObjectStoreError, StoreError};

/// Unified error type for all Plaza operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PlazaError {
    /// Invalid input or request
    #[error("invalid: {message}")]
    Invalid {
        /// What was invalid about the input
        message: String,
    },

    /// A referenced entity does not exist
    #[error("not found: {message}")]
    NotFound {
        /// What was not found
        message: String,
    },

    /// The identity provider rejected or failed a request
    #[error("identity: {message}")]
    Identity {
        /// Provider-reported failure
        message: String,
    },

    /// The remote document store rejected or failed a request
    #[error("store: {message}")]
    Storage {
        /// Store-reported failure
        message: String,
    },

    /// The binary object store rejected or failed an upload
    #[error("object store: {message}")]
    ObjectStore {
        /// Store-reported failure
        message: String,
    },

    /// A record could not be encoded to or decoded from its document form
    #[error("serialization: {message}")]
    Serialization {
        /// What failed to (de)serialize
        message: String,
    },

    /// Internal invariant violation
    #[error("internal: {message}")]
    Internal {
        /// Description of the violated invariant
        message: String,
    },
}

impl PlazaError {
    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create an identity error
    pub fn identity(message: impl Into<String>) -> Self {
        Self::Identity {
            message: message.into(),
        }
    }

    /// Create a store error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create an object store error
    pub fn object_store(message: impl Into<String>) -> Self {
        Self::ObjectStore {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error is an absence rather than a failure.
    ///
    /// Callers that treat missing documents as valid state branch on this
    /// instead of matching the variant.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Standard Result type for Plaza operations
pub type Result<T> = std::result::Result<T, PlazaError>;

impl From<StoreError> for PlazaError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => Self::not_found(err.to_string()),
            _ => Self::storage(err.to_string()),
        }
    }
}

impl From<IdentityError> for PlazaError {
    fn from(err: IdentityError) -> Self {
        Self::identity(err.to_string())
    }
}

impl From<ObjectStoreError> for PlazaError {
    fn from(err: ObjectStoreError) -> Self {
        Self::object_store(err.to_string())
    }
}

impl From<serde_json::Error> for PlazaError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}
