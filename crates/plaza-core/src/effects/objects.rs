//! Binary object store effect trait.

use async_trait::async_trait;

/// Errors reported by the object store.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ObjectStoreError {
    /// The store could not be reached or failed the request
    #[error("object store unavailable: {message}")]
    Unavailable {
        /// Store-reported failure
        message: String,
    },

    /// The store refused the upload (quota, path policy)
    #[error("upload rejected: {message}")]
    Rejected {
        /// Store-reported rejection reason
        message: String,
    },
}

impl ObjectStoreError {
    /// Create an unavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// The external binary object store used for post attachments.
#[async_trait]
pub trait ObjectStoreEffects: Send + Sync {
    /// Upload `bytes` at `path`, returning a URL the content can later be
    /// retrieved from.
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> std::result::Result<String, ObjectStoreError>;
}
