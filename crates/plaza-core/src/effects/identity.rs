//! Identity provider effect trait.
//!
//! Wraps the external authentication service: account creation, session
//! sign-in/out, password reset, and a subscription to the current session.
//! The provider owns user ids; the client only observes them.

use crate::identifiers::UserId;
use async_trait::async_trait;
use tokio::sync::watch;

/// Errors reported by the identity provider.
#[derive(Debug, Clone, thiserror::Error)]
pub enum IdentityError {
    /// Email/password pair did not match an account
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Sign-up attempted for an email that already has an account
    #[error("an account already exists for {email}")]
    AccountExists {
        /// Email of the colliding account
        email: String,
    },

    /// Password reset requested for an unknown email
    #[error("no account for {email}")]
    UnknownAccount {
        /// Email that was looked up
        email: String,
    },

    /// The provider could not be reached or failed the request
    #[error("identity provider unavailable: {message}")]
    Unavailable {
        /// Provider-reported failure
        message: String,
    },
}

impl IdentityError {
    /// Create an unavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// The external identity/session service.
#[async_trait]
pub trait IdentityEffects: Send + Sync {
    /// Create an account and start a session for it.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> std::result::Result<UserId, IdentityError>;

    /// Start a session for an existing account.
    async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> std::result::Result<UserId, IdentityError>;

    /// End the current session.
    async fn sign_out(&self) -> std::result::Result<(), IdentityError>;

    /// Ask the provider to email a password reset link.
    async fn request_password_reset(&self, email: &str)
        -> std::result::Result<(), IdentityError>;

    /// Subscribe to session changes.
    ///
    /// The receiver always holds the current session: the signed-in user's
    /// id, or `None` when signed out.
    fn subscribe(&self) -> watch::Receiver<Option<UserId>>;
}
