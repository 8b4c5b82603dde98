//! Session lifecycle states.

use plaza_core::UserId;

/// Lifecycle state driven by the identity session.
///
/// A fresh session passes through a profile existence check before the app
/// is usable: users who never completed the details form land in
/// [`SessionState::SignedInNoProfile`] until they do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No authenticated user; caches are empty
    SignedOut,
    /// A user session exists and the profile check is running
    SignedInProfileLoading {
        /// The session's user
        user: UserId,
    },
    /// Signed in, but no profile document exists yet
    SignedInNoProfile {
        /// The session's user
        user: UserId,
    },
    /// Signed in with a complete profile; the feed is live
    SignedInReady {
        /// The session's user
        user: UserId,
    },
}

impl SessionState {
    /// The signed-in user, if any.
    pub fn user(&self) -> Option<&UserId> {
        match self {
            Self::SignedOut => None,
            Self::SignedInProfileLoading { user }
            | Self::SignedInNoProfile { user }
            | Self::SignedInReady { user } => Some(user),
        }
    }

    /// Whether the session is fully set up.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::SignedInReady { .. })
    }
}
