//! In-memory identity provider handler for testing.

use async_trait::async_trait;
use plaza_core::effects::{IdentityEffects, IdentityError};
use plaza_core::UserId;
use std::collections::HashMap;
use tokio::sync::{watch, RwLock};

#[derive(Debug, Clone)]
struct Account {
    password: String,
    user_id: UserId,
}

/// In-memory identity provider with a live session channel.
///
/// Sign-up and sign-in publish the new session on the watch channel exactly
/// as the real provider's session subscription does.
#[derive(Debug)]
pub struct MemoryIdentity {
    accounts: RwLock<HashMap<String, Account>>,
    session: watch::Sender<Option<UserId>>,
}

impl MemoryIdentity {
    /// Create a provider with no accounts and no session
    pub fn new() -> Self {
        let (session, _) = watch::channel(None);
        Self {
            accounts: RwLock::new(HashMap::new()),
            session,
        }
    }

    /// Directly set the current session, bypassing credentials.
    ///
    /// Simulates provider-side session restoration (a remembered device).
    pub fn set_session(&self, user: Option<UserId>) {
        self.session.send_replace(user);
    }

    /// The current session, as the subscription would report it.
    pub fn current_session(&self) -> Option<UserId> {
        self.session.borrow().clone()
    }
}

impl Default for MemoryIdentity {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityEffects for MemoryIdentity {
    async fn sign_up(&self, email: &str, password: &str) -> Result<UserId, IdentityError> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(email) {
            return Err(IdentityError::AccountExists {
                email: email.to_string(),
            });
        }
        let user_id = UserId::new(uuid::Uuid::new_v4().to_string());
        accounts.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                user_id: user_id.clone(),
            },
        );
        self.session.send_replace(Some(user_id.clone()));
        Ok(user_id)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<UserId, IdentityError> {
        let accounts = self.accounts.read().await;
        match accounts.get(email) {
            Some(account) if account.password == password => {
                let user_id = account.user_id.clone();
                self.session.send_replace(Some(user_id.clone()));
                Ok(user_id)
            }
            _ => Err(IdentityError::InvalidCredentials),
        }
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        self.session.send_replace(None);
        Ok(())
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), IdentityError> {
        let accounts = self.accounts.read().await;
        if accounts.contains_key(email) {
            Ok(())
        } else {
            Err(IdentityError::UnknownAccount {
                email: email.to_string(),
            })
        }
    }

    fn subscribe(&self) -> watch::Receiver<Option<UserId>> {
        self.session.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_up_starts_a_session() {
        let identity = MemoryIdentity::new();
        let mut sessions = identity.subscribe();
        assert!(sessions.borrow_and_update().is_none());

        let user = identity.sign_up("a@example.com", "hunter2").await.expect("sign up");
        assert_eq!(sessions.borrow_and_update().as_ref(), Some(&user));
    }

    #[tokio::test]
    async fn test_duplicate_sign_up_rejected() {
        let identity = MemoryIdentity::new();
        identity.sign_up("a@example.com", "pw").await.expect("sign up");
        let err = identity
            .sign_up("a@example.com", "other")
            .await
            .expect_err("duplicate");
        assert!(matches!(err, IdentityError::AccountExists { .. }));
    }

    #[tokio::test]
    async fn test_sign_in_verifies_password() {
        let identity = MemoryIdentity::new();
        let user = identity.sign_up("a@example.com", "pw").await.expect("sign up");
        identity.sign_out().await.expect("sign out");
        assert!(identity.current_session().is_none());

        let err = identity
            .sign_in("a@example.com", "wrong")
            .await
            .expect_err("wrong password");
        assert!(matches!(err, IdentityError::InvalidCredentials));

        let signed_in = identity.sign_in("a@example.com", "pw").await.expect("sign in");
        assert_eq!(signed_in, user);
        assert_eq!(identity.current_session(), Some(user));
    }
}
