//! The client façade.
//!
//! One [`Client`] owns the social service and the session state, and drives
//! the lifecycle from the identity provider's session subscription: signing
//! out clears every cache, signing in runs the profile existence check, and
//! entering the ready state loads the first feed page exactly once per
//! entry.

use crate::session::SessionState;
use crate::uploads::{self, AttachmentUpload};
use plaza_core::{
    effects::{ClockEffects, DocumentStoreEffects, IdentityEffects, ObjectStoreEffects},
    PlazaError, PostId, Result, UserId,
};
use plaza_social::{
    Attachment, Comment, FlagAction, PageLoad, Post, Profile, ProfileUpdate, SocialService,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Minimum post content length, in characters.
pub const MIN_POST_CONTENT_LEN: usize = 140;

/// The presentation layer's handle on everything.
pub struct Client<E> {
    effects: Arc<E>,
    social: SocialService,
    state: RwLock<SessionState>,
}

impl<E> Client<E>
where
    E: DocumentStoreEffects + IdentityEffects + ObjectStoreEffects + ClockEffects,
{
    /// Create a signed-out client over the given effect handlers
    pub fn new(effects: Arc<E>) -> Self {
        Self {
            effects,
            social: SocialService::new(),
            state: RwLock::new(SessionState::SignedOut),
        }
    }

    /// The underlying social service (read views and direct operations).
    pub fn social(&self) -> &SocialService {
        &self.social
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    // ------------------------------------------------------------------
    // Identity
    // ------------------------------------------------------------------

    /// Create an account. The resulting session change arrives through the
    /// provider subscription (see [`Self::run`]) or [`Self::handle_session`].
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<UserId> {
        Ok(self.effects.sign_up(email, password).await?)
    }

    /// Sign in to an existing account.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserId> {
        Ok(self.effects.sign_in(email, password).await?)
    }

    /// End the current session.
    pub async fn sign_out(&self) -> Result<()> {
        Ok(self.effects.sign_out().await?)
    }

    /// Ask the provider to email a password reset link.
    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        Ok(self.effects.request_password_reset(email).await?)
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Drive the state machine from one session change.
    ///
    /// `None` clears every cache and rewinds the feed. `Some` runs the
    /// profile existence check and lands in either the ready state (which
    /// also loads the initial feed page) or the profile-completion gate.
    pub async fn handle_session(&self, user: Option<UserId>) -> Result<SessionState> {
        match user {
            None => {
                self.social.reset().await;
                let state = SessionState::SignedOut;
                *self.state.write().await = state.clone();
                info!("signed out");
                Ok(state)
            }
            Some(user) => {
                *self.state.write().await = SessionState::SignedInProfileLoading {
                    user: user.clone(),
                };
                self.check_profile(user).await
            }
        }
    }

    /// Submit first-run profile details, then re-run the existence check.
    pub async fn complete_profile(&self, details: ProfileUpdate) -> Result<SessionState> {
        let user = self
            .state
            .read()
            .await
            .user()
            .cloned()
            .ok_or_else(|| PlazaError::invalid("no signed-in user"))?;
        self.social
            .update_profile_details(self.effects.as_ref(), &user, details)
            .await?;
        *self.state.write().await = SessionState::SignedInProfileLoading {
            user: user.clone(),
        };
        self.check_profile(user).await
    }

    /// Run forever, driving the state machine from the provider's session
    /// subscription. Returns when the provider goes away.
    pub async fn run(&self) {
        let mut sessions = self.effects.subscribe();
        loop {
            let user = sessions.borrow_and_update().clone();
            if let Err(err) = self.handle_session(user).await {
                warn!(%err, "session transition failed");
            }
            if sessions.changed().await.is_err() {
                return;
            }
        }
    }

    async fn check_profile(&self, user: UserId) -> Result<SessionState> {
        let exists = self
            .social
            .load_profile(self.effects.as_ref(), &user)
            .await?;
        if exists {
            let state = SessionState::SignedInReady { user: user.clone() };
            *self.state.write().await = state.clone();
            info!(user = %user, "session ready");
            // Initial feed load, once per entry into the ready state. The
            // user's own profile is already cached by the existence check.
            self.social.load_posts(self.effects.as_ref()).await?;
            Ok(state)
        } else {
            let state = SessionState::SignedInNoProfile { user };
            *self.state.write().await = state.clone();
            Ok(state)
        }
    }

    async fn current_user(&self) -> Result<UserId> {
        self.state
            .read()
            .await
            .user()
            .cloned()
            .ok_or_else(|| PlazaError::invalid("not signed in"))
    }

    // ------------------------------------------------------------------
    // Posting
    // ------------------------------------------------------------------

    /// Create a post as the signed-in user.
    ///
    /// Enforces the form policies before anything leaves the device: the
    /// content minimum of [`MIN_POST_CONTENT_LEN`] characters, and
    /// image-only attachments within the size limit. Attachments upload
    /// first; any failed upload aborts the post.
    pub async fn create_post(
        &self,
        content: &str,
        attachments: Vec<AttachmentUpload>,
    ) -> Result<Post> {
        let user = self.current_user().await?;
        if content.chars().count() < MIN_POST_CONTENT_LEN {
            return Err(PlazaError::invalid(format!(
                "post content must be at least {MIN_POST_CONTENT_LEN} characters"
            )));
        }
        let attachments = self.upload_attachments(&user, attachments).await?;
        self.social
            .create_post(self.effects.as_ref(), &user, content, attachments)
            .await
    }

    async fn upload_attachments(
        &self,
        user: &UserId,
        attachments: Vec<AttachmentUpload>,
    ) -> Result<Vec<Attachment>> {
        if attachments.is_empty() {
            return Ok(Vec::new());
        }
        for upload in &attachments {
            uploads::validate(upload)?;
        }
        let stamp = self.effects.now().await.as_millis();
        let mut uploaded = Vec::with_capacity(attachments.len());
        for upload in attachments {
            let path = format!("images/{}/{}_{}", user, stamp, upload.file_name);
            let url = self
                .effects
                .upload(&path, upload.bytes, &upload.content_type)
                .await?;
            uploaded.push(Attachment {
                url,
                media_type: upload.content_type,
            });
        }
        Ok(uploaded)
    }

    /// Share a post as the signed-in user.
    pub async fn share_post(&self, post_id: &PostId) -> Result<Post> {
        let user = self.current_user().await?;
        self.social
            .share_post(self.effects.as_ref(), &user, post_id)
            .await
    }

    /// Record a view by the signed-in user.
    pub async fn view_post(&self, post_id: &PostId) -> Result<()> {
        let user = self.current_user().await?;
        self.social
            .view_post(self.effects.as_ref(), &user, post_id)
            .await
    }

    /// Toggle the signed-in user's flag on a post.
    pub async fn toggle_flag_post(&self, post_id: &PostId) -> Result<FlagAction> {
        let user = self.current_user().await?;
        self.social
            .toggle_flag_post(self.effects.as_ref(), &user, post_id)
            .await
    }

    /// Comment on a post as the signed-in user.
    pub async fn comment_post(&self, post_id: &PostId, text: &str) -> Result<Comment> {
        let user = self.current_user().await?;
        self.social
            .comment_post(self.effects.as_ref(), &user, post_id, text)
            .await
    }

    // ------------------------------------------------------------------
    // Loading and views
    // ------------------------------------------------------------------

    /// Load the next feed page (the infinite-scroll trigger).
    pub async fn load_more_posts(&self) -> Result<PageLoad> {
        self.social.load_posts(self.effects.as_ref()).await
    }

    /// Load or refresh one post.
    pub async fn load_post(&self, post_id: &PostId) -> Result<()> {
        self.social
            .load_post(self.effects.as_ref(), post_id, None)
            .await
    }

    /// Load a post's comment thread.
    pub async fn load_post_comments(&self, post_id: &PostId) -> Result<()> {
        self.social
            .load_post_comments(self.effects.as_ref(), post_id)
            .await
    }

    /// Load a profile into the cache; `false` when none exists.
    pub async fn load_profile(&self, user_id: &UserId) -> Result<bool> {
        self.social.load_profile(self.effects.as_ref(), user_id).await
    }

    /// All loaded posts, newest first.
    pub async fn feed_posts(&self) -> Vec<Post> {
        self.social.posts_snapshot().await
    }

    /// One loaded post.
    pub async fn post(&self, post_id: &PostId) -> Option<Post> {
        self.social.post(post_id).await
    }

    /// Cached comments of a post, newest first.
    pub async fn comments(&self, post_id: &PostId) -> Vec<Comment> {
        self.social.comments_snapshot(post_id).await
    }

    /// A cached profile.
    pub async fn profile(&self, user_id: &UserId) -> Option<Profile> {
        self.social.profile(user_id).await
    }

    /// Whether a feed page fetch is in flight.
    pub fn feed_loading(&self) -> bool {
        self.social.feed().is_loading()
    }

    /// Whether the feed has no more pages.
    pub fn feed_exhausted(&self) -> bool {
        self.social.feed().is_exhausted()
    }
}
