//! The social service: every operation that touches the remote store and
//! the normalized cache.
//!
//! Operations follow one discipline, write-then-local-update: all remote
//! calls complete before the cache is touched, and each operation mutates
//! the cache at most once, under the write lock. A failed operation
//! therefore surfaces its error with the cache exactly as it was; there is
//! no half-applied merge to roll back.
//!
//! Policy no-ops (self-view, duplicate view) short-circuit before any
//! remote write and are not errors.

use crate::{
    cache::SocialCache,
    comments::{Comment, COMMENTS},
    events::{EngagementEvent, EVENTS},
    feed::{FeedPaginator, PageLoad, PAGE_SIZE},
    post::{Attachment, Engagement, OriginalPost, Post, PostDoc, SharedPost, POSTS},
    profile::{Profile, ProfileUpdate, USERS},
};
use plaza_core::{
    effects::{
        from_document, to_document, ClockEffects, Document, DocumentStoreEffects, FieldFilter,
        OrderBy,
    },
    PlazaError, PostId, Result, UserId,
};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// What a flag toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagAction {
    /// The actor's flag is now raised
    Flagged,
    /// The actor's flag is now cleared
    Unflagged,
}

/// Owns the normalized cache and the feed position, and exposes the
/// operations that mutate them.
///
/// Effect handlers are passed per call rather than stored, so one service
/// can be driven against any store implementation.
#[derive(Debug, Default)]
pub struct SocialService {
    cache: RwLock<SocialCache>,
    feed: FeedPaginator,
}

impl SocialService {
    /// Create a service with empty caches
    pub fn new() -> Self {
        Self::default()
    }

    /// Pagination flags for the presentation layer.
    pub fn feed(&self) -> &FeedPaginator {
        &self.feed
    }

    // ------------------------------------------------------------------
    // Post mutation
    // ------------------------------------------------------------------

    /// Create an original post.
    ///
    /// Content validity (minimum length) is the caller's contract; this
    /// layer persists what it is given.
    pub async fn create_post<E>(
        &self,
        effects: &E,
        author: &UserId,
        content: impl Into<String>,
        attachments: Vec<Attachment>,
    ) -> Result<Post>
    where
        E: DocumentStoreEffects + ClockEffects,
    {
        let post_id = PostId::new(effects.allocate_id(POSTS).await?);
        let post = Post::Original(OriginalPost {
            id: post_id.clone(),
            creator: author.clone(),
            created_at: effects.now().await,
            content: content.into(),
            attachments,
            engagement: Engagement::default(),
        });

        effects
            .set(POSTS, post_id.as_str(), to_document(&PostDoc::from(&post))?)
            .await?;
        info!(post = %post_id, "created post");

        self.cache.write().await.resolve(post.clone());
        Ok(post)
    }

    /// Share a post, producing a new `shared` post that references the
    /// original and recording a `shared` event on the original's log.
    ///
    /// The event log gains one event per share action; the cached `sharers`
    /// set only gains the actor once.
    pub async fn share_post<E>(&self, effects: &E, actor: &UserId, post_id: &PostId) -> Result<Post>
    where
        E: DocumentStoreEffects + ClockEffects,
    {
        let (org_post_id, _) = self.resolve_original(post_id).await?;

        let new_post_id = PostId::new(effects.allocate_id(POSTS).await?);
        let created_at = effects.now().await;
        let shared = Post::Shared(SharedPost {
            id: new_post_id.clone(),
            creator: actor.clone(),
            created_at,
            org_post_id: org_post_id.clone(),
        });

        effects
            .set(POSTS, new_post_id.as_str(), to_document(&PostDoc::from(&shared))?)
            .await?;

        let event = EngagementEvent::Shared {
            org_post_id: org_post_id.clone(),
            through_post_id: post_id.clone(),
            new_post_id: new_post_id.clone(),
            sharer: actor.clone(),
            timestamp: created_at,
        };
        effects
            .add_child(POSTS, org_post_id.as_str(), EVENTS, to_document(&event)?)
            .await?;
        info!(post = %new_post_id, original = %org_post_id, "shared post");

        let mut cache = self.cache.write().await;
        cache.resolve(shared.clone());
        cache.add_sharer(&org_post_id, actor.clone());
        Ok(shared)
    }

    /// Record a view of a post by `actor`.
    ///
    /// No-op when the actor authored the original (self-views don't count)
    /// or has already viewed it: at most one `viewed` event ever exists
    /// per (post, viewer), enforced by a pre-read of the log.
    pub async fn view_post<E>(&self, effects: &E, actor: &UserId, post_id: &PostId) -> Result<()>
    where
        E: DocumentStoreEffects + ClockEffects,
    {
        let (org_post_id, org_creator) = self.resolve_original(post_id).await?;
        if org_creator == *actor {
            return Ok(());
        }

        let existing = effects
            .query_children(
                POSTS,
                org_post_id.as_str(),
                EVENTS,
                &[
                    FieldFilter::equals("type", "viewed"),
                    FieldFilter::equals("viewer", actor.as_str()),
                ],
                None,
            )
            .await?;
        if !existing.is_empty() {
            return Ok(());
        }

        let event = EngagementEvent::Viewed {
            org_post_id: org_post_id.clone(),
            through_post_id: post_id.clone(),
            viewer: actor.clone(),
            timestamp: effects.now().await,
        };
        effects
            .add_child(POSTS, org_post_id.as_str(), EVENTS, to_document(&event)?)
            .await?;
        debug!(post = %org_post_id, viewer = %actor, "recorded view");

        self.cache.write().await.add_viewer(&org_post_id, actor.clone());
        Ok(())
    }

    /// Toggle `actor`'s flag on a post.
    ///
    /// Flag state is the presence of `flagged` events by the actor on the
    /// original's log: toggling off deletes them all, toggling on inserts
    /// one. Repeated calls cycle through exactly two states.
    pub async fn toggle_flag_post<E>(
        &self,
        effects: &E,
        actor: &UserId,
        post_id: &PostId,
    ) -> Result<FlagAction>
    where
        E: DocumentStoreEffects + ClockEffects,
    {
        let (org_post_id, _) = self.resolve_original(post_id).await?;

        let existing = effects
            .query_children(
                POSTS,
                org_post_id.as_str(),
                EVENTS,
                &[
                    FieldFilter::equals("type", "flagged"),
                    FieldFilter::equals("flagger", actor.as_str()),
                ],
                None,
            )
            .await?;

        let action = if existing.is_empty() {
            let event = EngagementEvent::Flagged {
                org_post_id: org_post_id.clone(),
                through_post_id: post_id.clone(),
                flagger: actor.clone(),
                timestamp: effects.now().await,
            };
            effects
                .add_child(POSTS, org_post_id.as_str(), EVENTS, to_document(&event)?)
                .await?;
            FlagAction::Flagged
        } else {
            for doc in &existing {
                effects
                    .delete_child(POSTS, org_post_id.as_str(), EVENTS, &doc.id)
                    .await?;
            }
            FlagAction::Unflagged
        };
        debug!(post = %org_post_id, flagger = %actor, ?action, "toggled flag");

        self.cache.write().await.set_flagger(
            &org_post_id,
            actor.clone(),
            action == FlagAction::Flagged,
        );
        Ok(action)
    }

    // ------------------------------------------------------------------
    // Comments
    // ------------------------------------------------------------------

    /// Comment on a post. The comment attaches to the post the actor is
    /// looking at; a comment on a share stays on the share.
    pub async fn comment_post<E>(
        &self,
        effects: &E,
        actor: &UserId,
        post_id: &PostId,
        text: impl Into<String>,
    ) -> Result<Comment>
    where
        E: DocumentStoreEffects + ClockEffects,
    {
        let comment = Comment {
            comment: text.into(),
            commenter: actor.clone(),
            timestamp: effects.now().await,
        };
        effects
            .add_child(POSTS, post_id.as_str(), COMMENTS, to_document(&comment)?)
            .await?;

        self.cache.write().await.prepend_comment(post_id, comment.clone());
        Ok(comment)
    }

    /// Load the full comment list of a post, newest first, along with any
    /// commenter profiles not yet cached.
    pub async fn load_post_comments<E>(&self, effects: &E, post_id: &PostId) -> Result<()>
    where
        E: DocumentStoreEffects,
    {
        let docs = effects
            .query_children(
                POSTS,
                post_id.as_str(),
                COMMENTS,
                &[],
                Some(OrderBy::descending("timestamp")),
            )
            .await?;

        let mut comments = Vec::with_capacity(docs.len());
        for doc in docs {
            comments.push(from_document::<Comment>(doc.fields)?);
        }

        for comment in &comments {
            if !self.has_profile(&comment.commenter).await {
                self.load_profile(effects, &comment.commenter).await?;
            }
        }

        self.cache.write().await.set_comments(post_id.clone(), comments);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Profiles
    // ------------------------------------------------------------------

    /// Fetch a profile into the cache.
    ///
    /// Returns `false` when no profile document exists. Absence is a valid
    /// state (the user has not completed sign-up), not an error, and the
    /// cache is left without an entry.
    pub async fn load_profile<E>(&self, effects: &E, user_id: &UserId) -> Result<bool>
    where
        E: DocumentStoreEffects,
    {
        let Some(doc) = effects.get(USERS, user_id.as_str()).await? else {
            debug!(user = %user_id, "profile not available");
            return Ok(false);
        };
        let profile: Profile = from_document(doc)?;

        self.cache.write().await.put_profile(user_id.clone(), profile);
        Ok(true)
    }

    /// Apply a partial profile update.
    ///
    /// Updates the remote document if it exists, otherwise creates it (the
    /// first-time profile completion path). The cache entry then gets the
    /// same field-level merge.
    pub async fn update_profile_details<E>(
        &self,
        effects: &E,
        user_id: &UserId,
        update: ProfileUpdate,
    ) -> Result<()>
    where
        E: DocumentStoreEffects,
    {
        let fields = to_document(&update)?;
        if effects.get(USERS, user_id.as_str()).await?.is_some() {
            effects.update(USERS, user_id.as_str(), fields).await?;
        } else {
            effects.set(USERS, user_id.as_str(), fields).await?;
        }
        info!(user = %user_id, "updated profile details");

        self.cache.write().await.merge_profile(user_id, &update);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Load one post into the cache, fetching its document unless `known`
    /// is supplied (the paginator already has page documents in hand).
    ///
    /// A shared post's original is loaded first; the shared post never
    /// resolves while its original is missing. Originals fetch their full
    /// event log and aggregate it. The creator's profile is loaded if not
    /// already cached. An absent document is a no-op, not an error.
    pub async fn load_post<E>(
        &self,
        effects: &E,
        post_id: &PostId,
        known: Option<Document>,
    ) -> Result<()>
    where
        E: DocumentStoreEffects,
    {
        let started = self.cache.write().await.begin_load(post_id);
        let outcome = self.load_post_inner(effects, post_id, known).await;
        if started && !matches!(outcome, Ok(true)) {
            // Slot is still pending; roll it back so a retry starts clean.
            self.cache.write().await.abort_load(post_id);
        }
        outcome.map(|_| ())
    }

    async fn load_post_inner<E>(
        &self,
        effects: &E,
        post_id: &PostId,
        known: Option<Document>,
    ) -> Result<bool>
    where
        E: DocumentStoreEffects,
    {
        let doc = match known {
            Some(doc) => doc,
            None => match effects.get(POSTS, post_id.as_str()).await? {
                Some(doc) => doc,
                None => {
                    debug!(post = %post_id, "post does not exist");
                    return Ok(false);
                }
            },
        };

        let post = match from_document::<PostDoc>(doc)? {
            PostDoc::Shared {
                post_id: id,
                org_post_id,
                creator,
                created_at,
            } => {
                // The original must resolve before the share does.
                if !self.is_resolved(&org_post_id).await {
                    self.load_original(effects, &org_post_id).await?;
                }
                Post::Shared(SharedPost {
                    id,
                    creator,
                    created_at,
                    org_post_id,
                })
            }
            PostDoc::Original {
                post_id: id,
                creator,
                created_at,
                content,
                attachments,
                ..
            } => {
                let engagement = self.fetch_engagement(effects, &id).await?;
                Post::Original(OriginalPost {
                    id,
                    creator,
                    created_at,
                    content,
                    attachments,
                    engagement,
                })
            }
        };

        if !self.has_profile(post.creator()).await {
            self.load_profile(effects, post.creator()).await?;
        }

        debug!(post = %post_id, shared = post.is_shared(), "loaded post");
        self.cache.write().await.resolve(post);
        Ok(true)
    }

    /// Load an original post by id, for the shared-post ordering path.
    ///
    /// Unlike [`Self::load_post`], a missing document here is an error: a
    /// share that references a nonexistent original is dangling data.
    async fn load_original<E>(&self, effects: &E, org_post_id: &PostId) -> Result<()>
    where
        E: DocumentStoreEffects,
    {
        let doc = effects
            .get(POSTS, org_post_id.as_str())
            .await?
            .ok_or_else(|| {
                PlazaError::not_found(format!("original post {org_post_id} referenced by a share"))
            })?;

        let PostDoc::Original {
            post_id,
            creator,
            created_at,
            content,
            attachments,
            ..
        } = from_document::<PostDoc>(doc)?
        else {
            return Err(PlazaError::internal(format!(
                "post {org_post_id} referenced as an original is itself a share"
            )));
        };

        let engagement = self.fetch_engagement(effects, &post_id).await?;
        let post = Post::Original(OriginalPost {
            id: post_id,
            creator,
            created_at,
            content,
            attachments,
            engagement,
        });

        if !self.has_profile(post.creator()).await {
            self.load_profile(effects, post.creator()).await?;
        }

        self.cache.write().await.resolve(post);
        Ok(())
    }

    async fn fetch_engagement<E>(&self, effects: &E, org_post_id: &PostId) -> Result<Engagement>
    where
        E: DocumentStoreEffects,
    {
        let docs = effects
            .query_children(POSTS, org_post_id.as_str(), EVENTS, &[], None)
            .await?;
        let mut events = Vec::with_capacity(docs.len());
        for doc in docs {
            events.push(from_document::<EngagementEvent>(doc.fields)?);
        }
        Ok(Engagement::from_events(events))
    }

    /// Load the next feed page.
    ///
    /// Returns [`PageLoad::InFlight`] without any remote request when a page
    /// fetch is already outstanding, and [`PageLoad::Exhausted`] once the
    /// terminal state is reached. Otherwise fetches up to [`PAGE_SIZE`]
    /// documents ordered `createdAt` descending, strictly after the cursor,
    /// and loads each one not already in the cache. A page shorter than the
    /// limit is the last page and flips the terminal state; the cursor only
    /// advances past a non-empty page, so a failed call changes nothing and
    /// the next call retries.
    pub async fn load_posts<E>(&self, effects: &E) -> Result<PageLoad>
    where
        E: DocumentStoreEffects,
    {
        let Some(_token) = self.feed.begin() else {
            debug!("page fetch already in flight");
            return Ok(PageLoad::InFlight);
        };
        if self.feed.is_exhausted() {
            debug!("no more posts");
            return Ok(PageLoad::Exhausted);
        }

        let page = effects
            .query_page(
                POSTS,
                OrderBy::descending("createdAt"),
                self.feed.cursor().as_ref(),
                PAGE_SIZE,
            )
            .await?;
        let fetched = page.docs.len();
        debug!(fetched, "fetched feed page");

        for item in &page.docs {
            let id = PostId::new(item.id.clone());
            if !self.contains_post(&id).await {
                self.load_post(effects, &id, Some(item.fields.clone())).await?;
            }
        }

        // next_cursor is only present for a non-empty page, so an empty
        // page leaves the cursor where it was.
        if let Some(cursor) = page.next_cursor {
            self.feed.advance(cursor);
        }
        if fetched < PAGE_SIZE {
            self.feed.mark_exhausted();
        }

        Ok(PageLoad::Loaded { fetched })
    }

    // ------------------------------------------------------------------
    // Read views
    // ------------------------------------------------------------------

    /// All resolved posts, newest first.
    pub async fn posts_snapshot(&self) -> Vec<Post> {
        let cache = self.cache.read().await;
        let mut posts: Vec<Post> = cache.posts().cloned().collect();
        posts.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(a.id()))
        });
        posts
    }

    /// One resolved post.
    pub async fn post(&self, post_id: &PostId) -> Option<Post> {
        self.cache.read().await.post(post_id).cloned()
    }

    /// Cached comments of a post, newest first; empty if never loaded.
    pub async fn comments_snapshot(&self, post_id: &PostId) -> Vec<Comment> {
        self.cache
            .read()
            .await
            .comments(post_id)
            .map(<[Comment]>::to_vec)
            .unwrap_or_default()
    }

    /// A cached profile.
    pub async fn profile(&self, user_id: &UserId) -> Option<Profile> {
        self.cache.read().await.profile(user_id).cloned()
    }

    /// Drop all cached state and rewind the feed. Used on sign-out.
    pub async fn reset(&self) {
        self.cache.write().await.clear();
        self.feed.reset();
        info!("caches cleared and feed reset");
    }

    // ------------------------------------------------------------------
    // Internal helpers
    // ------------------------------------------------------------------

    /// Resolve a loaded post to its original, returning the original's id
    /// and creator. The post (and, for shares, its original) must already
    /// be resolved in the cache.
    async fn resolve_original(&self, post_id: &PostId) -> Result<(PostId, UserId)> {
        let cache = self.cache.read().await;
        let post = cache
            .post(post_id)
            .ok_or_else(|| PlazaError::not_found(format!("post {post_id} is not loaded")))?;
        let org_post_id = post.org_post_id().clone();
        let original = cache
            .post(&org_post_id)
            .and_then(Post::as_original)
            .ok_or_else(|| {
                PlazaError::not_found(format!(
                    "original post {org_post_id} of {post_id} is not loaded"
                ))
            })?;
        Ok((org_post_id, original.creator.clone()))
    }

    async fn contains_post(&self, post_id: &PostId) -> bool {
        self.cache.read().await.contains_post(post_id)
    }

    async fn is_resolved(&self, post_id: &PostId) -> bool {
        self.cache.read().await.is_resolved(post_id)
    }

    async fn has_profile(&self, user_id: &UserId) -> bool {
        self.cache.read().await.contains_profile(user_id)
    }
}
