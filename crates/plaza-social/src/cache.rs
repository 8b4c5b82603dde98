//! The normalized in-memory store.
//!
//! One cache object owns everything the client has seen: posts keyed by id,
//! comment lists keyed by post id, profiles keyed by user id. There is no
//! ambient global; the service owns an instance and every mutation funnels
//! through these methods.
//!
//! Post slots are two-phase. A slot is [`PostEntry::Pending`] from the
//! moment a load starts until the post fully resolves, and a shared post
//! only resolves after its original has. Readers never see pending posts.

use crate::comments::Comment;
use crate::post::{OriginalPost, Post};
use crate::profile::{Profile, ProfileUpdate};
use plaza_core::{PostId, UserId};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Load state of a post cache slot.
#[derive(Debug, Clone, PartialEq)]
pub enum PostEntry {
    /// A load is in flight; the post is not yet visible to readers
    Pending,
    /// Fully resolved post
    Resolved(Post),
}

/// Normalized client-side cache of posts, comments, and profiles.
#[derive(Debug, Default)]
pub struct SocialCache {
    posts: HashMap<PostId, PostEntry>,
    comments: HashMap<PostId, Vec<Comment>>,
    profiles: HashMap<UserId, Profile>,
}

impl SocialCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    // --- posts ---

    /// A resolved post, if present.
    pub fn post(&self, id: &PostId) -> Option<&Post> {
        match self.posts.get(id) {
            Some(PostEntry::Resolved(post)) => Some(post),
            _ => None,
        }
    }

    /// Whether a slot exists for `id`, pending or resolved.
    ///
    /// The paginator uses this to skip documents whose load has already at
    /// least started.
    pub fn contains_post(&self, id: &PostId) -> bool {
        self.posts.contains_key(id)
    }

    /// Whether `id` is fully resolved.
    pub fn is_resolved(&self, id: &PostId) -> bool {
        matches!(self.posts.get(id), Some(PostEntry::Resolved(_)))
    }

    /// All resolved posts, in map order.
    pub fn posts(&self) -> impl Iterator<Item = &Post> {
        self.posts.values().filter_map(|entry| match entry {
            PostEntry::Resolved(post) => Some(post),
            PostEntry::Pending => None,
        })
    }

    /// Mark a load as started. Returns `false` when a slot already exists
    /// (pending or resolved), in which case nothing changes.
    pub fn begin_load(&mut self, id: &PostId) -> bool {
        match self.posts.entry(id.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(PostEntry::Pending);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Roll back a failed load: removes the slot only if it is still
    /// pending.
    pub fn abort_load(&mut self, id: &PostId) {
        if let Some(PostEntry::Pending) = self.posts.get(id) {
            self.posts.remove(id);
        }
    }

    /// Merge a freshly loaded post into its slot.
    ///
    /// Last-writer-wins per top-level field: concurrent loads of the same
    /// post may both land here, in either order, and re-applying identical
    /// data is a no-op. A pending slot resolves; a vacant slot is filled.
    pub fn resolve(&mut self, post: Post) {
        match self.posts.entry(post.id().clone()) {
            Entry::Vacant(slot) => {
                slot.insert(PostEntry::Resolved(post));
            }
            Entry::Occupied(mut slot) => match (slot.get_mut(), post) {
                (PostEntry::Resolved(Post::Original(current)), Post::Original(incoming)) => {
                    current.creator = incoming.creator;
                    current.created_at = incoming.created_at;
                    current.content = incoming.content;
                    current.attachments = incoming.attachments;
                    current.engagement = incoming.engagement;
                }
                (entry, incoming) => *entry = PostEntry::Resolved(incoming),
            },
        }
    }

    // --- engagement ---

    fn original_mut(&mut self, id: &PostId) -> Option<&mut OriginalPost> {
        match self.posts.get_mut(id) {
            Some(PostEntry::Resolved(Post::Original(post))) => Some(post),
            _ => None,
        }
    }

    /// Record `user` as a viewer of the original post `id`.
    pub fn add_viewer(&mut self, id: &PostId, user: UserId) {
        if let Some(post) = self.original_mut(id) {
            post.engagement.viewers.insert(user);
        }
    }

    /// Record `user` as a sharer of the original post `id` (idempotent).
    pub fn add_sharer(&mut self, id: &PostId, user: UserId) {
        if let Some(post) = self.original_mut(id) {
            post.engagement.sharers.insert(user);
        }
    }

    /// Raise or clear `user`'s flag on the original post `id`.
    pub fn set_flagger(&mut self, id: &PostId, user: UserId, flagged: bool) {
        if let Some(post) = self.original_mut(id) {
            if flagged {
                post.engagement.flaggers.insert(user);
            } else {
                post.engagement.flaggers.remove(&user);
            }
        }
    }

    // --- comments ---

    /// The cached comment list for a post, newest first.
    pub fn comments(&self, id: &PostId) -> Option<&[Comment]> {
        self.comments.get(id).map(Vec::as_slice)
    }

    /// Replace the cached comment list for a post.
    pub fn set_comments(&mut self, id: PostId, comments: Vec<Comment>) {
        self.comments.insert(id, comments);
    }

    /// Prepend a freshly created comment, creating the list if absent.
    pub fn prepend_comment(&mut self, id: &PostId, comment: Comment) {
        self.comments.entry(id.clone()).or_default().insert(0, comment);
    }

    // --- profiles ---

    /// A cached profile, if loaded.
    pub fn profile(&self, id: &UserId) -> Option<&Profile> {
        self.profiles.get(id)
    }

    /// Whether a profile is cached for `id`.
    pub fn contains_profile(&self, id: &UserId) -> bool {
        self.profiles.contains_key(id)
    }

    /// Store a freshly fetched profile document.
    pub fn put_profile(&mut self, id: UserId, profile: Profile) {
        self.profiles.insert(id, profile);
    }

    /// Field-merge a partial update onto the cached profile, starting from
    /// an empty profile when none is cached yet.
    pub fn merge_profile(&mut self, id: &UserId, update: &ProfileUpdate) {
        self.profiles.entry(id.clone()).or_default().apply(update);
    }

    // --- lifecycle ---

    /// Drop everything. Used when the session ends.
    pub fn clear(&mut self) {
        self.posts.clear();
        self.comments.clear();
        self.profiles.clear();
    }
}
