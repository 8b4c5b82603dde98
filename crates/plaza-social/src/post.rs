//! Post records and the cached post variants.
//!
//! A post is either **original** (authored content plus engagement state) or
//! **shared** (a reference to an original, no content of its own). The wire
//! record [`PostDoc`] is the serde view of the stored document; the cached
//! [`Post`] additionally carries the engagement sets derived from the
//! original's event log, which are never stored on the post document itself.

use plaza_core::{PostId, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Collection holding post documents.
pub const POSTS: &str = "posts";

/// An image attached to an original post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Retrieval URL returned by the object store
    pub url: String,
    /// Media type of the uploaded file (stored as `type`)
    #[serde(rename = "type")]
    pub media_type: String,
}

/// Engagement state of an original post, derived from its event log.
///
/// Sets of distinct actors, not counts: idempotent views and flag toggling
/// are only well-defined over sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Engagement {
    /// Users who have viewed the post (at most once each)
    pub viewers: BTreeSet<UserId>,
    /// Users whose flag is currently raised
    pub flaggers: BTreeSet<UserId>,
    /// Users who have shared the post at least once
    pub sharers: BTreeSet<UserId>,
}

/// A post authored directly by a user.
#[derive(Debug, Clone, PartialEq)]
pub struct OriginalPost {
    /// Store-assigned post id
    pub id: PostId,
    /// Author
    pub creator: UserId,
    /// Creation time
    pub created_at: Timestamp,
    /// Post text
    pub content: String,
    /// Ordered attachments
    pub attachments: Vec<Attachment>,
    /// Derived engagement sets
    pub engagement: Engagement,
}

/// A reference-only post pointing at an original.
#[derive(Debug, Clone, PartialEq)]
pub struct SharedPost {
    /// Store-assigned post id
    pub id: PostId,
    /// User who shared
    pub creator: UserId,
    /// Share time
    pub created_at: Timestamp,
    /// The original this share resolves to
    pub org_post_id: PostId,
}

/// A cached post.
#[derive(Debug, Clone, PartialEq)]
pub enum Post {
    /// Authored content with engagement
    Original(OriginalPost),
    /// Reference to an original
    Shared(SharedPost),
}

impl Post {
    /// Store-assigned post id
    pub fn id(&self) -> &PostId {
        match self {
            Self::Original(post) => &post.id,
            Self::Shared(post) => &post.id,
        }
    }

    /// User who created this post (the sharer, for shares)
    pub fn creator(&self) -> &UserId {
        match self {
            Self::Original(post) => &post.creator,
            Self::Shared(post) => &post.creator,
        }
    }

    /// Creation time
    pub fn created_at(&self) -> Timestamp {
        match self {
            Self::Original(post) => post.created_at,
            Self::Shared(post) => post.created_at,
        }
    }

    /// Id of the original this post resolves to (itself for originals).
    pub fn org_post_id(&self) -> &PostId {
        match self {
            Self::Original(post) => &post.id,
            Self::Shared(post) => &post.org_post_id,
        }
    }

    /// The original post data, if this is an original
    pub fn as_original(&self) -> Option<&OriginalPost> {
        match self {
            Self::Original(post) => Some(post),
            Self::Shared(_) => None,
        }
    }

    /// Whether this is a shared post
    pub fn is_shared(&self) -> bool {
        matches!(self, Self::Shared(_))
    }
}

/// Wire shape of a post document in the remote store.
///
/// Field names match the stored documents (`postId`, `orgPostId`,
/// `createdAt`); the `type` tag distinguishes the variants. Engagement is
/// never stored on the post document; it lives in the `events`
/// sub-collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PostDoc {
    /// An authored post document
    #[serde(rename_all = "camelCase")]
    Original {
        /// Own id, embedded in the document
        post_id: PostId,
        /// Equal to `post_id` for originals
        org_post_id: PostId,
        /// Author
        creator: UserId,
        /// Creation time, epoch ms
        created_at: Timestamp,
        /// Post text
        content: String,
        /// Ordered attachments
        #[serde(default)]
        attachments: Vec<Attachment>,
    },
    /// A share document
    #[serde(rename_all = "camelCase")]
    Shared {
        /// Own id, embedded in the document
        post_id: PostId,
        /// The original being shared
        org_post_id: PostId,
        /// User who shared
        creator: UserId,
        /// Share time, epoch ms
        created_at: Timestamp,
    },
}

impl From<&Post> for PostDoc {
    fn from(post: &Post) -> Self {
        match post {
            Post::Original(post) => Self::Original {
                post_id: post.id.clone(),
                org_post_id: post.id.clone(),
                creator: post.creator.clone(),
                created_at: post.created_at,
                content: post.content.clone(),
                attachments: post.attachments.clone(),
            },
            Post::Shared(post) => Self::Shared {
                post_id: post.id.clone(),
                org_post_id: post.org_post_id.clone(),
                creator: post.creator.clone(),
                created_at: post.created_at,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plaza_core::effects::to_document;

    fn original() -> Post {
        Post::Original(OriginalPost {
            id: PostId::new("p1"),
            creator: UserId::new("alice"),
            created_at: Timestamp::from_millis(1000),
            content: "hello".to_string(),
            attachments: vec![Attachment {
                url: "https://objects/1.png".to_string(),
                media_type: "image/png".to_string(),
            }],
            engagement: Engagement::default(),
        })
    }

    #[test]
    fn test_original_wire_shape() {
        let doc = to_document(&PostDoc::from(&original())).expect("to_document");
        assert_eq!(doc.get("type"), Some(&serde_json::json!("original")));
        assert_eq!(doc.get("postId"), Some(&serde_json::json!("p1")));
        assert_eq!(doc.get("orgPostId"), Some(&serde_json::json!("p1")));
        assert_eq!(doc.get("createdAt"), Some(&serde_json::json!(1000)));
        assert_eq!(
            doc.get("attachments"),
            Some(&serde_json::json!([
                { "url": "https://objects/1.png", "type": "image/png" }
            ]))
        );
    }

    #[test]
    fn test_shared_wire_shape_has_no_content() {
        let shared = Post::Shared(SharedPost {
            id: PostId::new("p2"),
            creator: UserId::new("bob"),
            created_at: Timestamp::from_millis(2000),
            org_post_id: PostId::new("p1"),
        });
        let doc = to_document(&PostDoc::from(&shared)).expect("to_document");
        assert_eq!(doc.get("type"), Some(&serde_json::json!("shared")));
        assert_eq!(doc.get("orgPostId"), Some(&serde_json::json!("p1")));
        assert!(doc.get("content").is_none());
        assert!(doc.get("attachments").is_none());
    }

    #[test]
    fn test_org_post_id_resolves_to_self_for_originals() {
        let post = original();
        assert_eq!(post.org_post_id(), post.id());
    }

    #[test]
    fn test_doc_round_trip() {
        let doc = PostDoc::from(&original());
        let json = serde_json::to_value(&doc).expect("serialize");
        let back: PostDoc = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, doc);
    }
}
