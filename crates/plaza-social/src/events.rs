//! The append-only engagement event log.
//!
//! Every view, flag, and share against an original post is recorded as an
//! event in the post's `events` sub-collection. The log is the source of
//! truth for engagement; the cached sets on [`Engagement`] are derived from
//! it in one pass when the post loads.
//!
//! The log is append-only with one exception: flag events are deleted when
//! the flagger toggles the flag off, so flag state is exactly "a flag event
//! by this user is still present".

use crate::post::Engagement;
use plaza_core::{PostId, Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// Sub-collection holding a post's engagement events.
pub const EVENTS: &str = "events";

/// One engagement event on an original post's log.
///
/// `through_post_id` records the post instance the actor actually
/// interacted with, which may be a share of the original.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EngagementEvent {
    /// A user viewed the post (at most one per user)
    #[serde(rename_all = "camelCase")]
    Viewed {
        /// The original post
        org_post_id: PostId,
        /// The post instance the viewer opened
        through_post_id: PostId,
        /// Who viewed
        viewer: UserId,
        /// When
        timestamp: Timestamp,
    },
    /// A user's flag is raised (deleted again on toggle-off)
    #[serde(rename_all = "camelCase")]
    Flagged {
        /// The original post
        org_post_id: PostId,
        /// The post instance the flagger acted through
        through_post_id: PostId,
        /// Who flagged
        flagger: UserId,
        /// When
        timestamp: Timestamp,
    },
    /// A user shared the post (one event per share action)
    #[serde(rename_all = "camelCase")]
    Shared {
        /// The original post
        org_post_id: PostId,
        /// The post instance the sharer acted through
        through_post_id: PostId,
        /// The share post this action created
        new_post_id: PostId,
        /// Who shared
        sharer: UserId,
        /// When
        timestamp: Timestamp,
    },
}

impl Engagement {
    /// Aggregate a complete event log into distinct-actor sets.
    ///
    /// Share events are per-action, so the log may hold more `shared`
    /// events than `sharers` has members.
    pub fn from_events<I>(events: I) -> Self
    where
        I: IntoIterator<Item = EngagementEvent>,
    {
        let mut engagement = Engagement::default();
        for event in events {
            match event {
                EngagementEvent::Viewed { viewer, .. } => {
                    engagement.viewers.insert(viewer);
                }
                EngagementEvent::Flagged { flagger, .. } => {
                    engagement.flaggers.insert(flagger);
                }
                EngagementEvent::Shared { sharer, .. } => {
                    engagement.sharers.insert(sharer);
                }
            }
        }
        engagement
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewed(viewer: &str) -> EngagementEvent {
        EngagementEvent::Viewed {
            org_post_id: PostId::new("p1"),
            through_post_id: PostId::new("p1"),
            viewer: UserId::new(viewer),
            timestamp: Timestamp::from_millis(1),
        }
    }

    fn shared(sharer: &str, new_post: &str) -> EngagementEvent {
        EngagementEvent::Shared {
            org_post_id: PostId::new("p1"),
            through_post_id: PostId::new("p1"),
            new_post_id: PostId::new(new_post),
            sharer: UserId::new(sharer),
            timestamp: Timestamp::from_millis(2),
        }
    }

    #[test]
    fn test_empty_log_aggregates_to_empty_sets() {
        let engagement = Engagement::from_events([]);
        assert!(engagement.viewers.is_empty());
        assert!(engagement.flaggers.is_empty());
        assert!(engagement.sharers.is_empty());
    }

    #[test]
    fn test_sharers_are_distinct_actors_not_event_count() {
        let engagement =
            Engagement::from_events([shared("dave", "p2"), shared("dave", "p3"), shared("erin", "p4")]);
        assert_eq!(engagement.sharers.len(), 2);
        assert!(engagement.sharers.contains(&UserId::new("dave")));
        assert!(engagement.sharers.contains(&UserId::new("erin")));
    }

    #[test]
    fn test_actors_sorted_into_their_own_sets() {
        let engagement = Engagement::from_events([
            viewed("bob"),
            EngagementEvent::Flagged {
                org_post_id: PostId::new("p1"),
                through_post_id: PostId::new("p1"),
                flagger: UserId::new("carol"),
                timestamp: Timestamp::from_millis(3),
            },
            shared("dave", "p2"),
        ]);
        assert_eq!(engagement.viewers.len(), 1);
        assert_eq!(engagement.flaggers.len(), 1);
        assert_eq!(engagement.sharers.len(), 1);
        assert!(engagement.viewers.contains(&UserId::new("bob")));
        assert!(engagement.flaggers.contains(&UserId::new("carol")));
    }

    #[test]
    fn test_event_wire_shape() {
        let event = viewed("bob");
        let json = serde_json::to_value(&event).expect("serialize");
        assert_eq!(json["type"], "viewed");
        assert_eq!(json["orgPostId"], "p1");
        assert_eq!(json["throughPostId"], "p1");
        assert_eq!(json["viewer"], "bob");
    }
}
