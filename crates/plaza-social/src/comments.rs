//! Per-post comments.
//!
//! Comments live in a `comments` sub-collection under the post document the
//! user commented through: a comment on a share stays on the share, it is
//! not redirected to the original. Comments are immutable once created and
//! displayed newest-first.

use plaza_core::{Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// Sub-collection holding a post's comments.
pub const COMMENTS: &str = "comments";

/// A comment on a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment text (stored as `comment`)
    pub comment: String,
    /// Who commented
    pub commenter: UserId,
    /// When
    pub timestamp: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_field_names() {
        let comment = Comment {
            comment: "nice".to_string(),
            commenter: UserId::new("bob"),
            timestamp: Timestamp::from_millis(5),
        };
        let json = serde_json::to_value(&comment).expect("serialize");
        assert_eq!(json["comment"], "nice");
        assert_eq!(json["commenter"], "bob");
        assert_eq!(json["timestamp"], 5);
    }
}
