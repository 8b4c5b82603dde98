//! User profiles.
//!
//! A profile is created once when the user completes sign-up and mutated
//! field-by-field afterwards. Both the remote document and the cache entry
//! use merge semantics: a partial update touches exactly the fields it
//! names.

use plaza_core::{Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// Collection holding profile documents, keyed by user id.
pub const USERS: &str = "users";

/// A user's profile document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    /// Display name
    pub name: String,
    /// Free-form bio
    pub bio: String,
    /// Self-described gender, stored verbatim from the details form
    pub gender: String,
    /// Year of birth
    pub birth_year: u16,
    /// Reserved for a future friends feature; currently always empty
    pub friends: Vec<UserId>,
}

impl Profile {
    /// Age as the app displays it: a plain calendar-year difference.
    pub fn age(&self, now: Timestamp) -> u16 {
        let years = now.year() - i32::from(self.birth_year);
        years.clamp(0, i32::from(u16::MAX)) as u16
    }

    /// Field-level merge of a partial update; unset fields are untouched.
    pub fn apply(&mut self, update: &ProfileUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(bio) = &update.bio {
            self.bio = bio.clone();
        }
        if let Some(gender) = &update.gender {
            self.gender = gender.clone();
        }
        if let Some(birth_year) = update.birth_year {
            self.birth_year = birth_year;
        }
    }
}

/// A partial profile update.
///
/// Unset fields are omitted from the remote partial update and left
/// untouched in the cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    /// New display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New bio
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// New gender
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// New birth year
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_year: Option<u16>,
}

impl ProfileUpdate {
    /// Whether the update names no fields at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.bio.is_none()
            && self.gender.is_none()
            && self.birth_year.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_merges_only_named_fields() {
        let mut profile = Profile {
            name: "Alice".to_string(),
            bio: "hi".to_string(),
            gender: "female".to_string(),
            birth_year: 1990,
            friends: Vec::new(),
        };
        profile.apply(&ProfileUpdate {
            bio: Some("hello there".to_string()),
            ..ProfileUpdate::default()
        });
        assert_eq!(profile.name, "Alice");
        assert_eq!(profile.bio, "hello there");
        assert_eq!(profile.birth_year, 1990);
    }

    #[test]
    fn test_partial_update_omits_unset_fields_on_the_wire() {
        let update = ProfileUpdate {
            name: Some("Bob".to_string()),
            ..ProfileUpdate::default()
        };
        let json = serde_json::to_value(&update).expect("serialize");
        let fields = json.as_object().expect("object");
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get("name"), Some(&serde_json::json!("Bob")));
    }

    #[test]
    fn test_partial_document_deserializes_with_defaults() {
        let profile: Profile =
            serde_json::from_value(serde_json::json!({ "name": "Bob" })).expect("deserialize");
        assert_eq!(profile.name, "Bob");
        assert_eq!(profile.bio, "");
        assert_eq!(profile.birth_year, 0);
    }

    #[test]
    fn test_age_is_calendar_year_difference() {
        let profile = Profile {
            birth_year: 1990,
            ..Profile::default()
        };
        // 2023-11-14
        assert_eq!(profile.age(Timestamp::from_millis(1_700_000_000_000)), 33);
    }
}
