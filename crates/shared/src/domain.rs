use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::error::UnknownGender;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(PlaceId);
id_newtype!(FoodId);

/// A pickup place chosen by the user; drives which daily menu is fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub id: PlaceId,
    pub name: String,
}

/// One dish of the daily menu. Immutable once fetched; the whole list is
/// replaced on every successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    #[serde(rename = "foodId")]
    pub food_id: FoodId,
    #[serde(rename = "foodName")]
    pub name: String,
    #[serde(rename = "foodBrief", default)]
    pub brief: String,
    pub price: f64,
    #[serde(rename = "originPrice")]
    pub original_price: f64,
    #[serde(rename = "star", default)]
    pub rating: u8,
    #[serde(rename = "extralImage", default)]
    pub gallery: Vec<String>,
}

/// Wire encoding is the bare integer code used by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Gender {
    #[default]
    Secret,
    Female,
    Male,
}

impl From<Gender> for u8 {
    fn from(value: Gender) -> Self {
        match value {
            Gender::Secret => 0,
            Gender::Female => 1,
            Gender::Male => 2,
        }
    }
}

impl TryFrom<u8> for Gender {
    type Error = UnknownGender;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Gender::Secret),
            1 => Ok(Gender::Female),
            2 => Ok(Gender::Male),
            other => Err(UnknownGender(other)),
        }
    }
}

/// Editable fields of [`UserProfile`]. The phone number is the read-only
/// account key and is deliberately absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Nickname,
    Email,
    Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub phone: String,
    #[serde(rename = "nickName")]
    pub nickname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub gender: Gender,
    #[serde(rename = "profileImg", default)]
    pub avatar: String,
}

impl UserProfile {
    /// Functional update: returns a new record with one field replaced.
    /// The previous record is never mutated, so a saved snapshot compared
    /// by structural equality stays a reliable dirty check.
    pub fn with_field(&self, field: ProfileField, value: impl Into<String>) -> Self {
        let value = value.into();
        let mut next = self.clone();
        match field {
            ProfileField::Nickname => next.nickname = value,
            ProfileField::Email => next.email = value,
            ProfileField::Address => next.address = value,
        }
        next
    }

    pub fn with_gender(&self, gender: Gender) -> Self {
        let mut next = self.clone();
        next.gender = gender;
        next
    }
}

/// Result of the device image picker: a display URI plus the raw bytes the
/// upload call ships to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoSelection {
    pub uri: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Logged-in user identity cached on the device and broadcast to screens
/// through the session context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub session_id: String,
    #[serde(rename = "nickName")]
    pub nickname: String,
    #[serde(rename = "profileImg", default)]
    pub avatar: String,
    pub phone: String,
}

/// Display values derived from the two timestamps of a menu fetch.
/// Recomputed wholesale on every successful fetch, never field by field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DateWindow {
    pub date: String,
    pub weekday: String,
    pub deadline: String,
}

impl DateWindow {
    /// Both inputs are millisecond unix timestamps from the menu payload.
    /// An unrepresentable timestamp yields the empty window rather than a
    /// partially filled one.
    pub fn from_millis(timestamp_ms: i64, end_timestamp_ms: i64) -> Self {
        let (Some(start), Some(end)) = (
            DateTime::from_timestamp_millis(timestamp_ms),
            DateTime::from_timestamp_millis(end_timestamp_ms),
        ) else {
            return Self::default();
        };

        Self {
            date: start.format("%m-%d-%Y").to_string(),
            weekday: start.format("%A").to_string(),
            deadline: format!("order by {}", end.format("%H:%M %A, %b %d")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_round_trips_through_wire_code() {
        for gender in [Gender::Secret, Gender::Female, Gender::Male] {
            let encoded = serde_json::to_string(&gender).expect("encode");
            let decoded: Gender = serde_json::from_str(&encoded).expect("decode");
            assert_eq!(decoded, gender);
        }
        assert!(serde_json::from_str::<Gender>("7").is_err());
    }

    fn sample_profile() -> UserProfile {
        UserProfile {
            phone: "85200001111".to_string(),
            nickname: "momo".to_string(),
            email: "momo@example.com".to_string(),
            address: "Queen's Road".to_string(),
            gender: Gender::Secret,
            avatar: "https://cdn.example.com/a.png".to_string(),
        }
    }

    #[test]
    fn with_field_replaces_exactly_one_field_and_leaves_source_intact() {
        let original = sample_profile();
        let edited = original.with_field(ProfileField::Email, "new@example.com");

        assert_eq!(edited.email, "new@example.com");
        assert_eq!(edited.nickname, original.nickname);
        assert_eq!(original.email, "momo@example.com");
        assert_ne!(edited, original);
    }

    #[test]
    fn profile_wire_names_match_backend() {
        let profile = sample_profile();
        let json = serde_json::to_value(&profile).expect("encode");
        assert_eq!(json["nickName"], "momo");
        assert_eq!(json["profileImg"], "https://cdn.example.com/a.png");
        assert_eq!(json["gender"], 0);
    }

    #[test]
    fn date_window_derives_all_three_display_values() {
        let window = DateWindow::from_millis(1_700_000_000_000, 1_700_003_600_000);
        assert_eq!(window.date, "11-14-2023");
        assert_eq!(window.weekday, "Tuesday");
        assert_eq!(window.deadline, "order by 23:13 Tuesday, Nov 14");
    }

    #[test]
    fn date_window_is_empty_for_unrepresentable_timestamps() {
        assert_eq!(DateWindow::from_millis(i64::MAX, 0), DateWindow::default());
    }
}
