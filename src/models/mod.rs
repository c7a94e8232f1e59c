use std::fmt::Display;

use chrono::Timelike;
use serde::{Deserialize, Serialize};

use crate::catalog::CategoryGroup;

/// One of the five time-of-day buckets used to bias suggestions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Daypart {
    Morning,
    Lunch,
    Afternoon,
    Evening,
    LateNight,
}

impl Daypart {
    /// Classifies an hour of day into its daypart.
    ///
    /// Boundaries are half-open: morning `[6,11)`, lunch `[11,15)`,
    /// afternoon `[15,17)`, evening `[17,22)`, late night `>= 22` or `< 6`.
    /// Returns `None` only for hours outside `[0,24)`, so callers can decide
    /// on their own fallback.
    pub fn classify(hour: u32) -> Option<Self> {
        match hour {
            6..=10 => Some(Daypart::Morning),
            11..=14 => Some(Daypart::Lunch),
            15..=16 => Some(Daypart::Afternoon),
            17..=21 => Some(Daypart::Evening),
            0..=5 | 22..=23 => Some(Daypart::LateNight),
            _ => None,
        }
    }

    /// Total classification: hours past 23 count as late night (`hour >= 22`)
    pub fn from_hour(hour: u32) -> Self {
        Self::classify(hour).unwrap_or(Daypart::LateNight)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Daypart::Morning => "morning",
            Daypart::Lunch => "lunch",
            Daypart::Afternoon => "afternoon",
            Daypart::Evening => "evening",
            Daypart::LateNight => "lateNight",
        }
    }
}

impl Display for Daypart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Client-supplied wall-clock information, extracted from request headers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientTime {
    /// Hour of day in the client's timezone, 0-23
    pub client_hour: Option<u32>,
    /// Minutes offset from UTC, as reported by the client
    pub timezone_offset: Option<i32>,
}

impl ClientTime {
    pub fn new(client_hour: Option<u32>, timezone_offset: Option<i32>) -> Self {
        Self {
            client_hour,
            timezone_offset,
        }
    }

    /// The hour suggestions should be computed for.
    ///
    /// A missing or out-of-range client hour falls back to the server's local
    /// hour so the request still succeeds, at the cost of possibly missing
    /// the user's actual daypart.
    pub fn effective_hour(&self) -> u32 {
        match self.client_hour {
            Some(hour) if hour < 24 => hour,
            Some(hour) => {
                tracing::debug!(hour, "client hour out of range, using server time");
                chrono::Local::now().hour()
            }
            None => chrono::Local::now().hour(),
        }
    }
}

/// A per-type interaction counter for one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypePreference {
    pub place_type: String,
    pub count: i64,
}

/// A user's interaction history with place types, split into two tiers.
///
/// `primary_types` counts interactions where the type was the place's primary
/// type; `all_types` counts appearances anywhere in a place's type list. Both
/// arrive pre-sorted descending by count from the persistence layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTypePreferences {
    pub primary_types: Vec<TypePreference>,
    pub all_types: Vec<TypePreference>,
}

impl UserTypePreferences {
    pub fn is_empty(&self) -> bool {
        self.primary_types.is_empty() && self.all_types.is_empty()
    }

    /// Full preference count used for the exploitation ratio schedule
    pub fn preference_count(&self) -> usize {
        self.primary_types.len() + self.all_types.len()
    }
}

/// Where the returned suggestion list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionSource {
    /// Time-based defaults (anonymous user, empty preferences, or fallback)
    Default,
    /// Exploitation alone filled the budget
    UserPreferences,
    /// Exploration alone filled the budget
    Exploration,
    /// A blend of exploitation and exploration
    Mixed,
}

/// A category suggestion emitted to the caller, annotated with provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    #[serde(flatten)]
    pub group: CategoryGroup,
    #[serde(default)]
    pub is_category_exploration: bool,
    #[serde(default)]
    pub is_random_exploration: bool,
}

impl Suggestion {
    /// A suggestion drawn from defaults or the user's own history
    pub fn from_group(group: CategoryGroup) -> Self {
        Self {
            group,
            is_category_exploration: false,
            is_random_exploration: false,
        }
    }

    /// A suggestion picked by the weighted exploration sampler
    pub fn random_exploration(group: CategoryGroup) -> Self {
        Self {
            group,
            is_category_exploration: false,
            is_random_exploration: true,
        }
    }

    pub fn id(&self) -> &str {
        &self.group.id
    }
}

/// Response metadata describing how the suggestion list was assembled.
///
/// The exploitation/exploration id lists exist so the UI can render
/// provenance without re-deriving the split.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionMetadata {
    pub source: Option<SuggestionSource>,
    pub has_preferences: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_preferences_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exploration_used: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exploitation_suggestions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exploration_suggestions: Option<Vec<String>>,
}

/// The engine's full output for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionResponse {
    pub suggestions: Vec<Suggestion>,
    pub metadata: SuggestionMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daypart_partition_is_exhaustive() {
        for hour in 0..24 {
            assert!(
                Daypart::classify(hour).is_some(),
                "hour {} has no daypart",
                hour
            );
        }
    }

    #[test]
    fn test_daypart_boundaries() {
        assert_eq!(Daypart::from_hour(5), Daypart::LateNight);
        assert_eq!(Daypart::from_hour(6), Daypart::Morning);
        assert_eq!(Daypart::from_hour(10), Daypart::Morning);
        assert_eq!(Daypart::from_hour(11), Daypart::Lunch);
        assert_eq!(Daypart::from_hour(14), Daypart::Lunch);
        assert_eq!(Daypart::from_hour(15), Daypart::Afternoon);
        assert_eq!(Daypart::from_hour(16), Daypart::Afternoon);
        assert_eq!(Daypart::from_hour(17), Daypart::Evening);
        assert_eq!(Daypart::from_hour(21), Daypart::Evening);
        assert_eq!(Daypart::from_hour(22), Daypart::LateNight);
        assert_eq!(Daypart::from_hour(23), Daypart::LateNight);
        assert_eq!(Daypart::from_hour(0), Daypart::LateNight);
    }

    #[test]
    fn test_classify_rejects_out_of_range_hours() {
        assert_eq!(Daypart::classify(24), None);
        assert_eq!(Daypart::classify(99), None);
    }

    #[test]
    fn test_effective_hour_uses_client_hour_when_valid() {
        let time = ClientTime::new(Some(8), Some(-300));
        assert_eq!(time.effective_hour(), 8);
    }

    #[test]
    fn test_effective_hour_falls_back_for_invalid_hour() {
        let time = ClientTime::new(Some(27), None);
        assert!(time.effective_hour() < 24);
    }

    #[test]
    fn test_effective_hour_falls_back_when_missing() {
        let time = ClientTime::default();
        assert!(time.effective_hour() < 24);
    }

    #[test]
    fn test_preference_count_sums_both_tiers() {
        let prefs = UserTypePreferences {
            primary_types: vec![TypePreference {
                place_type: "cafe".to_string(),
                count: 4,
            }],
            all_types: vec![
                TypePreference {
                    place_type: "cafe".to_string(),
                    count: 6,
                },
                TypePreference {
                    place_type: "bar".to_string(),
                    count: 1,
                },
            ],
        };
        assert!(!prefs.is_empty());
        assert_eq!(prefs.preference_count(), 3);
    }

    #[test]
    fn test_suggestion_source_wire_names() {
        assert_eq!(
            serde_json::to_value(SuggestionSource::Default).unwrap(),
            "default"
        );
        assert_eq!(
            serde_json::to_value(SuggestionSource::UserPreferences).unwrap(),
            "user_preferences"
        );
        assert_eq!(
            serde_json::to_value(SuggestionSource::Mixed).unwrap(),
            "mixed"
        );
    }

    #[test]
    fn test_daypart_wire_names() {
        assert_eq!(
            serde_json::to_value(Daypart::LateNight).unwrap(),
            "lateNight"
        );
        assert_eq!(Daypart::LateNight.to_string(), "lateNight");
    }
}
