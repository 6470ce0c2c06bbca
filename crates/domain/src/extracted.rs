//! Deterministic extraction output: keywords, locations, activities, days,
//! routes, and time-of-day hints, plus the bundled [`Extracted`] record that
//! lands in a turn.

use serde::{Deserialize, Serialize};

use crate::context::{Budget, Companions, EmotionalContext, Preference};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Keyword and location candidates
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A mined keyword with its deterministic priority weight.
///
/// Weights rank candidates for the bounded InputHints budget; higher wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedKeyword {
    pub text: String,
    pub weight: i32,
}

/// A location mention resolved against the region vocabulary.
///
/// `verified` is false for candidates that only matched the location-shaped
/// pattern; those are routed through InputHints before being trusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationMatch {
    pub name: String,
    pub verified: bool,
}

/// Closed set of recognised activity classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityClass {
    Shopping,
    Cuisine,
    Culture,
    Entertainment,
    Nature,
    Business,
    Family,
    Leisure,
    Sightseeing,
}

impl ActivityClass {
    /// POI search keyword for this class, in the region's language.
    pub fn search_keyword(self) -> &'static str {
        match self {
            ActivityClass::Shopping => "购物",
            ActivityClass::Cuisine => "美食",
            ActivityClass::Culture => "文化",
            ActivityClass::Entertainment => "娱乐",
            ActivityClass::Nature => "自然",
            ActivityClass::Business => "商务",
            ActivityClass::Family => "亲子",
            ActivityClass::Leisure => "休闲",
            ActivityClass::Sightseeing => "景点",
        }
    }
}

/// Time-of-day hints mentioned in the utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

/// An origin → destination pair, explicit or inferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub start: String,
    pub end: String,
    /// False when the pair was inferred from location order rather than an
    /// explicit "from X to Y" phrase.
    pub explicit: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Extracted — the per-turn record
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Everything the extractors mined from one utterance.
///
/// Extraction is pure; running it twice on the same text yields an equal
/// value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extracted {
    pub keywords: Vec<WeightedKeyword>,
    pub locations: Vec<LocationMatch>,
    pub activities: Vec<ActivityClass>,
    pub days: u8,
    pub route: Option<Route>,
    pub times_of_day: Vec<TimeOfDay>,
    pub companions: Companions,
    pub emotion: EmotionalContext,
    pub budget: Budget,
    pub preferences: Vec<Preference>,
    pub intent_summary: String,
}

impl Extracted {
    /// Verified location names, in mention order.
    pub fn verified_locations(&self) -> Vec<&str> {
        self.locations
            .iter()
            .filter(|l| l.verified)
            .map(|l| l.name.as_str())
            .collect()
    }

    /// Unverified candidates, in mention order.
    pub fn unverified_locations(&self) -> Vec<&str> {
        self.locations
            .iter()
            .filter(|l| !l.verified)
            .map(|l| l.name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_partitions() {
        let ex = Extracted {
            locations: vec![
                LocationMatch {
                    name: "外滩".into(),
                    verified: true,
                },
                LocationMatch {
                    name: "幻想新区".into(),
                    verified: false,
                },
            ],
            ..Default::default()
        };
        assert_eq!(ex.verified_locations(), vec!["外滩"]);
        assert_eq!(ex.unverified_locations(), vec!["幻想新区"]);
    }
}
