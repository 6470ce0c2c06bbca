//! Affective and logistical context mined from an utterance.
//!
//! Companions, moods, budget, and preference flags. Absence is always
//! representable: an utterance that says nothing about companions yields
//! [`Companions::Unknown`], not `Solo`.

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Companions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Family member roles accumulated from the utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FamilyMember {
    Parent,
    Child,
    Baby,
    Elder,
}

/// Who the user travels with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Companions {
    /// Nothing in the utterance mentioned companions.
    Unknown,
    Solo,
    Romantic {
        partner_label: String,
    },
    Family {
        members: Vec<FamilyMember>,
    },
    Friends {
        size: u32,
    },
    Colleagues {
        size: u32,
    },
}

impl Default for Companions {
    fn default() -> Self {
        Companions::Unknown
    }
}

impl Companions {
    /// Party size including the user, when derivable.
    pub fn party_size(&self) -> Option<u32> {
        match self {
            Companions::Unknown => None,
            Companions::Solo => Some(1),
            Companions::Romantic { .. } => Some(2),
            Companions::Family { members } => Some(1 + members.len() as u32),
            Companions::Friends { size } | Companions::Colleagues { size } => Some(*size),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Emotional context
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Romantic,
    Cozy,
    Quiet,
    Lively,
    Artistic,
    Authentic,
    Upscale,
    Simple,
    Unique,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Avoidance {
    Crowded,
    Commercial,
    Viral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Desire {
    LocalCulture,
    LocalLife,
    History,
    Culture,
    Cuisine,
    Experience,
}

/// Moods to lean into, things to avoid, experiences to seek.
///
/// All three sets may be empty; sets are kept sorted so equal contexts
/// compare equal regardless of extraction order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionalContext {
    pub moods: Vec<Mood>,
    pub avoid: Vec<Avoidance>,
    pub desires: Vec<Desire>,
}

impl EmotionalContext {
    pub fn is_empty(&self) -> bool {
        self.moods.is_empty() && self.avoid.is_empty() && self.desires.is_empty()
    }

    /// Sort and deduplicate all three sets in place.
    pub fn normalize(&mut self) {
        self.moods.sort();
        self.moods.dedup();
        self.avoid.sort();
        self.avoid.dedup();
        self.desires.sort();
        self.desires.dedup();
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Budget
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetLevel {
    Low,
    Medium,
    MediumHigh,
    High,
}

impl Default for BudgetLevel {
    fn default() -> Self {
        BudgetLevel::Medium
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetConstraint {
    Min,
    Max,
}

/// Trip budget in local currency units.
///
/// `level` is always set; when `amount` is present the level is derived from
/// it unless a qualitative keyword overrode it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub amount: Option<u64>,
    pub level: BudgetLevel,
    pub constraint: Option<BudgetConstraint>,
}

impl Budget {
    /// Level implied by an absolute amount.
    pub fn level_for_amount(amount: u64) -> BudgetLevel {
        if amount >= 20_000 {
            BudgetLevel::High
        } else if amount >= 10_000 {
            BudgetLevel::MediumHigh
        } else if amount >= 5_000 {
            BudgetLevel::Medium
        } else {
            BudgetLevel::Low
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Preferences
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Special-interest flags the extractor mines from a keyword table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preference {
    LocalCulture,
    LocalSpecialty,
    OffTheBeatenPath,
    Niche,
    InternetFamous,
    PhotoSpots,
    FoodFocused,
    ShoppingFocused,
    HistoryFocused,
    NatureFocused,
    ArtFocused,
    Nightlife,
    SlowPaced,
    InDepth,
}
