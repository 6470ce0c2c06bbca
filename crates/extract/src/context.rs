//! Affective and logistical signal extraction: companions, moods, budget,
//! and preference flags.

use regex::Regex;

use tw_domain::context::{
    Avoidance, Budget, BudgetConstraint, BudgetLevel, Companions, Desire, EmotionalContext,
    FamilyMember, Mood, Preference,
};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Harvest
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Everything the context extractor mined from one utterance.
///
/// Every field degrades to an empty/default value; extraction never fails.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextHarvest {
    pub companions: Companions,
    pub emotion: EmotionalContext,
    pub budget: Budget,
    pub preferences: Vec<Preference>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Keyword tables
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Romantic-partner terms, matched before any family/friend term.
const ROMANTIC: &[(&str, &str)] = &[
    ("女朋友", "girlfriend"),
    ("女友", "girlfriend"),
    ("girlfriend", "girlfriend"),
    ("男朋友", "boyfriend"),
    ("男友", "boyfriend"),
    ("boyfriend", "boyfriend"),
    ("老婆", "wife"),
    ("wife", "wife"),
    ("老公", "husband"),
    ("husband", "husband"),
    ("爱人", "partner"),
    ("伴侣", "partner"),
    ("partner", "partner"),
];

const FAMILY: &[(&str, &[FamilyMember])] = &[
    ("父母", &[FamilyMember::Parent, FamilyMember::Parent]),
    ("爸妈", &[FamilyMember::Parent, FamilyMember::Parent]),
    ("parents", &[FamilyMember::Parent, FamilyMember::Parent]),
    ("妈妈", &[FamilyMember::Parent]),
    ("mother", &[FamilyMember::Parent]),
    ("爸爸", &[FamilyMember::Parent]),
    ("father", &[FamilyMember::Parent]),
    ("孩子", &[FamilyMember::Child]),
    ("小孩", &[FamilyMember::Child]),
    ("儿子", &[FamilyMember::Child]),
    ("女儿", &[FamilyMember::Child]),
    ("kids", &[FamilyMember::Child]),
    ("children", &[FamilyMember::Child]),
    ("son", &[FamilyMember::Child]),
    ("daughter", &[FamilyMember::Child]),
    ("宝宝", &[FamilyMember::Baby]),
    ("baby", &[FamilyMember::Baby]),
    ("爷爷", &[FamilyMember::Elder]),
    ("奶奶", &[FamilyMember::Elder]),
    ("外婆", &[FamilyMember::Elder]),
    ("外公", &[FamilyMember::Elder]),
    ("grandma", &[FamilyMember::Elder]),
    ("grandpa", &[FamilyMember::Elder]),
    ("家人", &[]),
    ("family", &[]),
];

const FRIENDS: &[&str] = &["朋友", "闺蜜", "兄弟", "好友", "friends", "friend", "buddies"];

const COLLEAGUES: &[&str] = &["同事", "团队", "colleagues", "coworkers", "team"];

const SOLO: &[&str] = &["一个人", "独自", "solo", "alone", "by myself"];

const MOODS: &[(Mood, &[&str])] = &[
    (Mood::Romantic, &["浪漫", "romantic"]),
    (Mood::Cozy, &["温馨", "cozy", "cosy"]),
    (Mood::Quiet, &["安静", "清净", "quiet", "peaceful"]),
    (Mood::Lively, &["热闹", "lively", "vibrant"]),
    (Mood::Artistic, &["文艺", "artistic", "artsy"]),
    (Mood::Authentic, &["地道", "authentic"]),
    (Mood::Upscale, &["高端", "奢华", "upscale", "luxury"]),
    (Mood::Simple, &["朴实", "简单", "simple"]),
    (Mood::Unique, &["特色", "独特", "unique"]),
];

/// Words that signal the user wants to steer away from something.
const AVOID_TRIGGERS: &[&str] = &["避开", "不要", "别去", "不想", "讨厌", "avoid", "skip", "hate"];

const AVOID_TOPICS: &[(Avoidance, &[&str])] = &[
    (
        Avoidance::Crowded,
        &["人多", "拥挤", "热门", "人群", "crowded", "crowds", "busy"],
    ),
    (Avoidance::Commercial, &["商业", "commercial", "touristy"]),
    (Avoidance::Viral, &["网红", "viral", "instagram"]),
];

const DESIRES: &[(Desire, &[&str])] = &[
    (Desire::LocalCulture, &["风土人情", "local culture"]),
    (Desire::LocalLife, &["当地生活", "local life"]),
    (Desire::History, &["历史", "history"]),
    (Desire::Culture, &["文化", "culture"]),
    (Desire::Cuisine, &["美食", "cuisine"]),
    (Desire::Experience, &["体验", "感受", "experience"]),
];

const PREFERENCES: &[(Preference, &[&str])] = &[
    (Preference::LocalCulture, &["风土人情", "local culture"]),
    (Preference::LocalSpecialty, &["当地特色", "local specialty"]),
    (
        Preference::OffTheBeatenPath,
        &["非热门", "off the beaten path"],
    ),
    (Preference::Niche, &["小众", "niche", "hidden gem"]),
    (Preference::InternetFamous, &["网红", "viral spot"]),
    (Preference::PhotoSpots, &["打卡", "拍照", "photo spot"]),
    (Preference::FoodFocused, &["美食", "food"]),
    (Preference::ShoppingFocused, &["购物", "shopping"]),
    (Preference::HistoryFocused, &["历史", "history"]),
    (Preference::NatureFocused, &["自然", "nature"]),
    (Preference::ArtFocused, &["艺术", "art"]),
    (Preference::Nightlife, &["夜生活", "nightlife"]),
    (Preference::SlowPaced, &["慢节奏", "slow paced", "slow-paced"]),
    (Preference::InDepth, &["深度游", "in depth", "in-depth"]),
];

const BUDGET_LOW: &[&str] = &["经济", "省钱", "便宜", "穷游", "economy", "cheap", "budget-friendly"];
const BUDGET_HIGH: &[&str] = &["奢华", "高端", "不差钱", "luxury", "high-end", "splurge"];

const CONSTRAINT_MIN: &[&str] = &["不低于", "至少", "at least", "minimum", "no less than"];
const CONSTRAINT_MAX: &[&str] = &["不超过", "最多", "以内", "under", "at most", "within", "no more than"];

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Extractor
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Pure extraction of companions, emotional context, budget, and
/// preferences.
pub struct ContextExtractor {
    amount_wan: Regex,
    amount_qian: Regex,
    amount_k: Regex,
    amount_yuan: Regex,
    amount_tagged: Regex,
}

impl Default for ContextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextExtractor {
    pub fn new() -> Self {
        Self {
            amount_wan: Regex::new(r"(\d+)\s*万").unwrap(),
            amount_qian: Regex::new(r"(\d+)\s*千").unwrap(),
            amount_k: Regex::new(r"(\d+)\s*k\b").unwrap(),
            amount_yuan: Regex::new(r"(\d+)\s*[元块]").unwrap(),
            amount_tagged: Regex::new(r"(?:预算|budget)\D{0,8}?(\d+)").unwrap(),
        }
    }

    /// Mine `text`. Pure: equal input yields equal output; never errors.
    pub fn extract(&self, text: &str) -> ContextHarvest {
        let lower = text.to_lowercase();
        ContextHarvest {
            companions: extract_companions(&lower),
            emotion: extract_emotion(&lower),
            budget: self.extract_budget(&lower),
            preferences: extract_preferences(&lower),
        }
    }

    // ── Budget ────────────────────────────────────────────────────

    fn extract_budget(&self, lower: &str) -> Budget {
        let mut budget = Budget::default();

        let amount = self
            .amount_wan
            .captures(lower)
            .and_then(|c| parse_amount(&c, 10_000))
            .or_else(|| {
                self.amount_qian
                    .captures(lower)
                    .and_then(|c| parse_amount(&c, 1_000))
            })
            .or_else(|| {
                self.amount_k
                    .captures(lower)
                    .and_then(|c| parse_amount(&c, 1_000))
            })
            .or_else(|| {
                self.amount_yuan
                    .captures(lower)
                    .and_then(|c| parse_amount(&c, 1))
            })
            .or_else(|| {
                self.amount_tagged
                    .captures(lower)
                    .and_then(|c| parse_amount(&c, 1))
            });

        if let Some(amount) = amount {
            budget.amount = Some(amount);
            budget.level = Budget::level_for_amount(amount);
        }

        if CONSTRAINT_MIN.iter().any(|w| lower.contains(w)) {
            budget.constraint = Some(BudgetConstraint::Min);
        } else if CONSTRAINT_MAX.iter().any(|w| lower.contains(w)) {
            budget.constraint = Some(BudgetConstraint::Max);
        }

        // Qualitative keywords override the derived level.
        if BUDGET_LOW.iter().any(|w| lower.contains(w)) {
            budget.level = BudgetLevel::Low;
        } else if BUDGET_HIGH.iter().any(|w| lower.contains(w)) {
            budget.level = BudgetLevel::High;
        }

        budget
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Table walkers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn extract_companions(lower: &str) -> Companions {
    for (needle, label) in ROMANTIC {
        if lower.contains(needle) {
            return Companions::Romantic {
                partner_label: (*label).to_string(),
            };
        }
    }

    // Family hits accumulate: "带爸妈和孩子" yields two parents and a child.
    let mut members: Vec<FamilyMember> = Vec::new();
    let mut family_seen = false;
    for (needle, contribution) in FAMILY {
        if lower.contains(needle) {
            family_seen = true;
            members.extend_from_slice(contribution);
        }
    }
    if family_seen {
        return Companions::Family { members };
    }

    if FRIENDS.iter().any(|w| lower.contains(w)) {
        return Companions::Friends { size: 2 };
    }
    if COLLEAGUES.iter().any(|w| lower.contains(w)) {
        return Companions::Colleagues { size: 2 };
    }
    if SOLO.iter().any(|w| lower.contains(w)) {
        return Companions::Solo;
    }
    Companions::Unknown
}

fn extract_emotion(lower: &str) -> EmotionalContext {
    let mut ctx = EmotionalContext::default();

    for (mood, needles) in MOODS {
        if needles.iter().any(|n| lower.contains(n)) {
            ctx.moods.push(*mood);
        }
    }

    if AVOID_TRIGGERS.iter().any(|t| lower.contains(t)) {
        for (avoidance, needles) in AVOID_TOPICS {
            if needles.iter().any(|n| lower.contains(n)) {
                ctx.avoid.push(*avoidance);
            }
        }
    }

    for (desire, needles) in DESIRES {
        if needles.iter().any(|n| lower.contains(n)) {
            ctx.desires.push(*desire);
        }
    }

    ctx.normalize();
    ctx
}

fn extract_preferences(lower: &str) -> Vec<Preference> {
    let mut out: Vec<Preference> = PREFERENCES
        .iter()
        .filter(|(_, needles)| needles.iter().any(|n| lower.contains(n)))
        .map(|(pref, _)| *pref)
        .collect();
    out.sort();
    out.dedup();
    out
}

fn parse_amount(caps: &regex::Captures<'_>, multiplier: u64) -> Option<u64> {
    caps.get(1)?
        .as_str()
        .parse::<u64>()
        .ok()
        .map(|n| n * multiplier)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
