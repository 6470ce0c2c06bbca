use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Service kinds
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The closed set of upstream service families a reasoning step can require.
///
/// `Crowd` is modelled but currently has no provider; the plan resolver never
/// emits specs for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    Weather,
    Poi,
    Navigation,
    Traffic,
    Crowd,
    InputHints,
}

impl ServiceKind {
    /// All kinds, in scheduling-priority order (lowest first).
    pub const ALL: [ServiceKind; 6] = [
        ServiceKind::InputHints,
        ServiceKind::Weather,
        ServiceKind::Poi,
        ServiceKind::Navigation,
        ServiceKind::Traffic,
        ServiceKind::Crowd,
    ];
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ServiceKind::Weather => "weather",
            ServiceKind::Poi => "poi",
            ServiceKind::Navigation => "navigation",
            ServiceKind::Traffic => "traffic",
            ServiceKind::Crowd => "crowd",
            ServiceKind::InputHints => "input_hints",
        };
        f.write_str(s)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Thought
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One step of the reasoning chain.
///
/// `step` values within a chain are contiguous and start at 1; `keywords`
/// preserves insertion order with duplicates removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thought {
    pub step: u32,
    pub text: String,
    pub keywords: Vec<String>,
    pub services: Vec<ServiceKind>,
    pub rationale: String,
    pub ts: DateTime<Utc>,
}

impl Thought {
    pub fn new(
        step: u32,
        text: impl Into<String>,
        keywords: Vec<String>,
        services: Vec<ServiceKind>,
        rationale: impl Into<String>,
    ) -> Self {
        Self {
            step,
            text: text.into(),
            keywords: dedup_preserving_order(keywords),
            services: dedup_preserving_order(services),
            rationale: rationale.into(),
            ts: Utc::now(),
        }
    }

    /// True when this step requires `kind`.
    pub fn requires(&self, kind: ServiceKind) -> bool {
        self.services.contains(&kind)
    }
}

fn dedup_preserving_order<T: PartialEq>(items: Vec<T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_deduplicate_preserving_order() {
        let t = Thought::new(
            1,
            "check weather",
            vec!["bund".into(), "weather".into(), "bund".into()],
            vec![ServiceKind::Weather, ServiceKind::Weather],
            "",
        );
        assert_eq!(t.keywords, vec!["bund".to_string(), "weather".to_string()]);
        assert_eq!(t.services, vec![ServiceKind::Weather]);
    }

    #[test]
    fn requires_matches_services() {
        let t = Thought::new(2, "route", vec![], vec![ServiceKind::Navigation], "");
        assert!(t.requires(ServiceKind::Navigation));
        assert!(!t.requires(ServiceKind::Weather));
    }
}
