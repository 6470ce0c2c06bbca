use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::thought::ServiceKind;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Provider identity
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Identity of one rate-limited upstream account.
///
/// Distinct from [`ServiceKind`]: a provider is the unit the vendor meters,
/// a kind is the unit the planner reasons about. Geocoding shares the hints
/// key upstream but is metered separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKey {
    Weather,
    Poi,
    Navigation,
    Traffic,
    Geocode,
    Hints,
}

impl ProviderKey {
    pub const ALL: [ProviderKey; 6] = [
        ProviderKey::Weather,
        ProviderKey::Poi,
        ProviderKey::Navigation,
        ProviderKey::Traffic,
        ProviderKey::Geocode,
        ProviderKey::Hints,
    ];

    /// The provider a service kind is metered against.
    pub fn for_kind(kind: ServiceKind) -> ProviderKey {
        match kind {
            ServiceKind::Weather => ProviderKey::Weather,
            ServiceKind::Poi | ServiceKind::Crowd => ProviderKey::Poi,
            ServiceKind::Navigation => ProviderKey::Navigation,
            ServiceKind::Traffic => ProviderKey::Traffic,
            ServiceKind::InputHints => ProviderKey::Hints,
        }
    }
}

impl std::fmt::Display for ProviderKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProviderKey::Weather => "weather",
            ProviderKey::Poi => "poi",
            ProviderKey::Navigation => "navigation",
            ProviderKey::Traffic => "traffic",
            ProviderKey::Geocode => "geocode",
            ProviderKey::Hints => "hints",
        };
        f.write_str(s)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Limits
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Per-provider rate caps and per-call deadlines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Calls per second per provider; providers absent from the map use
    /// `default_qps`.
    #[serde(default)]
    pub per_provider_qps: HashMap<ProviderKey, u32>,
    #[serde(default = "d_3")]
    pub default_qps: u32,
    /// Wall-time bound for one upstream call.
    #[serde(default = "d_10000")]
    pub per_call_timeout_ms: u64,
    /// Tighter bound for input-tips lookups.
    #[serde(default = "d_5000")]
    pub hints_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            per_provider_qps: HashMap::new(),
            default_qps: d_3(),
            per_call_timeout_ms: d_10000(),
            hints_timeout_ms: d_5000(),
        }
    }
}

impl LimitsConfig {
    /// Effective QPS cap for a provider.
    pub fn qps(&self, provider: ProviderKey) -> u32 {
        self.per_provider_qps
            .get(&provider)
            .copied()
            .unwrap_or(self.default_qps)
            .max(1)
    }

    /// Effective per-call timeout for a service kind.
    pub fn timeout_ms(&self, kind: ServiceKind) -> u64 {
        match kind {
            ServiceKind::InputHints => self.hints_timeout_ms,
            _ => self.per_call_timeout_ms,
        }
    }
}

fn d_3() -> u32 {
    3
}

fn d_10000() -> u64 {
    10_000
}

fn d_5000() -> u64 {
    5_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qps_falls_back_to_default() {
        let mut limits = LimitsConfig::default();
        assert_eq!(limits.qps(ProviderKey::Weather), 3);
        limits.per_provider_qps.insert(ProviderKey::Weather, 10);
        assert_eq!(limits.qps(ProviderKey::Weather), 10);
        assert_eq!(limits.qps(ProviderKey::Poi), 3);
    }

    #[test]
    fn qps_never_zero() {
        let mut limits = LimitsConfig::default();
        limits.per_provider_qps.insert(ProviderKey::Hints, 0);
        assert_eq!(limits.qps(ProviderKey::Hints), 1);
    }

    #[test]
    fn hints_get_the_short_timeout() {
        let limits = LimitsConfig::default();
        assert_eq!(limits.timeout_ms(ServiceKind::InputHints), 5_000);
        assert_eq!(limits.timeout_ms(ServiceKind::Weather), 10_000);
    }
}
