//! Data-collection plans: which upstream calls a turn needs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::thought::ServiceKind;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ServiceCallSpec
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One planned upstream call.
///
/// Identity is `(kind, key)`: two specs with equal kind and key describe the
/// same upstream call and must be collapsed by the collector. `params` and
/// `priority` do not participate in identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceCallSpec {
    pub kind: ServiceKind,
    /// Canonical cache key, e.g. the location name or "origin->destination".
    pub key: String,
    /// Call parameters; a sorted map keeps plan serialisation stable.
    pub params: BTreeMap<String, String>,
    /// Scheduling priority. Higher dispatches earlier; never affects
    /// correctness.
    pub priority: u8,
}

impl ServiceCallSpec {
    pub fn new(kind: ServiceKind, key: impl Into<String>, priority: u8) -> Self {
        Self {
            kind,
            key: key.into(),
            params: BTreeMap::new(),
            priority,
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// The deduplication identity.
    pub fn dedup_key(&self) -> (ServiceKind, &str) {
        (self.kind, self.key.as_str())
    }
}

impl PartialEq for ServiceCallSpec {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.key == other.key
    }
}

impl Eq for ServiceCallSpec {}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PlanSpec
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The resolved plan for one turn: a duplicate-free set of calls plus flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanSpec {
    pub specs: Vec<ServiceCallSpec>,
    /// True when no location was extracted and the region default was used.
    pub used_default_location: bool,
    /// True when a route (explicit or inferred) shaped the plan.
    pub has_route: bool,
}

impl PlanSpec {
    /// Number of specs of the given kind.
    pub fn count(&self, kind: ServiceKind) -> usize {
        self.specs.iter().filter(|s| s.kind == kind).count()
    }

    /// All specs of the given kind, in plan order.
    pub fn of_kind(&self, kind: ServiceKind) -> Vec<&ServiceCallSpec> {
        self.specs.iter().filter(|s| s.kind == kind).collect()
    }

    /// Push a spec unless an equal `(kind, key)` one is already present.
    pub fn push_unique(&mut self, spec: ServiceCallSpec) {
        if !self.specs.contains(&spec) {
            self.specs.push(spec);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_kind_and_key_only() {
        let a = ServiceCallSpec::new(ServiceKind::Weather, "外滩", 1).with_param("days", "3");
        let b = ServiceCallSpec::new(ServiceKind::Weather, "外滩", 4).with_param("days", "1");
        let c = ServiceCallSpec::new(ServiceKind::Poi, "外滩", 1);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn push_unique_drops_duplicates() {
        let mut plan = PlanSpec::default();
        plan.push_unique(ServiceCallSpec::new(ServiceKind::Weather, "外滩", 1));
        plan.push_unique(ServiceCallSpec::new(ServiceKind::Weather, "外滩", 1));
        plan.push_unique(ServiceCallSpec::new(ServiceKind::Weather, "豫园", 1));
        assert_eq!(plan.count(ServiceKind::Weather), 2);
    }
}
