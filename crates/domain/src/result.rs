//! Collected upstream results: one [`ServiceResult`] per dispatched spec,
//! grouped per kind into a [`ResultBundle`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;
use crate::payload::ServicePayload;
use crate::thought::ServiceKind;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ServiceResult
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The outcome of one dispatched spec. Every spec yields exactly one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ServiceResult {
    Ok {
        kind: ServiceKind,
        key: String,
        payload: ServicePayload,
    },
    Err {
        kind: ServiceKind,
        key: String,
        err: ErrorKind,
        detail: String,
    },
}

impl ServiceResult {
    pub fn kind(&self) -> ServiceKind {
        match self {
            ServiceResult::Ok { kind, .. } | ServiceResult::Err { kind, .. } => *kind,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            ServiceResult::Ok { key, .. } | ServiceResult::Err { key, .. } => key,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ServiceResult::Ok { .. })
    }

    pub fn payload(&self) -> Option<&ServicePayload> {
        match self {
            ServiceResult::Ok { payload, .. } => Some(payload),
            ServiceResult::Err { .. } => None,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ResultBundle
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// All results for one turn, grouped per kind.
///
/// Lists are sorted by spec key before the bundle is handed to the composer,
/// so downstream output is deterministic regardless of completion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultBundle {
    pub results: BTreeMap<ServiceKind, Vec<ServiceResult>>,
}

impl ResultBundle {
    pub fn push(&mut self, result: ServiceResult) {
        self.results.entry(result.kind()).or_default().push(result);
    }

    /// Sort each per-kind list by key.
    pub fn canonicalize(&mut self) {
        for list in self.results.values_mut() {
            list.sort_by(|a, b| a.key().cmp(b.key()));
        }
    }

    pub fn of_kind(&self, kind: ServiceKind) -> &[ServiceResult] {
        self.results.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Successful results of a kind, in key order.
    pub fn ok_of_kind(&self, kind: ServiceKind) -> Vec<&ServiceResult> {
        self.of_kind(kind).iter().filter(|r| r.is_ok()).collect()
    }

    /// True when the kind was dispatched but produced no `Ok` at all.
    pub fn kind_failed_entirely(&self, kind: ServiceKind) -> bool {
        let list = self.of_kind(kind);
        !list.is_empty() && list.iter().all(|r| !r.is_ok())
    }

    pub fn total(&self) -> usize {
        self.results.values().map(Vec::len).sum()
    }
}
