//! Turn records and sessions.
//!
//! A [`TurnRecord`] accumulates everything a single request produced; a
//! [`Session`] is the bounded per-user history of completed turns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::extracted::Extracted;
use crate::plan::PlanSpec;
use crate::result::ResultBundle;
use crate::thought::Thought;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Utterance
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One user request. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub text: String,
    pub user_id: String,
    pub ts: DateTime<Utc>,
}

impl Utterance {
    pub fn new(user_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            user_id: user_id.into(),
            ts: Utc::now(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TurnRecord
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Everything one turn produced.
///
/// Created by the pipeline, filled while the turn runs, then handed to the
/// session store and treated as immutable from that point on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRecord {
    pub id: Uuid,
    pub utterance: Utterance,
    pub thoughts: Vec<Thought>,
    pub extracted: Extracted,
    pub plan: PlanSpec,
    pub results: ResultBundle,
    pub answer: String,
    pub ts_in: DateTime<Utc>,
    pub ts_out: Option<DateTime<Utc>>,
}

impl TurnRecord {
    pub fn begin(utterance: Utterance) -> Self {
        Self {
            id: Uuid::new_v4(),
            utterance,
            thoughts: Vec::new(),
            extracted: Extracted::default(),
            plan: PlanSpec::default(),
            results: ResultBundle::default(),
            answer: String::new(),
            ts_in: Utc::now(),
            ts_out: None,
        }
    }

    /// Stamp the completion time and answer.
    pub fn finish(&mut self, answer: String) {
        self.answer = answer;
        self.ts_out = Some(Utc::now());
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Per-user history of completed turns, trimmed to the most recent N.
///
/// Records are monotonically ordered by `ts_in`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub history: Vec<TurnRecord>,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            history: Vec::new(),
        }
    }

    /// Append a completed record and trim to the `max_turns` tail.
    pub fn append(&mut self, record: TurnRecord, max_turns: usize) {
        self.history.push(record);
        if self.history.len() > max_turns {
            let drop = self.history.len() - max_turns;
            self.history.drain(..drop);
        }
    }

    pub fn last(&self) -> Option<&TurnRecord> {
        self.history.last()
    }
}
