mod limits;
mod providers;

pub use limits::*;
pub use providers::*;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub core: CoreConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub amap: AmapConfig,
    #[serde(default)]
    pub reasoner: ReasonerConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Core pipeline settings
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Region, trip-length, and session bounds for the reasoning core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// The single metropolitan region this deployment serves.
    #[serde(default = "d_region")]
    pub region: String,
    /// Trip length assumed when the utterance names none.
    #[serde(default = "d_1u8")]
    pub default_days: u8,
    /// Upper clamp for extracted trip lengths.
    #[serde(default = "d_7u8")]
    pub max_days: u8,
    /// Session history is trimmed to this many most recent turns.
    #[serde(default = "d_10")]
    pub max_history_turns: usize,
    /// Turns per user running at once; excess callers wait.
    #[serde(default = "d_1")]
    pub max_concurrent_requests_per_user: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            region: d_region(),
            default_days: d_1u8(),
            max_days: d_7u8(),
            max_history_turns: d_10(),
            max_concurrent_requests_per_user: d_1(),
        }
    }
}

fn d_region() -> String {
    "上海".into()
}

fn d_1u8() -> u8 {
    1
}

fn d_7u8() -> u8 {
    7
}

fn d_10() -> usize {
    10
}

fn d_1() -> usize {
    1
}
