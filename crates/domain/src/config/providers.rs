use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Amap (geospatial suite)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Credentials and endpoints for the Amap web-service suite
/// (weather, POI search, driving routes, traffic, input tips).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmapConfig {
    /// Web-service API key. Empty means the adapters refuse to construct.
    #[serde(default)]
    pub key: String,
    #[serde(default = "d_amap_base")]
    pub base_url: String,
    /// Adcode of the served city, used to scope POI and weather queries.
    #[serde(default = "d_city_code")]
    pub city_code: String,
}

impl Default for AmapConfig {
    fn default() -> Self {
        Self {
            key: String::new(),
            base_url: d_amap_base(),
            city_code: d_city_code(),
        }
    }
}

fn d_amap_base() -> String {
    "https://restapi.amap.com".into()
}

fn d_city_code() -> String {
    // Shanghai municipal adcode.
    "310000".into()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Reasoner (LLM completion endpoint)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// An OpenAI-compatible chat-completions endpoint used for reasoning and
/// answer composition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasonerConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "d_ark_base")]
    pub base_url: String,
    #[serde(default = "d_ark_model")]
    pub model: String,
    #[serde(default = "d_20000")]
    pub timeout_ms: u64,
}

impl Default for ReasonerConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: d_ark_base(),
            model: d_ark_model(),
            timeout_ms: d_20000(),
        }
    }
}

fn d_ark_base() -> String {
    "https://ark.cn-beijing.volces.com/api/v3".into()
}

fn d_ark_model() -> String {
    "doubao-pro-32k".into()
}

fn d_20000() -> u64 {
    20_000
}
