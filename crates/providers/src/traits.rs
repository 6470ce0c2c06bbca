use serde::{Deserialize, Serialize};

use tw_domain::payload::{DailyForecast, LocationHint, Poi, RouteCandidate, TrafficStatus};
use tw_domain::Result;

use crate::ctx::RequestCtx;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Chat types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message of a completion conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Reasoner
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The LLM completion endpoint used for thought-chain generation and answer
/// composition. The core does not care which provider answers.
#[async_trait::async_trait]
pub trait Reasoner: Send + Sync {
    /// Complete a conversation and return the assistant text.
    ///
    /// An optional system prompt is prepended to `messages`. Implementations
    /// must honor the context's cancellation and deadline.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        system_prompt: Option<&str>,
        ctx: &RequestCtx,
    ) -> Result<String>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Upstream clients
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Travel mode for route planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelMode {
    Driving,
    Transit,
    Walking,
}

impl Default for TravelMode {
    fn default() -> Self {
        TravelMode::Driving
    }
}

/// Daily forecasts for a city or district.
#[async_trait::async_trait]
pub trait WeatherClient: Send + Sync {
    async fn forecast(&self, city: &str, ctx: &RequestCtx) -> Result<Vec<DailyForecast>>;
}

/// Keyword POI search, constrained to the configured region.
#[async_trait::async_trait]
pub trait PoiClient: Send + Sync {
    async fn search(
        &self,
        keyword: &str,
        region: &str,
        category: Option<&str>,
        limit: usize,
        ctx: &RequestCtx,
    ) -> Result<Vec<Poi>>;
}

/// Route candidates between two named places.
#[async_trait::async_trait]
pub trait NavigationClient: Send + Sync {
    async fn route(
        &self,
        origin: &str,
        destination: &str,
        mode: TravelMode,
        ctx: &RequestCtx,
    ) -> Result<Vec<RouteCandidate>>;
}

/// Live congestion around a named area.
#[async_trait::async_trait]
pub trait TrafficClient: Send + Sync {
    async fn status(&self, area: &str, ctx: &RequestCtx) -> Result<TrafficStatus>;
}

/// Input-tips lookup for unverified location candidates.
#[async_trait::async_trait]
pub trait HintsClient: Send + Sync {
    async fn tips(
        &self,
        keyword: &str,
        region: &str,
        city_limit: bool,
        ctx: &RequestCtx,
    ) -> Result<Vec<LocationHint>>;
}
