//! Ark (OpenAI-compatible) Reasoner adapter.
//!
//! Works with the Volcengine Ark chat-completions endpoint and any other
//! service that follows the OpenAI wire contract.

use std::time::Duration;

use serde_json::Value;

use tw_domain::config::ReasonerConfig;
use tw_domain::{Error, Result};

use crate::ctx::RequestCtx;
use crate::traits::{ChatMessage, Reasoner, Role};
use crate::util::from_reqwest;

/// A [`Reasoner`] backed by an OpenAI-compatible chat-completions API.
pub struct ArkReasoner {
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl ArkReasoner {
    /// Build the adapter from configuration. Refuses to construct without a
    /// key so misconfiguration surfaces at startup, not mid-turn.
    pub fn from_config(cfg: &ReasonerConfig) -> Result<Self> {
        if cfg.api_key.is_empty() {
            return Err(Error::InvalidInput("reasoner api_key is empty".into()));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(from_reqwest)?;
        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
            timeout: Duration::from_millis(cfg.timeout_ms),
            client,
        })
    }

    fn build_body(&self, messages: &[ChatMessage], system_prompt: Option<&str>) -> Value {
        let mut wire: Vec<Value> = Vec::with_capacity(messages.len() + 1);
        if let Some(system) = system_prompt {
            wire.push(serde_json::json!({"role": "system", "content": system}));
        }
        for msg in messages {
            let role = match msg.role {
                Role::System => "system",
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            wire.push(serde_json::json!({"role": role, "content": msg.content}));
        }
        serde_json::json!({
            "model": self.model,
            "messages": wire,
        })
    }
}

#[async_trait::async_trait]
impl Reasoner for ArkReasoner {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        system_prompt: Option<&str>,
        ctx: &RequestCtx,
    ) -> Result<String> {
        if ctx.is_canceled() {
            return Err(Error::Canceled);
        }

        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_body(messages, system_prompt);
        let timeout = ctx.clamp_timeout(self.timeout);

        let request = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(timeout)
            .json(&body)
            .send();

        let response = tokio::select! {
            resp = request => resp.map_err(from_reqwest)?,
            _ = ctx.cancelled() => return Err(Error::Canceled),
        };

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::Upstream {
                provider: "ark".into(),
                message: format!("HTTP {status}: {detail}"),
            });
        }

        let json: Value = tokio::select! {
            body = response.json() => body.map_err(from_reqwest)?,
            _ = ctx.cancelled() => return Err(Error::Canceled),
        };

        let content = json
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| Error::Parse("completion response missing choices[0].message.content".into()))?;

        tracing::debug!(chars = content.len(), model = %self.model, "reasoner completion");

        Ok(content.to_string())
    }
}
