//! Thought-chain construction: LLM-assisted with a rule-based fallback.

use tw_domain::config::CoreConfig;
use tw_domain::extracted::Extracted;
use tw_domain::{ServiceKind, Thought};
use tw_providers::{ChatMessage, Reasoner, RequestCtx};

use crate::parse::{map_api_need, salvage_thoughts, RawThought};
use crate::prompts;

/// Builds the ordered reasoning chain for one turn.
///
/// The Reasoner is asked first; if the call fails, times out, is canceled,
/// or parses to zero thoughts, the canonical rule-based chain takes over, so
/// chain construction never fails a turn.
pub struct ThoughtChainBuilder {
    region: String,
}

impl ThoughtChainBuilder {
    pub fn new(cfg: &CoreConfig) -> Self {
        Self {
            region: cfg.region.clone(),
        }
    }

    pub async fn build(
        &self,
        text: &str,
        extracted: &Extracted,
        reasoner: &dyn Reasoner,
        ctx: &RequestCtx,
    ) -> Vec<Thought> {
        match reasoner
            .complete(
                &[ChatMessage::user(prompts::thought_chain_user(text))],
                Some(prompts::THOUGHT_CHAIN_SYSTEM),
                ctx,
            )
            .await
        {
            Ok(response) => match salvage_thoughts(&response) {
                Some(raw) => {
                    tracing::debug!(steps = raw.len(), "reasoner chain accepted");
                    self.from_raw(raw, extracted)
                }
                None => {
                    tracing::warn!("reasoner chain unparseable, using rule-based fallback");
                    self.fallback(extracted)
                }
            },
            Err(err) => {
                tracing::warn!(error = %err, "reasoner chain failed, using rule-based fallback");
                self.fallback(extracted)
            }
        }
    }

    // ── LLM path ──────────────────────────────────────────────────

    /// Convert salvaged entries: renumber steps contiguously from 1, map
    /// `api_needs` onto service kinds, and merge the extractor's keywords
    /// into the opening step.
    fn from_raw(&self, raw: Vec<RawThought>, extracted: &Extracted) -> Vec<Thought> {
        raw.into_iter()
            .enumerate()
            .map(|(idx, entry)| {
                let services: Vec<ServiceKind> = entry
                    .api_needs
                    .iter()
                    .filter_map(|need| map_api_need(need))
                    .collect();
                let mut keywords = entry.keywords;
                if idx == 0 {
                    keywords.extend(extracted.keywords.iter().map(|k| k.text.clone()));
                }
                Thought::new(idx as u32 + 1, entry.thought, keywords, services, entry.reasoning)
            })
            .collect()
    }

    // ── Rule-based fallback ───────────────────────────────────────

    /// The canonical chain: acknowledge the request, pick locations, check
    /// weather, and plan transit when a route is in play.
    fn fallback(&self, extracted: &Extracted) -> Vec<Thought> {
        let region = &self.region;
        let days = extracted.days;
        let verified: Vec<String> = extracted
            .verified_locations()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let mut thoughts = Vec::with_capacity(4);

        let mut opening_keywords: Vec<String> =
            extracted.keywords.iter().map(|k| k.text.clone()).collect();
        opening_keywords.push(format!("{days}天"));
        thoughts.push(Thought::new(
            1,
            format!("用户需要规划{days}天的{region}旅游行程"),
            opening_keywords,
            vec![],
            "先理解基本需求和时间安排",
        ));

        if verified.is_empty() {
            thoughts.push(Thought::new(
                2,
                format!("用户没有指定具体地点，需要推荐{region}经典景点"),
                vec![region.clone(), "经典景点".into()],
                vec![ServiceKind::Poi],
                "推荐适合游览时长的经典景点组合",
            ));
        } else {
            thoughts.push(Thought::new(
                2,
                format!("用户提到了具体地点：{}", verified.join("、")),
                verified.clone(),
                vec![ServiceKind::Poi],
                "搜索这些地点的详细信息和周边景点",
            ));
        }

        thoughts.push(Thought::new(
            3,
            format!("查询未来{days}天的天气情况"),
            vec!["天气".into(), "预报".into()],
            vec![ServiceKind::Weather],
            "根据天气调整室内外活动安排",
        ));

        if extracted.route.is_some() || verified.len() >= 2 {
            thoughts.push(Thought::new(
                4,
                "规划地点之间的交通路线".to_string(),
                vec!["导航".into(), "路线".into(), "交通".into()],
                vec![ServiceKind::Navigation, ServiceKind::Traffic],
                "提供最优交通方案，结合路况避免拥堵",
            ));
        }

        thoughts
    }
}
