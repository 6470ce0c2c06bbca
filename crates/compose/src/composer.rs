//! Final answer composition.
//!
//! The composer feeds extracted context, per-location analysis, and the raw
//! bundle to the Reasoner. It never fabricates data: dimensions that failed
//! entirely are stated outright, and when the Reasoner itself is down the
//! turn still completes with a deterministic rendering of the analysis.

use tw_domain::config::CoreConfig;
use tw_domain::extracted::Extracted;
use tw_domain::payload::ServicePayload;
use tw_domain::result::ResultBundle;
use tw_domain::turn::Session;
use tw_domain::ServiceKind;
use tw_providers::{ChatMessage, Reasoner, RequestCtx};

use crate::analysis::{analyze, EnvironmentalAnalysis};
use crate::prompts;

/// How many past turns the composition prompt recalls.
const HISTORY_TAIL: usize = 3;

/// Composes the user-visible answer for one turn.
pub struct AnswerComposer {
    region: String,
}

impl AnswerComposer {
    pub fn new(cfg: &CoreConfig) -> Self {
        Self {
            region: cfg.region.clone(),
        }
    }

    /// Fuse everything into the final answer.
    ///
    /// Returns the answer plus the environmental analysis that shaped it.
    pub async fn compose(
        &self,
        text: &str,
        extracted: &Extracted,
        bundle: &ResultBundle,
        history: &Session,
        reasoner: &dyn Reasoner,
        ctx: &RequestCtx,
    ) -> (String, EnvironmentalAnalysis) {
        let analysis = analyze(extracted, bundle, &self.region);
        let gaps = gap_statements(bundle);

        let extracted_json = to_json(extracted);
        let analysis_json = to_json(&analysis);
        let bundle_json = to_json(bundle);
        let tail = history_tail(history);

        let user_message = prompts::composition_user_message(
            text,
            &extracted_json,
            &analysis_json,
            &bundle_json,
            &tail,
        );

        let answer = match reasoner
            .complete(
                &[ChatMessage::user(user_message)],
                Some(prompts::COMPOSER_SYSTEM),
                ctx,
            )
            .await
        {
            Ok(prose) => {
                let mut answer = prose;
                if !gaps.is_empty() {
                    answer.push_str("\n\n数据提示：\n");
                    for gap in &gaps {
                        answer.push_str("- ");
                        answer.push_str(gap);
                        answer.push('\n');
                    }
                }
                answer
            }
            Err(err) => {
                tracing::warn!(error = %err, "composition reasoner failed, rendering fallback");
                self.fallback_answer(extracted, bundle, &analysis, &gaps)
            }
        };

        (answer, analysis)
    }

    /// One-sentence intent summary, with a deterministic fallback.
    pub async fn summarize_intent(
        &self,
        text: &str,
        extracted: &Extracted,
        reasoner: &dyn Reasoner,
        ctx: &RequestCtx,
    ) -> String {
        match reasoner
            .complete(
                &[ChatMessage::user(text.to_string())],
                Some(prompts::INTENT_SYSTEM),
                ctx,
            )
            .await
        {
            Ok(summary) => {
                let line = summary.lines().next().unwrap_or_default().trim();
                if line.is_empty() {
                    prompts::fallback_intent_summary(extracted, &self.region)
                } else {
                    line.to_string()
                }
            }
            Err(_) => prompts::fallback_intent_summary(extracted, &self.region),
        }
    }

    // ── Deterministic rendering ───────────────────────────────────

    /// Render the analysis directly when the Reasoner is unreachable.
    fn fallback_answer(
        &self,
        extracted: &Extracted,
        bundle: &ResultBundle,
        analysis: &EnvironmentalAnalysis,
        gaps: &[String],
    ) -> String {
        let mut out = String::new();

        let headline = if extracted.intent_summary.is_empty() {
            prompts::fallback_intent_summary(extracted, &self.region)
        } else {
            extracted.intent_summary.clone()
        };
        out.push_str(&headline);
        out.push_str("。以下按当前数据给出安排建议：\n");

        for location in &analysis.locations {
            out.push_str(&format!(
                "\n【{}】天气：{}（{}）\n",
                location.location, location.weather.summary, location.weather.advice
            ));
            for poi in location.top_pois.iter().take(3) {
                out.push_str(&format!(
                    "  · {}（{}，综合评分 {} 分）\n",
                    poi.name,
                    if poi.category.is_empty() {
                        "未分类"
                    } else {
                        poi.category.as_str()
                    },
                    poi.score
                ));
            }
        }

        let routes = bundle.ok_of_kind(ServiceKind::Navigation);
        if !routes.is_empty() {
            out.push_str("\n交通路线：\n");
            for result in routes {
                if let Some(ServicePayload::Routes(candidates)) = result.payload() {
                    if let Some(best) = candidates.first() {
                        out.push_str(&format!(
                            "  {}：约 {}，耗时 {}\n",
                            result.key(),
                            best.format_distance(),
                            best.format_duration()
                        ));
                    }
                }
            }
        }

        let traffic = bundle.ok_of_kind(ServiceKind::Traffic);
        if !traffic.is_empty() {
            out.push_str("\n实时路况：\n");
            for result in traffic {
                if let Some(ServicePayload::Traffic(status)) = result.payload() {
                    out.push_str(&format!(
                        "  {}：{:?}，{}\n",
                        result.key(),
                        status.level,
                        status.description
                    ));
                }
            }
        }

        if !analysis.overall_tips.is_empty() {
            out.push_str("\n温馨提示：\n");
            for tip in &analysis.overall_tips {
                out.push_str("  - ");
                out.push_str(tip);
                out.push('\n');
            }
        }

        if !gaps.is_empty() {
            out.push_str("\n数据提示：\n");
            for gap in gaps {
                out.push_str("  - ");
                out.push_str(gap);
                out.push('\n');
            }
        }

        out
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One statement per service kind that produced no usable data at all.
fn gap_statements(bundle: &ResultBundle) -> Vec<String> {
    let labels: [(ServiceKind, &str); 6] = [
        (ServiceKind::Weather, "天气"),
        (ServiceKind::Poi, "景点"),
        (ServiceKind::Navigation, "导航"),
        (ServiceKind::Traffic, "路况"),
        (ServiceKind::Crowd, "人流"),
        (ServiceKind::InputHints, "地点提示"),
    ];
    labels
        .iter()
        .filter(|(kind, _)| bundle.kind_failed_entirely(*kind))
        .map(|(kind, label)| {
            format!("{label}（{kind}）数据本次未能获取，以上建议未包含该维度，请以现场情况为准。")
        })
        .collect()
}

fn history_tail(history: &Session) -> Vec<String> {
    history
        .history
        .iter()
        .rev()
        .take(HISTORY_TAIL)
        .rev()
        .map(|turn| {
            if turn.extracted.intent_summary.is_empty() {
                truncate(&turn.utterance.text, 60)
            } else {
                turn.extracted.intent_summary.clone()
            }
        })
        .collect()
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{cut}…")
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".into())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
