//! Prompt templates for answer composition and intent summarisation.

use tw_domain::context::Companions;
use tw_domain::extracted::Extracted;

/// System prompt for the final composition call.
pub const COMPOSER_SYSTEM: &str = r#"你是一个专业、温暖、贴心的上海旅游规划师。请基于用户的需求、提取到的上下文和实时数据，生成科学、详细、富有人情味的旅游攻略。

重要要求：
1. 严格基于提供的实时数据生成回复，不要编造信息
2. 只推荐上海地区的景点和地点
3. 根据实时天气调整室内外活动安排
4. 根据路况信息优化交通路线
5. 理解并回应用户的情感需求（如浪漫氛围、避开人群）
6. 提供具体的地址、交通方式、费用预算
7. 数据缺失的维度要如实说明，并给出通用替代建议

请生成详细、实用、富有人情味的旅游攻略。"#;

/// System prompt for the one-sentence intent summary.
pub const INTENT_SYSTEM: &str = r#"请用一句话总结用户的旅游需求，保留所有人文细节和情感因素：同伴信息、情感需求、预算、天数。只输出这一句话。

示例：
输入："我想带女朋友去上海玩3天"
输出："您计划和女朋友一起在上海度过浪漫的3天""#;

/// Build the user message for the composition call.
pub fn composition_user_message(
    text: &str,
    extracted_json: &str,
    analysis_json: &str,
    bundle_json: &str,
    history_tail: &[String],
) -> String {
    let mut message = format!("用户需求：{text}\n\n提取的上下文：\n{extracted_json}\n");
    if !history_tail.is_empty() {
        message.push_str("\n最近的对话摘要：\n");
        for entry in history_tail {
            message.push_str("- ");
            message.push_str(entry);
            message.push('\n');
        }
    }
    message.push_str(&format!(
        "\n综合分析：\n{analysis_json}\n\n实时数据：\n{bundle_json}\n\n请基于以上信息生成最终攻略。"
    ));
    message
}

/// Deterministic one-sentence summary used when the Reasoner is unavailable.
pub fn fallback_intent_summary(extracted: &Extracted, region: &str) -> String {
    let companion = match &extracted.companions {
        Companions::Unknown => String::new(),
        Companions::Solo => "独自".into(),
        Companions::Romantic { partner_label } => match partner_label.as_str() {
            "girlfriend" => "和女朋友一起".into(),
            "boyfriend" => "和男朋友一起".into(),
            "wife" => "和爱人一起".into(),
            "husband" => "和爱人一起".into(),
            _ => "和伴侣一起".into(),
        },
        Companions::Family { .. } => "和家人一起".into(),
        Companions::Friends { .. } => "和朋友一起".into(),
        Companions::Colleagues { .. } => "和同事一起".into(),
    };
    let mood = if extracted
        .emotion
        .moods
        .contains(&tw_domain::context::Mood::Romantic)
    {
        "浪漫的"
    } else {
        ""
    };
    format!(
        "您计划{companion}在{region}度过{mood}{}天",
        extracted.days.max(1)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tw_domain::context::{EmotionalContext, Mood};

    #[test]
    fn fallback_summary_keeps_companions_and_mood() {
        let extracted = Extracted {
            days: 3,
            companions: Companions::Romantic {
                partner_label: "girlfriend".into(),
            },
            emotion: EmotionalContext {
                moods: vec![Mood::Romantic],
                ..Default::default()
            },
            ..Default::default()
        };
        let summary = fallback_intent_summary(&extracted, "上海");
        assert_eq!(summary, "您计划和女朋友一起在上海度过浪漫的3天");
    }

    #[test]
    fn fallback_summary_without_context() {
        let extracted = Extracted::default();
        let summary = fallback_intent_summary(&extracted, "上海");
        assert_eq!(summary, "您计划在上海度过1天");
    }

    #[test]
    fn composition_message_embeds_sections() {
        let message = composition_user_message(
            "去外滩",
            "{}",
            "{\"locations\":[]}",
            "{\"results\":{}}",
            &["上次想去豫园".into()],
        );
        assert!(message.contains("用户需求：去外滩"));
        assert!(message.contains("最近的对话摘要"));
        assert!(message.contains("综合分析"));
        assert!(message.contains("实时数据"));
    }
}
