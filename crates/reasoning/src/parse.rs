//! Tolerant parsing of the Reasoner's thought-chain JSON.
//!
//! The model is asked for a strict shape but rarely punished for drifting:
//! the first balanced `{...}` block is extracted, unknown fields are
//! ignored, malformed entries are dropped, and unknown `api_needs` strings
//! are silently discarded. A response that salvages zero thoughts yields
//! `None` and the caller falls back to the rule-based chain.

use serde::Deserialize;

use tw_domain::ServiceKind;

/// One salvaged chain entry, before renumbering.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawThought {
    #[serde(default)]
    pub step: Option<u32>,
    #[serde(default)]
    pub thought: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub api_needs: Vec<String>,
    #[serde(default)]
    pub reasoning: String,
}

#[derive(Debug, Deserialize, Default)]
struct RawChain {
    #[serde(default)]
    thoughts: Vec<RawThought>,
}

/// Salvage thought entries from free-form Reasoner output.
///
/// Returns `None` when no balanced JSON block exists, the block does not
/// deserialize, or it contains zero usable thoughts.
pub fn salvage_thoughts(response: &str) -> Option<Vec<RawThought>> {
    let block = first_json_block(response)?;
    let chain: RawChain = serde_json::from_str(block).ok()?;
    let usable: Vec<RawThought> = chain
        .thoughts
        .into_iter()
        .filter(|t| !t.thought.trim().is_empty())
        .collect();
    if usable.is_empty() {
        None
    } else {
        Some(usable)
    }
}

/// Map one `api_needs` string onto a service kind. Unknown entries drop.
pub fn map_api_need(need: &str) -> Option<ServiceKind> {
    match need.trim().to_lowercase().as_str() {
        "天气" | "weather" | "天气预报" => Some(ServiceKind::Weather),
        "景点" | "poi" | "餐厅" | "美食" | "attractions" | "food" => Some(ServiceKind::Poi),
        "导航" | "路线" | "navigation" | "route" => Some(ServiceKind::Navigation),
        "交通" | "路况" | "traffic" => Some(ServiceKind::Traffic),
        "人流" | "crowd" => Some(ServiceKind::Crowd),
        "提示" | "hints" | "inputtips" => Some(ServiceKind::InputHints),
        _ => None,
    }
}

/// Slice out the first balanced `{...}` block of `text`.
///
/// A brace scan rather than a regex: the block may nest arbitrarily deep.
/// Braces inside JSON strings are accounted for.
fn first_json_block(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_balanced_block() {
        let text = "Sure, here is my plan:\n{\"thoughts\": [{\"step\": 1, \"thought\": \"看天气\"}]}\nHope it helps {unbalanced";
        let block = first_json_block(text).unwrap();
        assert!(block.starts_with('{'));
        assert!(block.ends_with('}'));
        assert!(block.contains("thoughts"));
    }

    #[test]
    fn braces_inside_strings_do_not_confuse_the_scan() {
        let text = r#"{"thoughts": [{"thought": "brace } in text", "keywords": []}]}"#;
        assert_eq!(first_json_block(text), Some(text));
    }

    #[test]
    fn salvage_ignores_malformed_fields() {
        let response = r#"
        前缀说明文字
        {"thoughts": [
            {"step": 1, "thought": "理解需求", "keywords": ["3天"], "api_needs": ["天气"], "reasoning": "r"},
            {"thought": "", "api_needs": ["weather"]},
            {"thought": "看景点", "api_needs": ["景点", "nonsense"], "unexpected": 42}
        ]}
        "#;
        let thoughts = salvage_thoughts(response).unwrap();
        assert_eq!(thoughts.len(), 2);
        assert_eq!(thoughts[0].thought, "理解需求");
        assert_eq!(thoughts[1].thought, "看景点");
    }

    #[test]
    fn garbage_yields_none() {
        assert!(salvage_thoughts("I cannot help with that").is_none());
        assert!(salvage_thoughts("{\"thoughts\": []}").is_none());
        assert!(salvage_thoughts("{\"thoughts\": [{\"thought\": \"  \"}]}").is_none());
        assert!(salvage_thoughts("{not json at all}").is_none());
    }

    #[test]
    fn api_need_mapping_is_bilingual_and_closed() {
        assert_eq!(map_api_need("天气"), Some(ServiceKind::Weather));
        assert_eq!(map_api_need("Weather"), Some(ServiceKind::Weather));
        assert_eq!(map_api_need("美食"), Some(ServiceKind::Poi));
        assert_eq!(map_api_need("路况"), Some(ServiceKind::Traffic));
        assert_eq!(map_api_need("route"), Some(ServiceKind::Navigation));
        assert_eq!(map_api_need("人流"), Some(ServiceKind::Crowd));
        assert_eq!(map_api_need("blockchain"), None);
    }
}
