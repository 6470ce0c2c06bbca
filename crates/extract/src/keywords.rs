//! Keyword extraction: locations, activities, trip length, routes,
//! time-of-day hints, and input-tips priority weights.

use regex::Regex;

use tw_domain::config::CoreConfig;
use tw_domain::extracted::{ActivityClass, LocationMatch, Route, TimeOfDay, WeightedKeyword};

use crate::vocab;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Harvest
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Everything the keyword extractor mined from one utterance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeywordHarvest {
    /// Candidate keywords with priority weights, highest first.
    pub keywords: Vec<WeightedKeyword>,
    /// Location mentions in order of first appearance.
    pub locations: Vec<LocationMatch>,
    pub activities: Vec<ActivityClass>,
    pub days: u8,
    pub route: Option<Route>,
    pub times_of_day: Vec<TimeOfDay>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Extractor
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Pure, deterministic term mining over an utterance.
pub struct KeywordExtractor {
    default_days: u8,
    max_days: u8,
    digit_days: Regex,
    digit_days_en: Regex,
    spelled_days: Regex,
    spelled_days_en: Regex,
    candidate_cn: Regex,
    candidate_cn_prefixed: Regex,
    candidate_en: Regex,
}

impl KeywordExtractor {
    pub fn new(cfg: &CoreConfig) -> Self {
        Self {
            default_days: cfg.default_days,
            max_days: cfg.max_days,
            digit_days: Regex::new(r"(\d+)\s*[天日]").unwrap(),
            digit_days_en: Regex::new(r"(\d+)\s*-?\s*day").unwrap(),
            spelled_days: Regex::new(r"([一两二三四五六七])[天日]").unwrap(),
            spelled_days_en: Regex::new(r"\b(one|two|three|four|five|six|seven)[\s-]days?")
                .unwrap(),
            candidate_cn: Regex::new(
                r"\p{Han}{1,6}(?:新区|乐园|古镇|大厦|老街|博物馆|公园|广场|中心)",
            )
            .unwrap(),
            candidate_cn_prefixed: Regex::new(r"(?:想去|去|到|前往)(\p{Han}{2,6})").unwrap(),
            candidate_en: Regex::new(
                r"\b([A-Z][A-Za-z']+(?:\s[A-Z][A-Za-z']+)*\s(?:District|Park|Tower|Museum|Town|Temple|Garden|Center|Centre))\b",
            )
            .unwrap(),
        }
    }

    /// Mine `text`. Pure: equal input yields equal output.
    pub fn extract(&self, text: &str) -> KeywordHarvest {
        let lower = text.to_lowercase();

        let mut mentions = self.match_locations(&lower);
        self.collect_candidates(text, &mut mentions);
        mentions.sort_by_key(|m| m.pos);

        let locations: Vec<LocationMatch> = mentions
            .iter()
            .map(|m| LocationMatch {
                name: m.name.clone(),
                verified: m.verified,
            })
            .collect();

        let activities = extract_activities(&lower);
        let days = self.extract_days(&lower);
        let times_of_day = extract_times_of_day(&lower);
        let route = self.extract_route(&lower, &mentions);

        let keywords = self.weigh_keywords(&lower, &locations, &activities);

        tracing::debug!(
            locations = locations.len(),
            activities = activities.len(),
            days,
            has_route = route.is_some(),
            "keyword extraction done"
        );

        KeywordHarvest {
            keywords,
            locations,
            activities,
            days,
            route,
            times_of_day,
        }
    }

    // ── Locations ─────────────────────────────────────────────────

    fn match_locations(&self, lower: &str) -> Vec<Mention> {
        let mut out: Vec<Mention> = Vec::new();
        for (canonical, aliases) in vocab::LOCATIONS {
            let mut best: Option<usize> = None;
            for needle in std::iter::once(*canonical).chain(aliases.iter().copied()) {
                if let Some(pos) = lower.find(&needle.to_lowercase()) {
                    best = Some(best.map_or(pos, |b: usize| b.min(pos)));
                }
            }
            if let Some(pos) = best {
                out.push(Mention {
                    name: (*canonical).to_string(),
                    pos,
                    verified: true,
                });
            }
        }
        out
    }

    fn collect_candidates(&self, text: &str, mentions: &mut Vec<Mention>) {
        let mut push = |raw: &str, pos: usize| {
            if raw.chars().count() < 2 {
                return;
            }
            if vocab::NON_LOCATION_WORDS.iter().any(|w| raw.contains(w)) {
                return;
            }
            let raw_lower = raw.to_lowercase();
            if vocab::COMPANION_WORDS.contains(&raw_lower.as_str()) {
                return;
            }
            // Skip anything the vocabulary already resolved.
            let resolves = vocab::LOCATIONS.iter().any(|(canonical, aliases)| {
                std::iter::once(*canonical)
                    .chain(aliases.iter().copied())
                    .any(|a| {
                        let a = a.to_lowercase();
                        raw_lower.contains(&a) || a.contains(&raw_lower)
                    })
            });
            if resolves {
                return;
            }
            if mentions.iter().any(|m| m.name == raw) {
                return;
            }
            mentions.push(Mention {
                name: raw.to_string(),
                pos,
                verified: false,
            });
        };

        for m in self.candidate_cn.find_iter(text) {
            push(m.as_str(), m.start());
        }
        for caps in self.candidate_cn_prefixed.captures_iter(text) {
            if let Some(m) = caps.get(1) {
                push(m.as_str(), m.start());
            }
        }
        for caps in self.candidate_en.captures_iter(text) {
            if let Some(m) = caps.get(1) {
                push(m.as_str(), m.start());
            }
        }
    }

    // ── Days ──────────────────────────────────────────────────────

    fn extract_days(&self, lower: &str) -> u8 {
        let parsed = self
            .digit_days
            .captures(lower)
            .or_else(|| self.digit_days_en.captures(lower))
            .and_then(|c| c.get(1).unwrap().as_str().parse::<u32>().ok())
            .or_else(|| {
                self.spelled_days
                    .captures(lower)
                    .map(|c| spelled_cn(c.get(1).unwrap().as_str()))
            })
            .or_else(|| {
                self.spelled_days_en
                    .captures(lower)
                    .map(|c| spelled_en(c.get(1).unwrap().as_str()))
            });

        match parsed {
            Some(n) => n.clamp(1, self.max_days as u32) as u8,
            None => self.default_days,
        }
    }

    // ── Route ─────────────────────────────────────────────────────

    fn extract_route(&self, lower: &str, mentions: &[Mention]) -> Option<Route> {
        if let Some(route) = self.explicit_route(lower, mentions) {
            return Some(route);
        }

        // Inferred: two or more distinct mentions, first to last.
        if mentions.len() >= 2 {
            let first = mentions.first().unwrap();
            let last = mentions.last().unwrap();
            if first.name != last.name {
                return Some(Route {
                    start: first.name.clone(),
                    end: last.name.clone(),
                    explicit: false,
                });
            }
        }
        None
    }

    fn explicit_route(&self, lower: &str, mentions: &[Mention]) -> Option<Route> {
        let (from_pos, to_pos) = find_route_markers(lower)?;

        let start = mentions
            .iter()
            .find(|m| m.pos > from_pos && m.pos < to_pos)?;
        let end = mentions
            .iter()
            .find(|m| m.pos > to_pos && m.name != start.name)?;

        Some(Route {
            start: start.name.clone(),
            end: end.name.clone(),
            explicit: true,
        })
    }

    // ── Keyword weights ───────────────────────────────────────────

    /// Score every candidate keyword for the bounded input-tips budget.
    ///
    /// Canonical places rank highest, landmarks next; early mention, and a
    /// name-like length band help; generic, relationship, affect, and
    /// duration-like terms are pushed to the bottom.
    fn weigh_keywords(
        &self,
        lower: &str,
        locations: &[LocationMatch],
        activities: &[ActivityClass],
    ) -> Vec<WeightedKeyword> {
        let mut texts: Vec<String> = Vec::new();
        for loc in locations {
            texts.push(loc.name.clone());
        }
        for activity in activities {
            texts.push(activity.search_keyword().to_string());
        }

        let mut out: Vec<WeightedKeyword> = texts
            .into_iter()
            .map(|text| {
                let weight = self.score_keyword(&text, lower, locations);
                WeightedKeyword { text, weight }
            })
            .collect();
        out.sort_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.text.cmp(&b.text)));
        out.dedup_by(|a, b| a.text == b.text);
        out
    }

    fn score_keyword(&self, keyword: &str, lower: &str, locations: &[LocationMatch]) -> i32 {
        let mut score = 0i32;
        let keyword_lower = keyword.to_lowercase();

        let canonical = locations.iter().any(|l| l.verified && l.name == keyword);
        if canonical {
            score += 100;
        }
        if vocab::LANDMARKS.contains(&keyword) {
            score += 90;
        }

        if let Some(pos) = lower.find(&keyword_lower) {
            let char_pos = lower[..pos].chars().count() as i32;
            score += (50 - char_pos / 10).max(10);
        }

        let len = keyword.chars().count();
        if (2..=6).contains(&len) {
            score += 20;
        } else if len > 6 {
            score -= 10;
        }

        if vocab::GENERIC_WORDS.contains(&keyword_lower.as_str()) {
            score -= 50;
        }
        if vocab::COMPANION_WORDS.contains(&keyword_lower.as_str()) {
            score -= 40;
        }
        if vocab::PREFERENCE_WORDS.contains(&keyword_lower.as_str()) {
            score -= 35;
        }
        let duration_like = keyword.ends_with('天') && keyword.chars().any(|c| c.is_ascii_digit());
        if duration_like {
            score -= 30;
        }

        score
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

struct Mention {
    name: String,
    pos: usize,
    verified: bool,
}

fn extract_activities(lower: &str) -> Vec<ActivityClass> {
    let mut out = Vec::new();
    for (class, needles) in vocab::ACTIVITIES {
        if needles.iter().any(|n| lower.contains(n)) {
            out.push(*class);
        }
    }
    out
}

fn extract_times_of_day(lower: &str) -> Vec<TimeOfDay> {
    const TABLE: &[(TimeOfDay, &[&str])] = &[
        (TimeOfDay::Morning, &["早上", "上午", "清晨", "morning"]),
        (TimeOfDay::Afternoon, &["下午", "午后", "afternoon"]),
        (TimeOfDay::Evening, &["傍晚", "晚上", "evening"]),
        (TimeOfDay::Night, &["夜里", "深夜", "夜生活", "night"]),
    ];
    let mut out = Vec::new();
    for (tod, needles) in TABLE {
        if needles.iter().any(|n| lower.contains(n)) {
            out.push(*tod);
        }
    }
    out
}

/// Find the byte positions of the route markers ("从…到…" or "from … to …").
fn find_route_markers(lower: &str) -> Option<(usize, usize)> {
    if let Some(from_pos) = lower.find('从') {
        if let Some(rel) = lower[from_pos..].find('到') {
            return Some((from_pos, from_pos + rel));
        }
    }
    if let Some(from_pos) = lower.find("from ") {
        if let Some(rel) = lower[from_pos..].find(" to ") {
            return Some((from_pos, from_pos + rel + 1));
        }
    }
    None
}

fn spelled_cn(word: &str) -> u32 {
    match word {
        "一" => 1,
        "两" | "二" => 2,
        "三" => 3,
        "四" => 4,
        "五" => 5,
        "六" => 6,
        "七" => 7,
        _ => 1,
    }
}

fn spelled_en(word: &str) -> u32 {
    match word {
        "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        _ => 1,
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
