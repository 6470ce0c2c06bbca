//! Plan resolution: map `(thoughts, extracted)` onto the concrete set of
//! upstream calls for one turn.
//!
//! Pure and duplicate-free — replaying the same inputs always yields the
//! same plan.

use tw_domain::extracted::Extracted;
use tw_domain::plan::{PlanSpec, ServiceCallSpec};
use tw_domain::{ServiceKind, Thought};

/// Scheduling priorities: input hints below everything, traffic on top.
const PRIORITY_HINTS: u8 = 0;
const PRIORITY_WEATHER: u8 = 1;
const PRIORITY_POI: u8 = 2;
const PRIORITY_NAVIGATION: u8 = 3;
const PRIORITY_TRAFFIC: u8 = 4;

/// At most this many input-tips lookups per turn, ranked by keyword weight.
const HINTS_BUDGET: usize = 3;

/// Resolve the data-collection plan for one turn.
///
/// `region` is the fallback target when no location was extracted.
pub fn resolve_plan(thoughts: &[Thought], extracted: &Extracted, region: &str) -> PlanSpec {
    let mut requested: Vec<ServiceKind> = Vec::new();
    for thought in thoughts {
        for kind in &thought.services {
            if !requested.contains(kind) {
                requested.push(*kind);
            }
        }
    }

    let verified: Vec<String> = extracted
        .verified_locations()
        .iter()
        .map(|s| s.to_string())
        .collect();
    let unverified: Vec<String> = extracted
        .unverified_locations()
        .iter()
        .map(|s| s.to_string())
        .collect();

    let targets: Vec<String> = if verified.is_empty() {
        vec![region.to_string()]
    } else {
        verified.clone()
    };

    let pairs = location_pairs(&verified, extracted);
    let has_route = !pairs.is_empty();

    let mut plan = PlanSpec {
        specs: Vec::new(),
        used_default_location: verified.is_empty(),
        has_route,
    };

    // Weather: one daily spec per distinct target, always (days >= 1 by
    // clamp). A 3-day trip to one place yields three specs.
    let days = extracted.days.max(1);
    for target in &targets {
        for day in 1..=days {
            plan.push_unique(
                ServiceCallSpec::new(
                    ServiceKind::Weather,
                    format!("{target}:day{day}"),
                    PRIORITY_WEATHER,
                )
                .with_param("city", target.clone())
                .with_param("day", day.to_string()),
            );
        }
    }

    // POI: one spec per target, biased by activity and affect. Included even
    // without locations so the composer has region defaults to draw from.
    let poi_keyword = extracted
        .activities
        .first()
        .map(|a| a.search_keyword())
        .unwrap_or("景点");
    for target in &targets {
        let mut spec = ServiceCallSpec::new(ServiceKind::Poi, target.clone(), PRIORITY_POI)
            .with_param("keyword", poi_keyword)
            .with_param("region", target.clone());
        if !extracted.emotion.moods.is_empty() {
            spec = spec.with_param("moods", join_tags(&extracted.emotion.moods));
        }
        if !extracted.emotion.avoid.is_empty() {
            spec = spec.with_param("avoid", join_tags(&extracted.emotion.avoid));
        }
        plan.push_unique(spec);
    }

    // Navigation and traffic: one spec per consecutive pair.
    for (start, end) in &pairs {
        let key = format!("{start}->{end}");
        plan.push_unique(
            ServiceCallSpec::new(ServiceKind::Navigation, key.clone(), PRIORITY_NAVIGATION)
                .with_param("origin", start.clone())
                .with_param("destination", end.clone())
                .with_param("mode", "driving"),
        );
        plan.push_unique(
            ServiceCallSpec::new(ServiceKind::Traffic, key, PRIORITY_TRAFFIC)
                .with_param("area", end.clone()),
        );
    }

    // Input hints: bounded lookup for unverified candidates, best first.
    for candidate in rank_hint_candidates(&unverified, extracted) {
        plan.push_unique(
            ServiceCallSpec::new(ServiceKind::InputHints, candidate.clone(), PRIORITY_HINTS)
                .with_param("keyword", candidate)
                .with_param("region", region)
                .with_param("citylimit", "true"),
        );
    }

    tracing::debug!(
        specs = plan.specs.len(),
        requested = requested.len(),
        default_location = plan.used_default_location,
        has_route = plan.has_route,
        "plan resolved"
    );

    plan
}

/// Consecutive location pairs, falling back to the extracted route when
/// fewer than two verified locations exist.
fn location_pairs(verified: &[String], extracted: &Extracted) -> Vec<(String, String)> {
    if verified.len() >= 2 {
        return verified
            .windows(2)
            .map(|w| (w[0].clone(), w[1].clone()))
            .collect();
    }
    if let Some(route) = &extracted.route {
        if route.start != route.end {
            return vec![(route.start.clone(), route.end.clone())];
        }
    }
    Vec::new()
}

/// Top unverified candidates by extractor weight, capped at the budget.
fn rank_hint_candidates(unverified: &[String], extracted: &Extracted) -> Vec<String> {
    let mut ranked: Vec<(i32, &String)> = unverified
        .iter()
        .map(|candidate| {
            let weight = extracted
                .keywords
                .iter()
                .find(|k| &k.text == candidate)
                .map(|k| k.weight)
                .unwrap_or(0);
            (weight, candidate)
        })
        .collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    ranked
        .into_iter()
        .take(HINTS_BUDGET)
        .map(|(_, c)| c.clone())
        .collect()
}

fn join_tags<T: std::fmt::Debug>(tags: &[T]) -> String {
    tags.iter()
        .map(|t| format!("{t:?}").to_lowercase())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tw_domain::context::{Avoidance, EmotionalContext, Mood};
    use tw_domain::extracted::{LocationMatch, Route, WeightedKeyword};

    fn loc(name: &str, verified: bool) -> LocationMatch {
        LocationMatch {
            name: name.into(),
            verified,
        }
    }

    fn base_extracted() -> Extracted {
        Extracted {
            days: 1,
            ..Default::default()
        }
    }

    #[test]
    fn empty_extraction_gets_region_defaults() {
        let plan = resolve_plan(&[], &base_extracted(), "上海");
        assert_eq!(plan.count(ServiceKind::Weather), 1);
        assert_eq!(plan.count(ServiceKind::Poi), 1);
        assert_eq!(plan.count(ServiceKind::Navigation), 0);
        assert_eq!(plan.count(ServiceKind::Traffic), 0);
        assert_eq!(plan.count(ServiceKind::InputHints), 0);
        assert!(plan.used_default_location);
        assert_eq!(plan.of_kind(ServiceKind::Weather)[0].key, "上海:day1");
        assert_eq!(plan.of_kind(ServiceKind::Weather)[0].param("city"), Some("上海"));
    }

    #[test]
    fn three_locations_make_two_pairs() {
        let mut extracted = base_extracted();
        extracted.days = 2;
        extracted.locations = vec![loc("外滩", true), loc("豫园", true), loc("陆家嘴", true)];
        extracted.route = Some(Route {
            start: "外滩".into(),
            end: "陆家嘴".into(),
            explicit: true,
        });

        let plan = resolve_plan(&[], &extracted, "上海");
        // Three locations, two days: a daily weather spec per location.
        assert_eq!(plan.count(ServiceKind::Weather), 6);
        assert_eq!(plan.count(ServiceKind::Poi), 3);
        assert_eq!(plan.count(ServiceKind::Navigation), 2);
        assert_eq!(plan.count(ServiceKind::Traffic), 2);
        assert!(plan.has_route);

        let nav_keys: Vec<&str> = plan
            .of_kind(ServiceKind::Navigation)
            .iter()
            .map(|s| s.key.as_str())
            .collect();
        assert_eq!(nav_keys, vec!["外滩->豫园", "豫园->陆家嘴"]);
    }

    #[test]
    fn route_without_second_location_still_plans_transit() {
        let mut extracted = base_extracted();
        extracted.locations = vec![loc("外滩", true)];
        extracted.route = Some(Route {
            start: "外滩".into(),
            end: "豫园".into(),
            explicit: true,
        });

        let plan = resolve_plan(&[], &extracted, "上海");
        assert_eq!(plan.count(ServiceKind::Navigation), 1);
        assert_eq!(plan.count(ServiceKind::Traffic), 1);
        assert_eq!(plan.of_kind(ServiceKind::Navigation)[0].key, "外滩->豫园");
    }

    #[test]
    fn hints_bounded_and_ranked_by_weight() {
        let mut extracted = base_extracted();
        extracted.locations = vec![
            loc("甲公园", false),
            loc("乙中心", false),
            loc("丙广场", false),
            loc("丁大厦", false),
        ];
        extracted.keywords = vec![
            WeightedKeyword {
                text: "丙广场".into(),
                weight: 80,
            },
            WeightedKeyword {
                text: "甲公园".into(),
                weight: 60,
            },
            WeightedKeyword {
                text: "乙中心".into(),
                weight: 40,
            },
            WeightedKeyword {
                text: "丁大厦".into(),
                weight: 20,
            },
        ];

        let plan = resolve_plan(&[], &extracted, "上海");
        let hint_keys: Vec<&str> = plan
            .of_kind(ServiceKind::InputHints)
            .iter()
            .map(|s| s.key.as_str())
            .collect();
        assert_eq!(hint_keys, vec!["丙广场", "甲公园", "乙中心"]);
    }

    #[test]
    fn mood_and_avoid_bias_reach_poi_params() {
        let mut extracted = base_extracted();
        extracted.emotion = EmotionalContext {
            moods: vec![Mood::Romantic],
            avoid: vec![Avoidance::Crowded, Avoidance::Viral],
            desires: vec![],
        };

        let plan = resolve_plan(&[], &extracted, "上海");
        let poi = &plan.of_kind(ServiceKind::Poi)[0];
        assert_eq!(poi.param("moods"), Some("romantic"));
        assert_eq!(poi.param("avoid"), Some("crowded,viral"));
    }

    #[test]
    fn priorities_are_ordered() {
        let mut extracted = base_extracted();
        extracted.locations = vec![loc("外滩", true), loc("豫园", true), loc("未知公园", false)];

        let plan = resolve_plan(&[], &extracted, "上海");
        let priority_of = |kind: ServiceKind| plan.of_kind(kind)[0].priority;
        assert!(priority_of(ServiceKind::InputHints) < priority_of(ServiceKind::Weather));
        assert!(priority_of(ServiceKind::Weather) <= priority_of(ServiceKind::Poi));
        assert!(priority_of(ServiceKind::Poi) <= priority_of(ServiceKind::Navigation));
        assert!(priority_of(ServiceKind::Navigation) <= priority_of(ServiceKind::Traffic));
    }

    #[test]
    fn crowd_is_never_planned() {
        let thoughts = vec![Thought::new(
            1,
            "看人流",
            vec![],
            vec![ServiceKind::Crowd],
            "",
        )];
        let plan = resolve_plan(&thoughts, &base_extracted(), "上海");
        assert_eq!(plan.count(ServiceKind::Crowd), 0);
    }

    #[test]
    fn resolution_is_deterministic() {
        let mut extracted = base_extracted();
        extracted.days = 3;
        extracted.locations = vec![loc("外滩", true), loc("豫园", true), loc("某某中心", false)];
        let thoughts = vec![Thought::new(
            1,
            "t",
            vec![],
            vec![ServiceKind::Weather, ServiceKind::Poi],
            "",
        )];

        let a = resolve_plan(&thoughts, &extracted, "上海");
        let b = resolve_plan(&thoughts, &extracted, "上海");
        assert_eq!(a, b);
    }
}
