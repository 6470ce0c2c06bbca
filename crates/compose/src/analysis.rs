//! Environmental analysis: fuse weather and POIs into per-location
//! assessments the composer can rank and cite.

use serde::{Deserialize, Serialize};

use tw_domain::context::{BudgetLevel, Preference};
use tw_domain::extracted::{ActivityClass, Extracted};
use tw_domain::payload::{DailyForecast, Poi, ServicePayload};
use tw_domain::result::ResultBundle;
use tw_domain::ServiceKind;

/// How many POIs each location keeps after ranking.
const TOP_POIS: usize = 5;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherBand {
    Extreme,
    Rainy,
    Snow,
    Cloudy,
    Sunny,
    Moderate,
    Unknown,
}

/// Rule-derived usability of the weather at one location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherAssessment {
    pub summary: String,
    pub band: WeatherBand,
    pub average_temp_c: Option<f32>,
    pub suitable_for_outdoor: bool,
    pub advice: String,
    /// 0..=100; higher is friendlier.
    pub score: u8,
}

/// One ranked POI with the reasons behind its score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredPoi {
    pub name: String,
    pub category: String,
    pub address: String,
    pub score: u8,
    pub rating: Option<f32>,
    pub price: Option<u32>,
    pub reasons: Vec<String>,
}

/// Weather plus ranked POIs for one target location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationAnalysis {
    pub location: String,
    pub weather: WeatherAssessment,
    pub top_pois: Vec<ScoredPoi>,
    pub indoor_priority: bool,
    pub data_available: bool,
}

/// The full per-turn analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentalAnalysis {
    pub locations: Vec<LocationAnalysis>,
    pub overall_tips: Vec<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Entry point
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Build the environmental analysis for a turn.
pub fn analyze(extracted: &Extracted, bundle: &ResultBundle, region: &str) -> EnvironmentalAnalysis {
    let mut targets: Vec<String> = extracted
        .verified_locations()
        .iter()
        .map(|s| s.to_string())
        .collect();
    if targets.is_empty() {
        // Fall back to whatever the bundle actually covers. Weather keys
        // carry a ":dayN" suffix that is not part of the location name.
        targets = bundle
            .ok_of_kind(ServiceKind::Weather)
            .iter()
            .map(|r| r.key().split(":day").next().unwrap_or(r.key()).to_string())
            .collect();
        targets.dedup();
    }
    if targets.is_empty() {
        targets.push(region.to_string());
    }

    let locations: Vec<LocationAnalysis> = targets
        .iter()
        .map(|target| analyze_location(target, extracted, bundle))
        .collect();

    let overall_tips = overall_tips(&locations);

    EnvironmentalAnalysis {
        locations,
        overall_tips,
    }
}

fn analyze_location(target: &str, extracted: &Extracted, bundle: &ResultBundle) -> LocationAnalysis {
    let forecasts = forecasts_for(target, bundle);
    let weather = assess_weather(&forecasts);

    let pois = pois_for(target, bundle);
    let mut scored: Vec<ScoredPoi> = pois
        .iter()
        .map(|poi| score_poi(poi, &weather, extracted))
        .collect();
    scored.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| {
                b.rating
                    .unwrap_or(0.0)
                    .partial_cmp(&a.rating.unwrap_or(0.0))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| a.name.cmp(&b.name))
    });
    scored.truncate(TOP_POIS);

    LocationAnalysis {
        location: target.to_string(),
        weather: weather.clone(),
        indoor_priority: !weather.suitable_for_outdoor,
        data_available: !pois.is_empty(),
        top_pois: scored,
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Bundle digging
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Forecasts for a location, falling back to any other location's data.
fn forecasts_for(target: &str, bundle: &ResultBundle) -> Vec<DailyForecast> {
    let ok = bundle.ok_of_kind(ServiceKind::Weather);
    let exact = ok.iter().find(|r| r.key() == target);
    let fuzzy = ok.iter().find(|r| r.key().contains(target) || target.contains(r.key()));
    let chosen = exact.or(fuzzy).or_else(|| ok.first());

    match chosen.and_then(|r| r.payload()) {
        Some(ServicePayload::Weather(forecasts)) => forecasts.clone(),
        _ => Vec::new(),
    }
}

/// POIs searched for a location; none means the location has a data gap.
fn pois_for(target: &str, bundle: &ResultBundle) -> Vec<Poi> {
    let ok = bundle.ok_of_kind(ServiceKind::Poi);
    let chosen = ok
        .iter()
        .find(|r| r.key() == target || r.key().contains(target) || target.contains(r.key()));

    match chosen.and_then(|r| r.payload()) {
        Some(ServicePayload::Pois(pois)) => pois.clone(),
        _ => Vec::new(),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Weather rules
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Score the weather on the trip's first day.
pub fn assess_weather(forecasts: &[DailyForecast]) -> WeatherAssessment {
    let Some(first) = forecasts.first() else {
        return WeatherAssessment {
            summary: "暂无天气数据".into(),
            band: WeatherBand::Unknown,
            average_temp_c: None,
            suitable_for_outdoor: false,
            advice: "暂无可靠天气信息，出行前请再次确认天气预报。".into(),
            score: 50,
        };
    };

    let text = first.text.to_lowercase();
    let (band, mut score, mut outdoor, advice): (WeatherBand, i32, bool, &str) =
        if ["雷", "暴雨", "台风", "大风", "冰雹", "storm", "typhoon", "hail"]
            .iter()
            .any(|w| text.contains(w))
        {
            (
                WeatherBand::Extreme,
                20,
                false,
                "天气较为极端，请优先选择室内活动，并留意官方安全预警。",
            )
        } else if text.contains('雨') || text.contains("rain") {
            (
                WeatherBand::Rainy,
                45,
                false,
                "有降雨，建议准备雨具，把重点放在室内或半室内项目上。",
            )
        } else if text.contains('雪') || text.contains("snow") {
            (
                WeatherBand::Snow,
                40,
                false,
                "可能有降雪或湿冷，注意防滑保暖，多安排室内体验。",
            )
        } else if text.contains('阴') || text.contains("多云") || text.contains("cloud") {
            (
                WeatherBand::Cloudy,
                65,
                true,
                "多云天气，光线柔和，适合轻松散步或展览类活动。",
            )
        } else if text.contains('晴') || text.contains('阳') || text.contains("sunny") {
            (
                WeatherBand::Sunny,
                85,
                true,
                "晴朗天气，适合户外活动，注意补水和防晒。",
            )
        } else {
            (
                WeatherBand::Moderate,
                70,
                true,
                "天气整体适宜，可以灵活安排室内外活动。",
            )
        };

    let mean = first.mean_temp_c();
    let mut advice = advice.to_string();
    if mean >= 33.0 {
        score -= 10;
        advice.push_str(" 气温偏高，户外时段安排在早晚为宜。");
    } else if mean <= 5.0 {
        score -= 10;
        outdoor = false;
        advice.push_str(" 气温较低，注意防寒保暖，多考虑室内选项。");
    }

    WeatherAssessment {
        summary: first.text.clone(),
        band,
        average_temp_c: Some(mean),
        suitable_for_outdoor: outdoor,
        advice,
        score: score.clamp(0, 100) as u8,
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POI rules
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

const OUTDOOR_HINTS: &[&str] = &[
    "公园", "广场", "景区", "风景", "户外", "古镇", "滨江", "滨水", "步道", "花园",
    "绿地", "动物园", "植物园", "露台", "park", "garden", "outdoor",
];

const INDOOR_HINTS: &[&str] = &[
    "博物馆", "美术馆", "展览", "购物", "商场", "百货", "餐厅", "咖啡", "剧院",
    "水族馆", "书店", "体验馆", "museum", "gallery", "mall", "restaurant", "cafe",
];

fn is_outdoor(poi: &Poi) -> Option<bool> {
    if let Some(indoor) = poi.indoor {
        return Some(!indoor);
    }
    let text = format!("{}{}", poi.category, poi.name).to_lowercase();
    if OUTDOOR_HINTS.iter().any(|w| text.contains(w)) {
        Some(true)
    } else if INDOOR_HINTS.iter().any(|w| text.contains(w)) {
        Some(false)
    } else {
        None
    }
}

fn price_band(price: u32) -> BudgetLevel {
    if price <= 80 {
        BudgetLevel::Low
    } else if price <= 180 {
        BudgetLevel::Medium
    } else if price <= 300 {
        BudgetLevel::MediumHigh
    } else {
        BudgetLevel::High
    }
}

fn preference_label(pref: Preference) -> &'static str {
    match pref {
        Preference::LocalCulture => "风土人情",
        Preference::LocalSpecialty => "特色",
        Preference::OffTheBeatenPath => "小众",
        Preference::Niche => "小众",
        Preference::InternetFamous => "网红",
        Preference::PhotoSpots => "拍照",
        Preference::FoodFocused => "美食",
        Preference::ShoppingFocused => "购物",
        Preference::HistoryFocused => "历史",
        Preference::NatureFocused => "自然",
        Preference::ArtFocused => "艺术",
        Preference::Nightlife => "夜生活",
        Preference::SlowPaced => "慢节奏",
        Preference::InDepth => "深度",
    }
}

fn activity_label(activity: ActivityClass) -> &'static str {
    activity.search_keyword()
}

/// Score one POI against weather, preferences, and budget.
pub fn score_poi(poi: &Poi, weather: &WeatherAssessment, extracted: &Extracted) -> ScoredPoi {
    let mut score = 40.0f32;
    let mut reasons: Vec<String> = Vec::new();

    match poi.rating {
        Some(rating) if rating > 0.0 => {
            score += (rating * 18.0).min(60.0);
            reasons.push(format!("大众评分 {rating:.1} 分"));
        }
        _ => reasons.push("口碑信息有限，以现场体验为准".into()),
    }

    match is_outdoor(poi) {
        Some(true) => {
            reasons.push("户外体验感强".into());
            if weather.suitable_for_outdoor {
                score += 12.0;
            } else {
                score -= 25.0;
                reasons.push("当前天气不利于长时间户外，建议作为备选".into());
            }
        }
        Some(false) => {
            reasons.push("室内环境舒适".into());
            score += if weather.suitable_for_outdoor { 6.0 } else { 18.0 };
        }
        None => {}
    }

    let poi_text = format!("{}{}", poi.name, poi.category).to_lowercase();
    let mut wanted: Vec<&str> = extracted
        .preferences
        .iter()
        .map(|p| preference_label(*p))
        .collect();
    wanted.extend(extracted.activities.iter().map(|a| activity_label(*a)));
    wanted.sort();
    wanted.dedup();
    for label in wanted {
        if poi_text.contains(&label.to_lowercase()) {
            score += 10.0;
            reasons.push(format!("匹配偏好「{label}」"));
        }
    }

    if let Some(price) = poi.price {
        let band = price_band(price);
        let budget = extracted.budget.level;
        if budget == BudgetLevel::Low
            && matches!(band, BudgetLevel::MediumHigh | BudgetLevel::High)
        {
            score -= 18.0;
            reasons.push("价格偏高，注意控制预算".into());
        } else if budget == BudgetLevel::High
            && matches!(band, BudgetLevel::Low | BudgetLevel::Medium)
        {
            score += 8.0;
            reasons.push("价格亲民，可适当升级体验".into());
        } else if budget == band {
            score += 6.0;
            reasons.push("价格与预算匹配".into());
        }
    }

    ScoredPoi {
        name: poi.name.clone(),
        category: poi.category.clone(),
        address: poi.address.clone(),
        score: score.clamp(0.0, 100.0).round() as u8,
        rating: poi.rating,
        price: poi.price,
        reasons,
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Overall tips
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn overall_tips(locations: &[LocationAnalysis]) -> Vec<String> {
    if locations.is_empty() {
        return vec!["尚未收集到有效的天气或POI数据，请稍后再试。".into()];
    }

    let mut tips: Vec<String> = Vec::new();

    let challenging: Vec<&LocationAnalysis> = locations
        .iter()
        .filter(|l| {
            matches!(
                l.weather.band,
                WeatherBand::Extreme | WeatherBand::Rainy | WeatherBand::Snow
            ) || l.weather.score < 55
        })
        .collect();
    if challenging.is_empty() {
        tips.push("当前整体天气友好，可以安排室内外结合的丰富行程。".into());
    } else {
        for analysis in challenging {
            tips.push(format!(
                "{}天气提示：{}",
                analysis.location, analysis.weather.advice
            ));
        }
    }

    if locations.iter().any(|l| l.indoor_priority) {
        tips.push("为确保体验舒适，建议准备至少一条以室内体验为主的备用路线。".into());
    }

    if locations.iter().any(|l| !l.data_available) {
        tips.push("部分地点暂无可靠POI数据，可自行补充当地热门场所。".into());
    }

    tips
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use tw_domain::result::ServiceResult;

    fn forecast(text: &str, day: i32, night: i32) -> DailyForecast {
        DailyForecast {
            text: text.into(),
            temp_day_c: day,
            temp_night_c: night,
            ..Default::default()
        }
    }

    #[test]
    fn weather_bands_and_scores() {
        let cases = [
            ("暴雨", WeatherBand::Extreme, 20),
            ("小雨", WeatherBand::Rainy, 45),
            ("小雪", WeatherBand::Snow, 40),
            ("多云", WeatherBand::Cloudy, 65),
            ("晴", WeatherBand::Sunny, 85),
            ("沙尘", WeatherBand::Moderate, 70),
        ];
        for (text, band, score) in cases {
            let assessment = assess_weather(&[forecast(text, 22, 16)]);
            assert_eq!(assessment.band, band, "text {text}");
            assert_eq!(assessment.score, score, "text {text}");
        }
    }

    #[test]
    fn heat_and_cold_penalties() {
        let hot = assess_weather(&[forecast("晴", 36, 30)]);
        assert_eq!(hot.score, 75);
        assert!(hot.suitable_for_outdoor);

        let cold = assess_weather(&[forecast("晴", 6, 0)]);
        assert_eq!(cold.score, 75);
        assert!(!cold.suitable_for_outdoor);
    }

    #[test]
    fn missing_weather_scores_fifty_and_blocks_outdoor() {
        let unknown = assess_weather(&[]);
        assert_eq!(unknown.band, WeatherBand::Unknown);
        assert_eq!(unknown.score, 50);
        assert!(!unknown.suitable_for_outdoor);
    }

    fn poi(name: &str, category: &str, rating: Option<f32>, price: Option<u32>) -> Poi {
        Poi {
            name: name.into(),
            category: category.into(),
            rating,
            price,
            ..Default::default()
        }
    }

    fn sunny() -> WeatherAssessment {
        assess_weather(&[forecast("晴", 24, 18)])
    }

    fn rainy() -> WeatherAssessment {
        assess_weather(&[forecast("中雨", 24, 18)])
    }

    #[test]
    fn rating_dominates_the_score() {
        let extracted = Extracted::default();
        let rated = score_poi(&poi("甲", "", Some(4.5), None), &sunny(), &extracted);
        let unrated = score_poi(&poi("乙", "", None, None), &sunny(), &extracted);
        assert!(rated.score > unrated.score);
        // 40 + min(4.5*18, 60) = 100, clamped.
        assert_eq!(rated.score, 100);
        assert_eq!(unrated.score, 40);
    }

    #[test]
    fn outdoor_poi_penalized_in_rain() {
        let extracted = Extracted::default();
        let park = poi("滨江步道公园", "公园", Some(4.0), None);
        let in_sun = score_poi(&park, &sunny(), &extracted);
        let in_rain = score_poi(&park, &rainy(), &extracted);
        assert!(in_sun.score > in_rain.score);
        assert!(in_rain
            .reasons
            .iter()
            .any(|r| r.contains("建议作为备选")));
    }

    #[test]
    fn indoor_poi_boosted_in_rain() {
        let extracted = Extracted::default();
        let museum = poi("自然博物馆", "博物馆", Some(2.0), None);
        let in_rain = score_poi(&museum, &rainy(), &extracted);
        let in_sun = score_poi(&museum, &sunny(), &extracted);
        assert!(in_rain.score > in_sun.score);
    }

    #[test]
    fn budget_mismatch_penalty() {
        let mut extracted = Extracted::default();
        extracted.budget.level = BudgetLevel::Low;
        let pricey = score_poi(&poi("米其林餐厅", "餐厅", Some(4.0), Some(600)), &sunny(), &extracted);
        assert!(pricey.reasons.iter().any(|r| r.contains("注意控制预算")));

        extracted.budget.level = BudgetLevel::Medium;
        let matched = score_poi(&poi("本帮菜馆", "餐厅", Some(4.0), Some(120)), &sunny(), &extracted);
        assert!(matched.reasons.iter().any(|r| r.contains("价格与预算匹配")));
    }

    #[test]
    fn analysis_ranks_and_truncates() {
        let mut bundle = ResultBundle::default();
        let pois: Vec<Poi> = (0..7)
            .map(|i| poi(&format!("地点{i}"), "景区", Some(3.0 + i as f32 * 0.2), None))
            .collect();
        bundle.push(ServiceResult::Ok {
            kind: ServiceKind::Poi,
            key: "外滩".into(),
            payload: ServicePayload::Pois(pois),
        });
        bundle.push(ServiceResult::Ok {
            kind: ServiceKind::Weather,
            key: "外滩".into(),
            payload: ServicePayload::Weather(vec![forecast("晴", 24, 18)]),
        });

        let mut extracted = Extracted::default();
        extracted.locations = vec![tw_domain::extracted::LocationMatch {
            name: "外滩".into(),
            verified: true,
        }];

        let analysis = analyze(&extracted, &bundle, "上海");
        assert_eq!(analysis.locations.len(), 1);
        let location = &analysis.locations[0];
        assert_eq!(location.top_pois.len(), 5);
        assert!(location.data_available);
        // Best rating first.
        assert_eq!(location.top_pois[0].name, "地点6");
        assert!(!analysis.overall_tips.is_empty());
    }

    #[test]
    fn missing_poi_data_flagged_in_tips() {
        let bundle = ResultBundle::default();
        let extracted = Extracted::default();
        let analysis = analyze(&extracted, &bundle, "上海");
        assert!(analysis
            .overall_tips
            .iter()
            .any(|t| t.contains("暂无可靠POI数据")));
    }
}
