//! Typed upstream payloads.
//!
//! Every service family returns structured data; nothing downstream of an
//! adapter ever touches a raw transport string.

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Weather
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One day of forecast for a city or district.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: String,
    /// Condition text as reported upstream (e.g. "晴", "小雨").
    pub text: String,
    pub temp_night_c: i32,
    pub temp_day_c: i32,
    pub wind: String,
    pub humidity: String,
    pub precipitation: String,
    /// Outing advice derived from condition and temperature.
    #[serde(default)]
    pub advice: String,
}

impl DailyForecast {
    /// Mean of the day/night temperatures.
    pub fn mean_temp_c(&self) -> f32 {
        (self.temp_day_c + self.temp_night_c) as f32 / 2.0
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POI
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One point of interest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Poi {
    pub id: String,
    pub name: String,
    pub address: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    /// Typical per-person price in local currency units.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<String>,
    /// "lng,lat" as reported upstream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coords: Option<String>,
    /// Indoor/outdoor classification, when upstream or a heuristic knows it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indoor: Option<bool>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Navigation and traffic
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One candidate route between two points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteCandidate {
    pub distance_m: u32,
    pub duration_s: u32,
    pub description: String,
    pub congestion: CongestionLevel,
}

impl RouteCandidate {
    /// "850m" below one kilometre, otherwise "1.2km".
    pub fn format_distance(&self) -> String {
        if self.distance_m < 1_000 {
            format!("{}m", self.distance_m)
        } else {
            format!("{:.1}km", self.distance_m as f32 / 1_000.0)
        }
    }

    /// "45min" below one hour, otherwise "1h05m".
    pub fn format_duration(&self) -> String {
        let minutes = self.duration_s / 60;
        if minutes < 60 {
            format!("{minutes}min")
        } else {
            format!("{}h{:02}m", minutes / 60, minutes % 60)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CongestionLevel {
    Smooth,
    Slow,
    Congested,
    Blocked,
    Unknown,
}

impl Default for CongestionLevel {
    fn default() -> Self {
        CongestionLevel::Unknown
    }
}

/// Live traffic around an area.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrafficStatus {
    pub level: CongestionLevel,
    pub description: String,
    pub timestamp: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Hints and crowd
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One input-tips suggestion for an unverified location candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationHint {
    pub name: String,
    pub district: String,
    pub coord: String,
}

/// Crowd density at a venue. No provider is wired yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrowdStatus {
    pub level: String,
    pub description: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ServicePayload
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The structured value carried by a successful service result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "payload", rename_all = "snake_case")]
pub enum ServicePayload {
    Weather(Vec<DailyForecast>),
    Pois(Vec<Poi>),
    Routes(Vec<RouteCandidate>),
    Traffic(TrafficStatus),
    Hints(Vec<LocationHint>),
    Crowd(CrowdStatus),
}
