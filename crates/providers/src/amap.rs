//! Amap web-service adapters: weather, POI text search, route planning,
//! traffic, and input tips.
//!
//! One [`AmapClient`] implements all five upstream traits; every call shares
//! the envelope handling (`status == "1"`) and the cancellation discipline.

use std::time::Duration;

use serde_json::Value;

use tw_domain::config::AmapConfig;
use tw_domain::payload::{
    CongestionLevel, DailyForecast, LocationHint, Poi, RouteCandidate, TrafficStatus,
};
use tw_domain::{Error, Result};

use crate::ctx::RequestCtx;
use crate::traits::{
    HintsClient, NavigationClient, PoiClient, TrafficClient, TravelMode, WeatherClient,
};
use crate::util::{from_reqwest, json_num, json_str};

/// Safety cap on any single Amap round trip; per-call budgets clamp lower.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Amap REST client covering the whole geospatial suite.
pub struct AmapClient {
    key: String,
    base_url: String,
    city_code: String,
    client: reqwest::Client,
}

impl AmapClient {
    /// Build the adapter from configuration; an empty key is refused.
    pub fn from_config(cfg: &AmapConfig) -> Result<Self> {
        if cfg.key.is_empty() {
            return Err(Error::InvalidInput("amap key is empty".into()));
        }
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(from_reqwest)?;
        Ok(Self {
            key: cfg.key.clone(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            city_code: cfg.city_code.clone(),
            client,
        })
    }

    /// GET an endpoint, unwrap the Amap envelope, return the JSON body.
    async fn get(&self, path: &str, params: &[(&str, &str)], ctx: &RequestCtx) -> Result<Value> {
        if ctx.is_canceled() {
            return Err(Error::Canceled);
        }

        let url = format!("{}{}", self.base_url, path);
        let mut query: Vec<(&str, &str)> = vec![("key", self.key.as_str())];
        query.extend_from_slice(params);

        let request = self
            .client
            .get(&url)
            .timeout(ctx.clamp_timeout(HTTP_TIMEOUT))
            .query(&query)
            .send();

        let response = tokio::select! {
            resp = request => resp.map_err(from_reqwest)?,
            _ = ctx.cancelled() => return Err(Error::Canceled),
        };

        if !response.status().is_success() {
            return Err(Error::Upstream {
                provider: "amap".into(),
                message: format!("HTTP {}", response.status()),
            });
        }

        let json: Value = tokio::select! {
            body = response.json() => body.map_err(from_reqwest)?,
            _ = ctx.cancelled() => return Err(Error::Canceled),
        };

        if json_str(&json, "status") != "1" {
            return Err(Error::Upstream {
                provider: "amap".into(),
                message: format!("{path}: {}", json_str(&json, "info")),
            });
        }
        Ok(json)
    }

    /// Resolve a place name to "lng,lat" via the geocoding endpoint.
    async fn geocode(&self, address: &str, ctx: &RequestCtx) -> Result<String> {
        let json = self
            .get(
                "/v3/geocode/geo",
                &[("address", address), ("city", self.city_code.as_str())],
                ctx,
            )
            .await?;

        json.get("geocodes")
            .and_then(|g| g.get(0))
            .map(|g| json_str(g, "location"))
            .filter(|loc| !loc.is_empty())
            .ok_or_else(|| Error::Upstream {
                provider: "amap".into(),
                message: format!("geocode found nothing for {address}"),
            })
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Weather
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl WeatherClient for AmapClient {
    async fn forecast(&self, city: &str, ctx: &RequestCtx) -> Result<Vec<DailyForecast>> {
        // District names resolve server-side; fall back to the city code for
        // anything the weather endpoint does not know.
        let city_param = if city.is_empty() {
            self.city_code.as_str()
        } else {
            city
        };
        let json = self
            .get(
                "/v3/weather/weatherInfo",
                &[("city", city_param), ("extensions", "all")],
                ctx,
            )
            .await?;

        let casts = json
            .get("forecasts")
            .and_then(|f| f.get(0))
            .and_then(|f| f.get("casts"))
            .and_then(|c| c.as_array())
            .cloned()
            .unwrap_or_default();

        let forecasts: Vec<DailyForecast> = casts.iter().map(parse_cast).collect();
        if forecasts.is_empty() {
            return Err(Error::Upstream {
                provider: "amap".into(),
                message: format!("no forecast for {city_param}"),
            });
        }
        Ok(forecasts)
    }
}

fn parse_cast(cast: &Value) -> DailyForecast {
    let text = json_str(cast, "dayweather");
    let temp_day_c = json_num(cast, "daytemp").unwrap_or(0.0) as i32;
    let temp_night_c = json_num(cast, "nighttemp").unwrap_or(0.0) as i32;
    let advice = outing_advice(&text, temp_day_c, temp_night_c);
    DailyForecast {
        date: json_str(cast, "date"),
        text,
        temp_night_c,
        temp_day_c,
        wind: format!(
            "{}风{}级",
            json_str(cast, "daywind"),
            json_str(cast, "daypower")
        ),
        humidity: String::new(),
        precipitation: String::new(),
        advice,
    }
}

/// Outing advice derived from condition and temperature.
fn outing_advice(condition: &str, day_temp: i32, night_temp: i32) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if ["暴雨", "台风", "冰雹", "雷"]
        .iter()
        .any(|w| condition.contains(w))
    {
        parts.push("天气极端，建议改为室内行程");
    } else if condition.contains('雨') {
        parts.push("有降雨，记得带伞");
    } else if condition.contains('雪') {
        parts.push("可能降雪，注意防滑保暖");
    }
    if day_temp >= 33 {
        parts.push("气温偏高，注意防晒补水");
    } else if day_temp <= 5 || night_temp <= 0 {
        parts.push("气温较低，注意保暖");
    }
    if parts.is_empty() {
        parts.push("天气适宜出行");
    }
    parts.join("；")
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POI search
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl PoiClient for AmapClient {
    async fn search(
        &self,
        keyword: &str,
        region: &str,
        category: Option<&str>,
        limit: usize,
        ctx: &RequestCtx,
    ) -> Result<Vec<Poi>> {
        let offset = limit.clamp(1, 25).to_string();
        let keywords = if region.is_empty() {
            keyword.to_string()
        } else {
            format!("{region} {keyword}")
        };
        let mut params: Vec<(&str, &str)> = vec![
            ("keywords", keywords.as_str()),
            ("city", self.city_code.as_str()),
            ("citylimit", "true"),
            ("offset", offset.as_str()),
        ];
        if let Some(types) = category {
            params.push(("types", types));
        }

        let json = self.get("/v3/place/text", &params, ctx).await?;
        let pois = json
            .get("pois")
            .and_then(|p| p.as_array())
            .cloned()
            .unwrap_or_default();

        Ok(pois.iter().map(parse_poi).collect())
    }
}

fn parse_poi(poi: &Value) -> Poi {
    let biz = poi.get("biz_ext").cloned().unwrap_or(Value::Null);
    Poi {
        id: json_str(poi, "id"),
        name: json_str(poi, "name"),
        address: json_str(poi, "address"),
        category: json_str(poi, "type"),
        rating: json_num(&biz, "rating").map(|r| r as f32),
        price: json_num(&biz, "cost").map(|c| c as u32),
        hours: match json_str(&biz, "open_time").as_str() {
            "" => None,
            hours => Some(hours.to_string()),
        },
        coords: match json_str(poi, "location").as_str() {
            "" => None,
            loc => Some(loc.to_string()),
        },
        indoor: None,
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Navigation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl NavigationClient for AmapClient {
    async fn route(
        &self,
        origin: &str,
        destination: &str,
        mode: TravelMode,
        ctx: &RequestCtx,
    ) -> Result<Vec<RouteCandidate>> {
        let origin_coord = self.geocode(origin, ctx).await?;
        let destination_coord = self.geocode(destination, ctx).await?;

        let path = match mode {
            TravelMode::Driving => "/v3/direction/driving",
            TravelMode::Walking => "/v3/direction/walking",
            TravelMode::Transit => "/v3/direction/transit/integrated",
        };
        let mut params: Vec<(&str, &str)> = vec![
            ("origin", origin_coord.as_str()),
            ("destination", destination_coord.as_str()),
        ];
        if matches!(mode, TravelMode::Transit) {
            params.push(("city", self.city_code.as_str()));
        }

        let json = self.get(path, &params, ctx).await?;
        let candidates = match mode {
            TravelMode::Transit => parse_transits(&json),
            _ => parse_paths(&json),
        };
        if candidates.is_empty() {
            return Err(Error::Upstream {
                provider: "amap".into(),
                message: format!("no route from {origin} to {destination}"),
            });
        }
        Ok(candidates)
    }
}

fn parse_paths(json: &Value) -> Vec<RouteCandidate> {
    json.pointer("/route/paths")
        .and_then(|p| p.as_array())
        .map(|paths| {
            paths
                .iter()
                .map(|path| RouteCandidate {
                    distance_m: json_num(path, "distance").unwrap_or(0.0) as u32,
                    duration_s: json_num(path, "duration").unwrap_or(0.0) as u32,
                    description: match json_str(path, "strategy").as_str() {
                        "" => "驾车路线".to_string(),
                        strategy => strategy.to_string(),
                    },
                    congestion: CongestionLevel::Unknown,
                })
                .collect()
        })
        .unwrap_or_default()
}

fn parse_transits(json: &Value) -> Vec<RouteCandidate> {
    let distance = json
        .pointer("/route/distance")
        .and_then(|d| d.as_str())
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);
    json.pointer("/route/transits")
        .and_then(|t| t.as_array())
        .map(|transits| {
            transits
                .iter()
                .map(|transit| RouteCandidate {
                    distance_m: distance as u32,
                    duration_s: json_num(transit, "duration").unwrap_or(0.0) as u32,
                    description: "公交换乘".to_string(),
                    congestion: CongestionLevel::Unknown,
                })
                .collect()
        })
        .unwrap_or_default()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Traffic
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl TrafficClient for AmapClient {
    async fn status(&self, area: &str, ctx: &RequestCtx) -> Result<TrafficStatus> {
        let coord = self.geocode(area, ctx).await?;
        let rectangle = rectangle_around(&coord).ok_or_else(|| Error::Parse(format!(
            "geocode returned malformed coordinate {coord}"
        )))?;

        let json = self
            .get(
                "/v3/traffic/status/rectangle",
                &[("rectangle", rectangle.as_str()), ("level", "5")],
                ctx,
            )
            .await?;

        let info = json.get("trafficinfo").cloned().unwrap_or(Value::Null);
        let status_code = json
            .pointer("/trafficinfo/evaluation/status")
            .and_then(|s| s.as_str())
            .unwrap_or("0");

        Ok(TrafficStatus {
            level: congestion_from_code(status_code),
            description: json_str(&info, "description"),
            timestamp: chrono_now(),
        })
    }
}

/// A ~2 km box centred on "lng,lat", in Amap rectangle syntax.
fn rectangle_around(coord: &str) -> Option<String> {
    let (lng, lat) = coord.split_once(',')?;
    let lng: f64 = lng.trim().parse().ok()?;
    let lat: f64 = lat.trim().parse().ok()?;
    Some(format!(
        "{:.6},{:.6};{:.6},{:.6}",
        lng - 0.01,
        lat - 0.01,
        lng + 0.01,
        lat + 0.01
    ))
}

fn congestion_from_code(code: &str) -> CongestionLevel {
    match code {
        "1" => CongestionLevel::Smooth,
        "2" => CongestionLevel::Slow,
        "3" => CongestionLevel::Congested,
        "4" => CongestionLevel::Blocked,
        _ => CongestionLevel::Unknown,
    }
}

fn chrono_now() -> String {
    chrono::Utc::now().to_rfc3339()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Input tips
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl HintsClient for AmapClient {
    async fn tips(
        &self,
        keyword: &str,
        _region: &str,
        city_limit: bool,
        ctx: &RequestCtx,
    ) -> Result<Vec<LocationHint>> {
        // Region scoping rides on the configured city code.
        let citylimit = if city_limit { "true" } else { "false" };
        let json = self
            .get(
                "/v3/assistant/inputtips",
                &[
                    ("keywords", keyword),
                    ("city", self.city_code.as_str()),
                    ("citylimit", citylimit),
                ],
                ctx,
            )
            .await?;

        let tips = json
            .get("tips")
            .and_then(|t| t.as_array())
            .cloned()
            .unwrap_or_default();

        Ok(tips
            .iter()
            .filter(|tip| !json_str(tip, "name").is_empty())
            .map(|tip| LocationHint {
                name: json_str(tip, "name"),
                district: json_str(tip, "district"),
                coord: json_str(tip, "location"),
            })
            .collect())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
