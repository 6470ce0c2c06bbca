//! Dispatch one planned spec to the matching upstream client.

use std::sync::Arc;

use tw_domain::payload::ServicePayload;
use tw_domain::plan::ServiceCallSpec;
use tw_domain::{Error, Result, ServiceKind};
use tw_providers::{
    HintsClient, NavigationClient, PoiClient, RequestCtx, TrafficClient, TravelMode,
    WeatherClient,
};

/// Default POI page size, matching what the composer ranks.
const POI_LIMIT: usize = 5;

/// The set of upstream clients one deployment talks to.
///
/// Kinds dispatch by tag — no reflection, no registry. Crowd has no
/// provider yet and answers with an upstream error.
pub struct ServiceRouter {
    pub weather: Arc<dyn WeatherClient>,
    pub poi: Arc<dyn PoiClient>,
    pub navigation: Arc<dyn NavigationClient>,
    pub traffic: Arc<dyn TrafficClient>,
    pub hints: Arc<dyn HintsClient>,
}

impl ServiceRouter {
    /// Execute one spec and return its typed payload.
    pub async fn dispatch(&self, spec: &ServiceCallSpec, ctx: &RequestCtx) -> Result<ServicePayload> {
        match spec.kind {
            ServiceKind::Weather => {
                let city = spec.param("city").unwrap_or(&spec.key);
                let day: usize = spec.param("day").and_then(|d| d.parse().ok()).unwrap_or(1);
                let forecasts = self.weather.forecast(city, ctx).await?;
                match forecasts.into_iter().nth(day.max(1) - 1) {
                    Some(forecast) => Ok(ServicePayload::Weather(vec![forecast])),
                    None => Err(Error::Upstream {
                        provider: "weather".into(),
                        message: format!("no forecast for {city} on day {day}"),
                    }),
                }
            }
            ServiceKind::Poi => {
                let keyword = spec.param("keyword").unwrap_or("景点");
                let region = spec.param("region").unwrap_or(&spec.key);
                let pois = self
                    .poi
                    .search(keyword, region, spec.param("category"), POI_LIMIT, ctx)
                    .await?;
                Ok(ServicePayload::Pois(pois))
            }
            ServiceKind::Navigation => {
                let origin = spec
                    .param("origin")
                    .ok_or_else(|| Error::Internal(format!("navigation spec {} lacks origin", spec.key)))?;
                let destination = spec
                    .param("destination")
                    .ok_or_else(|| Error::Internal(format!("navigation spec {} lacks destination", spec.key)))?;
                let mode = match spec.param("mode") {
                    Some("transit") => TravelMode::Transit,
                    Some("walking") => TravelMode::Walking,
                    _ => TravelMode::Driving,
                };
                let routes = self.navigation.route(origin, destination, mode, ctx).await?;
                Ok(ServicePayload::Routes(routes))
            }
            ServiceKind::Traffic => {
                let area = spec.param("area").unwrap_or(&spec.key);
                let status = self.traffic.status(area, ctx).await?;
                Ok(ServicePayload::Traffic(status))
            }
            ServiceKind::InputHints => {
                let keyword = spec.param("keyword").unwrap_or(&spec.key);
                let region = spec.param("region").unwrap_or_default();
                let city_limit = spec.param("citylimit") != Some("false");
                let hints = self.hints.tips(keyword, region, city_limit, ctx).await?;
                Ok(ServicePayload::Hints(hints))
            }
            ServiceKind::Crowd => Err(Error::Upstream {
                provider: "crowd".into(),
                message: "no crowd provider configured".into(),
            }),
        }
    }
}
