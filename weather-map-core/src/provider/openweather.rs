use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::{Coordinate, WeatherError, WeatherSnapshot};

use super::WeatherClient;

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String, base_url: &str, timeout: Duration) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WeatherError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn fetch_current(&self, params: &[(&str, String)]) -> Result<WeatherSnapshot, WeatherError> {
        let url = format!("{}/weather", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(params)
            .query(&[("units", "metric"), ("appid", self.api_key.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if status != StatusCode::OK {
            return Err(status_error(status, &body));
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body)
            .map_err(|e| WeatherError::Parse(format!("Failed to parse OpenWeather JSON: {e}")))?;

        parsed.into_snapshot()
    }
}

#[async_trait]
impl WeatherClient for OpenWeatherClient {
    async fn lookup_by_coordinate(
        &self,
        coordinate: Coordinate,
    ) -> Result<WeatherSnapshot, WeatherError> {
        tracing::debug!(%coordinate, "OpenWeather lookup by coordinate");
        self.fetch_current(&[
            ("lat", coordinate.latitude.to_string()),
            ("lon", coordinate.longitude.to_string()),
        ])
        .await
    }

    async fn lookup_by_name(&self, query: &str) -> Result<WeatherSnapshot, WeatherError> {
        tracing::debug!(query, "OpenWeather lookup by name");
        self.fetch_current(&[("q", query.to_string())]).await
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: Option<f64>,
    humidity: u8,
    pressure: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    deg: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct OwClouds {
    all: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    name: Option<String>,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    visibility: Option<u32>,
    clouds: Option<OwClouds>,
    sys: Option<OwSys>,
}

impl OwCurrentResponse {
    fn into_snapshot(self) -> Result<WeatherSnapshot, WeatherError> {
        let condition = self.weather.into_iter().next().ok_or_else(|| {
            WeatherError::Parse("OpenWeather response contained no weather conditions".into())
        })?;

        let (sunrise, sunset) = self
            .sys
            .map(|s| (s.sunrise, s.sunset))
            .unwrap_or_default();

        Ok(WeatherSnapshot {
            // Points at sea come back with an empty name.
            location_name: self.name.filter(|n| !n.trim().is_empty()),
            temperature_c: self.main.temp,
            feels_like_c: self.main.feels_like,
            condition_description: condition.description,
            condition_icon_id: condition.icon,
            humidity_pct: self.main.humidity,
            pressure_hpa: self.main.pressure,
            wind_speed_mps: self.wind.speed,
            wind_direction_deg: self.wind.deg,
            visibility_m: self.visibility,
            cloudiness_pct: self.clouds.and_then(|c| c.all),
            sunrise_epoch_sec: sunrise,
            sunset_epoch_sec: sunset,
        })
    }
}

fn status_error(status: StatusCode, body: &str) -> WeatherError {
    match status {
        StatusCode::NOT_FOUND => WeatherError::NotFound(provider_message(body)),
        StatusCode::UNAUTHORIZED => {
            WeatherError::Config(format!("API key rejected: {}", provider_message(body)))
        }
        _ => WeatherError::Network(format!(
            "OpenWeather request failed with status {}: {}",
            status,
            truncate_body(body),
        )),
    }
}

/// OpenWeather error bodies look like `{"cod":"404","message":"city not found"}`.
fn provider_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct OwError {
        message: String,
    }

    serde_json::from_str::<OwError>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| truncate_body(body))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let cut = (0..=MAX).rev().find(|&i| body.is_char_boundary(i)).unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<WeatherSnapshot, WeatherError> {
        serde_json::from_str::<OwCurrentResponse>(json)
            .map_err(|e| WeatherError::Parse(e.to_string()))?
            .into_snapshot()
    }

    #[test]
    fn minimal_payload_maps_required_fields() {
        let snapshot = parse(
            r#"{"main":{"temp":25.0,"humidity":40},
                "weather":[{"description":"clear sky","icon":"01d"}],
                "wind":{"speed":2.1}}"#,
        )
        .expect("minimal payload");

        assert_eq!(snapshot, WeatherSnapshot::basic(25.0, "clear sky", "01d", 40, 2.1));
    }

    #[test]
    fn full_payload_maps_extended_fields() {
        let snapshot = parse(
            r#"{"name":"Delhi","dt":1700000000,
                "main":{"temp":31.2,"feels_like":33.0,"humidity":55,"pressure":1008},
                "weather":[{"id":721,"main":"Haze","description":"haze","icon":"50d"}],
                "wind":{"speed":3.6,"deg":290},"visibility":3000,"clouds":{"all":20},
                "sys":{"country":"IN","sunrise":1699922400,"sunset":1699962000}}"#,
        )
        .expect("full payload");

        assert_eq!(snapshot.location_name.as_deref(), Some("Delhi"));
        assert_eq!(snapshot.feels_like_c, Some(33.0));
        assert_eq!(snapshot.pressure_hpa, Some(1008));
        assert_eq!(snapshot.wind_direction_deg, Some(290));
        assert_eq!(snapshot.visibility_m, Some(3000));
        assert_eq!(snapshot.cloudiness_pct, Some(20));
        assert_eq!(snapshot.sunrise_epoch_sec, Some(1699922400));
        assert_eq!(snapshot.sunset_epoch_sec, Some(1699962000));
    }

    #[test]
    fn empty_name_becomes_none() {
        let snapshot = parse(
            r#"{"name":"","main":{"temp":1.0,"humidity":90},
                "weather":[{"description":"mist","icon":"50n"}],"wind":{"speed":0.5}}"#,
        )
        .expect("payload");

        assert!(snapshot.location_name.is_none());
    }

    #[test]
    fn missing_condition_is_parse_error() {
        let err = parse(r#"{"main":{"temp":1.0,"humidity":90},"weather":[],"wind":{"speed":0.5}}"#)
            .unwrap_err();

        assert!(matches!(err, WeatherError::Parse(_)));
    }

    #[test]
    fn status_mapping() {
        let not_found = status_error(StatusCode::NOT_FOUND, r#"{"cod":"404","message":"city not found"}"#);
        assert_eq!(not_found, WeatherError::NotFound("city not found".into()));

        let unauthorized = status_error(StatusCode::UNAUTHORIZED, "nope");
        assert!(matches!(unauthorized, WeatherError::Config(_)));

        let server = status_error(StatusCode::BAD_GATEWAY, "upstream");
        assert!(matches!(server, WeatherError::Network(msg) if msg.contains("502")));
    }

    #[test]
    fn truncate_body_limits_length() {
        let long = "x".repeat(500);
        let t = truncate_body(&long);
        assert_eq!(t.len(), 203);
        assert!(t.ends_with("..."));
        assert_eq!(truncate_body("short"), "short");
    }
}
