use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{Config, FetchError, WeatherObservation};

use super::WeatherSource;

/// Client for the OpenWeather current-weather endpoint, imperial units.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.api_key()?, config.api_base_url()))
    }

    fn endpoint(&self) -> String {
        format!("{}/data/2.5/weather", self.base_url)
    }

    async fn fetch_current(&self, city: &str) -> Result<WeatherObservation, FetchError> {
        let transport =
            |source: reqwest::Error| FetchError::Transport { city: city.to_string(), source };

        let res = self
            .http
            .get(self.endpoint())
            .query(&[("q", city), ("appid", self.api_key.as_str()), ("units", "imperial")])
            .send()
            .await
            .map_err(transport)?;

        let status = res.status();
        let body = res.text().await.map_err(transport)?;

        if !status.is_success() {
            return Err(FetchError::Status {
                city: city.to_string(),
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body).map_err(|e| {
            FetchError::Parse { city: city.to_string(), reason: e.to_string() }
        })?;

        parsed.into_observation(city)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    dt: Option<i64>,
    main: OwMain,
    weather: Vec<OwWeather>,
}

impl OwCurrentResponse {
    fn into_observation(self, city: &str) -> Result<WeatherObservation, FetchError> {
        let parse =
            |reason: &str| FetchError::Parse { city: city.to_string(), reason: reason.to_string() };

        if self.main.humidity > 100 {
            return Err(parse("humidity outside 0..=100"));
        }

        let conditions = self
            .weather
            .into_iter()
            .next()
            .map(|w| w.description)
            .ok_or_else(|| parse("response contained no weather conditions"))?;

        let observed_at = self.dt.and_then(unix_to_utc).unwrap_or_else(Utc::now);

        Ok(WeatherObservation::new(
            city,
            self.main.temp,
            self.main.feels_like,
            self.main.humidity,
            conditions,
            observed_at,
        ))
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn fetch(&self, city: &str) -> Result<WeatherObservation, FetchError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(FetchError::EmptyCity);
        }

        debug!(city, "fetching current weather");
        let result = self.fetch_current(city).await;
        if let Err(err) = &result {
            debug!(city, error = %err, "weather fetch failed");
        }
        result
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
