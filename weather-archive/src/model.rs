use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Format of the timestamp injected into archive records and keys.
pub const ARCHIVE_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Format of the fetch time shown on dashboard rows.
pub const ROW_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single city's weather reading, in imperial units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    city: String,
    temperature: f64,
    feels_like: f64,
    humidity: u8,
    conditions: String,
    observed_at: DateTime<Utc>,
}

impl WeatherObservation {
    pub fn new(
        city: impl Into<String>,
        temperature: f64,
        feels_like: f64,
        humidity: u8,
        conditions: impl Into<String>,
        observed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            city: city.into(),
            temperature,
            feels_like,
            humidity,
            conditions: conditions.into(),
            observed_at,
        }
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    /// Temperature in °F.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Apparent temperature in °F.
    pub fn feels_like(&self) -> f64 {
        self.feels_like
    }

    /// Relative humidity, 0–100.
    pub fn humidity(&self) -> u8 {
        self.humidity
    }

    pub fn conditions(&self) -> &str {
        &self.conditions
    }

    pub fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }
}

/// Durable JSON form of an observation: its fields plus the rendered
/// archive timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveRecord {
    #[serde(flatten)]
    pub observation: WeatherObservation,
    pub timestamp: String,
}

impl ArchiveRecord {
    pub fn new(observation: WeatherObservation, at: DateTime<Utc>) -> Self {
        Self { observation, timestamp: at.format(ARCHIVE_TIMESTAMP_FORMAT).to_string() }
    }

    /// Object key the record is stored under.
    pub fn key(&self) -> String {
        format!("weather-data/{}-{}.json", self.observation.city(), self.timestamp)
    }
}

/// Flattened, display-oriented projection of an observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardRow {
    pub city: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub conditions: String,
    pub fetched_at: DateTime<Utc>,
}

impl DashboardRow {
    pub fn from_observation(observation: &WeatherObservation, fetched_at: DateTime<Utc>) -> Self {
        Self {
            city: observation.city().to_owned(),
            temperature: observation.temperature(),
            feels_like: observation.feels_like(),
            humidity: observation.humidity(),
            conditions: observation.conditions().to_owned(),
            fetched_at,
        }
    }

    pub fn fetched_at_display(&self) -> String {
        self.fetched_at.format(ROW_TIMESTAMP_FORMAT).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> WeatherObservation {
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
        WeatherObservation::new("New York", 41.5, 36.2, 64, "light rain", at)
    }

    #[test]
    fn record_key_uses_city_and_second_timestamp() {
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
        let record = ArchiveRecord::new(sample(), at);

        assert_eq!(record.timestamp, "20260314-092653");
        assert_eq!(record.key(), "weather-data/New York-20260314-092653.json");
    }

    #[test]
    fn record_json_is_flat_with_timestamp() {
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
        let record = ArchiveRecord::new(sample(), at);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["city"], "New York");
        assert_eq!(value["temperature"], 41.5);
        assert_eq!(value["humidity"], 64);
        assert_eq!(value["conditions"], "light rain");
        assert_eq!(value["timestamp"], "20260314-092653");
    }

    #[test]
    fn row_projects_observation_fields() {
        let fetched = Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap();
        let row = DashboardRow::from_observation(&sample(), fetched);

        assert_eq!(row.city, "New York");
        assert_eq!(row.feels_like, 36.2);
        assert_eq!(row.fetched_at_display(), "2026-03-14 09:30:00");
    }
}
