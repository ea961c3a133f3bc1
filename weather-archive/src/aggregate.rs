//! Fan a city list out to a [`WeatherSource`] one city at a time and collect
//! the successes in input order.

use chrono::Utc;
use tracing::{info, warn};

use crate::{
    ArchiveWriter, DashboardRow, FetchError, StorageError, WeatherObservation,
    provider::WeatherSource, store::ArchiveStore,
};

/// Result of a batch fetch. Failed cities are absent from `observations`
/// and `rows`; the two are index-aligned.
#[derive(Debug, Default)]
pub struct Batch {
    pub observations: Vec<WeatherObservation>,
    /// Rows stamped with the time each city's fetch completed.
    pub rows: Vec<DashboardRow>,
    pub failures: Vec<(String, FetchError)>,
}

impl Batch {
    /// True when nothing was fetched.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

/// Keys written and per-city write failures of [`archive_batch`].
#[derive(Debug, Default)]
pub struct ArchiveSummary {
    pub written: Vec<String>,
    pub failures: Vec<(String, StorageError)>,
}

/// Split comma-separated user input into trimmed, non-empty city names.
pub fn parse_city_list(input: &str) -> Vec<String> {
    input.split(',').map(str::trim).filter(|c| !c.is_empty()).map(str::to_string).collect()
}

/// Fetch every city in order, keeping observations and failures.
pub async fn fetch_batch<W, I, C>(source: &W, cities: I) -> Batch
where
    W: WeatherSource + ?Sized,
    I: IntoIterator<Item = C>,
    C: AsRef<str>,
{
    let mut batch = Batch::default();

    for city in cities {
        let city = city.as_ref().trim();
        if city.is_empty() {
            warn!("skipping empty city name");
            continue;
        }

        match source.fetch(city).await {
            Ok(observation) => {
                batch.rows.push(DashboardRow::from_observation(&observation, Utc::now()));
                batch.observations.push(observation);
            }
            Err(err) => {
                warn!(city, error = %err, "skipping city");
                batch.failures.push((city.to_string(), err));
            }
        }
    }

    info!(
        fetched = batch.observations.len(),
        failed = batch.failures.len(),
        "batch fetch finished"
    );
    batch
}

/// Fetch every city and return rows for the ones that succeeded.
///
/// An empty result means nothing was fetched.
pub async fn fetch_many<W, I, C>(source: &W, cities: I) -> Vec<DashboardRow>
where
    W: WeatherSource + ?Sized,
    I: IntoIterator<Item = C>,
    C: AsRef<str>,
{
    fetch_batch(source, cities).await.rows
}

/// Persist each observation once, continuing past failures.
pub async fn archive_batch<S: ArchiveStore>(
    writer: &ArchiveWriter<S>,
    observations: &[WeatherObservation],
) -> ArchiveSummary {
    let mut summary = ArchiveSummary::default();

    for observation in observations {
        match writer.persist(observation).await {
            Ok(key) => summary.written.push(key),
            Err(err) => summary.failures.push((observation.city().to_string(), err)),
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::{collections::HashMap, time::Duration};

    /// Serves canned observations; any other city fails to parse.
    #[derive(Debug, Default)]
    struct StubSource {
        known: HashMap<String, (f64, f64, u8, &'static str)>,
        calls: Mutex<Vec<String>>,
        delay: Option<Duration>,
    }

    impl StubSource {
        fn with(mut self, city: &str, reading: (f64, f64, u8, &'static str)) -> Self {
            self.known.insert(city.to_string(), reading);
            self
        }

        fn delayed(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }
    }

    #[async_trait]
    impl WeatherSource for StubSource {
        async fn fetch(&self, city: &str) -> Result<WeatherObservation, FetchError> {
            self.calls.lock().push(city.to_string());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match self.known.get(city) {
                Some(&(temp, feels, humidity, conditions)) => Ok(WeatherObservation::new(
                    city,
                    temp,
                    feels,
                    humidity,
                    conditions,
                    Utc::now(),
                )),
                None => Err(FetchError::Status {
                    city: city.to_string(),
                    status: 404,
                    body: r#"{"cod":"404","message":"city not found"}"#.to_string(),
                }),
            }
        }
    }

    fn three_cities() -> StubSource {
        StubSource::default()
            .with("Philadelphia", (44.6, 40.1, 58, "clear sky"))
            .with("Seattle", (48.2, 46.9, 87, "light rain"))
            .with("New York", (42.3, 37.0, 61, "broken clouds"))
    }

    #[test]
    fn parse_city_list_trims_and_drops_blanks() {
        assert_eq!(
            parse_city_list("Philadelphia, Seattle ,, New York ,"),
            vec!["Philadelphia", "Seattle", "New York"]
        );
        assert!(parse_city_list(" , ").is_empty());
    }

    #[tokio::test]
    async fn failed_city_is_omitted() {
        let source = StubSource::default().with("CityA", (70.0, 71.5, 40, "few clouds"));

        let rows = fetch_many(&source, ["CityA", "CityB"]).await;

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].city, "CityA");
        assert_eq!(rows[0].temperature, 70.0);
        assert_eq!(rows[0].feels_like, 71.5);
        assert_eq!(rows[0].humidity, 40);
        assert_eq!(rows[0].conditions, "few clouds");
    }

    #[tokio::test]
    async fn empty_input_yields_empty_result() {
        let source = three_cities();
        let rows = fetch_many(&source, Vec::<String>::new()).await;

        assert!(rows.is_empty());
        assert!(source.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn all_failures_yield_empty_batch_with_reasons() {
        let source = StubSource::default();
        let batch = fetch_batch(&source, ["Atlantis", "El Dorado"]).await;

        assert!(batch.is_empty());
        let failed: Vec<_> = batch.failures.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(failed, vec!["Atlantis", "El Dorado"]);
    }

    #[tokio::test]
    async fn cities_are_trimmed_and_blanks_skipped() {
        let source = three_cities();
        let rows = fetch_many(&source, ["  Seattle ", "   "]).await;

        assert_eq!(rows.len(), 1);
        assert_eq!(*source.calls.lock(), vec!["Seattle".to_string()]);
    }

    #[tokio::test]
    async fn three_cities_fetch_and_archive_in_order() {
        let source = three_cities();
        let writer = ArchiveWriter::new(MemoryStore::with_container("weather-archive"));

        let batch = fetch_batch(&source, ["Philadelphia", "Seattle", "New York"]).await;
        let cities: Vec<_> = batch.rows.iter().map(|r| r.city.as_str()).collect();
        assert_eq!(cities, vec!["Philadelphia", "Seattle", "New York"]);

        let summary = archive_batch(&writer, &batch.observations).await;
        assert!(summary.failures.is_empty());
        assert_eq!(summary.written.len(), 3);
        assert_eq!(writer.store().keys().len(), 3);
        assert_eq!(writer.store().put_count(), 3);
    }

    #[tokio::test]
    async fn rows_carry_per_city_fetch_time() {
        let source = three_cities().delayed(Duration::from_millis(30));

        let started = Utc::now();
        let batch = fetch_batch(&source, ["Philadelphia", "Seattle"]).await;
        let finished = Utc::now();
        tokio::time::sleep(Duration::from_millis(30)).await;

        let rows = &batch.rows;
        assert_eq!(rows.len(), 2);
        assert!(rows[0].fetched_at > started);
        assert!(rows[0].fetched_at < rows[1].fetched_at);
        assert!(rows[1].fetched_at <= finished);
    }

    #[tokio::test]
    async fn archive_failures_do_not_stop_batch() {
        let source = three_cities();
        let writer = ArchiveWriter::new(MemoryStore::new("never-created"));

        let batch = fetch_batch(&source, ["Philadelphia", "Seattle"]).await;
        let summary = archive_batch(&writer, &batch.observations).await;

        assert!(summary.written.is_empty());
        assert_eq!(summary.failures.len(), 2);
    }
}
