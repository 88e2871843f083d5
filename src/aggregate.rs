//! Aggregation facade
//!
//! The single entry point callers use to obtain a consistent snapshot of
//! storms, earthquakes, and low pressure areas. All three branches run
//! concurrently and each absorbs its own failures, so `load_all` always
//! resolves with whatever partial data succeeded.

use chrono::Utc;
use futures::future::join_all;
use tracing::debug;

use crate::config::AppConfig;
use crate::data::{LowPressureArea, QuakeClient, Snapshot, StormsClient, WeatherClient};

/// Default magnitude floor for the earthquake feed
const DEFAULT_MIN_MAGNITUDE: f64 = 4.5;

/// Default maximum number of earthquakes in a snapshot
const DEFAULT_QUAKE_LIMIT: usize = 50;

/// Standard sea-level pressure in hPa; readings below it indicate a low
const STANDARD_PRESSURE_HPA: f64 = 1013.0;

/// Divisor turning a pressure deficit in hPa into a [0, 1] intensity
const PRESSURE_DEFICIT_SCALE: f64 = 20.0;

/// Intensity floor applied to any live pressure reading below standard
const MIN_ENRICHED_INTENSITY: f64 = 0.3;

/// Fixed low-pressure seed points watched on every refresh, as
/// (lat, lon, static intensity): east of Mindanao, the open Philippine Sea,
/// and northeast of Luzon.
const LPA_SEEDS: [(f64, f64, f64); 3] = [
    (8.5, 130.5, 0.4),
    (13.0, 138.0, 0.5),
    (19.5, 127.0, 0.35),
];

/// Facade composing the storm chain, the earthquake feed, and the weather
/// adapter into one fetch cycle
pub struct Aggregator {
    storms: StormsClient,
    quakes: QuakeClient,
    weather: WeatherClient,
    min_magnitude: f64,
    quake_limit: usize,
}

impl Aggregator {
    /// Creates an Aggregator with the default clients and the credentials
    /// from `config`
    pub fn new(config: &AppConfig) -> Self {
        Self {
            storms: StormsClient::new(),
            quakes: QuakeClient::new(),
            weather: WeatherClient::new(
                config.openweather_api_key.clone(),
                config.weatherapi_key.clone(),
            ),
            min_magnitude: DEFAULT_MIN_MAGNITUDE,
            quake_limit: DEFAULT_QUAKE_LIMIT,
        }
    }

    /// Overrides the earthquake magnitude floor and result limit
    pub fn with_quake_filter(mut self, min_magnitude: f64, limit: usize) -> Self {
        self.min_magnitude = min_magnitude;
        self.quake_limit = limit;
        self
    }

    /// Creates an Aggregator from pre-built clients (for testing)
    #[cfg(test)]
    pub fn with_clients(storms: StormsClient, quakes: QuakeClient, weather: WeatherClient) -> Self {
        Self {
            storms,
            quakes,
            weather,
            min_magnitude: DEFAULT_MIN_MAGNITUDE,
            quake_limit: DEFAULT_QUAKE_LIMIT,
        }
    }

    /// Fetches all data kinds concurrently and assembles a snapshot.
    ///
    /// Never fails: each branch already resolves to its own safe default, so
    /// total latency is bounded by the slowest branch and the caller can rely
    /// on always getting a snapshot back.
    pub async fn load_all(&self) -> Snapshot {
        let (storms, quakes, low_pressure_areas) = tokio::join!(
            self.storms.fetch_storms(),
            self.quakes.fetch_quakes(self.min_magnitude, self.quake_limit),
            self.low_pressure_areas(),
        );

        debug!(
            storms = storms.len(),
            quakes = quakes.len(),
            low_pressure_areas = low_pressure_areas.len(),
            "snapshot assembled"
        );

        Snapshot {
            storms,
            quakes,
            low_pressure_areas,
            fetched_at: Utc::now(),
        }
    }

    /// Builds the low pressure areas, enriching each seed with live weather
    /// when a credential is available. A failed lookup keeps that seed's
    /// static intensity; one bad point never affects its siblings.
    async fn low_pressure_areas(&self) -> Vec<LowPressureArea> {
        if !self.weather.has_credential() {
            return LPA_SEEDS
                .iter()
                .map(|&(lat, lon, intensity)| LowPressureArea {
                    lat,
                    lon,
                    intensity,
                    weather: None,
                })
                .collect();
        }

        let lookups = LPA_SEEDS
            .iter()
            .map(|&(lat, lon, _)| self.weather.fetch_current(lat, lon));
        let readings = join_all(lookups).await;

        LPA_SEEDS
            .iter()
            .zip(readings)
            .map(|(&(lat, lon, seed_intensity), weather)| {
                let intensity = weather
                    .as_ref()
                    .map(|w| w.pressure)
                    .filter(|&pressure| pressure < STANDARD_PRESSURE_HPA)
                    .map(|pressure| enriched_intensity(pressure))
                    .unwrap_or(seed_intensity);

                LowPressureArea {
                    lat,
                    lon,
                    intensity,
                    weather,
                }
            })
            .collect()
    }
}

/// Intensity from a live pressure reading below standard pressure
fn enriched_intensity(pressure_hpa: f64) -> f64 {
    ((STANDARD_PRESSURE_HPA - pressure_hpa) / PRESSURE_DEFICIT_SCALE)
        .max(MIN_ENRICHED_INTENSITY)
        .min(1.0)
}
