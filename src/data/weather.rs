//! Weather provider adapter
//!
//! Fetches current conditions and short-range forecasts for a coordinate.
//! OpenWeather is the primary provider; WeatherAPI serves as a secondary
//! current-conditions source when only its key is configured. A missing
//! credential is a normal state: the adapter answers `None` without touching
//! the network, and any fetch failure is logged and swallowed the same way.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::{ForecastEntry, Weather};

/// Base URL for the OpenWeather API
const OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Base URL for the WeatherAPI secondary provider
const WEATHERAPI_BASE_URL: &str = "https://api.weatherapi.com/v1";

/// Per-request deadline
const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// Maximum number of forecast entries returned
const FORECAST_LIMIT: usize = 5;

/// Conversion factor from m/s to km/h
const MS_TO_KMH: f64 = 3.6;

/// Errors that can occur when fetching weather data
#[derive(Debug, Error)]
pub enum WeatherError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("provider returned HTTP {0}")]
    BadStatus(u16),

    /// The request did not complete within the deadline
    #[error("request timed out")]
    TimedOut,
}

/// Client for per-coordinate weather lookups
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    api_key: Option<String>,
    secondary_key: Option<String>,
    base_url: String,
    secondary_base_url: String,
}

impl WeatherClient {
    /// Creates a new WeatherClient with the configured credentials.
    ///
    /// Either key may be absent; each absence silently disables the
    /// corresponding provider.
    pub fn new(api_key: Option<String>, secondary_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            secondary_key,
            base_url: OPENWEATHER_BASE_URL.to_string(),
            secondary_base_url: WEATHERAPI_BASE_URL.to_string(),
        }
    }

    /// Creates a new WeatherClient with custom base URLs (for testing)
    #[cfg(test)]
    pub fn with_base_urls(
        api_key: Option<String>,
        secondary_key: Option<String>,
        base_url: String,
        secondary_base_url: String,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key,
            secondary_key,
            base_url,
            secondary_base_url,
        }
    }

    /// Whether any provider credential is configured
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some() || self.secondary_key.is_some()
    }

    /// Fetches current conditions at a coordinate.
    ///
    /// Returns `None` without a network call when no credential is
    /// configured, and on any fetch failure or timeout.
    pub async fn fetch_current(&self, lat: f64, lon: f64) -> Option<Weather> {
        if let Some(key) = self.api_key.clone() {
            return match self.fetch_openweather_current(&key, lat, lon).await {
                Ok(weather) => Some(weather),
                Err(e) => {
                    warn!("current weather fetch failed: {e}");
                    None
                }
            };
        }

        if let Some(key) = self.secondary_key.clone() {
            return match self.fetch_weatherapi_current(&key, lat, lon).await {
                Ok(weather) => Some(weather),
                Err(e) => {
                    warn!("secondary weather fetch failed: {e}");
                    None
                }
            };
        }

        debug!("no weather credential configured, skipping current weather");
        None
    }

    /// Fetches up to five forecast steps for a coordinate.
    ///
    /// Same failure policy as [`fetch_current`](Self::fetch_current);
    /// forecasts come from the primary provider only.
    pub async fn fetch_forecast(&self, lat: f64, lon: f64) -> Option<Vec<ForecastEntry>> {
        let key = match &self.api_key {
            Some(key) => key.clone(),
            None => {
                debug!("no weather credential configured, skipping forecast");
                return None;
            }
        };

        match self.fetch_openweather_forecast(&key, lat, lon).await {
            Ok(forecast) => Some(forecast),
            Err(e) => {
                warn!("forecast fetch failed: {e}");
                None
            }
        }
    }

    async fn fetch_openweather_current(
        &self,
        key: &str,
        lat: f64,
        lon: f64,
    ) -> Result<Weather, WeatherError> {
        let url = format!(
            "{}/weather?lat={}&lon={}&appid={}&units=metric",
            self.base_url, lat, lon, key
        );

        let response: OwmCurrentResponse = self.get_json(&url).await?;
        Ok(owm_current_to_weather(response))
    }

    async fn fetch_openweather_forecast(
        &self,
        key: &str,
        lat: f64,
        lon: f64,
    ) -> Result<Vec<ForecastEntry>, WeatherError> {
        let url = format!(
            "{}/forecast?lat={}&lon={}&appid={}&units=metric",
            self.base_url, lat, lon, key
        );

        let response: OwmForecastResponse = self.get_json(&url).await?;
        Ok(owm_forecast_entries(response))
    }

    async fn fetch_weatherapi_current(
        &self,
        key: &str,
        lat: f64,
        lon: f64,
    ) -> Result<Weather, WeatherError> {
        let url = format!(
            "{}/current.json?key={}&q={},{}",
            self.secondary_base_url, key, lat, lon
        );

        let response: WapiCurrentResponse = self.get_json(&url).await?;
        Ok(wapi_current_to_weather(response))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, WeatherError> {
        let response = timeout(REQUEST_TIMEOUT, self.client.get(url).send())
            .await
            .map_err(|_| WeatherError::TimedOut)??;

        if !response.status().is_success() {
            return Err(WeatherError::BadStatus(response.status().as_u16()));
        }

        Ok(response.json().await?)
    }
}

/// Compass label for a wind direction in degrees from north
pub fn wind_direction_label(degrees: u16) -> &'static str {
    const DIRECTIONS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
    let normalized = f64::from(degrees % 360);
    let index = ((normalized / 45.0).round() as usize) % 8;
    DIRECTIONS[index]
}

/// Rounds to one decimal place
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// OpenWeather response shapes (current weather endpoint, units=metric)

#[derive(Debug, Deserialize)]
struct OwmCurrentResponse {
    main: OwmMain,
    #[serde(default)]
    wind: Option<OwmWind>,
    #[serde(default)]
    weather: Vec<OwmCondition>,
    #[serde(default)]
    visibility: Option<f64>,
    #[serde(default)]
    clouds: Option<OwmClouds>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    sys: Option<OwmSys>,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    feels_like: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    #[serde(default)]
    speed: Option<f64>,
    #[serde(default)]
    deg: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwmClouds {
    #[serde(default)]
    all: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwmSys {
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwmForecastResponse {
    #[serde(default)]
    list: Vec<OwmForecastStep>,
}

#[derive(Debug, Deserialize)]
struct OwmForecastStep {
    /// Forecast time in seconds since the epoch
    dt: i64,
    main: OwmForecastMain,
    #[serde(default)]
    weather: Vec<OwmCondition>,
    #[serde(default)]
    wind: Option<OwmWind>,
}

#[derive(Debug, Deserialize)]
struct OwmForecastMain {
    temp: f64,
    humidity: f64,
}

// WeatherAPI response shapes (current.json endpoint)

#[derive(Debug, Deserialize)]
struct WapiCurrentResponse {
    #[serde(default)]
    location: Option<WapiLocation>,
    current: WapiCurrent,
}

#[derive(Debug, Deserialize)]
struct WapiLocation {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WapiCurrent {
    temp_c: f64,
    feelslike_c: f64,
    humidity: f64,
    pressure_mb: f64,
    /// Already km/h
    wind_kph: f64,
    #[serde(default)]
    wind_degree: Option<f64>,
    #[serde(default)]
    condition: Option<WapiCondition>,
    #[serde(default)]
    vis_km: Option<f64>,
    #[serde(default)]
    cloud: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WapiCondition {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    icon: Option<String>,
}

fn owm_current_to_weather(response: OwmCurrentResponse) -> Weather {
    let wind_speed_ms = response.wind.as_ref().and_then(|w| w.speed).unwrap_or(0.0);
    let wind_deg = response.wind.as_ref().and_then(|w| w.deg).unwrap_or(0.0);
    let condition = response.weather.first();

    Weather {
        temperature: response.main.temp.round(),
        feels_like: response.main.feels_like.round(),
        humidity: response.main.humidity.clamp(0.0, 100.0) as u8,
        pressure: response.main.pressure,
        wind_speed_kmh: round1(wind_speed_ms * MS_TO_KMH),
        wind_direction_deg: (wind_deg.rem_euclid(360.0)) as u16,
        description: condition
            .and_then(|c| c.description.clone())
            .unwrap_or_default(),
        icon: condition.and_then(|c| c.icon.clone()).unwrap_or_default(),
        visibility_km: response.visibility.map(|meters| round1(meters / 1000.0)),
        cloudiness: response
            .clouds
            .and_then(|c| c.all)
            .unwrap_or(0.0)
            .clamp(0.0, 100.0) as u8,
        city: response.name.unwrap_or_default(),
        country: response
            .sys
            .and_then(|s| s.country)
            .unwrap_or_default(),
    }
}

fn owm_forecast_entries(response: OwmForecastResponse) -> Vec<ForecastEntry> {
    response
        .list
        .into_iter()
        .take(FORECAST_LIMIT)
        .map(|step| {
            let wind_speed_ms = step.wind.as_ref().and_then(|w| w.speed).unwrap_or(0.0);
            let condition = step.weather.first();
            ForecastEntry {
                timestamp_ms: step.dt * 1000,
                temperature: step.main.temp,
                description: condition
                    .and_then(|c| c.description.clone())
                    .unwrap_or_default(),
                icon: condition.and_then(|c| c.icon.clone()).unwrap_or_default(),
                wind_speed_kmh: round1(wind_speed_ms * MS_TO_KMH),
                humidity: step.main.humidity.clamp(0.0, 100.0) as u8,
            }
        })
        .collect()
}

fn wapi_current_to_weather(response: WapiCurrentResponse) -> Weather {
    let condition = response.current.condition.as_ref();

    Weather {
        temperature: response.current.temp_c.round(),
        feels_like: response.current.feelslike_c.round(),
        humidity: response.current.humidity.clamp(0.0, 100.0) as u8,
        pressure: response.current.pressure_mb,
        wind_speed_kmh: round1(response.current.wind_kph),
        wind_direction_deg: response
            .current
            .wind_degree
            .unwrap_or(0.0)
            .rem_euclid(360.0) as u16,
        description: condition.and_then(|c| c.text.clone()).unwrap_or_default(),
        icon: condition.and_then(|c| c.icon.clone()).unwrap_or_default(),
        visibility_km: response.current.vis_km.map(round1),
        cloudiness: response
            .current
            .cloud
            .unwrap_or(0.0)
            .clamp(0.0, 100.0) as u8,
        city: response
            .location
            .as_ref()
            .and_then(|l| l.name.clone())
            .unwrap_or_default(),
        country: response
            .location
            .as_ref()
            .and_then(|l| l.country.clone())
            .unwrap_or_default(),
    }
}
