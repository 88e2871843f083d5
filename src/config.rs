//! Environment-backed configuration
//!
//! Both credentials are optional: a missing key is a normal state that
//! silently disables the provider it gates rather than erroring.

use std::env;

/// Credentials read once at startup
#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    /// OpenWeather API key; enables weather snapshots and forecasts
    pub openweather_api_key: Option<String>,
    /// WeatherAPI key; secondary current-weather provider
    pub weatherapi_key: Option<String>,
}

impl AppConfig {
    /// Loads configuration from the environment, honoring a `.env` file when
    /// one is present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            openweather_api_key: non_empty(env::var("OPENWEATHER_API_KEY").ok()),
            weatherapi_key: non_empty(env::var("WEATHERAPI_KEY").ok()),
        }
    }
}

/// Treats unset, empty, and whitespace-only values the same way.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
