//! Canonical data models for Bagyo
//!
//! This module contains the normalized types every upstream source is parsed
//! into: storms, earthquakes, low pressure areas, and weather snapshots.
//! Instances are rebuilt from scratch on every fetch cycle and never mutated
//! afterwards.

pub mod quakes;
pub mod storms;
pub mod weather;

pub use quakes::{QuakeClient, QuakesError};
pub use storms::{StormsClient, StormsError};
pub use weather::{WeatherClient, WeatherError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Trailing window applied to storm tracks and earthquake events
pub const TRAILING_WINDOW_MS: i64 = 7 * 24 * 3_600_000;

/// A tropical cyclone normalized from any of the tracking feeds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Storm {
    /// Stable identifier; synthesized when the source carries none
    pub id: String,
    /// International designation from the source
    pub international_name: String,
    /// PAGASA name when the storm is mapped in the static table
    pub local_name: Option<String>,
    /// Most recent known position and strength
    pub current: StormPosition,
    /// Historical track, ascending by timestamp, trailing 7 days only
    pub path: Vec<TrackPoint>,
    /// Whether the current position is inside the PAR bounding box
    pub in_par: bool,
    /// Presentation label: "Local (International)" inside the PAR, else the
    /// international name
    pub display_name: String,
    /// Distance from the current position to the PAR boundary; zero inside
    pub distance_to_par_km: f64,
    /// Whether the storm is within the approach threshold of the PAR
    pub approaching: bool,
}

/// Current position and strength of a storm
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StormPosition {
    pub lat: f64,
    pub lon: f64,
    /// Category on the 0-5 scale
    pub intensity: u8,
    /// Maximum sustained winds in km/h
    pub wind_speed_kmh: f64,
}

/// One historical point of a storm track
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrackPoint {
    pub lat: f64,
    pub lon: f64,
    /// Category on the 0-5 scale
    pub intensity: u8,
    /// Observation time in milliseconds since the epoch
    pub timestamp_ms: i64,
}

/// An earthquake event normalized from the USGS feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quake {
    /// Upstream event id, or a synthesized one
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub magnitude: f64,
    /// Depth in whole kilometers, always non-negative
    pub depth_km: f64,
    /// Human-readable place label with the distance prefix stripped
    pub location: String,
    /// Event time in milliseconds since the epoch
    pub time_ms: i64,
}

/// A monitored low pressure area, optionally enriched with live weather
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LowPressureArea {
    pub lat: f64,
    pub lon: f64,
    /// Relative strength in [0, 1]; recomputed from the pressure deficit
    /// when a live reading below standard pressure is available
    pub intensity: f64,
    /// Live weather at the point, when a credential is configured and the
    /// lookup succeeded
    pub weather: Option<Weather>,
}

/// Current weather conditions at a coordinate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Weather {
    /// Temperature in Celsius, rounded to the nearest degree
    pub temperature: f64,
    /// Feels-like temperature in Celsius, rounded to the nearest degree
    pub feels_like: f64,
    /// Relative humidity percentage (0-100)
    pub humidity: u8,
    /// Sea-level pressure in hPa
    pub pressure: f64,
    /// Wind speed in km/h, one decimal
    pub wind_speed_kmh: f64,
    /// Wind direction in degrees from north
    pub wind_direction_deg: u16,
    /// Provider condition description
    pub description: String,
    /// Provider icon code
    pub icon: String,
    /// Visibility in km, one decimal, when reported
    pub visibility_km: Option<f64>,
    /// Cloud cover percentage (0-100)
    pub cloudiness: u8,
    /// Nearest named place
    pub city: String,
    /// ISO country code of the place
    pub country: String,
}

/// One step of a short-range forecast series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastEntry {
    /// Forecast time in milliseconds since the epoch
    pub timestamp_ms: i64,
    /// Temperature in Celsius
    pub temperature: f64,
    pub description: String,
    pub icon: String,
    /// Wind speed in km/h, one decimal
    pub wind_speed_kmh: f64,
    /// Relative humidity percentage (0-100)
    pub humidity: u8,
}

/// The aggregated result of one full fetch cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub storms: Vec<Storm>,
    pub quakes: Vec<Quake>,
    pub low_pressure_areas: Vec<LowPressureArea>,
    /// When this snapshot was assembled
    pub fetched_at: DateTime<Utc>,
}
