//! Typhoon source chain and parsers
//!
//! Storm data comes from an ordered chain of public tracking feeds with
//! mutually incompatible JSON shapes. Each source has its own parser built on
//! shared tolerant decoding helpers; every parser is total and yields
//! best-effort records, never errors. The chain takes the first source that
//! produces at least one storm and falls through on timeout, bad status,
//! network error, or an empty parse. Exhaustion is a valid steady state: no
//! active storms is an empty list, never sample data.

use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::{Storm, StormPosition, TrackPoint, TRAILING_WINDOW_MS};
use crate::geo;
use crate::names;

/// Per-source deadline
const SOURCE_TIMEOUT: Duration = Duration::from_secs(9);

/// Storms closer than this to the PAR boundary count as approaching
const APPROACH_THRESHOLD_KM: f64 = 2000.0;

/// Conversion factor from knots to km/h
const KNOTS_TO_KMH: f64 = 1.852;

/// Top-level keys probed, in priority order, for the storm array
const STORM_ARRAY_KEYS: [&str; 6] = [
    "storms",
    "activeStorms",
    "active",
    "data",
    "events",
    "features",
];

/// Keys that may hold a nested current-position value
const POSITION_KEYS: [&str; 4] = ["currentPosition", "position", "center", "current"];

/// Alternate spellings for the latitude of a point
const LAT_KEYS: [&str; 3] = ["lat", "latitude", "latitudeNumeric"];

/// Alternate spellings for the longitude of a point
const LON_KEYS: [&str; 4] = ["lon", "lng", "longitude", "longitudeNumeric"];

/// Keys that may hold the historical track array
const TRACK_KEYS: [&str; 3] = ["path", "track", "forecast"];

/// The wire format a source speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// NHC active-storms shape: positional string/numeric fields, winds in
    /// knots
    Nhc,
    /// GDACS event-list shape: geo-features with a properties record
    Gdacs,
    /// Generic community shape: plain records, positions as objects or
    /// [lat, lon] pairs
    Generic,
}

/// One upstream provider in the chain
#[derive(Debug, Clone)]
pub struct StormSource {
    /// Short tag used in ids and diagnostics
    pub tag: &'static str,
    pub url: String,
    pub format: SourceFormat,
}

/// The fixed source chain, most authoritative first.
pub fn default_sources() -> Vec<StormSource> {
    vec![
        StormSource {
            tag: "nhc",
            url: "https://www.nhc.noaa.gov/CurrentStorms.json".to_string(),
            format: SourceFormat::Nhc,
        },
        StormSource {
            tag: "gdacs",
            url: "https://www.gdacs.org/gdacsapi/api/events/geteventlist/EVENTS4APP".to_string(),
            format: SourceFormat::Gdacs,
        },
        StormSource {
            tag: "jma",
            url: "https://www.jma.go.jp/bosai/typhoon/data/targetTc.json".to_string(),
            format: SourceFormat::Generic,
        },
    ]
}

/// Errors that can occur for a single source attempt
#[derive(Debug, Error)]
pub enum StormsError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Source answered with a non-success status
    #[error("source returned HTTP {0}")]
    BadStatus(u16),

    /// The request did not complete within the deadline
    #[error("request timed out")]
    TimedOut,

    /// The payload parsed but contained no storms
    #[error("source yielded no storms")]
    Empty,
}

/// Client executing the storm source chain
#[derive(Debug, Clone)]
pub struct StormsClient {
    client: Client,
    sources: Vec<StormSource>,
}

impl StormsClient {
    /// Creates a new StormsClient over the default source chain
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            sources: default_sources(),
        }
    }

    /// Creates a new StormsClient with a custom source chain (for testing)
    #[cfg(test)]
    pub fn with_sources(sources: Vec<StormSource>) -> Self {
        Self {
            client: Client::new(),
            sources,
        }
    }

    /// Fetches active storms from the first source in the chain that yields
    /// at least one.
    ///
    /// Never fails: a fully exhausted chain resolves to an empty list, which
    /// is the normal answer when no storms are active.
    pub async fn fetch_storms(&self) -> Vec<Storm> {
        let now_ms = Utc::now().timestamp_millis();

        for source in &self.sources {
            match self.try_source(source, now_ms).await {
                Ok(storms) => {
                    debug!(source = source.tag, count = storms.len(), "storm source succeeded");
                    return storms;
                }
                Err(e) => {
                    warn!(source = source.tag, "storm source failed: {e}");
                }
            }
        }

        debug!("all storm sources exhausted; no active storms");
        Vec::new()
    }

    async fn try_source(
        &self,
        source: &StormSource,
        now_ms: i64,
    ) -> Result<Vec<Storm>, StormsError> {
        debug!(source = source.tag, url = %source.url, "fetching storm source");

        let response = timeout(SOURCE_TIMEOUT, self.client.get(&source.url).send())
            .await
            .map_err(|_| StormsError::TimedOut)??;

        if !response.status().is_success() {
            return Err(StormsError::BadStatus(response.status().as_u16()));
        }

        let payload: Value = response.json().await?;
        let storms = parse_source(source.format, source.tag, &payload, now_ms);
        if storms.is_empty() {
            return Err(StormsError::Empty);
        }
        Ok(storms)
    }
}

impl Default for StormsClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Dispatches a raw payload to the parser matching the source format
pub fn parse_source(format: SourceFormat, tag: &str, payload: &Value, now_ms: i64) -> Vec<Storm> {
    match format {
        SourceFormat::Nhc => parse_nhc(payload, now_ms),
        SourceFormat::Gdacs => parse_gdacs(payload, now_ms),
        SourceFormat::Generic => parse_generic(tag, payload, now_ms),
    }
}

/// Intermediate record shared by all parsers before canonical annotation
struct RawStorm {
    id: Option<String>,
    name: String,
    lat: f64,
    lon: f64,
    intensity: u8,
    wind_speed_kmh: f64,
    track: Vec<TrackPoint>,
}

/// NHC active-storms parser. Winds arrive in knots; there is no historical
/// track in this feed, so one is synthesized.
fn parse_nhc(payload: &Value, now_ms: i64) -> Vec<Storm> {
    storm_array(payload)
        .iter()
        .enumerate()
        .filter_map(|(index, raw)| {
            let name = field_string(raw, &["name", "stormName"])?;
            let (lat, lon) = current_position(raw)?;
            let wind_kt = field_f64(raw, &["intensity", "maxSustainedWind"])
                .unwrap_or(0.0)
                .max(0.0);
            let wind_speed_kmh = ((wind_kt * KNOTS_TO_KMH) * 10.0).round() / 10.0;
            let track = parsed_track(raw);

            Some(finish_storm(
                "nhc",
                index,
                RawStorm {
                    id: field_string(raw, &["id", "binNumber"]),
                    name,
                    lat,
                    lon,
                    intensity: category_from_wind_kmh(wind_speed_kmh),
                    wind_speed_kmh,
                    track,
                },
                now_ms,
            ))
        })
        .collect()
}

/// GDACS event-list parser. Records are geo-features whose fields live in a
/// properties object; non-cyclone events are skipped.
fn parse_gdacs(payload: &Value, now_ms: i64) -> Vec<Storm> {
    storm_array(payload)
        .iter()
        .enumerate()
        .filter_map(|(index, raw)| {
            let record = raw.get("properties").unwrap_or(raw);

            if let Some(event_type) = field_string(record, &["eventtype", "eventType"]) {
                if !event_type.eq_ignore_ascii_case("TC") {
                    return None;
                }
            }

            let name = field_string(record, &["eventname", "name"])?;
            let (lat, lon) = current_position(record).or_else(|| geometry_point(raw))?;
            let wind_speed_kmh = field_f64(record, &["windSpeedKmh", "wind_kmh", "maxwind"])
                .unwrap_or(0.0)
                .max(0.0);
            let intensity = field_f64(record, &["severity", "intensity"])
                .map(|s| s.max(0.0).min(5.0) as u8)
                .unwrap_or_else(|| category_from_wind_kmh(wind_speed_kmh));

            Some(finish_storm(
                "gdacs",
                index,
                RawStorm {
                    id: field_string(record, &["eventid", "id"]),
                    name,
                    lat,
                    lon,
                    intensity,
                    wind_speed_kmh,
                    track: parsed_track(record),
                },
                now_ms,
            ))
        })
        .collect()
}

/// Generic tracking-feed parser: plain records under any of the known array
/// keys, positions as `{lat, lon}` objects or `[lat, lon]` pairs.
fn parse_generic(tag: &str, payload: &Value, now_ms: i64) -> Vec<Storm> {
    storm_array(payload)
        .iter()
        .enumerate()
        .filter_map(|(index, raw)| {
            let name = field_string(raw, &["name", "stormName", "tcName", "internationalName"])?;
            let (lat, lon) = current_position(raw)?;
            let intensity = field_f64(raw, &["intensity", "category", "cat"])
                .unwrap_or(0.0)
                .max(0.0)
                .min(5.0) as u8;
            let wind_speed_kmh = field_f64(raw, &["windSpeedKmh", "wind_kmh", "windKph", "maxWindKmh"])
                .unwrap_or(0.0)
                .max(0.0);

            Some(finish_storm(
                tag,
                index,
                RawStorm {
                    id: field_string(raw, &["id", "stormId"]),
                    name,
                    lat,
                    lon,
                    intensity,
                    wind_speed_kmh,
                    track: parsed_track(raw),
                },
                now_ms,
            ))
        })
        .collect()
}

/// Turns a raw record into a canonical Storm: windowed and ordered track,
/// PAR annotation, name resolution, id synthesis.
fn finish_storm(tag: &str, index: usize, raw: RawStorm, now_ms: i64) -> Storm {
    let cutoff = now_ms - TRAILING_WINDOW_MS;

    let mut path: Vec<TrackPoint> = if raw.track.is_empty() {
        // No track data at all: substitute a plausible placeholder track
        synthetic_track(raw.lat, raw.lon, raw.intensity, now_ms)
    } else {
        raw.track
            .into_iter()
            .filter(|point| point.timestamp_ms >= cutoff)
            .collect()
    };
    path.sort_by_key(|point| point.timestamp_ms);

    let last_matches_current = path
        .last()
        .map(|point| (point.lat - raw.lat).abs() < 1e-6 && (point.lon - raw.lon).abs() < 1e-6)
        .unwrap_or(false);
    if !last_matches_current {
        path.push(TrackPoint {
            lat: raw.lat,
            lon: raw.lon,
            intensity: raw.intensity,
            timestamp_ms: now_ms,
        });
    }

    let in_par = geo::is_in_par(raw.lat, raw.lon);
    let distance_to_par_km = geo::distance_to_par_km(raw.lat, raw.lon);
    let local_name = names::local_name(&raw.name).map(str::to_string);
    let display_name = names::display_name(&raw.name, raw.lat, raw.lon);

    Storm {
        id: raw
            .id
            .unwrap_or_else(|| format!("{tag}-{index}-{now_ms}")),
        international_name: raw.name,
        local_name,
        current: StormPosition {
            lat: raw.lat,
            lon: raw.lon,
            intensity: raw.intensity,
            wind_speed_kmh: raw.wind_speed_kmh,
        },
        path,
        in_par,
        display_name,
        distance_to_par_km,
        approaching: distance_to_par_km < APPROACH_THRESHOLD_KM,
    }
}

/// Placeholder track: seven daily points converging linearly on the current
/// position from the east-southeast, weakening toward the present category.
fn synthetic_track(lat: f64, lon: f64, intensity: u8, now_ms: i64) -> Vec<TrackPoint> {
    const DAY_MS: i64 = 24 * 3_600_000;

    (0..7)
        .map(|i| {
            let steps_back = 6 - i;
            TrackPoint {
                lat: lat - f64::from(steps_back),
                lon: lon + f64::from(steps_back) * 1.5,
                intensity: (i64::from(intensity) + i64::from(steps_back)).clamp(0, 5) as u8,
                timestamp_ms: now_ms - i64::from(steps_back) * DAY_MS,
            }
        })
        .collect()
}

/// Category on the 0-5 scale from sustained winds in km/h
fn category_from_wind_kmh(wind_kmh: f64) -> u8 {
    if wind_kmh >= 252.0 {
        5
    } else if wind_kmh >= 209.0 {
        4
    } else if wind_kmh >= 178.0 {
        3
    } else if wind_kmh >= 154.0 {
        2
    } else if wind_kmh >= 119.0 {
        1
    } else {
        0
    }
}

/// Locates the storm array in a payload: array at the root, one of the known
/// top-level keys, or the object's values as a last resort.
fn storm_array(payload: &Value) -> Vec<Value> {
    if let Some(array) = payload.as_array() {
        return array.clone();
    }

    for key in STORM_ARRAY_KEYS {
        if let Some(array) = payload.get(key).and_then(Value::as_array) {
            return array.clone();
        }
    }

    if let Some(map) = payload.as_object() {
        let values: Vec<Value> = map.values().filter(|v| v.is_object()).cloned().collect();
        if !values.is_empty() {
            return values;
        }
    }

    Vec::new()
}

/// First value found under any of the given keys
fn field<'a>(raw: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| raw.get(key))
}

/// Numeric field tolerating numbers and numeric strings
fn field_f64(raw: &Value, keys: &[&str]) -> Option<f64> {
    field(raw, keys).and_then(numeric_value)
}

/// String field tolerating strings and numbers; empty strings count as absent
fn field_string(raw: &Value, keys: &[&str]) -> Option<String> {
    let value = field(raw, keys)?;
    if let Some(s) = value.as_str() {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        return Some(s.to_string());
    }
    if value.is_number() {
        return Some(value.to_string());
    }
    None
}

fn numeric_value(value: &Value) -> Option<f64> {
    if let Some(n) = value.as_f64() {
        return Some(n);
    }
    value.as_str()?.trim().parse().ok()
}

/// Coordinate value tolerating numbers, numeric strings, and strings with a
/// trailing hemisphere letter ("22.0N", "97.5W")
fn coordinate_value(value: &Value) -> Option<f64> {
    if let Some(n) = value.as_f64() {
        return Some(n);
    }
    let s = value.as_str()?.trim();
    if let Ok(n) = s.parse::<f64>() {
        return Some(n);
    }
    let hemisphere = s.chars().last()?;
    let number: f64 = s[..s.len() - hemisphere.len_utf8()].trim().parse().ok()?;
    match hemisphere {
        'N' | 'n' | 'E' | 'e' => Some(number),
        'S' | 's' | 'W' | 'w' => Some(-number),
        _ => None,
    }
}

/// A point from either a `{lat, lon}`-style object or a `[lat, lon]` pair
fn point_from(value: &Value) -> Option<(f64, f64)> {
    if let Some(array) = value.as_array() {
        if array.len() >= 2 {
            let lat = coordinate_value(&array[0])?;
            let lon = coordinate_value(&array[1])?;
            return Some((lat, lon));
        }
        return None;
    }

    let lat = LAT_KEYS
        .iter()
        .find_map(|key| value.get(key))
        .and_then(coordinate_value)?;
    let lon = LON_KEYS
        .iter()
        .find_map(|key| value.get(key))
        .and_then(coordinate_value)?;
    Some((lat, lon))
}

/// Current position from a nested position value or flat fields on the record
fn current_position(raw: &Value) -> Option<(f64, f64)> {
    for key in POSITION_KEYS {
        if let Some(value) = raw.get(key) {
            if let Some(point) = point_from(value) {
                return Some(point);
            }
        }
    }
    point_from(raw)
}

/// GeoJSON-style `geometry.coordinates` point; note the [lon, lat] order
fn geometry_point(raw: &Value) -> Option<(f64, f64)> {
    let coordinates = raw.get("geometry")?.get("coordinates")?.as_array()?;
    let lon = coordinate_value(coordinates.first()?)?;
    let lat = coordinate_value(coordinates.get(1)?)?;
    Some((lat, lon))
}

/// Historical track points from the record, malformed entries dropped
fn parsed_track(raw: &Value) -> Vec<TrackPoint> {
    TRACK_KEYS
        .iter()
        .find_map(|key| raw.get(key).and_then(Value::as_array))
        .map(|points| points.iter().filter_map(track_point).collect())
        .unwrap_or_default()
}

fn track_point(value: &Value) -> Option<TrackPoint> {
    let (lat, lon) = point_from(value)?;
    let timestamp_ms = field(value, &["timestamp", "timestampMs", "time", "dt"])
        .and_then(timestamp_value_ms)?;
    let intensity = field_f64(value, &["intensity", "category", "cat"])
        .unwrap_or(0.0)
        .max(0.0)
        .min(5.0) as u8;

    Some(TrackPoint {
        lat,
        lon,
        intensity,
        timestamp_ms,
    })
}

/// Timestamp in milliseconds from an epoch number (seconds or milliseconds)
/// or an RFC 3339 string
fn timestamp_value_ms(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        // Values this small can only be epoch seconds
        return Some(if n < 100_000_000_000 { n * 1000 } else { n });
    }
    if let Some(n) = value.as_f64() {
        let n = n as i64;
        return Some(if n < 100_000_000_000 { n * 1000 } else { n });
    }
    let s = value.as_str()?;
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp_millis())
}
