//! USGS earthquake feed client
//!
//! Fetches the weekly GeoJSON summary feed and normalizes its features into
//! the canonical Quake model: trailing 7-day window, magnitude floor, place
//! label cleanup, and magnitude-descending ordering. A feed failure yields a
//! small fixed fallback set rather than an empty list, since a week with zero
//! quakes at the configured floor would read as a bug to the caller.

use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::{Quake, TRAILING_WINDOW_MS};

/// Base URL for the USGS summary feeds
const USGS_BASE_URL: &str = "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary";

/// Per-request deadline
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur when fetching the earthquake feed
#[derive(Debug, Error)]
pub enum QuakesError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Feed answered with a non-success status
    #[error("feed returned HTTP {0}")]
    BadStatus(u16),

    /// The request did not complete within the deadline
    #[error("request timed out")]
    TimedOut,
}

/// Top-level GeoJSON response from the USGS feed
#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

/// A single earthquake event
#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    id: Option<String>,
    geometry: Option<Geometry>,
    properties: Option<Properties>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    /// Coordinates: [longitude, latitude, depth_km]
    coordinates: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct Properties {
    mag: Option<f64>,
    place: Option<String>,
    /// Event time in milliseconds since the epoch
    time: Option<i64>,
}

/// Client for the USGS earthquake summary feed
#[derive(Debug, Clone)]
pub struct QuakeClient {
    client: Client,
    base_url: String,
}

impl QuakeClient {
    /// Creates a new QuakeClient against the public USGS feed
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: USGS_BASE_URL.to_string(),
        }
    }

    /// Creates a new QuakeClient with a custom base URL (for testing)
    #[cfg(test)]
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Fetches recent earthquakes at or above `min_magnitude`, strongest
    /// first, at most `limit` entries.
    ///
    /// Never fails: any fetch or parse problem falls back to the fixed
    /// illustrative set, filtered and ordered under the same rules.
    pub async fn fetch_quakes(&self, min_magnitude: f64, limit: usize) -> Vec<Quake> {
        let now_ms = Utc::now().timestamp_millis();
        match self.fetch_from_feed(min_magnitude, limit, now_ms).await {
            Ok(quakes) => {
                debug!(count = quakes.len(), "earthquake feed fetched");
                quakes
            }
            Err(e) => {
                warn!("earthquake feed unavailable, using fallback set: {e}");
                fallback_quakes(now_ms, min_magnitude, limit)
            }
        }
    }

    async fn fetch_from_feed(
        &self,
        min_magnitude: f64,
        limit: usize,
        now_ms: i64,
    ) -> Result<Vec<Quake>, QuakesError> {
        let url = format!("{}/{}_week.geojson", self.base_url, min_magnitude);
        debug!(url = %url, "fetching earthquake feed");

        let response = timeout(REQUEST_TIMEOUT, self.client.get(&url).send())
            .await
            .map_err(|_| QuakesError::TimedOut)??;

        if !response.status().is_success() {
            return Err(QuakesError::BadStatus(response.status().as_u16()));
        }

        let feed: FeatureCollection = response.json().await?;
        Ok(normalize_features(feed, min_magnitude, limit, now_ms))
    }
}

impl Default for QuakeClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalizes raw feed features into Quake records.
///
/// Drops malformed features, events older than the trailing window, and
/// events below the magnitude floor; one bad feature never fails the batch.
fn normalize_features(
    feed: FeatureCollection,
    min_magnitude: f64,
    limit: usize,
    now_ms: i64,
) -> Vec<Quake> {
    let cutoff = now_ms - TRAILING_WINDOW_MS;

    let mut quakes: Vec<Quake> = feed
        .features
        .into_iter()
        .enumerate()
        .filter_map(|(index, feature)| {
            let geometry = feature.geometry?;
            let properties = feature.properties?;
            let lon = *geometry.coordinates.first()?;
            let lat = *geometry.coordinates.get(1)?;
            let depth = geometry.coordinates.get(2).copied().unwrap_or(0.0);
            let magnitude = properties.mag?;
            let time_ms = properties.time?;

            if time_ms < cutoff || magnitude < min_magnitude {
                return None;
            }

            let location = properties
                .place
                .map(|place| strip_distance_prefix(&place).to_string())
                .unwrap_or_else(|| format!("{:.2}°N, {:.2}°E", lat, lon));

            Some(Quake {
                id: feature.id.unwrap_or_else(|| format!("eq-{index}")),
                lat,
                lon,
                magnitude,
                // Raw depth sign is not meaningful for display
                depth_km: depth.abs().round(),
                location,
                time_ms,
            })
        })
        .collect();

    quakes.sort_by(|a, b| {
        b.magnitude
            .partial_cmp(&a.magnitude)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    quakes.truncate(limit);
    quakes
}

/// Strips a leading "<N>km <DIR> of " distance prefix from a USGS place
/// label. Labels in any other grammar pass through unchanged.
fn strip_distance_prefix(place: &str) -> &str {
    let rest = place.trim_start();

    let digits = rest.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return place;
    }
    let after_digits = &rest[digits..];

    let Some(after_km) = after_digits
        .strip_prefix("km")
        .or_else(|| after_digits.trim_start().strip_prefix("km"))
    else {
        return place;
    };

    let after_km = after_km.trim_start();
    let dir_len = after_km
        .chars()
        .take_while(|c| matches!(c, 'N' | 'E' | 'S' | 'W' | 'n' | 'e' | 's' | 'w'))
        .count();
    if dir_len == 0 || dir_len > 3 {
        return place;
    }

    let after_dir = after_km[dir_len..].trim_start();
    match after_dir
        .strip_prefix("of ")
        .or_else(|| after_dir.strip_prefix("Of "))
        .or_else(|| after_dir.strip_prefix("OF "))
    {
        Some(after_of) => after_of.trim_start(),
        None => place,
    }
}

/// Fixed illustrative quakes served when the feed is unreachable.
///
/// Timestamps are anchored to the current fetch so every entry sits inside
/// the trailing window; the same floor, ordering, and limit rules apply.
fn fallback_quakes(now_ms: i64, min_magnitude: f64, limit: usize) -> Vec<Quake> {
    const HOUR_MS: i64 = 3_600_000;

    let seed = [
        ("fallback-tokyo", 35.6762, 139.6503, 7.2, 10.0, "Tokyo, Japan", 6 * HOUR_MS),
        ("fallback-manila", 14.5995, 120.9842, 6.5, 15.0, "Manila, Philippines", 20 * HOUR_MS),
        ("fallback-seoul", 37.5665, 126.9780, 6.1, 12.0, "Seoul, South Korea", 42 * HOUR_MS),
        ("fallback-taipei", 25.0330, 121.5654, 5.8, 8.0, "Taipei, Taiwan", 70 * HOUR_MS),
    ];

    let mut quakes: Vec<Quake> = seed
        .iter()
        .filter(|(_, _, _, magnitude, _, _, _)| *magnitude >= min_magnitude)
        .map(|&(id, lat, lon, magnitude, depth_km, location, age_ms)| Quake {
            id: id.to_string(),
            lat,
            lon,
            magnitude,
            depth_km,
            location: location.to_string(),
            time_ms: now_ms - age_ms,
        })
        .collect();

    quakes.sort_by(|a, b| {
        b.magnitude
            .partial_cmp(&a.magnitude)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    quakes.truncate(limit);
    quakes
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A feed with one fresh event, one stale event, one weak event, one
    /// malformed event, and one fresh event with a negative depth.
    fn sample_feed(now_ms: i64) -> String {
        let fresh = now_ms - 2 * 3_600_000;
        let stale = now_ms - 9 * 24 * 3_600_000;
        format!(
            r#"{{
                "type": "FeatureCollection",
                "features": [
                    {{
                        "type": "Feature",
                        "id": "us7000aaaa",
                        "geometry": {{ "type": "Point", "coordinates": [121.0, 14.6, 33.2] }},
                        "properties": {{ "mag": 5.1, "place": "25km S of Example City", "time": {fresh} }}
                    }},
                    {{
                        "type": "Feature",
                        "id": "us7000bbbb",
                        "geometry": {{ "type": "Point", "coordinates": [139.7, 35.7, 10.0] }},
                        "properties": {{ "mag": 6.8, "place": "Tokyo, Japan", "time": {stale} }}
                    }},
                    {{
                        "type": "Feature",
                        "id": "us7000cccc",
                        "geometry": {{ "type": "Point", "coordinates": [125.0, 8.0, 50.0] }},
                        "properties": {{ "mag": 3.9, "place": "10km N of Somewhere", "time": {fresh} }}
                    }},
                    {{
                        "type": "Feature",
                        "id": "us7000dddd",
                        "properties": {{ "mag": 7.5, "place": "No geometry", "time": {fresh} }}
                    }},
                    {{
                        "type": "Feature",
                        "id": "us7000eeee",
                        "geometry": {{ "type": "Point", "coordinates": [127.1, 6.2, -12.4] }},
                        "properties": {{ "mag": 6.2, "place": "110km SE of Davao, Philippines", "time": {fresh} }}
                    }}
                ]
            }}"#
        )
    }

    fn parse_feed(json: &str) -> FeatureCollection {
        serde_json::from_str(json).expect("Failed to parse fixture feed")
    }

    #[test]
    fn test_normalize_applies_window_and_floor() {
        let now_ms = 1_700_000_000_000;
        let feed = parse_feed(&sample_feed(now_ms));

        let quakes = normalize_features(feed, 4.5, 50, now_ms);

        // Stale, weak, and malformed events are gone
        assert_eq!(quakes.len(), 2);
        for quake in &quakes {
            assert!(quake.magnitude >= 4.5);
            assert!(quake.time_ms >= now_ms - TRAILING_WINDOW_MS);
        }
    }

    #[test]
    fn test_normalize_sorts_descending_by_magnitude() {
        let now_ms = 1_700_000_000_000;
        let feed = parse_feed(&sample_feed(now_ms));

        let quakes = normalize_features(feed, 4.5, 50, now_ms);

        assert!((quakes[0].magnitude - 6.2).abs() < f64::EPSILON);
        assert!((quakes[1].magnitude - 5.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_normalize_respects_limit() {
        let now_ms = 1_700_000_000_000;
        let feed = parse_feed(&sample_feed(now_ms));

        let quakes = normalize_features(feed, 4.5, 1, now_ms);

        assert_eq!(quakes.len(), 1);
        assert!((quakes[0].magnitude - 6.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_normalize_strips_place_prefix_and_rounds_depth() {
        let now_ms = 1_700_000_000_000;
        let feed = parse_feed(&sample_feed(now_ms));

        let quakes = normalize_features(feed, 4.5, 50, now_ms);

        let example = quakes
            .iter()
            .find(|q| q.id == "us7000aaaa")
            .expect("missing fixture quake");
        assert_eq!(example.location, "Example City");
        assert_eq!(example.depth_km, 33.0);

        // Negative raw depth becomes its absolute value
        let davao = quakes
            .iter()
            .find(|q| q.id == "us7000eeee")
            .expect("missing fixture quake");
        assert_eq!(davao.location, "Davao, Philippines");
        assert_eq!(davao.depth_km, 12.0);
    }

    #[test]
    fn test_normalize_coordinates_are_lon_lat_order() {
        let now_ms = 1_700_000_000_000;
        let feed = parse_feed(&sample_feed(now_ms));

        let quakes = normalize_features(feed, 4.5, 50, now_ms);
        let example = quakes.iter().find(|q| q.id == "us7000aaaa").unwrap();

        assert!((example.lat - 14.6).abs() < 1e-9);
        assert!((example.lon - 121.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_synthesizes_missing_id_and_place() {
        let now_ms = 1_700_000_000_000;
        let fresh = now_ms - 1000;
        let json = format!(
            r#"{{
                "features": [
                    {{
                        "geometry": {{ "coordinates": [121.0, 14.6, 5.0] }},
                        "properties": {{ "mag": 5.0, "time": {fresh} }}
                    }}
                ]
            }}"#
        );
        let quakes = normalize_features(parse_feed(&json), 4.5, 50, now_ms);

        assert_eq!(quakes.len(), 1);
        assert_eq!(quakes[0].id, "eq-0");
        assert!(quakes[0].location.contains("14.60"));
    }

    #[test]
    fn test_strip_distance_prefix_variants() {
        assert_eq!(strip_distance_prefix("25km S of Example City"), "Example City");
        assert_eq!(strip_distance_prefix("110km SE of Davao, Philippines"), "Davao, Philippines");
        assert_eq!(strip_distance_prefix("7 km WNW of Luzon"), "Luzon");
    }

    #[test]
    fn test_strip_distance_prefix_leaves_other_labels_alone() {
        assert_eq!(strip_distance_prefix("Tokyo, Japan"), "Tokyo, Japan");
        assert_eq!(strip_distance_prefix("South of the Fiji Islands"), "South of the Fiji Islands");
        assert_eq!(strip_distance_prefix("2023 quake zone"), "2023 quake zone");
        assert_eq!(strip_distance_prefix(""), "");
    }

    #[test]
    fn test_fallback_quakes_within_window_and_floor() {
        let now_ms = 1_700_000_000_000;
        let quakes = fallback_quakes(now_ms, 4.5, 50);

        assert_eq!(quakes.len(), 4);
        for quake in &quakes {
            assert!(quake.magnitude >= 4.5);
            assert!(quake.time_ms >= now_ms - TRAILING_WINDOW_MS);
            assert!(quake.time_ms <= now_ms);
        }
    }

    #[test]
    fn test_fallback_quakes_sorted_and_limited() {
        let now_ms = 1_700_000_000_000;

        let quakes = fallback_quakes(now_ms, 4.5, 2);
        assert_eq!(quakes.len(), 2);
        assert!((quakes[0].magnitude - 7.2).abs() < f64::EPSILON);
        assert!((quakes[1].magnitude - 6.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fallback_quakes_respects_higher_floor() {
        let now_ms = 1_700_000_000_000;

        let quakes = fallback_quakes(now_ms, 6.4, 50);
        assert_eq!(quakes.len(), 2);
        for quake in &quakes {
            assert!(quake.magnitude >= 6.4);
        }
    }

    #[tokio::test]
    async fn test_fetch_quakes_unreachable_feed_resolves_to_fallback() {
        // Nothing listens here; the request fails fast and the fallback
        // set is returned instead of an error.
        let client = QuakeClient::with_base_url("http://127.0.0.1:9".to_string());
        let quakes = client.fetch_quakes(4.5, 50).await;

        assert_eq!(quakes.len(), 4);
        let now_ms = Utc::now().timestamp_millis();
        for quake in &quakes {
            assert!(quake.magnitude >= 4.5);
            assert!(quake.time_ms >= now_ms - TRAILING_WINDOW_MS);
        }
    }
}
