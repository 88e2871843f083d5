//! Snapshot rendering for the terminal
//!
//! Turns an aggregated snapshot into a plain-text report or a JSON document.

use chrono::{DateTime, Utc};

use crate::data::weather::wind_direction_label;
use crate::data::{LowPressureArea, Quake, Snapshot, Storm};

/// Renders a snapshot as an indented plain-text report
pub fn render_text(snapshot: &Snapshot) -> String {
    let mut out = String::new();

    out.push_str(&format!("Snapshot at {}\n", format_time(snapshot.fetched_at)));

    out.push('\n');
    if snapshot.storms.is_empty() {
        out.push_str("No active storms\n");
    } else {
        out.push_str(&format!("Active storms ({}):\n", snapshot.storms.len()));
        for storm in &snapshot.storms {
            out.push_str(&storm_lines(storm));
        }
    }

    out.push('\n');
    if snapshot.quakes.is_empty() {
        out.push_str("No recent earthquakes\n");
    } else {
        out.push_str(&format!("Earthquakes ({}, last 7 days):\n", snapshot.quakes.len()));
        for quake in &snapshot.quakes {
            out.push_str(&quake_line(quake));
        }
    }

    out.push('\n');
    if snapshot.low_pressure_areas.is_empty() {
        out.push_str("No monitored low pressure areas\n");
    } else {
        out.push_str(&format!(
            "Low pressure areas ({}):\n",
            snapshot.low_pressure_areas.len()
        ));
        for lpa in &snapshot.low_pressure_areas {
            out.push_str(&lpa_line(lpa));
        }
    }

    out
}

/// Renders a snapshot as pretty-printed JSON
pub fn render_json(snapshot: &Snapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(snapshot)
}

fn storm_lines(storm: &Storm) -> String {
    let whereabouts = if storm.in_par {
        "inside PAR".to_string()
    } else if storm.approaching {
        format!("{:.0} km from PAR, approaching", storm.distance_to_par_km)
    } else {
        format!("{:.0} km from PAR", storm.distance_to_par_km)
    };

    format!(
        "  {}  cat {}  {}  {}\n    winds {:.1} km/h, {} track points\n",
        storm.display_name,
        storm.current.intensity,
        format_coordinate(storm.current.lat, storm.current.lon),
        whereabouts,
        storm.current.wind_speed_kmh,
        storm.path.len(),
    )
}

fn quake_line(quake: &Quake) -> String {
    format!(
        "  M{:.1}  {}  depth {:.0} km  {}\n",
        quake.magnitude,
        quake.location,
        quake.depth_km,
        format_coordinate(quake.lat, quake.lon),
    )
}

fn lpa_line(lpa: &LowPressureArea) -> String {
    match &lpa.weather {
        Some(weather) => format!(
            "  {}  intensity {:.2}  {:.0} hPa, winds {:.1} km/h {}\n",
            format_coordinate(lpa.lat, lpa.lon),
            lpa.intensity,
            weather.pressure,
            weather.wind_speed_kmh,
            wind_direction_label(weather.wind_direction_deg),
        ),
        None => format!(
            "  {}  intensity {:.2}\n",
            format_coordinate(lpa.lat, lpa.lon),
            lpa.intensity,
        ),
    }
}

fn format_time(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// "14.6°N 121.0°E" style coordinate label
fn format_coordinate(lat: f64, lon: f64) -> String {
    let ns = if lat < 0.0 { 'S' } else { 'N' };
    let ew = if lon < 0.0 { 'W' } else { 'E' };
    format!("{:.1}°{} {:.1}°{}", lat.abs(), ns, lon.abs(), ew)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{StormPosition, TrackPoint};

    fn sample_snapshot() -> Snapshot {
        Snapshot {
            storms: vec![Storm {
                id: "wp0223".to_string(),
                international_name: "Mawar".to_string(),
                local_name: Some("Betty".to_string()),
                current: StormPosition {
                    lat: 15.0,
                    lon: 130.0,
                    intensity: 4,
                    wind_speed_kmh: 185.2,
                },
                path: vec![TrackPoint {
                    lat: 15.0,
                    lon: 130.0,
                    intensity: 4,
                    timestamp_ms: 1_700_000_000_000,
                }],
                in_par: true,
                display_name: "Betty (Mawar)".to_string(),
                distance_to_par_km: 0.0,
                approaching: true,
            }],
            quakes: vec![Quake {
                id: "us7000aaaa".to_string(),
                lat: 14.6,
                lon: 121.0,
                magnitude: 5.1,
                depth_km: 33.0,
                location: "Example City".to_string(),
                time_ms: 1_700_000_000_000,
            }],
            low_pressure_areas: vec![LowPressureArea {
                lat: 8.5,
                lon: 130.5,
                intensity: 0.4,
                weather: None,
            }],
            fetched_at: Utc::now(),
        }
    }

    fn empty_snapshot() -> Snapshot {
        Snapshot {
            storms: Vec::new(),
            quakes: Vec::new(),
            low_pressure_areas: Vec::new(),
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn test_render_text_lists_each_kind() {
        let text = render_text(&sample_snapshot());

        assert!(text.contains("Active storms (1):"));
        assert!(text.contains("Betty (Mawar)"));
        assert!(text.contains("cat 4"));
        assert!(text.contains("inside PAR"));
        assert!(text.contains("M5.1"));
        assert!(text.contains("Example City"));
        assert!(text.contains("Low pressure areas (1):"));
    }

    #[test]
    fn test_render_text_empty_states() {
        let text = render_text(&empty_snapshot());

        assert!(text.contains("No active storms"));
        assert!(text.contains("No recent earthquakes"));
        assert!(text.contains("No monitored low pressure areas"));
    }

    #[test]
    fn test_render_json_roundtrips() {
        let snapshot = sample_snapshot();
        let json = render_json(&snapshot).expect("Failed to render JSON");

        let back: Snapshot = serde_json::from_str(&json).expect("Failed to parse rendered JSON");
        assert_eq!(back.storms.len(), 1);
        assert_eq!(back.storms[0].display_name, "Betty (Mawar)");
        assert_eq!(back.quakes.len(), 1);
    }

    #[test]
    fn test_format_coordinate_hemispheres() {
        assert_eq!(format_coordinate(14.6, 121.0), "14.6°N 121.0°E");
        assert_eq!(format_coordinate(-33.9, -97.5), "33.9°S 97.5°W");
        assert_eq!(format_coordinate(0.0, 0.0), "0.0°N 0.0°E");
    }

    #[test]
    fn test_storm_line_outside_par_shows_distance() {
        let mut snapshot = sample_snapshot();
        snapshot.storms[0].in_par = false;
        snapshot.storms[0].distance_to_par_km = 811.0;
        snapshot.storms[0].display_name = "Guchol".to_string();

        let text = render_text(&snapshot);
        assert!(text.contains("811 km from PAR, approaching"));
    }
}
