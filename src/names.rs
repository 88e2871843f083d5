//! PAGASA storm name resolution
//!
//! Tropical cyclones entering the Philippine Area of Responsibility receive a
//! local name from PAGASA on top of their international designation. This
//! module holds the static pair table and the lookup/labeling helpers used by
//! the storm parsers and the presentation layer.

use crate::geo;

/// An international storm designation paired with its PAGASA name
#[derive(Debug, Clone, Copy)]
pub struct NamePair {
    /// International name assigned by the regional body (JMA list)
    pub international: &'static str,
    /// Local name assigned by PAGASA inside the PAR
    pub local: &'static str,
}

/// Leading designation tokens stripped before table lookup
const DESIGNATION_PREFIXES: [&str; 6] = [
    "Typhoon",
    "Super",
    "Tropical",
    "Storm",
    "Depression",
    "Hurricane",
];

/// Static table of international to PAGASA name assignments.
///
/// Covers named cyclones from recent seasons plus the historically
/// significant older ones. Lookup is exact and case-sensitive on the
/// cleaned name.
pub static PAGASA_NAMES: [NamePair; 75] = [
    // 2025 season
    NamePair { international: "Wipha", local: "Crising" },
    NamePair { international: "Co-may", local: "Emong" },
    NamePair { international: "Ragasa", local: "Nando" },
    NamePair { international: "Bualoi", local: "Opong" },
    NamePair { international: "Matmo", local: "Paolo" },
    NamePair { international: "Kalmaegi", local: "Tino" },
    NamePair { international: "Fung-wong", local: "Uwan" },
    // 2024 season
    NamePair { international: "Ewiniar", local: "Aghon" },
    NamePair { international: "Maliksi", local: "Butchoy" },
    NamePair { international: "Gaemi", local: "Carina" },
    NamePair { international: "Prapiroon", local: "Dindo" },
    NamePair { international: "Yagi", local: "Enteng" },
    NamePair { international: "Bebinca", local: "Ferdie" },
    NamePair { international: "Pulasan", local: "Gener" },
    NamePair { international: "Krathon", local: "Julian" },
    NamePair { international: "Trami", local: "Kristine" },
    NamePair { international: "Kong-rey", local: "Leon" },
    NamePair { international: "Yinxing", local: "Marce" },
    NamePair { international: "Toraji", local: "Nika" },
    NamePair { international: "Usagi", local: "Ofel" },
    NamePair { international: "Man-yi", local: "Pepito" },
    // 2023 season
    NamePair { international: "Mawar", local: "Betty" },
    NamePair { international: "Guchol", local: "Chedeng" },
    NamePair { international: "Talim", local: "Dodong" },
    NamePair { international: "Doksuri", local: "Egay" },
    NamePair { international: "Khanun", local: "Falcon" },
    NamePair { international: "Saola", local: "Goring" },
    NamePair { international: "Haikui", local: "Hanna" },
    NamePair { international: "Koinu", local: "Jenny" },
    NamePair { international: "Jelawat", local: "Kabayan" },
    // 2022 season
    NamePair { international: "Megi", local: "Agaton" },
    NamePair { international: "Malakas", local: "Basyang" },
    NamePair { international: "Chaba", local: "Caloy" },
    NamePair { international: "Aere", local: "Domeng" },
    NamePair { international: "Songda", local: "Ester" },
    NamePair { international: "Ma-on", local: "Florita" },
    NamePair { international: "Hinnamnor", local: "Henry" },
    NamePair { international: "Muifa", local: "Inday" },
    NamePair { international: "Nanmadol", local: "Josie" },
    NamePair { international: "Noru", local: "Karding" },
    NamePair { international: "Nesat", local: "Neneng" },
    NamePair { international: "Nalgae", local: "Paeng" },
    NamePair { international: "Banyan", local: "Queenie" },
    // 2021 season
    NamePair { international: "Dujuan", local: "Auring" },
    NamePair { international: "Surigae", local: "Bising" },
    NamePair { international: "Choi-wan", local: "Dante" },
    NamePair { international: "In-fa", local: "Fabian" },
    NamePair { international: "Conson", local: "Jolina" },
    NamePair { international: "Chanthu", local: "Kiko" },
    NamePair { international: "Kompasu", local: "Maring" },
    NamePair { international: "Rai", local: "Odette" },
    // 2020 season
    NamePair { international: "Vongfong", local: "Ambo" },
    NamePair { international: "Molave", local: "Quinta" },
    NamePair { international: "Goni", local: "Rolly" },
    NamePair { international: "Atsani", local: "Siony" },
    NamePair { international: "Etau", local: "Tonyo" },
    NamePair { international: "Vamco", local: "Ulysses" },
    NamePair { international: "Krovanh", local: "Vicky" },
    // Notable earlier storms
    NamePair { international: "Phanfone", local: "Ursula" },
    NamePair { international: "Kammuri", local: "Tisoy" },
    NamePair { international: "Mangkhut", local: "Ompong" },
    NamePair { international: "Yutu", local: "Rosita" },
    NamePair { international: "Tembin", local: "Vinta" },
    NamePair { international: "Haima", local: "Lawin" },
    NamePair { international: "Sarika", local: "Karen" },
    NamePair { international: "Nock-ten", local: "Nina" },
    NamePair { international: "Melor", local: "Nona" },
    NamePair { international: "Koppu", local: "Lando" },
    NamePair { international: "Hagupit", local: "Ruby" },
    NamePair { international: "Rammasun", local: "Glenda" },
    NamePair { international: "Haiyan", local: "Yolanda" },
    NamePair { international: "Utor", local: "Labuyo" },
    NamePair { international: "Bopha", local: "Pablo" },
    NamePair { international: "Parma", local: "Pepeng" },
    NamePair { international: "Ketsana", local: "Ondoy" },
];

/// Strips leading designation tokens ("Typhoon", "Tropical Storm", ...) and
/// surrounding whitespace from a storm name.
fn clean_name(name: &str) -> &str {
    let mut rest = name.trim();
    loop {
        let mut stripped = false;
        for prefix in DESIGNATION_PREFIXES {
            if let Some(after) = rest.strip_prefix(prefix) {
                // Only strip whole tokens
                if after.is_empty() || after.starts_with(char::is_whitespace) {
                    rest = after.trim_start();
                    stripped = true;
                }
            }
        }
        if !stripped {
            break;
        }
    }
    rest
}

/// Looks up the PAGASA name for an international designation.
///
/// Tolerates a leading designation prefix; returns `None` for unmapped names.
pub fn local_name(international: &str) -> Option<&'static str> {
    let cleaned = clean_name(international);
    PAGASA_NAMES
        .iter()
        .find(|pair| pair.international == cleaned)
        .map(|pair| pair.local)
}

/// Reverse lookup: the international designation for a PAGASA name.
pub fn international_name(local: &str) -> Option<&'static str> {
    let cleaned = clean_name(local);
    PAGASA_NAMES
        .iter()
        .find(|pair| pair.local == cleaned)
        .map(|pair| pair.international)
}

/// Label used when presenting a storm at the given position.
///
/// Inside the PAR a mapped storm shows as "Local (International)"; everywhere
/// else the international name is used unchanged.
pub fn display_name(international: &str, lat: f64, lon: f64) -> String {
    if geo::is_in_par(lat, lon) {
        if let Some(local) = local_name(international) {
            return format!("{} ({})", local, international);
        }
    }
    international.to_string()
}
