//! Mission collection classification
//!
//! A planet name belongs to the Kepler collection when it contains "kic" or
//! "koi", to the TESS collection when it contains "tic" or "toi". Kepler
//! tokens are checked first, so a name carrying both resolves to Kepler.

use serde::{Deserialize, Serialize};
use std::fmt;

const KEPLER_TOKENS: [&str; 2] = ["kic", "koi"];
const TESS_TOKENS: [&str; 2] = ["tic", "toi"];

/// Mission dataset a planet's host system belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    None,
    Kepler,
    Tess,
}

impl Collection {
    /// Path segment used by the `dvdata` endpoints
    pub fn path_segment(self) -> Option<&'static str> {
        match self {
            Collection::None => None,
            Collection::Kepler => Some("kepler"),
            Collection::Tess => Some("tess"),
        }
    }

    pub fn is_mission(self) -> bool {
        self != Collection::None
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment().unwrap_or("none"))
    }
}

/// KIC/KOI/TIC/TOI catalog number
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MissionId {
    Numeric(u64),
    Text(String),
}

impl fmt::Display for MissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissionId::Numeric(id) => write!(f, "{}", id),
            MissionId::Text(id) => f.write_str(id),
        }
    }
}

/// Classify a raw planet name into `(collection, mission_id)`.
///
/// Total: every input yields a pair. The mission id is only extracted when
/// the name starts with one of the catalog prefixes.
pub fn classify(planet_name: &str) -> (Collection, Option<MissionId>) {
    let folded = planet_name.trim().to_lowercase();

    let collection = if KEPLER_TOKENS.iter().any(|t| folded.contains(t)) {
        Collection::Kepler
    } else if TESS_TOKENS.iter().any(|t| folded.contains(t)) {
        Collection::Tess
    } else {
        Collection::None
    };

    if collection == Collection::None {
        return (collection, None);
    }

    (collection, parse_mission_id(&folded))
}

fn parse_mission_id(folded: &str) -> Option<MissionId> {
    let prefix = folded.get(..3)?;
    if !KEPLER_TOKENS.contains(&prefix) && !TESS_TOKENS.contains(&prefix) {
        return None;
    }

    let suffix = folded[3..].trim();
    if suffix.is_empty() {
        return None;
    }

    Some(match suffix.parse::<u64>() {
        Ok(id) => MissionId::Numeric(id),
        Err(_) => MissionId::Text(suffix.to_string()),
    })
}
