//! Property aggregation from the properties endpoint
//!
//! Each fetch rebuilds the property set from scratch, so repeated calls never
//! accumulate stale or previously derived fields.

use super::decoder::{decode_payload, flatten_keys};
use super::endpoints::Endpoints;
use super::gateway::{fetch_checked, Gateway};
use super::report_progress;
use crate::error::Result;
use crate::models::{PlanetRecord, Properties};
use serde_json::{Map, Value};

/// Equatorial Jupiter radius (IAU 2015 nominal), metres
pub const JUPITER_RADIUS_M: f64 = 7.1492e7;
/// Solar radius (IAU 2015 nominal), metres
pub const SOLAR_RADIUS_M: f64 = 6.957e8;
/// One Jupiter radius expressed in solar radii
pub const JUPITER_RADIUS_IN_SOLAR_RADII: f64 = JUPITER_RADIUS_M / SOLAR_RADIUS_M;

pub const RADIUS_RATIO_KEY: &str = "Rp_Rs";

/// Whether the service had any properties for the planet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertiesOutcome {
    Available { fields: usize },
    /// The service answered with an empty list
    NoneAvailable,
}

pub fn fetch_properties<G: Gateway + ?Sized>(
    gateway: &G,
    endpoints: &Endpoints,
    record: &mut PlanetRecord,
    index: usize,
    verbose: bool,
) -> Result<PropertiesOutcome> {
    let url = endpoints.properties(&record.url_name());
    report_progress(verbose, "Acquiring planetary properties", &url);

    let body = fetch_checked(gateway, &url)?;
    let selected = decode_payload(&url, &body)?.select_record(&url, "properties", index)?;

    match selected {
        Some(map) => {
            record.properties = build_properties(&map);
            Ok(PropertiesOutcome::Available {
                fields: record.properties.len(),
            })
        }
        None => {
            tracing::info!(planet = %record.canonical_name, "Service has no properties for planet");
            record.properties = Properties::default();
            Ok(PropertiesOutcome::NoneAvailable)
        }
    }
}

/// Flatten a properties payload and add derivable fields
pub fn build_properties(payload: &Map<String, Value>) -> Properties {
    let mut properties = Properties::from_fields(flatten_keys(payload, '/', '_'));
    derive_radius_ratio(&mut properties);
    properties
}

/// Add `Rp_Rs` from `Rp` (Jupiter radii) and `Rs` (solar radii) when the
/// service did not supply it. A served `Rp_Rs` is kept even when null.
/// Returns the derived value, if any.
///
/// The result can differ from the served `transit_depth`; both are kept.
pub fn derive_radius_ratio(properties: &mut Properties) -> Option<f64> {
    if properties.get(RADIUS_RATIO_KEY).is_some() {
        return None;
    }

    let rp = properties.rp()?;
    let rs = properties.rs()?;
    if rs == 0.0 {
        return None;
    }

    let ratio = rp * JUPITER_RADIUS_IN_SOLAR_RADII / rs;
    properties.insert_derived(RADIUS_RATIO_KEY, ratio);
    Some(ratio)
}
