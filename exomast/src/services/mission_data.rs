//! Kepler/TESS data-validation fetchers
//!
//! Threshold-crossing events, metadata, the detrended table and the phase
//! plot. All four refuse to run, without touching the network, unless the
//! record belongs to a mission collection.

use super::decoder::{decode_json, decode_object, flatten_keys};
use super::endpoints::Endpoints;
use super::gateway::{fetch_checked, Gateway};
use super::report_progress;
use crate::error::{ExomastError, Result};
use crate::models::{AttributeMap, Collection, MissionId, PlanetRecord};
use serde_json::Value;

/// TCE selected when the caller does not pick one
pub const DEFAULT_TCE_INDEX: u32 = 1;

fn require_collection(record: &PlanetRecord) -> Result<Collection> {
    if record.collection.is_mission() {
        Ok(record.collection)
    } else {
        Err(ExomastError::Configuration(format!(
            "{:?} is not a Kepler or TESS object; this method is only useful for \
             names carrying a KIC, KOI, TIC or TOI designation",
            record.input_name
        )))
    }
}

fn require_mission(record: &PlanetRecord) -> Result<(Collection, MissionId)> {
    let collection = require_collection(record)?;
    let mission_id = record.mission_id.clone().ok_or_else(|| {
        ExomastError::Configuration(format!(
            "{:?} has no {} catalog number; start the name with its catalog \
             prefix (e.g. \"KIC 12557548\")",
            record.input_name, collection
        ))
    })?;
    Ok((collection, mission_id))
}

/// Threshold-crossing events for the record's mission id
pub fn fetch_tce<'r, G: Gateway + ?Sized>(
    gateway: &G,
    endpoints: &Endpoints,
    record: &'r mut PlanetRecord,
    verbose: bool,
) -> Result<&'r Value> {
    let (collection, mission_id) = require_mission(record)?;
    let url = endpoints.tce(collection, &mission_id);
    report_progress(verbose, "Acquiring threshold crossing events", &url);

    let body = fetch_checked(gateway, &url)?;
    let tce = decode_json(&url, &body)?;

    Ok(&*record.tce.insert(tce))
}

/// Data-validation metadata, flattened into attributes
///
/// Without a mission id the collection-level info endpoint is used.
pub fn fetch_metadata<'r, G: Gateway + ?Sized>(
    gateway: &G,
    endpoints: &Endpoints,
    record: &'r mut PlanetRecord,
    tce_index: u32,
) -> Result<&'r AttributeMap> {
    let collection = require_collection(record)?;
    let url = match &record.mission_id {
        Some(mission_id) => endpoints.metadata(collection, mission_id, tce_index),
        None => endpoints.collection_info(collection),
    };
    tracing::debug!(url = %url, "Accessing data-validation metadata");

    let body = fetch_checked(gateway, &url)?;
    let metadata = decode_object(&url, &body)?;

    record.metadata_attributes = flatten_keys(&metadata, ' ', '_');
    record.metadata = Some(Value::Object(metadata));

    Ok(&record.metadata_attributes)
}

/// Detrended light-curve table for one TCE
pub fn fetch_detrended_table<'r, G: Gateway + ?Sized>(
    gateway: &G,
    endpoints: &Endpoints,
    record: &'r mut PlanetRecord,
    tce_index: u32,
    verbose: bool,
) -> Result<&'r Value> {
    let (collection, mission_id) = require_mission(record)?;
    let url = endpoints.detrended_table(collection, &mission_id, tce_index);
    report_progress(verbose, "Acquiring detrended table", &url);

    let body = fetch_checked(gateway, &url)?;
    let table = decode_json(&url, &body)?;

    Ok(&*record.detrended_table.insert(table))
}

/// Phase-folded plot payload for one TCE; `embed` asks for the embeddable variant
pub fn fetch_phase_plot<'r, G: Gateway + ?Sized>(
    gateway: &G,
    endpoints: &Endpoints,
    record: &'r mut PlanetRecord,
    tce_index: u32,
    embed: bool,
    verbose: bool,
) -> Result<&'r Value> {
    let (collection, mission_id) = require_mission(record)?;
    let url = endpoints.phase_plot(collection, &mission_id, tce_index, embed);
    report_progress(verbose, "Acquiring phase plot", &url);

    let body = fetch_checked(gateway, &url)?;
    let plot = decode_json(&url, &body)?;

    Ok(&*record.phase_plot.insert(plot))
}
