//! Identity resolution against the identifiers endpoint
//!
//! The first successful lookup that carries a `canonicalName` renames the
//! record. After that the working name never changes again.

use super::decoder::decode_payload;
use super::endpoints::Endpoints;
use super::gateway::{check_response, Gateway};
use super::report_progress;
use crate::error::{ExomastError, Result};
use crate::models::PlanetRecord;
use serde_json::Value;
use tracing::warn;

const CANONICAL_NAME_KEY: &str = "canonicalName";

/// Effect of an identifiers lookup on the record's working name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Renamed { from: String, to: String },
    Unchanged,
}

/// Fetch identifiers for the record's working name and apply them.
///
/// `index` selects the entry when the service answers with an array
/// (ambiguous names).
pub fn resolve_identifiers<G: Gateway + ?Sized>(
    gateway: &G,
    endpoints: &Endpoints,
    record: &mut PlanetRecord,
    index: usize,
    verbose: bool,
) -> Result<Resolution> {
    let url = endpoints.identifiers(&record.url_name());
    report_progress(verbose, "Acquiring planetary identifiers", &url);

    let body = gateway.get(&url)?;
    if body.trim().is_empty() {
        return Err(not_found(record));
    }
    check_response(&url, &body)?;

    let identifiers = decode_payload(&url, &body)?
        .select_record(&url, "identifiers", index)?
        .ok_or_else(|| not_found(record))?;

    let canonical = match identifiers.get(CANONICAL_NAME_KEY) {
        Some(Value::String(name)) if !name.trim().is_empty() => Some(name.clone()),
        _ => None,
    };

    record.identifiers = identifiers.into_iter().collect();

    let Some(canonical) = canonical else {
        return Ok(Resolution::Unchanged);
    };

    if canonical == record.canonical_name {
        record.canonicalized = true;
        return Ok(Resolution::Unchanged);
    }

    if record.canonicalized {
        warn!(
            current = %record.canonical_name,
            offered = %canonical,
            "Ignoring second canonical name for an already resolved planet"
        );
        return Ok(Resolution::Unchanged);
    }

    let from = std::mem::replace(&mut record.canonical_name, canonical.clone());
    record.canonicalized = true;

    tracing::info!(from = %from, to = %canonical, "Resolved canonical planet name");

    Ok(Resolution::Renamed { from, to: canonical })
}

fn not_found(record: &PlanetRecord) -> ExomastError {
    ExomastError::NotFound(format!(
        "{:?} is not in the exoMAST identifier table; the target may be \
         named differently in the database, or it may not exist",
        record.canonical_name
    ))
}
