//! Spectrum file list, spectrum files and the spectrum plot payload

use super::decoder::{decode_json, decode_object, parse_spectrum_table};
use super::endpoints::Endpoints;
use super::gateway::{fetch_checked, Gateway};
use super::report_progress;
use crate::error::{ExomastError, Result};
use crate::models::{PlanetRecord, SpectrumLayout, SpectrumTable};
use serde_json::Value;

/// Fetch and keep the list of spectrum files available for the planet
pub fn fetch_spectrum_filelist<'r, G: Gateway + ?Sized>(
    gateway: &G,
    endpoints: &Endpoints,
    record: &'r mut PlanetRecord,
    verbose: bool,
) -> Result<&'r [String]> {
    let url = endpoints.spectrum_filelist(&record.url_name());
    report_progress(verbose, "Acquiring spectral file list", &url);

    let body = fetch_checked(gateway, &url)?;
    let listing = decode_object(&url, &body)?;

    let filenames = match listing.get("filenames") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    ExomastError::service(&url, format!("file name {} is not a string", item))
                })
            })
            .collect::<Result<Vec<String>>>()?,
        _ => {
            return Err(ExomastError::service(&url, "response has no \"filenames\" list"));
        }
    };

    Ok(record.spectrum_files.insert(filenames).as_slice())
}

/// Fetch spectrum file `index` from the (cached) file list and parse it
pub fn fetch_spectrum<'r, G: Gateway + ?Sized>(
    gateway: &G,
    endpoints: &Endpoints,
    record: &'r mut PlanetRecord,
    index: usize,
    layout: SpectrumLayout,
    verbose: bool,
) -> Result<&'r SpectrumTable> {
    if record.spectrum_files.is_none() {
        fetch_spectrum_filelist(gateway, endpoints, record, verbose)?;
    }

    let files = record.spectrum_files.as_deref().unwrap_or_default();
    let filename = files
        .get(index)
        .cloned()
        .ok_or(ExomastError::IndexOutOfRange {
            what: "spectrum file",
            index,
            len: files.len(),
        })?;

    let url = endpoints.spectrum_file(&record.url_name(), &filename);
    report_progress(verbose, "Acquiring planetary spectrum", &url);

    let body = fetch_checked(gateway, &url)?;
    let table = parse_spectrum_table(&body, layout)?;

    tracing::debug!(file = %filename, rows = table.len(), "Parsed spectrum table");

    Ok(&*record.spectrum_table.insert(table))
}

/// Fetch the service's plot description for the planet's spectra
pub fn fetch_spectrum_plot<'r, G: Gateway + ?Sized>(
    gateway: &G,
    endpoints: &Endpoints,
    record: &'r mut PlanetRecord,
    verbose: bool,
) -> Result<&'r Value> {
    let url = endpoints.spectrum_plot(&record.url_name());
    report_progress(verbose, "Acquiring spectrum plot", &url);

    let body = fetch_checked(gateway, &url)?;
    let plot = decode_json(&url, &body)?;

    Ok(&*record.spectrum_plot.insert(plot))
}
