//! Components that talk to the exoMAST API or persist its results
//!
//! Each fetcher takes the gateway, the endpoint table and the record it
//! fills. None of them retries; the first failure is returned.

pub mod decoder;
pub mod endpoints;
pub mod gateway;
pub mod identity_resolver;
pub mod mission_data;
pub mod persistence_cache;
pub mod property_aggregator;
pub mod spectrum_fetcher;

pub use decoder::{parse_spectrum_table, JsonPayload};
pub use endpoints::Endpoints;
pub use gateway::{Gateway, HttpGateway};
pub use identity_resolver::Resolution;
pub use mission_data::DEFAULT_TCE_INDEX;
pub use persistence_cache::{PersistenceCache, CACHE_FORMAT_VERSION};
pub use property_aggregator::{PropertiesOutcome, JUPITER_RADIUS_IN_SOLAR_RADII};

/// Progress line for a request: INFO when verbose, DEBUG otherwise
pub(crate) fn report_progress(verbose: bool, action: &str, url: &str) {
    if verbose {
        tracing::info!(url = %url, "{}", action);
    } else {
        tracing::debug!(url = %url, "{}", action);
    }
}
