//! Per-planet client handle
//!
//! Construction classifies the name, resolves identifiers, then either
//! loads the cached record for the canonical name or fetches properties
//! and saves them. Spectra and mission data are fetched only when asked for.
//!
//! A handle is meant for one thread at a time; callers that want
//! concurrency create one handle per planet.

use crate::error::{ExomastError, Result};
use crate::models::{AttributeMap, PlanetRecord, SpectrumLayout, SpectrumTable};
use crate::services::{
    identity_resolver, mission_data, property_aggregator, spectrum_fetcher, Endpoints, Gateway,
    HttpGateway, PersistenceCache, PropertiesOutcome, Resolution,
};
use exomast_common::config::{ServiceSettings, SettingsOverrides, SettingsResolver};
use serde_json::Value;
use std::path::PathBuf;
use tracing::{info, warn};

/// How the record's properties were obtained during construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Loaded from the cache file for the canonical name
    Hit,
    /// No cache file; fetched and saved
    Miss,
    /// Cache file from another format version; fetched and overwritten
    Stale,
    /// Construction skipped identifiers, properties and the cache
    Deferred,
}

/// Construction options
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    pub settings: ServiceSettings,
    /// Report progress at INFO instead of DEBUG
    pub verbose: bool,
    /// Skip identifiers, properties and cache on construction
    pub quickstart: bool,
}

/// Client handle owning one [`PlanetRecord`]
pub struct ExoMastClient<G: Gateway = HttpGateway> {
    gateway: G,
    endpoints: Endpoints,
    cache: PersistenceCache,
    record: PlanetRecord,
    verbose: bool,
    cache_status: CacheStatus,
}

impl ExoMastClient<HttpGateway> {
    /// Resolve settings from the environment and config file, then construct
    pub fn new(planet_name: &str) -> Result<Self> {
        let settings = SettingsResolver::new().resolve(&SettingsOverrides::default())?;
        Self::with_options(
            planet_name,
            ClientOptions {
                settings,
                ..Default::default()
            },
        )
    }

    pub fn with_options(planet_name: &str, options: ClientOptions) -> Result<Self> {
        let gateway = HttpGateway::from_settings(&options.settings)?;
        Self::with_gateway(planet_name, gateway, options)
    }
}

impl<G: Gateway> ExoMastClient<G> {
    /// Construct over a caller-supplied gateway
    pub fn with_gateway(planet_name: &str, gateway: G, options: ClientOptions) -> Result<Self> {
        let endpoints = Endpoints::from_settings(&options.settings);
        let record = PlanetRecord::new(planet_name);

        if options.verbose {
            info!(
                api = %endpoints.base(),
                planet = %planet_name,
                collection = %record.collection(),
                "Allocating planetary information"
            );
        }

        let mut client = Self {
            gateway,
            endpoints,
            cache: PersistenceCache::new(options.settings.cache_dir),
            record,
            verbose: options.verbose,
            cache_status: CacheStatus::Deferred,
        };

        if !options.quickstart {
            client.initialize()?;
        }

        Ok(client)
    }

    fn initialize(&mut self) -> Result<()> {
        self.get_identifiers(0)?;

        let canonical_name = self.record.canonical_name().to_string();
        self.cache_status = CacheStatus::Miss;

        if self.cache.contains(&canonical_name) {
            match self.cache.load(&canonical_name, self.verbose) {
                Ok(cached) => {
                    self.record.absorb_cached(cached);
                    self.cache_status = CacheStatus::Hit;
                    return Ok(());
                }
                Err(ExomastError::StaleCache { path, found, expected }) => {
                    warn!(
                        path = %path.display(),
                        found,
                        expected,
                        "Discarding cache entry from another format version"
                    );
                    self.cache_status = CacheStatus::Stale;
                }
                Err(e) => return Err(e),
            }
        }

        self.get_properties(0)?;
        self.save()?;
        Ok(())
    }

    pub fn record(&self) -> &PlanetRecord {
        &self.record
    }

    pub fn into_record(self) -> PlanetRecord {
        self.record
    }

    pub fn cache_status(&self) -> CacheStatus {
        self.cache_status
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn cache(&self) -> &PersistenceCache {
        &self.cache
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Look up identifiers; `index` picks the entry for ambiguous names
    pub fn get_identifiers(&mut self, index: usize) -> Result<Resolution> {
        identity_resolver::resolve_identifiers(
            &self.gateway,
            &self.endpoints,
            &mut self.record,
            index,
            self.verbose,
        )
    }

    /// Replace the record's properties with a fresh fetch
    pub fn get_properties(&mut self, index: usize) -> Result<PropertiesOutcome> {
        property_aggregator::fetch_properties(
            &self.gateway,
            &self.endpoints,
            &mut self.record,
            index,
            self.verbose,
        )
    }

    pub fn get_spectra_filelist(&mut self) -> Result<&[String]> {
        spectrum_fetcher::fetch_spectrum_filelist(
            &self.gateway,
            &self.endpoints,
            &mut self.record,
            self.verbose,
        )
    }

    pub fn get_spectrum(&mut self, index: usize, layout: SpectrumLayout) -> Result<&SpectrumTable> {
        spectrum_fetcher::fetch_spectrum(
            &self.gateway,
            &self.endpoints,
            &mut self.record,
            index,
            layout,
            self.verbose,
        )
    }

    pub fn get_spectrum_plot(&mut self) -> Result<&Value> {
        spectrum_fetcher::fetch_spectrum_plot(
            &self.gateway,
            &self.endpoints,
            &mut self.record,
            self.verbose,
        )
    }

    pub fn get_tce(&mut self) -> Result<&Value> {
        mission_data::fetch_tce(&self.gateway, &self.endpoints, &mut self.record, self.verbose)
    }

    pub fn get_metadata(&mut self, tce_index: u32) -> Result<&AttributeMap> {
        mission_data::fetch_metadata(&self.gateway, &self.endpoints, &mut self.record, tce_index)
    }

    pub fn get_detrended_table(&mut self, tce_index: u32) -> Result<&Value> {
        mission_data::fetch_detrended_table(
            &self.gateway,
            &self.endpoints,
            &mut self.record,
            tce_index,
            self.verbose,
        )
    }

    pub fn get_phase_plot(&mut self, tce_index: u32, embed: bool) -> Result<&Value> {
        mission_data::fetch_phase_plot(
            &self.gateway,
            &self.endpoints,
            &mut self.record,
            tce_index,
            embed,
            self.verbose,
        )
    }

    /// Persist the whole record under its canonical name
    pub fn save(&self) -> Result<PathBuf> {
        self.cache.save(&self.record, self.verbose)
    }

    /// Replace the record with the cached copy for its canonical name
    pub fn load(&mut self) -> Result<()> {
        let cached = self.cache.load(self.record.canonical_name(), self.verbose)?;
        self.record.absorb_cached(cached);
        Ok(())
    }
}
