//! exoMAST API client
//!
//! Resolves a free-form planet name to the archive's canonical name,
//! materializes identifiers and properties into a [`PlanetRecord`], caches
//! that record on disk, and fetches spectra and Kepler/TESS data-validation
//! products on demand.
//!
//! ```no_run
//! use exomast::ExoMastClient;
//!
//! let mut planet = ExoMastClient::new("HD 189733 b")?;
//! println!("{:?}", planet.record().properties().rp_rs());
//! let spectrum = planet.get_spectrum(0, Default::default())?;
//! println!("{} samples", spectrum.len());
//! # Ok::<(), exomast::ExomastError>(())
//! ```

pub mod client;
pub mod error;
pub mod models;
pub mod report;
pub mod services;

pub use crate::client::{CacheStatus, ClientOptions, ExoMastClient};
pub use crate::error::{ExomastError, Result};
pub use crate::models::{
    Collection, MissionId, OrbitalElements, PlanetRecord, Properties, SpectrumLayout,
    SpectrumTable,
};
pub use crate::services::{Gateway, HttpGateway, PropertiesOutcome, Resolution};
