//! Planet record and the value types it carries

pub mod collection;
pub mod record;
pub mod spectrum;

pub use collection::{classify, Collection, MissionId};
pub use record::{normalize_name, AttributeMap, OrbitalElements, PlanetRecord, Properties};
pub use spectrum::{SpectrumLayout, SpectrumTable};
