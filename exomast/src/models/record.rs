//! Per-planet record materialized from the exoMAST endpoints

use super::collection::{classify, Collection, MissionId};
use super::spectrum::SpectrumTable;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Flattened server payload, keyed by attribute name
pub type AttributeMap = BTreeMap<String, Value>;

/// Planet properties with typed accessors for the transit-model fields
///
/// Keys are stored with '/' replaced by '_'. Values computed locally rather
/// than returned by the service are listed in [`Properties::derived_keys`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    fields: AttributeMap,
    #[serde(default)]
    derived: BTreeSet<String>,
}

impl Properties {
    pub(crate) fn from_fields(fields: AttributeMap) -> Self {
        Self {
            fields,
            derived: BTreeSet::new(),
        }
    }

    pub(crate) fn insert_derived(&mut self, key: &str, value: f64) {
        self.fields.insert(key.to_string(), Value::from(value));
        self.derived.insert(key.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Numeric value of `key`; `None` when absent, null, or not a number
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(Value::as_f64)
    }

    /// True when `key` is present with a non-null value
    pub fn has_value(&self, key: &str) -> bool {
        self.fields.get(key).is_some_and(|v| !v.is_null())
    }

    pub fn fields(&self) -> &AttributeMap {
        &self.fields
    }

    pub fn is_derived(&self, key: &str) -> bool {
        self.derived.contains(key)
    }

    pub fn derived_keys(&self) -> impl Iterator<Item = &str> {
        self.derived.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Planet radius in Jupiter radii
    pub fn rp(&self) -> Option<f64> {
        self.get_f64("Rp")
    }

    /// Stellar radius in solar radii
    pub fn rs(&self) -> Option<f64> {
        self.get_f64("Rs")
    }

    /// Planet-to-star radius ratio, served or derived
    pub fn rp_rs(&self) -> Option<f64> {
        self.get_f64("Rp_Rs")
    }

    pub fn transit_depth(&self) -> Option<f64> {
        self.get_f64("transit_depth")
    }

    pub fn transit_time(&self) -> Option<f64> {
        self.get_f64("transit_time")
    }

    pub fn orbital_period(&self) -> Option<f64> {
        self.get_f64("orbital_period")
    }

    /// Semi-major axis in stellar radii
    pub fn a_rs(&self) -> Option<f64> {
        self.get_f64("a_Rs")
    }

    pub fn impact_parameter(&self) -> Option<f64> {
        self.get_f64("impact_parameter")
    }

    /// Inclination in degrees
    pub fn inclination(&self) -> Option<f64> {
        self.get_f64("inclination")
    }

    pub fn transit_duration(&self) -> Option<f64> {
        self.get_f64("transit_duration")
    }

    pub fn eccentricity(&self) -> Option<f64> {
        self.get_f64("eccentricity")
    }

    /// Argument of periastron in degrees
    pub fn omega(&self) -> Option<f64> {
        self.get_f64("omega")
    }

    pub fn orbit(&self) -> OrbitalElements {
        OrbitalElements {
            transit_time: self.transit_time(),
            orbital_period: self.orbital_period(),
            a_rs: self.a_rs(),
            rp_rs: self.rp_rs(),
            impact_parameter: self.impact_parameter(),
            inclination: self.inclination(),
            transit_duration: self.transit_duration(),
            eccentricity: self.eccentricity(),
            omega: self.omega(),
        }
    }
}

/// Orbit and transit parameters handed to a light-curve model
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OrbitalElements {
    pub transit_time: Option<f64>,
    pub orbital_period: Option<f64>,
    pub a_rs: Option<f64>,
    pub rp_rs: Option<f64>,
    pub impact_parameter: Option<f64>,
    pub inclination: Option<f64>,
    pub transit_duration: Option<f64>,
    pub eccentricity: Option<f64>,
    pub omega: Option<f64>,
}

/// Everything known about one planet
///
/// `input_name`, `collection` and `mission_id` are fixed at construction.
/// `canonical_name` changes at most once, when the identifiers endpoint
/// supplies a canonical form. Every other field starts empty and is filled
/// by the fetch that owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetRecord {
    pub(crate) input_name: String,
    pub(crate) canonical_name: String,
    #[serde(default)]
    pub(crate) canonicalized: bool,
    pub(crate) collection: Collection,
    pub(crate) mission_id: Option<MissionId>,
    pub(crate) identifiers: AttributeMap,
    pub(crate) properties: Properties,
    pub(crate) spectrum_files: Option<Vec<String>>,
    pub(crate) spectrum_table: Option<SpectrumTable>,
    pub(crate) spectrum_plot: Option<Value>,
    pub(crate) tce: Option<Value>,
    pub(crate) metadata: Option<Value>,
    pub(crate) metadata_attributes: AttributeMap,
    pub(crate) detrended_table: Option<Value>,
    pub(crate) phase_plot: Option<Value>,
}

impl PlanetRecord {
    pub fn new(input_name: &str) -> Self {
        let (collection, mission_id) = classify(input_name);

        Self {
            input_name: input_name.to_string(),
            canonical_name: normalize_name(input_name),
            canonicalized: false,
            collection,
            mission_id,
            identifiers: AttributeMap::new(),
            properties: Properties::default(),
            spectrum_files: None,
            spectrum_table: None,
            spectrum_plot: None,
            tce: None,
            metadata: None,
            metadata_attributes: AttributeMap::new(),
            detrended_table: None,
            phase_plot: None,
        }
    }

    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    pub fn canonical_name(&self) -> &str {
        &self.canonical_name
    }

    /// True once the service has confirmed or supplied the canonical name
    pub fn is_canonicalized(&self) -> bool {
        self.canonicalized
    }

    /// Percent-escaped working name used in every request URL
    pub fn url_name(&self) -> String {
        urlencoding::encode(&self.canonical_name).into_owned()
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    pub fn mission_id(&self) -> Option<&MissionId> {
        self.mission_id.as_ref()
    }

    pub fn identifiers(&self) -> &AttributeMap {
        &self.identifiers
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn spectrum_files(&self) -> Option<&[String]> {
        self.spectrum_files.as_deref()
    }

    pub fn spectrum_table(&self) -> Option<&SpectrumTable> {
        self.spectrum_table.as_ref()
    }

    pub fn spectrum_plot(&self) -> Option<&Value> {
        self.spectrum_plot.as_ref()
    }

    pub fn tce(&self) -> Option<&Value> {
        self.tce.as_ref()
    }

    pub fn metadata(&self) -> Option<&Value> {
        self.metadata.as_ref()
    }

    /// Metadata keys with spaces replaced by underscores
    pub fn metadata_attributes(&self) -> &AttributeMap {
        &self.metadata_attributes
    }

    pub fn detrended_table(&self) -> Option<&Value> {
        self.detrended_table.as_ref()
    }

    pub fn phase_plot(&self) -> Option<&Value> {
        self.phase_plot.as_ref()
    }

    /// Replace every field with the cached copy except the ones derived
    /// from this handle's input name.
    pub(crate) fn absorb_cached(&mut self, cached: PlanetRecord) {
        let input_name = std::mem::take(&mut self.input_name);
        let collection = self.collection;
        let mission_id = self.mission_id.take();

        *self = cached;
        self.input_name = input_name;
        self.collection = collection;
        self.mission_id = mission_id;
    }
}

/// Trim and collapse whitespace runs to a single space
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}
