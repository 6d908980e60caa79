//! Transmission/emission spectrum table

use crate::error::{ExomastError, Result};
use serde::{Deserialize, Serialize};

pub const WAVELENGTH: &str = "Wavelength (microns)";
pub const DELTA_WAVELENGTH: &str = "Delta Wavelength (microns)";
pub const RADIUS_RATIO_SQUARED: &str = "(Rp/Rs)^2";
pub const RADIUS_RATIO_SQUARED_ERR: &str = "(Rp/Rs)^2 +/-uncertainty";

/// Column layout of a spectrum file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpectrumLayout {
    /// wavelength, delta-wavelength, (Rp/Rs)^2, uncertainty
    #[default]
    WithDelta,
    /// wavelength, (Rp/Rs)^2, uncertainty
    WithoutDelta,
}

impl SpectrumLayout {
    pub fn header(self) -> Vec<String> {
        let mut header = vec![
            WAVELENGTH.to_string(),
            DELTA_WAVELENGTH.to_string(),
            RADIUS_RATIO_SQUARED.to_string(),
            RADIUS_RATIO_SQUARED_ERR.to_string(),
        ];
        if self == SpectrumLayout::WithoutDelta {
            header.remove(1);
        }
        header
    }
}

/// Row-major table of floating point samples, one row per wavelength
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrumTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl SpectrumTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Copy of one column's values
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[idx]).collect())
    }

    /// `(wavelength, (Rp/Rs)^2, uncertainty)` columns for an error-bar plot
    pub fn errorbar_series(&self) -> Result<(Vec<f64>, Vec<f64>, Vec<f64>)> {
        let pick = |name: &str| {
            self.column(name)
                .ok_or_else(|| ExomastError::Decode(format!("spectrum has no {:?} column", name)))
        };

        Ok((
            pick(WAVELENGTH)?,
            pick(RADIUS_RATIO_SQUARED)?,
            pick(RADIUS_RATIO_SQUARED_ERR)?,
        ))
    }
}
