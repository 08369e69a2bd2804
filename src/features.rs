//! Measurement vocabulary shared by every component.
//!
//! The classifier, the scaler, the history store and the batch path all
//! address features through [`FEATURE_NAMES`]; nothing in the crate relies
//! on map iteration order.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Number of cytology measurements describing one tissue sample.
pub const FEATURE_COUNT: usize = 30;

/// Canonical measurement order expected by the trained classifier.
///
/// Matches the column names of the reference dataset (including the space
/// in the `concave points` measurements).
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "radius_mean",
    "texture_mean",
    "perimeter_mean",
    "area_mean",
    "smoothness_mean",
    "compactness_mean",
    "concavity_mean",
    "concave points_mean",
    "symmetry_mean",
    "fractal_dimension_mean",
    "radius_se",
    "texture_se",
    "perimeter_se",
    "area_se",
    "smoothness_se",
    "compactness_se",
    "concavity_se",
    "concave points_se",
    "symmetry_se",
    "fractal_dimension_se",
    "radius_worst",
    "texture_worst",
    "perimeter_worst",
    "area_worst",
    "smoothness_worst",
    "compactness_worst",
    "concavity_worst",
    "concave points_worst",
    "symmetry_worst",
    "fractal_dimension_worst",
];

/// Binary diagnosis outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Diagnosis {
    Benign,
    Malignant,
}

impl Diagnosis {
    /// Dataset label code: Benign = 0, Malignant = 1.
    pub fn code(self) -> usize {
        match self {
            Diagnosis::Benign => 0,
            Diagnosis::Malignant => 1,
        }
    }

    /// Single-letter label used by the reference dataset (`B`/`M`).
    pub fn from_dataset_label(label: &str) -> Result<Self> {
        match label {
            "B" => Ok(Diagnosis::Benign),
            "M" => Ok(Diagnosis::Malignant),
            other => Err(Error::input_validation(format!(
                "unknown diagnosis label `{other}` (expected `M` or `B`)"
            ))),
        }
    }

    /// Full name used in history and batch output rows.
    pub fn as_str(self) -> &'static str {
        match self {
            Diagnosis::Benign => "Benign",
            Diagnosis::Malignant => "Malignant",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "Benign" => Ok(Diagnosis::Benign),
            "Malignant" => Ok(Diagnosis::Malignant),
            other => Err(Error::input_validation(format!(
                "unknown prediction label `{other}`"
            ))),
        }
    }
}

/// The 30 raw measurements of one tissue sample, in canonical order.
///
/// Can only be built through validating constructors, so a vector with a
/// wrong or reordered layout cannot exist.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    /// Builds a vector from a name → value map.
    ///
    /// Unknown keys are ignored; any missing canonical key is fatal.
    pub fn from_map(values: &HashMap<String, f64>) -> Result<Self> {
        let mut out = [0.0; FEATURE_COUNT];
        let mut missing = Vec::new();
        for (slot, name) in FEATURE_NAMES.iter().enumerate() {
            match values.get(*name) {
                Some(v) => out[slot] = *v,
                None => missing.push(*name),
            }
        }
        if !missing.is_empty() {
            return Err(Error::input_validation(format!(
                "missing measurement(s): {}",
                missing.join(", ")
            )));
        }
        Ok(FeatureVector(out))
    }

    /// Builds a vector from values already in canonical order.
    pub fn from_ordered(values: Vec<f64>) -> Result<Self> {
        let values: [f64; FEATURE_COUNT] = values.try_into().map_err(|v: Vec<f64>| {
            Error::ShapeMismatch(format!(
                "got {} measurements, expected {FEATURE_COUNT}",
                v.len()
            ))
        })?;
        Ok(FeatureVector(values))
    }

    /// Value of a single named measurement.
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| self.0[i])
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }
}

impl From<[f64; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f64; FEATURE_COUNT]) -> Self {
        FeatureVector(values)
    }
}

/// Measurements after min-max normalization. Distinct from
/// [`FeatureVector`] so the classifier cannot be fed raw values by mistake.
///
/// Values may fall outside [0, 1] when the input lies outside the range the
/// bounds were derived from; that is accepted, not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledFeatureVector(pub(crate) [f64; FEATURE_COUNT]);

impl ScaledFeatureVector {
    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }
}
