//! Min-max normalization against dataset-derived bounds.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use rmp_serde::{decode::from_read, encode::write_named};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dataset::TissueSample;
use crate::error::{Error, Result};
use crate::features::{FEATURE_COUNT, FeatureVector, ScaledFeatureVector};

/// Per-measurement (min, max), derived once from the FULL reference dataset.
///
/// Every inference path, single-record and batch alike, scales against the
/// same bounds; deriving bounds from an uploaded batch would make
/// predictions drift between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingBounds {
    mins: [f64; FEATURE_COUNT],
    maxs: [f64; FEATURE_COUNT],
}

impl ScalingBounds {
    /// Derives bounds from the reference dataset.
    pub fn fit(samples: &[TissueSample]) -> Result<Self> {
        if samples.is_empty() {
            return Err(Error::input_validation(
                "cannot derive scaling bounds from an empty dataset",
            ));
        }
        let mut mins = [f64::INFINITY; FEATURE_COUNT];
        let mut maxs = [f64::NEG_INFINITY; FEATURE_COUNT];
        for sample in samples {
            for (i, v) in sample.features.values().iter().enumerate() {
                mins[i] = mins[i].min(*v);
                maxs[i] = maxs[i].max(*v);
            }
        }
        Ok(ScalingBounds { mins, maxs })
    }

    /// `(value - min) / (max - min)` per measurement.
    ///
    /// A zero-width range maps to 0.0 instead of dividing by zero. Inputs
    /// outside the reference range scale outside [0, 1]; that is accepted.
    pub fn scale(&self, raw: &FeatureVector) -> ScaledFeatureVector {
        let mut out = [0.0; FEATURE_COUNT];
        for (i, v) in raw.values().iter().enumerate() {
            let width = self.maxs[i] - self.mins[i];
            out[i] = if width == 0.0 {
                0.0
            } else {
                (v - self.mins[i]) / width
            };
        }
        ScaledFeatureVector(out)
    }

    /// Inverts [`scale`](Self::scale). Degenerate measurements recover
    /// their `min` (the information is gone after scaling).
    pub fn unscale(&self, scaled: &ScaledFeatureVector) -> FeatureVector {
        let mut out = [0.0; FEATURE_COUNT];
        for (i, v) in scaled.values().iter().enumerate() {
            out[i] = self.mins[i] + v * (self.maxs[i] - self.mins[i]);
        }
        out.into()
    }

    /// Saves the bounds as a MessagePack artifact.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir)
                .map_err(|e| Error::persistence(format!("create {}: {e}", dir.display())))?;
        }
        let file = File::create(path)
            .map_err(|e| Error::persistence(format!("create {}: {e}", path.display())))?;
        let mut writer = BufWriter::new(file);
        write_named(&mut writer, self)
            .map_err(|e| Error::persistence(format!("encode {}: {e}", path.display())))?;
        info!(path = %path.display(), "saved scaler artifact");
        Ok(())
    }

    /// Loads a previously saved bounds artifact.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| Error::ModelLoad(format!("open {}: {e}", path.display())))?;
        from_read(BufReader::new(file))
            .map_err(|e| Error::ModelLoad(format!("decode {}: {e}", path.display())))
    }
}
