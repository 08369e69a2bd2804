//! Reference dataset loading and train/test splitting.

use std::fs::File;
use std::path::Path;

use rand::rng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::error::{Error, Result};
use crate::features::{Diagnosis, FEATURE_COUNT, FEATURE_NAMES, FeatureVector};

/// One labelled row of the reference dataset.
#[derive(Debug, Clone)]
pub struct TissueSample {
    pub features: FeatureVector,
    pub diagnosis: Diagnosis,
}

/// A helper type for holding train/test splits.
#[derive(Debug)]
pub struct DatasetSplit {
    pub train: Vec<TissueSample>,
    pub test: Vec<TissueSample>,
}

/// Randomly splits a dataset into train and test sets based on `test_ratio`.
pub fn train_test_split(samples: &[TissueSample], test_ratio: f64) -> DatasetSplit {
    let mut rng = rng();
    let mut data = samples.to_vec();
    data.shuffle(&mut rng);

    let test_size = ((data.len() as f64) * test_ratio).round() as usize;
    let test = data[..test_size].to_vec();
    let train = data[test_size..].to_vec();

    DatasetSplit { train, test }
}

/// Loads the reference CSV: a `diagnosis` column holding `M`/`B` plus the 30
/// measurement columns. An `id` column and an unnamed trailing column may be
/// present and are dropped, matching the shape the dataset ships in.
pub fn load_reference_csv(path: &Path) -> Result<Vec<TissueSample>> {
    let file = File::open(path)
        .map_err(|e| Error::persistence(format!("open {}: {e}", path.display())))?;
    let mut rdr = csv::Reader::from_reader(file);
    let headers = rdr
        .headers()
        .map_err(|e| Error::persistence(format!("read {}: {e}", path.display())))?
        .clone();

    let diagnosis_idx = headers
        .iter()
        .position(|h| h == "diagnosis")
        .ok_or_else(|| Error::schema_mismatch("reference dataset has no `diagnosis` column"))?;
    let mut feature_idx = [0usize; FEATURE_COUNT];
    for (slot, name) in FEATURE_NAMES.iter().enumerate() {
        feature_idx[slot] = headers
            .iter()
            .position(|h| h == *name)
            .ok_or_else(|| {
                Error::schema_mismatch(format!("reference dataset is missing column `{name}`"))
            })?;
    }

    let mut samples = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let line = i + 2;
        let record =
            record.map_err(|e| Error::input_validation(format!("row {line}: {e}")))?;

        let label = record.get(diagnosis_idx).unwrap_or("").trim();
        let diagnosis = Diagnosis::from_dataset_label(label)
            .map_err(|e| Error::input_validation(format!("row {line}: {e}")))?;

        let mut values = [0.0; FEATURE_COUNT];
        for (slot, &idx) in feature_idx.iter().enumerate() {
            let cell = record.get(idx).unwrap_or("").trim();
            values[slot] = cell.parse().map_err(|_| {
                Error::input_validation(format!(
                    "row {line}: `{cell}` is not a number in {}",
                    FEATURE_NAMES[slot]
                ))
            })?;
        }
        samples.push(TissueSample {
            features: values.into(),
            diagnosis,
        });
    }
    debug!(count = samples.len(), path = %path.display(), "loaded reference dataset");
    Ok(samples)
}
