//! Whole-file scoring: validate the uploaded table, scale each row with the
//! dataset-derived bounds, and write the annotated result table.

use std::path::Path;

use tracing::info;

use crate::engine::DiagnosisEngine;
use crate::error::{Error, Result};
use crate::features::{FEATURE_COUNT, FEATURE_NAMES, FeatureVector};
use crate::model::Prediction;

/// One uploaded row with its inference outcome attached.
#[derive(Debug, Clone)]
pub struct ScoredRow {
    pub features: FeatureVector,
    pub prediction: Prediction,
}

/// Scores every row of `input` and writes the augmented table to `output`,
/// replacing any previous run's file wholesale.
///
/// The batch either succeeds completely or fails completely: validation
/// rejects the whole file before any row is scored, and nothing is written
/// on failure.
pub fn predict_file(
    engine: &DiagnosisEngine,
    input: &Path,
    output: &Path,
) -> Result<Vec<ScoredRow>> {
    let rows = read_batch(input)?;
    let scored: Vec<ScoredRow> = rows
        .into_iter()
        .map(|features| {
            let prediction = engine.predict(&features);
            ScoredRow {
                features,
                prediction,
            }
        })
        .collect();
    write_batch(output, &scored)?;
    info!(rows = scored.len(), output = %output.display(), "batch scoring complete");
    Ok(scored)
}

/// Reads an uploaded table. Unlike the reference dataset, an upload carries
/// no `diagnosis` or `id` column: the header must be exactly the 30
/// canonical measurement names, in order.
pub fn read_batch(path: &Path) -> Result<Vec<FeatureVector>> {
    let mut rdr = csv::Reader::from_path(path)
        .map_err(|e| Error::persistence(format!("open {}: {e}", path.display())))?;

    let headers = rdr
        .headers()
        .map_err(|e| Error::BatchValidation(format!("read {}: {e}", path.display())))?;
    if headers.len() != FEATURE_COUNT || headers.iter().zip(FEATURE_NAMES).any(|(h, want)| h != want)
    {
        return Err(Error::schema_mismatch(format!(
            "batch columns must be exactly the {FEATURE_COUNT} canonical measurements in order \
             (got {} columns)",
            headers.len()
        )));
    }

    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let line = i + 2;
        let record =
            record.map_err(|e| Error::BatchValidation(format!("row {line}: {e}")))?;
        let mut values = [0.0; FEATURE_COUNT];
        for (slot, v) in values.iter_mut().enumerate() {
            let cell = record.get(slot).unwrap_or("").trim();
            *v = cell.parse().map_err(|_| {
                Error::BatchValidation(format!(
                    "row {line}: `{cell}` is not a number in {}",
                    FEATURE_NAMES[slot]
                ))
            })?;
        }
        rows.push(values.into());
    }
    Ok(rows)
}

fn write_batch(path: &Path, rows: &[ScoredRow]) -> Result<()> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        std::fs::create_dir_all(dir)
            .map_err(|e| Error::persistence(format!("create {}: {e}", dir.display())))?;
    }
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| Error::persistence(format!("create {}: {e}", path.display())))?;

    let header: Vec<&str> = FEATURE_NAMES
        .iter()
        .copied()
        .chain(["prediction", "probability_benign", "probability_malignant"])
        .collect();
    writer
        .write_record(&header)
        .map_err(|e| Error::persistence(format!("write {}: {e}", path.display())))?;

    for row in rows {
        let mut cells: Vec<String> =
            row.features.values().iter().map(|v| v.to_string()).collect();
        cells.push(row.prediction.diagnosis.as_str().to_string());
        cells.push(row.prediction.probability_benign.to_string());
        cells.push(row.prediction.probability_malignant.to_string());
        writer
            .write_record(&cells)
            .map_err(|e| Error::persistence(format!("write {}: {e}", path.display())))?;
    }
    writer
        .flush()
        .map_err(|e| Error::persistence(format!("flush {}: {e}", path.display())))?;
    Ok(())
}
