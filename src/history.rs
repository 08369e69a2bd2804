//! Append-only prediction history.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::features::{Diagnosis, FEATURE_COUNT, FEATURE_NAMES, FeatureVector};
use crate::model::Prediction;

const RESULT_COLUMNS: [&str; 3] = ["prediction", "probability_benign", "probability_malignant"];

/// One persisted row: the input measurements plus the prediction outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub features: FeatureVector,
    pub prediction: Prediction,
}

/// Sole writer of the on-disk history store.
///
/// The recorder holds the append handle for its lifetime and `record` takes
/// `&mut self`, so all appends are serialized through one instance; a
/// deployment with concurrent sessions must share a single recorder rather
/// than open the file twice.
#[derive(Debug)]
pub struct HistoryRecorder {
    writer: csv::Writer<File>,
    path: PathBuf,
}

impl HistoryRecorder {
    /// Opens the store in append mode, creating it (and its directory) on
    /// first use. The header row is written only when the file is new or
    /// empty and is never repeated afterwards.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir)
                .map_err(|e| Error::persistence(format!("create {}: {e}", dir.display())))?;
        }

        let needs_header = match std::fs::metadata(path) {
            Ok(meta) => meta.len() == 0,
            Err(_) => true,
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| Error::persistence(format!("open {}: {e}", path.display())))?;
        let mut writer = csv::Writer::from_writer(file);

        if needs_header {
            writer
                .write_record(header_columns())
                .and_then(|()| writer.flush().map_err(csv::Error::from))
                .map_err(|e| Error::persistence(format!("write {}: {e}", path.display())))?;
        }

        Ok(HistoryRecorder {
            writer,
            path: path.to_path_buf(),
        })
    }

    /// Appends one row and flushes it, so an acknowledged prediction is on
    /// disk before control returns to the caller.
    pub fn record(&mut self, features: &FeatureVector, prediction: &Prediction) -> Result<()> {
        let mut row: Vec<String> = features.values().iter().map(|v| v.to_string()).collect();
        row.push(prediction.diagnosis.as_str().to_string());
        row.push(prediction.probability_benign.to_string());
        row.push(prediction.probability_malignant.to_string());

        self.writer
            .write_record(&row)
            .and_then(|()| self.writer.flush().map_err(csv::Error::from))
            .map_err(|e| Error::persistence(format!("append {}: {e}", self.path.display())))?;
        debug!(path = %self.path.display(), "appended prediction to history");
        Ok(())
    }

    /// Reads the whole store back, oldest first. A store that does not
    /// exist yet is an empty history, not an error.
    pub fn load(path: &Path) -> Result<Vec<HistoryEntry>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let mut rdr = csv::Reader::from_path(path)
            .map_err(|e| Error::persistence(format!("open {}: {e}", path.display())))?;

        let headers = rdr
            .headers()
            .map_err(|e| Error::persistence(format!("read {}: {e}", path.display())))?;
        if headers.iter().ne(header_columns()) {
            return Err(Error::schema_mismatch(format!(
                "{} does not look like a prediction history store",
                path.display()
            )));
        }

        let mut entries = Vec::new();
        for (i, record) in rdr.records().enumerate() {
            let line = i + 2;
            let record =
                record.map_err(|e| Error::input_validation(format!("row {line}: {e}")))?;

            let mut values = [0.0; FEATURE_COUNT];
            for (slot, v) in values.iter_mut().enumerate() {
                let cell = record.get(slot).unwrap_or("").trim();
                *v = cell.parse().map_err(|_| {
                    Error::input_validation(format!("row {line}: bad measurement `{cell}`"))
                })?;
            }

            let diagnosis = Diagnosis::from_name(record.get(FEATURE_COUNT).unwrap_or(""))
                .map_err(|e| Error::input_validation(format!("row {line}: {e}")))?;
            let probability_benign = parse_probability(&record, FEATURE_COUNT + 1, line)?;
            let probability_malignant = parse_probability(&record, FEATURE_COUNT + 2, line)?;

            entries.push(HistoryEntry {
                features: values.into(),
                prediction: Prediction {
                    diagnosis,
                    probability_benign,
                    probability_malignant,
                },
            });
        }
        Ok(entries)
    }
}

fn header_columns() -> impl Iterator<Item = &'static str> {
    FEATURE_NAMES.iter().copied().chain(RESULT_COLUMNS)
}

fn parse_probability(record: &csv::StringRecord, idx: usize, line: usize) -> Result<f64> {
    let cell = record.get(idx).unwrap_or("").trim();
    cell.parse()
        .map_err(|_| Error::input_validation(format!("row {line}: bad probability `{cell}`")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(value: f64, malignant: bool) -> (FeatureVector, Prediction) {
        let features: FeatureVector = [value; FEATURE_COUNT].into();
        let probability_malignant = if malignant { 0.9 } else { 0.1 };
        let prediction = Prediction {
            diagnosis: if malignant {
                Diagnosis::Malignant
            } else {
                Diagnosis::Benign
            },
            probability_benign: 1.0 - probability_malignant,
            probability_malignant,
        };
        (features, prediction)
    }

    fn line_count(path: &Path) -> usize {
        std::fs::read_to_string(path).unwrap().lines().count()
    }

    #[test]
    fn first_write_creates_store_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");

        let mut recorder = HistoryRecorder::open(&path).unwrap();
        let (features, prediction) = entry(1.0, false);
        recorder.record(&features, &prediction).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("radius_mean,"));
        assert!(text.contains("probability_malignant"));
        assert_eq!(line_count(&path), 2);
    }

    #[test]
    fn header_never_repeats_across_reopenings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");

        for i in 0..3 {
            let mut recorder = HistoryRecorder::open(&path).unwrap();
            let (features, prediction) = entry(i as f64, i % 2 == 1);
            recorder.record(&features, &prediction).unwrap();
        }

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches("radius_mean").count(), 1);
        assert_eq!(line_count(&path), 4);
    }

    #[test]
    fn load_round_trips_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");

        let mut recorder = HistoryRecorder::open(&path).unwrap();
        let (f1, p1) = entry(1.5, false);
        let (f2, p2) = entry(4.0, true);
        recorder.record(&f1, &p1).unwrap();
        recorder.record(&f2, &p2).unwrap();

        let entries = HistoryRecorder::load(&path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].features, f1);
        assert_eq!(entries[0].prediction, p1);
        assert_eq!(entries[1].prediction.diagnosis, Diagnosis::Malignant);
    }

    #[test]
    fn missing_store_is_empty_history() {
        let dir = tempfile::tempdir().unwrap();
        let entries = HistoryRecorder::load(&dir.path().join("absent.csv")).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn unwritable_path_is_a_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the store file should be.
        let err = HistoryRecorder::open(dir.path()).unwrap_err();
        assert!(matches!(err, Error::Persistence(_)));
    }

    #[test]
    fn foreign_file_is_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.csv");
        std::fs::write(&path, "a,b,c\n1,2,3\n").unwrap();
        let err = HistoryRecorder::load(&path).unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch(_)));
    }
}
