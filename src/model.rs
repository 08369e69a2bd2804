//! The pre-trained diagnosis classifier: training, artifact IO, inference.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use linfa::prelude::*;
use linfa_logistic::LogisticRegression;
use ndarray::{Array1, Array2};
use rmp_serde::{decode::from_read, encode::write_named};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dataset::TissueSample;
use crate::error::{Error, Result};
use crate::features::{Diagnosis, FEATURE_COUNT, FEATURE_NAMES, ScaledFeatureVector};
use crate::scaler::ScalingBounds;

/// Outcome of a single inference: a label plus the full class distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub diagnosis: Diagnosis,
    pub probability_benign: f64,
    pub probability_malignant: f64,
}

/// Binary logistic classifier over scaled measurements.
///
/// Holds the intercept and per-measurement weights extracted from a fitted
/// `linfa-logistic` model; the decision function is
/// `sigmoid(intercept + weights · x)` with Malignant as the positive class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosisModel {
    intercept: f64,
    weights: Vec<f64>,
}

impl DiagnosisModel {
    /// Wraps raw parameters, rejecting any weight count that does not match
    /// the canonical 30-measurement layout.
    pub fn new(intercept: f64, weights: Vec<f64>) -> Result<Self> {
        if weights.len() != FEATURE_COUNT {
            return Err(Error::ShapeMismatch(format!(
                "classifier carries {} weights, expected {FEATURE_COUNT}",
                weights.len()
            )));
        }
        Ok(DiagnosisModel { intercept, weights })
    }

    /// Fits the classifier on scaled training samples.
    ///
    /// Targets are encoded Benign = 0, Malignant = 1, so the positive class
    /// of the fitted model is Malignant.
    pub fn train(bounds: &ScalingBounds, samples: &[TissueSample]) -> Result<Self> {
        if samples.is_empty() {
            return Err(Error::input_validation(
                "cannot train the classifier on an empty dataset",
            ));
        }
        let mut rows = Vec::with_capacity(samples.len() * FEATURE_COUNT);
        let mut targets = Vec::with_capacity(samples.len());
        for sample in samples {
            rows.extend_from_slice(bounds.scale(&sample.features).values());
            targets.push(sample.diagnosis.code());
        }

        let x = Array2::from_shape_vec((samples.len(), FEATURE_COUNT), rows)
            .map_err(|e| Error::input_validation(format!("building training matrix: {e}")))?;
        let y = Array1::from_vec(targets);
        let dataset = Dataset::new(x, y);

        let fitted = LogisticRegression::default()
            .max_iterations(200)
            .fit(&dataset)
            .map_err(|e| Error::input_validation(format!("fitting classifier: {e}")))?;

        let model = DiagnosisModel::new(fitted.intercept(), fitted.params().to_vec())?;
        info!(samples = samples.len(), "trained diagnosis classifier");
        Ok(model)
    }

    /// Runs inference on one scaled sample. Pure and deterministic: the same
    /// input always produces the bit-identical result.
    pub fn predict(&self, scaled: &ScaledFeatureVector) -> Prediction {
        let z: f64 = self.intercept
            + self
                .weights
                .iter()
                .zip(scaled.values())
                .map(|(w, v)| w * v)
                .sum::<f64>();
        let probability_malignant = 1.0 / (1.0 + (-z).exp());
        let probability_benign = 1.0 - probability_malignant;
        let diagnosis = if probability_malignant >= 0.5 {
            Diagnosis::Malignant
        } else {
            Diagnosis::Benign
        };
        Prediction {
            diagnosis,
            probability_benign,
            probability_malignant,
        }
    }

    /// Measurements ranked by absolute weight, strongest first.
    pub fn top_weights(&self, n: usize) -> Vec<(&'static str, f64)> {
        let mut ranked: Vec<(&'static str, f64)> = FEATURE_NAMES
            .iter()
            .zip(&self.weights)
            .map(|(name, w)| (*name, *w))
            .collect();
        ranked.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
        ranked.truncate(n);
        ranked
    }

    /// Saves the classifier as a MessagePack artifact.
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
        info!(path = %path.display(), "saved classifier artifact");
        Ok(())
    }

    /// Loads a previously saved classifier, re-validating its layout.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| Error::ModelLoad(format!("open {}: {e}", path.display())))?;
        let decoded: DiagnosisModel = from_read(BufReader::new(file))
            .map_err(|e| Error::ModelLoad(format!("decode {}: {e}", path.display())))?;
        DiagnosisModel::new(decoded.intercept, decoded.weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureVector;

    /// Separable synthetic samples: benign measurements cluster around
    /// `1.0`, malignant around `3.0`.
    fn synthetic_samples(n: usize) -> Vec<TissueSample> {
        (0..n)
            .map(|i| {
                let malignant = i % 2 == 1;
                let base = if malignant { 3.0 } else { 1.0 };
                let mut values = [0.0; FEATURE_COUNT];
                for (j, v) in values.iter_mut().enumerate() {
                    *v = base + (i as f64) * 0.001 + (j as f64) * 0.01;
                }
                TissueSample {
                    features: values.into(),
                    diagnosis: if malignant {
                        Diagnosis::Malignant
                    } else {
                        Diagnosis::Benign
                    },
                }
            })
            .collect()
    }

    fn trained() -> (ScalingBounds, DiagnosisModel) {
        let samples = synthetic_samples(60);
        let bounds = ScalingBounds::fit(&samples).unwrap();
        let model = DiagnosisModel::train(&bounds, &samples).unwrap();
        (bounds, model)
    }

    #[test]
    fn probabilities_form_a_distribution() {
        let (bounds, model) = trained();
        let input: FeatureVector = [2.2; FEATURE_COUNT].into();
        let prediction = model.predict(&bounds.scale(&input));

        assert!(prediction.probability_benign >= 0.0 && prediction.probability_benign <= 1.0);
        assert!(
            prediction.probability_malignant >= 0.0 && prediction.probability_malignant <= 1.0
        );
        let total = prediction.probability_benign + prediction.probability_malignant;
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn label_is_consistent_with_probability() {
        let (bounds, model) = trained();
        for value in [0.5, 1.0, 2.0, 3.0, 3.5] {
            let prediction = model.predict(&bounds.scale(&[value; FEATURE_COUNT].into()));
            let expect_malignant = prediction.probability_malignant >= 0.5;
            assert_eq!(prediction.diagnosis == Diagnosis::Malignant, expect_malignant);
        }
    }

    #[test]
    fn separable_classes_are_recovered() {
        let (bounds, model) = trained();
        let benign = model.predict(&bounds.scale(&[1.1; FEATURE_COUNT].into()));
        let malignant = model.predict(&bounds.scale(&[3.1; FEATURE_COUNT].into()));
        assert_eq!(benign.diagnosis, Diagnosis::Benign);
        assert_eq!(malignant.diagnosis, Diagnosis::Malignant);
    }

    #[test]
    fn prediction_is_bit_for_bit_reproducible() {
        let (bounds, model) = trained();
        let input: FeatureVector = [2.0; FEATURE_COUNT].into();
        let first = model.predict(&bounds.scale(&input));
        let second = model.predict(&bounds.scale(&input));
        assert_eq!(
            first.probability_malignant.to_bits(),
            second.probability_malignant.to_bits()
        );
        assert_eq!(
            first.probability_benign.to_bits(),
            second.probability_benign.to_bits()
        );
    }

    #[test]
    fn rejects_wrong_weight_count() {
        let err = DiagnosisModel::new(0.0, vec![1.0; 5]).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch(_)));
    }

    #[test]
    fn artifact_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.msgpack");
        let (bounds, model) = trained();

        model.save(&path).unwrap();
        let loaded = DiagnosisModel::load(&path).unwrap();

        let input = bounds.scale(&[2.5; FEATURE_COUNT].into());
        assert_eq!(model.predict(&input), loaded.predict(&input));
    }

    #[test]
    fn load_fails_on_missing_artifact() {
        let err = DiagnosisModel::load(Path::new("no/such/model.msgpack")).unwrap_err();
        assert!(matches!(err, Error::ModelLoad(_)));
    }

    #[test]
    fn top_weights_are_ranked_by_magnitude() {
        let mut weights = vec![0.0; FEATURE_COUNT];
        weights[3] = -5.0;
        weights[7] = 2.0;
        let model = DiagnosisModel::new(0.0, weights).unwrap();

        let top = model.top_weights(2);
        assert_eq!(top[0].0, FEATURE_NAMES[3]);
        assert_eq!(top[1].0, FEATURE_NAMES[7]);
    }
}
