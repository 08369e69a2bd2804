//! Load-once inference session: scaler and classifier behind one handle.

use std::time::SystemTime;

use tracing::info;

use crate::config::AppConfig;
use crate::dataset::{TissueSample, load_reference_csv, train_test_split};
use crate::error::Result;
use crate::features::FeatureVector;
use crate::model::{DiagnosisModel, Prediction};
use crate::scaler::ScalingBounds;

/// Owns both read-only artifacts for the lifetime of a session.
///
/// Loaded once, fail-fast; artifacts are immutable afterwards, so sharing an
/// engine across readers needs no synchronization.
pub struct DiagnosisEngine {
    model: DiagnosisModel,
    bounds: ScalingBounds,
}

impl DiagnosisEngine {
    /// Loads both artifacts from disk. No retries: a missing or corrupt
    /// artifact fails the whole session up front.
    pub fn load(config: &AppConfig) -> Result<Self> {
        let bounds = ScalingBounds::load(&config.scaler_path)?;
        let model = DiagnosisModel::load(&config.model_path)?;
        Ok(DiagnosisEngine { model, bounds })
    }

    /// Load saved artifacts if up-to-date, or retrain if the dataset is newer.
    pub fn load_or_train_if_stale(config: &AppConfig, test_ratio: f64) -> Result<Self> {
        let artifact_mtime = config
            .model_path
            .metadata()
            .and_then(|m| m.modified())
            .and_then(|model| {
                config
                    .scaler_path
                    .metadata()
                    .and_then(|m| m.modified())
                    .map(|scaler| model.min(scaler))
            })
            .unwrap_or(SystemTime::UNIX_EPOCH);

        let dataset_mtime = config
            .dataset_path
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);

        let should_retrain = !config.model_path.exists()
            || !config.scaler_path.exists()
            || dataset_mtime > artifact_mtime;

        if should_retrain {
            info!("training classifier (dataset is newer or artifacts missing)");
            Self::train(config, test_ratio)
        } else {
            info!("loading saved artifacts (up-to-date)");
            Self::load(config)
        }
    }

    /// Trains from the reference dataset and saves both artifacts.
    ///
    /// Scaling bounds are derived from the full dataset; only the classifier
    /// fit uses the shuffled train split, with the held-out remainder kept
    /// for an accuracy estimate.
    pub fn train(config: &AppConfig, test_ratio: f64) -> Result<Self> {
        let samples = load_reference_csv(&config.dataset_path)?;
        let bounds = ScalingBounds::fit(&samples)?;

        let split = train_test_split(&samples, test_ratio);
        let model = DiagnosisModel::train(&bounds, &split.train)?;
        let engine = DiagnosisEngine { model, bounds };

        if !split.test.is_empty() {
            let accuracy = engine.evaluate_on(&split.test);
            info!(accuracy, held_out = split.test.len(), "evaluated held-out split");
        }

        engine.bounds.save(&config.scaler_path)?;
        engine.model.save(&config.model_path)?;
        Ok(engine)
    }

    /// One complete scale → infer pass for a single sample.
    pub fn predict(&self, features: &FeatureVector) -> Prediction {
        self.model.predict(&self.bounds.scale(features))
    }

    /// Calculates classification accuracy on labelled samples.
    pub fn evaluate_on(&self, samples: &[TissueSample]) -> f64 {
        let mut correct = 0;
        for sample in samples {
            if self.predict(&sample.features).diagnosis == sample.diagnosis {
                correct += 1;
            }
        }
        correct as f64 / samples.len() as f64
    }

    pub fn model(&self) -> &DiagnosisModel {
        &self.model
    }

    pub fn bounds(&self) -> &ScalingBounds {
        &self.bounds
    }
}
