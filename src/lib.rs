//! # cyto2diagnosis 🔬🎗️
//!
//! Classify breast tissue measurements as benign or malignant.
//!
//! The crate wraps a logistic-regression classifier (fitted with
//! [`linfa-logistic`](https://crates.io/crates/linfa-logistic)) over the 30
//! cytology measurements of the Wisconsin breast-cancer dataset. Raw inputs
//! are min-max scaled against bounds derived from the reference dataset,
//! scored, and every prediction is appended to a durable history store.
//!
//! ## Features
//! - Fixed 30-measurement vocabulary shared by scaler, classifier and stores
//! - Min-max scaling with dataset-derived bounds
//! - Label + probability-pair prediction
//! - Artifact persistence with `rmp-serde` (MessagePack)
//! - Auto-retrain when the reference CSV is updated
//! - Append-only prediction history with a single-writer recorder
//! - Whole-file batch scoring with strict schema validation
//! - Benchmarkable with [Criterion](https://crates.io/crates/criterion)
//!
//! ## Example
//! ```no_run
//! use cyto2diagnosis::{AppConfig, DiagnosisEngine, FeatureVector, HistoryRecorder};
//!
//! # fn run() -> cyto2diagnosis::Result<()> {
//! let config = AppConfig::default();
//! let engine = DiagnosisEngine::load_or_train_if_stale(&config, 0.2)?;
//!
//! let features = FeatureVector::from_ordered(vec![14.0; 30])?;
//! let prediction = engine.predict(&features);
//! println!(
//!     "Diagnosis: {}, P_malignant: {:.2}",
//!     prediction.diagnosis.as_str(),
//!     prediction.probability_malignant
//! );
//!
//! let mut history = HistoryRecorder::open(&config.history_path)?;
//! history.record(&features, &prediction)?;
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod features;
pub mod history;
pub mod model;
pub mod scaler;

pub use config::AppConfig;
pub use dataset::{DatasetSplit, TissueSample, load_reference_csv, train_test_split};
pub use engine::DiagnosisEngine;
pub use error::{Error, Result};
pub use features::{Diagnosis, FEATURE_COUNT, FEATURE_NAMES, FeatureVector, ScaledFeatureVector};
pub use history::{HistoryEntry, HistoryRecorder};
pub use model::{DiagnosisModel, Prediction};
pub use scaler::ScalingBounds;
