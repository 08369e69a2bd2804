//! Fixed file locations, overridable from a small TOML file.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Where the dataset, artifacts and stores live.
///
/// Defaults mirror the layout the original deployment used; a
/// `cyto2diagnosis.toml` next to the binary can override any subset.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub dataset_path: PathBuf,
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
    pub history_path: PathBuf,
    pub batch_output_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            dataset_path: PathBuf::from("data/data.csv"),
            model_path: PathBuf::from("model/model.msgpack"),
            scaler_path: PathBuf::from("model/scaler.msgpack"),
            history_path: PathBuf::from("data/prediction_history.csv"),
            batch_output_path: PathBuf::from("data/predictions_from_file.csv"),
        }
    }
}

impl AppConfig {
    /// Reads the TOML config if present; an absent file means defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => toml::from_str(&text).map_err(|e| {
                Error::input_validation(format!("config {}: {e}", path.display()))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
            Err(e) => Err(Error::persistence(format!(
                "config {}: {e}",
                path.display()
            ))),
        }
    }
}
