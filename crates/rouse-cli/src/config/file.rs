use crate::error::{CliError, Result};
use rouse::core::models::kind::DataKind;
use rouse::engine::config::{FitStrategy, LineScale, NormalizationMode};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileInputConfig {
    pub directory: Option<PathBuf>,
    pub data_kind: Option<DataKind>,
    pub run_pattern: Option<String>,
    pub residue_pattern: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileAutocorrelationConfig {
    pub max_lag: Option<usize>,
    pub min_threshold: Option<f64>,
    pub max_threshold: Option<f64>,
    pub normalization: Option<NormalizationMode>,
    pub parallel: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileFitConfig {
    pub strategy: Option<FitStrategy>,
    pub log_y: Option<bool>,
    pub max_iterations: Option<usize>,
    pub initial_amplitude: Option<f64>,
    pub initial_rate: Option<f64>,
    pub polynomial_degree: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileReferenceConfig {
    pub slope: Option<f64>,
    pub scale: Option<LineScale>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileEquilibrationConfig {
    pub enabled: Option<bool>,
    pub blocks: Option<usize>,
    pub relative_tolerance: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileOutputConfig {
    pub directory: Option<PathBuf>,
}

/// Settings file as written by the user. Every field is optional; missing values fall back
/// to command-line flags and then to the built-in defaults.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub input: Option<FileInputConfig>,
    pub autocorrelation: Option<FileAutocorrelationConfig>,
    pub fit: Option<FileFitConfig>,
    pub reference: Option<FileReferenceConfig>,
    pub equilibration: Option<FileEquilibrationConfig>,
    pub output: Option<FileOutputConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Reading configuration file {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}
