use rouse::engine::config::AnalysisConfig;
use std::path::PathBuf;

/// Directory-name patterns selecting runs and residues below the input folder.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryConfig {
    pub run_pattern: String,
    pub residue_pattern: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub discovery: DiscoveryConfig,
    pub analysis: AnalysisConfig,
}
