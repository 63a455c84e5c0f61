//! Locates run and residue directories below an input folder.
//!
//! The expected layout is `<input>/<run>/<residue>/<data file>`, where run directory names
//! match the run pattern (by default a `YYYYmmdd_HHMMSS` timestamp) and residue directory
//! names match the residue pattern and carry the chain length as `residue<N>`.

use crate::config::models::DiscoveryConfig;
use crate::error::{CliError, Result};
use regex::{Regex, RegexBuilder};
use rouse::core::models::kind::DataKind;
use rouse::workflows::pipeline::{ResidueInput, RunInput};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

fn compile(pattern: &str, what: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| CliError::Config(format!("Invalid {} pattern '{}': {}", what, pattern, e)))
}

/// Chain length `N` encoded as `residue<N>` in a directory name.
pub fn chain_length(name: &str) -> Option<u32> {
    let re = Regex::new(r"residue(\d+)").ok()?;
    re.captures(name)?.get(1)?.as_str().parse().ok()
}

/// Immediate subdirectories of `dir` whose names match `pattern`, sorted by name.
fn matching_directories(dir: &Path, pattern: &Regex) -> Result<Vec<(String, PathBuf)>> {
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if pattern.is_match(&name) {
            found.push((name, entry.path()));
        }
    }
    found.sort();
    Ok(found)
}

/// Collects every run below `input` together with its residues, ordered by chain length.
///
/// Residue directories without a `residue<N>` tag are skipped with a warning. Runs without
/// any residue directory are kept so the pipeline can report them.
pub fn discover_runs(
    input: &Path,
    discovery: &DiscoveryConfig,
    kind: DataKind,
) -> Result<Vec<RunInput>> {
    if !input.is_dir() {
        return Err(CliError::Argument(format!(
            "Input directory does not exist: {}",
            input.display()
        )));
    }
    let run_pattern = compile(&discovery.run_pattern, "run")?;
    let residue_pattern = compile(&discovery.residue_pattern, "residue")?;

    let mut runs = Vec::new();
    for (run_name, run_path) in matching_directories(input, &run_pattern)? {
        let mut run = RunInput::new(run_name);
        for (residue_name, residue_path) in matching_directories(&run_path, &residue_pattern)? {
            let Some(n) = chain_length(&residue_name) else {
                warn!(
                    path = %residue_path.display(),
                    "Residue directory carries no chain length; skipped."
                );
                continue;
            };
            run.residues.push(ResidueInput {
                label: residue_name,
                chain_length: f64::from(n),
                data_path: residue_path.join(kind.file_name()),
            });
        }
        run.residues
            .sort_by(|a, b| a.chain_length.total_cmp(&b.chain_length));
        debug!(run = %run.id, residues = run.residues.len(), "Discovered run.");
        runs.push(run);
    }

    info!(
        input = %input.display(),
        runs = runs.len(),
        "Run discovery complete."
    );
    Ok(runs)
}
