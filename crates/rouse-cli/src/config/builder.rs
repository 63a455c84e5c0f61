use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::{AppConfig, DiscoveryConfig};
use crate::cli::AnalysisArgs;
use crate::error::{CliError, Result};
use rouse::engine::config::{self as core_config, EquilibrationConfig};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Merges command-line flags, the optional settings file and the built-in defaults, in that
/// order of precedence.
pub fn build_config(
    args: &AnalysisArgs,
    input: Option<&Path>,
    output: Option<&Path>,
) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = match &args.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let input_file = file_config.input.take().unwrap_or_default();
    let ac_file = file_config.autocorrelation.take().unwrap_or_default();
    let fit_file = file_config.fit.take().unwrap_or_default();
    let ref_file = file_config.reference.take().unwrap_or_default();
    let eq_file = file_config.equilibration.take().unwrap_or_default();
    let output_file = file_config.output.take().unwrap_or_default();

    let parallel = if args.serial {
        false
    } else {
        ac_file.parallel.unwrap_or(defaults.parallel)
    };
    let log_y = args.log_y || fit_file.log_y.unwrap_or(defaults.log_y);

    let equilibration = if eq_file.enabled.unwrap_or(defaults.equilibration_enabled) {
        Some(EquilibrationConfig {
            blocks: eq_file.blocks.unwrap_or(defaults.equilibration_blocks),
            relative_tolerance: eq_file
                .relative_tolerance
                .unwrap_or(defaults.equilibration_tolerance),
        })
    } else {
        None
    };

    let analysis = core_config::AnalysisConfigBuilder::new()
        .data_kind(
            args.data_kind
                .or(input_file.data_kind)
                .unwrap_or(defaults.data_kind),
        )
        .max_lag(
            args.max_lag
                .or(ac_file.max_lag)
                .unwrap_or(defaults.max_lag),
        )
        .min_threshold(
            args.min_threshold
                .or(ac_file.min_threshold)
                .unwrap_or(defaults.min_threshold),
        )
        .max_threshold(
            args.max_threshold
                .or(ac_file.max_threshold)
                .unwrap_or(defaults.max_threshold),
        )
        .normalization(
            args.normalization
                .or(ac_file.normalization)
                .unwrap_or(defaults.normalization),
        )
        .parallel(parallel)
        .fit_strategy(
            args.strategy
                .or(fit_file.strategy)
                .unwrap_or(defaults.fit_strategy),
        )
        .log_y(log_y)
        .max_iterations(fit_file.max_iterations.unwrap_or(defaults.max_iterations))
        .initial_guess(
            fit_file
                .initial_amplitude
                .unwrap_or(defaults.initial_amplitude),
            fit_file.initial_rate.unwrap_or(defaults.initial_rate),
        )
        .polynomial_degree(
            fit_file
                .polynomial_degree
                .unwrap_or(defaults.polynomial_degree),
        )
        .reference_slope(
            args.slope
                .or(ref_file.slope)
                .unwrap_or(defaults.reference_slope),
        )
        .reference_scale(ref_file.scale.unwrap_or(defaults.reference_scale))
        .equilibration(equilibration)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let discovery = DiscoveryConfig {
        run_pattern: input_file.run_pattern.unwrap_or(defaults.run_pattern),
        residue_pattern: input_file
            .residue_pattern
            .unwrap_or(defaults.residue_pattern),
    };

    let config = AppConfig {
        input_dir: input.map(Path::to_path_buf).or(input_file.directory),
        output_dir: output.map(Path::to_path_buf).or(output_file.directory),
        discovery,
        analysis,
    };
    debug!("Final configuration: {:?}", config);
    Ok(config)
}

fn parse_value<T: FromStr>(key: &str, value: &str, expected: &str) -> Result<T> {
    value.parse().map_err(|_| {
        CliError::Config(format!("Invalid {} value for {}: {}", expected, key, value))
    })
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let parts: Vec<_> = kv_pair.splitn(2, '=').collect();
        if parts.len() != 2 {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        }
        let key = parts[0].trim();
        let value_str = parts[1].trim();

        match key {
            "input.data-kind" => {
                config.input.get_or_insert_with(Default::default).data_kind =
                    Some(parse_value(key, value_str, "data kind")?);
            }
            "input.run-pattern" => {
                config.input.get_or_insert_with(Default::default).run_pattern =
                    Some(value_str.to_string());
            }
            "input.residue-pattern" => {
                config
                    .input
                    .get_or_insert_with(Default::default)
                    .residue_pattern = Some(value_str.to_string());
            }
            "autocorrelation.max-lag" => {
                config
                    .autocorrelation
                    .get_or_insert_with(Default::default)
                    .max_lag = Some(parse_value(key, value_str, "integer")?);
            }
            "autocorrelation.min-threshold" => {
                config
                    .autocorrelation
                    .get_or_insert_with(Default::default)
                    .min_threshold = Some(parse_value(key, value_str, "float")?);
            }
            "autocorrelation.max-threshold" => {
                config
                    .autocorrelation
                    .get_or_insert_with(Default::default)
                    .max_threshold = Some(parse_value(key, value_str, "float")?);
            }
            "autocorrelation.normalization" => {
                config
                    .autocorrelation
                    .get_or_insert_with(Default::default)
                    .normalization = Some(parse_value(key, value_str, "normalization")?);
            }
            "autocorrelation.parallel" => {
                config
                    .autocorrelation
                    .get_or_insert_with(Default::default)
                    .parallel = Some(parse_value(key, value_str, "boolean")?);
            }
            "fit.strategy" => {
                config.fit.get_or_insert_with(Default::default).strategy =
                    Some(parse_value(key, value_str, "strategy")?);
            }
            "fit.log-y" => {
                config.fit.get_or_insert_with(Default::default).log_y =
                    Some(parse_value(key, value_str, "boolean")?);
            }
            "fit.max-iterations" => {
                config.fit.get_or_insert_with(Default::default).max_iterations =
                    Some(parse_value(key, value_str, "integer")?);
            }
            "fit.initial-amplitude" => {
                config
                    .fit
                    .get_or_insert_with(Default::default)
                    .initial_amplitude = Some(parse_value(key, value_str, "float")?);
            }
            "fit.initial-rate" => {
                config.fit.get_or_insert_with(Default::default).initial_rate =
                    Some(parse_value(key, value_str, "float")?);
            }
            "fit.polynomial-degree" => {
                config
                    .fit
                    .get_or_insert_with(Default::default)
                    .polynomial_degree = Some(parse_value(key, value_str, "integer")?);
            }
            "reference.slope" => {
                config.reference.get_or_insert_with(Default::default).slope =
                    Some(parse_value(key, value_str, "float")?);
            }
            "reference.scale" => {
                config.reference.get_or_insert_with(Default::default).scale =
                    Some(parse_value(key, value_str, "scale")?);
            }
            "equilibration.enabled" => {
                config
                    .equilibration
                    .get_or_insert_with(Default::default)
                    .enabled = Some(parse_value(key, value_str, "boolean")?);
            }
            "equilibration.blocks" => {
                config
                    .equilibration
                    .get_or_insert_with(Default::default)
                    .blocks = Some(parse_value(key, value_str, "integer")?);
            }
            "equilibration.relative-tolerance" => {
                config
                    .equilibration
                    .get_or_insert_with(Default::default)
                    .relative_tolerance = Some(parse_value(key, value_str, "float")?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
