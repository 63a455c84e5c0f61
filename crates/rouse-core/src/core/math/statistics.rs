use crate::core::error::AnalysisError;
use std::collections::BTreeMap;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Unbiased (`n - 1`) variance. `None` for fewer than two values.
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some(sum_sq / (values.len() - 1) as f64)
}

/// Population (`n`) standard deviation. A single value has zero spread.
pub fn population_std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((sum_sq / values.len() as f64).sqrt())
}

/// Splits `values` into `blocks` consecutive blocks of equal size (the last block also takes
/// the remainder) and returns each block's mean.
pub fn block_means(values: &[f64], blocks: usize) -> Result<Vec<f64>, AnalysisError> {
    if blocks == 0 {
        return Err(AnalysisError::invalid("block count must be positive"));
    }
    if values.len() < blocks {
        return Err(AnalysisError::invalid(format!(
            "cannot split {} samples into {} blocks",
            values.len(),
            blocks
        )));
    }

    let block_size = values.len() / blocks;
    let means = (0..blocks)
        .map(|i| {
            let start = i * block_size;
            let end = if i == blocks - 1 {
                values.len()
            } else {
                start + block_size
            };
            let block = &values[start..end];
            block.iter().sum::<f64>() / block.len() as f64
        })
        .collect();
    Ok(means)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointSummary {
    pub x: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub count: usize,
}

/// Groups points sharing the exact same x and summarizes their y values, in ascending x.
pub fn summarize_by_x(points: impl IntoIterator<Item = (f64, f64)>) -> Vec<PointSummary> {
    let mut groups: BTreeMap<u64, (f64, Vec<f64>)> = BTreeMap::new();
    for (x, y) in points {
        groups
            .entry(order_key(x))
            .or_insert_with(|| (x, Vec::new()))
            .1
            .push(y);
    }

    groups
        .into_values()
        .filter_map(|(x, ys)| {
            Some(PointSummary {
                x,
                mean: mean(&ys)?,
                std_dev: population_std_dev(&ys)?,
                count: ys.len(),
            })
        })
        .collect()
}

/// Bit pattern that sorts like the float itself under `total_cmp`.
fn order_key(x: f64) -> u64 {
    let bits = x.to_bits();
    if bits >> 63 == 1 { !bits } else { bits | (1 << 63) }
}
