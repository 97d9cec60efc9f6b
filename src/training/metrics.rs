use crate::{Error, Result};

/// Coefficient of determination. A constant target scores 1.0 when the
/// predictions match it exactly and 0.0 otherwise.
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_lengths(actual, predicted)?;

    let n = actual.len() as f64;
    let mean = actual.iter().sum::<f64>() / n;
    let ss_tot: f64 = actual.iter().map(|y| (y - mean).powi(2)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(y, p)| (y - p).powi(2))
        .sum();

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}

pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_lengths(actual, predicted)?;

    let total: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(y, p)| (y - p).abs())
        .sum();
    Ok(total / actual.len() as f64)
}

pub fn root_mean_squared_error(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_lengths(actual, predicted)?;

    let total: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(y, p)| (y - p).powi(2))
        .sum();
    Ok((total / actual.len() as f64).sqrt())
}

fn check_lengths(actual: &[f64], predicted: &[f64]) -> Result<()> {
    if actual.is_empty() {
        return Err(Error::training("cannot score an empty prediction set"));
    }
    if actual.len() != predicted.len() {
        return Err(Error::training(format!(
            "length mismatch: {} actual values vs {} predictions",
            actual.len(),
            predicted.len()
        )));
    }
    Ok(())
}
