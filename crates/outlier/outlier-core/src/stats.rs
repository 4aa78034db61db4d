//! Summary statistics shared by the detectors.

/// Units in the last place of the data scale, per square root of the sample
/// size, below which a standard deviation is rounding noise.
///
/// Residuals of an exact linear relation come out of floating point a few
/// ulps from zero, never exactly zero.
pub const NOISE_ULPS: f64 = 64.0;

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

/// Sample standard deviation (divides by `n - 1`); `None` below two values.
pub fn sample_std(data: &[f64]) -> Option<f64> {
    if data.len() < 2 {
        return None;
    }
    let m = mean(data)?;
    let ss: f64 = data.iter().map(|x| (x - m).powi(2)).sum();
    Some((ss / (data.len() - 1) as f64).sqrt())
}

/// Population standard deviation (divides by `n`); `None` for an empty slice.
pub fn population_std(data: &[f64]) -> Option<f64> {
    let m = mean(data)?;
    let ss: f64 = data.iter().map(|x| (x - m).powi(2)).sum();
    Some((ss / data.len() as f64).sqrt())
}

/// True when `std` over `n` values of magnitude up to `scale` is
/// indistinguishable from floating-point rounding.
pub fn is_negligible(std: f64, scale: f64, n: usize) -> bool {
    std <= NOISE_ULPS * f64::EPSILON * scale.abs() * (n as f64).sqrt()
}
