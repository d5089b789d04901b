//! Mean/variance input scaling.

/// Scale `input` to zero mean and unit (population) variance.
///
/// Empty input stays empty. A constant vector has zero variance; its
/// standard deviation is taken as 1 so the result is all zeros.
pub fn normalize_input(input: &[f32]) -> Vec<f32> {
    if input.is_empty() {
        return Vec::new();
    }

    let n = input.len() as f64;
    let mean = input.iter().map(|&v| f64::from(v)).sum::<f64>() / n;
    let variance = input
        .iter()
        .map(|&v| {
            let d = f64::from(v) - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    let std = if variance > 0.0 { variance.sqrt() } else { 1.0 };

    input
        .iter()
        .map(|&v| ((f64::from(v) - mean) / std) as f32)
        .collect()
}
