// src/smoother.rs

/// Exponential moving average over a scalar signal.
///
/// The first sample seeds the average as-is; later samples are blended as
/// `alpha * sample + (1 - alpha) * previous`.
#[derive(Debug, Clone)]
pub struct ExponentialSmoother {
    alpha: f32,
    value: Option<f32>,
}

impl ExponentialSmoother {
    /// # Arguments
    /// * `alpha` - Weight of the newest sample, in (0, 1]
    pub fn new(alpha: f32) -> Self {
        Self { alpha, value: None }
    }

    pub fn smooth(&mut self, sample: f32) -> f32 {
        let next = match self.value {
            None => sample,
            Some(prev) => self.alpha * sample + (1.0 - self.alpha) * prev,
        };
        self.value = Some(next);
        next
    }
}

/// Median of a sample set, averaging the two middle values for even counts.
/// Resistant to the odd outlier frame during calibration.
pub fn median(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}
