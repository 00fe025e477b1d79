//! Window Statistics Computation

/// Mean and sample standard deviation of one window
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WindowStats {
    /// Number of observations in the window
    pub count: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator), 0.0 below two observations
    pub std_dev: f64,
}

impl WindowStats {
    /// Compute window statistics from a slice of values
    pub fn compute(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let count = values.len();
        let n = count as f64;
        let mean = values.iter().sum::<f64>() / n;

        // Undefined sample variance for a lone observation is fixed at zero
        let std_dev = if count < 2 {
            0.0
        } else {
            let m2: f64 = values.iter().map(|&v| (v - mean) * (v - mean)).sum();
            (m2 / (n - 1.0)).sqrt()
        };

        Self {
            count,
            mean,
            std_dev,
        }
    }
}
