//! Spectral wavelength grids.
//!
//! All tabulated output lives on a uniform grid chosen by the caller. The
//! base data constrain it: nothing is tabulated below 390 nm or above
//! 830 nm, and the standard requires the domain to reach at least 700 nm,
//! so a requested upper bound is clamped into [700, 830] rather than
//! rejected. The effective bound after clamping and stepping is reported
//! back through [`SpectralGrid::lambda_max`] and the `clamped` flag.

use cfb_data::{REF_MAX, REF_MIN};
use cfb_math::round_dp;

use crate::{EngineError, EngineResult};

/// Smallest upper bound the standard allows for the wavelength domain.
pub const LAMBDA_MAX_FLOOR: f64 = 700.0;

/// A validated uniform wavelength grid.
#[derive(Debug, Clone)]
pub struct SpectralGrid {
    lambda_min: f64,
    lambda_max: f64,
    step: f64,
    clamped: bool,
    wavelengths: Vec<f64>,
}

impl SpectralGrid {
    /// Validates a requested domain and builds the grid.
    ///
    /// `lambda_max` is clamped into `[700, 830]`; `lambda_min` below
    /// 390 nm or a non-positive step is an error. The effective upper
    /// bound is the last generated sample, which can fall short of the
    /// requested bound when the step does not divide the span.
    ///
    /// # Example
    ///
    /// ```rust
    /// use cfb_engine::SpectralGrid;
    ///
    /// let grid = SpectralGrid::new(390.0, 700.0, 5.0).unwrap();
    /// assert_eq!(grid.len(), 63);
    /// assert!(!grid.clamped());
    ///
    /// let clamped = SpectralGrid::new(390.0, 650.0, 1.0).unwrap();
    /// assert_eq!(clamped.lambda_max(), 700.0);
    /// assert!(clamped.clamped());
    /// ```
    pub fn new(lambda_min: f64, lambda_max: f64, step: f64) -> EngineResult<Self> {
        if !step.is_finite() || step <= 0.0 {
            return Err(EngineError::Grid(format!(
                "step must be positive, got {step}"
            )));
        }
        if !lambda_min.is_finite() || lambda_min < REF_MIN {
            return Err(EngineError::Grid(format!(
                "lower bound {lambda_min} nm is below the tabulated range ({REF_MIN} nm)"
            )));
        }
        if !lambda_max.is_finite() {
            return Err(EngineError::Grid(format!(
                "upper bound {lambda_max} is not finite"
            )));
        }

        let clamped_max = lambda_max.clamp(LAMBDA_MAX_FLOOR, REF_MAX);
        let clamped = clamped_max != lambda_max;
        if lambda_min >= clamped_max {
            return Err(EngineError::Grid(format!(
                "empty domain: {lambda_min} to {clamped_max} nm"
            )));
        }

        let n = ((clamped_max - lambda_min) / step + 1e-9).floor() as usize + 1;
        let wavelengths: Vec<f64> = (0..n).map(|i| lambda_min + i as f64 * step).collect();
        let lambda_max = wavelengths[n - 1];

        Ok(Self {
            lambda_min,
            lambda_max,
            step,
            clamped,
            wavelengths,
        })
    }

    /// Lower bound, nm.
    pub fn lambda_min(&self) -> f64 {
        self.lambda_min
    }

    /// Effective upper bound (last sample), nm.
    pub fn lambda_max(&self) -> f64 {
        self.lambda_max
    }

    /// Step, nm.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Whether the requested upper bound was adjusted.
    pub fn clamped(&self) -> bool {
        self.clamped
    }

    /// The grid samples.
    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.wavelengths.len()
    }

    /// Always false; a grid has at least two samples.
    pub fn is_empty(&self) -> bool {
        self.wavelengths.is_empty()
    }

    /// True for the standard tabulation domain, 390-830 nm at 1 nm.
    ///
    /// The grid-dependent renormalization is the identity there.
    pub fn is_standard(&self) -> bool {
        self.lambda_min == REF_MIN && self.lambda_max == REF_MAX && self.step == 1.0
    }

    /// The 0.1 nm grid over the same span, used for the purple-line
    /// tangent search. Each value is exact to one decimal.
    pub fn fine_wavelengths(&self) -> Vec<f64> {
        let n = ((self.lambda_max - self.lambda_min) / 0.1 + 1e-9).floor() as usize + 1;
        (0..n)
            .map(|i| round_dp(self.lambda_min + i as f64 * 0.1, 1))
            .collect()
    }
}

/// The standard normalization domain: 390-830 nm at 1 nm, 441 samples.
pub fn standard_wavelengths() -> Vec<f64> {
    (390..=830).map(|l| l as f64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_grid() {
        let grid = SpectralGrid::new(390.0, 830.0, 1.0).unwrap();
        assert_eq!(grid.len(), 441);
        assert!(grid.is_standard());
        assert!(!grid.clamped());
        assert_eq!(grid.lambda_max(), 830.0);
    }

    #[test]
    fn test_row_count_with_coarse_step() {
        let grid = SpectralGrid::new(390.0, 700.0, 5.0).unwrap();
        assert_eq!(grid.len(), 63);
        assert_eq!(grid.lambda_max(), 700.0);
        assert!(!grid.clamped());
    }

    #[test]
    fn test_lambda_max_raised_to_700() {
        let grid = SpectralGrid::new(390.0, 650.0, 1.0).unwrap();
        assert!(grid.clamped());
        assert_eq!(grid.lambda_max(), 700.0);
    }

    #[test]
    fn test_lambda_max_clamped_to_830() {
        let grid = SpectralGrid::new(390.0, 900.0, 1.0).unwrap();
        assert!(grid.clamped());
        assert_eq!(grid.lambda_max(), 830.0);
    }

    #[test]
    fn test_effective_max_from_stepping() {
        // 390 + 62 * 7 = 824; the next step would overshoot 830.
        let grid = SpectralGrid::new(390.0, 830.0, 7.0).unwrap();
        assert_eq!(grid.lambda_max(), 824.0);
        assert!(!grid.is_standard());
    }

    #[test]
    fn test_invalid_grids_rejected() {
        assert!(SpectralGrid::new(390.0, 830.0, 0.0).is_err());
        assert!(SpectralGrid::new(390.0, 830.0, -1.0).is_err());
        assert!(SpectralGrid::new(380.0, 830.0, 1.0).is_err());
        assert!(SpectralGrid::new(720.0, 700.0, 1.0).is_err());
    }

    #[test]
    fn test_fine_wavelengths() {
        let grid = SpectralGrid::new(390.0, 700.0, 5.0).unwrap();
        let fine = grid.fine_wavelengths();
        assert_eq!(fine.len(), 3101);
        assert_eq!(fine[0], 390.0);
        assert_eq!(fine[1], 390.1);
        assert_eq!(*fine.last().unwrap(), 700.0);
    }

    #[test]
    fn test_fractional_step() {
        let grid = SpectralGrid::new(390.0, 830.0, 0.5).unwrap();
        assert_eq!(grid.len(), 881);
    }
}
