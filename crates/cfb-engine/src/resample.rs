//! Resampling of the base functions onto arbitrary grids.
//!
//! The reference tabulation is at 0.1 nm; every requested grid is produced
//! by evaluating interpolating splines of the base curves. Because the
//! splines are interpolating, resampling onto a subset of the reference
//! samples returns the tabulated values unchanged.

use cfb_data::DataError;
use cfb_math::CubicSpline;

use crate::synth::BaseFunctions;
use crate::{EngineError, EngineResult};

/// Interpolating splines over the seven base curves of one observer.
pub struct SplineBank {
    lms: [CubicSpline; 3],
    lms_std: [CubicSpline; 3],
    v: CubicSpline,
}

impl SplineBank {
    /// Fits splines over the base functions.
    pub fn new(base: &BaseFunctions) -> EngineResult<Self> {
        let fit = |y: &[f64]| -> EngineResult<CubicSpline> {
            CubicSpline::new(&base.wavelengths, y).ok_or_else(|| {
                EngineError::Data(DataError::Malformed {
                    file: "base functions".into(),
                    message: "reference grid is not interpolatable".into(),
                })
            })
        };
        Ok(Self {
            lms: [fit(&base.lms[0])?, fit(&base.lms[1])?, fit(&base.lms[2])?],
            lms_std: [
                fit(&base.lms_std[0])?,
                fit(&base.lms_std[1])?,
                fit(&base.lms_std[2])?,
            ],
            v: fit(&base.v)?,
        })
    }

    /// The 9-significant-figure fundamentals on a grid, [L, M, S].
    pub fn lms_at(&self, wavelengths: &[f64]) -> [Vec<f64>; 3] {
        [
            self.lms[0].eval_many(wavelengths),
            self.lms[1].eval_many(wavelengths),
            self.lms[2].eval_many(wavelengths),
        ]
    }

    /// The 6-significant-figure standard fundamentals on a grid.
    pub fn lms_std_at(&self, wavelengths: &[f64]) -> [Vec<f64>; 3] {
        [
            self.lms_std[0].eval_many(wavelengths),
            self.lms_std[1].eval_many(wavelengths),
            self.lms_std[2].eval_many(wavelengths),
        ]
    }

    /// V(lambda) on a grid.
    pub fn v_at(&self, wavelengths: &[f64]) -> Vec<f64> {
        self.v.eval_many(wavelengths)
    }

    /// Spline of one fundamental (0 = L, 1 = M, 2 = S).
    pub fn lms_spline(&self, channel: usize) -> &CubicSpline {
        &self.lms[channel]
    }

    /// Spline of V(lambda).
    pub fn v_spline(&self) -> &CubicSpline {
        &self.v
    }
}
