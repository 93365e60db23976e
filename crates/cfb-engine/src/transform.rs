//! The LMS-to-XYZ transform solver.
//!
//! The matrix has a fixed sparsity pattern:
//!
//! ```text
//! | a11 a12 a13 |
//! | a21 a22  0  |
//! |  0   0  a33 |
//! ```
//!
//! The second row is the V(lambda) synthesis (so y-bar peaks at exactly 1),
//! `a33` equates the illuminant-E Z and Y tristimulus values over the
//! standard 1 nm domain, and `a11`/`a12` follow in closed form from the
//! equal-illuminant-E constraint together with a pinned x-chromaticity
//! minimum. The one remaining free coefficient, `a13`, is tuned by a
//! bounded scalar search against the field-size-interpolated 1931/1964
//! reference diagram; an outer fixed-point loop keeps the pinned minimum
//! wavelength consistent with the matrix it produces.

use cfb_data::VisualData;
use cfb_math::{CubicSpline, Mat3, round_dp, round_sf, search_min};

use crate::grid::standard_wavelengths;
use crate::resample::SplineBank;
use crate::{EngineError, EngineResult, MAT_DP, XYZ_SIGNFIG};

/// Initial guess for the wavelength of the x-chromaticity minimum, nm.
const LAMBDA_X_MIN_GUESS: f64 = 502.0;

/// Iteration cap for the fixed-point loop on the x-minimum wavelength.
const MAX_REF_ITERATIONS: usize = 20;

/// Search interval and resolution for the free coefficient a13.
const A13_RANGE: (f64, f64) = (0.0, 1.0);
const A13_SCAN_CELLS: usize = 200;
const A13_TOL: f64 = 1e-11;

/// A solved LMS-to-XYZ transform.
#[derive(Debug, Clone, Copy)]
pub struct XyzSolution {
    /// The transformation matrix, entries rounded to 8 decimals.
    pub mat: Mat3,
    /// Wavelength of the x-chromaticity minimum the solve settled on, nm.
    pub lambda_ref_min: f64,
}

/// The reference chromaticity diagram for a field size: a knot-warped
/// interpolation between the 1931 (2 deg) and 1964 (10 deg) diagrams,
/// tabulated on 360-830 nm at 1 nm. Rows are (lambda, x, y, z).
pub fn reference_chromaticities(
    data: &VisualData,
    field_size: f64,
) -> EngineResult<Vec<[f64; 4]>> {
    let alpha = (field_size - 2.0) / 8.0;
    let mut knots = [0.0; 5];
    for i in 0..5 {
        knots[i] = (1.0 - alpha) * data.cc31_knots[i] + alpha * data.cc64_knots[i];
    }
    knots[0] = 360.0;
    knots[4] = 830.0;
    if knots.windows(2).any(|w| w[1] <= w[0]) {
        return Err(EngineError::Normalization(
            "reference diagram knots are not increasing".into(),
        ));
    }

    let fit = |cc: &[[f64; 4]], col: usize| -> EngineResult<CubicSpline> {
        let xs: Vec<f64> = cc.iter().map(|r| r[0]).collect();
        let ys: Vec<f64> = cc.iter().map(|r| r[col]).collect();
        CubicSpline::new(&xs, &ys).ok_or_else(|| {
            EngineError::Normalization("reference chromaticities are not interpolatable".into())
        })
    };
    let x31 = fit(&data.cc31, 1)?;
    let y31 = fit(&data.cc31, 2)?;
    let x64 = fit(&data.cc64, 1)?;
    let y64 = fit(&data.cc64, 2)?;

    let rows = (360..=830)
        .map(|l| {
            let lambda = l as f64;
            let l31 = piecewise_linear(&knots, &data.cc31_knots, lambda);
            let l64 = piecewise_linear(&knots, &data.cc64_knots, lambda);
            let x = (1.0 - alpha) * x31.eval(l31) + alpha * x64.eval(l64);
            let y = (1.0 - alpha) * y31.eval(l31) + alpha * y64.eval(l64);
            [lambda, x, y, 1.0 - x - y]
        })
        .collect();
    Ok(rows)
}

/// Linear interpolation through five knot pairs.
fn piecewise_linear(xs: &[f64; 5], ys: &[f64; 5], t: f64) -> f64 {
    let i = match xs.partition_point(|&x| x <= t) {
        0 => 0,
        p if p >= 5 => 3,
        p => p - 1,
    };
    let frac = (t - xs[i]) / (xs[i + 1] - xs[i]);
    ys[i] + frac * (ys[i + 1] - ys[i])
}

/// Solves the LMS-to-XYZ transform for one observer.
pub fn solve_xyz(
    bank: &SplineBank,
    v_weights: [f64; 2],
    data: &VisualData,
    field_size: f64,
) -> EngineResult<XyzSolution> {
    let std = standard_wavelengths();
    let lms_std = bank.lms_at(&std);
    let sum_l: f64 = lms_std[0].iter().sum();
    let sum_m: f64 = lms_std[1].iter().sum();
    let sum_s: f64 = lms_std[2].iter().sum();
    let sum_v: f64 = bank.v_at(&std).iter().sum();

    let [a21, a22] = v_weights;
    if sum_s == 0.0 {
        return Err(EngineError::Normalization(
            "S fundamental sums to zero over the standard domain".into(),
        ));
    }
    let a33 = round_dp(sum_v / sum_s, MAT_DP);

    let cc_ref = reference_chromaticities(data, field_size)?;
    // The fit domain starts at 390 nm, matching the Stockman-Sharpe range.
    let trunk = &cc_ref[30..];
    let x_ref_min = trunk.iter().map(|r| r[1]).fold(f64::INFINITY, f64::min);

    let build_mat = |a13: f64, lambda_ref: f64| -> EngineResult<Mat3> {
        let l_r = bank.lms_spline(0).eval(lambda_ref);
        let m_r = bank.lms_spline(1).eval(lambda_ref);
        let s_r = bank.lms_spline(2).eval(lambda_ref);
        let x0 = x_ref_min;

        let denom = (m_r * sum_l - l_r * sum_m) * (x0 - 1.0);
        if denom.abs() < 1e-300 || !denom.is_finite() {
            return Err(EngineError::Normalization(
                "constraint system for a11/a12 is singular".into(),
            ));
        }
        let a11 = (-m_r * sum_v
            + a13 * (s_r * sum_m - m_r * sum_s) * (x0 - 1.0)
            + (a21 * l_r + a33 * s_r) * sum_m * x0
            + m_r * (a22 * sum_m + sum_v) * x0)
            / denom;
        let a12 = (l_r * sum_v
            - a13 * (s_r * sum_l - l_r * sum_s) * (x0 - 1.0)
            - ((a21 * l_r + a22 * m_r + a33 * s_r) * sum_l + l_r * sum_v) * x0)
            / denom;

        Ok(Mat3::from_rows([
            [
                round_dp(a11, MAT_DP),
                round_dp(a12, MAT_DP),
                round_dp(a13, MAT_DP),
            ],
            [a21, a22, 0.0],
            [0.0, 0.0, a33],
        ]))
    };

    // Squared chromaticity distance to the reference diagram, and the
    // wavelength where the computed x-chromaticity is minimal.
    let evaluate = |mat: &Mat3| -> (f64, f64) {
        let mut err = 0.0;
        let mut min_x = f64::INFINITY;
        let mut min_lambda = std[0];
        for (i, lambda) in std.iter().enumerate() {
            let xyz = mat.transform([lms_std[0][i], lms_std[1][i], lms_std[2][i]]);
            let xyz = [
                round_sf(xyz[0], XYZ_SIGNFIG),
                round_sf(xyz[1], XYZ_SIGNFIG),
                round_sf(xyz[2], XYZ_SIGNFIG),
            ];
            let sum = xyz[0] + xyz[1] + xyz[2];
            let cc = [xyz[0] / sum, xyz[1] / sum, xyz[2] / sum];
            for c in 0..3 {
                let d = cc[c] - trunk[i][c + 1];
                err += d * d;
            }
            if cc[0] < min_x {
                min_x = cc[0];
                min_lambda = *lambda;
            }
        }
        if !err.is_finite() {
            err = f64::INFINITY;
        }
        (err, min_lambda)
    };

    let mut lambda_ref = LAMBDA_X_MIN_GUESS;
    for _ in 0..MAX_REF_ITERATIONS {
        let objective = |a13: f64| match build_mat(a13, lambda_ref) {
            Ok(mat) => {
                let (err, lambda_test) = evaluate(&mat);
                if lambda_test == lambda_ref {
                    err
                } else {
                    f64::INFINITY
                }
            }
            Err(_) => f64::INFINITY,
        };
        let a13 = search_min(objective, A13_RANGE.0, A13_RANGE.1, A13_SCAN_CELLS, A13_TOL);
        let mat = build_mat(a13, lambda_ref)?;
        let (err, lambda_test) = evaluate(&mat);
        if lambda_test == lambda_ref && err.is_finite() {
            return Ok(XyzSolution {
                mat,
                lambda_ref_min: lambda_ref,
            });
        }
        lambda_ref = lambda_test;
    }
    Err(EngineError::Normalization(
        "x-chromaticity minimum did not stabilize".into(),
    ))
}

/// Rescales the X and Z rows so the illuminant-E tristimulus values come
/// out equal over the *user* grid, compensating truncation error on
/// coarse or narrow domains. Entries are re-rounded to 8 decimals.
pub fn renormalize(mat: &Mat3, lms_spec: &[Vec<f64>; 3]) -> EngineResult<Mat3> {
    let mut sums = [0.0; 3];
    for i in 0..lms_spec[0].len() {
        let xyz = mat.transform([lms_spec[0][i], lms_spec[1][i], lms_spec[2][i]]);
        for c in 0..3 {
            sums[c] += xyz[c];
        }
    }
    if sums[0] == 0.0 || sums[2] == 0.0 {
        return Err(EngineError::Normalization(
            "illuminant-E tristimulus sum is zero on the requested grid".into(),
        ));
    }
    Ok(mat
        .with_row_scaled(0, sums[1] / sums[0])
        .with_row_scaled(2, sums[1] / sums[2])
        .map(|x| round_dp(x, MAT_DP)))
}
