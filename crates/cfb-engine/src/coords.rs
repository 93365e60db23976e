//! Pointwise coordinate derivations.
//!
//! Everything here maps already-resampled fundamentals through a transform
//! or a per-wavelength normalization. The published rounding conventions
//! are applied at tabulation time: 7 significant figures for tristimulus
//! values, 5 decimals for chromaticities, 6 for MacLeod-Boynton and
//! Maxwellian coordinates, with negative rounding noise floored to zero.

use cfb_math::{Mat3, round_dp, round_sf};

use crate::results::Table;
use crate::{EngineError, EngineResult, XYZ_SIGNFIG};

/// Tabulates the fundamentals themselves, rows (lambda, l, m, s).
pub fn lms_table(wavelengths: &[f64], lms: &[Vec<f64>; 3]) -> Table {
    wavelengths
        .iter()
        .enumerate()
        .map(|(i, wl)| [*wl, lms[0][i], lms[1][i], lms[2][i]])
        .collect()
}

/// Tristimulus table: the matrix applied per wavelength, rounded to
/// 7 significant figures.
pub fn xyz_table(wavelengths: &[f64], lms: &[Vec<f64>; 3], mat: &Mat3) -> Table {
    wavelengths
        .iter()
        .enumerate()
        .map(|(i, wl)| {
            let xyz = mat.transform([lms[0][i], lms[1][i], lms[2][i]]);
            [
                *wl,
                round_sf(xyz[0], XYZ_SIGNFIG),
                round_sf(xyz[1], XYZ_SIGNFIG),
                round_sf(xyz[2], XYZ_SIGNFIG),
            ]
        })
        .collect()
}

/// Chromaticity coordinates of a tristimulus table, rounded to `dp`
/// decimals with negative noise floored to zero.
pub fn chromaticity_table(xyz: &Table, dp: i32) -> EngineResult<Table> {
    xyz.iter()
        .map(|row| {
            let sum = row[1] + row[2] + row[3];
            if sum == 0.0 {
                return Err(EngineError::DivideByZero { wavelength: row[0] });
            }
            Ok([
                row[0],
                floor_zero(round_dp(row[1] / sum, dp)),
                floor_zero(round_dp(row[2] / sum, dp)),
                floor_zero(round_dp(row[3] / sum, dp)),
            ])
        })
        .collect()
}

/// Chromaticity coordinates without rounding or flooring, for the
/// purple-line tangent search on the fine grid.
pub fn chromaticity_table_raw(xyz: &Table) -> EngineResult<Table> {
    xyz.iter()
        .map(|row| {
            let sum = row[1] + row[2] + row[3];
            if sum == 0.0 {
                return Err(EngineError::DivideByZero { wavelength: row[0] });
            }
            Ok([row[0], row[1] / sum, row[2] / sum, row[3] / sum])
        })
        .collect()
}

/// The illuminant-E chromaticity of a tristimulus table: column sums
/// normalized, rounded to `dp` decimals.
pub fn chromaticity_white(xyz: &Table, dp: i32) -> EngineResult<[f64; 3]> {
    let mut sums = [0.0; 3];
    for row in xyz {
        for c in 0..3 {
            sums[c] += row[c + 1];
        }
    }
    let total = sums[0] + sums[1] + sums[2];
    if total == 0.0 {
        return Err(EngineError::DivideByZero { wavelength: f64::NAN });
    }
    Ok([
        round_dp(sums[0] / total, dp),
        round_dp(sums[1] / total, dp),
        round_dp(sums[2] / total, dp),
    ])
}

/// MacLeod-Boynton table, rows (lambda, l, m, s): luminance-normalized
/// L and M weighted by the V(lambda) synthesis coefficients, S scaled to
/// unit peak, rounded to `dp` decimals and floored at zero.
pub fn mb_table(
    wavelengths: &[f64],
    lms: &[Vec<f64>; 3],
    v: &[f64],
    weights: [f64; 2],
    mb_s_max: f64,
    dp: i32,
) -> EngineResult<Table> {
    wavelengths
        .iter()
        .enumerate()
        .map(|(i, wl)| {
            if v[i] == 0.0 {
                return Err(EngineError::DivideByZero { wavelength: *wl });
            }
            Ok([
                *wl,
                floor_zero(round_dp(weights[0] * lms[0][i] / v[i], dp)),
                floor_zero(round_dp(weights[1] * lms[1][i] / v[i], dp)),
                floor_zero(round_dp(lms[2][i] / v[i] / mb_s_max, dp)),
            ])
        })
        .collect()
}

/// MacLeod-Boynton coordinates of illuminant E.
pub fn mb_white(lms: &[Vec<f64>; 3], weights: [f64; 2], mb_s_max: f64, dp: i32) -> [f64; 3] {
    let l_e = weights[0] * lms[0].iter().sum::<f64>();
    let m_e = weights[1] * lms[1].iter().sum::<f64>();
    let s_e = lms[2].iter().sum::<f64>() / mb_s_max;
    [
        round_dp(l_e / (l_e + m_e), dp),
        round_dp(m_e / (l_e + m_e), dp),
        round_dp(s_e / (l_e + m_e), dp),
    ]
}

/// MacLeod-Boynton table on the fine grid, unrounded, for the tangent
/// search. The luminance divisor is the Y column of the tabulated fine
/// tristimulus values, which differs from V(lambda) only by tabulation
/// rounding.
pub fn mb_fine_table(
    wavelengths: &[f64],
    lms: &[Vec<f64>; 3],
    xyz_fine: &Table,
    weights: [f64; 2],
    mb_s_max: f64,
) -> EngineResult<Table> {
    wavelengths
        .iter()
        .enumerate()
        .map(|(i, wl)| {
            let y = xyz_fine[i][2];
            if y == 0.0 {
                return Err(EngineError::DivideByZero { wavelength: *wl });
            }
            Ok([
                *wl,
                weights[0] * lms[0][i] / y,
                weights[1] * lms[1][i] / y,
                lms[2][i] / y / mb_s_max,
            ])
        })
        .collect()
}

/// Maxwellian lm table, rows (lambda, l, m, s): each channel scaled so its
/// illuminant-E integral is one, then normalized per wavelength; rounded
/// and floored. Also returns the illuminant-E point, which lands on
/// (1/3, 1/3, 1/3) by construction.
pub fn lm_table(
    wavelengths: &[f64],
    lms: &[Vec<f64>; 3],
    dp: i32,
) -> EngineResult<(Table, [f64; 3])> {
    let mut inv = [0.0; 3];
    for c in 0..3 {
        let sum: f64 = lms[c].iter().sum();
        if sum == 0.0 {
            return Err(EngineError::DivideByZero {
                wavelength: f64::NAN,
            });
        }
        inv[c] = 1.0 / sum;
    }
    let table = wavelengths
        .iter()
        .enumerate()
        .map(|(i, wl)| {
            let scaled = [
                lms[0][i] * inv[0],
                lms[1][i] * inv[1],
                lms[2][i] * inv[2],
            ];
            let sum = scaled[0] + scaled[1] + scaled[2];
            if sum == 0.0 {
                return Err(EngineError::DivideByZero { wavelength: *wl });
            }
            Ok([
                *wl,
                floor_zero(round_dp(scaled[0] / sum, dp)),
                floor_zero(round_dp(scaled[1] / sum, dp)),
                floor_zero(round_dp(scaled[2] / sum, dp)),
            ])
        })
        .collect::<EngineResult<Table>>()?;

    // Channel integrals are one after scaling, so the white point is exact.
    let third = round_dp(1.0 / 3.0, dp);
    Ok((table, [third, third, third]))
}

/// Per-wavelength normalization of the raw fundamentals on the fine grid,
/// unrounded, for the lm tangent search.
pub fn row_normalized(wavelengths: &[f64], lms: &[Vec<f64>; 3]) -> EngineResult<Table> {
    wavelengths
        .iter()
        .enumerate()
        .map(|(i, wl)| {
            let sum = lms[0][i] + lms[1][i] + lms[2][i];
            if sum == 0.0 {
                return Err(EngineError::DivideByZero { wavelength: *wl });
            }
            Ok([*wl, lms[0][i] / sum, lms[1][i] / sum, lms[2][i] / sum])
        })
        .collect()
}

#[inline]
fn floor_zero(x: f64) -> f64 {
    if x <= 0.0 { 0.0 } else { x }
}
