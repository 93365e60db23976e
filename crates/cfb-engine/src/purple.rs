//! Purple-line extension.
//!
//! The spectral locus is an open curve; the straight segment closing it is
//! the purple line. Its endpoints are the two tangent points: the locus
//! points whose connecting chord lies entirely on one side of the locus.
//! On the convex hull of the locus every edge joins neighboring samples
//! except the closing chord, so the tangent pair is the hull edge whose
//! endpoint indices are farthest apart.
//!
//! Purple-line stimuli are indexed by complementary wavelength: the
//! spectral wavelength whose locus point, extended through the white
//! point, hits the purple segment.

use cfb_math::{convex_hull, hull_edges, round_dp, round_sf};

use crate::results::{Table, Termini, TerminiXyz};
use crate::{EngineError, EngineResult, XYZ_SIGNFIG};

/// Finds the purple edge of a locus: the hull edge spanning the largest
/// index range. Ties resolve toward the longest-wavelength candidate.
/// Returns the endpoint indices ordered short wavelength first.
pub fn purple_edge(points: &[(f64, f64)]) -> EngineResult<(usize, usize)> {
    let hull = convex_hull(points);
    if hull.is_empty() {
        return Err(EngineError::Tangency(
            "locus is degenerate, no convex boundary".into(),
        ));
    }
    let edge = hull_edges(&hull)
        .into_iter()
        .max_by_key(|(i, j)| (i.abs_diff(*j), (*i).max(*j)))
        .ok_or_else(|| EngineError::Tangency("locus has no hull edges".into()))?;
    if edge.0.abs_diff(edge.1) < 2 {
        return Err(EngineError::Tangency(
            "no hull edge spans the locus ends".into(),
        ));
    }
    Ok((edge.0.min(edge.1), edge.0.max(edge.1)))
}

/// Extracts the two tangent rows (wavelength plus two coordinates) from a
/// fine-grid table. Coordinates are rounded to `dp` decimals when given.
pub fn termini(table: &Table, edge: (usize, usize), cols: (usize, usize), dp: Option<i32>) -> Termini {
    let pick = |i: usize| {
        let row = &table[i];
        let (c1, c2) = (row[cols.0], row[cols.1]);
        match dp {
            Some(dp) => [row[0], round_dp(c1, dp), round_dp(c2, dp)],
            None => [row[0], c1, c2],
        }
    };
    [pick(edge.0), pick(edge.1)]
}

/// Extracts the two tangent tristimulus rows, values at 7 significant
/// figures and wavelengths rounded to 0.1 nm.
pub fn termini_xyz(table: &Table, edge: (usize, usize)) -> TerminiXyz {
    let pick = |i: usize| {
        let row = &table[i];
        [
            round_dp(row[0], 1),
            round_sf(row[1], XYZ_SIGNFIG),
            round_sf(row[2], XYZ_SIGNFIG),
            round_sf(row[3], XYZ_SIGNFIG),
        ]
    };
    [pick(edge.0), pick(edge.1)]
}

/// Tristimulus values of purple-line stimuli, indexed by complementary
/// wavelength.
///
/// For every chromaticity row whose wavelength lies strictly between the
/// termini wavelengths, the line through the white point and that locus
/// point is intersected with the purple segment; the intersection is the
/// convex combination `a * blue + (1 - a) * red` of the termini. Rows
/// whose parameter leaves [0, 1] fall outside the segment; once the scan
/// has been inside and exits, it stops.
pub fn purple_tristimulus(cc: &Table, termini: &TerminiXyz, white: &[f64; 3]) -> Table {
    let (wx, wy) = (white[0], white[1]);
    let [xb, yb, zb] = [termini[0][1], termini[0][2], termini[0][3]];
    let [xr, yr, zr] = [termini[1][1], termini[1][2], termini[1][3]];
    let lo = round_dp(termini[0][0], 1);
    let hi = round_dp(termini[1][0], 1);

    let mut rows = Vec::new();
    let mut inside = false;
    for row in cc {
        let lambda = round_dp(row[0], 1);
        if lambda <= lo || lambda >= hi {
            continue;
        }
        let (cx, cy) = (row[1], row[2]);
        let num = (cy - wy) * xb - (cx - wx) * yb + (cx * wy - cy * wx) * (xb + yb + zb);
        let den = (cy - wy) * xr - (cx - wx) * yr + (cx * wy - cy * wx) * (xr + yr + zr);
        let a = 1.0 / (1.0 - num / den);
        if (0.0..=1.0).contains(&a) {
            inside = true;
            rows.push([
                lambda,
                a * xb + (1.0 - a) * xr,
                a * yb + (1.0 - a) * yr,
                a * zb + (1.0 - a) * zr,
            ]);
        } else if inside {
            break;
        }
    }
    rows
}

/// Chromaticity coordinates of purple-line stimuli.
pub fn purple_chromaticity(purple_xyz: &Table) -> EngineResult<Table> {
    purple_xyz
        .iter()
        .map(|row| {
            let sum = row[1] + row[2] + row[3];
            if sum == 0.0 {
                return Err(EngineError::DivideByZero { wavelength: row[0] });
            }
            Ok([row[0], row[1] / sum, row[2] / sum, row[3] / sum])
        })
        .collect()
}
