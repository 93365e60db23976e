//! The assembled computation results.
//!
//! Pure aggregation: every field is produced elsewhere in the pipeline and
//! packaged here, with sub-tolerance numerical noise chopped to exact
//! zeros. Presentation layers read the fields by name and must treat the
//! structure as read-only; nothing in the engine mutates it after
//! assembly.

use cfb_math::{Mat3, chop_default};

/// A coordinate table: rows of (wavelength, c1, c2, c3).
pub type Table = Vec<[f64; 4]>;

/// A purple-line terminus pair: two rows of (wavelength, c1, c2).
pub type Termini = [[f64; 3]; 2];

/// A purple-line terminus pair with tristimulus values:
/// two rows of (wavelength, X, Y, Z).
pub type TerminiXyz = [[f64; 4]; 2];

/// Everything one invocation of the engine produces.
///
/// Spectral tables are tabulated on the requested grid; purple tables on
/// the complementary-wavelength subset of it bounded by the tangent
/// wavelengths. Field names match what table, description and export
/// consumers read.
#[derive(Debug, Clone)]
pub struct Results {
    /// Field size, degrees.
    pub field_size: f64,
    /// Observer age, years.
    pub age: u32,
    /// Lower wavelength bound, nm.
    pub lambda_min: f64,
    /// Effective upper wavelength bound, nm.
    pub lambda_max: f64,
    /// Wavelength step, nm.
    pub lambda_step: f64,
    /// Whether the requested upper bound was clamped into [700, 830].
    pub lambda_max_clamped: bool,
    /// Wavelength of the x-chromaticity minimum the transform solve
    /// settled on, nm.
    pub lambda_ref_min: f64,

    /// Cone fundamentals at 6 significant figures.
    pub lms: Table,
    /// Cone fundamentals at 9 significant figures.
    pub lms_base: Table,
    /// Cone-fundamental-based tristimulus functions.
    pub xyz: Table,
    /// Tristimulus functions under the grid-renormalized transform.
    pub xyz_n: Table,
    /// Chromaticity coordinates.
    pub xy: Table,
    /// Renormalized chromaticity coordinates.
    pub xy_n: Table,
    /// MacLeod-Boynton chromaticity coordinates.
    pub mb: Table,
    /// Maxwellian lm chromaticity coordinates.
    pub lm: Table,

    /// Illuminant-E chromaticity.
    pub xy_white: [f64; 3],
    /// Illuminant-E chromaticity, renormalized transform.
    pub xy_white_n: [f64; 3],
    /// Illuminant-E MacLeod-Boynton coordinates.
    pub mb_white: [f64; 3],
    /// Illuminant-E Maxwellian coordinates.
    pub lm_white: [f64; 3],

    /// The LMS-to-XYZ transformation matrix.
    pub trans_mat: Mat3,
    /// The grid-renormalized transformation matrix.
    pub trans_mat_n: Mat3,

    /// Purple-line termini in the chromaticity diagram.
    pub purple_line_cc: Termini,
    /// Purple-line termini, renormalized diagram.
    pub purple_line_cc_n: Termini,
    /// Purple-line termini tristimulus values.
    pub purple_line_xyz: TerminiXyz,
    /// Purple-line termini tristimulus values, renormalized transform.
    pub purple_line_xyz_n: TerminiXyz,
    /// Purple-line termini in the MacLeod-Boynton diagram (l, s axes).
    pub purple_line_mb: Termini,
    /// Purple-line termini in the Maxwellian diagram (l, m axes).
    pub purple_line_lm: Termini,
    /// Purple-line termini of the CIE 1931 diagram.
    pub purple_line_cc31: Termini,
    /// Purple-line termini of the CIE 1964 diagram.
    pub purple_line_cc64: Termini,

    /// Tristimulus values of purple-line stimuli by complementary
    /// wavelength.
    pub purple_xyz: Table,
    /// Renormalized purple-line tristimulus values.
    pub purple_xyz_n: Table,
    /// Chromaticity coordinates of purple-line stimuli.
    pub purple_cc: Table,
    /// Renormalized purple-line chromaticities.
    pub purple_cc_n: Table,
    /// Complementary-wavelength bounds of the purple table, when the
    /// requested grid produces any purple rows.
    pub lambda_purple: Option<(f64, f64)>,
    /// Complementary-wavelength bounds, renormalized tables.
    pub lambda_purple_n: Option<(f64, f64)>,

    /// CIE 1931 colour-matching functions (fixed reference data).
    pub xyz31: Table,
    /// CIE 1964 colour-matching functions (fixed reference data).
    pub xyz64: Table,
    /// CIE 1931 chromaticities, 5 decimals.
    pub xy31: Table,
    /// CIE 1964 chromaticities, 5 decimals.
    pub xy64: Table,

    /// The MacLeod-Boynton s-axis normalization constant, max(s/V).
    pub mb_s_max: f64,
}

/// Chops sub-tolerance noise out of a table.
pub(crate) fn chop_table(mut table: Table) -> Table {
    for row in &mut table {
        for v in row.iter_mut() {
            *v = chop_default(*v);
        }
    }
    table
}

/// Chops a three-component point.
pub(crate) fn chop_point(p: [f64; 3]) -> [f64; 3] {
    p.map(chop_default)
}

/// Chops a terminus pair.
pub(crate) fn chop_termini(t: Termini) -> Termini {
    t.map(|row| row.map(chop_default))
}

/// Chops a tristimulus terminus pair.
pub(crate) fn chop_termini_xyz(t: TerminiXyz) -> TerminiXyz {
    t.map(|row| row.map(chop_default))
}

/// Bounds of the complementary-wavelength column of a purple table.
pub(crate) fn purple_bounds(table: &Table) -> Option<(f64, f64)> {
    match (table.first(), table.last()) {
        (Some(first), Some(last)) => Some((first[0], last[0])),
        _ => None,
    }
}
