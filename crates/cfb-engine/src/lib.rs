//! # cfb-engine
//!
//! The CIE cone-fundamental colorimetric computation engine.
//!
//! For a chosen observer (field size in degrees, age in years) and
//! wavelength grid, one call to [`Engine::compute`] produces the complete
//! set of cone-fundamental-based functions defined by CIE TC 1-97:
//!
//! - cone fundamentals (LMS) at 6 and 9 significant figures
//! - tristimulus functions (XYZ) and chromaticities (xy), in both the
//!   fixed standard normalization and a grid-compensated variant
//! - MacLeod-Boynton (ls) and Maxwellian (lm) chromaticities
//! - purple-line tangent points and complementary-wavelength tables
//! - the classical 1931/1964 reference data for comparison overlays
//!
//! # Pipeline
//!
//! ```text
//! Observer ──> BaseFunctions (0.1 nm synthesis, cached per observer)
//!                  │
//!             SplineBank ──> user grid / 1 nm standard grid / 0.1 nm fine grid
//!                  │
//!             transform solve (illuminant-E constraints + reference diagram fit)
//!                  │
//!             coordinate tables ──> purple-line extension ──> Results
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use cfb_data::VisualData;
//! use cfb_engine::Engine;
//!
//! let engine = Engine::new(VisualData::load()?);
//! let results = engine.compute(2.0, 32, 390.0, 830.0, 1.0)?;
//! println!("{:?}", results.trans_mat);
//! ```
//!
//! The engine is a pure function of its five scalar inputs: no I/O, no
//! observable side effects, reentrant across threads. The only shared
//! state is a memo cache of synthesized base functions keyed by observer,
//! which is immutable once populated.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod coords;
mod error;
mod grid;
mod observer;
mod purple;
mod resample;
mod results;
mod synth;
mod transform;

pub use error::{EngineError, EngineResult};
pub use grid::{LAMBDA_MAX_FLOOR, SpectralGrid, standard_wavelengths};
pub use observer::{AGE_MAX, AGE_MIN, FIELD_SIZE_MAX, FIELD_SIZE_MIN, Observer, TabulatedField};
pub use resample::SplineBank;
pub use results::{Results, Table, Termini, TerminiXyz};
pub use synth::{
    BaseFunctions, lm_pigment_peak_density, macular_peak_density, s_pigment_peak_density,
    synthesize,
};
pub use transform::{XyzSolution, reference_chromaticities, renormalize, solve_xyz};

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use cfb_data::VisualData;
use cfb_math::round_dp;

/// Significant figures of tabulated tristimulus values (and V(lambda)).
pub const XYZ_SIGNFIG: i32 = 7;
/// Decimal places of tabulated chromaticity coordinates.
pub const CC_DP: i32 = 5;
/// Decimal places of transformation-matrix entries.
pub const MAT_DP: i32 = 8;
/// Decimal places of MacLeod-Boynton coordinates.
pub const MB_DP: i32 = 6;
/// Decimal places of Maxwellian lm coordinates.
pub const LM_DP: i32 = 6;
/// Significant figures of the synthesized V(lambda).
pub(crate) const V_SIGNFIG: i32 = 7;

/// The computation engine: shared visual data plus the per-observer
/// base-function cache.
pub struct Engine {
    data: Arc<VisualData>,
    cache: Mutex<HashMap<(u64, u32), Arc<BaseFunctions>>>,
}

impl Engine {
    /// Creates an engine over a loaded data set.
    pub fn new(data: VisualData) -> Self {
        Self {
            data: Arc::new(data),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// The visual data this engine computes from.
    pub fn data(&self) -> &VisualData {
        &self.data
    }

    /// Base functions for an observer, synthesized once and memoized.
    ///
    /// Concurrent misses for the same observer may both synthesize; the
    /// results are bit-identical, so last-writer-wins is fine.
    fn base_functions(&self, observer: Observer) -> Arc<BaseFunctions> {
        let key = observer.cache_key();
        if let Some(hit) = self.cache.lock().map(|c| c.get(&key).cloned()).ok().flatten() {
            return hit;
        }
        let built = Arc::new(synth::synthesize(&self.data, observer));
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, built.clone());
        }
        built
    }

    /// Computes all colorimetric functions for an observer and grid.
    ///
    /// `lambda_max` is clamped into [700, 830]; the effective bound is
    /// reported in [`Results::lambda_max`] with
    /// [`Results::lambda_max_clamped`] set. All other invalid input is
    /// rejected before any synthesis work.
    pub fn compute(
        &self,
        field_size: f64,
        age: u32,
        lambda_min: f64,
        lambda_max: f64,
        lambda_step: f64,
    ) -> EngineResult<Results> {
        let observer = Observer::new(field_size, age)?;
        let grid = SpectralGrid::new(lambda_min, lambda_max, lambda_step)?;

        let base = self.base_functions(observer);
        let bank = SplineBank::new(&base)?;

        let spec = grid.wavelengths();
        let fine = grid.fine_wavelengths();

        let lms_spec = bank.lms_at(spec);
        let lms_std_spec = bank.lms_std_at(spec);
        let v_spec = bank.v_at(spec);

        let solution = solve_xyz(&bank, base.v_weights, &self.data, observer.field_size)?;
        let mat = solution.mat;

        // Spectral tables on the requested grid.
        let xyz = coords::xyz_table(spec, &lms_spec, &mat);
        let xy = coords::chromaticity_table(&xyz, CC_DP)?;
        let xy_white = coords::chromaticity_white(&xyz, CC_DP)?;

        let mat_n = if grid.is_standard() {
            mat
        } else {
            renormalize(&mat, &lms_spec)?
        };
        let xyz_n = coords::xyz_table(spec, &lms_spec, &mat_n);
        let xy_n = coords::chromaticity_table(&xyz_n, CC_DP)?;
        let xy_white_n = coords::chromaticity_white(&xyz_n, CC_DP)?;

        let mb = coords::mb_table(spec, &lms_spec, &v_spec, base.v_weights, base.mb_s_max, MB_DP)?;
        let mb_white = coords::mb_white(&lms_spec, base.v_weights, base.mb_s_max, MB_DP);
        let (lm, lm_white) = coords::lm_table(spec, &lms_spec, LM_DP)?;

        // Fine-grid loci for the tangent search.
        let lms_fine = bank.lms_at(&fine);
        let xyz_fine = coords::xyz_table(&fine, &lms_fine, &mat);
        let xy_fine = coords::chromaticity_table_raw(&xyz_fine)?;
        let xyz_fine_n = coords::xyz_table(&fine, &lms_fine, &mat_n);
        let xy_fine_n = coords::chromaticity_table_raw(&xyz_fine_n)?;
        let mb_fine =
            coords::mb_fine_table(&fine, &lms_fine, &xyz_fine, base.v_weights, base.mb_s_max)?;
        let lm_fine = coords::row_normalized(&fine, &lms_fine)?;

        // Tangent points, one hull per diagram.
        let edge_cc = purple::purple_edge(&locus_points(&xy_fine, 1, 2))?;
        let purple_line_cc = purple::termini(&xy_fine, edge_cc, (1, 2), Some(CC_DP));
        let purple_line_xyz = purple::termini_xyz(&xyz_fine, edge_cc);

        let edge_cc_n = purple::purple_edge(&locus_points(&xy_fine_n, 1, 2))?;
        let purple_line_cc_n = purple::termini(&xy_fine_n, edge_cc_n, (1, 2), Some(CC_DP));
        let purple_line_xyz_n = purple::termini_xyz(&xyz_fine_n, edge_cc_n);

        let edge_mb = purple::purple_edge(&locus_points(&mb_fine, 1, 3))?;
        let purple_line_mb = purple::termini(&mb_fine, edge_mb, (1, 3), Some(MB_DP));

        let edge_lm = purple::purple_edge(&locus_points(&lm_fine, 1, 2))?;
        let purple_line_lm = purple::termini(&lm_fine, edge_lm, (1, 2), Some(LM_DP));

        // Reference 1931/1964 diagrams.
        let xy31 = rounded_chromaticities(&self.data.cc31);
        let xy64 = rounded_chromaticities(&self.data.cc64);
        let edge31 = purple::purple_edge(&locus_points(&xy31, 1, 2))?;
        let purple_line_cc31 = purple::termini(&xy31, edge31, (1, 2), None);
        let edge64 = purple::purple_edge(&locus_points(&xy64, 1, 2))?;
        let purple_line_cc64 = purple::termini(&xy64, edge64, (1, 2), None);

        // Purple-line stimuli on the requested grid.
        let purple_xyz = purple::purple_tristimulus(&xy, &purple_line_xyz, &xy_white);
        let purple_cc = purple::purple_chromaticity(&purple_xyz)?;
        let purple_xyz_n = purple::purple_tristimulus(&xy_n, &purple_line_xyz_n, &xy_white_n);
        let purple_cc_n = purple::purple_chromaticity(&purple_xyz_n)?;
        let lambda_purple = results::purple_bounds(&purple_xyz);
        let lambda_purple_n = results::purple_bounds(&purple_xyz_n);

        Ok(Results {
            field_size: observer.field_size,
            age: observer.age,
            lambda_min: grid.lambda_min(),
            lambda_max: grid.lambda_max(),
            lambda_step: grid.step(),
            lambda_max_clamped: grid.clamped(),
            lambda_ref_min: solution.lambda_ref_min,
            lms: results::chop_table(coords::lms_table(spec, &lms_std_spec)),
            lms_base: results::chop_table(coords::lms_table(spec, &lms_spec)),
            xyz: results::chop_table(xyz),
            xyz_n: results::chop_table(xyz_n),
            xy: results::chop_table(xy),
            xy_n: results::chop_table(xy_n),
            mb: results::chop_table(mb),
            lm: results::chop_table(lm),
            xy_white: results::chop_point(xy_white),
            xy_white_n: results::chop_point(xy_white_n),
            mb_white: results::chop_point(mb_white),
            lm_white: results::chop_point(lm_white),
            trans_mat: mat,
            trans_mat_n: mat_n,
            purple_line_cc: results::chop_termini(purple_line_cc),
            purple_line_cc_n: results::chop_termini(purple_line_cc_n),
            purple_line_xyz: results::chop_termini_xyz(purple_line_xyz),
            purple_line_xyz_n: results::chop_termini_xyz(purple_line_xyz_n),
            purple_line_mb: results::chop_termini(purple_line_mb),
            purple_line_lm: results::chop_termini(purple_line_lm),
            purple_line_cc31,
            purple_line_cc64,
            purple_xyz: results::chop_table(purple_xyz),
            purple_xyz_n: results::chop_table(purple_xyz_n),
            purple_cc: results::chop_table(purple_cc),
            purple_cc_n: results::chop_table(purple_cc_n),
            lambda_purple,
            lambda_purple_n,
            xyz31: self.data.tables.xyz31.clone(),
            xyz64: self.data.tables.xyz64.clone(),
            xy31,
            xy64,
            mb_s_max: base.mb_s_max,
        })
    }
}

/// Extracts two columns of a table as a point list for the hull search.
fn locus_points(table: &Table, c1: usize, c2: usize) -> Vec<(f64, f64)> {
    table.iter().map(|row| (row[c1], row[c2])).collect()
}

/// Chromaticity rows rounded to the published 5 decimals.
fn rounded_chromaticities(cc: &[[f64; 4]]) -> Table {
    cc.iter()
        .map(|row| {
            [
                row[0],
                round_dp(row[1], CC_DP),
                round_dp(row[2], CC_DP),
                round_dp(row[3], CC_DP),
            ]
        })
        .collect()
}
