//! # cfb-data
//!
//! Tabulated visual data for the CIE cone-fundamental observer model.
//!
//! The physiological observer model is anchored in measured tables published
//! with CIE TC 1-97 (Stockman-Sharpe low-density photopigment absorbances,
//! macular and ocular-media optical densities, the tabulated 2 deg and
//! 10 deg cone fundamentals and luminous-efficiency functions) plus the
//! classical CIE 1931/1964 colour-matching functions. Those tables are an
//! external data dependency: this crate loads them from CSV files at
//! runtime, it does not embed them.
//!
//! # Data directory
//!
//! [`VisualData::load`] resolves the directory from the `CFB_DATA`
//! environment variable, falling back to `./data`. The expected files are
//! the ones shipped with the reference ciefunctions distribution:
//!
//! | File | Content |
//! |---|---|
//! | `absorbances0_1nm.csv` | absorbances, ocular media (32 yr), macular pigment |
//! | `linss2_10e_fine_8dp.csv` / `linss2_10e_fine.csv` | 2 deg energy fundamentals (8 dp / 6 sig. fig.) |
//! | `linss10e_fine_8dp.csv` / `linss10e_fine.csv` | 10 deg energy fundamentals |
//! | `linCIE2015v2e_fine_8dp.csv` / `linCIE2015v10e_fine_8dp.csv` | V(lambda), energy scale |
//! | `ciexyz31_1.csv` / `ciexyz64_1.csv` | CIE 1931 / 1964 colour-matching functions |
//! | `docul2.csv` | short-wavelength part of the ocular-media split |
//!
//! All fine tables are tabulated on the reference grid, 390-830 nm at
//! 0.1 nm (4401 samples); the colour-matching functions at 360-830 nm,
//! 1 nm (471 rows). Loading validates both.
//!
//! # Used By
//!
//! - `cfb-engine` - base-function synthesis and the transform solver

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod csv;
mod error;

pub use error::{DataError, DataResult};

use std::path::Path;

use cfb_math::CubicSpline;

/// Lower bound of the reference wavelength grid, nm.
pub const REF_MIN: f64 = 390.0;
/// Upper bound of the reference wavelength grid, nm.
pub const REF_MAX: f64 = 830.0;
/// Step of the reference wavelength grid, nm.
pub const REF_STEP: f64 = 0.1;
/// Number of samples on the reference grid.
pub const REF_LEN: usize = 4401;

/// Number of rows in the 1931/1964 colour-matching-function tables.
pub const CMF_LEN: usize = 471;
/// First wavelength of the colour-matching-function tables, nm.
pub const CMF_MIN: f64 = 360.0;

/// The reference wavelength grid, 390.0 to 830.0 nm in 0.1 nm steps.
///
/// Generated from integer tenths so every value is exact to one decimal.
pub fn reference_wavelengths() -> Vec<f64> {
    (0..REF_LEN).map(|i| (3900 + i) as f64 / 10.0).collect()
}

/// Maximum macular pigment density of the 2 deg tabulation.
///
/// The tabulated 2 deg macular density peaks at 0.35; dividing by it gives
/// the relative density profile scaled per field size during synthesis.
const MACULA_2DEG_PEAK: f64 = 0.35;

/// Raw file columns, before any derivation.
///
/// Fields are tabulated on the reference grid (4401 samples) unless noted.
#[derive(Debug, Clone)]
pub struct VisualTables {
    /// Low-density photopigment absorbances, log10 scale, [L, M, S].
    pub absorbance: [Vec<f64>; 3],
    /// Macular pigment optical density for a 2 deg field.
    pub macula_2deg: Vec<f64>,
    /// Ocular media optical density for a 32-year observer.
    pub ocular_sum_32: Vec<f64>,
    /// Tabulated 2 deg energy cone fundamentals, 8 decimal places, [L, M, S].
    pub lms2_energy: [Vec<f64>; 3],
    /// Tabulated 2 deg energy cone fundamentals, 6 significant figures.
    pub lms2_energy_std: [Vec<f64>; 3],
    /// Tabulated 10 deg energy cone fundamentals, 8 decimal places.
    pub lms10_energy: [Vec<f64>; 3],
    /// Tabulated 10 deg energy cone fundamentals, 6 significant figures.
    pub lms10_energy_std: [Vec<f64>; 3],
    /// Tabulated 2 deg luminous efficiency, energy scale.
    pub v2_energy: Vec<f64>,
    /// Tabulated 10 deg luminous efficiency, energy scale.
    pub v10_energy: Vec<f64>,
    /// CIE 1931 colour-matching functions, rows (lambda, x, y, z), 1 nm.
    pub xyz31: Vec<[f64; 4]>,
    /// CIE 1964 colour-matching functions, rows (lambda, x, y, z), 1 nm.
    pub xyz64: Vec<[f64; 4]>,
    /// Tabulated short-wavelength ocular-media component, rows (lambda, d).
    pub docul2: Vec<[f64; 2]>,
}

/// The complete visual-data set: raw tables plus the derived quantities
/// every computation starts from.
///
/// Immutable once constructed; the engine shares one instance across all
/// invocations.
#[derive(Debug, Clone)]
pub struct VisualData {
    /// The raw tables.
    pub tables: VisualTables,
    /// Reference grid wavelengths.
    pub wavelengths: Vec<f64>,
    /// Macular pigment density relative to its 2 deg peak.
    pub macula_rel: Vec<f64>,
    /// Age-dependent part of the ocular-media density, reference grid.
    pub docul1_fine: Vec<f64>,
    /// Age-independent part of the ocular-media density, reference grid.
    pub docul2_fine: Vec<f64>,
    /// CIE 1931 chromaticities, rows (lambda, x, y, z).
    pub cc31: Vec<[f64; 4]>,
    /// CIE 1964 chromaticities, rows (lambda, x, y, z).
    pub cc64: Vec<[f64; 4]>,
    /// Interpolation knots for the 1931 diagram.
    pub cc31_knots: [f64; 5],
    /// Interpolation knots for the 1964 diagram.
    pub cc64_knots: [f64; 5],
}

impl VisualData {
    /// Builds the data set from raw tables, computing the derived parts.
    pub fn new(tables: VisualTables) -> DataResult<Self> {
        validate_fine(&tables.macula_2deg, "absorbances0_1nm.csv")?;
        validate_fine(&tables.ocular_sum_32, "absorbances0_1nm.csv")?;
        for series in &tables.absorbance {
            validate_fine(series, "absorbances0_1nm.csv")?;
        }
        for set in [
            (&tables.lms2_energy, "linss2_10e_fine_8dp.csv"),
            (&tables.lms2_energy_std, "linss2_10e_fine.csv"),
            (&tables.lms10_energy, "linss10e_fine_8dp.csv"),
            (&tables.lms10_energy_std, "linss10e_fine.csv"),
        ] {
            for series in set.0 {
                validate_fine(series, set.1)?;
            }
        }
        validate_fine(&tables.v2_energy, "linCIE2015v2e_fine_8dp.csv")?;
        validate_fine(&tables.v10_energy, "linCIE2015v10e_fine_8dp.csv")?;
        validate_cmf(&tables.xyz31, "ciexyz31_1.csv")?;
        validate_cmf(&tables.xyz64, "ciexyz64_1.csv")?;

        let wavelengths = reference_wavelengths();
        let macula_rel = tables
            .macula_2deg
            .iter()
            .map(|d| d / MACULA_2DEG_PEAK)
            .collect();

        let docul2_fine = docul2_on_reference_grid(&tables.docul2, &wavelengths)?;
        let docul1_fine: Vec<f64> = tables
            .ocular_sum_32
            .iter()
            .zip(&docul2_fine)
            .map(|(sum, d2)| sum - d2)
            .collect();

        let cc31 = chromaticities(&tables.xyz31);
        let cc64 = chromaticities(&tables.xyz64);
        let cc31_knots = chromaticity_knots(&cc31);
        let cc64_knots = chromaticity_knots(&cc64);

        Ok(Self {
            tables,
            wavelengths,
            macula_rel,
            docul1_fine,
            docul2_fine,
            cc31,
            cc64,
            cc31_knots,
            cc64_knots,
        })
    }

    /// Loads the data set from a directory of CSV files.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> DataResult<Self> {
        let dir = dir.as_ref();
        let read = |name: &str, pad: f64| csv::read_table(dir.join(name), pad);

        // Column layout of absorbances0_1nm.csv: wavelength, reserved,
        // L, M, S absorbance, ocular media sum (32 yr), macular density.
        let absorbances = read("absorbances0_1nm.csv", f64::NEG_INFINITY)?;
        let absorbance = [
            csv::column(&absorbances, 2, "absorbances0_1nm.csv")?,
            csv::column(&absorbances, 3, "absorbances0_1nm.csv")?,
            csv::column(&absorbances, 4, "absorbances0_1nm.csv")?,
        ];
        let ocular_sum_32 = csv::column(&absorbances, 5, "absorbances0_1nm.csv")?;
        let macula_2deg = csv::column(&absorbances, 6, "absorbances0_1nm.csv")?;

        let lms = |name: &str| -> DataResult<[Vec<f64>; 3]> {
            let rows = read(name, 0.0)?;
            Ok([
                csv::column(&rows, 1, name)?,
                csv::column(&rows, 2, name)?,
                csv::column(&rows, 3, name)?,
            ])
        };

        let tables = VisualTables {
            absorbance,
            macula_2deg,
            ocular_sum_32,
            lms2_energy: lms("linss2_10e_fine_8dp.csv")?,
            lms2_energy_std: lms("linss2_10e_fine.csv")?,
            lms10_energy: lms("linss10e_fine_8dp.csv")?,
            lms10_energy_std: lms("linss10e_fine.csv")?,
            v2_energy: csv::column(
                &read("linCIE2015v2e_fine_8dp.csv", 0.0)?,
                1,
                "linCIE2015v2e_fine_8dp.csv",
            )?,
            v10_energy: csv::column(
                &read("linCIE2015v10e_fine_8dp.csv", 0.0)?,
                1,
                "linCIE2015v10e_fine_8dp.csv",
            )?,
            xyz31: four_columns(&read("ciexyz31_1.csv", f64::NEG_INFINITY)?, "ciexyz31_1.csv")?,
            xyz64: four_columns(&read("ciexyz64_1.csv", f64::NEG_INFINITY)?, "ciexyz64_1.csv")?,
            docul2: two_columns(&read("docul2.csv", f64::NEG_INFINITY)?, "docul2.csv")?,
        };
        Self::new(tables)
    }

    /// Loads from `$CFB_DATA`, falling back to `./data`.
    pub fn load() -> DataResult<Self> {
        let dir = std::env::var("CFB_DATA").unwrap_or_else(|_| "data".into());
        Self::from_dir(dir)
    }
}

fn validate_fine(series: &[f64], file: &str) -> DataResult<()> {
    if series.len() != REF_LEN {
        return Err(DataError::Malformed {
            file: file.to_string(),
            message: format!("expected {} samples on the 0.1 nm grid, found {}", REF_LEN, series.len()),
        });
    }
    Ok(())
}

fn validate_cmf(rows: &[[f64; 4]], file: &str) -> DataResult<()> {
    if rows.len() != CMF_LEN || rows[0][0] != CMF_MIN || rows[CMF_LEN - 1][0] != REF_MAX {
        return Err(DataError::Malformed {
            file: file.to_string(),
            message: format!("expected {} rows over 360-830 nm at 1 nm", CMF_LEN),
        });
    }
    Ok(())
}

fn four_columns(rows: &[Vec<f64>], name: &str) -> DataResult<Vec<[f64; 4]>> {
    rows.iter()
        .map(|row| {
            if row.len() < 4 {
                Err(DataError::Malformed {
                    file: name.to_string(),
                    message: "expected four columns".into(),
                })
            } else {
                Ok([row[0], row[1], row[2], row[3]])
            }
        })
        .collect()
}

fn two_columns(rows: &[Vec<f64>], name: &str) -> DataResult<Vec<[f64; 2]>> {
    rows.iter()
        .map(|row| {
            if row.len() < 2 {
                Err(DataError::Malformed {
                    file: name.to_string(),
                    message: "expected two columns".into(),
                })
            } else {
                Ok([row[0], row[1]])
            }
        })
        .collect()
}

/// Splines the tabulated docul2 component onto the reference grid.
///
/// The tabulation stops below 460 nm; the component is zero from there on,
/// so the table is padded with zeros at 5 nm steps up to 830 nm before
/// fitting the spline.
fn docul2_on_reference_grid(docul2: &[[f64; 2]], wavelengths: &[f64]) -> DataResult<Vec<f64>> {
    let mut xs: Vec<f64> = docul2.iter().map(|r| r[0]).collect();
    let mut ys: Vec<f64> = docul2.iter().map(|r| r[1]).collect();
    let mut pad = 460.0;
    while pad <= 830.0 {
        xs.push(pad);
        ys.push(0.0);
        pad += 5.0;
    }
    let spline = CubicSpline::new(&xs, &ys).ok_or_else(|| DataError::Malformed {
        file: "docul2.csv".to_string(),
        message: "wavelengths must be strictly increasing and end below 460 nm".into(),
    })?;
    Ok(spline.eval_many(wavelengths))
}

/// Chromaticity coordinates of a colour-matching-function table.
fn chromaticities(cmf: &[[f64; 4]]) -> Vec<[f64; 4]> {
    cmf.iter()
        .map(|row| {
            let sum = row[1] + row[2] + row[3];
            [row[0], row[1] / sum, row[2] / sum, row[3] / sum]
        })
        .collect()
}

/// Interpolation knots of a chromaticity diagram: the domain endpoints,
/// the x minimum, the y maximum, and 700 nm.
fn chromaticity_knots(cc: &[[f64; 4]]) -> [f64; 5] {
    let mut min_x = 0usize;
    let mut max_y = 0usize;
    for (i, row) in cc.iter().enumerate() {
        if row[1] < cc[min_x][1] {
            min_x = i;
        }
        if row[2] > cc[max_y][2] {
            max_y = i;
        }
    }
    [cc[0][0], cc[min_x][0], cc[max_y][0], 700.0, cc[cc.len() - 1][0]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_reference_wavelengths() {
        let wl = reference_wavelengths();
        assert_eq!(wl.len(), REF_LEN);
        assert_eq!(wl[0], 390.0);
        assert_eq!(wl[REF_LEN - 1], 830.0);
        assert_eq!(wl[1], 390.1);
    }

    #[test]
    fn test_chromaticities_sum_to_one() {
        let cmf = vec![[500.0, 0.2, 0.3, 0.5], [501.0, 1.0, 1.0, 2.0]];
        let cc = chromaticities(&cmf);
        assert_abs_diff_eq!(cc[0][1] + cc[0][2] + cc[0][3], 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(cc[1][1], 0.25, epsilon = 1e-15);
    }

    #[test]
    fn test_chromaticity_knots() {
        let cc = vec![
            [360.0, 0.4, 0.1, 0.5],
            [500.0, 0.1, 0.8, 0.1],
            [600.0, 0.6, 0.4, 0.0],
            [830.0, 0.7, 0.3, 0.0],
        ];
        let knots = chromaticity_knots(&cc);
        assert_eq!(knots, [360.0, 500.0, 500.0, 700.0, 830.0]);
    }

    #[test]
    fn test_docul2_padding_reaches_zero() {
        let docul2 = vec![
            [390.0, 0.6],
            [400.0, 0.4],
            [420.0, 0.2],
            [440.0, 0.1],
            [455.0, 0.02],
        ];
        let wl = reference_wavelengths();
        let fine = docul2_on_reference_grid(&docul2, &wl).unwrap();
        assert_eq!(fine.len(), REF_LEN);
        assert_abs_diff_eq!(fine[0], 0.6, epsilon = 1e-12);
        // Zero on the padded long-wavelength tail.
        assert_abs_diff_eq!(fine[REF_LEN - 1], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_validate_fine_rejects_short_series() {
        assert!(validate_fine(&vec![0.0; 100], "t.csv").is_err());
        assert!(validate_fine(&vec![0.0; REF_LEN], "t.csv").is_ok());
    }

    #[test]
    fn test_from_dir_names_the_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        match VisualData::from_dir(dir.path()) {
            Err(DataError::MissingFile(name)) => assert_eq!(name, "absorbances0_1nm.csv"),
            other => panic!("expected MissingFile, got {other:?}"),
        }
    }
}
