//! CSV export with the published per-table precisions.
//!
//! Each table serializes as `wavelength, c1, c2, c3` with the numeric
//! format of the reference distribution: wavelengths at one decimal,
//! tristimulus values in scientific notation at 7 significant figures,
//! base fundamentals at 9, standard fundamentals at 6, chromaticities at
//! 5 decimals, MacLeod-Boynton at 6 and Maxwellian lm at 5.

use std::io::Write;

use anyhow::{Result, bail};
use cfb_engine::{Results, Table};

/// The exportable coordinate tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// Cone fundamentals, 6 significant figures.
    Lms,
    /// Cone fundamentals, 9 significant figures.
    LmsBase,
    /// Tristimulus functions.
    Xyz,
    /// Tristimulus functions, renormalized.
    XyzN,
    /// Chromaticity coordinates.
    Xy,
    /// Chromaticity coordinates, renormalized.
    XyN,
    /// MacLeod-Boynton coordinates.
    Mb,
    /// Maxwellian lm coordinates.
    Lm,
    /// Purple-line tristimulus values.
    PurpleXyz,
    /// Purple-line tristimulus values, renormalized.
    PurpleXyzN,
    /// Purple-line chromaticities.
    PurpleXy,
    /// Purple-line chromaticities, renormalized.
    PurpleXyN,
}

impl TableKind {
    /// Parses a table name as given on the command line.
    pub fn parse(name: &str) -> Result<Self> {
        Ok(match name {
            "lms" => Self::Lms,
            "lms-base" => Self::LmsBase,
            "xyz" => Self::Xyz,
            "xyz-n" => Self::XyzN,
            "xy" => Self::Xy,
            "xy-n" => Self::XyN,
            "mb" => Self::Mb,
            "lm" => Self::Lm,
            "purple-xyz" => Self::PurpleXyz,
            "purple-xyz-n" => Self::PurpleXyzN,
            "purple-xy" => Self::PurpleXy,
            "purple-xy-n" => Self::PurpleXyN,
            other => bail!(
                "unknown table {other:?}; expected one of lms, lms-base, xyz, xyz-n, \
                 xy, xy-n, mb, lm, purple-xyz, purple-xyz-n, purple-xy, purple-xy-n"
            ),
        })
    }

    fn rows<'a>(&self, results: &'a Results) -> &'a Table {
        match self {
            Self::Lms => &results.lms,
            Self::LmsBase => &results.lms_base,
            Self::Xyz => &results.xyz,
            Self::XyzN => &results.xyz_n,
            Self::Xy => &results.xy,
            Self::XyN => &results.xy_n,
            Self::Mb => &results.mb,
            Self::Lm => &results.lm,
            Self::PurpleXyz => &results.purple_xyz,
            Self::PurpleXyzN => &results.purple_xyz_n,
            Self::PurpleXy => &results.purple_cc,
            Self::PurpleXyN => &results.purple_cc_n,
        }
    }

    fn format_row(&self, row: &[f64; 4]) -> String {
        match self {
            Self::Lms => format!(
                "{:.1}, {:.5e}, {:.5e}, {:.5e}",
                row[0], row[1], row[2], row[3]
            ),
            Self::LmsBase => format!(
                "{:.1}, {:.8e}, {:.8e}, {:.8e}",
                row[0], row[1], row[2], row[3]
            ),
            Self::Xyz | Self::XyzN | Self::PurpleXyz | Self::PurpleXyzN => format!(
                "{:.1}, {:.6e}, {:.6e}, {:.6e}",
                row[0], row[1], row[2], row[3]
            ),
            Self::Xy | Self::XyN | Self::PurpleXy | Self::PurpleXyN => format!(
                "{:.1}, {:.5}, {:.5}, {:.5}",
                row[0], row[1], row[2], row[3]
            ),
            Self::Mb => format!(
                "{:.1}, {:.6}, {:.6}, {:.6}",
                row[0], row[1], row[2], row[3]
            ),
            Self::Lm => format!(
                "{:.1}, {:.5}, {:.5}, {:.5}",
                row[0], row[1], row[2], row[3]
            ),
        }
    }
}

/// Writes one table as CSV.
pub fn write_table(out: &mut dyn Write, results: &Results, kind: TableKind) -> Result<()> {
    for row in kind.rows(results) {
        writeln!(out, "{}", kind.format_row(row))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_names() {
        assert_eq!(TableKind::parse("xyz").unwrap(), TableKind::Xyz);
        assert_eq!(TableKind::parse("purple-xy-n").unwrap(), TableKind::PurpleXyN);
        assert!(TableKind::parse("nope").is_err());
    }

    #[test]
    fn test_xy_format_five_decimals() {
        let row = [555.0, 0.123456789, 0.2, 0.3];
        let line = TableKind::Xy.format_row(&row);
        assert_eq!(line, "555.0, 0.12346, 0.20000, 0.30000");
    }

    #[test]
    fn test_lms_base_format_scientific() {
        let row = [390.0, 0.00296382862, 0.000284342908, 0.00642600117];
        let line = TableKind::LmsBase.format_row(&row);
        assert!(line.starts_with("390.0, 2.96382862e-3"));
    }

    #[test]
    fn test_mb_format_six_decimals() {
        let row = [500.0, 0.65, 0.35, 0.0123456];
        let line = TableKind::Mb.format_row(&row);
        assert!(line.ends_with("0.012346"));
    }
}
