//! CSV table parsing.
//!
//! The visual-data tables ship as plain comma-separated files with no
//! header row. Some tables leave cells empty where a function is not
//! defined; the caller chooses the pad value that stands in for them
//! (negative infinity for logarithmic densities, zero for linear ones).

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::{DataError, DataResult};

/// Reads a numeric CSV table, replacing empty cells with `pad`.
pub fn read_table<P: AsRef<Path>>(path: P, pad: f64) -> DataResult<Vec<Vec<f64>>> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DataError::MissingFile(name.clone()),
        _ => DataError::Io(e),
    })?;
    parse_table(BufReader::new(file), &name, pad)
}

/// Parses a numeric CSV table from a reader.
pub fn parse_table<R: BufRead>(reader: R, name: &str, pad: f64) -> DataResult<Vec<Vec<f64>>> {
    let mut rows = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut row = Vec::new();
        for cell in line.split(',') {
            let cell = cell.trim();
            if cell.is_empty() {
                row.push(pad);
            } else {
                row.push(cell.parse::<f64>().map_err(|e| DataError::Parse {
                    file: name.to_string(),
                    line: lineno + 1,
                    message: format!("{cell:?}: {e}"),
                })?);
            }
        }
        rows.push(row);
    }
    if rows.is_empty() {
        return Err(DataError::Malformed {
            file: name.to_string(),
            message: "empty table".into(),
        });
    }
    Ok(rows)
}

/// Extracts one column from a parsed table.
pub fn column(rows: &[Vec<f64>], index: usize, name: &str) -> DataResult<Vec<f64>> {
    rows.iter()
        .map(|row| {
            row.get(index).copied().ok_or_else(|| DataError::Malformed {
                file: name.to_string(),
                message: format!("row has no column {index}"),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_simple() {
        let rows = parse_table(Cursor::new("390.0,1.5\n390.1,2.5\n"), "t.csv", 0.0).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec![390.0, 1.5]);
    }

    #[test]
    fn test_empty_cells_padded() {
        let rows = parse_table(Cursor::new("390.0,,3.0\n"), "t.csv", f64::NEG_INFINITY).unwrap();
        assert_eq!(rows[0][0], 390.0);
        assert_eq!(rows[0][1], f64::NEG_INFINITY);
        assert_eq!(rows[0][2], 3.0);
    }

    #[test]
    fn test_parse_error_reports_location() {
        let err = parse_table(Cursor::new("390.0,ok\n"), "t.csv", 0.0).unwrap_err();
        match err {
            DataError::Parse { file, line, .. } => {
                assert_eq!(file, "t.csv");
                assert_eq!(line, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_table_rejected() {
        assert!(parse_table(Cursor::new("\n\n"), "t.csv", 0.0).is_err());
    }

    #[test]
    fn test_column() {
        let rows = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        assert_eq!(column(&rows, 1, "t.csv").unwrap(), vec![2.0, 4.0]);
        assert!(column(&rows, 2, "t.csv").is_err());
    }
}
