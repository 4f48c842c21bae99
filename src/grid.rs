//! Loading of exported thermal grids.
//!
//! The microscope software exports temperatures as comma
//! separated text: a few header lines followed by one line
//! per sensor row. Every data line ends with a stray
//! delimiter, so the last column of the file is always
//! empty and is dropped while loading. Anything after a
//! `#` is a comment.
//!
//! Loading mirrors "unpack" semantics: the file matrix is
//! transposed, its last row (the empty column) removed, and
//! the result rotated a quarter turn counter-clockwise. For
//! a file with `r` data lines of `c` fields the resulting
//! [`Grid`] has shape `(r, c - 1)` and
//! `grid[(i, j)] == file[r - 1 - i][j]`: row `0` of the grid
//! is the last line of the file, drawn at the bottom of the
//! image.

use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    ops::Index,
    path::Path,
};

use ndarray::{s, Array2, ArrayView2};
use serde_derive::*;
use tracing::debug;

use crate::error::{Error, Result};

/// Options controlling how a text grid is parsed.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoadOptions {
    /// Lines to skip before the numeric data.
    pub header_lines: usize,

    pub delimiter: u8,

    /// Drop the last row of the unpacked array (the empty
    /// trailing column of the file).
    pub drop_trailing: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            header_lines: 4,
            delimiter: b',',
            drop_trailing: true,
        }
    }
}

/// Immutable 2D array of temperature samples indexed by
/// `(row, col)`, i.e. `(y, x)` in image space.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    values: Array2<f64>,
}

impl Grid {
    pub fn new(values: Array2<f64>) -> Result<Self> {
        let (rows, cols) = values.dim();
        if rows == 0 || cols == 0 {
            return Err(Error::DataFormat(format!(
                "grid must not be empty (got {}x{})",
                rows, cols
            )));
        }
        Ok(Grid { values })
    }

    pub fn load<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Self> {
        let path = path.as_ref();
        let grid = Self::from_reader(File::open(path)?, options)?;
        debug!(
            path = %path.display(),
            rows = grid.rows(),
            cols = grid.cols(),
            "loaded thermal grid"
        );
        Ok(grid)
    }

    pub fn from_reader<R: Read>(rdr: R, options: &LoadOptions) -> Result<Self> {
        let mut rdr = BufReader::new(rdr);
        // Headers may carry non UTF-8 text (e.g. a Latin-1 degree sign).
        let mut line = Vec::new();
        for _ in 0..options.header_lines {
            line.clear();
            if rdr.read_until(b'\n', &mut line)? == 0 {
                break;
            }
        }
        let body = strip_comments(rdr)?;
        let file = read_matrix(&body[..], options.delimiter, options.header_lines)?;

        // Unpack, drop the empty trailing column, rotate.
        let unpacked = file.t();
        let min_rows = if options.drop_trailing { 2 } else { 1 };
        if unpacked.nrows() < min_rows {
            return Err(Error::DataFormat(format!(
                "expected at least {} fields per line, found {}",
                min_rows,
                unpacked.nrows()
            )));
        }
        let unpacked = if options.drop_trailing {
            unpacked.slice_move(s![..-1, ..])
        } else {
            unpacked
        };
        Self::new(rot90(unpacked).to_owned())
    }

    pub fn rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn cols(&self) -> usize {
        self.values.ncols()
    }

    /// `(rows, cols)`
    pub fn dim(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get((row, col)).copied()
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Smallest and largest non-NaN value, if any.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

impl Index<(usize, usize)> for Grid {
    type Output = f64;

    fn index(&self, idx: (usize, usize)) -> &f64 {
        &self.values[idx]
    }
}

/// Rotate a quarter turn counter-clockwise: the last
/// column becomes the first row.
fn rot90(a: ArrayView2<'_, f64>) -> ArrayView2<'_, f64> {
    a.reversed_axes().slice_move(s![..;-1, ..])
}

/// Cut every line at its first `#`. Lines are kept (possibly
/// empty) so reported line numbers still match the file.
fn strip_comments<R: BufRead>(rdr: R) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    for line in rdr.split(b'\n') {
        let line = line?;
        let end = line.iter().position(|&b| b == b'#').unwrap_or(line.len());
        let kept = &line[..end];
        if !kept.iter().all(u8::is_ascii_whitespace) {
            body.extend_from_slice(kept);
        }
        body.push(b'\n');
    }
    Ok(body)
}

fn read_matrix<R: Read>(rdr: R, delimiter: u8, line_offset: usize) -> Result<Array2<f64>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(rdr);

    let mut width = None;
    let mut height = 0;
    let mut values = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let line = line_offset as u64 + record.position().map_or(0, |p| p.line());
        match width {
            None => width = Some(record.len()),
            Some(w) if w != record.len() => {
                return Err(Error::DataFormat(format!(
                    "line {}: expected {} fields, found {}",
                    line,
                    w,
                    record.len()
                )))
            }
            _ => {}
        }
        for (idx, field) in record.iter().enumerate() {
            values.push(parse_field(field).ok_or_else(|| {
                Error::DataFormat(format!(
                    "line {}: field {} (`{}`) is not a number",
                    line,
                    idx + 1,
                    field
                ))
            })?);
        }
        height += 1;
    }

    let width = width.ok_or_else(|| Error::DataFormat("no data lines after header".into()))?;
    Array2::from_shape_vec((height, width), values)
        .map_err(|e| Error::DataFormat(format!("inconsistent grid shape: {}", e)))
}

/// Empty fields are missing values.
fn parse_field(field: &str) -> Option<f64> {
    if field.is_empty() {
        Some(f64::NAN)
    } else {
        field.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    const HEADER: &str = "QFI export\nobjective: 5x\nemissivity: 1.0\nunits: C\n";

    fn load(body: &str) -> Result<Grid> {
        let text = format!("{}{}", HEADER, body);
        Grid::from_reader(text.as_bytes(), &LoadOptions::default())
    }

    #[test]
    fn test_shape_law_worked_example() -> Result<()> {
        // 3 data lines, 4 fields each (the last one empty).
        let grid = load("1,2,3,\n4,5,6,\n7,8,9,\n")?;
        assert_eq!(grid.dim(), (3, 3));
        assert_eq!(
            grid.values(),
            &array![[7., 8., 9.], [4., 5., 6.], [1., 2., 3.]]
        );
        Ok(())
    }

    #[test]
    fn test_drops_exactly_one_column() -> Result<()> {
        let grid = load("1,2,3\n4,5,6\n")?;
        assert_eq!(grid.values(), &array![[4., 5.], [1., 2.]]);
        Ok(())
    }

    #[test]
    fn test_non_square_orientation() -> Result<()> {
        let grid = load("10,11,12,13,\n20,21,22,23,\n")?;
        assert_eq!(grid.dim(), (2, 4));
        assert_eq!(grid[(0, 0)], 20.);
        assert_eq!(grid[(1, 3)], 13.);
        Ok(())
    }

    #[test]
    fn test_keep_trailing_column() -> Result<()> {
        let options = LoadOptions {
            drop_trailing: false,
            ..Default::default()
        };
        let text = format!("{}1,2\n3,4\n", HEADER);
        let grid = Grid::from_reader(text.as_bytes(), &options)?;
        assert_eq!(grid.values(), &array![[3., 4.], [1., 2.]]);
        Ok(())
    }

    #[test]
    fn test_whitespace_comments_and_blank_lines() -> Result<()> {
        let grid = load("# calibration run\n 1.5 , 2.5 ,\n\n3.5,4.5,\n")?;
        assert_eq!(grid.values(), &array![[3.5, 4.5], [1.5, 2.5]]);
        Ok(())
    }

    #[test]
    fn test_trailing_comment_ignored() -> Result<()> {
        let grid = load("1,2,3, # calibrated\n4,5,6,#\n")?;
        assert_eq!(grid.values(), &array![[4., 5., 6.], [1., 2., 3.]]);
        Ok(())
    }

    #[test]
    fn test_latin1_header() -> Result<()> {
        let mut text = b"QFI export\nUnits: \xB0C\nemissivity: 1.0\n\n".to_vec();
        text.extend_from_slice(b"1,2,3,\n4,5,6,\n");
        let grid = Grid::from_reader(&text[..], &LoadOptions::default())?;
        assert_eq!(grid.values(), &array![[4., 5., 6.], [1., 2., 3.]]);
        Ok(())
    }

    #[test]
    fn test_comment_keeps_line_numbers() {
        let err = load("  # note\n1,2,3,\n4,x,6,\n").unwrap_err();
        assert!(err.to_string().contains("line 7"), "{}", err);
    }

    #[test]
    fn test_empty_field_is_nan() -> Result<()> {
        let grid = load("1,,3,\n4,5,6,\n")?;
        assert!(grid[(1, 1)].is_nan());
        assert_eq!(grid.value_range(), Some((1., 6.)));
        Ok(())
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = load("1,2,3,\n4,5,\n").unwrap_err();
        assert!(matches!(err, Error::DataFormat(_)), "{}", err);
    }

    #[test]
    fn test_non_numeric_rejected() {
        let err = load("1,2,x,\n4,5,6,\n").unwrap_err();
        assert!(err.to_string().contains("`x`"), "{}", err);
    }

    #[test]
    fn test_single_column_rejected() {
        assert!(matches!(load("1\n2\n"), Err(Error::DataFormat(_))));
    }

    #[test]
    fn test_header_only_rejected() {
        assert!(matches!(load(""), Err(Error::DataFormat(_))));
    }

    #[test]
    fn test_empty_array_rejected() {
        assert!(Grid::new(Array2::zeros((0, 3))).is_err());
    }
}
