//! Points, drag segments and nearest-neighbour profiles.

use serde_derive::*;

use crate::{
    error::{Error, Result},
    grid::Grid,
};

/// A position in the image's data coordinates: `x` runs
/// along grid columns and `y` along grid rows.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn lerp(&self, other: &Point, t: f64) -> Point {
        Point {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point { x, y }
    }
}

/// One completed drag, from the press to the release point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub fn new(start: Point, end: Point) -> Self {
        Segment { start, end }
    }

    pub fn length(&self) -> f64 {
        self.start.distance(&self.end)
    }

    /// Number of samples taken along the segment: the
    /// length rounded to the nearest integer, and never less
    /// than one so a click without movement still samples
    /// the pressed cell.
    pub fn sample_count(&self) -> usize {
        (self.length().round() as usize).max(1)
    }

    /// Evenly spaced points from `start` to `end`, both
    /// included.
    pub fn sample_points(&self) -> Vec<Point> {
        let n = self.sample_count();
        if n == 1 {
            return vec![self.start];
        }
        let last = (n - 1) as f64;
        (0..n)
            .map(|k| {
                if k == n - 1 {
                    self.end
                } else {
                    self.start.lerp(&self.end, k as f64 / last)
                }
            })
            .collect()
    }
}

/// A single nearest-neighbour lookup.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Sample {
    pub row: usize,
    pub col: usize,
    pub value: f64,
}

/// Values sampled along a [`Segment`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Profile {
    pub segment: Segment,
    pub samples: Vec<Sample>,
}

impl Profile {
    /// Sample `grid` along `segment` by truncating each
    /// interpolated position to a cell index.
    ///
    /// Positions on the far edge of the grid (or up to one
    /// cell past either edge) are clamped onto the border
    /// cells. Anything further out, or a non-finite position,
    /// fails with [`Error::IndexOutOfRange`].
    pub fn sample(grid: &Grid, segment: Segment) -> Result<Self> {
        let (rows, cols) = grid.dim();
        let samples = segment
            .sample_points()
            .into_iter()
            .map(|p| {
                let row = cell_index(p.y, rows, "y")?;
                let col = cell_index(p.x, cols, "x")?;
                Ok(Sample {
                    row,
                    col,
                    value: grid[(row, col)],
                })
            })
            .collect::<Result<_>>()?;
        Ok(Profile { segment, samples })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.value).collect()
    }
}

fn cell_index(coordinate: f64, len: usize, axis: &'static str) -> Result<usize> {
    let idx = coordinate.trunc();
    if !idx.is_finite() || idx < -1. || idx > len as f64 {
        return Err(Error::IndexOutOfRange {
            axis,
            coordinate,
            len,
        });
    }
    Ok((idx.max(0.) as usize).min(len - 1))
}
