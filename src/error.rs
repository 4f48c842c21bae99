//! Error types for loading grids and extracting line slices.

use thiserror::Error;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The input could not be read as a rectangular numeric grid.
    #[error("malformed thermal grid: {0}")]
    DataFormat(String),

    /// A line-slice controller was bound to a surface that does not
    /// display a 2D scalar grid.
    #[error("cannot bind line slice: {0}")]
    InvalidBinding(String),

    /// A sample position escaped the grid by more than one cell.
    #[error("{axis} coordinate {coordinate} is outside the grid (len {len})")]
    IndexOutOfRange {
        axis: &'static str,
        coordinate: f64,
        len: usize,
    },

    /// The requested panel sizes do not fit on a canvas.
    #[error("invalid figure layout: {0}")]
    InvalidLayout(String),

    #[error("unknown colormap: {0}")]
    UnknownColormap(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
