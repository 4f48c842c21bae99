//! Library to inspect thermal microscope exports.
//!
//! This crate provides two functionalities:
//!
//! 1. [Load](grid::Grid::load) the comma separated
//! temperature grids written by the microscope software,
//! and display them as a pseudocolor [figure](figure::Figure).
//!
//! 2. Extract [line slices](slice::LineSliceController):
//! drag a line across the image and get the temperatures
//! sampled along it, plotted on a second panel.
//!
//! # Usage
//!
//! [`plot`](plot::plot) builds the figure and binds a line
//! slice to it. Pointer events (or whole drags) are then fed
//! to the returned [`Plot`].
//!
//! ```rust
//! # fn test_compile() -> thermal_slice::Result<()> {
//! use thermal_slice::{LoadOptions, Plot, PlotOptions, Point, Segment};
//!
//! let mut plot = Plot::load("thermal.txt", &LoadOptions::default(), &PlotOptions::default())?;
//! let drag = Segment::new(Point::new(10., 20.), Point::new(60., 20.));
//! if let Some(profile) = plot.drag(drag)? {
//!     println!("{:?}", profile.values());
//! }
//! plot.figure.save("thermal.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! The drawing surfaces are traits
//! ([`ImageSurface`](surface::ImageSurface) and
//! [`PlotSurface`](surface::PlotSurface)), so the same
//! [`LineSliceController`](slice::LineSliceController) can
//! drive any display that can place markers, arrows and
//! lines. [`figure`] provides the raster implementation.
//!
//! ## Orientation
//!
//! Grids are indexed `(row, col)`, which is `(y, x)` in the
//! image's data coordinates. Row `0` is drawn at the bottom.
//! See [`grid`] for how file lines map onto rows.

pub mod colormap;
pub mod error;
pub mod figure;
pub mod geometry;
pub mod grid;
pub mod plot;
pub mod slice;
pub mod surface;

#[cfg(feature = "cli")]
pub mod cli;

pub use crate::error::{Error, Result};
pub use crate::geometry::{Point, Profile, Segment};
pub use crate::grid::{Grid, LoadOptions};
pub use crate::plot::{plot, Plot, PlotOptions};
pub use crate::slice::{LineSliceController, PointerEvent, PointerKind, SliceOptions};
pub use crate::surface::{ImageSurface, PlotSurface};
