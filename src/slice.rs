//! Interactive line slices.
//!
//! A [`LineSliceController`] turns a press/release pair on
//! an image into a [`Profile`] of the grid values along the
//! dragged line. On every completed drag it marks the
//! endpoints on the image, draws an arrow pointing back to
//! where the drag started, and plots the profile on a
//! separate surface.
//!
//! ```rust
//! # fn run<I, P>(image: &mut I, plot: &mut P) -> thermal_slice::Result<()>
//! # where I: thermal_slice::ImageSurface, P: thermal_slice::PlotSurface {
//! use thermal_slice::{LineSliceController, Point, PointerEvent, SliceOptions};
//!
//! let mut slicer = LineSliceController::bind(&*image, SliceOptions::default())?;
//! slicer.handle_event(PointerEvent::press(Point::new(0., 0.)), image, plot)?;
//! let profile = slicer.handle_event(PointerEvent::release(Point::new(10., 0.)), image, plot)?;
//! assert!(profile.is_some());
//! # Ok(())
//! # }
//! ```
//!
//! The surfaces are passed to each call rather than stored,
//! so the controller never outlives or aliases the display
//! it draws on.

use serde_derive::*;
use tracing::{debug, trace};

use crate::{
    error::{Error, Result},
    geometry::{Point, Profile, Segment},
    grid::Grid,
    surface::{direction_arrow_style, ArtifactId, ImageSurface, LineStyle, MarkerStyle, PlotSurface},
};

/// Construction options for a [`LineSliceController`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliceOptions {
    /// Keep the markers and profile lines of earlier drags
    /// instead of replacing them.
    pub hold: bool,

    pub marker_style: MarkerStyle,

    pub line_style: LineStyle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    Press,
    Release,
    Motion,
}

/// A pointer event in the image's data coordinates.
/// `position` is `None` when the pointer is outside the
/// image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub position: Option<Point>,
}

impl PointerEvent {
    pub fn press(at: Point) -> Self {
        PointerEvent {
            kind: PointerKind::Press,
            position: Some(at),
        }
    }

    pub fn release(at: Point) -> Self {
        PointerEvent {
            kind: PointerKind::Release,
            position: Some(at),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DragState {
    Idle,
    Dragging { start: Point },
}

/// What the controller currently has drawn. With `hold`
/// enabled only the most recent artifacts are tracked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Overlay {
    pub markers: Option<ArtifactId>,
    pub arrow: Option<ArtifactId>,
    pub line: Option<ArtifactId>,
}

#[derive(Debug)]
pub struct LineSliceController {
    grid: Grid,
    options: SliceOptions,
    state: DragState,
    overlay: Overlay,
    last_profile: Option<Profile>,
}

impl LineSliceController {
    /// Bind to the grid displayed by `image`.
    pub fn bind<I: ImageSurface + ?Sized>(image: &I, options: SliceOptions) -> Result<Self> {
        let grid = image
            .grid()
            .ok_or_else(|| Error::InvalidBinding("surface does not display a 2D grid".into()))?
            .clone();
        debug!(rows = grid.rows(), cols = grid.cols(), hold = options.hold, "bound line slice");
        Ok(LineSliceController {
            grid,
            options,
            state: DragState::Idle,
            overlay: Overlay::default(),
            last_profile: None,
        })
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn overlay(&self) -> Overlay {
        self.overlay
    }

    pub fn options(&self) -> &SliceOptions {
        &self.options
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn last_profile(&self) -> Option<&Profile> {
        self.last_profile.as_ref()
    }

    /// Feed one pointer event. Returns the new profile when the
    /// event completed a drag.
    ///
    /// Presses outside the image are ignored. A release
    /// outside the image cancels the drag in progress without
    /// drawing anything. A press during a drag restarts it.
    ///
    /// Accepted positions lie within the bound grid, so sampling
    /// cannot fail here. Should a redraw fail anyway, the error
    /// is returned with the controller `Idle` and the previous
    /// overlays still drawn.
    pub fn handle_event<I, P>(
        &mut self,
        event: PointerEvent,
        image: &mut I,
        plot: &mut P,
    ) -> Result<Option<&Profile>>
    where
        I: ImageSurface + ?Sized,
        P: PlotSurface + ?Sized,
    {
        let position = event.position.filter(|p| self.contains(p));
        match (event.kind, self.state, position) {
            (PointerKind::Press, _, Some(start)) => {
                trace!(x = start.x, y = start.y, "drag started");
                self.state = DragState::Dragging { start };
                Ok(None)
            }
            (PointerKind::Release, DragState::Dragging { start }, Some(end)) => {
                self.state = DragState::Idle;
                self.redraw(Segment::new(start, end), image, plot)?;
                Ok(self.last_profile.as_ref())
            }
            (PointerKind::Release, DragState::Dragging { .. }, None) => {
                debug!("drag released outside the image, cancelled");
                self.state = DragState::Idle;
                Ok(None)
            }
            (kind, state, _) => {
                trace!(?kind, ?state, "ignored pointer event");
                Ok(None)
            }
        }
    }

    /// Image extent in data coordinates: cell edges run from
    /// `0` to `cols` along x and `0` to `rows` along y.
    fn contains(&self, p: &Point) -> bool {
        let (rows, cols) = self.grid.dim();
        p.x >= 0. && p.y >= 0. && p.x <= cols as f64 && p.y <= rows as f64
    }

    fn redraw<I, P>(&mut self, segment: Segment, image: &mut I, plot: &mut P) -> Result<()>
    where
        I: ImageSurface + ?Sized,
        P: PlotSurface + ?Sized,
    {
        // Sample first so a failure leaves the display untouched.
        let profile = Profile::sample(&self.grid, segment)?;

        if !self.options.hold {
            if let Some(id) = self.overlay.markers.take() {
                if !image.remove_overlay(id) {
                    debug!(?id, "markers already gone from the image");
                }
            }
            if let Some(id) = self.overlay.line.take() {
                if !plot.remove_line(id) {
                    debug!(?id, "profile line already gone from the plot");
                }
            }
        }
        // Only one arrow is ever shown, even with `hold`.
        if let Some(id) = self.overlay.arrow.take() {
            if !image.remove_overlay(id) {
                debug!(?id, "arrow already gone from the image");
            }
        }

        let Segment { start, end } = segment;
        self.overlay.markers = Some(image.add_markers(&[start, end], &self.options.marker_style));
        self.overlay.arrow = Some(image.add_arrow(end, start, &direction_arrow_style()));
        self.overlay.line = Some(plot.add_line(&profile.values(), &self.options.line_style));
        plot.autoscale();

        debug!(
            x0 = start.x,
            y0 = start.y,
            x1 = end.x,
            y1 = end.y,
            samples = profile.len(),
            "line slice"
        );
        self.last_profile = Some(profile);
        Ok(())
    }
}
