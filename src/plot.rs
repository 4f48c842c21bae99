//! Wiring a grid into a figure with an optional line slice.

use std::path::Path;

use serde_derive::*;
use tracing::debug;

use crate::{
    colormap::{gradient_from_name, Clim, Colormap, SaturationCorrection},
    error::{Error, Result},
    figure::{Figure, ImageView, Layout, ProfileView, MAX_PANEL_EDGE},
    geometry::{Profile, Segment},
    grid::{Grid, LoadOptions},
    slice::{LineSliceController, PointerEvent, SliceOptions},
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotOptions {
    /// Add a profile panel and a line slice bound to the
    /// image.
    pub line_slice: bool,

    pub slice: SliceOptions,

    /// Name of a `colorous` gradient.
    pub colormap: String,

    /// Color limits; the full data range when unset.
    pub clim: Option<Clim>,

    pub saturation: Option<SaturationCorrection>,

    /// Edge length of a grid cell in pixels.
    pub cell_size: u32,

    pub profile_height: u32,
}

impl Default for PlotOptions {
    fn default() -> Self {
        let layout = Layout::default();
        PlotOptions {
            line_slice: true,
            slice: SliceOptions::default(),
            colormap: "spectral".into(),
            clim: None,
            saturation: Some(SaturationCorrection::default()),
            cell_size: layout.cell_size,
            profile_height: layout.profile_height,
        }
    }
}

/// A rendered grid and, when requested, the line slice
/// bound to it.
#[derive(Debug)]
pub struct Plot {
    pub figure: Figure,
    pub slicer: Option<LineSliceController>,
}

/// Display `grid` as a pseudocolor image, stacking a profile
/// panel below it if `options.line_slice` is set.
pub fn plot(grid: Grid, options: &PlotOptions) -> Result<Plot> {
    let gradient = gradient_from_name(&options.colormap)?;
    let mut clim = options.clim.unwrap_or_else(|| Clim::from_grid(&grid));
    if let Some(fix) = &options.saturation {
        clim = fix.apply(clim);
    }

    let layout = Layout {
        cell_size: options.cell_size.max(1),
        profile_height: options.profile_height.max(1),
        ..Layout::default()
    };
    check_layout(&grid, &layout)?;
    let image = ImageView::new(grid, Colormap { gradient, clim });
    let (profile, slicer) = if options.line_slice {
        let slicer = LineSliceController::bind(&image, options.slice.clone())?;
        (Some(ProfileView::new()), Some(slicer))
    } else {
        (None, None)
    };
    debug!(
        colormap = %options.colormap,
        clim_min = clim.min,
        clim_max = clim.max,
        line_slice = options.line_slice,
        "created plot"
    );

    Ok(Plot {
        figure: Figure {
            image,
            profile,
            layout,
        },
        slicer,
    })
}

fn check_layout(grid: &Grid, layout: &Layout) -> Result<()> {
    let cells = grid.rows().max(grid.cols());
    let edge = cells as u64 * u64::from(layout.cell_size);
    if edge > u64::from(MAX_PANEL_EDGE) {
        return Err(Error::InvalidLayout(format!(
            "{} cells at {} px each exceed {} px",
            cells, layout.cell_size, MAX_PANEL_EDGE
        )));
    }
    if layout.profile_height > MAX_PANEL_EDGE {
        return Err(Error::InvalidLayout(format!(
            "profile height {} px exceeds {} px",
            layout.profile_height, MAX_PANEL_EDGE
        )));
    }
    Ok(())
}

impl Plot {
    pub fn load<P: AsRef<Path>>(
        path: P,
        load_options: &LoadOptions,
        options: &PlotOptions,
    ) -> Result<Self> {
        plot(Grid::load(path, load_options)?, options)
    }

    /// Forward a pointer event to the line slice. Without one
    /// every event is ignored.
    pub fn handle_event(&mut self, event: PointerEvent) -> Result<Option<&Profile>> {
        match (&mut self.slicer, &mut self.figure.profile) {
            (Some(slicer), Some(profile)) => {
                slicer.handle_event(event, &mut self.figure.image, profile)
            }
            _ => Ok(None),
        }
    }

    /// Replay a drag as a press at `segment.start` followed by
    /// a release at `segment.end`.
    pub fn drag(&mut self, segment: Segment) -> Result<Option<Profile>> {
        self.handle_event(PointerEvent::press(segment.start))?;
        Ok(self
            .handle_event(PointerEvent::release(segment.end))?
            .cloned())
    }
}
