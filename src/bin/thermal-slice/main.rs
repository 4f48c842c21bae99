mod args;

use anyhow::{Context, Result};
use serde_derive::*;
use tracing::{info, warn};

use args::Args;
use thermal_slice::{cli::init_logging, colormap::Clim, plot::plot, Grid, Profile};

fn main() -> Result<()> {
    init_logging();
    let Args {
        path,
        output,
        slices,
        load,
        plot: mut options,
        clim_min,
        clim_max,
    } = Args::from_cmd_line()?;

    let grid = Grid::load(&path, &load)
        .with_context(|| format!("could not load thermal grid {}", path.display()))?;
    let (rows, cols) = grid.dim();
    info!(rows, cols, "loaded {}", path.display());

    if clim_min.is_some() || clim_max.is_some() {
        let data = Clim::from_grid(&grid);
        options.clim = Some(Clim::new(
            clim_min.unwrap_or(data.min),
            clim_max.unwrap_or(data.max),
        ));
    }
    if slices.is_empty() {
        warn!("no --slice given, rendering the image only");
        options.line_slice = false;
    }

    let mut slice_plot = plot(grid, &options)?;
    let mut profiles = Vec::with_capacity(slices.len());
    for segment in slices {
        match slice_plot.drag(segment)? {
            Some(profile) => profiles.push(profile),
            None => warn!(?segment, "slice outside the image, skipped"),
        }
    }

    #[derive(Debug, Serialize)]
    struct OutputJson<'a> {
        path: String,
        rows: usize,
        cols: usize,
        profiles: &'a [Profile],
    }

    serde_json::to_writer(
        std::io::stdout().lock(),
        &OutputJson {
            path: format!("{}", path.display()),
            rows,
            cols,
            profiles: &profiles,
        },
    )?;

    if let Some(output) = output {
        slice_plot
            .figure
            .save(&output)
            .with_context(|| format!("could not write {}", output.display()))?;
        info!("wrote {}", output.display());
    }

    Ok(())
}
