use anyhow::Result;
use clap::value_t_or_exit;
use std::path::PathBuf;
use thermal_slice::{
    arg, args_parser,
    cli::{parse_segment, read_slice_options},
    opt, LoadOptions, PlotOptions, Segment,
};

pub struct Args {
    pub path: PathBuf,
    pub output: Option<PathBuf>,
    pub slices: Vec<Segment>,
    pub load: LoadOptions,
    pub plot: PlotOptions,
    /// Color limits given on the command line; a missing one
    /// falls back to the data range.
    pub clim_min: Option<f64>,
    pub clim_max: Option<f64>,
}

impl Args {
    pub fn from_cmd_line() -> Result<Args> {
        let matches = args_parser!("thermal-slice")
            .setting(clap::AppSettings::AllowLeadingHyphen)
            .about("Plot a thermal grid and extract temperature profiles along lines.")
            .arg(
                opt!("header lines")
                    .help("Header lines to skip before the data.  Default is 4"),
            )
            .arg(
                opt!("slice")
                    .short("s")
                    .multiple(true)
                    .number_of_values(1)
                    .help("Line to sample, as X0,Y0,X1,Y1 in pixels (repeatable)"),
            )
            .arg(
                opt!("hold")
                    .takes_value(false)
                    .help("Keep earlier slices on the figure"),
            )
            .arg(
                opt!("style")
                    .help("JSON file with marker_style / line_style / hold"),
            )
            .arg(opt!("colormap").help("Colormap name.  Default is spectral"))
            .arg(opt!("clim min").help("Lower color limit"))
            .arg(opt!("clim max").help("Upper color limit"))
            .arg(
                opt!("no saturation fix")
                    .takes_value(false)
                    .help("Do not lower the upper color limit for saturated images"),
            )
            .arg(opt!("cell size").help("Pixels per grid cell.  Default is 4"))
            .arg(
                opt!("output")
                    .short("o")
                    .help("Write the rendered figure to this PNG"),
            )
            .arg(arg!("path").required(true).help("Thermal grid (.txt) path"))
            .get_matches();

        let path = value_t_or_exit!(matches, "path", PathBuf);
        let output = matches
            .is_present("output")
            .then(|| value_t_or_exit!(matches, "output", PathBuf));
        let slices = matches
            .values_of("slice")
            .map(|vals| vals.map(parse_segment).collect::<Result<Vec<_>>>())
            .transpose()?
            .unwrap_or_default();

        let mut load = LoadOptions::default();
        if matches.is_present("header lines") {
            load.header_lines = value_t_or_exit!(matches, "header lines", usize);
        }

        let mut plot = PlotOptions::default();
        if let Some(style) = matches.value_of("style") {
            plot.slice = read_slice_options(style.as_ref())?;
        }
        if matches.is_present("hold") {
            plot.slice.hold = true;
        }
        if let Some(colormap) = matches.value_of("colormap") {
            plot.colormap = colormap.into();
        }
        let clim_min = matches
            .is_present("clim min")
            .then(|| value_t_or_exit!(matches, "clim min", f64));
        let clim_max = matches
            .is_present("clim max")
            .then(|| value_t_or_exit!(matches, "clim max", f64));
        if matches.is_present("no saturation fix") {
            plot.saturation = None;
        }
        if matches.is_present("cell size") {
            plot.cell_size = value_t_or_exit!(matches, "cell size", u32);
        }

        Ok(Args {
            path,
            output,
            slices,
            load,
            plot,
            clim_min,
            clim_max,
        })
    }
}
