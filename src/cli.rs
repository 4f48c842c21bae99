//! Helpers to parse CLI arguments in the accompanying
//! binary.
//!
//! APIs here shouldn't be considered stable / used as a
//! library.

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{anyhow, Context, Result};
pub use clap::{App, Arg};
pub use inflector::Inflector;
use lazy_static::lazy_static;
use regex::Regex;
use tracing_subscriber::EnvFilter;

use crate::{Point, Segment, SliceOptions};

#[macro_export]
macro_rules! args_parser {
    ($name:expr) => {{
        $crate::cli::App::new($name)
            .version(clap::crate_version!())
            .author(clap::crate_authors!())
    }};
}

#[macro_export]
macro_rules! arg {
    ($name:expr) => {{
        use $crate::cli::Inflector;
        $crate::cli::Arg::with_name($name).value_name(&$name.to_screaming_snake_case())
    }};
}

#[macro_export]
macro_rules! opt {
    ($name:expr) => {{
        use $crate::cli::Inflector;
        $crate::cli::Arg::with_name($name)
            .long(&$name.to_kebab_case())
            .value_name(&$name.to_screaming_snake_case())
    }};
}

/// Log to stderr, filtered by `RUST_LOG` (default `info`).
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Parse a drag given as `X0,Y0,X1,Y1` in data coordinates.
pub fn parse_segment(text: &str) -> Result<Segment> {
    lazy_static! {
        static ref NUM: Regex = Regex::new(r"^\s*(-?\d+(?:\.\d*)?|-?\.\d+)\s*$").unwrap();
    }

    let coords = text
        .split(',')
        .map(|part| -> Result<f64> {
            let num = NUM
                .captures(part)
                .and_then(|c| c.get(1))
                .ok_or_else(|| anyhow!("`{}` is not a coordinate", part.trim()))?;
            Ok(num.as_str().parse()?)
        })
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("parsing slice `{}`", text))?;

    match coords[..] {
        [x0, y0, x1, y1] => Ok(Segment::new(Point::new(x0, y0), Point::new(x1, y1))),
        _ => Err(anyhow!(
            "slice `{}` needs 4 coordinates (X0,Y0,X1,Y1), found {}",
            text,
            coords.len()
        )),
    }
}

/// Read marker/line styles and `hold` from a JSON file.
pub fn read_slice_options(path: &Path) -> Result<SliceOptions> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing slice style {}", path.display()))
}
