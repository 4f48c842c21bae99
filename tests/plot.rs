use std::io::Write;

use anyhow::Result;
use approx::assert_relative_eq;
use image::GenericImageView;
use thermal_slice::{LoadOptions, Plot, PlotOptions, Point, Segment, SliceOptions};

/// Writes a 12 x 8 export: 4 header lines, then 12 lines of 8
/// values, each ending with the stray delimiter.
fn write_export(dir: &tempfile::TempDir) -> Result<std::path::PathBuf> {
    let path = dir.path().join("thermal.txt");
    let mut file = std::fs::File::create(&path)?;
    writeln!(file, "Thermal export")?;
    writeln!(file, "Date,2021-06-01")?;
    writeln!(file, "Units,C")?;
    writeln!(file)?;
    for line in 0..12 {
        let fields: Vec<_> = (0..8).map(|f| format!("{}", 20 + line * 10 + f)).collect();
        writeln!(file, "{},", fields.join(","))?;
    }
    Ok(path)
}

#[test]
fn load_drag_and_save() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_export(&dir)?;

    let mut plot = Plot::load(&path, &LoadOptions::default(), &PlotOptions::default())?;
    let slicer = plot.slicer.as_ref().expect("line slice bound");
    assert_eq!(slicer.grid().dim(), (12, 8));

    let profile = plot
        .drag(Segment::new(Point::new(0.5, 0.5), Point::new(7.5, 0.5)))?
        .expect("completed drag");
    assert_eq!(profile.len(), 7);
    assert!(profile.values().windows(2).all(|w| w[0] < w[1]));

    let second = plot
        .drag(Segment::new(Point::new(0.5, 0.5), Point::new(0.5, 11.5)))?
        .expect("completed drag");
    assert_eq!(second.len(), 11);
    let lines = plot.figure.profile.as_ref().map(|p| p.lines().len());
    assert_eq!(lines, Some(1));
    assert_eq!(plot.figure.image.arrows(), 1);

    let out = dir.path().join("thermal.png");
    plot.figure.save(&out)?;
    let saved = image::open(&out)?;
    let (width, height) = plot.figure.size();
    assert_eq!((saved.width(), saved.height()), (width, height));
    Ok(())
}

#[test]
fn hold_keeps_every_slice() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_export(&dir)?;
    let options = PlotOptions {
        slice: SliceOptions {
            hold: true,
            ..Default::default()
        },
        ..Default::default()
    };

    let mut plot = Plot::load(&path, &LoadOptions::default(), &options)?;
    for row in 0..3 {
        let y = row as f64 + 0.5;
        plot.drag(Segment::new(Point::new(0., y), Point::new(8., y)))?;
    }
    assert_eq!(plot.figure.image.marker_sets(), 3);
    assert_eq!(plot.figure.image.arrows(), 1);
    let profile = plot.figure.profile.as_ref().expect("profile panel");
    assert_eq!(profile.lines().len(), 3);

    let last = plot.slicer.as_ref().and_then(|s| s.last_profile());
    let first_value = last.map(|p| p.values()[0]);
    // Row 2 from the bottom is the third line from the end.
    assert_relative_eq!(first_value.unwrap_or(f64::NAN), 20. + 9. * 10.);
    Ok(())
}
