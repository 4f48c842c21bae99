//! Mapping temperatures onto colors.

use colorous::Gradient;
use image::Rgba;
use serde_derive::*;
use tracing::warn;

use crate::{
    error::{Error, Result},
    grid::Grid,
};

/// Look up a `colorous` gradient by name. Case and the
/// separator (`_`, `-` or space) are ignored.
pub fn gradient_from_name(name: &str) -> Result<Gradient> {
    let gradient = match &name.to_uppercase().replace(|c: char| c == ' ' || c == '-', "_") as &str {
        "BLUES" => colorous::BLUES,
        "BLUE_GREEN" => colorous::BLUE_GREEN,
        "BLUE_PURPLE" => colorous::BLUE_PURPLE,
        "BROWN_GREEN" => colorous::BROWN_GREEN,
        "CIVIDIS" => colorous::CIVIDIS,
        "COOL" => colorous::COOL,
        "CUBEHELIX" => colorous::CUBEHELIX,
        "GREENS" => colorous::GREENS,
        "GREEN_BLUE" => colorous::GREEN_BLUE,
        "GREYS" => colorous::GREYS,
        "INFERNO" => colorous::INFERNO,
        "MAGMA" => colorous::MAGMA,
        "ORANGES" => colorous::ORANGES,
        "ORANGE_RED" => colorous::ORANGE_RED,
        "PINK_GREEN" => colorous::PINK_GREEN,
        "PLASMA" => colorous::PLASMA,
        "PURPLES" => colorous::PURPLES,
        "PURPLE_BLUE" => colorous::PURPLE_BLUE,
        "PURPLE_BLUE_GREEN" => colorous::PURPLE_BLUE_GREEN,
        "PURPLE_GREEN" => colorous::PURPLE_GREEN,
        "PURPLE_ORANGE" => colorous::PURPLE_ORANGE,
        "PURPLE_RED" => colorous::PURPLE_RED,
        "RAINBOW" => colorous::RAINBOW,
        "REDS" => colorous::REDS,
        "RED_BLUE" => colorous::RED_BLUE,
        "RED_GREY" => colorous::RED_GREY,
        "RED_PURPLE" => colorous::RED_PURPLE,
        "RED_YELLOW_BLUE" => colorous::RED_YELLOW_BLUE,
        "RED_YELLOW_GREEN" => colorous::RED_YELLOW_GREEN,
        "SINEBOW" => colorous::SINEBOW,
        "SPECTRAL" => colorous::SPECTRAL,
        "TURBO" => colorous::TURBO,
        "VIRIDIS" => colorous::VIRIDIS,
        "WARM" => colorous::WARM,
        "YELLOW_GREEN" => colorous::YELLOW_GREEN,
        "YELLOW_GREEN_BLUE" => colorous::YELLOW_GREEN_BLUE,
        "YELLOW_ORANGE_BROWN" => colorous::YELLOW_ORANGE_BROWN,
        "YELLOW_ORANGE_RED" => colorous::YELLOW_ORANGE_RED,
        _ => return Err(Error::UnknownColormap(name.into())),
    };
    Ok(gradient)
}

/// Value range mapped onto a colormap.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Clim {
    pub min: f64,
    pub max: f64,
}

impl Clim {
    pub fn new(min: f64, max: f64) -> Self {
        Clim { min, max }
    }

    /// Full value range of `grid`, or `[0, 1]` if the grid
    /// holds no numbers at all.
    pub fn from_grid(grid: &Grid) -> Self {
        grid.value_range()
            .map_or(Clim::new(0., 1.), |(min, max)| Clim::new(min, max))
    }

    /// Position of `value` within the range, clamped to
    /// `[0, 1]`. A degenerate range maps everything to `0.5`.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0. || !span.is_finite() {
            return 0.5;
        }
        ((value - self.min) / span).max(0.).min(1.)
    }
}

/// Saturated pixels read as absurdly hot; when the upper
/// limit passes `threshold` it is lowered to `ceiling` so the
/// rest of the image keeps its contrast.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaturationCorrection {
    pub threshold: f64,
    pub ceiling: f64,
}

impl Default for SaturationCorrection {
    fn default() -> Self {
        SaturationCorrection {
            threshold: 1000.,
            ceiling: 500.,
        }
    }
}

impl SaturationCorrection {
    pub fn apply(&self, clim: Clim) -> Clim {
        if clim.max > self.threshold {
            warn!(
                max = clim.max,
                ceiling = self.ceiling,
                "saturated pixels, lowering upper color limit"
            );
            Clim::new(clim.min, self.ceiling)
        } else {
            clim
        }
    }
}

/// A gradient together with the value range it spans.
#[derive(Clone, Copy, Debug)]
pub struct Colormap {
    pub gradient: Gradient,
    pub clim: Clim,
}

impl Colormap {
    /// Opaque color for `value`; NaN is fully transparent.
    pub fn color(&self, value: f64) -> Rgba<u8> {
        if value.is_nan() {
            return Rgba([0, 0, 0, 0]);
        }
        self.at(self.clim.normalize(value))
    }

    /// Color at position `t` in `[0, 1]` along the gradient.
    pub fn at(&self, t: f64) -> Rgba<u8> {
        let c = self.gradient.eval_continuous(t);
        Rgba([c.r, c.g, c.b, 255])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_gradient_names() {
        assert!(gradient_from_name("spectral").is_ok());
        assert!(gradient_from_name("Red Yellow-Blue").is_ok());
        for name in &[
            "blue_green",
            "Purple Blue Green",
            "red-grey",
            "yellow_orange_brown",
            "PINK_GREEN",
        ] {
            assert!(gradient_from_name(name).is_ok(), "{}", name);
        }
        assert!(matches!(
            gradient_from_name("jet"),
            Err(Error::UnknownColormap(_))
        ));
    }

    #[test]
    fn test_normalize_clamps() {
        let clim = Clim::new(20., 40.);
        assert_eq!(clim.normalize(30.), 0.5);
        assert_eq!(clim.normalize(10.), 0.);
        assert_eq!(clim.normalize(90.), 1.);
        assert_eq!(Clim::new(5., 5.).normalize(5.), 0.5);
    }

    #[test]
    fn test_clim_from_grid_skips_nan() {
        let grid = Grid::new(array![[f64::NAN, 21.], [35., 22.]]).unwrap();
        assert_eq!(Clim::from_grid(&grid), Clim::new(21., 35.));
    }

    #[test]
    fn test_saturation_correction() {
        let fix = SaturationCorrection::default();
        assert_eq!(fix.apply(Clim::new(20., 1500.)), Clim::new(20., 500.));
        assert_eq!(fix.apply(Clim::new(20., 80.)), Clim::new(20., 80.));
    }

    #[test]
    fn test_nan_is_transparent() {
        let map = Colormap {
            gradient: colorous::GREYS,
            clim: Clim::new(0., 1.),
        };
        assert_eq!(map.color(f64::NAN)[3], 0);
        assert_eq!(map.color(0.5)[3], 255);
        assert_ne!(map.color(0.), map.color(1.));
    }
}
