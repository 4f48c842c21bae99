//! The drawing capabilities a line slice needs from its
//! display.
//!
//! A line slice draws on two surfaces: the image showing the
//! grid (endpoint markers and a direction arrow) and a
//! separate plot receiving the sampled profile. Everything
//! drawn returns an [`ArtifactId`] so it can be removed
//! again on the next drag.

use serde_derive::*;

use crate::{geometry::Point, grid::Grid};

/// Handle to something drawn on a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtifactId(pub u64);

pub trait ImageSurface {
    /// The grid shown by this surface, or `None` if it does
    /// not display a 2D scalar grid.
    fn grid(&self) -> Option<&Grid>;

    fn add_markers(&mut self, points: &[Point], style: &MarkerStyle) -> ArtifactId;

    /// Draw an arrow from `tail` to `head`.
    fn add_arrow(&mut self, tail: Point, head: Point, style: &ArrowStyle) -> ArtifactId;

    /// Returns `false` if `id` was not present.
    fn remove_overlay(&mut self, id: ArtifactId) -> bool;
}

pub trait PlotSurface {
    /// Plot `values` against their index.
    fn add_line(&mut self, values: &[f64], style: &LineStyle) -> ArtifactId;

    /// Returns `false` if `id` was not present.
    fn remove_line(&mut self, id: ArtifactId) -> bool;

    /// Fit the view limits to every line currently plotted.
    fn autoscale(&mut self);
}

/// RGBA color. Deserializes from `#rrggbb`, `#rrggbbaa` or
/// a basic color name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub [u8; 4]);

impl Color {
    pub const WHITE: Color = Color([255, 255, 255, 255]);
    pub const BLACK: Color = Color([0, 0, 0, 255]);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color([r, g, b, 255])
    }

    /// Same color with opacity `alpha` in `[0, 1]`.
    pub fn with_alpha(self, alpha: f32) -> Self {
        let [r, g, b, _] = self.0;
        Color([r, g, b, (alpha.max(0.).min(1.) * 255.).round() as u8])
    }
}

impl From<Color> for image::Rgba<u8> {
    fn from(color: Color) -> Self {
        image::Rgba(color.0)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        let [r, g, b, a] = color.0;
        format!("#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
    }
}

impl std::convert::TryFrom<String> for Color {
    type Error = String;

    fn try_from(s: String) -> Result<Self, String> {
        serde_helpers::parse_color(&s)
    }
}

/// Style of the endpoint markers drawn on the image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerStyle {
    pub color: Color,

    /// Radius in canvas pixels.
    pub radius: f32,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        MarkerStyle {
            color: Color::WHITE,
            radius: 4.,
        }
    }
}

/// Style of a profile line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineStyle {
    /// `None` picks the next color of the plot's cycle.
    pub color: Option<Color>,

    /// Width in canvas pixels.
    pub width: f32,
}

impl Default for LineStyle {
    fn default() -> Self {
        LineStyle {
            color: None,
            width: 1.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArrowStyle {
    pub color: Color,
    pub width: f32,
}

/// The arrow pointing back to where a drag started.
pub fn direction_arrow_style() -> ArrowStyle {
    ArrowStyle {
        color: Color::WHITE.with_alpha(0.7),
        width: 3.,
    }
}

mod serde_helpers {
    use lazy_static::lazy_static;
    use regex::Regex;

    use super::Color;

    pub fn parse_color(s: &str) -> Result<Color, String> {
        lazy_static! {
            static ref RE: Regex =
                Regex::new(r"^#([0-9a-fA-F]{2})([0-9a-fA-F]{2})([0-9a-fA-F]{2})([0-9a-fA-F]{2})?$")
                    .unwrap();
        }

        let named = match s.to_lowercase().as_str() {
            "white" | "w" => Some(Color::WHITE),
            "black" | "k" => Some(Color::BLACK),
            "red" | "r" => Some(Color::rgb(255, 0, 0)),
            "green" | "g" => Some(Color::rgb(0, 128, 0)),
            "blue" | "b" => Some(Color::rgb(0, 0, 255)),
            "cyan" | "c" => Some(Color::rgb(0, 191, 191)),
            "magenta" | "m" => Some(Color::rgb(191, 0, 191)),
            "yellow" | "y" => Some(Color::rgb(191, 191, 0)),
            _ => None,
        };
        if let Some(color) = named {
            return Ok(color);
        }

        let caps = RE
            .captures(s)
            .ok_or_else(|| format!("unexpected color `{}`: use a name or #rrggbb[aa]", s))?;
        let channel = |i: usize| {
            caps.get(i)
                .map_or(Ok(255), |m| u8::from_str_radix(m.as_str(), 16))
                .map_err(|e| e.to_string())
        };
        Ok(Color([channel(1)?, channel(2)?, channel(3)?, channel(4)?]))
    }
}
