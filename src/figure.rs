//! Raster implementation of the drawing surfaces.
//!
//! [`ImageView`] shows a grid as a pseudocolor image and
//! keeps the overlays drawn on it; [`ProfileView`] keeps the
//! plotted profile lines and their view limits. Both only
//! record what is drawn. [`Figure::render`] composes them
//! into a single RGBA image: the pseudocolor panel with its
//! colorbar on top and the profile panel below.

use std::path::Path;

use image::{GenericImage, Rgba, RgbaImage};
use imageproc::{
    drawing::{
        draw_filled_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut, draw_polygon_mut,
        Blend,
    },
    point::Point as PixelPoint,
    rect::Rect,
};
use itertools::Itertools;
use rayon::prelude::*;

use crate::{
    colormap::{Clim, Colormap},
    error::Result,
    geometry::Point,
    grid::Grid,
    slice::{PointerEvent, PointerKind},
    surface::{ArrowStyle, ArtifactId, Color, ImageSurface, LineStyle, MarkerStyle, PlotSurface},
};

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const FRAME: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Colors given to profile lines without an explicit color.
const LINE_CYCLE: [Color; 10] = [
    Color::rgb(0x1f, 0x77, 0xb4),
    Color::rgb(0xff, 0x7f, 0x0e),
    Color::rgb(0x2c, 0xa0, 0x2c),
    Color::rgb(0xd6, 0x27, 0x28),
    Color::rgb(0x94, 0x67, 0xbd),
    Color::rgb(0x8c, 0x56, 0x4b),
    Color::rgb(0xe3, 0x77, 0xc2),
    Color::rgb(0x7f, 0x7f, 0x7f),
    Color::rgb(0xbc, 0xbd, 0x22),
    Color::rgb(0x17, 0xbe, 0xcf),
];

/// Something drawn over the pseudocolor image.
#[derive(Clone, Debug, PartialEq)]
pub enum Annotation {
    Markers {
        points: Vec<Point>,
        style: MarkerStyle,
    },
    Arrow {
        tail: Point,
        head: Point,
        style: ArrowStyle,
    },
}

#[derive(Clone, Debug)]
pub struct ImageView {
    grid: Grid,
    colormap: Colormap,
    next_id: u64,
    annotations: Vec<(ArtifactId, Annotation)>,
}

impl ImageView {
    pub fn new(grid: Grid, colormap: Colormap) -> Self {
        ImageView {
            grid,
            colormap,
            next_id: 0,
            annotations: vec![],
        }
    }

    pub fn colormap(&self) -> &Colormap {
        &self.colormap
    }

    pub fn set_clim(&mut self, clim: Clim) {
        self.colormap.clim = clim;
    }

    pub fn annotations(&self) -> &[(ArtifactId, Annotation)] {
        &self.annotations
    }

    pub fn marker_sets(&self) -> usize {
        self.annotations
            .iter()
            .filter(|(_, a)| matches!(a, Annotation::Markers { .. }))
            .count()
    }

    pub fn arrows(&self) -> usize {
        self.annotations.len() - self.marker_sets()
    }

    fn push(&mut self, annotation: Annotation) -> ArtifactId {
        self.next_id += 1;
        let id = ArtifactId(self.next_id);
        self.annotations.push((id, annotation));
        id
    }
}

impl ImageSurface for ImageView {
    fn grid(&self) -> Option<&Grid> {
        Some(&self.grid)
    }

    fn add_markers(&mut self, points: &[Point], style: &MarkerStyle) -> ArtifactId {
        self.push(Annotation::Markers {
            points: points.to_vec(),
            style: style.clone(),
        })
    }

    fn add_arrow(&mut self, tail: Point, head: Point, style: &ArrowStyle) -> ArtifactId {
        self.push(Annotation::Arrow {
            tail,
            head,
            style: style.clone(),
        })
    }

    fn remove_overlay(&mut self, id: ArtifactId) -> bool {
        let before = self.annotations.len();
        self.annotations.retain(|(a, _)| *a != id);
        before != self.annotations.len()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlotLine {
    pub id: ArtifactId,
    pub values: Vec<f64>,
    pub color: Color,
    pub width: f32,
}

/// Data range shown by the profile panel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewLimits {
    pub x: (f64, f64),
    pub y: (f64, f64),
}

impl Default for ViewLimits {
    fn default() -> Self {
        ViewLimits {
            x: (0., 1.),
            y: (0., 1.),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ProfileView {
    next_id: u64,
    lines: Vec<PlotLine>,
    limits: ViewLimits,
}

impl ProfileView {
    /// Fraction of the data range added on each side when
    /// autoscaling.
    const MARGIN: f64 = 0.05;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[PlotLine] {
        &self.lines
    }

    pub fn limits(&self) -> ViewLimits {
        self.limits
    }
}

impl PlotSurface for ProfileView {
    fn add_line(&mut self, values: &[f64], style: &LineStyle) -> ArtifactId {
        let color = style
            .color
            .unwrap_or(LINE_CYCLE[self.next_id as usize % LINE_CYCLE.len()]);
        self.next_id += 1;
        let id = ArtifactId(self.next_id);
        self.lines.push(PlotLine {
            id,
            values: values.to_vec(),
            color,
            width: style.width,
        });
        id
    }

    fn remove_line(&mut self, id: ArtifactId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.id != id);
        before != self.lines.len()
    }

    fn autoscale(&mut self) {
        let x_max = self.lines.iter().map(|l| l.values.len()).max().unwrap_or(0);
        let y = self
            .lines
            .iter()
            .flat_map(|l| l.values.iter().copied())
            .filter(|v| v.is_finite())
            .minmax()
            .into_option();
        if x_max == 0 {
            self.limits = ViewLimits::default();
            return;
        }
        self.limits = ViewLimits {
            x: with_margin(0., (x_max - 1) as f64),
            y: y.map_or((0., 1.), |(lo, hi)| with_margin(lo, hi)),
        };
    }
}

fn with_margin(lo: f64, hi: f64) -> (f64, f64) {
    if hi - lo <= 0. {
        return (lo - 0.5, hi + 0.5);
    }
    let pad = (hi - lo) * ProfileView::MARGIN;
    (lo - pad, hi + pad)
}

/// Longest edge, in pixels, of any single panel.
pub const MAX_PANEL_EDGE: u32 = 1 << 15;

/// Pixel sizes of the figure's panels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Layout {
    /// Edge length of one grid cell.
    pub cell_size: u32,
    pub margin: u32,
    pub colorbar_width: u32,
    pub profile_height: u32,
}

impl Default for Layout {
    fn default() -> Self {
        Layout {
            cell_size: 4,
            margin: 10,
            colorbar_width: 16,
            profile_height: 160,
        }
    }
}

/// Panel position on the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Panel {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Panel {
    /// The frame is drawn one pixel outside the panel.
    fn frame(&self) -> Rect {
        Rect::at(self.x as i32 - 1, self.y as i32 - 1).of_size(self.width + 2, self.height + 2)
    }
}

#[derive(Clone, Debug)]
pub struct Figure {
    pub image: ImageView,
    pub profile: Option<ProfileView>,
    pub layout: Layout,
}

impl Figure {
    pub fn image_panel(&self) -> Panel {
        let (rows, cols) = self.image.grid.dim();
        let cs = self.layout.cell_size;
        Panel {
            x: self.layout.margin,
            y: self.layout.margin,
            width: (cols as u32).saturating_mul(cs),
            height: (rows as u32).saturating_mul(cs),
        }
    }

    pub fn colorbar_panel(&self) -> Panel {
        let image = self.image_panel();
        Panel {
            x: image.x + image.width + self.layout.margin,
            y: image.y,
            width: self.layout.colorbar_width,
            height: image.height,
        }
    }

    pub fn profile_panel(&self) -> Option<Panel> {
        self.profile.as_ref()?;
        let image = self.image_panel();
        let (width, _) = self.size();
        Some(Panel {
            x: self.layout.margin,
            y: image.y + image.height + self.layout.margin,
            width: width - 2 * self.layout.margin,
            height: self.layout.profile_height,
        })
    }

    /// Canvas `(width, height)`.
    pub fn size(&self) -> (u32, u32) {
        let bar = self.colorbar_panel();
        let width = bar.x + bar.width + self.layout.margin;
        let image = self.image_panel();
        let mut height = image.y + image.height + self.layout.margin;
        if self.profile.is_some() {
            height += self.layout.profile_height + self.layout.margin;
        }
        (width, height)
    }

    /// Data coordinates to canvas pixels. Grid row `0` is at
    /// the bottom of the image panel.
    pub fn data_to_canvas(&self, p: Point) -> (f32, f32) {
        let panel = self.image_panel();
        let cs = self.layout.cell_size as f64;
        let rows = self.image.grid.rows() as f64;
        (
            (panel.x as f64 + p.x * cs) as f32,
            (panel.y as f64 + (rows - p.y) * cs) as f32,
        )
    }

    /// Canvas pixels to data coordinates, `None` outside the
    /// image panel.
    pub fn canvas_to_data(&self, px: f64, py: f64) -> Option<Point> {
        let panel = self.image_panel();
        let cs = self.layout.cell_size as f64;
        let (rows, cols) = self.image.grid.dim();
        let x = (px - panel.x as f64) / cs;
        let y = rows as f64 - (py - panel.y as f64) / cs;
        if x < 0. || y < 0. || x > cols as f64 || y > rows as f64 {
            return None;
        }
        Some(Point::new(x, y))
    }

    /// Pointer event for a raw canvas position.
    pub fn image_pointer(&self, kind: PointerKind, px: f64, py: f64) -> PointerEvent {
        PointerEvent {
            kind,
            position: self.canvas_to_data(px, py),
        }
    }

    pub fn render(&self) -> Result<RgbaImage> {
        let (width, height) = self.size();
        let mut canvas = RgbaImage::from_pixel(width, height, BACKGROUND);

        let image = self.image_panel();
        let cells = self.render_cells();
        canvas.copy_from(&cells, image.x, image.y)?;
        self.render_colorbar(&mut canvas);

        let mut canvas = Blend(canvas);
        draw_hollow_rect_mut(&mut canvas, image.frame(), FRAME);
        draw_hollow_rect_mut(&mut canvas, self.colorbar_panel().frame(), FRAME);
        for (_, annotation) in self.image.annotations() {
            self.render_annotation(&mut canvas, annotation);
        }
        if let (Some(profile), Some(panel)) = (&self.profile, self.profile_panel()) {
            draw_hollow_rect_mut(&mut canvas, panel.frame(), FRAME);
            render_profile(&mut canvas, profile, panel);
        }
        Ok(canvas.0)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.render()?.save(path)?;
        Ok(())
    }

    fn render_cells(&self) -> RgbaImage {
        let grid = &self.image.grid;
        let colormap = self.image.colormap;
        let panel = self.image_panel();
        let cs = self.layout.cell_size as usize;
        let rows = grid.rows();

        let mut cells = RgbaImage::new(panel.width, panel.height);
        let stride = panel.width as usize * 4;
        cells
            .par_chunks_mut(stride)
            .enumerate()
            .for_each(|(py, line)| {
                let row = rows - 1 - py / cs;
                for (px, pixel) in line.chunks_exact_mut(4).enumerate() {
                    let value = grid[(row, px / cs)];
                    let color = if value.is_nan() {
                        BACKGROUND
                    } else {
                        colormap.color(value)
                    };
                    pixel.copy_from_slice(&color.0);
                }
            });
        cells
    }

    fn render_colorbar(&self, canvas: &mut RgbaImage) {
        let bar = self.colorbar_panel();
        let colormap = self.image.colormap;
        let span = (bar.height.max(2) - 1) as f64;
        for dy in 0..bar.height {
            let color = colormap.at(1. - dy as f64 / span);
            for dx in 0..bar.width {
                canvas.put_pixel(bar.x + dx, bar.y + dy, color);
            }
        }
    }

    fn render_annotation(&self, canvas: &mut Blend<RgbaImage>, annotation: &Annotation) {
        match annotation {
            Annotation::Markers { points, style } => {
                let radius = style.radius.round().max(1.) as i32;
                for p in points {
                    let (x, y) = self.data_to_canvas(*p);
                    let center = (x.round() as i32, y.round() as i32);
                    draw_filled_circle_mut(canvas, center, radius, style.color.into());
                }
            }
            Annotation::Arrow { tail, head, style } => {
                let tail = self.data_to_canvas(*tail);
                let head = self.data_to_canvas(*head);
                draw_arrow(canvas, tail, head, style);
            }
        }
    }
}

fn render_profile(canvas: &mut Blend<RgbaImage>, profile: &ProfileView, panel: Panel) {
    let ViewLimits { x: (x0, x1), y: (y0, y1) } = profile.limits();
    let to_canvas = |i: usize, v: f64| {
        let fx = (i as f64 - x0) / (x1 - x0);
        let fy = (v - y0) / (y1 - y0);
        (
            (panel.x as f64 + fx * panel.width as f64) as f32,
            (panel.y as f64 + (1. - fy) * panel.height as f64) as f32,
        )
    };

    for line in profile.lines() {
        // NaN samples break the line.
        for ((i, a), (j, b)) in line.values.iter().copied().enumerate().tuple_windows() {
            if a.is_finite() && b.is_finite() {
                thick_segment(canvas, to_canvas(i, a), to_canvas(j, b), line.width, line.color);
            }
        }
    }
}

fn draw_arrow(canvas: &mut Blend<RgbaImage>, tail: (f32, f32), head: (f32, f32), style: &ArrowStyle) {
    let (dx, dy) = (head.0 - tail.0, head.1 - tail.1);
    let len = dx.hypot(dy);
    if len < 1. {
        return;
    }
    let (ux, uy) = (dx / len, dy / len);
    let head_len = (4. * style.width).min(len);
    let base = (head.0 - ux * head_len, head.1 - uy * head_len);

    thick_segment(canvas, tail, base, style.width, style.color);
    let half = 1.5 * style.width.max(1.);
    let (nx, ny) = (-uy * half, ux * half);
    let triangle = [
        pixel_point(head),
        pixel_point((base.0 + nx, base.1 + ny)),
        pixel_point((base.0 - nx, base.1 - ny)),
    ];
    if triangle[0] != triangle[2] && triangle[1] != triangle[2] {
        draw_polygon_mut(canvas, &triangle, style.color.into());
    }
}

/// Line of the given width. Widths under two pixels fall
/// back to a plain one-pixel segment.
fn thick_segment(
    canvas: &mut Blend<RgbaImage>,
    a: (f32, f32),
    b: (f32, f32),
    width: f32,
    color: Color,
) {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len = dx.hypot(dy);
    if width < 2. || len < 1. {
        draw_line_segment_mut(canvas, a, b, color.into());
        return;
    }
    let half = width / 2.;
    let (nx, ny) = (-dy / len * half, dx / len * half);
    let quad = [
        pixel_point((a.0 + nx, a.1 + ny)),
        pixel_point((b.0 + nx, b.1 + ny)),
        pixel_point((b.0 - nx, b.1 - ny)),
        pixel_point((a.0 - nx, a.1 - ny)),
    ];
    draw_polygon_mut(canvas, &quad, color.into());
}

fn pixel_point((x, y): (f32, f32)) -> PixelPoint<i32> {
    PixelPoint::new(x.round() as i32, y.round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn figure(with_profile: bool) -> Figure {
        let grid = Grid::new(array![[1., 2., 3.], [4., 5., f64::NAN]]).unwrap();
        let colormap = Colormap {
            gradient: colorous::GREYS,
            clim: Clim::from_grid(&grid),
        };
        Figure {
            image: ImageView::new(grid, colormap),
            profile: if with_profile {
                Some(ProfileView::new())
            } else {
                None
            },
            layout: Layout {
                cell_size: 10,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_layout() {
        let fig = figure(true);
        assert_eq!(
            fig.image_panel(),
            Panel {
                x: 10,
                y: 10,
                width: 30,
                height: 20
            }
        );
        assert_eq!(fig.colorbar_panel().x, 50);
        // margin + image + margin + bar + margin
        assert_eq!(fig.size(), (76, 10 + 20 + 10 + 160 + 10));
        assert_eq!(figure(false).size(), (76, 40));
        assert!(figure(false).profile_panel().is_none());
    }

    #[test]
    fn test_canvas_mapping_round_trips() {
        let fig = figure(false);
        let (px, py) = fig.data_to_canvas(Point::new(1.5, 0.5));
        assert_eq!((px, py), (25., 25.));
        let p = fig.canvas_to_data(px as f64, py as f64).unwrap();
        assert_relative_eq!(p.x, 1.5);
        assert_relative_eq!(p.y, 0.5);
        assert!(fig.canvas_to_data(5., 15.).is_none());
        assert!(fig.canvas_to_data(45., 15.).is_none());
    }

    #[test]
    fn test_pointer_outside_has_no_position() {
        let fig = figure(true);
        let event = fig.image_pointer(PointerKind::Press, 60., 100.);
        assert_eq!(event.kind, PointerKind::Press);
        assert!(event.position.is_none());
    }

    #[test]
    fn test_row_zero_renders_at_bottom() -> Result<()> {
        let fig = figure(false);
        let canvas = fig.render()?;
        // Row 0 (values 1, 2, 3) occupies the lower half.
        let bottom_left = *canvas.get_pixel(15, 25);
        let top_left = *canvas.get_pixel(15, 15);
        assert_eq!(bottom_left, fig.image.colormap().color(1.));
        assert_eq!(top_left, fig.image.colormap().color(4.));
        // NaN cells show the background.
        assert_eq!(*canvas.get_pixel(35, 15), BACKGROUND);
        Ok(())
    }

    #[test]
    fn test_overlays_are_removable() {
        let mut fig = figure(false);
        let m = fig
            .image
            .add_markers(&[Point::new(0., 0.)], &MarkerStyle::default());
        let a = fig.image.add_arrow(
            Point::new(2., 1.),
            Point::new(0., 0.),
            &crate::surface::direction_arrow_style(),
        );
        assert_eq!((fig.image.marker_sets(), fig.image.arrows()), (1, 1));
        assert!(fig.image.remove_overlay(m));
        assert!(!fig.image.remove_overlay(m));
        assert!(fig.image.remove_overlay(a));
        assert!(fig.image.annotations().is_empty());
    }

    #[test]
    fn test_autoscale_fits_lines() {
        let mut view = ProfileView::new();
        view.add_line(&[10., 20., f64::NAN, 30.], &LineStyle::default());
        view.add_line(&[0., 5.], &LineStyle::default());
        view.autoscale();
        let limits = view.limits();
        assert_relative_eq!(limits.x.0, -0.15);
        assert_relative_eq!(limits.x.1, 3.15);
        assert_relative_eq!(limits.y.0, -1.5);
        assert_relative_eq!(limits.y.1, 31.5);
    }

    #[test]
    fn test_line_colors_cycle() {
        let mut view = ProfileView::new();
        let first = view.add_line(&[1.], &LineStyle::default());
        view.add_line(&[1.], &LineStyle::default());
        assert_eq!(view.lines()[0].color, LINE_CYCLE[0]);
        assert_eq!(view.lines()[1].color, LINE_CYCLE[1]);
        view.remove_line(first);
        view.autoscale();
        assert_eq!(view.limits().x, (-0.5, 0.5));
    }

    #[test]
    fn test_render_with_overlays_and_profile() -> Result<()> {
        let mut fig = figure(true);
        fig.image
            .add_markers(&[Point::new(0.5, 1.5)], &MarkerStyle::default());
        fig.image.add_arrow(
            Point::new(2.5, 0.5),
            Point::new(1.5, 0.5),
            &crate::surface::direction_arrow_style(),
        );
        if let Some(profile) = fig.profile.as_mut() {
            profile.add_line(&[1., 5., 3.], &LineStyle::default());
            profile.autoscale();
        }
        let canvas = fig.render()?;
        assert_eq!(canvas.dimensions(), fig.size());
        // Marker centre is painted white.
        let (x, y) = fig.data_to_canvas(Point::new(0.5, 1.5));
        assert_eq!(*canvas.get_pixel(x as u32, y as u32), Rgba([255, 255, 255, 255]));
        Ok(())
    }
}
