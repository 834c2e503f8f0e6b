//! Chart rendering for the exploratory figures
//!
//! Every chart draws onto a [`Canvas`] (an `RgbImage` plus drawing helpers)
//! and is saved as PNG. Text uses the bitmap font in [`font`].

mod boxplot;
pub mod font;
mod heatmap;
mod histogram;
mod trend;
mod wordcloud;

pub use boxplot::{BoxPlot, BoxStats};
pub use heatmap::{coolwarm, Heatmap};
pub use histogram::{gaussian_kde, histogram_counts, Histogram};
pub use trend::TrendChart;
pub use wordcloud::{PlacedWord, WordCloud};

use crate::error::Result;
use image::{Rgb, RgbImage};
use std::fs;
use std::path::Path;

/// Common color definitions
pub mod colors {
    use image::Rgb;

    pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    pub const DARK_GRAY: Rgb<u8> = Rgb([50, 50, 50]);
    pub const GRAY: Rgb<u8> = Rgb([150, 150, 150]);
    pub const LIGHT_GRAY: Rgb<u8> = Rgb([225, 225, 225]);
    pub const BLUE: Rgb<u8> = Rgb([31, 119, 180]);
    pub const LIGHT_BLUE: Rgb<u8> = Rgb([140, 185, 220]);
    pub const RED: Rgb<u8> = Rgb([214, 39, 40]);
    pub const ORANGE: Rgb<u8> = Rgb([255, 127, 14]);
    pub const GREEN: Rgb<u8> = Rgb([44, 160, 44]);
    pub const PURPLE: Rgb<u8> = Rgb([148, 103, 189]);
    pub const BROWN: Rgb<u8> = Rgb([140, 86, 75]);

    /// Categorical palette for groups and words
    pub const PALETTE: [Rgb<u8>; 6] = [BLUE, ORANGE, GREEN, RED, PURPLE, BROWN];
}

/// Figure configuration
#[derive(Debug, Clone)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    pub background: Rgb<u8>,
    pub foreground: Rgb<u8>,
    pub margin: u32,
    /// Bitmap font scale for titles; labels use one step smaller
    pub title_scale: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            background: colors::WHITE,
            foreground: colors::DARK_GRAY,
            margin: 70,
            title_scale: 3,
        }
    }
}

impl ChartConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn label_scale(&self) -> u32 {
        self.title_scale.saturating_sub(1).max(1)
    }

    /// Region inside the margins where data is drawn
    pub fn plot_area(&self) -> PlotArea {
        let m = self.margin as i64;
        PlotArea {
            left: m,
            top: m,
            right: (self.width as i64 - m).max(m + 1),
            bottom: (self.height as i64 - m).max(m + 1),
        }
    }
}

/// Pixel rectangle used for data coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotArea {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl PlotArea {
    pub fn width(&self) -> i64 {
        self.right - self.left
    }

    pub fn height(&self) -> i64 {
        self.bottom - self.top
    }

    /// Map a value in `[min, max]` to a horizontal pixel
    pub fn x(&self, value: f64, min: f64, max: f64) -> i64 {
        self.left + (fraction(value, min, max) * self.width() as f64).round() as i64
    }

    /// Map a value in `[min, max]` to a vertical pixel, larger values higher
    pub fn y(&self, value: f64, min: f64, max: f64) -> i64 {
        self.bottom - (fraction(value, min, max) * self.height() as f64).round() as i64
    }
}

fn fraction(value: f64, min: f64, max: f64) -> f64 {
    if max > min {
        ((value - min) / (max - min)).clamp(0.0, 1.0)
    } else {
        0.5
    }
}

/// RGB drawing surface with clipped primitives
pub struct Canvas {
    img: RgbImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Rgb<u8>) -> Self {
        Self {
            img: RgbImage::from_pixel(width.max(1), height.max(1), background),
        }
    }

    pub fn from_config(config: &ChartConfig) -> Self {
        Self::new(config.width, config.height, config.background)
    }

    pub fn width(&self) -> u32 {
        self.img.width()
    }

    pub fn height(&self) -> u32 {
        self.img.height()
    }

    pub fn image(&self) -> &RgbImage {
        &self.img
    }

    pub fn into_image(self) -> RgbImage {
        self.img
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgb<u8> {
        *self.img.get_pixel(x, y)
    }

    pub fn put(&mut self, x: i64, y: i64, color: Rgb<u8>) {
        if x >= 0 && y >= 0 && x < self.img.width() as i64 && y < self.img.height() as i64 {
            self.img.put_pixel(x as u32, y as u32, color);
        }
    }

    pub fn fill_rect(&mut self, x: i64, y: i64, width: i64, height: i64, color: Rgb<u8>) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + width).min(self.img.width() as i64);
        let y1 = (y + height).min(self.img.height() as i64);
        for py in y0..y1 {
            for px in x0..x1 {
                self.img.put_pixel(px as u32, py as u32, color);
            }
        }
    }

    pub fn draw_rect(&mut self, x: i64, y: i64, width: i64, height: i64, color: Rgb<u8>) {
        if width <= 0 || height <= 0 {
            return;
        }
        self.hline(y, x, x + width - 1, color);
        self.hline(y + height - 1, x, x + width - 1, color);
        self.vline(x, y, y + height - 1, color);
        self.vline(x + width - 1, y, y + height - 1, color);
    }

    pub fn hline(&mut self, y: i64, x1: i64, x2: i64, color: Rgb<u8>) {
        let (start, end) = if x1 < x2 { (x1, x2) } else { (x2, x1) };
        for x in start..=end {
            self.put(x, y, color);
        }
    }

    pub fn vline(&mut self, x: i64, y1: i64, y2: i64, color: Rgb<u8>) {
        let (start, end) = if y1 < y2 { (y1, y2) } else { (y2, y1) };
        for y in start..=end {
            self.put(x, y, color);
        }
    }

    /// Bresenham line
    pub fn line(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb<u8>) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let (mut x, mut y) = (x0, y0);
        let mut err = dx + dy;

        loop {
            self.put(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    pub fn thick_line(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, width: i64, color: Rgb<u8>) {
        let half = width / 2;
        for offset in -half..=(width - 1 - half) {
            if (x1 - x0).abs() >= (y1 - y0).abs() {
                self.line(x0, y0 + offset, x1, y1 + offset, color);
            } else {
                self.line(x0 + offset, y0, x1 + offset, y1, color);
            }
        }
    }

    pub fn polyline(&mut self, points: &[(i64, i64)], width: i64, color: Rgb<u8>) {
        for pair in points.windows(2) {
            self.thick_line(pair[0].0, pair[0].1, pair[1].0, pair[1].1, width, color);
        }
    }

    pub fn fill_circle(&mut self, cx: i64, cy: i64, radius: i64, color: Rgb<u8>) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= radius * radius {
                    self.put(cx + dx, cy + dy, color);
                }
            }
        }
    }

    pub fn circle(&mut self, cx: i64, cy: i64, radius: i64, color: Rgb<u8>) {
        let inner = (radius - 1).max(0);
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let d = dx * dx + dy * dy;
                if d <= radius * radius && d > inner * inner {
                    self.put(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// Draw text with its top-left corner at `(x, y)`
    pub fn text(&mut self, x: i64, y: i64, text: &str, scale: u32, color: Rgb<u8>) {
        let scale = scale.max(1) as i64;
        let mut cursor = x;
        for c in text.chars() {
            let rows = font::glyph(c);
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..font::GLYPH_WIDTH as i64 {
                    if bits & (1 << (font::GLYPH_WIDTH as i64 - 1 - col)) != 0 {
                        self.fill_rect(
                            cursor + col * scale,
                            y + row as i64 * scale,
                            scale,
                            scale,
                            color,
                        );
                    }
                }
            }
            cursor += font::ADVANCE as i64 * scale;
        }
    }

    pub fn text_centered(&mut self, cx: i64, y: i64, text: &str, scale: u32, color: Rgb<u8>) {
        let w = font::text_width(text, scale) as i64;
        self.text(cx - w / 2, y, text, scale, color);
    }

    pub fn text_right(&mut self, right: i64, y: i64, text: &str, scale: u32, color: Rgb<u8>) {
        let w = font::text_width(text, scale) as i64;
        self.text(right - w, y, text, scale, color);
    }

    /// Text drawn top to bottom, one character per line
    pub fn text_vertical(&mut self, x: i64, cy: i64, text: &str, scale: u32, color: Rgb<u8>) {
        let step = (font::GLYPH_HEIGHT + 2) as i64 * scale as i64;
        let n = text.chars().count() as i64;
        let mut y = cy - n * step / 2;
        for c in text.chars() {
            let mut buf = [0u8; 4];
            self.text(x, y, c.encode_utf8(&mut buf), scale, color);
            y += step;
        }
    }

    /// Write the canvas as PNG, creating the parent directory
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        self.img.save(path)?;
        Ok(())
    }
}

/// Draw the title, frame and axis labels shared by all charts
pub fn draw_frame(
    canvas: &mut Canvas,
    config: &ChartConfig,
    title: &str,
    x_label: &str,
    y_label: &str,
) {
    let area = config.plot_area();
    let label = config.label_scale();

    canvas.text_centered(
        config.width as i64 / 2,
        (config.margin as i64 - font::text_height(config.title_scale) as i64) / 2,
        title,
        config.title_scale,
        config.foreground,
    );
    canvas.draw_rect(
        area.left,
        area.top,
        area.width() + 1,
        area.height() + 1,
        config.foreground,
    );
    if !x_label.is_empty() {
        canvas.text_centered(
            (area.left + area.right) / 2,
            area.bottom + 32,
            x_label,
            label,
            config.foreground,
        );
    }
    if !y_label.is_empty() {
        canvas.text_vertical(12, (area.top + area.bottom) / 2, y_label, 1, config.foreground);
    }
}

/// Frame with a "NO DATA" note, used when a chart has nothing to plot
pub fn empty_chart(config: &ChartConfig, title: &str) -> Canvas {
    let mut canvas = Canvas::from_config(config);
    draw_frame(&mut canvas, config, title, "", "");
    let area = config.plot_area();
    canvas.text_centered(
        (area.left + area.right) / 2,
        (area.top + area.bottom) / 2,
        "NO DATA",
        config.label_scale(),
        colors::GRAY,
    );
    canvas
}

/// Horizontal grid lines with value labels on the left axis
pub fn draw_y_ticks(
    canvas: &mut Canvas,
    config: &ChartConfig,
    min: f64,
    max: f64,
    ticks: usize,
    color: Rgb<u8>,
    grid: bool,
) {
    let area = config.plot_area();
    for value in tick_values(min, max, ticks) {
        let y = area.y(value, min, max);
        if grid {
            canvas.hline(y, area.left + 1, area.right - 1, colors::LIGHT_GRAY);
        }
        canvas.hline(y, area.left - 5, area.left, config.foreground);
        canvas.text_right(area.left - 8, y - 3, &format_tick(value), 1, color);
    }
}

/// Tick marks with value labels below the horizontal axis
pub fn draw_x_ticks(canvas: &mut Canvas, config: &ChartConfig, min: f64, max: f64, ticks: usize) {
    let area = config.plot_area();
    for value in tick_values(min, max, ticks) {
        let x = area.x(value, min, max);
        canvas.vline(x, area.bottom, area.bottom + 5, config.foreground);
        canvas.text_centered(x, area.bottom + 10, &format_tick(value), 1, config.foreground);
    }
}

/// `ticks` evenly spaced values from `min` to `max` inclusive
pub fn tick_values(min: f64, max: f64, ticks: usize) -> Vec<f64> {
    if ticks < 2 || max <= min {
        return vec![min];
    }
    let step = (max - min) / (ticks - 1) as f64;
    (0..ticks).map(|i| min + step * i as f64).collect()
}

/// Compact label: integers without decimals, others with up to two
pub fn format_tick(value: f64) -> String {
    if value.fract().abs() < 1e-9 && value.abs() < 1e12 {
        format!("{}", value.round() as i64)
    } else if value.abs() >= 100.0 {
        format!("{value:.0}")
    } else if value.abs() >= 10.0 {
        format!("{value:.1}")
    } else {
        format!("{value:.2}")
    }
}

/// Interpolate between two colors
pub fn interpolate_color(c1: Rgb<u8>, c2: Rgb<u8>, t: f64) -> Rgb<u8> {
    let t = t.clamp(0.0, 1.0);
    Rgb([
        ((1.0 - t) * c1.0[0] as f64 + t * c2.0[0] as f64) as u8,
        ((1.0 - t) * c1.0[1] as f64 + t * c2.0[1] as f64) as u8,
        ((1.0 - t) * c1.0[2] as f64 + t * c2.0[2] as f64) as u8,
    ])
}

/// Finite minimum and maximum, `None` if there are no finite values
pub fn finite_range(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
