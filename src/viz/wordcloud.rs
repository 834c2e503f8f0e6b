//! Word cloud of description vocabulary
//!
//! Words are placed largest first, each walking an Archimedean spiral out
//! from the center until its box collides with nothing already placed.
//! A word that fits nowhere is retried one font step smaller, then dropped.

use crate::viz::{colors, empty_chart, font, Canvas, ChartConfig};
use image::Rgb;

/// Word box in canvas pixels
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub word: String,
    pub count: usize,
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
    pub scale: u32,
    pub color: Rgb<u8>,
}

impl PlacedWord {
    fn overlaps(&self, x: i64, y: i64, width: i64, height: i64, pad: i64) -> bool {
        x < self.x + self.width + pad
            && self.x < x + width + pad
            && y < self.y + self.height + pad
            && self.y < y + height + pad
    }
}

pub struct WordCloud {
    config: ChartConfig,
    title: String,
    max_scale: u32,
    padding: i64,
}

impl WordCloud {
    pub fn new(config: ChartConfig) -> Self {
        Self {
            config,
            title: "Description word cloud".to_string(),
            max_scale: 8,
            padding: 3,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn max_scale(mut self, scale: u32) -> Self {
        self.max_scale = scale.max(1);
        self
    }

    /// Region the words may occupy: below the title, inside a small border
    fn region(&self) -> (i64, i64, i64, i64) {
        let border = 10;
        let top = self.config.margin as i64;
        (
            border,
            top,
            self.config.width as i64 - border,
            self.config.height as i64 - border,
        )
    }

    /// Font scale for a word, by square root of its frequency share
    fn scale_for(&self, count: usize, max_count: usize) -> u32 {
        let ratio = (count as f64 / max_count.max(1) as f64).sqrt();
        1 + ((self.max_scale - 1) as f64 * ratio).round() as u32
    }

    /// Place `words` (most frequent first) without overlaps
    pub fn layout(&self, words: &[(String, usize)]) -> Vec<PlacedWord> {
        let (left, top, right, bottom) = self.region();
        let cx = (left + right) / 2;
        let cy = (top + bottom) / 2;
        let max_radius = ((right - left).pow(2) as f64 + (bottom - top).pow(2) as f64).sqrt() / 2.0;
        let aspect = (bottom - top) as f64 / (right - left).max(1) as f64;

        let max_count = words.iter().map(|(_, c)| *c).max().unwrap_or(1);
        let mut placed: Vec<PlacedWord> = Vec::new();

        for (index, (word, count)) in words.iter().enumerate() {
            let mut scale = self.scale_for(*count, max_count);
            loop {
                let width = font::text_width(word, scale) as i64;
                let height = font::text_height(scale) as i64;
                if let Some((x, y)) = self.find_spot(
                    &placed,
                    (cx, cy),
                    (width, height),
                    (left, top, right, bottom),
                    max_radius,
                    aspect,
                ) {
                    placed.push(PlacedWord {
                        word: word.clone(),
                        count: *count,
                        x,
                        y,
                        width,
                        height,
                        scale,
                        color: colors::PALETTE[index % colors::PALETTE.len()],
                    });
                    break;
                }
                if scale == 1 {
                    break;
                }
                scale -= 1;
            }
        }
        placed
    }

    fn find_spot(
        &self,
        placed: &[PlacedWord],
        center: (i64, i64),
        size: (i64, i64),
        bounds: (i64, i64, i64, i64),
        max_radius: f64,
        aspect: f64,
    ) -> Option<(i64, i64)> {
        let (width, height) = size;
        let (left, top, right, bottom) = bounds;
        if width > right - left || height > bottom - top {
            return None;
        }

        let step = 0.1;
        let mut t: f64 = 0.0;
        loop {
            let radius = 2.0 * t;
            if radius > max_radius {
                return None;
            }
            let x = center.0 + (radius * t.cos()).round() as i64 - width / 2;
            let y = center.1 + (radius * aspect * t.sin()).round() as i64 - height / 2;
            let inside = x >= left && y >= top && x + width <= right && y + height <= bottom;
            if inside
                && !placed
                    .iter()
                    .any(|p| p.overlaps(x, y, width, height, self.padding))
            {
                return Some((x, y));
            }
            t += step;
        }
    }

    pub fn render(&self, words: &[(String, usize)]) -> Canvas {
        let placed = self.layout(words);
        if placed.is_empty() {
            return empty_chart(&self.config, &self.title);
        }

        let mut canvas = Canvas::from_config(&self.config);
        for word in &placed {
            canvas.text(word.x, word.y, &word.word, word.scale, word.color);
        }
        canvas.text_centered(
            self.config.width as i64 / 2,
            (self.config.margin as i64 - font::text_height(self.config.title_scale) as i64) / 2,
            &self.title,
            self.config.title_scale,
            self.config.foreground,
        );
        canvas
    }
}
