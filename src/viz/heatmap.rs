//! Annotated correlation heatmap

use crate::analysis::CorrelationMatrix;
use crate::viz::{colors, empty_chart, font, interpolate_color, Canvas, ChartConfig};
use image::Rgb;

const COOL: Rgb<u8> = Rgb([59, 76, 192]);
const NEUTRAL: Rgb<u8> = Rgb([221, 221, 221]);
const WARM: Rgb<u8> = Rgb([180, 4, 38]);

/// Diverging blue-white-red color for a value in `[-1, 1]`; NaN is gray
pub fn coolwarm(value: f64) -> Rgb<u8> {
    if value.is_nan() {
        return colors::GRAY;
    }
    let v = value.clamp(-1.0, 1.0);
    if v < 0.0 {
        interpolate_color(NEUTRAL, COOL, -v)
    } else {
        interpolate_color(NEUTRAL, WARM, v)
    }
}

pub struct Heatmap {
    config: ChartConfig,
    title: String,
    /// Left gutter reserved for row labels
    label_width: u32,
}

impl Heatmap {
    pub fn new(config: ChartConfig) -> Self {
        Self {
            config,
            title: "Correlation matrix".to_string(),
            label_width: 130,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn render(&self, matrix: &CorrelationMatrix) -> Canvas {
        let k = matrix.names.len();
        if k == 0 {
            return empty_chart(&self.config, &self.title);
        }

        let mut canvas = Canvas::from_config(&self.config);
        let fg = self.config.foreground;
        let margin = self.config.margin as i64;
        let legend_width = 60;

        let grid_left = margin + self.label_width as i64;
        let avail_w = self.config.width as i64 - grid_left - margin - legend_width;
        let avail_h = self.config.height as i64 - 2 * margin;
        let cell = (avail_w.min(avail_h) / k as i64).max(1);

        for i in 0..k {
            for j in 0..k {
                let value = matrix.values[[i, j]];
                let x = grid_left + j as i64 * cell;
                let y = margin + i as i64 * cell;
                canvas.fill_rect(x, y, cell, cell, coolwarm(value));

                let text = if value.is_nan() { "NAN".to_string() } else { format!("{value:.2}") };
                let scale = if font::text_width(&text, 2) as i64 + 6 < cell { 2 } else { 1 };
                if font::text_width(&text, scale) as i64 + 2 < cell {
                    let ink = if value.abs() > 0.6 { colors::WHITE } else { colors::BLACK };
                    let ty = y + (cell - font::text_height(scale) as i64) / 2;
                    canvas.text_centered(x + cell / 2, ty, &text, scale, ink);
                }
            }
        }

        // Row labels on the left, column labels below, clipped to the cell
        let max_chars = ((cell / font::ADVANCE as i64).max(1)) as usize;
        for (i, name) in matrix.names.iter().enumerate() {
            let y = margin + i as i64 * cell + (cell - font::text_height(1) as i64) / 2;
            canvas.text_right(grid_left - 6, y, name, 1, fg);

            let short: String = name.chars().take(max_chars).collect();
            let x = grid_left + i as i64 * cell + cell / 2;
            canvas.text_centered(x, margin + k as i64 * cell + 6, &short, 1, fg);
        }

        // Color bar
        let bar_x = grid_left + k as i64 * cell + 20;
        let bar_h = k as i64 * cell;
        for dy in 0..bar_h {
            let value = 1.0 - 2.0 * dy as f64 / (bar_h - 1).max(1) as f64;
            canvas.hline(margin + dy, bar_x, bar_x + 14, coolwarm(value));
        }
        canvas.draw_rect(bar_x, margin, 15, bar_h, fg);
        canvas.text(bar_x + 20, margin, "1", 1, fg);
        canvas.text(bar_x + 20, margin + bar_h / 2 - 3, "0", 1, fg);
        canvas.text(bar_x + 20, margin + bar_h - 7, "-1", 1, fg);

        canvas.text_centered(
            self.config.width as i64 / 2,
            (margin - font::text_height(self.config.title_scale) as i64) / 2,
            &self.title,
            self.config.title_scale,
            fg,
        );
        canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_coolwarm_endpoints() {
        assert_eq!(coolwarm(-1.0), COOL);
        assert_eq!(coolwarm(0.0), NEUTRAL);
        assert_eq!(coolwarm(1.0), WARM);
        assert_eq!(coolwarm(5.0), WARM);
        assert_eq!(coolwarm(f64::NAN), colors::GRAY);
    }

    #[test]
    fn test_render_colors_cells() {
        let matrix = CorrelationMatrix {
            names: vec!["imdb_score".to_string(), "runtime".to_string()],
            values: array![[1.0, -1.0], [-1.0, 1.0]],
        };
        let config = ChartConfig::new(500, 400);
        let canvas = Heatmap::new(config.clone()).render(&matrix);

        // top-left corner of the first cell is inside the grid
        let x = (config.margin + 130) as u32 + 1;
        let y = config.margin as u32 + 1;
        assert_eq!(canvas.pixel(x, y), WARM);
    }

    #[test]
    fn test_render_empty_matrix() {
        let matrix = CorrelationMatrix {
            names: Vec::new(),
            values: ndarray::Array2::zeros((0, 0)),
        };
        let canvas = Heatmap::new(ChartConfig::new(200, 100)).render(&matrix);
        assert_eq!(canvas.width(), 200);
    }
}
