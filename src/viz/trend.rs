//! Yearly catalog size and mean score on twin y axes

use crate::analysis::YearStat;
use crate::viz::{
    colors, draw_frame, draw_x_ticks, draw_y_ticks, empty_chart, finite_range, format_tick,
    tick_values, Canvas, ChartConfig,
};

pub struct TrendChart {
    config: ChartConfig,
    title: String,
    count_label: String,
    score_label: String,
}

impl TrendChart {
    pub fn new(config: ChartConfig) -> Self {
        Self {
            config,
            title: "Catalog size and score by year".to_string(),
            count_label: "TITLES".to_string(),
            score_label: "MEAN SCORE".to_string(),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Count series in blue on the left axis, mean score in red on the right
    pub fn render(&self, trend: &[YearStat]) -> Canvas {
        if trend.is_empty() {
            return empty_chart(&self.config, &self.title);
        }

        let (x_min, x_max) = match (trend.first(), trend.last()) {
            (Some(first), Some(last)) => (first.year as f64, last.year as f64),
            _ => return empty_chart(&self.config, &self.title),
        };
        let count_max = trend.iter().map(|s| s.count).max().unwrap_or(0) as f64 * 1.1;
        let count_max = count_max.max(1.0);
        let (score_lo, score_hi) =
            finite_range(trend.iter().filter_map(|s| s.mean_score)).unwrap_or((0.0, 1.0));
        let pad = ((score_hi - score_lo) * 0.1).max(0.5);
        let (score_min, score_max) = (score_lo - pad, score_hi + pad);

        let mut canvas = Canvas::from_config(&self.config);
        let area = self.config.plot_area();
        draw_y_ticks(&mut canvas, &self.config, 0.0, count_max, 6, colors::BLUE, true);

        for value in tick_values(score_min, score_max, 6) {
            let y = area.y(value, score_min, score_max);
            canvas.hline(y, area.right, area.right + 5, self.config.foreground);
            canvas.text(area.right + 8, y - 3, &format_tick(value), 1, colors::RED);
        }

        let counts: Vec<(i64, i64)> = trend
            .iter()
            .map(|s| {
                (
                    area.x(s.year as f64, x_min, x_max),
                    area.y(s.count as f64, 0.0, count_max),
                )
            })
            .collect();
        canvas.polyline(&counts, 2, colors::BLUE);

        // Years without any score break the line
        let mut segment: Vec<(i64, i64)> = Vec::new();
        for stat in trend {
            match stat.mean_score {
                Some(score) => segment.push((
                    area.x(stat.year as f64, x_min, x_max),
                    area.y(score, score_min, score_max),
                )),
                None => {
                    draw_segment(&mut canvas, &segment);
                    segment.clear();
                }
            }
        }
        draw_segment(&mut canvas, &segment);

        let ticks = ((x_max - x_min) as usize + 1).clamp(2, 8);
        draw_x_ticks(&mut canvas, &self.config, x_min, x_max, ticks);
        draw_frame(&mut canvas, &self.config, &self.title, "RELEASE YEAR", &self.count_label);
        canvas.text_vertical(
            self.config.width as i64 - 18,
            (area.top + area.bottom) / 2,
            &self.score_label,
            1,
            colors::RED,
        );
        canvas
    }
}

fn draw_segment(canvas: &mut Canvas, points: &[(i64, i64)]) {
    match points {
        [] => {}
        [(x, y)] => canvas.fill_circle(*x, *y, 2, colors::RED),
        _ => canvas.polyline(points, 2, colors::RED),
    }
}
