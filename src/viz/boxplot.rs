//! Box-and-whisker plot of a value per group

use crate::viz::{
    colors, draw_frame, draw_y_ticks, empty_chart, finite_range, interpolate_color, Canvas,
    ChartConfig,
};

/// Five-number summary with Tukey whiskers
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Smallest value within `q1 - 1.5 * IQR`
    pub whisker_low: f64,
    /// Largest value within `q3 + 1.5 * IQR`
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {
    /// Quartiles by linear interpolation; `None` when there are no finite values
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile(&sorted, 0.25);
        let median = quantile(&sorted, 0.5);
        let q3 = quantile(&sorted, 0.75);
        let iqr = q3 - q1;
        let low_fence = q1 - 1.5 * iqr;
        let high_fence = q3 + 1.5 * iqr;

        let inside: Vec<f64> = sorted
            .iter()
            .copied()
            .filter(|v| *v >= low_fence && *v <= high_fence)
            .collect();
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| *v < low_fence || *v > high_fence)
            .collect();

        Some(Self {
            q1,
            median,
            q3,
            whisker_low: inside.first().copied().unwrap_or(q1),
            whisker_high: inside.last().copied().unwrap_or(q3),
            outliers,
        })
    }
}

fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

pub struct BoxPlot {
    config: ChartConfig,
    title: String,
    x_label: String,
    y_label: String,
}

impl BoxPlot {
    pub fn new(config: ChartConfig) -> Self {
        Self {
            config,
            title: "Distribution by group".to_string(),
            x_label: String::new(),
            y_label: String::new(),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn labels(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }

    /// One box per group, groups drawn left to right in the given order
    pub fn render(&self, groups: &[(String, Vec<f64>)]) -> Canvas {
        let boxes: Vec<(&str, BoxStats)> = groups
            .iter()
            .filter_map(|(name, values)| Some((name.as_str(), BoxStats::from_values(values)?)))
            .collect();

        let Some((lo, hi)) = finite_range(groups.iter().flat_map(|(_, v)| v.iter().copied()))
        else {
            return empty_chart(&self.config, &self.title);
        };
        if boxes.is_empty() {
            return empty_chart(&self.config, &self.title);
        }
        let pad = ((hi - lo) * 0.05).max(0.5);
        let (y_min, y_max) = (lo - pad, hi + pad);

        let mut canvas = Canvas::from_config(&self.config);
        let area = self.config.plot_area();
        let fg = self.config.foreground;
        draw_y_ticks(&mut canvas, &self.config, y_min, y_max, 6, fg, true);

        let slot = area.width() / boxes.len() as i64;
        let box_width = (slot as f64 * 0.5) as i64;
        for (i, (name, stats)) in boxes.iter().enumerate() {
            let cx = area.left + slot * i as i64 + slot / 2;
            let left = cx - box_width / 2;
            let color = colors::PALETTE[i % colors::PALETTE.len()];
            let fill = interpolate_color(color, colors::WHITE, 0.45);

            let y_q1 = area.y(stats.q1, y_min, y_max);
            let y_q3 = area.y(stats.q3, y_min, y_max);
            let y_med = area.y(stats.median, y_min, y_max);
            let y_lo = area.y(stats.whisker_low, y_min, y_max);
            let y_hi = area.y(stats.whisker_high, y_min, y_max);

            canvas.vline(cx, y_q1, y_lo, fg);
            canvas.vline(cx, y_q3, y_hi, fg);
            canvas.hline(y_lo, cx - box_width / 4, cx + box_width / 4, fg);
            canvas.hline(y_hi, cx - box_width / 4, cx + box_width / 4, fg);

            canvas.fill_rect(left, y_q3, box_width, y_q1 - y_q3 + 1, fill);
            canvas.draw_rect(left, y_q3, box_width, y_q1 - y_q3 + 1, fg);
            canvas.thick_line(left, y_med, left + box_width - 1, y_med, 2, fg);

            for outlier in &stats.outliers {
                canvas.circle(cx, area.y(*outlier, y_min, y_max), 3, fg);
            }

            canvas.text_centered(cx, area.bottom + 10, name, self.config.label_scale(), fg);
        }

        draw_frame(&mut canvas, &self.config, &self.title, &self.x_label, &self.y_label);
        canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_box_stats_quartiles() {
        let stats = BoxStats::from_values(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_relative_eq!(stats.q1, 2.0);
        assert_relative_eq!(stats.median, 3.0);
        assert_relative_eq!(stats.q3, 4.0);
        assert_relative_eq!(stats.whisker_low, 1.0);
        assert_relative_eq!(stats.whisker_high, 5.0);
        assert!(stats.outliers.is_empty());
    }

    #[test]
    fn test_box_stats_interpolates_and_flags_outliers() {
        let stats = BoxStats::from_values(&[6.0, 1.0, 2.0, 3.0, 4.0, 30.0]).unwrap();
        // sorted: 1 2 3 4 6 30
        assert_relative_eq!(stats.q1, 2.25);
        assert_relative_eq!(stats.median, 3.5);
        assert_relative_eq!(stats.q3, 5.5);
        assert_eq!(stats.outliers, vec![30.0]);
        assert_relative_eq!(stats.whisker_high, 6.0);
    }

    #[test]
    fn test_box_stats_empty() {
        assert!(BoxStats::from_values(&[]).is_none());
        assert!(BoxStats::from_values(&[f64::NAN]).is_none());
    }

    #[test]
    fn test_render_groups_and_empty() {
        let config = ChartConfig::new(320, 240);
        let plot = BoxPlot::new(config).title("Score by type");
        let groups = vec![
            ("MOVIE".to_string(), vec![5.0, 6.0, 7.0, 8.0]),
            ("SHOW".to_string(), vec![6.5, 7.5, 8.5]),
        ];
        let canvas = plot.render(&groups);
        assert_eq!((canvas.width(), canvas.height()), (320, 240));

        let empty = plot.render(&[]);
        assert_eq!((empty.width(), empty.height()), (320, 240));
    }
}
