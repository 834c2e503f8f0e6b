//! Histogram with a Gaussian kernel density overlay

use crate::viz::{
    colors, draw_frame, draw_x_ticks, draw_y_ticks, empty_chart, finite_range, Canvas, ChartConfig,
};

/// Bin edges (`bins + 1` of them) and per-bin counts
///
/// Bins are equal width over the data range; the last bin includes its right
/// edge. A zero-width range is widened to `[v - 0.5, v + 0.5]`.
pub fn histogram_counts(values: &[f64], bins: usize) -> (Vec<f64>, Vec<usize>) {
    let bins = bins.max(1);
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let Some((mut lo, mut hi)) = finite_range(finite.iter().copied()) else {
        return (Vec::new(), Vec::new());
    };
    if hi <= lo {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
    let mut counts = vec![0usize; bins];
    for v in finite {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }
    (edges, counts)
}

/// Gaussian KDE evaluated at `points`, bandwidth by Scott's rule
///
/// Returns `None` with fewer than two values or zero variance.
pub fn gaussian_kde(values: &[f64], points: &[f64]) -> Option<Vec<f64>> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    if var <= 0.0 {
        return None;
    }

    let bandwidth = var.sqrt() * (n as f64).powf(-0.2);
    let norm = 1.0 / (n as f64 * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    Some(
        points
            .iter()
            .map(|&x| {
                norm * values
                    .iter()
                    .map(|v| (-0.5 * ((x - v) / bandwidth).powi(2)).exp())
                    .sum::<f64>()
            })
            .collect(),
    )
}

/// Distribution chart of one numeric column
pub struct Histogram {
    config: ChartConfig,
    bins: usize,
    title: String,
    x_label: String,
    kde_points: usize,
}

impl Histogram {
    pub fn new(config: ChartConfig, bins: usize) -> Self {
        Self {
            config,
            bins: bins.max(1),
            title: "Distribution".to_string(),
            x_label: String::new(),
            kde_points: 200,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn x_label(mut self, label: impl Into<String>) -> Self {
        self.x_label = label.into();
        self
    }

    pub fn render(&self, values: &[f64]) -> Canvas {
        let values: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let (edges, counts) = histogram_counts(&values, self.bins);
        if counts.is_empty() {
            return empty_chart(&self.config, &self.title);
        }

        let lo = edges[0];
        let hi = edges[edges.len() - 1];
        let bin_width = edges[1] - edges[0];

        // Density scaled to counts so both share the y axis
        let xs: Vec<f64> = (0..self.kde_points)
            .map(|i| lo + (hi - lo) * i as f64 / (self.kde_points - 1) as f64)
            .collect();
        let kde: Option<Vec<f64>> = gaussian_kde(&values, &xs).map(|density| {
            density
                .into_iter()
                .map(|d| d * values.len() as f64 * bin_width)
                .collect()
        });

        let max_count = counts.iter().copied().max().unwrap_or(0) as f64;
        let max_kde = kde
            .as_ref()
            .map(|k| k.iter().copied().fold(0.0, f64::max))
            .unwrap_or(0.0);
        let y_max = (max_count.max(max_kde) * 1.1).max(1.0);

        let mut canvas = Canvas::from_config(&self.config);
        let area = self.config.plot_area();
        draw_y_ticks(&mut canvas, &self.config, 0.0, y_max, 6, self.config.foreground, true);

        for (i, &count) in counts.iter().enumerate() {
            let x0 = area.x(edges[i], lo, hi);
            let x1 = area.x(edges[i + 1], lo, hi);
            let top = area.y(count as f64, 0.0, y_max);
            if count > 0 {
                canvas.fill_rect(x0, top, x1 - x0, area.bottom - top, colors::LIGHT_BLUE);
                canvas.draw_rect(x0, top, x1 - x0 + 1, area.bottom - top + 1, colors::BLUE);
            }
        }

        if let Some(kde) = kde {
            let points: Vec<(i64, i64)> = xs
                .iter()
                .zip(&kde)
                .map(|(&x, &y)| (area.x(x, lo, hi), area.y(y, 0.0, y_max)))
                .collect();
            canvas.polyline(&points, 2, colors::BLUE);
        }

        draw_x_ticks(&mut canvas, &self.config, lo, hi, 6);
        draw_frame(&mut canvas, &self.config, &self.title, &self.x_label, "COUNT");
        canvas
    }
}
