use std::ops::RangeInclusive;

use eframe::egui::{Color32, RichText, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Plot, PlotPoints, PlotUi,
    Points,
};

use crate::color::ColorMap;
use crate::report::charts::{Chart, ChartKind, DistributionSeries, HistogramSeries};

// ---------------------------------------------------------------------------
// Dashboard charts
// ---------------------------------------------------------------------------

/// Render one chart with its title above it.
pub fn chart(ui: &mut Ui, chart: &Chart, height: f32) {
    ui.label(RichText::new(chart.title).strong());

    if chart.is_empty() {
        ui.allocate_ui([ui.available_width(), height].into(), |ui: &mut Ui| {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.weak("No data");
            });
        });
        return;
    }

    let labels = chart.labels();
    let colors = ColorMap::new(&chart.palette, &labels);

    let mut plot = Plot::new(chart.id)
        .height(height)
        .legend(Legend::default())
        .x_axis_label(chart.x_label)
        .y_axis_label(chart.y_label)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true);

    match &chart.kind {
        ChartKind::Counts(_) | ChartKind::Rates(_) | ChartKind::Distribution(_) => {
            let names = labels.clone();
            plot = plot.x_axis_formatter(move |mark, range| category_tick(&names, mark, range));
        }
        ChartKind::StackedHistogram(_) => {}
    }
    if let ChartKind::Rates(_) = &chart.kind {
        plot = plot.y_axis_formatter(|mark, _range| format!("{:.0}%", mark.value * 100.0));
    }

    plot.show(ui, |plot_ui| match &chart.kind {
        ChartKind::Counts(bars) => {
            let values = bars.iter().map(|(label, n)| (label.as_str(), Some(*n as f64)));
            category_bars(plot_ui, values, &colors);
        }
        ChartKind::Rates(bars) => {
            let values = bars.iter().map(|(label, rate)| (label.as_str(), *rate));
            category_bars(plot_ui, values, &colors);
        }
        ChartKind::Distribution(series) => distributions(plot_ui, series, &colors),
        ChartKind::StackedHistogram(series) => stacked_histogram(plot_ui, series, &colors),
    });
}

/// Category name under integer ticks, nothing elsewhere.
fn category_tick(names: &[String], mark: GridMark, _range: &RangeInclusive<f64>) -> String {
    let idx = mark.value.round();
    if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    names.get(idx as usize).cloned().unwrap_or_default()
}

/// One bar per category at x = 0, 1, 2, …. Categories without a value keep
/// their slot but draw nothing.
fn category_bars<'a>(
    plot_ui: &mut PlotUi,
    values: impl Iterator<Item = (&'a str, Option<f64>)>,
    colors: &ColorMap,
) {
    for (i, (label, value)) in values.enumerate() {
        let Some(value) = value else {
            continue;
        };
        let color = colors.color_for(label);
        let bar = Bar::new(i as f64, value).name(label).fill(color).width(0.7);
        plot_ui.bar_chart(BarChart::new(vec![bar]).name(label).color(color));
    }
}

/// A box per series plus its sampled observations, jittered around the box.
fn distributions(plot_ui: &mut PlotUi, series: &[DistributionSeries], colors: &ColorMap) {
    for (i, s) in series.iter().enumerate() {
        let Some(summary) = s.summary else {
            continue;
        };
        let color = colors.color_for(&s.label);
        let x = i as f64;

        let spread = BoxSpread::new(
            summary.lower_whisker,
            summary.q1,
            summary.median,
            summary.q3,
            summary.upper_whisker,
        );
        let elem = BoxElem::new(x, spread)
            .name(&s.label)
            .box_width(0.5)
            .fill(color.gamma_multiply(0.3))
            .stroke(Stroke::new(1.5, color));
        plot_ui.box_plot(BoxPlot::new(vec![elem]).name(&s.label).color(color));

        if !s.points.is_empty() {
            let points: PlotPoints = s
                .points
                .iter()
                .enumerate()
                .map(|(j, &y)| [x + jitter(j), y])
                .collect();
            plot_ui.points(
                Points::new(points)
                    .name(&s.label)
                    .color(color.gamma_multiply(0.6))
                    .radius(1.5),
            );
        }
    }
}

/// Deterministic horizontal offset in [-0.35, 0.35).
fn jitter(j: usize) -> f64 {
    ((j * 37) % 100) as f64 / 100.0 * 0.7 - 0.35
}

/// Series drawn on shared bins, each stacked on the ones before it.
fn stacked_histogram(plot_ui: &mut PlotUi, series: &[HistogramSeries], colors: &ColorMap) {
    let mut drawn: Vec<BarChart> = Vec::with_capacity(series.len());
    for s in series {
        let color = colors.color_for(&s.label);
        let width = s.histogram.bin_width();
        let bars: Vec<Bar> = s
            .histogram
            .centers()
            .into_iter()
            .zip(&s.histogram.counts)
            .map(|(center, &count)| {
                Bar::new(center, count as f64)
                    .width(width)
                    .fill(color)
                    .stroke(Stroke::new(0.5, Color32::BLACK))
            })
            .collect();

        let chart = {
            let below: Vec<&BarChart> = drawn.iter().collect();
            BarChart::new(bars)
                .name(&s.label)
                .color(color)
                .stack_on(&below)
        };
        drawn.push(chart);
    }
    for chart in drawn {
        plot_ui.bar_chart(chart);
    }
}
