use eframe::egui::{self, Align, Layout, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::report::DashboardReport;
use crate::report::charts::Chart;
use crate::report::kpi::{Kpi, Kpis, NO_DATA, format_thousands};
use crate::report::segments::SegmentRow;
use crate::ui::plot;

const CHARTS_PER_ROW: usize = 3;
const CHART_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// The whole dashboard page for the current working dataset.
pub fn dashboard(ui: &mut Ui, report: &DashboardReport) {
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Credit Risk – Target & Risk Segmentation");
            ui.label(format!(
                "{} applicants in view",
                format_thousands(report.applicants as f64, 0)
            ));
            ui.add_space(8.0);

            kpi_grid(ui, &report.kpis);
            ui.separator();

            charts_grid(ui, &report.charts);
            ui.separator();

            ui.heading("Default Rate by Segment");
            segment_table(ui, &report.segments);
            ui.separator();

            insights(ui);
        });
}

// ---------------------------------------------------------------------------
// KPI tiles
// ---------------------------------------------------------------------------

fn kpi_grid(ui: &mut Ui, kpis: &Kpis) {
    for row in kpis.rows() {
        if row.is_empty() {
            continue;
        }
        ui.columns(row.len(), |columns: &mut [Ui]| {
            for (col, kpi) in columns.iter_mut().zip(row) {
                metric(col, kpi);
            }
        });
        ui.add_space(6.0);
    }
}

fn metric(ui: &mut Ui, kpi: &Kpi) {
    ui.group(|ui: &mut Ui| {
        ui.set_min_width(ui.available_width());
        ui.label(RichText::new(kpi.label).small());
        ui.label(RichText::new(kpi.display()).size(22.0).strong());
    });
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

fn charts_grid(ui: &mut Ui, charts: &[Chart]) {
    for row in charts.chunks(CHARTS_PER_ROW) {
        ui.columns(CHARTS_PER_ROW, |columns: &mut [Ui]| {
            for (col, chart) in columns.iter_mut().zip(row) {
                plot::chart(col, chart, CHART_HEIGHT);
            }
        });
        ui.add_space(8.0);
    }
}

// ---------------------------------------------------------------------------
// Segment table
// ---------------------------------------------------------------------------

fn segment_table(ui: &mut Ui, rows: &[SegmentRow]) {
    if rows.is_empty() {
        ui.weak("No data");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .vscroll(false)
        .cell_layout(Layout::left_to_right(Align::Center))
        .column(Column::auto().at_least(140.0))
        .column(Column::remainder().at_least(180.0))
        .column(Column::auto().at_least(90.0))
        .column(Column::auto().at_least(80.0))
        .column(Column::auto().at_least(100.0))
        .header(20.0, |mut header| {
            for title in ["Attribute", "Value", "Applicants", "Defaults", "Default Rate (%)"] {
                header.col(|ui: &mut Ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for row in rows {
                body.row(18.0, |mut cells| {
                    cells.col(|ui: &mut Ui| {
                        ui.label(row.attribute.label());
                    });
                    cells.col(|ui: &mut Ui| {
                        ui.label(&row.value);
                    });
                    cells.col(|ui: &mut Ui| {
                        ui.label(format_thousands(row.applicants as f64, 0));
                    });
                    cells.col(|ui: &mut Ui| {
                        ui.label(format_thousands(row.defaults as f64, 0));
                    });
                    cells.col(|ui: &mut Ui| {
                        ui.label(
                            row.default_rate
                                .map_or_else(|| NO_DATA.to_string(), |r| format!("{:.2}", r * 100.0)),
                        );
                    });
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Insights
// ---------------------------------------------------------------------------

const INSIGHTS: &[(&str, &str)] = &[
    ("Gender", "One gender group shows a slightly higher default rate."),
    ("Education", "Lower education groups tend to default more often."),
    ("Housing Type", "Applicants living in rented or municipal apartments show higher default risk."),
    ("Financial Factors", "Defaulters generally have lower income but higher credit relative to income."),
    ("Highest risk", "Low income, rented housing and lower education may warrant stricter credit checks."),
];

fn insights(ui: &mut Ui) {
    ui.heading("Insights");
    for (topic, text) in INSIGHTS {
        ui.horizontal_wrapped(|ui: &mut Ui| {
            ui.label(RichText::new(format!("• {topic}:")).strong());
            ui.label(*text);
        });
    }
}
