/// Report layer: everything the dashboard shows, computed without egui.
///
/// ```text
///   working CreditDataset
///        │
///        ▼
///   ┌──────────┐  ┌──────────┐  ┌────────────┐
///   │   kpi    │  │  charts  │  │  segments  │
///   └──────────┘  └──────────┘  └────────────┘
///        │              │              │
///        └──────── DashboardReport ────┘
/// ```
pub mod charts;
pub mod kpi;
pub mod segments;

use crate::data::model::CreditDataset;

use charts::{Chart, ChartSettings};
use kpi::Kpis;
use segments::SegmentRow;

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardReport {
    pub applicants: usize,
    pub kpis: Kpis,
    pub charts: Vec<Chart>,
    pub segments: Vec<SegmentRow>,
}

impl DashboardReport {
    pub fn compute(dataset: &CreditDataset, settings: &ChartSettings) -> Self {
        Self {
            applicants: dataset.len(),
            kpis: Kpis::compute(dataset),
            charts: charts::compute_charts(dataset, settings),
            segments: segments::segment_table(dataset),
        }
    }
}
