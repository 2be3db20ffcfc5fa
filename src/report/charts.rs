use crate::color::{self, Palette};
use crate::config::DashboardConfig;
use crate::data::aggregate::{self, FiveNumberSummary, Histogram};
use crate::data::model::{Applicant, CategoricalAttribute, CreditDataset, NumericAttribute, NumericRange};

pub const REPAID: &str = "Repaid";
pub const DEFAULT: &str = "Default";

pub fn target_label(target: u8) -> &'static str {
    if target == 1 { DEFAULT } else { REPAID }
}

/// Knobs of the chart computations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSettings {
    pub histogram_bins: usize,
    pub max_scatter_points: usize,
}

impl From<&DashboardConfig> for ChartSettings {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            histogram_bins: config.histogram_bins,
            max_scatter_points: config.max_scatter_points,
        }
    }
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self::from(&DashboardConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Chart data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DistributionSeries {
    pub label: String,
    pub summary: Option<FiveNumberSummary>,
    /// Observations drawn over the box, empty unless requested.
    pub points: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSeries {
    pub label: String,
    pub histogram: Histogram,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartKind {
    /// Row count per category.
    Counts(Vec<(String, usize)>),
    /// Default rate (mean target) per category.
    Rates(Vec<(String, Option<f64>)>),
    /// One box per target value.
    Distribution(Vec<DistributionSeries>),
    /// Series stacked on shared bins.
    StackedHistogram(Vec<HistogramSeries>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub id: &'static str,
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub palette: Palette,
    pub kind: ChartKind,
}

impl Chart {
    /// Labels of the categories or series, in drawing order.
    pub fn labels(&self) -> Vec<String> {
        match &self.kind {
            ChartKind::Counts(bars) => bars.iter().map(|(l, _)| l.clone()).collect(),
            ChartKind::Rates(bars) => bars.iter().map(|(l, _)| l.clone()).collect(),
            ChartKind::Distribution(series) => series.iter().map(|s| s.label.clone()).collect(),
            ChartKind::StackedHistogram(series) => series.iter().map(|s| s.label.clone()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match &self.kind {
            ChartKind::Counts(bars) => bars.is_empty(),
            ChartKind::Rates(bars) => bars.is_empty(),
            ChartKind::Distribution(series) => series.iter().all(|s| s.summary.is_none()),
            ChartKind::StackedHistogram(series) => series.iter().all(|s| s.histogram.total() == 0),
        }
    }
}

// ---------------------------------------------------------------------------
// The ten dashboard charts
// ---------------------------------------------------------------------------

pub fn compute_charts(dataset: &CreditDataset, settings: &ChartSettings) -> Vec<Chart> {
    vec![
        Chart {
            id: "target_counts",
            title: "Default vs Repaid (Counts)",
            x_label: "TARGET",
            y_label: "count",
            palette: color::TARGET_COUNTS,
            kind: target_counts(dataset),
        },
        rate_chart(
            dataset,
            "rate_gender",
            "Default Rate by Gender (%)",
            CategoricalAttribute::Gender,
            color::GENDER,
        ),
        rate_chart(
            dataset,
            "rate_education",
            "Default Rate by Education (%)",
            CategoricalAttribute::EducationType,
            color::EDUCATION,
        ),
        rate_chart(
            dataset,
            "rate_family",
            "Default Rate by Family Status (%)",
            CategoricalAttribute::FamilyStatus,
            color::FAMILY_STATUS,
        ),
        rate_chart(
            dataset,
            "rate_housing",
            "Default Rate by Housing Type (%)",
            CategoricalAttribute::HousingType,
            Palette::Generated,
        ),
        distribution_chart(
            dataset,
            "income_box",
            "Income by Target",
            NumericAttribute::IncomeTotal,
            color::INCOME_BY_TARGET,
            0,
        ),
        distribution_chart(
            dataset,
            "credit_box",
            "Credit by Target",
            NumericAttribute::CreditAmount,
            color::CREDIT_BY_TARGET,
            0,
        ),
        distribution_chart(
            dataset,
            "age_violin",
            "Age vs Target",
            NumericAttribute::AgeYears,
            color::AGE_BY_TARGET,
            settings.max_scatter_points,
        ),
        Chart {
            id: "employment_hist",
            title: "Employment Years by Target",
            x_label: NumericAttribute::EmploymentYears.column(),
            y_label: "count",
            palette: color::EMPLOYMENT_BY_TARGET,
            kind: employment_histogram(dataset, settings.histogram_bins),
        },
        Chart {
            id: "contract_counts",
            title: "Contract Type vs Target",
            x_label: CategoricalAttribute::ContractType.column(),
            y_label: "count",
            palette: color::CONTRACT_TYPE,
            kind: ChartKind::Counts(
                aggregate::group_count(&dataset.records, |r| {
                    CategoricalAttribute::ContractType.value(r).to_string()
                })
                .into_iter()
                .collect(),
            ),
        },
    ]
}

fn target_counts(dataset: &CreditDataset) -> ChartKind {
    let counts = aggregate::group_count(&dataset.records, |r| r.target);
    ChartKind::Counts(
        counts
            .into_iter()
            .map(|(t, n)| (target_label(t).to_string(), n))
            .collect(),
    )
}

fn rate_chart(
    dataset: &CreditDataset,
    id: &'static str,
    title: &'static str,
    attr: CategoricalAttribute,
    palette: Palette,
) -> Chart {
    let rates = aggregate::group_mean(
        &dataset.records,
        |r| attr.value(r).to_string(),
        |r| r.target as f64,
    );
    Chart {
        id,
        title,
        x_label: attr.column(),
        y_label: "default rate",
        palette,
        kind: ChartKind::Rates(rates.into_iter().collect()),
    }
}

fn distribution_chart(
    dataset: &CreditDataset,
    id: &'static str,
    title: &'static str,
    attr: NumericAttribute,
    palette: Palette,
    max_points: usize,
) -> Chart {
    let series = [0u8, 1]
        .into_iter()
        .filter_map(|target| {
            let values: Vec<f64> = dataset
                .records
                .iter()
                .filter(|r| r.target == target)
                .map(|r| attr.value(r))
                .collect();
            if values.is_empty() {
                return None;
            }
            Some(DistributionSeries {
                label: target_label(target).to_string(),
                summary: FiveNumberSummary::from_values(values.iter().copied()),
                points: sample_evenly(&values, max_points),
            })
        })
        .collect();

    Chart {
        id,
        title,
        x_label: "TARGET",
        y_label: attr.column(),
        palette,
        kind: ChartKind::Distribution(series),
    }
}

fn employment_histogram(dataset: &CreditDataset, bins: usize) -> ChartKind {
    let years = |r: &Applicant| r.employment_years;
    let Some(range) = NumericRange::spanning(dataset.records.iter().map(years)) else {
        return ChartKind::StackedHistogram(Vec::new());
    };

    let series = [0u8, 1]
        .into_iter()
        .map(|target| {
            let mut histogram = Histogram::with_range(range, bins);
            dataset
                .records
                .iter()
                .filter(|r| r.target == target)
                .for_each(|r| histogram.add(years(r)));
            HistogramSeries {
                label: target_label(target).to_string(),
                histogram,
            }
        })
        .collect();

    ChartKind::StackedHistogram(series)
}

/// At most `max` values picked at even strides, keeping order.
pub fn sample_evenly(values: &[f64], max: usize) -> Vec<f64> {
    if values.len() <= max {
        return values.to_vec();
    }
    let step = values.len() as f64 / max as f64;
    (0..max).map(|i| values[(i as f64 * step) as usize]).collect()
}
