use crate::data::aggregate;
use crate::data::model::{Applicant, CreditDataset};

pub const MALE: &str = "M";
pub const FEMALE: &str = "F";
pub const SECONDARY_EDUCATION: &str = "Secondary / secondary special";
pub const MARRIED: &str = "Married";

/// Shown wherever an aggregate has no input rows.
pub const NO_DATA: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KpiFormat {
    /// Integer with thousands separators.
    Count,
    /// Fraction shown as a percentage with two decimals.
    Percent,
    /// Amount with thousands separators, no decimals.
    Money,
    /// One decimal.
    Years,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Kpi {
    pub label: &'static str,
    pub value: Option<f64>,
    pub format: KpiFormat,
}

impl Kpi {
    fn new(label: &'static str, value: Option<f64>, format: KpiFormat) -> Self {
        Self {
            label,
            value,
            format,
        }
    }

    pub fn display(&self) -> String {
        let Some(v) = self.value.filter(|v| v.is_finite()) else {
            return NO_DATA.to_string();
        };
        match self.format {
            KpiFormat::Count => format_thousands(v, 0),
            KpiFormat::Percent => format!("{:.2}", v * 100.0),
            KpiFormat::Money => format_thousands(v, 0),
            KpiFormat::Years => format!("{v:.1}"),
        }
    }
}

/// The ten headline tiles, laid out in rows of 3, 3 and 4.
#[derive(Debug, Clone, PartialEq)]
pub struct Kpis {
    pub tiles: Vec<Kpi>,
}

impl Kpis {
    pub fn compute(dataset: &CreditDataset) -> Self {
        let records = &dataset.records;
        let target = |r: &Applicant| r.target as f64;
        let rate_where = |pred: &dyn Fn(&Applicant) -> bool| {
            aggregate::mean(records.iter().filter(|&r| pred(r)).map(target))
        };
        let defaulter_mean = |value: fn(&Applicant) -> f64| {
            aggregate::mean(dataset.defaulters().map(value))
        };

        let tiles = vec![
            Kpi::new(
                "Total Defaults",
                aggregate::sum(records.iter().map(target)),
                KpiFormat::Count,
            ),
            Kpi::new("Default Rate (%)", rate_where(&|_| true), KpiFormat::Percent),
            Kpi::new(
                "Default Rate (Male %)",
                rate_where(&|r| r.gender == MALE),
                KpiFormat::Percent,
            ),
            Kpi::new(
                "Default Rate (Female %)",
                rate_where(&|r| r.gender == FEMALE),
                KpiFormat::Percent,
            ),
            Kpi::new(
                "Default Rate (Secondary Ed %)",
                rate_where(&|r| r.education_type == SECONDARY_EDUCATION),
                KpiFormat::Percent,
            ),
            Kpi::new(
                "Default Rate (Married %)",
                rate_where(&|r| r.family_status == MARRIED),
                KpiFormat::Percent,
            ),
            Kpi::new(
                "Avg Income (Defaulters)",
                defaulter_mean(|r| r.income_total),
                KpiFormat::Money,
            ),
            Kpi::new(
                "Avg Credit (Defaulters)",
                defaulter_mean(|r| r.credit_amount),
                KpiFormat::Money,
            ),
            Kpi::new(
                "Avg Annuity (Defaulters)",
                defaulter_mean(|r| r.annuity_amount),
                KpiFormat::Money,
            ),
            Kpi::new(
                "Avg Employment (Years) (Defaulters)",
                defaulter_mean(|r| r.employment_years),
                KpiFormat::Years,
            ),
        ];
        Self { tiles }
    }

    /// Tiles grouped the way the dashboard lays them out.
    pub fn rows(&self) -> Vec<&[Kpi]> {
        let mut rows = Vec::with_capacity(3);
        let mut rest = self.tiles.as_slice();
        for width in [3, 3, 4] {
            let (row, tail) = rest.split_at(width.min(rest.len()));
            rows.push(row);
            rest = tail;
        }
        rows
    }
}

/// `1234567.8` → `"1,234,568"` for zero decimals.
pub fn format_thousands(value: f64, decimals: usize) -> String {
    let text = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }

    let is_zero = text.chars().all(|c| c == '0' || c == '.');
    if value.is_sign_negative() && !is_zero {
        grouped.insert(0, '-');
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{FilterCriteria, apply_global_filters};
    use crate::data::model::NumericAttribute;
    use crate::data::model::tests::applicant;

    fn dataset() -> CreditDataset {
        let mut records = vec![
            applicant(1, 0, "M", 100_000.0),
            applicant(2, 1, "F", 200_000.0),
            applicant(3, 0, "M", 300_000.0),
            applicant(4, 1, "F", 400_000.0),
        ];
        records[1].education_type = SECONDARY_EDUCATION.to_string();
        records[3].family_status = "Widow".to_string();
        CreditDataset::from_records(records)
    }

    fn tile<'a>(kpis: &'a Kpis, label: &str) -> &'a Kpi {
        kpis.tiles.iter().find(|k| k.label == label).unwrap()
    }

    #[test]
    fn tiles_follow_the_dataset() {
        let kpis = Kpis::compute(&dataset());
        assert_eq!(kpis.tiles.len(), 10);
        assert_eq!(tile(&kpis, "Total Defaults").display(), "2");
        assert_eq!(tile(&kpis, "Default Rate (%)").display(), "50.00");
        assert_eq!(tile(&kpis, "Default Rate (Male %)").display(), "0.00");
        assert_eq!(tile(&kpis, "Default Rate (Female %)").display(), "100.00");
        assert_eq!(tile(&kpis, "Default Rate (Secondary Ed %)").display(), "100.00");
        // applicants 1..3 are married, one of them defaulted
        assert_eq!(tile(&kpis, "Default Rate (Married %)").display(), "33.33");
        assert_eq!(tile(&kpis, "Avg Income (Defaulters)").display(), "300,000");
        assert_eq!(tile(&kpis, "Avg Employment (Years) (Defaulters)").display(), "3.0");
    }

    #[test]
    fn empty_filter_result_shows_no_data() {
        let ds = dataset();
        let criteria = FilterCriteria::default().with_range(NumericAttribute::IncomeTotal, 0.0, 0.0);
        let empty = apply_global_filters(&ds, &criteria);
        let kpis = Kpis::compute(&empty);

        assert_eq!(tile(&kpis, "Total Defaults").display(), "0");
        assert_eq!(tile(&kpis, "Default Rate (%)").value, None);
        assert_eq!(tile(&kpis, "Default Rate (%)").display(), NO_DATA);
        assert_eq!(tile(&kpis, "Avg Credit (Defaulters)").display(), NO_DATA);
    }

    #[test]
    fn rows_are_three_three_four() {
        let kpis = Kpis::compute(&dataset());
        let widths: Vec<usize> = kpis.rows().iter().map(|r| r.len()).collect();
        assert_eq!(widths, vec![3, 3, 4]);
    }

    #[test]
    fn thousands_separators() {
        assert_eq!(format_thousands(0.0, 0), "0");
        assert_eq!(format_thousands(999.0, 0), "999");
        assert_eq!(format_thousands(1_000.0, 0), "1,000");
        assert_eq!(format_thousands(1_234_567.8, 0), "1,234,568");
        assert_eq!(format_thousands(-12_345.678, 2), "-12,345.68");
        assert_eq!(format_thousands(-0.001, 0), "0");
    }
}
