use std::collections::BTreeMap;

use crate::data::aggregate::{self, Accumulator, Sum};
use crate::data::model::{CategoricalAttribute, CreditDataset};

/// One row of the segment table: a category value with its default rate.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentRow {
    pub attribute: CategoricalAttribute,
    pub value: String,
    pub applicants: usize,
    pub defaults: usize,
    pub default_rate: Option<f64>,
}

/// Every category of every categorical attribute, riskiest first within
/// each attribute.
pub fn segment_table(dataset: &CreditDataset) -> Vec<SegmentRow> {
    let mut rows = Vec::new();
    for attr in CategoricalAttribute::ALL {
        let defaults: BTreeMap<String, Sum> = aggregate::group_by(
            &dataset.records,
            |r| attr.value(r).to_string(),
            |r| r.target as f64,
        );
        let counts = aggregate::group_count(&dataset.records, |r| attr.value(r).to_string());

        let mut segment: Vec<SegmentRow> = counts
            .into_iter()
            .map(|(value, applicants)| {
                let defaults = defaults
                    .get(&value)
                    .and_then(|acc| acc.finish())
                    .unwrap_or(0.0) as usize;
                SegmentRow {
                    attribute: attr,
                    default_rate: (applicants > 0).then(|| defaults as f64 / applicants as f64),
                    value,
                    applicants,
                    defaults,
                }
            })
            .collect();
        segment.sort_by(|a, b| {
            b.default_rate
                .unwrap_or(0.0)
                .total_cmp(&a.default_rate.unwrap_or(0.0))
                .then_with(|| a.value.cmp(&b.value))
        });
        rows.extend(segment);
    }
    rows
}
