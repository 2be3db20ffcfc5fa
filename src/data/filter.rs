use std::collections::{BTreeMap, BTreeSet};

use crate::config::PresetFilter;

use super::error::{DataError, Result};
use super::model::{Attribute, CategoricalAttribute, CreditDataset, NumericAttribute, NumericRange};

// ---------------------------------------------------------------------------
// Filter criteria: what the user selected
// ---------------------------------------------------------------------------

/// Per-attribute constraints. An attribute without an entry is not
/// constrained; an empty category set admits nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub ranges: BTreeMap<NumericAttribute, NumericRange>,
    pub categories: BTreeMap<CategoricalAttribute, BTreeSet<String>>,
}

// ---------------------------------------------------------------------------
// Filter options: what the dataset offers
// ---------------------------------------------------------------------------

/// Live bounds and vocabularies of a dataset, the domain of every widget.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    pub ranges: BTreeMap<NumericAttribute, NumericRange>,
    pub categories: BTreeMap<CategoricalAttribute, BTreeSet<String>>,
}

impl FilterOptions {
    pub fn from_dataset(dataset: &CreditDataset) -> Self {
        Self {
            ranges: dataset.bounds.clone(),
            categories: dataset.categories.clone(),
        }
    }

    /// Full ranges and every category selected.
    pub fn default_criteria(&self) -> FilterCriteria {
        FilterCriteria {
            ranges: self.ranges.clone(),
            categories: self.categories.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Filter builder: draft selection plus the apply / reset actions
// ---------------------------------------------------------------------------

/// What the user asked for in the current interaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterAction {
    #[default]
    None,
    Apply,
    Reset,
}

/// Output of one filter-panel interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalFilters {
    pub criteria: FilterCriteria,
    pub apply: bool,
    pub reset: bool,
}

/// Holds the selection being edited, separate from whatever is applied.
#[derive(Debug, Clone)]
pub struct FilterBuilder {
    options: FilterOptions,
    draft: FilterCriteria,
}

impl FilterBuilder {
    pub fn new(dataset: &CreditDataset) -> Self {
        let options = FilterOptions::from_dataset(dataset);
        let draft = options.default_criteria();
        Self { options, draft }
    }

    /// Seed the draft from configured presets. Presets may only name
    /// attributes of the schema. Ranges are narrowed to the live bounds; a
    /// range lying wholly outside them is kept as written and admits nothing.
    pub fn with_presets(dataset: &CreditDataset, presets: &[PresetFilter]) -> Result<Self> {
        let mut builder = Self::new(dataset);
        for preset in presets {
            match preset {
                PresetFilter::Range {
                    attribute,
                    min,
                    max,
                } => {
                    let Attribute::Numeric(attr) = attribute.parse::<Attribute>()? else {
                        return Err(DataError::FilterKind {
                            attribute: attribute.clone(),
                            expected: "numeric",
                        });
                    };
                    if let Some(bounds) = builder.options.ranges.get(&attr) {
                        let preset = NumericRange::new(*min, *max);
                        let range = preset.intersection(bounds).unwrap_or_else(|| {
                            log::warn!(
                                "Preset range [{min}, {max}] for {attribute} lies outside the data [{}, {}]",
                                bounds.min,
                                bounds.max
                            );
                            preset
                        });
                        builder.draft.ranges.insert(attr, range);
                    }
                }
                PresetFilter::Categories { attribute, values } => {
                    let Attribute::Categorical(attr) = attribute.parse::<Attribute>()? else {
                        return Err(DataError::FilterKind {
                            attribute: attribute.clone(),
                            expected: "categorical",
                        });
                    };
                    let selected: BTreeSet<String> = values.iter().cloned().collect();
                    if let Some(known) = builder.options.categories.get(&attr) {
                        for unknown in selected.difference(known) {
                            log::warn!("Preset value {unknown:?} does not occur in {attribute}");
                        }
                    }
                    builder.draft.categories.insert(attr, selected);
                }
            }
        }
        Ok(builder)
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    pub fn draft(&self) -> &FilterCriteria {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut FilterCriteria {
        &mut self.draft
    }

    /// Close one interaction. The draft is returned whatever the action;
    /// a reset first restores it to the defaults.
    pub fn submit(&mut self, action: FilterAction) -> GlobalFilters {
        if action == FilterAction::Reset {
            self.draft = self.options.default_criteria();
        }
        GlobalFilters {
            criteria: self.draft.clone(),
            apply: action == FilterAction::Apply,
            reset: action == FilterAction::Reset,
        }
    }
}

// ---------------------------------------------------------------------------
// Filter applicator
// ---------------------------------------------------------------------------

/// Return the applicants that satisfy every constraint in `criteria`.
///
/// A constraint spanning the dataset's full range or vocabulary is skipped.
/// The input is left untouched and source order is kept.
pub fn apply_global_filters(dataset: &CreditDataset, criteria: &FilterCriteria) -> CreditDataset {
    let ranges: Vec<(NumericAttribute, &NumericRange)> = criteria
        .ranges
        .iter()
        .filter(|(attr, range)| {
            dataset
                .bounds
                .get(*attr)
                .map_or(true, |bounds| !range.covers(bounds))
        })
        .map(|(attr, range)| (*attr, range))
        .collect();

    let categories: Vec<(CategoricalAttribute, &BTreeSet<String>)> = criteria
        .categories
        .iter()
        .filter(|(attr, selected)| {
            dataset
                .categories
                .get(*attr)
                .map_or(true, |all| !all.is_subset(selected))
        })
        .map(|(attr, selected)| (*attr, selected))
        .collect();

    if ranges.is_empty() && categories.is_empty() {
        return dataset.clone();
    }

    let records: Vec<_> = dataset
        .records
        .iter()
        .filter(|r| {
            ranges.iter().all(|(attr, range)| range.contains(attr.value(r)))
                && categories
                    .iter()
                    .all(|(attr, selected)| selected.contains(attr.value(r)))
        })
        .cloned()
        .collect();

    log::debug!(
        "Filters kept {} of {} applicants ({} range, {} category constraints)",
        records.len(),
        dataset.len(),
        ranges.len(),
        categories.len()
    );

    CreditDataset::from_records(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::applicant;

    impl FilterCriteria {
        pub fn with_range(mut self, attr: NumericAttribute, min: f64, max: f64) -> Self {
            self.ranges.insert(attr, NumericRange::new(min, max));
            self
        }

        pub fn with_categories<I, S>(mut self, attr: CategoricalAttribute, values: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            self.categories
                .insert(attr, values.into_iter().map(Into::into).collect());
            self
        }
    }

    fn dataset() -> CreditDataset {
        let mut records = vec![
            applicant(1, 0, "M", 100.0),
            applicant(2, 1, "F", 200.0),
            applicant(3, 0, "M", 300.0),
            applicant(4, 1, "F", 400.0),
            applicant(5, 0, "XNA", 500.0),
        ];
        records[3].housing_type = "Rented apartment".to_string();
        CreditDataset::from_records(records)
    }

    fn ids(ds: &CreditDataset) -> Vec<i64> {
        ds.records.iter().map(|r| r.id).collect()
    }

    #[test]
    fn default_criteria_is_identity() {
        let ds = dataset();
        let criteria = FilterOptions::from_dataset(&ds).default_criteria();
        assert_eq!(apply_global_filters(&ds, &criteria), ds);
        assert_eq!(apply_global_filters(&ds, &FilterCriteria::default()), ds);
    }

    #[test]
    fn constraints_combine_with_and() {
        let ds = dataset();
        let criteria = FilterCriteria::default()
            .with_range(NumericAttribute::IncomeTotal, 150.0, 450.0)
            .with_categories(CategoricalAttribute::Gender, ["F"]);
        let out = apply_global_filters(&ds, &criteria);
        assert_eq!(ids(&out), vec![2, 4]);

        let criteria = criteria.with_categories(CategoricalAttribute::HousingType, ["Rented apartment"]);
        assert_eq!(ids(&apply_global_filters(&ds, &criteria)), vec![4]);
    }

    #[test]
    fn ranges_are_inclusive() {
        let ds = dataset();
        let criteria = FilterCriteria::default().with_range(NumericAttribute::IncomeTotal, 200.0, 300.0);
        assert_eq!(ids(&apply_global_filters(&ds, &criteria)), vec![2, 3]);
    }

    #[test]
    fn result_is_an_ordered_subset_without_duplicates() {
        let ds = dataset();
        let criteria = FilterCriteria::default()
            .with_range(NumericAttribute::AgeYears, 32.0, 40.0)
            .with_categories(CategoricalAttribute::Gender, ["M", "XNA"]);
        let out = apply_global_filters(&ds, &criteria);
        let out_ids = ids(&out);
        assert_eq!(out_ids, vec![3, 5]);
        for r in &out.records {
            assert!(ds.records.contains(r));
        }
        let unique: BTreeSet<_> = out_ids.iter().collect();
        assert_eq!(unique.len(), out_ids.len());
    }

    #[test]
    fn filtering_is_idempotent() {
        let ds = dataset();
        let criteria = FilterCriteria::default()
            .with_range(NumericAttribute::EmploymentYears, 2.0, 5.0)
            .with_categories(CategoricalAttribute::Gender, ["F"]);
        let once = apply_global_filters(&ds, &criteria);
        let twice = apply_global_filters(&once, &criteria);
        assert_eq!(once, twice);
    }

    #[test]
    fn narrowing_never_grows_the_result() {
        let ds = dataset();
        let mut previous = ds.len();
        for max in [500.0, 400.0, 250.0, 100.0, 50.0] {
            let criteria = FilterCriteria::default().with_range(NumericAttribute::IncomeTotal, 0.0, max);
            let n = apply_global_filters(&ds, &criteria).len();
            assert!(n <= previous, "max {max}: {n} > {previous}");
            previous = n;
        }

        let wide = FilterCriteria::default().with_categories(CategoricalAttribute::Gender, ["M", "F"]);
        let narrow = FilterCriteria::default().with_categories(CategoricalAttribute::Gender, ["M"]);
        assert!(apply_global_filters(&ds, &narrow).len() <= apply_global_filters(&ds, &wide).len());
    }

    #[test]
    fn empty_category_selection_admits_nothing() {
        let ds = dataset();
        let criteria = FilterCriteria::default()
            .with_categories(CategoricalAttribute::ContractType, Vec::<String>::new());
        assert!(apply_global_filters(&ds, &criteria).is_empty());
    }

    #[test]
    fn zero_income_range_yields_an_empty_dataset() {
        let ds = dataset();
        let criteria = FilterCriteria::default().with_range(NumericAttribute::IncomeTotal, 0.0, 0.0);
        let out = apply_global_filters(&ds, &criteria);
        assert!(out.is_empty());
        assert!(out.bounds.is_empty());
        // input untouched
        assert_eq!(ds.len(), 5);
    }

    #[test]
    fn submit_reports_the_requested_action() {
        let ds = dataset();
        let mut builder = FilterBuilder::new(&ds);
        builder
            .draft_mut()
            .categories
            .insert(CategoricalAttribute::Gender, BTreeSet::from(["F".to_string()]));

        let idle = builder.submit(FilterAction::None);
        assert!(!idle.apply && !idle.reset);
        assert_eq!(&idle.criteria, builder.draft());

        let applied = builder.submit(FilterAction::Apply);
        assert!(applied.apply && !applied.reset);
        assert_eq!(ids(&apply_global_filters(&ds, &applied.criteria)), vec![2, 4]);

        let reset = builder.submit(FilterAction::Reset);
        assert!(reset.reset && !reset.apply);
        assert_eq!(reset.criteria, builder.options().default_criteria());
        assert_eq!(apply_global_filters(&ds, &reset.criteria), ds);
    }

    #[test]
    fn presets_seed_the_draft() {
        let ds = dataset();
        let presets = vec![
            PresetFilter::Range {
                attribute: "AMT_INCOME_TOTAL".into(),
                min: -1_000.0,
                max: 250.0,
            },
            PresetFilter::Categories {
                attribute: "gender".into(),
                values: vec!["M".into()],
            },
        ];
        let builder = FilterBuilder::with_presets(&ds, &presets).unwrap();
        assert_eq!(
            builder.draft().ranges[&NumericAttribute::IncomeTotal],
            NumericRange::new(100.0, 250.0)
        );
        assert_eq!(ids(&apply_global_filters(&ds, builder.draft())), vec![1]);
    }

    #[test]
    fn presets_outside_the_data_admit_nothing() {
        let ds = dataset();
        let presets = vec![PresetFilter::Range {
            attribute: "income_total".into(),
            min: 0.0,
            max: 0.0,
        }];
        let builder = FilterBuilder::with_presets(&ds, &presets).unwrap();
        assert_eq!(
            builder.draft().ranges[&NumericAttribute::IncomeTotal],
            NumericRange::new(0.0, 0.0)
        );
        assert!(apply_global_filters(&ds, builder.draft()).is_empty());
    }

    #[test]
    fn presets_with_unknown_attributes_are_rejected() {
        let ds = dataset();
        let presets = vec![PresetFilter::Categories {
            attribute: "FLAG_OWN_CAR".into(),
            values: vec!["Y".into()],
        }];
        let err = FilterBuilder::with_presets(&ds, &presets).unwrap_err();
        assert!(matches!(err, DataError::UnknownAttribute(_)));
        assert!(!err.is_load_failure());

        let presets = vec![PresetFilter::Range {
            attribute: "gender".into(),
            min: 0.0,
            max: 1.0,
        }];
        let err = FilterBuilder::with_presets(&ds, &presets).unwrap_err();
        assert!(matches!(err, DataError::FilterKind { expected: "numeric", .. }));
    }
}
