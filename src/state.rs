use std::path::Path;

use crate::config::DashboardConfig;
use crate::data::error::DataError;
use crate::data::filter::{FilterBuilder, FilterCriteria, GlobalFilters, apply_global_filters};
use crate::data::loader::{LoadReport, LoadedData, load_and_clean_data};
use crate::data::model::CreditDataset;
use crate::report::DashboardReport;
use crate::report::charts::ChartSettings;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded dataset (None until a load succeeds).
    pub dataset: Option<CreditDataset>,

    /// Summary of the last successful load.
    pub load_report: Option<LoadReport>,

    /// Filter panel draft, rebuilt for every dataset.
    pub filters: Option<FilterBuilder>,

    /// Criteria behind `working`, None while the full dataset is shown.
    pub applied: Option<FilterCriteria>,

    /// Filtered copy of `dataset`; None means "same as dataset".
    pub working: Option<CreditDataset>,

    /// Everything the central panel draws (cached).
    pub report: Option<DashboardReport>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            dataset: None,
            load_report: None,
            filters: None,
            applied: None,
            working: None,
            report: None,
            status_message: None,
        }
    }

    /// Load the dataset named by the configuration.
    pub fn load_configured(&mut self) {
        let config = self.config.clone();
        self.load(&config);
    }

    /// Load a different file with the same derivation settings.
    pub fn load_path(&mut self, path: &Path) {
        let config = DashboardConfig {
            data_path: path.to_path_buf(),
            ..self.config.clone()
        };
        self.load(&config);
    }

    fn load(&mut self, config: &DashboardConfig) {
        match load_and_clean_data(config) {
            Ok(loaded) => {
                self.config.data_path = config.data_path.clone();
                self.set_dataset(loaded);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", config.data_path.display());
                self.fail(&e);
            }
        }
    }

    /// Ingest a newly loaded dataset, initialise filters and the report.
    /// Configured presets are applied straight away.
    pub fn set_dataset(&mut self, loaded: LoadedData) {
        let LoadedData { dataset, report } = loaded;
        let builder = match FilterBuilder::with_presets(&dataset, &self.config.preset_filters) {
            Ok(builder) => builder,
            Err(e) => {
                log::error!("Invalid preset filters: {e}");
                self.fail(&e);
                return;
            }
        };

        let presets = (!self.config.preset_filters.is_empty()).then(|| builder.draft().clone());
        self.dataset = Some(dataset);
        self.load_report = Some(report);
        self.filters = Some(builder);
        self.status_message = None;

        match presets {
            Some(criteria) => self.apply(criteria),
            None => self.show_all(),
        }
    }

    /// React to one filter-panel interaction.
    pub fn handle_filters(&mut self, filters: GlobalFilters) {
        if filters.apply {
            self.apply(filters.criteria);
        } else if filters.reset {
            self.show_all();
        }
    }

    /// The dataset the dashboard currently describes.
    pub fn working_dataset(&self) -> Option<&CreditDataset> {
        self.working.as_ref().or(self.dataset.as_ref())
    }

    fn apply(&mut self, criteria: FilterCriteria) {
        let Some(dataset) = &self.dataset else {
            return;
        };
        let filtered = apply_global_filters(dataset, &criteria);
        log::info!("Showing {} of {} applicants", filtered.len(), dataset.len());
        if filtered.is_empty() {
            self.status_message = Some("No applicants match the current filters".to_string());
        } else {
            self.status_message = None;
        }
        self.working = Some(filtered);
        self.applied = Some(criteria);
        self.rebuild_report();
    }

    fn show_all(&mut self) {
        self.working = None;
        self.applied = None;
        self.status_message = None;
        self.rebuild_report();
    }

    fn rebuild_report(&mut self) {
        let settings = ChartSettings::from(&self.config);
        self.report = self
            .working_dataset()
            .map(|ds| DashboardReport::compute(ds, &settings));
    }

    /// Drop everything shown; a failed load never leaves a partial page.
    fn fail(&mut self, error: &DataError) {
        self.clear();
        let kind = if error.is_load_failure() {
            "Error"
        } else {
            "Configuration error"
        };
        self.status_message = Some(format!("{kind}: {error}"));
    }

    fn clear(&mut self) {
        self.dataset = None;
        self.load_report = None;
        self.filters = None;
        self.applied = None;
        self.working = None;
        self.report = None;
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::config::PresetFilter;
    use crate::data::filter::FilterAction;
    use crate::data::model::CategoricalAttribute;

    fn fixture_config() -> DashboardConfig {
        DashboardConfig {
            data_path: Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/applicants_small.csv"),
            ..Default::default()
        }
    }

    #[test]
    fn load_builds_report_over_full_dataset() {
        let mut state = AppState::new(fixture_config());
        state.load_configured();
        assert!(state.status_message.is_none());
        assert_eq!(state.working_dataset().map(|d| d.len()), Some(13));
        assert_eq!(state.report.as_ref().map(|r| r.applicants), Some(13));
        assert!(state.applied.is_none());
    }

    #[test]
    fn apply_then_reset() {
        let mut state = AppState::new(fixture_config());
        state.load_configured();

        let builder = state.filters.as_mut().unwrap();
        builder
            .draft_mut()
            .categories
            .insert(CategoricalAttribute::Gender, ["M".to_string()].into());
        let pending = builder.submit(FilterAction::None);
        state.handle_filters(pending);
        // nothing applied until asked
        assert_eq!(state.working_dataset().unwrap().len(), 13);

        let applied = state.filters.as_mut().unwrap().submit(FilterAction::Apply);
        state.handle_filters(applied);
        let working = state.working_dataset().unwrap();
        assert_eq!(working.len(), 7);
        assert!(working.records.iter().all(|r| r.gender == "M"));
        assert_eq!(state.report.as_ref().unwrap().applicants, 7);
        // the loaded dataset is untouched
        assert_eq!(state.dataset.as_ref().unwrap().len(), 13);

        let reset = state.filters.as_mut().unwrap().submit(FilterAction::Reset);
        state.handle_filters(reset);
        assert!(state.applied.is_none());
        assert_eq!(state.working_dataset().unwrap().len(), 13);
    }

    #[test]
    fn missing_file_blocks_the_dashboard() {
        let mut state = AppState::new(fixture_config());
        state.load_configured();
        state.load_path(&PathBuf::from("missing/applications.csv"));
        assert!(state.dataset.is_none());
        assert!(state.report.is_none());
        assert!(state.status_message.as_deref().unwrap().starts_with("Error"));
    }

    #[test]
    fn presets_apply_on_load() {
        let mut config = fixture_config();
        config.preset_filters = vec![PresetFilter::Categories {
            attribute: "NAME_CONTRACT_TYPE".into(),
            values: vec!["Revolving loans".into()],
        }];
        let mut state = AppState::new(config);
        state.load_configured();
        assert_eq!(state.working_dataset().unwrap().len(), 2);
        assert!(state.applied.is_some());
    }

    #[test]
    fn preset_range_outside_the_data_shows_nobody() {
        let mut config = fixture_config();
        config.preset_filters = vec![PresetFilter::Range {
            attribute: "AMT_INCOME_TOTAL".into(),
            min: 0.0,
            max: 0.0,
        }];
        let mut state = AppState::new(config);
        state.load_configured();
        assert_eq!(state.dataset.as_ref().unwrap().len(), 13);
        assert!(state.working_dataset().unwrap().is_empty());
        assert_eq!(state.report.as_ref().unwrap().applicants, 0);
    }

    #[test]
    fn unknown_preset_attribute_is_a_configuration_error() {
        let mut config = fixture_config();
        config.preset_filters = vec![PresetFilter::Range {
            attribute: "DAYS_REGISTRATION".into(),
            min: 0.0,
            max: 1.0,
        }];
        let mut state = AppState::new(config);
        state.load_configured();
        assert!(state.dataset.is_none());
        assert!(
            state
                .status_message
                .as_deref()
                .unwrap()
                .starts_with("Configuration error")
        );
    }

    #[test]
    fn empty_filter_result_is_reported_not_fatal() {
        let mut state = AppState::new(fixture_config());
        state.load_configured();
        let builder = state.filters.as_mut().unwrap();
        builder
            .draft_mut()
            .categories
            .insert(CategoricalAttribute::HousingType, Default::default());
        let applied = builder.submit(FilterAction::Apply);
        state.handle_filters(applied);

        assert!(state.working_dataset().unwrap().is_empty());
        let report = state.report.as_ref().unwrap();
        assert_eq!(report.applicants, 0);
        assert!(state.status_message.is_some());
    }
}
