use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, Ui};

use crate::data::filter::{FilterAction, FilterBuilder, GlobalFilters};
use crate::report::kpi::format_thousands;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – global filters
// ---------------------------------------------------------------------------

/// Render the filter panel and report what the user asked for this frame.
///
/// Edits only touch the builder's draft; nothing reaches the dashboard until
/// "Apply filters" is clicked.
pub fn global_filters(ui: &mut Ui, builder: &mut FilterBuilder) -> GlobalFilters {
    ui.heading("Filters");
    ui.separator();

    let mut action = FilterAction::None;
    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Apply filters").clicked() {
            action = FilterAction::Apply;
        }
        if ui.button("Reset").clicked() {
            action = FilterAction::Reset;
        }
    });
    ui.separator();

    // Clone what we need so we can mutate the draft inside the loop.
    let options = builder.options().clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Numeric ranges ----
            for (attr, bounds) in &options.ranges {
                ui.strong(attr.label());
                let range = builder.draft_mut().ranges.entry(*attr).or_insert(*bounds);
                let min_changed = ui
                    .add(Slider::new(&mut range.min, bounds.min..=bounds.max).text("min"))
                    .changed();
                let max_changed = ui
                    .add(Slider::new(&mut range.max, bounds.min..=bounds.max).text("max"))
                    .changed();
                // A preset outside the data stays as written until edited.
                if min_changed || max_changed {
                    *range = range.clamped_to(bounds);
                }
                ui.add_space(4.0);
            }
            ui.separator();

            // ---- Category selections (collapsible) ----
            for (attr, all_values) in &options.categories {
                let n_selected = builder
                    .draft()
                    .categories
                    .get(attr)
                    .map_or(all_values.len(), |s| s.len());
                let header_text = format!("{}  ({n_selected}/{})", attr.label(), all_values.len());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(attr.key())
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        let selected = builder
                            .draft_mut()
                            .categories
                            .entry(*attr)
                            .or_insert_with(|| all_values.clone());

                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                *selected = all_values.clone();
                            }
                            if ui.small_button("None").clicked() {
                                selected.clear();
                            }
                        });

                        for val in all_values {
                            let mut checked = selected.contains(val);
                            if ui.checkbox(&mut checked, val.as_str()).changed() {
                                if checked {
                                    selected.insert(val.clone());
                                } else {
                                    selected.remove(val);
                                }
                            }
                        }
                    });
            }
        });

    builder.submit(action)
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.load_configured();
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(report)) = (&state.dataset, &state.load_report) {
            let shown = state.working_dataset().map_or(0, |w| w.len());
            ui.label(format!(
                "{} applicants loaded, {} shown",
                format_thousands(ds.len() as f64, 0),
                format_thousands(shown as f64, 0),
            ));
            ui.separator();
            ui.label(format!(
                "{} rows read, {} dropped, {} employment values normalised",
                report.rows_read, report.rows_dropped, report.employment_normalized
            ))
            .on_hover_text(report.source.display().to_string());
        }

        if state.applied.is_some() {
            ui.separator();
            ui.label(RichText::new("filters applied").italics());
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open applicant data")
        .add_filter("Supported files", &["csv", "parquet", "pq", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        log::info!("Opening {}", path.display());
        state.load_path(&path);
    }
}
