use eframe::egui::{self, RichText, Ui};

use crate::state::AppState;
use crate::ui::{dashboard, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CreditDashApp {
    pub state: AppState,
}

impl CreditDashApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for CreditDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        if let Some(builder) = self.state.filters.as_mut() {
            let filters = egui::SidePanel::left("filter_panel")
                .default_width(260.0)
                .resizable(true)
                .show(ctx, |ui| panels::global_filters(ui, builder))
                .inner;
            self.state.handle_filters(filters);
        }

        // ---- Central panel: dashboard ----
        egui::CentralPanel::default().show(ctx, |ui| match &self.state.report {
            Some(report) => dashboard::dashboard(ui, report),
            None => no_dashboard(ui, self.state.status_message.as_deref()),
        });
    }
}

/// Shown instead of the page when nothing could be loaded.
fn no_dashboard(ui: &mut Ui, error: Option<&str>) {
    ui.centered_and_justified(|ui: &mut Ui| match error {
        Some(msg) => {
            ui.label(RichText::new(msg).heading().color(egui::Color32::RED));
        }
        None => {
            ui.heading("Open an applicant file to begin  (File → Open…)");
        }
    });
}
