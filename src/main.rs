mod app;
mod color;
mod config;
mod data;
mod report;
mod state;
mod ui;

use anyhow::Context;
use app::CreditDashApp;
use config::DashboardConfig;
use eframe::egui;
use state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = DashboardConfig::load().context("loading dashboard configuration")?;
    log::info!("Using data source {}", config.data_path.display());

    let mut state = AppState::new(config);
    state.load_configured();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Credit Risk – Target & Risk Segmentation",
        options,
        Box::new(move |_cc| Ok(Box::new(CreditDashApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running the dashboard window: {e}"))
}
