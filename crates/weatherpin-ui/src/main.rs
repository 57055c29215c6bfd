use anyhow::Result;

mod app;
mod dialogs;
mod error_mapping;
mod map;

use app::WeatherPinApp;

fn main() -> Result<()> {
    weatherpin_core::init()?;

    let (config, _validation) = weatherpin_core::Config::load_validated()?;
    tracing::info!("Config directory: {}", config.config_dir.display());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let handle = runtime.handle().clone();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("WeatherPin")
            .with_inner_size([
                config.ui.window_width as f32,
                config.ui.window_height as f32,
            ]),
        ..Default::default()
    };

    eframe::run_native(
        "WeatherPin",
        native_options,
        Box::new(move |cc| Ok(Box::new(WeatherPinApp::new(cc, config, handle)))),
    )
    .map_err(|e| anyhow::anyhow!("failed to run UI: {e}"))?;

    // Give in-flight tasks a moment, then drop the runtime.
    runtime.shutdown_timeout(std::time::Duration::from_secs(2));
    Ok(())
}
