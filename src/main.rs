use anyhow::{Context, Result};
use std::sync::Arc;
use tone_canvas::backend::HttpBackend;
use tone_canvas::config::AppConfig;
use tone_canvas::ui::ToneCanvasApp;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tone_canvas=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Tone Canvas");

    let config = AppConfig::discover().context("Failed to load configuration")?;
    let backend = HttpBackend::new(&config).context("Failed to create backend client")?;
    info!("Using backend at {}", backend.base_url());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 640.0])
            .with_min_inner_size([480.0, 360.0])
            .with_title("Tone Canvas"),
        ..Default::default()
    };

    eframe::run_native(
        "Tone Canvas",
        options,
        Box::new(move |cc| Ok(Box::new(ToneCanvasApp::new(cc, &config, Arc::new(backend))))),
    )
    .map_err(|e| anyhow::anyhow!("eframe error: {}", e))?;

    Ok(())
}
