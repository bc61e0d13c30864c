use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use voicemood::{
    create_router, AppState, CaptureBackendFactory, CaptureSource, Classifier, Config,
    HttpClassifier, RecordingPipeline,
};

#[derive(Debug, Parser)]
#[command(
    name = "voicemood",
    about = "Live voice emotion analysis pipeline (captures from a synthetic \
             source by default; pass --microphone once a device backend is linked)"
)]
struct Cli {
    /// Path to the configuration file (without extension)
    #[arg(long, default_value = "config/voicemood")]
    config: String,

    /// Capture from the platform microphone instead of the synthetic source
    #[arg(long)]
    microphone: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let cfg = match Config::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("Could not load config from {}: {} (using defaults)", cli.config, e);
            Config::default()
        }
    };

    info!("voicemood v0.1.0 ({})", cfg.service.name);
    info!("Classifier service: {}", cfg.classifier.base_url);

    let classifier: Arc<dyn Classifier> = Arc::new(
        HttpClassifier::new(&cfg.classifier).context("Failed to build classifier client")?,
    );

    // Probe the classifier before anything can record; an unconfigured
    // service leaves the pipeline in a persistent error state.
    let ready = match classifier.check_status().await {
        Ok(status) => status.configured,
        Err(e) => {
            warn!("Classifier status probe failed: {}", e);
            false
        }
    };

    let source = if cli.microphone {
        CaptureSource::Microphone
    } else {
        CaptureSource::Synthetic
    };
    let backend = CaptureBackendFactory::create(source)
        .context("Failed to create audio capture backend")?;

    let pipeline = Arc::new(RecordingPipeline::new(cfg.clone(), classifier, backend));
    pipeline.set_service_ready(ready);

    let state = AppState::new(pipeline);
    let router = create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    info!("HTTP control API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, router).await?;

    Ok(())
}
