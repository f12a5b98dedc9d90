use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use resume_builder::backends::{renderer_for, BackendKind};
use resume_builder::completeness::SectionStatus;
use resume_builder::config::Config;
use resume_builder::models::ResumeRecord;
use resume_builder::state::Session;
use resume_builder::store::{FileStore, ResumeStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume builder v{}", env!("CARGO_PKG_VERSION"));

    let store: Arc<dyn ResumeStore> = Arc::new(FileStore::new(&config.store_dir));
    info!("Record store at {}", config.store_dir.display());

    let renderer = renderer_for(config.backend, &config.renderer_settings());
    info!("Export backend: {}", config.backend);

    let mut session = Session::load(
        store,
        renderer,
        config.compose_options(),
        config.save_debounce,
    )
    .await;

    // Optional import: `resume-builder record.json` replaces the stored record
    if let Some(path) = std::env::args().nth(1) {
        let raw = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read '{path}'"))?;
        let record: ResumeRecord =
            serde_json::from_str(&raw).with_context(|| format!("'{path}' is not a resume record"))?;
        session.replace(record).await?;
        info!("Imported record from {path}");
    }

    let report = session.completion();
    for section in &report.sections {
        match section.status {
            SectionStatus::Complete => info!("{}: complete ({} entries)", section.section, section.entry_count),
            status => warn!("{}: {:?} ({} entries)", section.section, status, section.entry_count),
        }
    }
    info!("{}/{} sections complete", report.completed, report.sections.len());

    let artifact = session.export().await?;
    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.output_dir.display()))?;
    let target = config.output_dir.join(&artifact.filename);
    tokio::fs::write(&target, &artifact.bytes).await?;
    info!("Wrote {} ({} bytes)", target.display(), artifact.bytes.len());

    if config.backend == BackendKind::ScreenSnapshot {
        let html = target.with_extension("html");
        tokio::fs::write(&html, session.preview().to_html()).await?;
        info!("Wrote preview {}", html.display());
    }

    session.close().await?;
    Ok(())
}
