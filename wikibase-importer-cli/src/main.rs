mod config;

use std::path::Path;

use tracing::{error, info, warn};
use wikibase_importer::{ImportOrchestrator, ImporterConfig, SessionClient};

use crate::config::{Config, LogFormat};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Config ────────────────────────────────────────────────────────────────
    let (config, config_warning) = Config::load();

    // ── Tracing ───────────────────────────────────────────────────────────────
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("wikibase_importer=info".parse()?);
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().with_env_filter(filter).json().init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).pretty().init(),
    }
    if let Some(message) = config_warning {
        warn!("{message}");
    }

    let Some(input_path) = config.input_path else {
        error!("no input file given, usage: wikibase-import <gdm-json-file>");
        return Ok(());
    };

    // Import failures are reported in the log only; the exit status stays 0.
    if let Err(e) = import(&input_path).await {
        error!(path = %input_path.display(), error = %e, "import aborted");
    }
    Ok(())
}

async fn import(input_path: &Path) -> anyhow::Result<()> {
    let settings = ImporterConfig::from_env().map_err(|e| {
        error!("Configuration error: {}", e);
        e
    })?;
    info!(endpoint = %settings.api_endpoint, language = %settings.language, "configuration loaded");

    let client = SessionClient::connect(&settings).await?;
    let orchestrator = ImportOrchestrator::new(client).with_language(settings.language.clone());

    let summary = orchestrator.import_file(input_path).await?;
    info!(
        path = %input_path.display(),
        resources = summary.resources,
        claims = summary.claims,
        skipped = summary.skipped_statements,
        "import complete"
    );
    Ok(())
}
