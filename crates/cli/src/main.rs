use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use orgteardown_core::{
    load_config, validate_config, AwsOrganizationClient, ConsoleReporter, OrganizationClient,
    Reporter, SuspensionOutcome, TeardownOrchestrator, CONFIG_PATH_ENV,
};

#[tokio::main]
async fn main() {
    // Stays colored until the configuration says otherwise.
    let mut color = true;
    if let Err(e) = run(&mut color).await {
        ConsoleReporter::new(color).error(&fatal_message(&e));
        std::process::exit(1);
    }
}

fn fatal_message(error: &anyhow::Error) -> String {
    format!("{:#}", error)
}

async fn run(color: &mut bool) -> Result<()> {
    // Diagnostics go to stderr; operator status lines go to stdout.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
    let config = load_config(config_path.as_deref()).context("Failed to load configuration")?;
    *color = config.output.color;
    validate_config(&config).context("Configuration validation failed")?;

    info!(
        retry_mode = ?config.aws.retry_mode,
        max_attempts = config.aws.max_attempts,
        dry_run = config.teardown.dry_run,
        "Configuration loaded"
    );

    let reporter: Arc<dyn Reporter> = Arc::new(ConsoleReporter::new(config.output.color));
    let client: Arc<dyn OrganizationClient> =
        Arc::new(AwsOrganizationClient::from_config(&config.aws).await);

    let orchestrator = TeardownOrchestrator::new(config.teardown.clone(), client, reporter);
    let report = orchestrator
        .run()
        .await
        .context("Organization teardown aborted")?;

    if let SuspensionOutcome::TimedOut { pending, .. } = &report.suspension {
        info!(pending = pending.len(), "Finished with accounts still pending suspension");
    }

    Ok(())
}
