use skiresort_scraper::{run_scrapper, Config, HttpFetcher, RunOutcome};
use tracing::{info, warn};
use tracing_error::ErrorLayer;
use tracing_subscriber::prelude::*;

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Cannot listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Cannot listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    warn!("Script interrupted, saving data");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| {
                "info,html5ever=error,selectors=error,hyper=warn,reqwest=info".into()
            }),
        )
        .with(ErrorLayer::default())
        .init();

    let config = Config::from_env()?;
    let fetcher = HttpFetcher::new(config.request_delay)?;

    info!(
        "Starting the ski resort data scraping process from {}",
        config.start_url
    );
    let summary = run_scrapper(&config, &fetcher, shutdown_signal()).await?;

    match summary.outcome {
        RunOutcome::Completed => info!(
            "Done. {} resorts saved to {} ({} skipped)",
            summary.records,
            summary.output_path.display(),
            summary.skipped
        ),
        RunOutcome::Interrupted => info!(
            "Exiting. {} resorts saved to {}",
            summary.records,
            summary.output_path.display()
        ),
    }

    Ok(())
}
