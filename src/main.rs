use anyhow::{Context, Result};
use listing_etl::{run_configured, ListingMarkers, RunOptions, ScrapeConfig, StoreConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,listing_etl=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let store = StoreConfig::from_env().context("Failed to load store configuration")?;
    let pages = ScrapeConfig::from_env().context("Failed to load scrape configuration")?;
    let options = RunOptions {
        markers: ListingMarkers::from_env().context("Failed to load listing markers")?,
        ..RunOptions::default()
    };
    tracing::info!(?store, ?pages, "configuration loaded");

    let summary = run_configured(&store, &pages, &options);

    println!(
        "{}",
        serde_json::to_string_pretty(&summary.to_mapping()).context("Failed to encode summary")?
    );

    if !summary.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
