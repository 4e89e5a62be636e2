use parking_insights::analysis::Analyzer;
use parking_insights::config;
use parking_insights::locate::{FixedLocation, resolve_reference};
use parking_insights::report::{ReportOptions, build_report};
use parking_insights::source::create_source;
use std::str::FromStr;
use time::OffsetDateTime;

fn init_tracing(level: &str) {
    let parsed = tracing::Level::from_str(level);
    let max_level = parsed.as_ref().copied().unwrap_or(tracing::Level::INFO);
    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(max_level)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
    if parsed.is_err() {
        tracing::warn!(level, "Unknown log level, defaulting to info");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_default()?;
    init_tracing(&config.logging.level);
    tracing::info!(
        app = %config.app.name,
        config_path = config::DEFAULT_CONFIG_PATH,
        "parking-insights starting"
    );

    let analyzer = Analyzer::from_config(&config)?;
    let now = match config.hour_offset()? {
        Some(offset) => OffsetDateTime::now_utc().to_offset(offset),
        None => OffsetDateTime::now_utc(),
    };

    let source = create_source(&config.data(), now)?;
    let reference = resolve_reference(&FixedLocation::from(config.reference()?));
    let options = ReportOptions {
        time_range: config.time_range(),
        currency: config.currency().to_string(),
    };

    let report = build_report(&analyzer, source.as_ref(), &reference, &options, now)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
