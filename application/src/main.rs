use std::{io, path::Path, sync::OnceLock};

use application::{
    args::Command, output, output::UnitEstimate, Args, Config, Output,
    Service,
};
use service::{
    command::{CreateScenario, EstimateRent, RefreshMarketReport},
    domain::scenario,
    infra::{Memory, Tables},
    Command as _,
};
use tracing as log;
use tracing_subscriber::{
    filter::filter_fn,
    layer::{Layer as _, SubscriberExt as _},
    util::SubscriberInitExt as _,
};

const STDERR_LEVELS: &[log::Level] = &[log::Level::WARN, log::Level::ERROR];

static LOG_LEVEL: OnceLock<log::Level> = OnceLock::new();

#[tokio::main]
async fn main() {
    // Standard output is reserved for the results, so both layers write to
    // the standard error.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_thread_names(true)
                .with_writer(io::stderr)
                .with_filter(filter_fn(|meta| {
                    meta.is_span()
                        || (!STDERR_LEVELS.contains(meta.level()))
                            && LOG_LEVEL
                                .get()
                                .copied()
                                .unwrap_or(log::Level::INFO)
                                >= *meta.level()
                })),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_thread_names(true)
                .with_writer(io::stderr)
                .with_filter(filter_fn(|meta| {
                    meta.is_span()
                        || (STDERR_LEVELS.contains(meta.level()))
                            && LOG_LEVEL
                                .get()
                                .copied()
                                .unwrap_or(log::Level::INFO)
                                >= *meta.level()
                })),
        )
        .init();

    if start().await.is_err() {
        std::process::exit(1);
    }
}

async fn start() -> Result<(), ()> {
    let Args { config, command } = Args::parse().unwrap_or_else(|e| e.exit());

    let Config { service, log } = Config::new(config).map_err(|e| {
        log::error!("failed to load `Config`: {e}");
    })?;

    LOG_LEVEL
        .set(log.level.into())
        .unwrap_or_else(|_| unreachable!("first initialization"));

    let tables = Tables::from(&service);
    let service = Service::new(service.into(), Memory::default(), tables);

    match command {
        Command::Analyze {
            input,
            name,
            refresh_market,
            snapshot_only,
            metrics,
        } => {
            let output = if metrics {
                Output::Metrics
            } else if snapshot_only {
                Output::Snapshot
            } else {
                Output::Scenario
            };
            analyze(&service, &input, name, refresh_market, output).await
        }
        Command::EstimateRents { input } => {
            estimate_rents(&service, &input).await
        }
    }
}

/// Analyzes the input document at the provided `path` and prints the
/// requested [`Output`].
async fn analyze(
    service: &Service,
    path: &Path,
    name: String,
    refresh_market: bool,
    output: Output,
) -> Result<(), ()> {
    let mut scenario = create(service, path, name).await?;

    if refresh_market {
        match service
            .execute(RefreshMarketReport {
                scenario_id: scenario.id,
            })
            .await
        {
            Ok(refreshed) => scenario = refreshed,
            Err(e) => {
                log::warn!("keeping the scenario without market data: {e}");
            }
        }
    }

    let rendered = output.render(&scenario).map_err(|e| {
        log::error!("failed to render the scenario: {e}");
    })?;
    println!("{rendered}");
    Ok(())
}

/// Estimates the rent of every unit of the input document at the provided
/// `path` and prints them as JSON.
async fn estimate_rents(
    service: &Service,
    path: &Path,
) -> Result<(), ()> {
    let scenario = create(service, path, "Rent estimation".to_owned()).await?;

    let mut estimates = Vec::new();
    for unit in scenario.units().units() {
        let estimate = service
            .execute(EstimateRent {
                scenario_id: scenario.id,
                unit_id: unit.id,
            })
            .await
            .map_err(|e| {
                log::error!("failed to estimate rent of `{}`: {e}", unit.name);
            })?;
        estimates.push(UnitEstimate {
            unit_id: unit.id,
            name: unit.name.clone(),
            estimate,
        });
    }

    let rendered = serde_json::to_string_pretty(&estimates).map_err(|e| {
        log::error!("failed to render rent estimates: {e}");
    })?;
    println!("{rendered}");
    Ok(())
}

/// Creates a new [`scenario::Scenario`] out of the input document at the
/// provided `path`.
async fn create(
    service: &Service,
    path: &Path,
    name: String,
) -> Result<scenario::Scenario, ()> {
    let input = output::read_input(path).map_err(|e| {
        log::error!("failed to read `{}`: {e}", path.display());
    })?;
    let name = scenario::Name::new(name).ok_or_else(|| {
        log::error!("scenario name must be non-empty and short");
    })?;

    service
        .execute(CreateScenario {
            name,
            description: scenario::Description::default(),
            input,
        })
        .await
        .map_err(|e| {
            log::error!("failed to create the scenario: {e}");
        })
}
