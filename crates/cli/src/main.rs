//! Metaphore bot entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration**: merge defaults, the optional config file and the
//!    action inputs, then validate them ([`config`]).
//! 2. **Wire observability**: install the `tracing-subscriber` stack, with an
//!    OpenTelemetry OTLP exporter when configured ([`telemetry`]).
//! 3. **Construct infrastructure**: create the `GitHubClient` and the Actions
//!    event source and inject them into the `EventRouter`.
//! 4. **Report the result**: exit 0 on success or a skip; emit an `::error::`
//!    workflow command and exit 1 on errors and unsupported actions.

mod config;
mod report;
mod telemetry;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use github::GitHubClient;
use handlers::{EventRouter, GreetingHandler, RunOutcome, StoryPublisher};
use listener::ActionsEventSource;
use pipeline::{EventSource, RunId};
use tracing::{error, info};

use crate::config::Settings;

#[tokio::main]
async fn main() -> ExitCode {
    let settings = match config::load() {
        Ok(settings) => settings,
        Err(e) => {
            // The subscriber is not installed yet; report straight to the runner.
            report::annotate_failure(&e.to_string());
            return ExitCode::FAILURE;
        }
    };

    let telemetry = match telemetry::init(&settings.telemetry) {
        Ok(telemetry) => telemetry,
        Err(e) => {
            report::annotate_failure(&format!("{e:#}"));
            return ExitCode::FAILURE;
        }
    };

    let code = match run(settings).await {
        Ok(outcome) if outcome.is_failure() => {
            error!(%outcome, "run failed");
            report::annotate_failure(&outcome.to_string());
            ExitCode::FAILURE
        }
        Ok(outcome) => {
            info!(%outcome, "run complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %format!("{e:#}"), "run failed");
            report::annotate_failure(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    };

    telemetry.shutdown();
    code
}

async fn run(settings: Settings) -> Result<RunOutcome> {
    let run_id = RunId::new_random();

    let event = ActionsEventSource::from_env()?
        .load()
        .await
        .context("failed to load the triggering event")?;

    let client = Arc::new(
        GitHubClient::new(settings.client).context("failed to construct GitHub client")?,
    );
    let router = EventRouter::new(
        GreetingHandler::new(client.clone(), settings.greeting),
        StoryPublisher::new(client.clone(), client, settings.publisher),
    );

    Ok(router.dispatch(run_id, &event).await?)
}
