//! Headless match host
//!
//! Runs one bot-vs-bot match on the simulation core and prints every frame
//! event as a JSON line on stdout. Logs go to stderr.

use std::io::Write;

use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use fighting_sim::bot::Bot;
use fighting_sim::config::Config;
use fighting_sim::game::runner::{GameMatch, RunnerOptions};
use fighting_sim::game::{FighterId, MatchRules, Simulation};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(&config.log_level, config.log_json);

    let match_id = Uuid::new_v4();
    info!(
        match_id = %match_id,
        total_rounds = config.total_rounds,
        round_seconds = config.round_seconds,
        seed = config.bot_seed,
        "Starting headless match"
    );

    let rules = MatchRules::new(config.total_rounds, config.round_seconds);
    let options = RunnerOptions {
        tps: config.sim_tps,
        realtime: config.realtime,
        publish_interval: config.snapshot_interval,
        max_frames: None,
    };
    let [bot_one, bot_two] = Bot::pair(config.bot_seed);
    let (game_match, handle) = GameMatch::new(match_id, Simulation::new(rules), options);
    let game_match = game_match
        .with_controller(FighterId::One, Box::new(bot_one))
        .with_controller(FighterId::Two, Box::new(bot_two));

    let mut frames = handle.subscribe();
    let printer = tokio::spawn(async move {
        let stdout = std::io::stdout();
        loop {
            match frames.recv().await {
                Ok(result) => {
                    let mut out = stdout.lock();
                    for event in &result.events {
                        let line = serde_json::json!({ "frame": result.frame, "event": event });
                        if writeln!(out, "{line}").is_err() {
                            return;
                        }
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Event printer lagged behind the match");
                }
                Err(RecvError::Closed) => return,
            }
        }
    });

    let mut runner = tokio::spawn(game_match.run());
    let summary = tokio::select! {
        summary = &mut runner => summary?,
        _ = shutdown_signal() => {
            if let Err(e) = handle.stop() {
                warn!(error = %e, "Stop request not delivered");
            }
            runner.await?
        }
    };
    drop(handle);
    printer.await?;

    info!(
        match_id = %summary.match_id,
        frames = summary.frames,
        winner = ?summary.outcome.and_then(|o| o.winner()),
        wins = ?summary.wins,
        interrupted = summary.interrupted,
        "Match finished"
    );
    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}

/// Initialize tracing/logging. Logs go to stderr, stdout carries the events.
fn init_tracing(log_level: &str, json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
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
                warn!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, stopping match");
        }
        _ = terminate => {
            info!("Received terminate signal, stopping match");
        }
    }
}
