use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use crate::config::CONFIG;
use crate::utils::timing::TIMING_TARGET;

/// Flushes the rolling file writers when dropped; keep it alive for the whole run.
pub struct LoggingGuards {
    _guards: Vec<WorkerGuard>,
}

fn parse_log_level(value: &str) -> LevelFilter {
    match value.trim().to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" | "warning" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        "off" => LevelFilter::OFF,
        _ => LevelFilter::INFO,
    }
}

fn general_targets(level: LevelFilter) -> Targets {
    Targets::new()
        .with_default(level)
        .with_target(TIMING_TARGET, LevelFilter::OFF)
        .with_target("hyper", LevelFilter::WARN)
        .with_target("hyper_util", LevelFilter::WARN)
        .with_target("reqwest", LevelFilter::WARN)
}

fn timing_targets() -> Targets {
    Targets::new()
        .with_default(LevelFilter::OFF)
        .with_target(TIMING_TARGET, LevelFilter::INFO)
}

fn daily_writer(dir: &Path, file_name: &str, guards: &mut Vec<WorkerGuard>) -> NonBlocking {
    let appender = tracing_appender::rolling::daily(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    guards.push(guard);
    writer
}

pub fn init_logging() -> LoggingGuards {
    let logs_dir = CONFIG.log_dir.as_path();
    if let Err(err) = fs::create_dir_all(logs_dir) {
        eprintln!("Failed to create logs directory {}: {err}", logs_dir.display());
    }

    let mut guards = Vec::with_capacity(4);
    let general = general_targets(parse_log_level(&CONFIG.log_level));
    let timing = timing_targets();

    let layers = vec![
        // stderr keeps stdout free for command output
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(general.clone())
            .boxed(),
        tracing_subscriber::fmt::layer()
            .with_writer(daily_writer(logs_dir, "headshot.log", &mut guards))
            .with_ansi(false)
            .with_filter(general.clone())
            .boxed(),
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(daily_writer(logs_dir, "headshot.jsonl", &mut guards))
            .with_filter(general)
            .boxed(),
        tracing_subscriber::fmt::layer()
            .with_writer(daily_writer(logs_dir, "timing.log", &mut guards))
            .with_ansi(false)
            .with_filter(timing.clone())
            .boxed(),
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(daily_writer(logs_dir, "timing.jsonl", &mut guards))
            .with_filter(timing)
            .boxed(),
    ];

    tracing_subscriber::registry().with(layers).init();

    LoggingGuards { _guards: guards }
}
