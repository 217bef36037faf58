pub mod models;
pub mod services;
pub mod api;

use api::{AnalysisService, ApiError};
use models::AnalyzeResponse;
use services::{AppConfig, ConfigStore};

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{info, warn};
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const LOG_FILE_PREFIX: &str = "tweetlens_";
const LOG_FILES_KEPT: usize = 30;

fn env_flag(name: &str) -> bool {
    matches!(
        std::env::var(name).as_deref(),
        Ok("1") | Ok("true") | Ok("TRUE")
    )
}

/// Initialize logging with one timestamped log file per session
pub fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let disable_cleanup = env_flag("TWEETLENS_DISABLE_LOG_CLEANUP");

    if env_flag("TWEETLENS_DISABLE_FILE_LOG") {
        init_console_only_logging(env_filter);
        info!("File logging disabled via TWEETLENS_DISABLE_FILE_LOG");
        return;
    }

    let logs_dir = match std::env::var("TWEETLENS_LOG_DIR") {
        Ok(p) if !p.trim().is_empty() => PathBuf::from(p),
        _ => get_logs_dir(),
    };

    if let Err(e) = fs::create_dir_all(&logs_dir) {
        eprintln!("Failed to create logs directory: {}", e);
        init_console_only_logging(env_filter);
        info!("Falling back to console-only logging (log dir not writable)");
        return;
    }

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let log_filename = format!("{}{}.log", LOG_FILE_PREFIX, timestamp);

    let file_appender = rolling::never(&logs_dir, &log_filename);
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(file_guard);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    // stdout carries the JSON response, so console logs go to stderr
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(cfg!(debug_assertions))
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    info!("=== TweetLens Started ===");
    info!("Log file: {}/{}", logs_dir.display(), log_filename);
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    if disable_cleanup {
        info!("Log cleanup disabled via TWEETLENS_DISABLE_LOG_CLEANUP");
    } else {
        std::thread::spawn(move || {
            cleanup_old_logs(&logs_dir, LOG_FILES_KEPT);
        });
    }
}

fn get_logs_dir() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        return data_dir.join("tweetlens").join("logs");
    }
    PathBuf::from("logs")
}

fn cleanup_old_logs(logs_dir: &Path, keep: usize) {
    let mut entries: Vec<_> = match fs::read_dir(logs_dir) {
        Ok(rd) => rd.filter_map(|e| e.ok()).collect(),
        Err(_) => return,
    };

    entries.retain(|e| {
        let name = e.file_name().to_string_lossy().to_string();
        name.starts_with(LOG_FILE_PREFIX) && name.ends_with(".log")
    });

    if entries.len() <= keep {
        return;
    }

    entries.sort_by_key(|e| {
        e.metadata()
            .and_then(|m| m.modified())
            .unwrap_or(std::time::SystemTime::UNIX_EPOCH)
    });

    let remove_count = entries.len().saturating_sub(keep);
    for entry in entries.into_iter().take(remove_count) {
        let _ = fs::remove_file(entry.path());
    }
}

fn init_console_only_logging(env_filter: EnvFilter) {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(cfg!(debug_assertions))
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .init();
}

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn has_flag(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}

pub const USAGE: &str = "Usage:\n  tweetlens [--input <path>] [--output <path>] [--config <dir>] [--classify-on-translated] [--init-config]";

/// Command-line switches; flags win over config file and environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOptions {
    pub input: Option<String>,
    pub output: Option<String>,
    pub config_dir: Option<PathBuf>,
    pub classify_on_translated: bool,
    pub init_config: bool,
    pub help: bool,
}

impl CliOptions {
    pub fn parse(args: &[String]) -> Self {
        Self {
            input: parse_arg_value(args, "--input"),
            output: parse_arg_value(args, "--output"),
            config_dir: parse_arg_value(args, "--config").map(PathBuf::from),
            classify_on_translated: has_flag(args, "--classify-on-translated"),
            init_config: has_flag(args, "--init-config"),
            help: has_flag(args, "--help") || has_flag(args, "-h"),
        }
    }

    fn config_store(&self) -> ConfigStore {
        let dir = self
            .config_dir
            .clone()
            .or_else(ConfigStore::default_config_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        ConfigStore::new(dir)
    }

    /// Layer file config, environment overrides and flags.
    pub fn apply(&self, config: &mut AppConfig) {
        config.apply_env_overrides();
        if let Some(input) = &self.input {
            config.io.input_file = input.clone();
        }
        if let Some(output) = &self.output {
            config.io.output_file = output.clone();
        }
        if self.classify_on_translated {
            config.classify_on_translated = true;
        }
    }
}

#[derive(Debug)]
pub enum RunOutcome {
    Analyzed(AnalyzeResponse),
    ConfigWritten(PathBuf),
}

/// Entry point behind the binary: one trigger, one job.
pub async fn run(options: &CliOptions) -> Result<RunOutcome, ApiError> {
    let store = options.config_store();

    if options.init_config {
        store.save(&AppConfig::default())?;
        info!(path = %store.config_file().display(), "[CONFIG] default config written");
        return Ok(RunOutcome::ConfigWritten(store.config_file().to_path_buf()));
    }

    let mut config = store.load()?;
    options.apply(&mut config);
    if config.classifier.labels.is_empty() {
        warn!("[CONFIG] classifier.labels is empty; expected the model's label list");
        return Err(ApiError::Internal("classifier.labels must not be empty".to_string()));
    }

    let service = AnalysisService::from_config(&config)?;
    let response = service.analyze_tweets().await?;
    info!(
        processed = response.processed_tweets,
        output = %response.output_file,
        "[JOB] trigger complete"
    );
    Ok(RunOutcome::Analyzed(response))
}
