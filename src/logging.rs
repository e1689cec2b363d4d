//! # Structured Logging Module
//!
//! Environment-aware structured logging that outputs to both console and files
//! so a sync run can be reconstructed after the fact.
//!
//! Console output goes to stderr, which keeps stdout free for the run report.
//! The file layer writes JSON lines to `log/<env>.<pid>.<timestamp>.log`.

use chrono::Utc;
use std::fs;
use std::path::PathBuf;
use std::process;
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration
///
/// Safe to call more than once; only the first call installs a subscriber. If
/// the log directory cannot be created, logging continues on the console only.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = get_log_level(&environment);

        let console_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_ansi(true)
            .with_filter(build_filter(&log_level));

        let log_dir = PathBuf::from("log");
        let file_ready = log_dir.exists() || fs::create_dir_all(&log_dir).is_ok();

        let pid = process::id();
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
        let log_filename = format!("{environment}.{pid}.{timestamp}.log");

        let file_layer = file_ready.then(|| {
            let file_appender = tracing_appender::rolling::never(&log_dir, &log_filename);
            let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
            let _ = FILE_GUARD.set(guard);

            fmt::layer()
                .with_writer(file_writer)
                .with_target(true)
                .with_level(true)
                .with_ansi(false)
                .json()
                .with_filter(build_filter(&log_level))
        });

        // A global subscriber may already be installed (tests, embedding hosts)
        if tracing_subscriber::registry()
            .with(console_layer)
            .with(file_layer)
            .try_init()
            .is_err()
        {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
            return;
        }

        if file_ready {
            tracing::info!(
                pid = pid,
                environment = %environment,
                log_file = %log_dir.join(&log_filename).display(),
                "🔧 STRUCTURED LOGGING: Initialized with file output"
            );
        } else {
            tracing::warn!(
                pid = pid,
                environment = %environment,
                "🔧 STRUCTURED LOGGING: Log directory unavailable, console output only"
            );
        }
    });
}

/// `RUST_LOG` wins over the environment default.
fn build_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn get_environment() -> String {
    environment_from(|key| std::env::var(key).ok())
}

fn environment_from<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup("ORGSYNC_ENV")
        .or_else(|| lookup("APP_ENV"))
        .filter(|env| !env.trim().is_empty())
        .unwrap_or_else(|| "development".to_string())
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log structured data for department operations
pub fn log_department_operation(
    operation: &str,
    external_id: &str,
    remote_id: Option<&str>,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        external_id = %external_id,
        remote_id = remote_id,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "🏢 DEPARTMENT_OPERATION"
    );
}

/// Log structured data for user operations
pub fn log_user_operation(
    operation: &str,
    nickname: &str,
    department_id: Option<&str>,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        nickname = %nickname,
        department_id = department_id,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "👤 USER_OPERATION"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "❌ ERROR"
    );
}
