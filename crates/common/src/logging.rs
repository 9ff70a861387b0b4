//! Logging setup shared by every Loupe binary and test process.
//!
//! One tracing subscriber serves the whole process: a pretty console
//! layer for interactive runs, plus an optional daily-rotated file
//! layer under `loupe-logs/<component>` in the system temp directory,
//! so a render or trace-decoding session can be inspected after the
//! terminal is gone. `RUST_LOG` overrides the default levels
//! everywhere.

use eyre::Result;
use once_cell::sync::Lazy;
use std::{env, fs, path::PathBuf, sync::Once};
use tracing::Level;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, time::LocalTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Root directory all Loupe components log under.
static LOG_ROOT: Lazy<PathBuf> = Lazy::new(|| env::temp_dir().join("loupe-logs"));

/// Install the process-wide subscriber for a Loupe component.
///
/// The console layer prints colored, pretty-printed events with
/// timestamps, thread info, and span close events. With
/// `enable_file_logging` the same stream also lands in a daily-rotated
/// file under `loupe-logs/<component_name>`, colors stripped. The log
/// directory is created before the subscriber is installed; a second
/// call in the same process returns an error because the subscriber
/// slot is already taken.
///
/// # Arguments
/// * `component_name` - Name of the component (e.g., "loupe")
/// * `enable_file_logging` - Whether to also write the rotated log file
///
/// # Examples
/// ```rust
/// use loupe_common::logging;
///
/// fn main() -> eyre::Result<()> {
///     logging::init_logging("loupe", true)?;
///
///     tracing::info!("Application started");
///     Ok(())
/// }
/// ```
pub fn init_logging(component_name: &str, enable_file_logging: bool) -> Result<()> {
    // RUST_LOG wins; otherwise info and up.
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .expect("Failed to create environment filter");

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_timer(LocalTime::rfc_3339())
        .with_ansi(true)
        .pretty();

    if enable_file_logging {
        // Directory must exist before the appender opens its first file.
        let log_dir = create_log_directory(component_name)?;

        let file_appender = rolling::daily(&log_dir, format!("{component_name}.log"));
        let (non_blocking_appender, guard) = non_blocking(file_appender);

        // Leak the flush guard; the writer has to live as long as the process.
        std::mem::forget(guard);

        // Same fields as the console layer, minus ansi.
        let file_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_timer(LocalTime::rfc_3339())
            .with_ansi(false)
            .with_writer(non_blocking_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer.with_filter(filter_for_console()))
            .with(file_layer.with_filter(filter_for_file()))
            .try_init()
            .map_err(|e| eyre::eyre!("Failed to initialize tracing subscriber: {}", e))?;

        tracing::info!(
            component = component_name,
            log_dir = %log_dir.display(),
            "Logging initialized with console and file output"
        );
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .try_init()
            .map_err(|e| eyre::eyre!("Failed to initialize tracing subscriber: {}", e))?;

        tracing::info!(component = component_name, "Logging initialized with console output only");
    }

    log_environment_info(component_name);

    Ok(())
}

/// Create the component's directory under the shared log root.
fn create_log_directory(component_name: &str) -> Result<PathBuf> {
    let log_dir = LOG_ROOT.join(component_name);

    fs::create_dir_all(&log_dir)?;

    Ok(log_dir)
}

/// Filter for console output - keep per-cell annotation noise out of the terminal
fn filter_for_console() -> EnvFilter {
    EnvFilter::from_default_env()
        .add_directive("loupe_view::annotate=info".parse().unwrap()) // Reduce per-marker noise
        .add_directive("loupe_view::matrix=info".parse().unwrap())
}

/// Filter for file output - files keep everything `RUST_LOG` lets through
fn filter_for_file() -> EnvFilter {
    EnvFilter::from_default_env()
}

/// Record the environment the component started with
fn log_environment_info(component_name: &str) {
    let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let args: Vec<String> = env::args().collect();

    tracing::info!(
        component = component_name,
        rust_log = %rust_log,
        args = ?args,
        "Environment information"
    );

    if let Ok(current_dir) = env::current_dir() {
        tracing::debug!(
            working_directory = %current_dir.display(),
            "Working directory"
        );
    }
}

/// Install a compact console-only subscriber.
///
/// Test binaries and one-shot tools use this instead of the full
/// console + file pair; there is no log directory and no span
/// formatting, just target-less compact lines.
///
/// # Arguments
/// * `level` - Default level when `RUST_LOG` is not set
pub fn init_simple_logging(level: Level) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.as_str()))
        .expect("Failed to create environment filter");

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| eyre::eyre!("Failed to initialize simple logging: {}", e))?;

    Ok(())
}

// One subscriber per test process, whichever test gets here first.
static TEST_LOGGING_INIT: Once = Once::new();

/// Logging entry point for tests; safe to call any number of times.
///
/// Every test can open with this call without caring which test in
/// the process ran first: a `Once` gate installs the compact console
/// subscriber a single time and later calls are no-ops. Installation
/// errors are discarded; they mean another harness already claimed the
/// process subscriber, which tests treat the same as success.
///
/// # Arguments
/// * `default_level` - Level when `RUST_LOG` is not set; `None` means
///   INFO
///
/// # Usage
/// ```rust
/// use loupe_common::logging;
/// use tracing::info;
///
/// #[test]
/// fn my_test() {
///     logging::ensure_test_logging(None);
///     info!("This will work safely in any test!");
///     // ... rest of test
/// }
/// ```
pub fn ensure_test_logging(default_level: Option<Level>) {
    TEST_LOGGING_INIT.call_once(|| {
        let default_level = default_level.unwrap_or(Level::INFO);
        let _ = init_simple_logging(default_level);
    });
}
