//! Command line, descriptor setup and logging.
//!
//! The compiler starts the probe with two inherited descriptors and passes
//! their numbers on the command line. Both are reopened through `/dev/fd` so
//! the process owns ordinary [`File`] handles.

use std::{
    fs::{File, OpenOptions},
    io,
    path::PathBuf,
    sync::Mutex,
    time::Duration,
};

use clap::Parser;
use melt_app::AppConfig;
use melt_core::ChannelConfig;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Setup errors reported from `main`.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// An inherited descriptor could not be reopened.
    #[error("cannot open descriptor {fd}: {source}")]
    Descriptor {
        /// Descriptor number from the command line.
        fd: u32,
        /// Underlying error.
        source: io::Error,
    },

    /// The log file could not be created.
    #[error("cannot open log file {}: {source}", path.display())]
    LogFile {
        /// Requested log file.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },

    /// A global subscriber was already installed.
    #[error("logging already initialised: {0}")]
    Logging(String),
}

/// MELT probe
#[derive(Parser, Debug, Clone)]
#[command(name = "melt-probe")]
#[command(about = "Source and trace viewer attached to a MELT-enabled compiler")]
#[command(version)]
pub struct Args {
    /// Descriptor to read commands from
    #[arg(long = "command-from-melt", alias = "command-from-MELT", value_name = "FD")]
    pub command_from_melt: u32,

    /// Descriptor to write requests to
    #[arg(long = "request-to-melt", alias = "request-to-MELT", value_name = "FD")]
    pub request_to_melt: u32,

    /// Tracing mode: show the command/request trace pane
    #[arg(short = 'T')]
    pub trace: bool,

    /// Debug mode: log at debug level
    #[arg(short = 'D')]
    pub debug: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// File receiving log output (the terminal belongs to the UI)
    #[arg(long, default_value = "melt-probe.log")]
    pub log_file: PathBuf,

    /// Upper bound in milliseconds on one readiness wait of the reader
    #[arg(long, default_value_t = 100)]
    pub poll_interval_ms: u64,

    /// Trace entries kept for display
    #[arg(long, default_value_t = 1000)]
    pub max_trace_entries: usize,
}

impl Args {
    /// Filter directive for the log subscriber. `-D` wins over `--log-level`.
    pub fn log_filter(&self) -> &str {
        if self.debug { "debug" } else { &self.log_level }
    }

    /// Reader settings.
    pub fn channel_config(&self) -> ChannelConfig {
        ChannelConfig {
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            ..ChannelConfig::default()
        }
    }

    /// Presentation settings.
    pub fn app_config(&self) -> AppConfig {
        AppConfig { trace_visible: self.trace, max_trace_entries: self.max_trace_entries }
    }

    /// Reopen the command (read) and request (write) descriptors.
    pub fn open_descriptors(&self) -> Result<(File, File), ProbeError> {
        let fd = self.command_from_melt;
        let input = File::open(descriptor_path(fd))
            .map_err(|source| ProbeError::Descriptor { fd, source })?;

        let fd = self.request_to_melt;
        let output = OpenOptions::new()
            .write(true)
            .open(descriptor_path(fd))
            .map_err(|source| ProbeError::Descriptor { fd, source })?;

        Ok((input, output))
    }
}

/// Path under which an inherited descriptor can be reopened.
pub fn descriptor_path(fd: u32) -> PathBuf {
    PathBuf::from(format!("/dev/fd/{fd}"))
}

/// Install the global subscriber writing to `--log-file`.
///
/// `RUST_LOG` overrides the level chosen on the command line.
pub fn init_logging(args: &Args) -> Result<(), ProbeError> {
    let file = File::create(&args.log_file)
        .map_err(|source| ProbeError::LogFile { path: args.log_file.clone(), source })?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_filter()));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(filter)
        .try_init()
        .map_err(|e| ProbeError::Logging(e.to_string()))
}
