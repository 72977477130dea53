//! Terminal UI for the MELT probe
//!
//! A thin shell over [`melt_app::Driver`] that provides terminal-specific
//! I/O, plus the command line and log setup for the `melt-probe` binary. All
//! orchestration lives in the generic [`melt_app::Runtime`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cli;
pub mod terminal;
pub mod ui;

pub use cli::{Args, ProbeError};
pub use melt_app::{App, AppAction, AppEvent, Driver, KeyInput, Runtime};
pub use terminal::{TerminalDriver, TerminalError};
