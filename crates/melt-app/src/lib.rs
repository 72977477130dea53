//! Application layer for the MELT probe
//!
//! Pure state machines and a generic runtime between the probe core and a
//! frontend, so the same orchestration code runs under a real terminal and in
//! tests with a scripted driver.
//!
//! # Components
//!
//! - [`App`]: view model (file tabs, marks, trace log, key handling)
//! - [`Bridge`]: translates [`melt_core::ProbeEvent`]s into [`AppEvent`]s and
//!   loads source text
//! - [`Driver`]: trait for platform-specific input and rendering
//! - [`Runtime`]: generic orchestration loop using a Driver

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod bridge;
mod driver;
mod event;
mod input;
mod runtime;
mod state;

pub use action::AppAction;
pub use app::{App, AppConfig};
pub use bridge::{BUILTIN_CONTENT, BUILTIN_FILENAME, Bridge, FsLoader, SourceLoader};
pub use driver::Driver;
pub use event::AppEvent;
pub use input::KeyInput;
pub use runtime::Runtime;
pub use state::{FileView, Lexer, MarkView, TraceEntry, TraceKind};
