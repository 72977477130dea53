//! Driver trait for abstracting frontend I/O.
//!
//! The [`Driver`] trait decouples the runtime from a specific terminal
//! library. Each frontend implements it to provide input and rendering, while
//! the generic [`crate::Runtime`] handles the probe plumbing.

use std::{future::Future, ops::Sub, time::Duration};

use crate::{App, AppEvent};

/// Abstracts frontend I/O for the application runtime.
///
/// # Implementations
///
/// - **Terminal**: crossterm for key events, ratatui for rendering
/// - **Tests**: scripted key sequences with a recorded view model
pub trait Driver: Send {
    /// Frontend error type.
    type Error: std::error::Error + Send + 'static;

    /// Time instant type. Lets tests run on a fixed clock.
    type Instant: Copy + Ord + Send + Sync + Sub<Output = Duration>;

    /// Wait a bounded time for the next input event.
    ///
    /// Returns `None` when nothing arrived; the runtime uses the gap to drain
    /// probe events.
    fn poll_event(&mut self) -> impl Future<Output = Result<Option<AppEvent>, Self::Error>> + Send;

    /// Current time instant.
    fn now(&self) -> Self::Instant;

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if drawing fails.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;

    /// Restore the frontend before exit.
    fn stop(&mut self);
}
