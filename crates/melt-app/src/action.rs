//! Application side-effects and intents.
//!
//! [`AppAction`]s are produced by the [`crate::App`] state machine for the
//! runtime to execute.

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Ask the compiler to describe a mark.
    RequestInfoLocation {
        /// Mark to describe.
        mark_id: u64,
    },
}
