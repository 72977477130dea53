//! Generic runtime for application orchestration.
//!
//! The Runtime drives the probe's presentation loop, coordinating between:
//! - [`App`]: view model state machine
//! - [`Bridge`]: probe event translation
//! - [`Driver`]: frontend input and rendering
//! - [`ReplyChannel`]: requests back to the compiler

use std::io::Write;

use melt_core::{ProbeReceiver, ReplyChannel};
use tokio::sync::mpsc::error::TryRecvError;

use crate::{App, AppAction, AppConfig, AppEvent, Bridge, Driver, SourceLoader};

/// Generic runtime that orchestrates App, Bridge and Driver.
///
/// # Type Parameters
///
/// - `D`: frontend driver
/// - `W`: request descriptor
/// - `L`: source loader for shown files
pub struct Runtime<D, W, L>
where
    D: Driver,
{
    driver: D,
    app: App,
    bridge: Bridge<L>,
    events: ProbeReceiver,
    reply: ReplyChannel<W>,
    started: D::Instant,
    /// Set by [`AppAction::Render`], cleared once per cycle.
    needs_render: bool,
}

impl<D, W, L> Runtime<D, W, L>
where
    D: Driver,
    W: Write + Send,
    L: SourceLoader,
{
    /// Create a runtime over an already running probe channel.
    pub fn new(
        driver: D,
        config: AppConfig,
        loader: L,
        events: ProbeReceiver,
        reply: ReplyChannel<W>,
    ) -> Self {
        let started = driver.now();
        Self {
            driver,
            app: App::new(config),
            bridge: Bridge::new(loader),
            events,
            reply,
            started,
            needs_render: false,
        }
    }

    /// Run until the user quits.
    ///
    /// Each cycle:
    /// 1. Polls the driver for one input event
    /// 2. Drains every queued probe event through the bridge
    /// 3. Executes the resulting actions, rendering at most once
    ///
    /// The loop keeps running after the probe channel closes so the final
    /// state stays inspectable.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails to read input or render.
    pub async fn run(mut self) -> Result<(), D::Error> {
        self.driver.render(&self.app)?;

        loop {
            let should_quit = self.process_cycle().await?;
            if should_quit {
                break;
            }
        }

        self.driver.stop();
        Ok(())
    }

    /// Process one cycle of the event loop.
    ///
    /// Returns `true` if the application should quit.
    async fn process_cycle(&mut self) -> Result<bool, D::Error> {
        if let Some(event) = self.driver.poll_event().await? {
            let actions = self.app.handle(event);
            if self.process_actions(actions) {
                return Ok(true);
            }
        }

        if self.drain_probe_events() {
            return Ok(true);
        }

        if std::mem::take(&mut self.needs_render) {
            self.driver.render(&self.app)?;
        }
        Ok(false)
    }

    /// Feed every queued probe event to the App.
    ///
    /// Returns `true` if should quit.
    fn drain_probe_events(&mut self) -> bool {
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    let elapsed = self.driver.now() - self.started;
                    for app_event in self.bridge.translate(event, elapsed) {
                        let actions = self.app.handle(app_event);
                        if self.process_actions(actions) {
                            return true;
                        }
                    }
                },
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return false,
            }
        }
    }

    /// Process actions returned by the App.
    ///
    /// Returns `true` if should quit.
    fn process_actions(&mut self, initial_actions: Vec<AppAction>) -> bool {
        let mut pending_actions = initial_actions;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                match action {
                    AppAction::Render => self.needs_render = true,
                    AppAction::Quit => return true,
                    AppAction::RequestInfoLocation { mark_id } => {
                        if let Err(e) = self.reply.send_info_location_request(mark_id) {
                            tracing::error!(mark_id, error = %e, "failed to send request");
                            let message = format!("Request for mark {mark_id} failed: {e}");
                            pending_actions.extend(self.app.handle(AppEvent::Error { message }));
                        }
                    },
                }
            }
        }
        false
    }
}
