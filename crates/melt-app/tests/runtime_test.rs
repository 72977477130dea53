//! Integration tests for the Runtime with a scripted driver.
//!
//! # Oracle Pattern
//!
//! Tests end with oracle checks that verify:
//! - The last rendered App reflects the probe events
//! - Requests reach the request descriptor with exact wire bytes

use std::{
    collections::{HashMap, VecDeque},
    convert::Infallible,
    future::{Future, ready},
    io::{self, Write},
    sync::{Arc, Mutex},
    time::Duration,
};

use melt_app::{App, AppConfig, AppEvent, Driver, KeyInput, Runtime, SourceLoader, TraceKind};
use melt_core::{CloseReason, Dispatcher, ProbeEvent, ProbeSender, ReplyChannel, probe_queue};

/// Driver that replays key events and keeps the last rendered App.
struct ScriptedDriver {
    script: VecDeque<Option<AppEvent>>,
    rendered: Arc<Mutex<Option<App>>>,
    stopped: Arc<Mutex<bool>>,
}

impl Driver for ScriptedDriver {
    type Error = Infallible;
    type Instant = Duration;

    fn poll_event(&mut self) -> impl Future<Output = Result<Option<AppEvent>, Infallible>> + Send {
        // Quit once the script runs out
        let next = self.script.pop_front().unwrap_or(Some(AppEvent::Key(KeyInput::Esc)));
        ready(Ok(next))
    }

    fn now(&self) -> Duration {
        Duration::ZERO
    }

    fn render(&mut self, app: &App) -> Result<(), Infallible> {
        *self.rendered.lock().unwrap() = Some(app.clone());
        Ok(())
    }

    fn stop(&mut self) {
        *self.stopped.lock().unwrap() = true;
    }
}

#[derive(Clone, Default)]
struct SharedWire(Arc<Mutex<Vec<u8>>>);

impl Write for SharedWire {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct StaticLoader(HashMap<&'static str, &'static str>);

impl SourceLoader for StaticLoader {
    fn load(&self, path: &str) -> io::Result<String> {
        self.0
            .get(path)
            .map(|s| (*s).to_owned())
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }
}

struct Harness {
    driver: ScriptedDriver,
    rendered: Arc<Mutex<Option<App>>>,
    stopped: Arc<Mutex<bool>>,
}

fn harness(script: Vec<Option<AppEvent>>) -> Harness {
    let rendered = Arc::new(Mutex::new(None));
    let stopped = Arc::new(Mutex::new(false));
    let driver = ScriptedDriver {
        script: script.into(),
        rendered: Arc::clone(&rendered),
        stopped: Arc::clone(&stopped),
    };
    Harness { driver, rendered, stopped }
}

fn loader() -> StaticLoader {
    StaticLoader(HashMap::from([("a.c", "int a;\nint b;\nint c;\n")]))
}

/// Dispatch raw command lines the way the reader thread does.
fn feed(tx: &ProbeSender, dispatcher: &mut Dispatcher, lines: &[&str]) {
    for line in lines {
        for event in dispatcher.dispatch(line).into_events() {
            tx.send(event).unwrap();
        }
    }
}

#[tokio::test]
async fn enter_on_selected_mark_sends_request() {
    let (tx, rx) = probe_queue();
    let wire = SharedWire::default();
    let reply = ReplyChannel::new(wire.clone(), tx.clone());

    let mut dispatcher = Dispatcher::new();
    feed(&tx, &mut dispatcher, &["SHOWFILE_PCD x \"a.c\" y 3", "MARKLOCATION_PCD 7 3 2 5"]);

    let h = harness(vec![
        Some(AppEvent::Tick),
        Some(AppEvent::Key(KeyInput::Down)),
        Some(AppEvent::Key(KeyInput::Enter)),
        None,
    ]);
    let config = AppConfig { trace_visible: true, max_trace_entries: 100 };
    let runtime = Runtime::new(h.driver, config, loader(), rx, reply);
    runtime.run().await.unwrap();

    // Oracle: exact bytes on the request descriptor
    assert_eq!(wire.0.lock().unwrap().as_slice(), b"INFOLOCATION_prq 7\n\n");

    // Oracle: rendered state shows the file, mark and both trace directions
    let app = h.rendered.lock().unwrap().clone().unwrap();
    let file = app.file(3).unwrap();
    assert_eq!(file.label(), "[3] a.c");
    assert_eq!(file.lines.len(), 3);
    assert_eq!(file.mark(7).map(|m| (m.line, m.column)), Some((1, 4)));

    let kinds: Vec<_> = app.trace().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![TraceKind::Command, TraceKind::Command, TraceKind::Request]);
    assert!(*h.stopped.lock().unwrap());
}

#[tokio::test]
async fn missing_file_shows_error_not_tab() {
    let (tx, rx) = probe_queue();
    let reply = ReplyChannel::new(SharedWire::default(), tx.clone());

    let mut dispatcher = Dispatcher::new();
    feed(&tx, &mut dispatcher, &["SHOWFILE_PCD x \"/gone.c\" y 9"]);

    let h = harness(vec![None]);
    Runtime::new(h.driver, AppConfig::default(), loader(), rx, reply).run().await.unwrap();

    let app = h.rendered.lock().unwrap().clone().unwrap();
    assert!(app.files().is_empty());
    assert_eq!(app.status_message(), Some("Error: Unable to open '/gone.c'"));
}

#[tokio::test]
async fn info_payload_reaches_mark_and_close_is_reported() {
    let (tx, rx) = probe_queue();
    let reply = ReplyChannel::new(SharedWire::default(), tx.clone());

    let mut dispatcher = Dispatcher::new();
    feed(&tx, &mut dispatcher, &[
        "SHOWFILE_PCD x \"<built-in>\" y 0",
        "MARKLOCATION_PCD 1 0 1 1",
        "STARTINFOLOC_PCD 1",
        "ADDINFOLOC_PCD 1 \"tree\"   \"int\"",
    ]);
    tx.send(ProbeEvent::ChannelClosed { reason: CloseReason::EndOfStream }).unwrap();

    let h = harness(vec![None]);
    Runtime::new(h.driver, AppConfig::default(), loader(), rx, reply).run().await.unwrap();

    let app = h.rendered.lock().unwrap().clone().unwrap();
    let mark = app.file(0).and_then(|f| f.mark(1)).cloned().unwrap();
    assert!(mark.info_started);
    assert_eq!(mark.info, vec!["\"tree".to_string(), "int\"".to_string()]);
    assert!(!app.probe_open());
}

#[tokio::test]
async fn quit_key_stops_before_probe_events() {
    let (tx, rx) = probe_queue();
    let reply = ReplyChannel::new(SharedWire::default(), tx.clone());

    let mut dispatcher = Dispatcher::new();
    feed(&tx, &mut dispatcher, &["SHOWFILE_PCD x \"a.c\" y 3"]);

    let h = harness(vec![Some(AppEvent::Key(KeyInput::Char('q')))]);
    Runtime::new(h.driver, AppConfig::default(), loader(), rx, reply).run().await.unwrap();

    // Only the initial render happened
    let app = h.rendered.lock().unwrap().clone().unwrap();
    assert!(app.files().is_empty());
}
