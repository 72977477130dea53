//! Background reader for the command descriptor.
//!
//! A dedicated thread owns the command descriptor and the [`Dispatcher`]. It
//! waits for readability with `poll(2)` and a bounded timeout, so a shutdown
//! request is noticed within one poll interval even when the compiler is
//! silent.
//!
//! # Exit paths
//!
//! The loop ends on shutdown, end of stream, hang-up, a read or poll error, or
//! when the event receiver is gone. Every path sends one
//! [`ProbeEvent::ChannelClosed`] (if anyone is still listening), drops the
//! descriptor and returns the dispatcher to whoever joins the thread. `poll(2)`
//! keeps no registration between calls, so nothing outlives the loop.

use std::{
    io::Read,
    os::fd::AsFd,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use melt_proto::LineFramer;
use nix::{
    errno::Errno,
    poll::{PollFd, PollFlags, PollTimeout, poll},
};

use crate::{ChannelError, CloseReason, Dispatcher, ProbeEvent, ProbeSender};

/// Reader configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Upper bound on a single readiness wait.
    pub poll_interval: Duration,
    /// Bytes requested per read.
    pub read_chunk: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self { poll_interval: Duration::from_millis(100), read_chunk: 4096 }
    }
}

/// Spawner for the reader thread.
pub struct ProbeChannel;

impl ProbeChannel {
    /// Start reading `input` on a new thread.
    ///
    /// # Errors
    ///
    /// - `ChannelError::Io` if the thread cannot be spawned
    pub fn spawn<F>(
        input: F,
        dispatcher: Dispatcher,
        events: ProbeSender,
        config: ChannelConfig,
    ) -> Result<ChannelHandle, ChannelError>
    where
        F: AsFd + Read + Send + 'static,
    {
        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&shutdown);

        let thread = thread::Builder::new()
            .name("melt-reader".into())
            .spawn(move || Reader { input, dispatcher, events, config, shutdown: flag }.run())?;

        Ok(ChannelHandle { shutdown, thread: Some(thread) })
    }
}

/// Handle to a running reader thread.
///
/// Dropping the handle requests shutdown and joins the thread.
#[derive(Debug)]
pub struct ChannelHandle {
    shutdown: Arc<AtomicBool>,
    thread: Option<JoinHandle<Dispatcher>>,
}

impl ChannelHandle {
    /// Stop the reader and wait for it.
    ///
    /// Returns the dispatcher with the final session state, or `None` if the
    /// reader thread panicked.
    pub fn shutdown(mut self) -> Option<Dispatcher> {
        self.stop()
    }

    fn stop(&mut self) -> Option<Dispatcher> {
        self.shutdown.store(true, Ordering::Release);
        let thread = self.thread.take()?;
        match thread.join() {
            Ok(dispatcher) => Some(dispatcher),
            Err(_) => {
                tracing::error!("reader thread panicked");
                None
            },
        }
    }
}

impl Drop for ChannelHandle {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Readiness of the command descriptor after one wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Readiness {
    /// Timed out or interrupted.
    Idle,
    /// Data (or end of stream) can be read without blocking.
    Readable,
    /// Peer hung up. One more read tells end of stream from a broken peer.
    HangUp,
}

struct Reader<F> {
    input: F,
    dispatcher: Dispatcher,
    events: ProbeSender,
    config: ChannelConfig,
    shutdown: Arc<AtomicBool>,
}

impl<F: AsFd + Read> Reader<F> {
    fn run(mut self) -> Dispatcher {
        let span = tracing::info_span!("melt_reader");
        let _entered = span.enter();
        tracing::info!(poll_interval = ?self.config.poll_interval, "reader started");

        let mut framer = LineFramer::new();
        let reason = self.read_loop(&mut framer);

        if let Some(rest) = framer.finish() {
            tracing::warn!(bytes = rest.len(), "discarding unterminated line");
        }
        match &reason {
            CloseReason::Error(message) => tracing::error!(%message, "reader stopped"),
            other => tracing::info!(reason = ?other, "reader stopped"),
        }
        if self.events.send(ProbeEvent::ChannelClosed { reason }).is_err() {
            tracing::debug!("event receiver gone before close notification");
        }

        let Self { input, dispatcher, .. } = self;
        drop(input);
        dispatcher
    }

    fn read_loop(&mut self, framer: &mut LineFramer) -> CloseReason {
        let mut chunk = vec![0u8; self.config.read_chunk.max(1)];

        loop {
            if self.shutdown.load(Ordering::Acquire) {
                return CloseReason::Shutdown;
            }

            match wait_readable(&self.input, self.config.poll_interval) {
                Ok(Readiness::Idle) => {},
                Ok(readiness) => match self.input.read(&mut chunk) {
                    Ok(0) => return CloseReason::EndOfStream,
                    Ok(n) => {
                        for line in framer.push(chunk.get(..n).unwrap_or_default()) {
                            if !self.forward(&line) {
                                return CloseReason::ReceiverDropped;
                            }
                        }
                    },
                    Err(e) => {
                        let err = ChannelError::from(e);
                        if err.is_transient() {
                            continue;
                        }
                        if readiness == Readiness::HangUp {
                            tracing::debug!(error = %err, "read after hang-up failed");
                            return CloseReason::HangUp;
                        }
                        return CloseReason::Error(err.to_string());
                    },
                },
                Err(e) if e.is_transient() => {},
                Err(e) => return CloseReason::Error(e.to_string()),
            }
        }
    }

    /// Dispatch one line and queue its events. Returns false if nobody listens.
    fn forward(&mut self, line: &str) -> bool {
        self.dispatcher
            .dispatch(line)
            .into_events()
            .into_iter()
            .all(|event| self.events.send(event).is_ok())
    }
}

const HANGUP: PollFlags = PollFlags::POLLHUP.union(PollFlags::POLLERR);

/// Wait up to `timeout` for the descriptor to become readable.
fn wait_readable(input: &impl AsFd, timeout: Duration) -> Result<Readiness, ChannelError> {
    let millis = u16::try_from(timeout.as_millis()).unwrap_or(u16::MAX);
    let mut fds = [PollFd::new(input.as_fd(), PollFlags::POLLIN)];

    match poll(&mut fds, PollTimeout::from(millis)) {
        Ok(0) | Err(Errno::EINTR) => Ok(Readiness::Idle),
        Ok(_) => {
            let revents = fds.first().and_then(|fd| fd.revents()).unwrap_or(PollFlags::empty());
            if revents.contains(PollFlags::POLLNVAL) {
                Err(ChannelError::Poll(Errno::EBADF))
            } else if revents.contains(PollFlags::POLLIN) {
                Ok(Readiness::Readable)
            } else if revents.intersects(HANGUP) {
                Ok(Readiness::HangUp)
            } else {
                Ok(Readiness::Idle)
            }
        },
        Err(e) => Err(ChannelError::Poll(e)),
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::{self, PipeReader, Write},
        os::{fd::BorrowedFd, unix::net::UnixStream},
    };

    use super::*;
    use crate::{DomainEvent, probe_queue};

    /// Pipe whose reads fail as if the peer reset the connection.
    struct ResetPeer(PipeReader);

    impl AsFd for ResetPeer {
        fn as_fd(&self) -> BorrowedFd<'_> {
            self.0.as_fd()
        }
    }

    impl Read for ResetPeer {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::ErrorKind::ConnectionReset.into())
        }
    }

    fn close_reason(rx: &mut crate::ProbeReceiver) -> CloseReason {
        while let Some(event) = rx.blocking_recv() {
            if let ProbeEvent::ChannelClosed { reason } = event {
                return reason;
            }
        }
        panic!("queue closed without a close notification");
    }

    #[test]
    fn idle_descriptor_times_out() {
        let (a, _b) = UnixStream::pair().unwrap();
        let readiness = wait_readable(&a, Duration::from_millis(10)).unwrap();
        assert_eq!(readiness, Readiness::Idle);
    }

    #[test]
    fn pending_bytes_are_readable() {
        let (a, mut b) = UnixStream::pair().unwrap();
        b.write_all(b"X\n").unwrap();
        assert_eq!(wait_readable(&a, Duration::from_millis(100)).unwrap(), Readiness::Readable);
    }

    #[test]
    fn closed_writer_is_not_idle() {
        let (reader, writer) = io::pipe().unwrap();
        drop(writer);
        let readiness = wait_readable(&reader, Duration::from_millis(100)).unwrap();
        assert_ne!(readiness, Readiness::Idle);
    }

    #[test]
    fn drained_pipe_ends_with_end_of_stream() {
        let (reader, writer) = io::pipe().unwrap();
        drop(writer);
        let (tx, mut rx) = probe_queue();
        let config = ChannelConfig { poll_interval: Duration::from_millis(10), read_chunk: 16 };

        let handle = ProbeChannel::spawn(reader, Dispatcher::new(), tx, config).unwrap();

        assert_eq!(close_reason(&mut rx), CloseReason::EndOfStream);
        assert!(handle.shutdown().is_some());
    }

    #[test]
    fn failed_read_after_hang_up_is_hang_up() {
        let (reader, writer) = io::pipe().unwrap();
        drop(writer);
        let (tx, mut rx) = probe_queue();
        let config = ChannelConfig { poll_interval: Duration::from_millis(10), read_chunk: 16 };

        let handle = ProbeChannel::spawn(ResetPeer(reader), Dispatcher::new(), tx, config).unwrap();

        assert_eq!(close_reason(&mut rx), CloseReason::HangUp);
        assert!(handle.shutdown().is_some());
    }

    #[test]
    fn shutdown_stops_silent_reader() {
        let (a, _b) = UnixStream::pair().unwrap();
        let (tx, mut rx) = probe_queue();
        let config = ChannelConfig { poll_interval: Duration::from_millis(10), read_chunk: 16 };

        let handle = ProbeChannel::spawn(a, Dispatcher::new(), tx, config).unwrap();
        let dispatcher = handle.shutdown().unwrap();

        assert_eq!(dispatcher.session().file_count(), 0);
        assert_eq!(
            rx.try_recv().unwrap(),
            ProbeEvent::ChannelClosed { reason: CloseReason::Shutdown }
        );
    }

    #[test]
    fn small_reads_still_frame_lines() {
        let (a, mut b) = UnixStream::pair().unwrap();
        let (tx, mut rx) = probe_queue();
        let config = ChannelConfig { poll_interval: Duration::from_millis(10), read_chunk: 3 };
        let handle = ProbeChannel::spawn(a, Dispatcher::new(), tx, config).unwrap();

        b.write_all(b"SHOWFILE_PCD x \"a.c\" y 3\n").unwrap();
        drop(b);

        let mut domain = Vec::new();
        while let Some(event) = rx.blocking_recv() {
            match event {
                ProbeEvent::Domain(e) => domain.push(e),
                ProbeEvent::ChannelClosed { .. } => break,
                ProbeEvent::Trace(_) | ProbeEvent::Unhandled(_) => {},
            }
        }

        assert_eq!(domain, vec![DomainEvent::ShowFile {
            file_id: 3,
            filename: "a.c".into(),
            newly_registered: true,
        }]);
        assert!(handle.shutdown().is_some());
    }
}
