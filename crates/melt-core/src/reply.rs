//! Outbound requests to the compiler.
//!
//! [`ReplyChannel`] is the single entry point for writes to the request
//! descriptor. Clones share one writer behind a mutex, so the presentation
//! task can send while the reader thread is polling the other pipe.
//!
//! Every request is traced on the probe event queue before its bytes are
//! written, under the same lock, so the trace order matches the wire order.

use std::{
    io::Write,
    sync::{Arc, Mutex},
};

use melt_proto::Request;

use crate::{ProbeEvent, ProbeSender, ReplyError, TraceEvent};

/// Serialized writer for outbound requests.
pub struct ReplyChannel<W> {
    writer: Arc<Mutex<W>>,
    trace: ProbeSender,
}

impl<W> Clone for ReplyChannel<W> {
    fn clone(&self) -> Self {
        Self { writer: Arc::clone(&self.writer), trace: self.trace.clone() }
    }
}

impl<W> std::fmt::Debug for ReplyChannel<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplyChannel").finish_non_exhaustive()
    }
}

impl<W: Write + Send> ReplyChannel<W> {
    /// Wrap the request descriptor. Trace records go to `trace`.
    pub fn new(writer: W, trace: ProbeSender) -> Self {
        Self { writer: Arc::new(Mutex::new(writer)), trace }
    }

    /// Send `INFOLOCATION_prq <mark_id>`.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// - `ReplyError::Io` if the write or flush fails
    /// - `ReplyError::Poisoned` if a previous writer panicked
    pub fn send_info_location_request(&self, mark_id: u64) -> Result<usize, ReplyError> {
        self.send(Request::InfoLocation { mark_id })
    }

    /// Trace and write one request.
    ///
    /// # Errors
    ///
    /// See [`ReplyChannel::send_info_location_request`].
    pub fn send(&self, request: Request) -> Result<usize, ReplyError> {
        let bytes = request.encode();
        let text = request.text();

        let mut writer = self.writer.lock().map_err(|_| ReplyError::Poisoned)?;

        if self.trace.send(ProbeEvent::Trace(TraceEvent::Request { text: text.clone() })).is_err() {
            tracing::debug!(%text, "trace receiver gone");
        }

        writer.write_all(&bytes)?;
        writer.flush()?;

        tracing::info!(%text, bytes = bytes.len(), "request sent");
        Ok(bytes.len())
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::probe_queue;

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn writes_exact_wire_bytes_and_traces() {
        let (tx, mut rx) = probe_queue();
        let channel = ReplyChannel::new(Vec::new(), tx);

        let written = channel.send_info_location_request(7).unwrap();
        assert_eq!(written, 20);

        let wire = channel.writer.lock().unwrap().clone();
        assert_eq!(wire, b"INFOLOCATION_prq 7\n\n");
        assert_eq!(
            rx.try_recv().unwrap(),
            ProbeEvent::Trace(TraceEvent::Request { text: "INFOLOCATION_prq 7".into() })
        );
    }

    #[test]
    fn clones_share_one_writer() {
        let (tx, _rx) = probe_queue();
        let channel = ReplyChannel::new(Vec::new(), tx);
        let other = channel.clone();

        channel.send_info_location_request(1).unwrap();
        other.send_info_location_request(2).unwrap();

        let wire = channel.writer.lock().unwrap().clone();
        assert_eq!(wire, b"INFOLOCATION_prq 1\n\nINFOLOCATION_prq 2\n\n");
    }

    #[test]
    fn write_failure_is_returned_after_trace() {
        let (tx, mut rx) = probe_queue();
        let channel = ReplyChannel::new(FailingWriter, tx);

        let result = channel.send_info_location_request(3);
        assert!(matches!(result, Err(ReplyError::Io(_))));
        assert!(matches!(rx.try_recv(), Ok(ProbeEvent::Trace(TraceEvent::Request { .. }))));
    }

    #[test]
    fn send_without_trace_receiver_still_writes() {
        let (tx, rx) = probe_queue();
        drop(rx);
        let channel = ReplyChannel::new(Vec::new(), tx);

        assert_eq!(channel.send_info_location_request(12).unwrap(), 21);
    }
}
