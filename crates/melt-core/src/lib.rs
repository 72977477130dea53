//! MELT probe core
//!
//! Owns everything between the two pipes of a probe session and the
//! presentation layer:
//!
//! - [`SessionState`]: files and marks announced by the compiler
//! - [`Dispatcher`]: turns framed lines into [`ProbeEvent`]s
//! - [`ReplyChannel`]: serialized writer for outbound requests
//! - [`ProbeChannel`]: background reader thread for the command descriptor
//!
//! The dispatcher and its session state are owned by exactly one thread (the
//! reader), so neither needs locking. Everything the presentation task sees
//! arrives through an ordered mpsc queue of [`ProbeEvent`]s.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod channel;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod reply;
pub mod session;

pub use channel::{ChannelConfig, ChannelHandle, ProbeChannel};
pub use dispatcher::{Dispatch, Dispatcher, Outcome};
pub use error::{ChannelError, DispatchError, ReplyError};
pub use event::{
    CloseReason, DomainEvent, ProbeEvent, ProbeReceiver, ProbeSender, TraceEvent, UnhandledEvent,
    UnhandledReason, probe_queue,
};
pub use reply::ReplyChannel;
pub use session::{FileRecord, MarkRecord, SessionState};
