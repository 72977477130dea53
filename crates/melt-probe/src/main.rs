//! MELT probe entry point.
//!
//! # Usage
//!
//! ```bash
//! # Started by the compiler plugin with two inherited pipes
//! melt-probe --command-from-melt 5 --request-to-melt 6 -T
//! ```

use clap::Parser;
use melt_app::{FsLoader, Runtime};
use melt_core::{Dispatcher, ProbeChannel, ReplyChannel, probe_queue};
use melt_probe::{Args, TerminalDriver, cli};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    cli::init_logging(&args)?;

    tracing::info!(
        command_fd = args.command_from_melt,
        request_fd = args.request_to_melt,
        trace = args.trace,
        "MELT probe starting"
    );

    let (input, output) = args.open_descriptors()?;
    let (events, receiver) = probe_queue();
    let reply = ReplyChannel::new(output, events.clone());
    let channel = ProbeChannel::spawn(input, Dispatcher::new(), events, args.channel_config())?;

    let driver = TerminalDriver::new()?;
    let result = Runtime::new(driver, args.app_config(), FsLoader, receiver, reply).run().await;

    if let Some(dispatcher) = channel.shutdown() {
        let session = dispatcher.session();
        tracing::info!(
            files = session.file_count(),
            marks = session.mark_count(),
            "probe session ended"
        );
    }

    Ok(result?)
}
