//! Streaming NDJSON event counting.
//!
//! Bytes go through an incremental UTF-8 decoder, a line reassembler and an
//! aggregator that counts records per `type`; the counts are then turned
//! into display rows. The pipeline can run buffered, streamed on the
//! calling thread, or streamed on a worker thread.

pub mod aggregator;
pub mod config;
pub mod decoder;
pub mod error;
pub mod models;
pub mod normalizer;
pub mod notify;
pub mod placement;
pub mod printer;
pub mod reassembler;
pub mod session;
pub mod transport;

pub use config::{Config, OutputFormat};
pub use error::{Error, Result};
pub use models::{ProcessedEvent, TypeCountMap};
pub use notify::{LogNotifier, Notifier, ProcessingIndicator, Severity};
pub use placement::Placement;
pub use session::{ingest_reader, IngestSession};
pub use transport::Source;

use std::io::{self, Write};
use std::time::Instant;
use tracing::info;

/// Runs one session as described by `config`, reports it through
/// `notifier`, and prints the rows to stdout.
pub fn start(config: &Config, notifier: &dyn Notifier) -> Result<Vec<ProcessedEvent>> {
    config.validate()?;
    let init = Instant::now();
    let indicator = ProcessingIndicator::new();
    let source = config.source.clone();
    let events = notify::process_and_notify(&indicator, notifier, || {
        placement::run(
            config.placement,
            move || transport::open_source(&source),
            config.chunk_size,
        )
    })?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    printer::print_events(config.output, &events, &mut out)?;
    out.flush()?;
    info!(elapsed_us = init.elapsed().as_micros() as u64, "done");
    Ok(events)
}
