//! Where the pipeline runs.
//!
//! The same bytes give the same `ProcessedEvent`s whatever the placement;
//! only the caller's blocking behaviour and the memory profile change.

use crate::aggregator::{parse_line, EventAggregator};
use crate::decoder::Utf8StreamDecoder;
use crate::error::{Error, Result};
use crate::models::{ProcessedEvent, TypeLine};
use crate::normalizer::normalize;
use crate::session::ingest_reader;
use rayon::prelude::*;
use std::{
    fmt,
    io::Read,
    str::FromStr,
    sync::mpsc::{channel, Receiver, Sender},
    thread::{self, JoinHandle},
};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Read the whole payload into memory, then parse it.
    Buffered,
    /// Stream chunk by chunk on the calling thread.
    Inline,
    /// Stream chunk by chunk on a dedicated worker thread.
    Isolated,
}

impl FromStr for Placement {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "buffered" => Ok(Placement::Buffered),
            "inline" | "streaming" => Ok(Placement::Inline),
            "isolated" | "worker" => Ok(Placement::Isolated),
            other => Err(Error::Config(format!("unknown placement {:?}", other))),
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Placement::Buffered => "buffered",
            Placement::Inline => "inline",
            Placement::Isolated => "isolated",
        };
        f.write_str(name)
    }
}

/// Runs one session with the chosen placement. `open` is called once to
/// obtain the body (on the worker thread for [`Placement::Isolated`]).
pub fn run<F, R>(placement: Placement, open: F, chunk_size: usize) -> Result<Vec<ProcessedEvent>>
where
    F: Fn() -> Result<R> + Send + 'static,
    R: Read + 'static,
{
    info!(%placement, chunk_size, "starting session");
    match placement {
        Placement::Buffered => ingest_buffered(open()?),
        Placement::Inline => ingest_reader(open()?, chunk_size),
        Placement::Isolated => Worker::spawn(open, chunk_size)?.dispatch(),
    }
}

/// The load-everything variant. Lines are parsed in parallel but folded
/// in input order, so type order matches the streaming pipeline.
pub fn ingest_buffered<R: Read>(mut reader: R) -> Result<Vec<ProcessedEvent>> {
    let mut payload = Vec::new();
    reader.read_to_end(&mut payload)?;

    let mut decoder = Utf8StreamDecoder::new();
    let text = decoder.decode(&payload);
    decoder.flush();

    let lines: Vec<&str> = text
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .collect();
    let parsed: Vec<Option<TypeLine>> = lines.par_iter().map(|line| parse_line(line)).collect();

    let mut aggregator = EventAggregator::new();
    aggregator.add_bytes(payload.len());
    for outcome in parsed {
        aggregator.record_parsed(outcome);
    }
    let (counts, stats) = aggregator.into_parts();
    info!(
        lines = stats.lines,
        counted = stats.counted,
        skipped = stats.skipped,
        bytes = stats.bytes,
        types = counts.len(),
        "buffered ingestion finished"
    );
    Ok(normalize(&counts))
}

/// Sent to the worker. Starting a session takes no parameters: the worker
/// already knows how to open its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerRequest {
    Start,
}

/// Exactly one of these comes back per [`WorkerRequest::Start`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerResponse {
    Completed(Vec<ProcessedEvent>),
    Failed(String),
}

/// A pipeline living on its own thread, reachable only through messages.
///
/// `dispatch` borrows the worker mutably, so at most one request is in
/// flight. A worker that dies is not restarted: every later dispatch fails.
pub struct Worker {
    requests: Option<Sender<WorkerRequest>>,
    responses: Receiver<WorkerResponse>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    pub fn spawn<F, R>(open: F, chunk_size: usize) -> Result<Self>
    where
        F: Fn() -> Result<R> + Send + 'static,
        R: Read + 'static,
    {
        let (request_tx, request_rx) = channel();
        let (response_tx, response_rx) = channel();
        let handle = thread::Builder::new()
            .name("ndjson-worker".to_string())
            .spawn(move || serve(request_rx, response_tx, open, chunk_size))
            .map_err(|e| Error::Isolation(format!("could not start worker: {}", e)))?;
        Ok(Self {
            requests: Some(request_tx),
            responses: response_rx,
            handle: Some(handle),
        })
    }

    /// Asks the worker for one full session and waits for its answer.
    pub fn dispatch(&mut self) -> Result<Vec<ProcessedEvent>> {
        let sent = match &self.requests {
            Some(requests) => requests.send(WorkerRequest::Start).is_ok(),
            None => false,
        };
        if !sent {
            return Err(Error::Isolation("worker is not running".to_string()));
        }
        match self.responses.recv() {
            Ok(WorkerResponse::Completed(events)) => Ok(events),
            Ok(WorkerResponse::Failed(message)) => Err(Error::Remote(message)),
            Err(_) => {
                warn!("worker terminated before answering");
                Err(Error::Isolation("worker terminated unexpectedly".to_string()))
            }
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        // closing the request channel ends the worker loop
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                debug!("worker thread had panicked");
            }
        }
    }
}

fn serve<F, R>(
    requests: Receiver<WorkerRequest>,
    responses: Sender<WorkerResponse>,
    open: F,
    chunk_size: usize,
) where
    F: Fn() -> Result<R>,
    R: Read,
{
    for request in requests {
        match request {
            WorkerRequest::Start => {
                let response = match open().and_then(|body| ingest_reader(body, chunk_size)) {
                    Ok(events) => WorkerResponse::Completed(events),
                    Err(e) => WorkerResponse::Failed(e.to_string()),
                };
                if responses.send(response).is_err() {
                    break;
                }
            }
        }
    }
    debug!("worker loop finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const EVENTS: &[u8] = b"{\"type\":\"PushEvent\"}\nnot json\n{\"type\":\"IssuesEvent\"}\n\n{\"type\":\"PushEvent\"}";

    fn open_events() -> Result<Cursor<&'static [u8]>> {
        Ok(Cursor::new(EVENTS))
    }

    #[test]
    fn it_parses_placements() {
        assert_eq!("buffered".parse::<Placement>().unwrap(), Placement::Buffered);
        assert_eq!("Streaming".parse::<Placement>().unwrap(), Placement::Inline);
        assert_eq!("worker".parse::<Placement>().unwrap(), Placement::Isolated);
        assert!("gpu".parse::<Placement>().is_err());
    }

    #[test]
    fn it_gives_the_same_result_everywhere() {
        let expected = vec![
            ProcessedEvent::new("Push", 2),
            ProcessedEvent::new("Issues", 1),
        ];
        for placement in [Placement::Buffered, Placement::Inline, Placement::Isolated].iter() {
            let events = run(*placement, open_events, 3).unwrap();
            assert_eq!(events, expected, "{}", placement);
        }
    }

    #[test]
    fn it_serves_several_requests_from_one_worker() {
        let mut worker = Worker::spawn(open_events, 5).unwrap();
        let first = worker.dispatch().unwrap();
        let second = worker.dispatch().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn it_reports_a_failed_session() {
        let mut worker = Worker::spawn(
            || -> Result<Cursor<&'static [u8]>> { Err(Error::Status(404)) },
            8,
        )
        .unwrap();
        match worker.dispatch() {
            Err(Error::Remote(message)) => {
                assert_eq!(message, Error::Status(404).to_string())
            }
            other => panic!("unexpected {:?}", other),
        }
        // a failed session does not take the worker down
        match worker.dispatch() {
            Err(Error::Remote(message)) => assert!(message.contains("404")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn it_does_not_restart_a_dead_worker() {
        let mut worker = Worker::spawn(
            || -> Result<Cursor<&'static [u8]>> { panic!("worker blew up") },
            8,
        )
        .unwrap();
        assert!(matches!(worker.dispatch(), Err(Error::Isolation(_))));
        assert!(matches!(worker.dispatch(), Err(Error::Isolation(_))));
    }
}
