//! Where the bytes come from.
//!
//! The pipeline only ever sees a `Read`. Fetching, status checks and
//! decompression all happen here, before the first chunk is handed out.

use crate::error::{Error, Result};
use flate2::read::MultiGzDecoder;
use std::{
    fmt,
    fs::File,
    io::{self, BufRead, BufReader, ErrorKind, Read},
    path::PathBuf,
    str::FromStr,
};
use tracing::{debug, info};

pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

pub type BoxedBody = Box<dyn Read + Send>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Stdin,
    File(PathBuf),
    Url(String),
}

impl FromStr for Source {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::Config("empty source".to_string()));
        }
        if s == "-" {
            Ok(Source::Stdin)
        } else if s.starts_with("http://") || s.starts_with("https://") {
            Ok(Source::Url(s.to_string()))
        } else {
            Ok(Source::File(PathBuf::from(s)))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Stdin => write!(f, "<stdin>"),
            Source::File(path) => write!(f, "{}", path.display()),
            Source::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Opens the body behind `source`, transparently un-gzipping it.
pub fn open_source(source: &Source) -> Result<BoxedBody> {
    info!(%source, "opening source");
    let body: BoxedBody = match source {
        Source::Stdin => Box::new(io::stdin()),
        Source::File(path) => Box::new(File::open(path).map_err(|e| {
            Error::Transport(format!("Error trying to open the file {:?}: {}", path, e))
        })?),
        Source::Url(url) => fetch(url)?,
    };
    maybe_gunzip(body)
}

fn fetch(url: &str) -> Result<BoxedBody> {
    let response = reqwest::blocking::Client::new().get(url).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Status(status.as_u16()));
    }
    debug!(%url, status = status.as_u16(), "response received");
    Ok(Box::new(response))
}

/// Wraps `body` in a gzip decoder when it starts with the gzip magic.
pub fn maybe_gunzip(body: BoxedBody) -> Result<BoxedBody> {
    let mut reader = BufReader::new(body);
    let is_gzip = reader.fill_buf()?.starts_with(&GZIP_MAGIC);
    if is_gzip {
        debug!("gzip payload detected");
        Ok(Box::new(MultiGzDecoder::new(reader)))
    } else {
        Ok(Box::new(reader))
    }
}

/// Splits a `Read` into owned chunks of at most `chunk_size` bytes.
pub struct ChunkReader<R> {
    inner: R,
    chunk_size: usize,
    done: bool,
}

impl<R: Read> ChunkReader<R> {
    pub fn new(inner: R, chunk_size: usize) -> Self {
        Self {
            inner,
            chunk_size: chunk_size.max(1),
            done: false,
        }
    }
}

impl<R: Read> Iterator for ChunkReader<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut chunk = vec![0; self.chunk_size];
        loop {
            match self.inner.read(&mut chunk) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(read) => {
                    chunk.truncate(read);
                    return Some(Ok(chunk));
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
