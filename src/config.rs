use crate::error::{Error, Result};
use crate::placement::Placement;
use crate::transport::{Source, DEFAULT_CHUNK_SIZE};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Lean,
    Json,
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "lean" => Ok(OutputFormat::Lean),
            "json" => Ok(OutputFormat::Json),
            other => Err(Error::Config(format!("unknown output format {:?}", other))),
        }
    }
}

/// Everything a run needs, independent of how it was parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub source: Source,
    pub placement: Placement,
    pub chunk_size: usize,
    pub output: OutputFormat,
    pub verbose: bool,
}

impl Config {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            placement: Placement::Inline,
            chunk_size: DEFAULT_CHUNK_SIZE,
            output: OutputFormat::Table,
            verbose: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::Config("chunk size must be at least one byte".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_defaults_to_streaming_inline() {
        let config = Config::new(Source::Stdin);
        assert_eq!(config.placement, Placement::Inline);
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn it_rejects_a_zero_chunk_size() {
        let mut config = Config::new(Source::Stdin);
        config.chunk_size = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn it_parses_output_formats() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("csv".parse::<OutputFormat>().is_err());
    }
}
