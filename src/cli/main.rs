use ndjson_tally::transport::DEFAULT_CHUNK_SIZE;
use ndjson_tally::{Config, LogNotifier, OutputFormat, Placement, Source};
use structopt::StructOpt;
use tracing::Level;

#[derive(StructOpt, PartialEq, Debug)]
#[structopt(
    name("🌇  NDJSON Tally"),
    long_about("🧰  Streams newline-delimited JSON events and counts them by type")
)]
pub struct Cli {
    /// File path, `-` for stdin, or an http(s) URL. Gzip is detected automatically
    #[structopt()]
    pub source: Source,
    /// Where the pipeline runs: buffered, inline or isolated
    #[structopt(short = "m", long, default_value = "inline")]
    pub placement: Placement,
    /// Bytes read per chunk [default: 64 KiB]
    #[structopt(short = "c", long)]
    pub chunk_size: Option<usize>,
    /// Output format: table, lean or json
    #[structopt(short = "o", long, default_value = "table")]
    pub output: OutputFormat,
    /// Log every chunk
    #[structopt(short = "v", long)]
    pub verbose: bool,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Config {
            source: cli.source,
            placement: cli.placement,
            chunk_size: cli.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE),
            output: cli.output,
            verbose: cli.verbose,
        }
    }
}

fn main() {
    let config: Config = Cli::from_args().into();

    let level = if config.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = ndjson_tally::start(&config, &LogNotifier) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
