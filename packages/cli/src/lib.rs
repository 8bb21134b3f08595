//! # recordfetch-cli
//!
//! Command-line host for recordfetch. Reads newline-delimited JSON
//! documents, looks each one up in a Redis-compatible store, and writes
//! every document to its `success` or `failure` channel.

pub mod error;
pub mod stream;

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use recordfetch_core::{
    ConnectionConfig, Connector, FetcherConfig, KeyPath, RecordFetcher, DEFAULT_DB_INDEX,
    DEFAULT_PORT, DEFAULT_VALUE_ATTRIBUTE,
};
use recordfetch_redis::RedisConnector;

pub use error::CliError;
pub use stream::{process_stream, Envelope, Sinks, Summary};

/// recordfetch - route JSON documents by a key-store lookup
#[derive(Parser, Debug)]
#[command(name = "recordfetch")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Key-store host
    #[arg(long, env = "RECORDFETCH_HOST")]
    pub host: String,

    /// Key-store port
    #[arg(long, env = "RECORDFETCH_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Database index to select
    #[arg(long = "db", env = "RECORDFETCH_DB", default_value_t = DEFAULT_DB_INDEX)]
    pub db_index: u32,

    /// JSON pointer to the lookup key, e.g. /id
    #[arg(long, env = "RECORDFETCH_KEY_PATH")]
    pub key_path: KeyPath,

    /// Connect/read/write timeout in milliseconds
    #[arg(long, env = "RECORDFETCH_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Attribute receiving scalar values
    #[arg(long, env = "RECORDFETCH_VALUE_ATTRIBUTE", default_value = DEFAULT_VALUE_ATTRIBUTE)]
    pub value_attribute: String,

    /// Input file of newline-delimited documents (default: stdin)
    #[arg(long, short, env = "RECORDFETCH_INPUT")]
    pub input: Option<PathBuf>,

    /// Output file for the success channel (default: stdout)
    #[arg(long, env = "RECORDFETCH_SUCCESS")]
    pub success: Option<PathBuf>,

    /// Output file for the failure channel (default: stdout)
    #[arg(long, env = "RECORDFETCH_FAILURE")]
    pub failure: Option<PathBuf>,

    /// Log output format
    #[arg(long, env = "RECORDFETCH_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Args {
    pub fn fetcher_config(&self) -> FetcherConfig {
        let mut connection = ConnectionConfig::new(self.host.clone())
            .with_port(self.port)
            .with_db_index(self.db_index);
        if let Some(ms) = self.timeout_ms {
            connection = connection.with_timeout(Duration::from_millis(ms));
        }

        FetcherConfig::new(connection, self.key_path.clone())
            .with_value_attribute(self.value_attribute.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Install the global subscriber. Logs go to stderr; `RUST_LOG` overrides
/// the default `info` filter.
pub fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init(),
    }
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead>, CliError> {
    match path {
        Some(path) => {
            let file = File::open(path).map_err(|source| CliError::Open {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(io::stdin().lock())),
    }
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>, CliError> {
    match path {
        Some(path) => {
            let file = File::create(path).map_err(|source| CliError::Open {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout())),
    }
}

/// Process the configured input against a Redis-compatible store.
pub fn run(args: &Args) -> Result<Summary, CliError> {
    let fetcher = RecordFetcher::new(args.fetcher_config(), RedisConnector::new())?;
    run_with(&fetcher, args)
}

/// `run` with any connector.
pub fn run_with<C: Connector>(
    fetcher: &RecordFetcher<C>,
    args: &Args,
) -> Result<Summary, CliError> {
    let input = open_input(args.input.as_deref())?;
    let mut sinks = Sinks::new(
        open_output(args.success.as_deref())?,
        open_output(args.failure.as_deref())?,
    );

    let summary = process_stream(fetcher, input, &mut sinks)?;
    info!(
        processed = summary.processed,
        succeeded = summary.succeeded,
        failed = summary.failed,
        "finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use recordfetch_core::mock::MockConnector;
    use std::fs;

    fn parse(extra: &[&str]) -> Result<Args, clap::Error> {
        let mut argv = vec!["recordfetch", "--host", "localhost", "--key-path", "/id"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv)
    }

    #[test]
    fn defaults() {
        let args = parse(&[]).unwrap();
        let config = args.fetcher_config();

        assert_eq!(config.connection.port, 6379);
        assert_eq!(config.connection.db_index, 0);
        assert_eq!(config.connection.timeout, None);
        assert_eq!(config.value_attribute, "redis.value");
        assert_eq!(args.log_format, LogFormat::Text);
    }

    #[test]
    fn explicit_options() {
        let args = parse(&[
            "--port",
            "6390",
            "--db",
            "3",
            "--timeout-ms",
            "250",
            "--value-attribute",
            "lookup.value",
            "--log-format",
            "json",
        ])
        .unwrap();
        let config = args.fetcher_config();

        assert_eq!(config.connection.port, 6390);
        assert_eq!(config.connection.db_index, 3);
        assert_eq!(config.connection.timeout, Some(Duration::from_millis(250)));
        assert_eq!(config.value_attribute, "lookup.value");
        assert_eq!(args.log_format, LogFormat::Json);
    }

    #[test]
    fn rejects_relative_key_path() {
        let result = Args::try_parse_from(["recordfetch", "--host", "h", "--key-path", "id"]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_negative_db() {
        assert!(parse(&["--db", "-1"]).is_err());
    }

    #[test]
    fn run_with_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.ndjson");
        let success = dir.path().join("success.ndjson");
        let failure = dir.path().join("failure.ndjson");
        fs::write(&input, "{\"id\": \"user:42\"}\n{\"id\": \"user:99\"}\n").unwrap();

        let args = parse(&[
            "--input",
            input.to_str().unwrap(),
            "--success",
            success.to_str().unwrap(),
            "--failure",
            failure.to_str().unwrap(),
        ])
        .unwrap();

        let connector = MockConnector::new().with_string("user:42", "alice");
        let fetcher = RecordFetcher::new(args.fetcher_config(), &connector).unwrap();
        let summary = run_with(&fetcher, &args).unwrap();

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);

        let success: Envelope =
            serde_json::from_str(fs::read_to_string(&success).unwrap().trim()).unwrap();
        assert_eq!(
            success.attributes.get("redis.value").map(String::as_str),
            Some("alice")
        );

        let failure: Envelope =
            serde_json::from_str(fs::read_to_string(&failure).unwrap().trim()).unwrap();
        assert_eq!(failure.content, "{\"id\": \"user:99\"}");
    }

    #[test]
    fn missing_input_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.ndjson");
        let args = parse(&["--input", missing.to_str().unwrap()]).unwrap();

        let connector = MockConnector::new();
        let fetcher = RecordFetcher::new(args.fetcher_config(), &connector).unwrap();
        assert!(matches!(
            run_with(&fetcher, &args),
            Err(CliError::Open { .. })
        ));
    }

    #[test]
    fn invalid_config_is_an_error() {
        let args = parse(&["--port", "0"]).unwrap();
        assert!(matches!(run(&args), Err(CliError::Config(_))));
    }
}
