//! Command-line configuration.
//!
//! The defaults reproduce the fixed setup of the service (`127.0.0.1:8080`,
//! 1024-byte reads), so running the binary with no arguments is the normal
//! case. Flags only override those values.

use crate::listener::BackoffConfig;
use crate::{DEFAULT_BUFFER_CAPACITY, DEFAULT_HOST, DEFAULT_PORT};
use thiserror::Error;

/// Errors produced while parsing command-line arguments.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} requires a value")]
    MissingValue(String),

    #[error("invalid port number: {0}")]
    InvalidPort(String),

    #[error("invalid buffer size: {0} (must be a positive integer)")]
    InvalidBufferSize(String),

    #[error("unknown argument: {0}")]
    UnknownArgument(String),
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Maximum bytes read from each connection
    pub buffer_capacity: usize,
    /// Pause schedule after failed accepts
    pub backoff: BackoffConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            backoff: BackoffConfig::default(),
        }
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Run(Config),
    Help,
    Version,
}

impl Config {
    /// Returns the bind address as a string
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parses the process arguments.
    pub fn from_args() -> Result<Invocation, ConfigError> {
        Self::parse(std::env::args().skip(1))
    }

    /// Parses arguments, excluding the program name.
    pub fn parse<I, S>(args: I) -> Result<Invocation, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut config = Config::default();
        let mut args = args.into_iter().map(Into::into);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--host" | "-h" => {
                    config.host = args.next().ok_or_else(|| ConfigError::MissingValue(arg))?;
                }
                "--port" | "-p" => {
                    let value = args.next().ok_or_else(|| ConfigError::MissingValue(arg))?;
                    config.port = value.parse().map_err(|_| ConfigError::InvalidPort(value))?;
                }
                "--buffer-size" | "-b" => {
                    let value = args.next().ok_or_else(|| ConfigError::MissingValue(arg))?;
                    config.buffer_capacity = match value.parse::<usize>() {
                        Ok(n) if n > 0 => n,
                        _ => return Err(ConfigError::InvalidBufferSize(value)),
                    };
                }
                "--help" => return Ok(Invocation::Help),
                "--version" | "-v" => return Ok(Invocation::Version),
                _ => return Err(ConfigError::UnknownArgument(arg)),
            }
        }

        Ok(Invocation::Run(config))
    }
}

/// Usage text printed for `--help`.
pub const HELP: &str = r#"
tapline - a serial, receive-only TCP listener

Accepts one connection at a time, reads it once (up to the buffer size),
prints the client's address and the text it sent, then closes it.

USAGE:
    tapline [OPTIONS]

OPTIONS:
    -h, --host <HOST>          Host to bind to (default: 127.0.0.1)
    -p, --port <PORT>          Port to listen on (default: 8080)
    -b, --buffer-size <BYTES>  Bytes read per connection (default: 1024)
    -v, --version              Print version information
        --help                 Print this help message

LOGGING:
    Diagnostics go to stderr; set RUST_LOG (e.g. RUST_LOG=debug) to adjust.

EXAMPLE:
    $ tapline &
    $ printf hello | nc 127.0.0.1 8080
"#;
