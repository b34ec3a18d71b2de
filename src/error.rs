//! Error types shared by the buffer, the coordinator and the workload runner.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Startup and wiring failures. Cancellation is not one of them; see [`Cancelled`].
#[derive(Error, Debug)]
pub enum Error {
    #[error("buffer capacity must be at least 1")]
    ZeroCapacity,

    #[error("target count must be at least 1")]
    ZeroTargetCount,

    #[error("producer count must be at least 1")]
    ZeroProducerCount,

    #[error("unknown log level '{0}' (expected off, error, warn, info, debug or trace)")]
    InvalidLogLevel(String),

    #[error("failed to read config file {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to spawn thread '{name}': {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("thread '{name}' panicked")]
    Panicked { name: String },
}

impl Error {
    pub fn spawn(name: impl Into<String>, source: io::Error) -> Self {
        Self::Spawn {
            name: name.into(),
            source,
        }
    }

    pub fn panicked(name: impl Into<String>) -> Self {
        Self::Panicked { name: name.into() }
    }
}

/// A blocking fetch was abandoned because its token was cancelled.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("operation cancelled while waiting on the buffer")]
pub struct Cancelled;

/// A blocking deposit was abandoned; the item is handed back untouched.
#[derive(PartialEq, Eq)]
pub struct DepositCancelled<T>(pub T);

impl<T> DepositCancelled<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for DepositCancelled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DepositCancelled(..)")
    }
}

impl<T> fmt::Display for DepositCancelled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("deposit cancelled while waiting for space")
    }
}

impl<T> std::error::Error for DepositCancelled<T> {}

impl<T> From<DepositCancelled<T>> for Cancelled {
    fn from(_: DepositCancelled<T>) -> Self {
        Cancelled
    }
}
