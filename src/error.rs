use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("projection service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config syntax: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum MonteCarloError {
    #[error("{requested} iterations is not one of the supported counts {allowed:?}")]
    UnsupportedIterations { requested: u32, allowed: Vec<u32> },

    #[error("no plan loaded")]
    NoPlan,

    #[error("simulation failed: {0}")]
    Service(#[from] ClientError),
}
