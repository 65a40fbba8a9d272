//! Error types for chatnav
//!
//! Expected boundary conditions (unsupported page, empty transcript, cursor at
//! an edge) are not errors and never show up here. This enum only covers I/O,
//! malformed input and command delivery.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading snapshots, settings or delivering commands.
#[derive(Error, Debug)]
pub enum Error {
    /// Reading a snapshot or settings file failed.
    #[error("cannot read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing the settings file failed.
    #[error("cannot write '{path}': {source}")]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Page URL could not be parsed into a page identity.
    #[error("invalid page url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Settings file is not valid TOML or has the wrong shape.
    #[error("invalid settings in '{path}': {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Settings could not be serialized.
    #[error("cannot serialize settings: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// A duration string (e.g. `500ms`) did not parse.
    #[error("invalid duration '{value}': {source}")]
    InvalidDuration {
        value: String,
        #[source]
        source: humantime::DurationError,
    },

    /// A command could not be handed to the content side.
    ///
    /// Logged and dropped by callers; commands are never retried.
    #[error("command delivery failed: {0}")]
    Delivery(String),

    /// A command payload on the wire was not valid JSON or had an unknown type tag.
    #[error("malformed command payload: {0}")]
    Wire(#[from] serde_json::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
