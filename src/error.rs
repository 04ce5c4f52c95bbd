use std::path::PathBuf;

use thiserror::Error;

/// Everything that can abort the processing of one export file.
#[derive(Debug, Error)]
pub enum TraceError {
    /// A mandatory or explicitly requested channel is not in the export.
    #[error("no '{channel}' column in the export")]
    MissingChannel { channel: String },

    /// A channel header was found but its payload is unusable.
    #[error("malformed '{channel}' column: {reason}")]
    MalformedChannel { channel: String, reason: String },

    /// A run-log label (e.g. `Elution`) never occurs in the log.
    #[error("run log has no '{label}' entry")]
    LabelNotFound { label: String },

    /// The digital-in trace could not be turned into collection events.
    #[error("something went wrong parsing the digital data: {reason}")]
    DigitalSignal { reason: String },

    /// The file is missing, unreadable or not decodable text.
    #[error("could not read {path}: {reason}")]
    FileUnreadable { path: PathBuf, reason: String },

    /// The resolved x-window is inverted.
    #[error("empty x-window: min {min} is past max {max}")]
    EmptyWindow { min: f64, max: f64 },
}

impl TraceError {
    pub(crate) fn missing(channel: impl Into<String>) -> Self {
        Self::MissingChannel {
            channel: channel.into(),
        }
    }

    pub(crate) fn malformed(channel: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedChannel {
            channel: channel.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn digital(reason: impl Into<String>) -> Self {
        Self::DigitalSignal {
            reason: reason.into(),
        }
    }
}

/// Result alias for the parsing and labeling engine.
pub type Result<T> = std::result::Result<T, TraceError>;

/// Failure of a single file in [`crate::pipeline`].
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error(transparent)]
    Trace(#[from] TraceError),

    #[error("rendering failed: {0:#}")]
    Render(anyhow::Error),
}
