use super::model::{Channel, ChannelSet, RunLogEntry};
use crate::error::{Result, TraceError};

/// Label of the run-log entry that opens the elution phase.
pub const ELUTION: &str = "Elution";

/// The instrument run log, in the order it was written.
#[derive(Debug, Clone, Copy)]
pub struct RunLog<'a> {
    entries: &'a [RunLogEntry],
}

impl<'a> RunLog<'a> {
    pub fn new(entries: &'a [RunLogEntry]) -> Self {
        Self { entries }
    }

    /// The `Run Log` channel of a parsed export, if present.
    pub fn from_channels(channels: &'a ChannelSet) -> Option<Self> {
        channels.markers(Channel::RunLog).map(Self::new)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a RunLogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Position of the first entry whose label is exactly `label`.
    pub fn position_of(&self, label: &str) -> Result<f64> {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.position)
            .ok_or_else(|| TraceError::LabelNotFound {
                label: label.to_string(),
            })
    }

    pub fn elution_start(&self) -> Result<f64> {
        self.position_of(ELUTION)
    }
}
