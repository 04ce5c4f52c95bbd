use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::model::Channel;

// ---------------------------------------------------------------------------
// Plot options
// ---------------------------------------------------------------------------

/// What to extract and how to window it. Every flag defaults to off, so a
/// partial JSON document is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotOptions {
    /// Overlay the conductance trace.
    pub conductance: bool,
    /// Overlay the UV 260 nm trace.
    pub uv260: bool,
    /// Overlay % B.
    pub percent_b: bool,
    /// Annotate run-log entries.
    pub log: bool,
    /// Mark fractions from the instrument's own collector.
    pub fracs: bool,
    /// Mark fractions from the digital-in line of the auxiliary collector.
    pub cetac_fracs: bool,
    /// Restrict the window to the region where fractions were collected.
    pub only_fracs: bool,
    /// Start the window (and the UV trace) at the `Elution` log entry.
    pub only_elution: bool,
    /// Suppress the well labels derived from the digital line.
    pub hide_labels: bool,
    /// Mark the position of the UV maximum.
    pub uv_max: bool,
    /// Fixed upper y-axis limit.
    pub ylim: Option<i64>,
}

impl PlotOptions {
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).context("parsing plot options")
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading options file {}", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Channels the export must contain for these options. `UV 1_280` is
    /// always first.
    pub fn required_channels(&self) -> Vec<Channel> {
        let mut channels = vec![Channel::Uv280];
        let requested = [
            (self.uv260, Channel::Uv260),
            (self.conductance, Channel::Conductance),
            (self.percent_b, Channel::PercentB),
            (self.fracs, Channel::FractionMarks),
            (self.log || self.only_elution, Channel::RunLog),
            (self.cetac_fracs, Channel::DigitalIn1),
        ];
        channels.extend(requested.into_iter().filter(|(on, _)| *on).map(|(_, c)| c));
        channels
    }

    /// Whether well labels from the digital line should be placed.
    pub fn label_digital_events(&self) -> bool {
        self.cetac_fracs && !self.hide_labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let opts = PlotOptions::from_json_str(r#"{"fracs": true, "ylim": 600}"#).unwrap();
        assert!(opts.fracs);
        assert!(!opts.only_elution);
        assert_eq!(opts.ylim, Some(600));
    }

    #[test]
    fn unknown_types_are_rejected() {
        assert!(PlotOptions::from_json_str(r#"{"fracs": "yes"}"#).is_err());
    }

    #[test]
    fn required_channels_follow_flags() {
        assert_eq!(PlotOptions::default().required_channels(), vec![Channel::Uv280]);

        let opts = PlotOptions {
            conductance: true,
            only_elution: true,
            cetac_fracs: true,
            ..Default::default()
        };
        assert_eq!(
            opts.required_channels(),
            vec![
                Channel::Uv280,
                Channel::Conductance,
                Channel::RunLog,
                Channel::DigitalIn1
            ]
        );
    }

    #[test]
    fn hide_labels_only_matters_with_digital_fractions() {
        let opts = PlotOptions {
            cetac_fracs: true,
            hide_labels: true,
            ..Default::default()
        };
        assert!(!opts.label_digital_events());
        assert!(!PlotOptions::default().label_digital_events());
    }
}
