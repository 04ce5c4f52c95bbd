use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Result, TraceError};

// ---------------------------------------------------------------------------
// Channel – the recognised measurement streams
// ---------------------------------------------------------------------------

/// One of the channels an ÄKTA export may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    Uv280,
    Uv260,
    Conductance,
    PercentB,
    FractionMarks,
    RunLog,
    DigitalIn1,
}

impl Channel {
    pub const ALL: [Channel; 7] = [
        Channel::Uv280,
        Channel::Uv260,
        Channel::Conductance,
        Channel::PercentB,
        Channel::FractionMarks,
        Channel::RunLog,
        Channel::DigitalIn1,
    ];

    /// Header text identifying the channel in the export.
    pub fn header(self) -> &'static str {
        match self {
            Channel::Uv280 => "UV 1_280",
            Channel::Uv260 => "UV 2_260",
            Channel::Conductance => "Cond",
            Channel::PercentB => "Conc B",
            Channel::FractionMarks => "Fraction",
            Channel::RunLog => "Run Log",
            Channel::DigitalIn1 => "Digital in 1",
        }
    }

    /// Exact-match lookup of a header cell.
    pub fn from_header(cell: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.header() == cell)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

// ---------------------------------------------------------------------------
// Trace / Marker – channel payloads
// ---------------------------------------------------------------------------

/// A numeric channel: volume axis (x) and measurement (y).
///
/// Only [`Trace::new`] builds one, so a trace is never empty and its x-axis
/// is strictly increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    channel: Channel,
    x: Vec<f64>,
    y: Vec<f64>,
}

impl Trace {
    pub fn new(channel: Channel, x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        if x.len() != y.len() {
            return Err(TraceError::malformed(
                channel.header(),
                format!("x has {} values but y has {}", x.len(), y.len()),
            ));
        }
        if x.is_empty() {
            return Err(TraceError::malformed(channel.header(), "no data points"));
        }
        let unordered = x
            .windows(2)
            .position(|w| w[1].partial_cmp(&w[0]) != Some(Ordering::Greater));
        if let Some(j) = unordered {
            return Err(TraceError::malformed(
                channel.header(),
                format!("x is not increasing at value {}: {} then {}", j + 1, x[j], x[j + 1]),
            ));
        }
        Ok(Self { channel, x, y })
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Volume axis in mL.
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Measurement, same length as [`Trace::x`].
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn first_x(&self) -> f64 {
        self.x[0]
    }

    pub fn last_x(&self) -> f64 {
        self.x[self.x.len() - 1]
    }

    /// Index of the first point whose x is at or past `lower`.
    pub fn index_at_or_after(&self, lower: f64) -> usize {
        self.x.partition_point(|&v| v < lower)
    }

    /// Copy of the trace starting at the first x ≥ `lower`.
    ///
    /// When every point lies before `lower` the last point is kept so the
    /// result is never empty.
    pub fn crop_from(&self, lower: f64) -> Trace {
        let idx = self.index_at_or_after(lower).min(self.x.len() - 1);
        Trace {
            channel: self.channel,
            x: self.x[idx..].to_vec(),
            y: self.y[idx..].to_vec(),
        }
    }

    /// Position and value of the first maximum of y.
    pub fn max_point(&self) -> Option<(f64, f64)> {
        let mut best: Option<(f64, f64)> = None;
        for (&x, &y) in self.x.iter().zip(&self.y) {
            match best {
                Some((_, by)) if y <= by => {}
                _ if y.is_nan() => {}
                _ => best = Some((x, y)),
            }
        }
        best
    }
}

/// A labelled position: run-log entry or collected fraction.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub position: f64,
    pub label: String,
}

pub type RunLogEntry = Marker;
pub type FractionMarker = Marker;

/// The `Digital in 1` cells as found in the export, left unchecked until
/// fraction events are asked for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DigitalBlock {
    positions: Vec<String>,
    samples: Vec<String>,
}

impl DigitalBlock {
    pub fn new(positions: Vec<String>, samples: Vec<String>) -> Self {
        Self { positions, samples }
    }

    pub fn positions(&self) -> &[String] {
        &self.positions
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }
}

/// Payload of one present channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelData {
    Numeric(Trace),
    Markers(Vec<Marker>),
    Digital(DigitalBlock),
}

// ---------------------------------------------------------------------------
// ChannelSet – the parsed export
// ---------------------------------------------------------------------------

/// Every channel recovered from one export. A channel that is not in the map
/// was not in the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelSet {
    channels: BTreeMap<Channel, ChannelData>,
}

impl ChannelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a channel, returning the payload it replaced.
    pub fn insert(&mut self, channel: Channel, data: ChannelData) -> Option<ChannelData> {
        self.channels.insert(channel, data)
    }

    pub fn contains(&self, channel: Channel) -> bool {
        self.channels.contains_key(&channel)
    }

    pub fn trace(&self, channel: Channel) -> Option<&Trace> {
        match self.channels.get(&channel) {
            Some(ChannelData::Numeric(t)) => Some(t),
            _ => None,
        }
    }

    pub fn markers(&self, channel: Channel) -> Option<&[Marker]> {
        match self.channels.get(&channel) {
            Some(ChannelData::Markers(m)) => Some(m),
            _ => None,
        }
    }

    pub fn digital(&self) -> Option<&DigitalBlock> {
        match self.channels.get(&Channel::DigitalIn1) {
            Some(ChannelData::Digital(d)) => Some(d),
            _ => None,
        }
    }

    /// Like [`ChannelSet::trace`] but a missing channel is an error.
    pub fn require_trace(&self, channel: Channel) -> Result<&Trace> {
        self.trace(channel)
            .ok_or_else(|| TraceError::missing(channel.header()))
    }

    pub fn require_markers(&self, channel: Channel) -> Result<&[Marker]> {
        self.markers(channel)
            .ok_or_else(|| TraceError::missing(channel.header()))
    }

    pub fn require_digital(&self) -> Result<&DigitalBlock> {
        self.digital()
            .ok_or_else(|| TraceError::missing(Channel::DigitalIn1.header()))
    }

    /// Channels present, in canonical order.
    pub fn present(&self) -> impl Iterator<Item = Channel> + '_ {
        self.channels.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
