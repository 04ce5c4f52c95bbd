//! Fraction events from the auxiliary collector's digital-in line.
//!
//! The line is high while a vial fills and low while the collector moves on.
//! Every falling edge closes one fraction and takes the next plate well; the
//! fraction boundary drawn on the chart sits halfway between that falling
//! edge and the following rising edge.

use log::debug;

use crate::data::model::{Channel, DigitalBlock, Trace};
use crate::error::{Result, TraceError};
use crate::wells::{self, PLATE_CAPACITY};

/// One collected fraction.
#[derive(Debug, Clone, PartialEq)]
pub struct DigitalEvent {
    /// 0-based, contiguous.
    pub index: usize,
    pub well: &'static str,
    /// Position of the falling edge that closed the fraction.
    pub fall: f64,
    /// Midpoint between `fall` and the next rising edge. Only the last event
    /// of a scan can lack one.
    pub anchor: Option<f64>,
}

/// How the scan over the digital trace ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScanEnd {
    /// Trace ended low with every event anchored.
    Idle,
    /// Trace ended low after a falling edge with no rising edge after it;
    /// the last event has no anchor.
    PendingAnchor,
    /// Trace ended high. The pulse that started at `since` never closed and
    /// produced no event.
    OpenPulse { since: f64 },
    /// All plate wells were used; remaining samples were not scanned.
    PlateFull,
}

#[derive(Debug, Clone, Copy)]
enum State {
    Idle,
    InPulse { since: f64 },
    AwaitingAnchor { fall: f64 },
}

/// Result of labeling one digital trace.
#[derive(Debug, Clone, PartialEq)]
pub struct EventLabeling {
    events: Vec<DigitalEvent>,
    end: ScanEnd,
}

impl EventLabeling {
    pub fn events(&self) -> &[DigitalEvent] {
        &self.events
    }

    pub fn end(&self) -> ScanEnd {
        self.end
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Anchor positions in emission order.
    pub fn anchors(&self) -> Vec<f64> {
        self.events.iter().filter_map(|e| e.anchor).collect()
    }

    /// Well labels in emission order. May be one longer than [`Self::anchors`].
    pub fn wells(&self) -> Vec<&'static str> {
        self.events.iter().map(|e| e.well).collect()
    }

    /// Midpoints of consecutive anchors, used to place well labels.
    pub fn label_midpoints(&self) -> Vec<f64> {
        self.anchors().windows(2).map(|w| (w[0] + w[1]) / 2.0).collect()
    }

    /// The trailing event without an anchor, if the scan left one.
    pub fn unanchored(&self) -> Option<&DigitalEvent> {
        self.events.last().filter(|e| e.anchor.is_none())
    }

    pub fn first_anchor(&self) -> Option<f64> {
        self.anchors().into_iter().reduce(f64::min)
    }

    pub fn last_anchor(&self) -> Option<f64> {
        self.anchors().into_iter().reduce(f64::max)
    }
}

/// Check a raw `Digital in 1` block and turn it into a trace.
///
/// Every defect of the block is reported as [`TraceError::DigitalSignal`].
pub fn digital_trace(block: &DigitalBlock) -> Result<Trace> {
    let positions = parse_cells(block.positions())?;
    let samples = parse_cells(block.samples())?;
    if positions.is_empty() || samples.is_empty() {
        return Err(TraceError::digital("digital trace is empty"));
    }
    if positions.len() != samples.len() {
        return Err(TraceError::digital(format!(
            "{} positions but {} samples",
            positions.len(),
            samples.len()
        )));
    }
    Trace::new(Channel::DigitalIn1, positions, samples)
        .map_err(|e| TraceError::digital(e.to_string()))
}

fn parse_cells(cells: &[String]) -> Result<Vec<f64>> {
    cells
        .iter()
        .map(|cell| {
            cell.parse::<f64>()
                .map_err(|_| TraceError::digital(format!("'{cell}' is not a number")))
        })
        .collect()
}

/// Label the fractions recorded on a `Digital in 1` trace.
pub fn label_events(trace: &Trace) -> Result<EventLabeling> {
    label_signal(trace.x(), trace.y())
}

/// Label fractions from paired positions and 0/1 samples.
///
/// Samples other than exactly 0 or 1 leave the state unchanged.
pub fn label_signal(positions: &[f64], signal: &[f64]) -> Result<EventLabeling> {
    if positions.is_empty() || signal.is_empty() {
        return Err(TraceError::digital("digital trace is empty"));
    }
    if positions.len() != signal.len() {
        return Err(TraceError::digital(format!(
            "{} positions but {} samples",
            positions.len(),
            signal.len()
        )));
    }

    let mut events: Vec<DigitalEvent> = Vec::new();
    let mut state = State::Idle;

    for (&x, &s) in positions.iter().zip(signal) {
        let high = s == 1.0;
        let low = s == 0.0;

        state = match state {
            State::Idle if high => State::InPulse { since: x },
            State::AwaitingAnchor { fall } if high => {
                if let Some(last) = events.last_mut() {
                    last.anchor = Some((fall + x) / 2.0);
                }
                State::InPulse { since: x }
            }
            State::InPulse { .. } if low => {
                let index = events.len();
                let Some(well) = wells::well(index) else {
                    break;
                };
                events.push(DigitalEvent {
                    index,
                    well,
                    fall: x,
                    anchor: None,
                });
                if events.len() == PLATE_CAPACITY {
                    debug!("plate full after {PLATE_CAPACITY} fractions at {x}");
                    return Ok(EventLabeling {
                        events,
                        end: ScanEnd::PlateFull,
                    });
                }
                State::AwaitingAnchor { fall: x }
            }
            unchanged => unchanged,
        };
    }

    let end = match state {
        State::Idle => ScanEnd::Idle,
        State::InPulse { since } => ScanEnd::OpenPulse { since },
        State::AwaitingAnchor { .. } => ScanEnd::PendingAnchor,
    };
    debug!("{} digital fractions, scan ended {end:?}", events.len());
    Ok(EventLabeling { events, end })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn positions(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64).collect()
    }

    /// `k` pulses of width 2 separated by gaps of width 2, starting low.
    fn pulses(k: usize) -> Vec<f64> {
        let mut s = vec![0.0, 0.0];
        for _ in 0..k {
            s.extend([1.0, 1.0, 0.0, 0.0]);
        }
        s
    }

    #[test]
    fn two_pulses_give_two_events() {
        let signal = [1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0];
        let labeling = label_signal(&positions(7), &signal).unwrap();

        assert_eq!(labeling.wells(), vec!["A2", "A3"]);
        assert_eq!(labeling.anchors(), vec![3.0]);
        assert_eq!(labeling.events()[1].fall, 6.0);
        assert_eq!(labeling.end(), ScanEnd::PendingAnchor);
        assert_eq!(labeling.unanchored().map(|e| e.well), Some("A3"));
    }

    #[test]
    fn trailing_rise_anchors_last_event() {
        let signal = [1.0, 0.0, 1.0, 0.0, 1.0];
        let labeling = label_signal(&positions(5), &signal).unwrap();

        assert_eq!(labeling.anchors(), vec![1.5, 3.5]);
        assert_eq!(labeling.label_midpoints(), vec![2.5]);
        assert!(labeling.unanchored().is_none());
        assert_eq!(labeling.end(), ScanEnd::OpenPulse { since: 4.0 });
    }

    #[test]
    fn low_signal_yields_nothing() {
        let labeling = label_signal(&positions(4), &[0.0; 4]).unwrap();
        assert!(labeling.is_empty());
        assert_eq!(labeling.end(), ScanEnd::Idle);
        assert!(labeling.label_midpoints().is_empty());
    }

    #[test]
    fn non_binary_samples_are_ignored() {
        let signal = [1.0, 0.5, 1.0, 0.0];
        let labeling = label_signal(&positions(4), &signal).unwrap();
        assert_eq!(labeling.len(), 1);
        assert_eq!(labeling.events()[0].fall, 3.0);
    }

    #[test]
    fn stops_when_plate_is_full() {
        let signal = pulses(120);
        let labeling = label_signal(&positions(signal.len()), &signal).unwrap();

        assert_eq!(labeling.len(), PLATE_CAPACITY);
        assert_eq!(labeling.end(), ScanEnd::PlateFull);
        assert_eq!(labeling.wells().last(), Some(&"H12"));
        // the last well never sees the next rising edge
        assert_eq!(labeling.anchors().len(), PLATE_CAPACITY - 1);
    }

    #[test]
    fn rejects_empty_and_ragged_input() {
        assert!(matches!(
            label_signal(&[], &[]),
            Err(TraceError::DigitalSignal { .. })
        ));
        assert!(matches!(
            label_signal(&[0.0, 1.0], &[1.0]),
            Err(TraceError::DigitalSignal { .. })
        ));
    }

    #[test]
    fn anchor_bounds() {
        let signal = pulses(3);
        let labeling = label_signal(&positions(signal.len()), &signal).unwrap();
        // falls at 4, 8, 12; rises at 6, 10
        assert_eq!(labeling.anchors(), vec![5.0, 9.0]);
        assert_eq!(labeling.first_anchor(), Some(5.0));
        assert_eq!(labeling.last_anchor(), Some(9.0));
    }

    fn block(positions: &[&str], samples: &[&str]) -> DigitalBlock {
        DigitalBlock::new(
            positions.iter().map(|s| s.to_string()).collect(),
            samples.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn digital_block_becomes_a_trace() {
        let trace = digital_trace(&block(&["0.5", "1.0", "1.5"], &["0", "1", "0"])).unwrap();
        assert_eq!(trace.channel(), Channel::DigitalIn1);
        assert_eq!(trace.y(), [0.0, 1.0, 0.0]);
        assert_eq!(label_events(&trace).unwrap().wells(), vec!["A2"]);
    }

    #[test]
    fn broken_digital_blocks_are_signal_errors() {
        for broken in [
            block(&[], &[]),
            block(&["1", "2", "3"], &["0", "1"]),
            block(&["1", "x"], &["0", "1"]),
            block(&["2", "1"], &["0", "1"]),
        ] {
            assert!(
                matches!(digital_trace(&broken), Err(TraceError::DigitalSignal { .. })),
                "{broken:?}"
            );
        }
    }

    proptest! {
        #[test]
        fn k_pulses_give_k_events(k in 0usize..140) {
            let signal = pulses(k);
            let labeling = label_signal(&positions(signal.len()), &signal).unwrap();
            let expected = k.min(PLATE_CAPACITY);

            prop_assert_eq!(labeling.len(), expected);
            prop_assert_eq!(labeling.wells(), crate::wells::WELLS[..expected].to_vec());
            for (i, event) in labeling.events().iter().enumerate() {
                prop_assert_eq!(event.index, i);
            }
        }
    }
}
