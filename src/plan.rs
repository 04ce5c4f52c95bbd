use log::debug;

use crate::data::model::{Channel, ChannelSet, FractionMarker, RunLogEntry, Trace};
use crate::data::run_log::RunLog;
use crate::digital::{digital_trace, label_events, EventLabeling};
use crate::error::{Result, TraceError};
use crate::options::PlotOptions;
use crate::window::{fraction_bounds, resolve_window, Window, WindowInputs};

// ---------------------------------------------------------------------------
// Plan types – what a renderer receives
// ---------------------------------------------------------------------------

/// A well label from the digital line, placed between two boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct EventPlacement {
    /// Fraction boundary (event anchor).
    pub boundary: f64,
    pub well: &'static str,
    /// Where the label text goes.
    pub text_x: f64,
}

/// A fraction from the instrument's collector, placed after its boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct FractionPlacement {
    pub boundary: f64,
    pub label: String,
    pub text_x: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DigitalOverlay {
    pub trace: Trace,
    pub labeling: EventLabeling,
    /// Empty when labels are hidden.
    pub placements: Vec<EventPlacement>,
}

/// Everything needed to draw one chromatogram.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPlan {
    /// UV 280, cropped at the elution start with `only_elution`.
    pub uv: Trace,
    /// Extra traces in draw order: % B, UV 260, conductance.
    pub overlays: Vec<Trace>,
    pub digital: Option<DigitalOverlay>,
    /// Run-log entries to annotate.
    pub log_entries: Vec<RunLogEntry>,
    pub fraction_labels: Vec<FractionPlacement>,
    /// Position and height of the UV maximum.
    pub uv_max: Option<(f64, f64)>,
    pub window: Window,
    /// Major tick step on the volume axis.
    pub tick_spacing: f64,
    pub y_limit: Option<i64>,
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

/// Derive the chart plan for one parsed export.
pub fn plan_chart(channels: &ChannelSet, options: &PlotOptions) -> Result<ChartPlan> {
    for channel in options.required_channels() {
        if !channels.contains(channel) {
            return Err(TraceError::missing(channel.header()));
        }
    }

    let full_uv = channels.require_trace(Channel::Uv280)?;
    let run_log = RunLog::from_channels(channels);
    let fractions = if options.fracs {
        Some(channels.require_markers(Channel::FractionMarks)?)
    } else {
        None
    };

    let elution = match (options.only_elution, run_log) {
        (true, Some(log)) => Some(log.elution_start()?),
        (true, None) => return Err(TraceError::missing(Channel::RunLog.header())),
        (false, _) => None,
    };
    let uv = match elution {
        Some(start) => full_uv.crop_from(start),
        None => full_uv.clone(),
    };

    let digital = if options.cetac_fracs {
        let trace = digital_trace(channels.require_digital()?)?;
        let labeling = label_events(&trace)?;
        let placements = if options.label_digital_events() {
            event_placements(&labeling, uv.last_x())
        } else {
            Vec::new()
        };
        Some(DigitalOverlay {
            trace,
            labeling,
            placements,
        })
    } else {
        None
    };

    let window = resolve_window(
        options,
        &WindowInputs {
            uv: full_uv,
            run_log,
            fractions,
            events: digital.as_ref().map(|d| &d.labeling),
        },
    )?;

    let log_entries = match run_log {
        Some(log) if options.log => visible_log_entries(
            options,
            log,
            fractions,
            digital.as_ref().map(|d| &d.labeling),
            elution,
        )?,
        _ => Vec::new(),
    };

    let fraction_labels = fractions
        .map(|f| fraction_placements(f, elution))
        .unwrap_or_default();

    let overlays = [
        (options.percent_b, Channel::PercentB),
        (options.uv260, Channel::Uv260),
        (options.conductance, Channel::Conductance),
    ]
    .into_iter()
    .filter(|(on, _)| *on)
    .map(|(_, c)| channels.require_trace(c).cloned())
    .collect::<Result<Vec<_>>>()?;

    let plan = ChartPlan {
        uv_max: if options.uv_max { uv.max_point() } else { None },
        uv,
        overlays,
        digital,
        log_entries,
        fraction_labels,
        tick_spacing: tick_spacing(window.width()),
        window,
        y_limit: options.ylim,
    };
    debug!(
        "window {:.2}..{:.2} mL, {} overlays, {} log entries, {} fraction labels",
        plan.window.min,
        plan.window.max,
        plan.overlays.len(),
        plan.log_entries.len(),
        plan.fraction_labels.len()
    );
    Ok(plan)
}

/// Pair each anchor with its well and the midpoint to the next anchor.
/// Boundaries at or past `uv_end` are dropped.
pub fn event_placements(labeling: &EventLabeling, uv_end: f64) -> Vec<EventPlacement> {
    labeling
        .anchors()
        .into_iter()
        .zip(labeling.wells())
        .zip(labeling.label_midpoints())
        .filter(|((boundary, _), _)| *boundary < uv_end)
        .map(|((boundary, well), text_x)| EventPlacement {
            boundary,
            well,
            text_x,
        })
        .collect()
}

/// Fraction labels centred between consecutive fraction boundaries. With an
/// elution start only fractions after it are kept.
pub fn fraction_placements(
    fractions: &[FractionMarker],
    elution: Option<f64>,
) -> Vec<FractionPlacement> {
    fractions
        .windows(2)
        .filter(|w| elution.map_or(true, |start| w[0].position > start))
        .map(|w| FractionPlacement {
            boundary: w[0].position,
            label: w[0].label.clone(),
            text_x: (w[0].position + w[1].position) / 2.0,
        })
        .collect()
}

/// Run-log entries strictly inside the fraction region when the chart is
/// restricted to fractions; every entry otherwise.
pub fn visible_log_entries(
    options: &PlotOptions,
    log: RunLog<'_>,
    fractions: Option<&[FractionMarker]>,
    events: Option<&EventLabeling>,
    elution: Option<f64>,
) -> Result<Vec<RunLogEntry>> {
    let bounds = if options.only_fracs && options.cetac_fracs {
        let labeling = events.ok_or_else(|| TraceError::missing(Channel::DigitalIn1.header()))?;
        match (labeling.first_anchor(), labeling.last_anchor()) {
            (Some(lo), Some(hi)) => Some((lo, hi)),
            _ => return Err(TraceError::digital("no fraction boundaries on the digital line")),
        }
    } else if options.only_fracs && options.fracs {
        let (lo, hi) = fraction_bounds(fractions)?;
        match elution {
            Some(start) if options.only_elution => Some((start, hi)),
            _ => Some((lo, hi)),
        }
    } else {
        None
    };

    Ok(log
        .iter()
        .filter(|e| bounds.map_or(true, |(lo, hi)| e.position > lo && e.position < hi))
        .cloned()
        .collect())
}

/// Major tick step for a volume axis spanning `width` mL.
pub fn tick_spacing(width: f64) -> f64 {
    let mut step = width / 10.0;
    if step < 1.0 {
        step = 0.5;
    }
    if step > 0.9 && step < 3.0 {
        1.0
    } else if step > 1.0 && step < 5.0 {
        2.5
    } else if step > 5.0 && step < 15.0 {
        10.0
    } else if step > 10.0 && step < 50.0 {
        25.0
    } else if step > 40.0 && step < 150.0 {
        50.0
    } else if step > 140.0 {
        100.0
    } else {
        step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{ChannelData, DigitalBlock, Marker};
    use crate::digital::label_signal;

    fn marker(position: f64, label: &str) -> Marker {
        Marker {
            position,
            label: label.into(),
        }
    }

    fn numeric(channel: Channel, x: Vec<f64>, y: Vec<f64>) -> ChannelData {
        ChannelData::Numeric(Trace::new(channel, x, y).unwrap())
    }

    fn channels() -> ChannelSet {
        let x: Vec<f64> = (0..=30).map(|i| i as f64).collect();
        let uv: Vec<f64> = x.iter().map(|v| if *v == 20.0 { 900.0 } else { 10.0 }).collect();
        let cond: Vec<f64> = x.iter().map(|v| v * 2.0).collect();

        let mut set = ChannelSet::new();
        set.insert(Channel::Uv280, numeric(Channel::Uv280, x.clone(), uv));
        set.insert(Channel::Conductance, numeric(Channel::Conductance, x.clone(), cond));
        set.insert(
            Channel::RunLog,
            ChannelData::Markers(vec![
                marker(0.0, "Method Run"),
                marker(10.0, "Elution"),
                marker(17.0, "Pause"),
                marker(25.0, "End"),
            ]),
        );
        set.insert(
            Channel::FractionMarks,
            ChannelData::Markers(vec![
                marker(5.0, "1.A.1"),
                marker(15.0, "1.A.2"),
                marker(20.0, "1.A.3"),
                marker(22.0, "Waste"),
            ]),
        );
        let dx: Vec<String> = (0..=12).map(|i| (12 + i).to_string()).collect();
        let signal = "0110011001100".chars().map(String::from).collect();
        set.insert(Channel::DigitalIn1, ChannelData::Digital(DigitalBlock::new(dx, signal)));
        set
    }

    #[test]
    fn default_plan_spans_whole_uv() {
        let plan = plan_chart(&channels(), &PlotOptions::default()).unwrap();
        assert_eq!(plan.window, Window { min: 0.0, max: 30.0 });
        assert_eq!(plan.uv.len(), 31);
        assert!(plan.overlays.is_empty());
        assert!(plan.digital.is_none());
        assert!(plan.log_entries.is_empty());
        assert_eq!(plan.tick_spacing, 2.5);
    }

    #[test]
    fn missing_uv_is_reported_by_name() {
        let mut set = ChannelSet::new();
        set.insert(
            Channel::Conductance,
            numeric(Channel::Conductance, vec![0.0], vec![1.0]),
        );
        assert!(matches!(
            plan_chart(&set, &PlotOptions::default()),
            Err(TraceError::MissingChannel { channel }) if channel == "UV 1_280"
        ));
    }

    #[test]
    fn requested_channel_must_be_present() {
        let opts = PlotOptions {
            uv260: true,
            ..Default::default()
        };
        assert!(matches!(
            plan_chart(&channels(), &opts),
            Err(TraceError::MissingChannel { channel }) if channel == "UV 2_260"
        ));
    }

    #[test]
    fn elution_crops_uv_and_filters_fractions() {
        let opts = PlotOptions {
            only_elution: true,
            fracs: true,
            ..Default::default()
        };
        let plan = plan_chart(&channels(), &opts).unwrap();
        assert_eq!(plan.uv.first_x(), 10.0);
        assert_eq!(plan.window, Window { min: 10.0, max: 22.0 });
        let labels: Vec<_> = plan.fraction_labels.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, ["1.A.2", "1.A.3"]);
        assert_eq!(plan.fraction_labels[0].text_x, 17.5);
    }

    #[test]
    fn log_entries_filtered_to_fraction_region() {
        let opts = PlotOptions {
            log: true,
            fracs: true,
            only_fracs: true,
            ..Default::default()
        };
        let plan = plan_chart(&channels(), &opts).unwrap();
        let labels: Vec<_> = plan.log_entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["Elution", "Pause"]);
        assert_eq!(plan.window, Window { min: 5.0, max: 22.0 });
    }

    #[test]
    fn log_entries_after_elution_with_only_elution() {
        let opts = PlotOptions {
            log: true,
            fracs: true,
            only_fracs: true,
            only_elution: true,
            ..Default::default()
        };
        let plan = plan_chart(&channels(), &opts).unwrap();
        let labels: Vec<_> = plan.log_entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["Pause"]);
    }

    #[test]
    fn digital_fractions_are_labeled_and_placed() {
        let opts = PlotOptions {
            cetac_fracs: true,
            only_fracs: true,
            log: true,
            ..Default::default()
        };
        let plan = plan_chart(&channels(), &opts).unwrap();
        let digital = plan.digital.as_ref().unwrap();

        // falls at 15, 19, 23; rises at 17, 21
        assert_eq!(digital.labeling.wells(), vec!["A2", "A3", "A4"]);
        assert_eq!(digital.labeling.anchors(), vec![16.0, 20.0]);
        assert_eq!(
            digital.placements,
            vec![EventPlacement {
                boundary: 16.0,
                well: "A2",
                text_x: 18.0
            }]
        );
        assert_eq!(plan.window, Window { min: 15.5, max: 30.0 });
        let labels: Vec<_> = plan.log_entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["Pause"]);
    }

    #[test]
    fn hidden_labels_keep_events_but_drop_placements() {
        let opts = PlotOptions {
            cetac_fracs: true,
            hide_labels: true,
            ..Default::default()
        };
        let plan = plan_chart(&channels(), &opts).unwrap();
        let digital = plan.digital.unwrap();
        assert_eq!(digital.labeling.len(), 3);
        assert!(digital.placements.is_empty());
    }

    #[test]
    fn overlays_and_uv_max() {
        let opts = PlotOptions {
            conductance: true,
            uv_max: true,
            ylim: Some(600),
            ..Default::default()
        };
        let plan = plan_chart(&channels(), &opts).unwrap();
        assert_eq!(plan.overlays.len(), 1);
        assert_eq!(plan.overlays[0].channel(), Channel::Conductance);
        assert_eq!(plan.uv_max, Some((20.0, 900.0)));
        assert_eq!(plan.y_limit, Some(600));
    }

    #[test]
    fn broken_digital_block_fails_only_when_requested() {
        let mut set = channels();
        let ragged = DigitalBlock::new(vec!["1".into(), "2".into()], vec!["0".into()]);
        set.insert(Channel::DigitalIn1, ChannelData::Digital(ragged));
        assert!(plan_chart(&set, &PlotOptions::default()).is_ok());

        let opts = PlotOptions {
            cetac_fracs: true,
            ..Default::default()
        };
        assert!(matches!(
            plan_chart(&set, &opts),
            Err(TraceError::DigitalSignal { .. })
        ));
    }

    #[test]
    fn placements_stop_at_end_of_uv() {
        let x: Vec<f64> = (0..9).map(|i| i as f64).collect();
        let labeling = label_signal(&x, &[1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0]).unwrap();
        // anchors 1.5, 3.5, 5.5, 7.5
        let placed = event_placements(&labeling, 5.0);
        assert_eq!(placed.len(), 2);
        assert_eq!(placed[1].well, "A3");
        assert_eq!(placed[1].text_x, 4.5);
    }

    #[test]
    fn tick_spacing_ladder() {
        assert_eq!(tick_spacing(5.0), 0.5);
        assert_eq!(tick_spacing(20.0), 1.0);
        assert_eq!(tick_spacing(40.0), 2.5);
        assert_eq!(tick_spacing(100.0), 10.0);
        assert_eq!(tick_spacing(300.0), 25.0);
        assert_eq!(tick_spacing(800.0), 50.0);
        assert_eq!(tick_spacing(2000.0), 100.0);
    }
}
