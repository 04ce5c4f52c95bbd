use crate::data::model::{Channel, FractionMarker, Trace};
use crate::data::run_log::RunLog;
use crate::digital::EventLabeling;
use crate::error::{Result, TraceError};
use crate::options::PlotOptions;

/// Room left before the first digital fraction boundary so its label is not
/// clipped.
pub const DIGITAL_WINDOW_MARGIN: f64 = 0.5;

/// Inclusive x-range (mL) to display or analyse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub min: f64,
    pub max: f64,
}

impl Window {
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if min > max {
            return Err(TraceError::EmptyWindow { min, max });
        }
        Ok(Self { min, max })
    }

    /// Full x-extent of a trace.
    pub fn of_trace(trace: &Trace) -> Self {
        Self {
            min: trace.first_x(),
            max: trace.last_x(),
        }
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }
}

/// Everything the resolver may look at. Absent parts are `None`.
#[derive(Debug, Clone, Copy)]
pub struct WindowInputs<'a> {
    /// The full, uncropped UV 280 trace.
    pub uv: &'a Trace,
    pub run_log: Option<RunLog<'a>>,
    pub fractions: Option<&'a [FractionMarker]>,
    pub events: Option<&'a EventLabeling>,
}

/// Pick the x-window for the enabled options.
///
/// First matching rule wins:
/// 1. `only_elution` – from the `Elution` log entry to the last fraction
///    (with `fracs`) or the end of the UV trace;
/// 2. `only_fracs` + `fracs` – first to last fraction;
/// 3. `only_fracs` + `cetac_fracs` – just before the first digital fraction
///    boundary to the end of the UV trace;
/// 4. the whole UV trace.
pub fn resolve_window(options: &PlotOptions, inputs: &WindowInputs<'_>) -> Result<Window> {
    if options.only_elution {
        let log = inputs
            .run_log
            .ok_or_else(|| TraceError::missing(Channel::RunLog.header()))?;
        let min = log.elution_start()?;
        let max = if options.fracs {
            fraction_bounds(inputs.fractions)?.1
        } else {
            inputs.uv.last_x()
        };
        return Window::new(min, max);
    }

    if options.only_fracs && options.fracs {
        let (min, max) = fraction_bounds(inputs.fractions)?;
        return Window::new(min, max);
    }

    if options.only_fracs && options.cetac_fracs {
        let first = inputs
            .events
            .and_then(EventLabeling::first_anchor)
            .ok_or_else(|| TraceError::digital("no fraction boundaries on the digital line"))?;
        return Window::new(first - DIGITAL_WINDOW_MARGIN, inputs.uv.last_x());
    }

    Ok(Window::of_trace(inputs.uv))
}

/// Smallest and largest fraction position.
pub fn fraction_bounds(fractions: Option<&[FractionMarker]>) -> Result<(f64, f64)> {
    let fractions = fractions.ok_or_else(|| TraceError::missing(Channel::FractionMarks.header()))?;
    fractions
        .iter()
        .map(|f| (f.position, f.position))
        .reduce(|(lo, hi), (a, b)| (lo.min(a), hi.max(b)))
        .ok_or_else(|| TraceError::missing(Channel::FractionMarks.header()))
}
