//! Trace extraction and fraction labeling for ÄKTA chromatography exports.
//!
//! ```text
//!  export file ──▶ data::loader ──▶ ChannelSet
//!                                      │
//!            ┌─────────────────────────┼──────────────────┐
//!            ▼                         ▼                  ▼
//!      data::run_log            digital (wells)     fraction marks
//!            └─────────────┬───────────┴──────────────────┘
//!                          ▼
//!                   window ──▶ plan ──▶ pipeline ──▶ ChartRenderer
//! ```

pub mod data;
pub mod digital;
pub mod error;
pub mod options;
pub mod pipeline;
pub mod plan;
pub mod wells;
pub mod window;

pub use data::model::{Channel, ChannelData, ChannelSet, DigitalBlock, Marker, Trace};
pub use digital::{DigitalEvent, EventLabeling, ScanEnd};
pub use error::{ProcessError, Result, TraceError};
pub use options::PlotOptions;
pub use pipeline::{process_batch, process_file, BatchReport, ChartRenderer, OutputPaths};
pub use plan::{plan_chart, ChartPlan};
pub use window::{resolve_window, Window};
