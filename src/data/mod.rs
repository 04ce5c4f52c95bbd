//! Data layer: channel types, export loading and the run log.
//!
//! Architecture:
//! ```text
//!  UTF-16 tab-delimited export
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  decode → split → transpose → ChannelSet
//!   └──────────┘
//!        │
//!        ▼
//!   ┌────────────┐
//!   │ ChannelSet  │  Channel → Trace | markers, absent if missing
//!   └────────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  run_log  │  ordered (position, label) lookup
//!   └──────────┘
//! ```

pub mod loader;
pub mod model;
pub mod run_log;
