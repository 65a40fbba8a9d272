//! Session formatting and display
//!
//! - `config` - Output configuration types
//! - `timeline` - Console timeline, colored with the session palette
//! - `json` - JSON report

mod config;
mod json;
mod timeline;

pub use config::OutputConfig;
pub use json::{SessionReport, print_json};
pub use timeline::TimelineFormatter;
