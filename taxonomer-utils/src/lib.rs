//! Presentation utilities for Taxonomer
//!
//! Turns diff reports and migration maps into renderable reports, interprets
//! quality scores, and provides the terminal helpers shared by the CLI.

pub mod output;
pub mod quality;
pub mod report;

pub use quality::QualityBand;
pub use report::{
    render, render_csv, render_json, render_text, DiffSummary, OutputFormat, Report, Reportable,
};
