//! Report generation utilities
//!
//! A presentation layer over the engine's structured results.
//!
//! ## Usage
//! 1. Implement `Reportable` for a result type (done here for `DiffReport`
//!    and `MigrationMap`)
//! 2. Call `result.to_report()` to get a generic `Report`
//! 3. Render it with `render_text`, `render_json` or `render_csv`

pub mod core;
pub mod diff;
pub mod migration;
pub mod renderers;

pub use core::{
    Cell, CellStyle, ChangeDirection, Metric, MetricChange, MetricSeverity, Report, ReportBuilder,
    Reportable, Section, SectionContent, Table,
};
pub use diff::DiffSummary;

pub use renderers::{render, render_csv, render_json, render_text, OutputFormat};
