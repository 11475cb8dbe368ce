//! Core generic reporting framework
//!
//! Result types implement `Reportable` to turn themselves into a `Report`,
//! a tree of titled sections that every renderer understands.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Generic report produced from an engine result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub title: String,
    pub command: String,
    pub timestamp: DateTime<Utc>,
    pub sections: Vec<Section>,
    pub metadata: BTreeMap<String, String>,
}

impl Report {
    pub fn builder(title: impl Into<String>, command: impl Into<String>) -> ReportBuilder {
        ReportBuilder {
            title: title.into(),
            command: command.into(),
            timestamp: Utc::now(),
            sections: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title == title)
    }
}

/// Builder for constructing reports
pub struct ReportBuilder {
    title: String,
    command: String,
    timestamp: DateTime<Utc>,
    sections: Vec<Section>,
    metadata: BTreeMap<String, String>,
}

impl ReportBuilder {
    pub fn section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// Add a section only when there is something to show
    pub fn section_if(self, condition: bool, section: impl FnOnce() -> Section) -> Self {
        if condition {
            self.section(section())
        } else {
            self
        }
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Pin the generation time (reproducible output in tests)
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn build(self) -> Report {
        Report {
            title: self.title,
            command: self.command,
            timestamp: self.timestamp,
            sections: self.sections,
            metadata: self.metadata,
        }
    }
}

/// A section of a report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub content: SectionContent,
}

impl Section {
    pub fn summary(title: impl Into<String>, metrics: Vec<Metric>) -> Self {
        Self {
            title: title.into(),
            content: SectionContent::Metrics(metrics),
        }
    }

    pub fn table(title: impl Into<String>, table: Table) -> Self {
        Self {
            title: title.into(),
            content: SectionContent::Table(table),
        }
    }

    pub fn key_value(title: impl Into<String>, items: Vec<(String, String)>) -> Self {
        Self {
            title: title.into(),
            content: SectionContent::KeyValueList(items),
        }
    }

    pub fn bullets(title: impl Into<String>, items: Vec<String>) -> Self {
        Self {
            title: title.into(),
            content: SectionContent::BulletList(items),
        }
    }

    pub fn text(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: SectionContent::Text(text.into()),
        }
    }
}

/// Content types for report sections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SectionContent {
    /// Summary metrics with optional comparison
    Metrics(Vec<Metric>),

    /// Tabular data
    Table(Table),

    /// Key-value pairs
    KeyValueList(Vec<(String, String)>),

    /// Bullet list
    BulletList(Vec<String>),

    /// Plain text
    Text(String),
}

/// A metric with optional change indicator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metric {
    pub label: String,
    pub value: String,
    pub change: Option<MetricChange>,
    pub severity: MetricSeverity,
}

impl Metric {
    pub fn new(label: impl Into<String>, value: impl ToString) -> Self {
        Self {
            label: label.into(),
            value: value.to_string(),
            change: None,
            severity: MetricSeverity::Normal,
        }
    }

    pub fn with_change(mut self, from: impl ToString, to: impl ToString) -> Self {
        let from_val = from.to_string();
        let to_val = to.to_string();

        let direction = match (from_val.parse::<f64>(), to_val.parse::<f64>()) {
            (Ok(f), Ok(t)) if t > f => ChangeDirection::Increase,
            (Ok(f), Ok(t)) if t < f => ChangeDirection::Decrease,
            _ => ChangeDirection::NoChange,
        };

        self.change = Some(MetricChange {
            from: from_val,
            to: to_val,
            direction,
        });
        self
    }

    pub fn with_severity(mut self, severity: MetricSeverity) -> Self {
        self.severity = severity;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricChange {
    pub from: String,
    pub to: String,
    pub direction: ChangeDirection,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ChangeDirection {
    Increase,
    Decrease,
    NoChange,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MetricSeverity {
    Normal,
    Success,
    Warning,
    Error,
    Info,
}

/// Table data structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, cells: Vec<Cell>) {
        self.rows.push(cells);
    }

    pub fn with_row(mut self, cells: Vec<Cell>) -> Self {
        self.rows.push(cells);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A table cell with optional styling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    pub value: String,
    pub style: CellStyle,
}

impl Cell {
    pub fn new(value: impl ToString) -> Self {
        Self {
            value: value.to_string(),
            style: CellStyle::Normal,
        }
    }

    pub fn with_style(mut self, style: CellStyle) -> Self {
        self.style = style;
        self
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::new(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::new(value)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CellStyle {
    Normal,
    Success,
    Warning,
    Error,
    Highlight,
    Muted,
}

/// Trait for types that can be converted to reports
pub trait Reportable {
    fn to_report(&self) -> Report;
}
