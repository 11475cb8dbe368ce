//! `Reportable` view of a version transition

use crate::quality::QualityBand;
use crate::report::core::{Cell, CellStyle, Metric, MetricSeverity, Report, Reportable, Section, Table};
use taxonomer_core::config::ReportConfig;
use taxonomer_evolution::{ChangeRecord, DiffReport, Severity, Status};

/// A diff report paired with the bands used to interpret its score
pub struct DiffSummary<'a> {
    pub report: &'a DiffReport,
    pub bands: &'a ReportConfig,
}

impl<'a> DiffSummary<'a> {
    pub fn new(report: &'a DiffReport, bands: &'a ReportConfig) -> Self {
        Self { report, bands }
    }

    pub fn band(&self) -> QualityBand {
        QualityBand::from_score(self.report.quality_score, self.bands)
    }

    fn entity_counts(&self) -> (usize, usize) {
        let unchanged = self.report.unchanged.len();
        let old = self.report.records.iter().filter(|r| r.old.is_some()).count();
        let new = self.report.records.iter().filter(|r| r.new.is_some()).count();
        (old + unchanged, new + unchanged)
    }

    fn summary(&self) -> Section {
        let band = self.band();
        let (old_entities, new_entities) = self.entity_counts();
        let errors = self.report.counts.of_status(Status::Error);

        Section::summary(
            "Summary",
            vec![
                Metric::new("Entities", new_entities).with_change(old_entities, new_entities),
                Metric::new("Changes", self.report.counts.total),
                Metric::new("Unchanged", self.report.unchanged.len()),
                Metric::new("Quality score", format!("{:.3}", self.report.quality_score))
                    .with_severity(band.severity()),
                Metric::new("Quality band", band).with_severity(band.severity()),
                Metric::new("Errors", errors).with_severity(if errors > 0 {
                    MetricSeverity::Error
                } else {
                    MetricSeverity::Success
                }),
            ],
        )
    }

    fn changes_table(&self) -> Table {
        let mut table = Table::new(["Old", "New", "Change", "Severity", "Confidence", "Status"]);
        for record in &self.report.records {
            table.add_row(change_row(record));
        }
        table
    }

    fn findings(&self) -> Vec<String> {
        self.report
            .flagged()
            .flat_map(|record| {
                record.violations.iter().map(move |v| {
                    format!(
                        "[{}] {} ({}): {}",
                        v.outcome,
                        record.sort_key().0,
                        record.label(),
                        v.message
                    )
                })
            })
            .collect()
    }
}

fn change_row(record: &ChangeRecord) -> Vec<Cell> {
    let severity_style = match record.severity {
        Severity::Critical => CellStyle::Error,
        Severity::Major => CellStyle::Highlight,
        Severity::Normal | Severity::Minor => CellStyle::Normal,
    };
    let status_style = match record.status {
        Status::Valid => CellStyle::Success,
        Status::Warning => CellStyle::Warning,
        Status::Error => CellStyle::Error,
    };
    let name = |identity: Option<&str>| Cell::new(identity.unwrap_or("-"));

    vec![
        name(record.old_name()),
        name(record.new_name()),
        Cell::new(record.label()),
        Cell::new(record.severity).with_style(severity_style),
        Cell::new(format!("{:.3}", record.confidence)),
        Cell::new(record.status).with_style(status_style),
    ]
}

fn counts_section(title: &str, counts: &std::collections::BTreeMap<String, usize>) -> Section {
    Section::key_value(
        title,
        counts
            .iter()
            .map(|(key, count)| (key.clone(), count.to_string()))
            .collect(),
    )
}

impl Reportable for DiffSummary<'_> {
    fn to_report(&self) -> Report {
        let report = self.report;
        let findings = self.findings();

        Report::builder(
            format!(
                "Taxonomy transition {} → {}",
                report.old.version, report.new.version
            ),
            "diff",
        )
        .metadata("from", report.old.version.clone())
        .metadata("to", report.new.version.clone())
        .section(self.summary())
        .section_if(!report.counts.by_subtype.is_empty(), || {
            counts_section("Changes by subtype", &report.counts.by_subtype)
        })
        .section_if(!report.counts.by_severity.is_empty(), || {
            counts_section("Changes by severity", &report.counts.by_severity)
        })
        .section(Section::table("Changes", self.changes_table()))
        .section_if(!findings.is_empty(), || Section::bullets("Findings", findings))
        .build()
    }
}

impl Reportable for DiffReport {
    fn to_report(&self) -> Report {
        DiffSummary::new(self, &ReportConfig::default()).to_report()
    }
}
