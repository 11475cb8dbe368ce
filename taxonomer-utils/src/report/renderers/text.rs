//! Plain text renderer for Report type

use crate::report::core::{
    Cell, CellStyle, ChangeDirection, Metric, MetricSeverity, Report, Section, SectionContent,
    Table,
};
use anyhow::Result;
use std::fmt::Write;

/// Render a Report to plain text format
pub fn render_text(report: &Report) -> Result<String> {
    let mut output = String::new();

    writeln!(output, "{}", report.title)?;
    writeln!(output, "{}\n", "=".repeat(report.title.chars().count()))?;

    writeln!(output, "Command: {}", report.command)?;
    writeln!(
        output,
        "Generated: {}",
        report.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    for (key, value) in &report.metadata {
        writeln!(output, "{}: {}", key, value)?;
    }
    output.push('\n');

    for section in &report.sections {
        render_section(&mut output, section)?;
    }

    Ok(output)
}

fn render_section(output: &mut String, section: &Section) -> Result<()> {
    writeln!(output, "{}", section.title)?;
    writeln!(output, "{}", "-".repeat(section.title.chars().count()))?;

    match &section.content {
        SectionContent::Metrics(metrics) => render_metrics(output, metrics)?,
        SectionContent::Table(table) => render_table(output, table)?,
        SectionContent::KeyValueList(items) => render_key_value_list(output, items)?,
        SectionContent::BulletList(items) => {
            for item in items {
                writeln!(output, "  ▶ {}", item)?;
            }
        }
        SectionContent::Text(text) => {
            for line in text.lines() {
                writeln!(output, "  {}", line)?;
            }
        }
    }

    output.push('\n');
    Ok(())
}

fn render_metrics(output: &mut String, metrics: &[Metric]) -> Result<()> {
    for metric in metrics {
        let indicator = match metric.severity {
            MetricSeverity::Success => "✓",
            MetricSeverity::Warning => "⚠",
            MetricSeverity::Error => "✗",
            MetricSeverity::Info => "ℹ",
            MetricSeverity::Normal => "●",
        };
        writeln!(output, "  {} {}: {}", indicator, metric.label, metric.value)?;

        if let Some(change) = &metric.change {
            let arrow = match change.direction {
                ChangeDirection::Increase => "↑",
                ChangeDirection::Decrease => "↓",
                ChangeDirection::NoChange => "→",
            };
            writeln!(output, "     (from {} {} {})", change.from, arrow, change.to)?;
        }
    }
    Ok(())
}

fn styled(cell: &Cell) -> String {
    let prefix = match cell.style {
        CellStyle::Success => "✓ ",
        CellStyle::Warning => "⚠ ",
        CellStyle::Error => "✗ ",
        CellStyle::Highlight => "▶ ",
        CellStyle::Muted | CellStyle::Normal => "",
    };
    format!("{}{}", prefix, cell.value)
}

fn render_table(output: &mut String, table: &Table) -> Result<()> {
    if table.rows.is_empty() {
        output.push_str("  (empty)\n");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(styled).collect())
        .collect();

    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, value) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(value.chars().count());
            }
        }
    }

    let header: Vec<String> = table.headers.clone();
    write_row(output, &header, &widths)?;
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    write_row(output, &rule, &widths)?;
    for row in &rows {
        write_row(output, row, &widths)?;
    }
    Ok(())
}

fn write_row(output: &mut String, values: &[String], widths: &[usize]) -> Result<()> {
    let padded: Vec<String> = values
        .iter()
        .zip(widths)
        .map(|(value, width)| format!("{:width$}", value, width = width))
        .collect();
    writeln!(output, "  {}", padded.join("  ").trim_end())?;
    Ok(())
}

fn render_key_value_list(output: &mut String, items: &[(String, String)]) -> Result<()> {
    let max_key_width = items.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);

    for (key, value) in items {
        writeln!(output, "  {:width$}: {}", key, value, width = max_key_width)?;
    }
    Ok(())
}
