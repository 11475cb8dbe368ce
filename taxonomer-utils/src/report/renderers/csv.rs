//! CSV renderer for Report type

use crate::report::core::{Report, Section, SectionContent, Table};
use anyhow::Result;
use std::fmt::Write;

/// Render a Report to CSV format
///
/// Tables become separate CSV blocks, key-value lists and metrics become
/// two-column tables, and text is carried as `#` comment lines.
pub fn render_csv(report: &Report) -> Result<String> {
    let mut output = String::new();

    writeln!(output, "# {}", report.title)?;
    writeln!(output, "# Command: {}", report.command)?;
    writeln!(
        output,
        "# Generated: {}",
        report.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    for (key, value) in &report.metadata {
        writeln!(output, "# {}: {}", key, value)?;
    }
    output.push('\n');

    for section in &report.sections {
        render_section(&mut output, section)?;
    }

    Ok(output)
}

fn render_section(output: &mut String, section: &Section) -> Result<()> {
    writeln!(output, "# {}", section.title)?;

    match &section.content {
        SectionContent::Metrics(metrics) => {
            output.push_str("Metric,Value,Change From,Change To\n");
            for metric in metrics {
                let from = metric.change.as_ref().map(|c| c.from.as_str()).unwrap_or("");
                let to = metric.change.as_ref().map(|c| c.to.as_str()).unwrap_or("");
                write_record(output, [metric.label.as_str(), metric.value.as_str(), from, to])?;
            }
        }
        SectionContent::Table(table) => render_table(output, table)?,
        SectionContent::KeyValueList(items) => {
            output.push_str("Key,Value\n");
            for (key, value) in items {
                write_record(output, [key.as_str(), value.as_str()])?;
            }
        }
        SectionContent::BulletList(items) => {
            output.push_str("Item\n");
            for item in items {
                write_record(output, [item.as_str()])?;
            }
        }
        SectionContent::Text(text) => {
            for line in text.lines() {
                writeln!(output, "# {}", line)?;
            }
        }
    }

    output.push('\n');
    Ok(())
}

fn render_table(output: &mut String, table: &Table) -> Result<()> {
    write_record(output, table.headers.iter().map(String::as_str))?;
    for row in &table.rows {
        write_record(output, row.iter().map(|cell| cell.value.as_str()))?;
    }
    Ok(())
}

fn write_record<'a>(output: &mut String, fields: impl IntoIterator<Item = &'a str>) -> Result<()> {
    let quoted: Vec<String> = fields
        .into_iter()
        .map(|f| format!("\"{}\"", escape_csv(f)))
        .collect();
    writeln!(output, "{}", quoted.join(","))?;
    Ok(())
}

/// Escape CSV special characters
fn escape_csv(s: &str) -> String {
    s.replace('"', "\"\"")
}
