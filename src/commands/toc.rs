use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::TocArgs;
use crate::commands::load_source;
use crate::model::{EntryKind, TocReport};
use crate::util::{now_utc_string, write_json_pretty};

const MANIFEST_VERSION: u32 = 1;

pub fn run(args: TocArgs, timeout: Duration) -> Result<()> {
    let loaded = load_source(&args.input, timeout)?;
    let session = &loaded.session;

    let Some(table) = session.toc() else {
        warn!(source = %session.name(), "no table of contents found; nothing to print");
        return Ok(());
    };

    let report = TocReport {
        manifest_version: MANIFEST_VERSION,
        generated_at: now_utc_string(),
        source: session.name().to_string(),
        page_count: loaded.page_count,
        flat: table.is_flat(),
        entries: table.rows(),
    };

    if let Some(path) = &args.output {
        write_json_pretty(path, &report)?;
        info!(path = %path.display(), entries = report.entries.len(), "wrote table of contents");
    }

    if args.json {
        write_json_report(&report)
    } else {
        write_text_report(&report)
    }
}

fn write_json_report(report: &TocReport) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());
    serde_json::to_writer_pretty(&mut output, report).context("failed to serialize toc json output")?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}

fn write_text_report(report: &TocReport) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());

    writeln!(output, "Source: {} ({} pages)", report.source, report.page_count)?;
    writeln!(
        output,
        "Entries: {}{}",
        report.entries.len(),
        if report.flat { " (flat)" } else { "" }
    )?;

    for row in &report.entries {
        let indent = "  ".repeat(row.indent_level as usize);
        let title = match row.kind {
            EntryKind::Section => row.text.as_str(),
            EntryKind::Subject => row.cleaned_text.as_str(),
        };
        writeln!(
            output,
            "{:>4}  {:<7}  {:<9}  {indent}{title}",
            row.id.0,
            row.kind.as_str(),
            row.page_range,
        )?;
        if row.kind == EntryKind::Section {
            if let Some(section_range) = &row.section_range {
                writeln!(output, "{:>4}  {:<7}  {:<9}  {indent}  (section spans {section_range})", "", "", "")?;
            }
        } else if row.section.is_none() && !report.flat {
            writeln!(output, "{:>4}  {:<7}  {:<9}  {indent}  (unassigned)", "", "", "")?;
        }
    }

    output.flush()?;
    Ok(())
}
