//! CSV output for scraped notices.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::sorn::Sorn;

/// Column layout of the full-collection summary file.
const SUMMARY_HEADER: [&str; 3] = ["System Name", "URL", "Authority"];

#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    system_name: &'a str,
    url: &'a str,
    authority: &'a str,
}

#[derive(Debug, Serialize)]
struct DetailRow<'a> {
    system_name: &'a str,
    url: &'a str,
    pii: &'a str,
    purpose: &'a str,
    retention: &'a str,
    routine_uses: &'a str,
}

/// Write the summary CSV: one header row, then one row per record in
/// collection order. Truncates anything already at `path`.
pub fn write_summary(path: &Path, sorns: &[Sorn]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    writer.write_record(SUMMARY_HEADER)?;
    for sorn in sorns {
        writer.serialize(SummaryRow {
            system_name: sorn.fields.system_name.as_deref().unwrap_or(""),
            url: &sorn.html_url,
            authority: sorn.fields.authority.as_deref().unwrap_or(""),
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Append one detail row for a single record. Rows only; the detail file
/// carries no header.
pub fn append_detail(path: &Path, sorn: &Sorn) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);

    let fields = &sorn.fields;
    writer.serialize(DetailRow {
        system_name: fields.system_name.as_deref().unwrap_or(""),
        url: &sorn.html_url,
        pii: fields.pii.as_deref().unwrap_or(""),
        purpose: fields.purpose.as_deref().unwrap_or(""),
        retention: fields.retention.as_deref().unwrap_or(""),
        routine_uses: fields.routine_uses.as_deref().unwrap_or(""),
    })?;
    writer.flush()?;
    Ok(())
}

// ── Tests ──
