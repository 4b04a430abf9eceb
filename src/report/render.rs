//! Report rendering.
//!
//! Both forms are pure functions of the entry list.

use std::io::Write;

use serde::Serialize;

use super::builder::RoleEntry;
use super::member::MemberRecord;
use crate::error::AppError;

pub const LINE_ENDING: &str = "\r\n";
const BORDER_WIDTH: usize = 50;
const NO_MEMBERS: &str = "No members in AU";

/// Text blocks, one per entry, separated by a blank line. CRLF line endings.
pub fn render_text(entries: &[RoleEntry]) -> String {
    let border = "=".repeat(BORDER_WIDTH);
    let mut lines: Vec<String> = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        if index > 0 {
            lines.push(String::new());
        }

        lines.push(border.clone());
        lines.push(format!("Role: {}", entry.role_name));
        lines.push(format!("Description: {}", entry.role_description));
        lines.push(format!("Scope: {}", entry.scope));
        lines.push(format!("AU Name: {}", entry.au_name));
        lines.push(format!("AU ID: {}", entry.au_id));
        lines.push(border.clone());

        if entry.members.is_empty() {
            lines.push(NO_MEMBERS.to_string());
        } else {
            lines.extend(entry.members.iter().map(member_line));
        }
    }

    if lines.is_empty() {
        return String::new();
    }

    let mut text = lines.join(LINE_ENDING);
    text.push_str(LINE_ENDING);
    text
}

fn member_line(member: &MemberRecord) -> String {
    format!(
        "{}: {} | UPN/Info: {} | Job Title: {} | Enabled: {}",
        member.member_type,
        member.name,
        member.secondary_identifier,
        member.job_title,
        member.enabled_label()
    )
}

/// One flat record of the tabular report.
///
/// Serialized positionally under `CSV_HEADER`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub role_name: String,
    pub role_description: String,
    pub scope: String,
    pub au_name: String,
    pub au_id: String,
    pub member_type: String,
    pub member_name: String,
    pub member_upn_or_info: String,
    pub member_job_title: String,
    pub member_enabled: String,
}

impl ReportRow {
    fn placeholder(entry: &RoleEntry) -> Self {
        Self {
            role_name: entry.role_name.clone(),
            role_description: entry.role_description.clone(),
            scope: entry.scope.clone(),
            au_name: entry.au_name.clone(),
            au_id: entry.au_id.clone(),
            member_type: String::new(),
            member_name: String::new(),
            member_upn_or_info: String::new(),
            member_job_title: String::new(),
            member_enabled: String::new(),
        }
    }

    fn for_member(entry: &RoleEntry, member: &MemberRecord) -> Self {
        Self {
            member_type: member.member_type.to_string(),
            member_name: member.name.clone(),
            member_upn_or_info: member.secondary_identifier.clone(),
            member_job_title: member.job_title.clone(),
            member_enabled: member.enabled_label().to_string(),
            ..Self::placeholder(entry)
        }
    }
}

/// One row per member, or one placeholder row for an entry without members.
pub fn render_rows(entries: &[RoleEntry]) -> Vec<ReportRow> {
    let mut rows = Vec::new();
    for entry in entries {
        if entry.members.is_empty() {
            rows.push(ReportRow::placeholder(entry));
        } else {
            rows.extend(
                entry
                    .members
                    .iter()
                    .map(|member| ReportRow::for_member(entry, member)),
            );
        }
    }
    rows
}

/// Write rows as CSV with a header line.
pub fn write_csv<W: Write>(rows: &[ReportRow], writer: W) -> Result<(), AppError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(CSV_HEADER)?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Written explicitly so an empty report still carries the header.
const CSV_HEADER: [&str; 10] = [
    "RoleName",
    "RoleDescription",
    "Scope",
    "AUName",
    "AUId",
    "MemberType",
    "MemberName",
    "MemberUPNOrInfo",
    "MemberJobTitle",
    "MemberEnabled",
];
