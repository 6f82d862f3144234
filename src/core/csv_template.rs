//! Permission CSV layout: `Record UID, Title, Folder Path` followed by one
//! column per team. Team cells hold a permission level or are left empty.

use crate::constants::{COLUMN_FOLDER_PATH, COLUMN_RECORD_UID, COLUMN_TITLE, REQUIRED_COLUMNS};
use crate::core::permission::PermissionLevel;
use crate::utils::error::{OpsError, Result};
use std::collections::HashSet;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSummary {
    pub uid: String,
    pub title: String,
    pub folder_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRow {
    pub line: usize,
    pub record_uid: String,
    pub title: String,
    pub folder_path: String,
    /// `(team column, cell)` for every team column, empty cells included.
    pub cells: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    fn push(&mut self, line: usize, message: String) {
        self.issues.push(ValidationIssue { line, message });
    }
}

fn strip_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(UTF8_BOM).unwrap_or(data)
}

fn reader(data: &[u8]) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(strip_bom(data))
}

fn has_required_columns(headers: &csv::StringRecord) -> bool {
    REQUIRED_COLUMNS
        .iter()
        .all(|required| headers.iter().any(|h| h == *required))
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

pub fn build_template(team_names: &[String], records: &[RecordSummary]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let header = REQUIRED_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(team_names.iter().cloned());
    writer.write_record(header)?;

    for record in records {
        let row = [
            record.uid.as_str(),
            record.title.as_str(),
            record.folder_path.as_str(),
        ]
        .into_iter()
        .chain(team_names.iter().map(|_| ""));
        writer.write_record(row)?;
    }

    writer
        .into_inner()
        .map_err(|e| OpsError::IoError(e.into_error()))
}

/// Checks the header and every data row against the known team names.
pub fn validate(data: &[u8], team_names: &[String]) -> Result<ValidationReport> {
    let mut report = ValidationReport::default();
    let mut rdr = reader(data);
    let headers = rdr.headers()?.clone();

    if !has_required_columns(&headers) {
        report.push(
            1,
            format!("CSV missing required columns: {}", REQUIRED_COLUMNS.join(", ")),
        );
        return Ok(report);
    }

    let teams: HashSet<String> = team_names.iter().map(|t| t.to_lowercase()).collect();

    for (index, row) in rdr.records().enumerate() {
        let line = index + 2;
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                report.push(line, format!("Malformed CSV row on line {}: {}", line, e));
                continue;
            }
        };

        for (column, header) in headers.iter().enumerate() {
            if REQUIRED_COLUMNS.contains(&header) {
                continue;
            }
            if !teams.contains(&header.to_lowercase()) {
                report.push(line, format!("Unknown team '{}' on line {}", header, line));
                continue;
            }
            let value = row.get(column).unwrap_or("").trim();
            if !value.is_empty() && value.parse::<PermissionLevel>().is_err() {
                report.push(line, format!("Invalid permission '{}' on line {}", value, line));
            }
        }
    }

    Ok(report)
}

pub fn read_rows(data: &[u8]) -> Result<Vec<PermissionRow>> {
    let mut rdr = reader(data);
    let headers = rdr.headers()?.clone();
    tracing::debug!("Fieldnames: {:?}", headers.iter().collect::<Vec<_>>());

    if !has_required_columns(&headers) {
        return Err(OpsError::ValidationError {
            message: format!("CSV missing required columns: {}", REQUIRED_COLUMNS.join(", ")),
        });
    }

    let uid_index = column_index(&headers, COLUMN_RECORD_UID);
    let title_index = column_index(&headers, COLUMN_TITLE);
    let path_index = column_index(&headers, COLUMN_FOLDER_PATH);
    let cell = |row: &csv::StringRecord, index: Option<usize>| {
        index
            .and_then(|i| row.get(i))
            .unwrap_or("")
            .trim()
            .to_string()
    };

    let mut rows = Vec::new();
    for (index, row) in rdr.records().enumerate() {
        let row = row?;
        let cells = headers
            .iter()
            .enumerate()
            .filter(|(_, header)| !REQUIRED_COLUMNS.contains(header))
            .map(|(i, header)| (header.to_string(), cell(&row, Some(i))))
            .collect();

        rows.push(PermissionRow {
            line: index + 2,
            record_uid: cell(&row, uid_index),
            title: cell(&row, title_index),
            folder_path: cell(&row, path_index),
            cells,
        });
    }

    Ok(rows)
}
