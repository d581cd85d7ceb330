//! Parsing of the published USGS reference tables saved as CSV.
//!
//! Both tables are read positionally. A header row is optional: the first
//! row is skipped only when its key column carries a known header name, so
//! a malformed first record is still reported.

use std::io::Read;

use envirobase::models::{
    normalize_param_cd,
    reference::{is_valid_medium_cd, MEDIUM_CD_MAX_LEN},
    MediumCode, SampleParameter,
};
use serde::Deserialize;

pub const PARAMETER_COLUMNS: usize = 13;
pub const MEDIUM_COLUMNS: usize = 4;

/// Key-column titles seen in USGS exports, compared case-insensitively with
/// `_` read as a space.
const PARAMETER_HEADERS: &[&str] = &["parameter code", "param cd", "parm cd"];
const MEDIUM_HEADERS: &[&str] = &["medium code", "medium cd"];

#[derive(Debug, thiserror::Error)]
pub enum CsvImportError {
    #[error("row {row}: expected {expected} columns, found {found}")]
    ColumnCount {
        row: u64,
        expected: usize,
        found: usize,
    },

    #[error("row {row}: {message}")]
    InvalidCode { row: u64, message: String },

    #[error("row {row}: duplicate code '{code}'")]
    Duplicate { row: u64, code: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Deserialize)]
struct ParameterRecord {
    param_cd: String,
    group_name: Option<String>,
    description: Option<String>,
    epa_equivalence: Option<String>,
    statistical_basis: Option<String>,
    time_basis: Option<String>,
    weight_basis: Option<String>,
    particle_size_basis: Option<String>,
    sample_fraction: Option<String>,
    temperature_basis: Option<String>,
    casrn: Option<String>,
    srsname: Option<String>,
    parameter_unit: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MediumRecord {
    medium_cd: String,
    medium_name: Option<String>,
    medium_description: Option<String>,
    legacy_cd: Option<String>,
}

pub fn parse_parameters<R: Read>(input: R) -> Result<Vec<SampleParameter>, CsvImportError> {
    let mut parameters = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for_each_record(input, PARAMETER_COLUMNS, PARAMETER_HEADERS, |row, record| {
        let raw: ParameterRecord = record.deserialize(None)?;
        let param_cd = normalize_param_cd(&raw.param_cd)
            .map_err(|message| CsvImportError::InvalidCode { row, message })?;
        if !seen.insert(param_cd.clone()) {
            return Err(CsvImportError::Duplicate { row, code: param_cd });
        }
        parameters.push(SampleParameter {
            param_cd,
            group_name: clean(raw.group_name),
            description: clean(raw.description),
            epa_equivalence: clean(raw.epa_equivalence),
            statistical_basis: clean(raw.statistical_basis),
            time_basis: clean(raw.time_basis),
            weight_basis: clean(raw.weight_basis),
            particle_size_basis: clean(raw.particle_size_basis),
            sample_fraction: clean(raw.sample_fraction),
            temperature_basis: clean(raw.temperature_basis),
            casrn: clean(raw.casrn),
            srsname: clean(raw.srsname),
            parameter_unit: clean(raw.parameter_unit),
        });
        Ok(())
    })?;

    Ok(parameters)
}

pub fn parse_medium_codes<R: Read>(input: R) -> Result<Vec<MediumCode>, CsvImportError> {
    let mut codes = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for_each_record(input, MEDIUM_COLUMNS, MEDIUM_HEADERS, |row, record| {
        let raw: MediumRecord = record.deserialize(None)?;
        let medium_cd = raw.medium_cd.trim().to_ascii_uppercase();
        if !is_valid_medium_cd(&medium_cd) {
            return Err(CsvImportError::InvalidCode {
                row,
                message: format!(
                    "invalid medium code '{}' (1 to {MEDIUM_CD_MAX_LEN} letters or digits)",
                    raw.medium_cd
                ),
            });
        }
        if !seen.insert(medium_cd.clone()) {
            return Err(CsvImportError::Duplicate { row, code: medium_cd });
        }
        codes.push(MediumCode {
            medium_cd,
            medium_name: clean(raw.medium_name),
            medium_description: clean(raw.medium_description),
            legacy_cd: clean(raw.legacy_cd),
        });
        Ok(())
    })?;

    Ok(codes)
}

/// Walk the records with 1-based row numbers, skipping a leading header.
fn for_each_record<R, F>(
    input: R,
    columns: usize,
    headers: &[&str],
    mut handle: F,
) -> Result<(), CsvImportError>
where
    R: Read,
    F: FnMut(u64, &csv::StringRecord) -> Result<(), CsvImportError>,
{
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let row = index as u64 + 1;

        if row == 1 && record.get(0).is_some_and(|key| is_header(key, headers)) {
            tracing::debug!("Skipping header row");
            continue;
        }
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        if record.len() != columns {
            return Err(CsvImportError::ColumnCount {
                row,
                expected: columns,
                found: record.len(),
            });
        }
        handle(row, &record)?;
    }
    Ok(())
}

fn is_header(field: &str, headers: &[&str]) -> bool {
    let title = field.trim().replace('_', " ").to_ascii_lowercase();
    headers.contains(&title.as_str())
}

fn clean(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}
