//! USGS reference vocabularies: parameter codes and medium codes.

use serde::{Deserialize, Serialize};

pub const PARAM_CD_LEN: usize = 5;
pub const MEDIUM_CD_MAX_LEN: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SampleParameter {
    pub param_cd: String,
    pub group_name: Option<String>,
    pub description: Option<String>,
    pub epa_equivalence: Option<String>,
    pub statistical_basis: Option<String>,
    pub time_basis: Option<String>,
    pub weight_basis: Option<String>,
    pub particle_size_basis: Option<String>,
    pub sample_fraction: Option<String>,
    pub temperature_basis: Option<String>,
    pub casrn: Option<String>,
    pub srsname: Option<String>,
    pub parameter_unit: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MediumCode {
    pub medium_cd: String,
    pub medium_name: Option<String>,
    pub medium_description: Option<String>,
    pub legacy_cd: Option<String>,
}

/// Query filters for the parameter listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParameterQuery {
    pub group: Option<String>,
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// A parameter code is exactly five ASCII digits.
pub fn is_valid_param_cd(code: &str) -> bool {
    code.len() == PARAM_CD_LEN && code.bytes().all(|b| b.is_ascii_digit())
}

/// Normalize a parameter code read from a published table.
///
/// Spreadsheet round-trips drop leading zeros, so short all-digit codes are
/// left-padded back to five digits. Anything else is rejected.
pub fn normalize_param_cd(raw: &str) -> Result<String, String> {
    let code = raw.trim();
    if code.is_empty() || code.len() > PARAM_CD_LEN || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("invalid parameter code '{raw}'"));
    }
    Ok(format!("{code:0>width$}", width = PARAM_CD_LEN))
}

pub fn is_valid_medium_cd(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= MEDIUM_CD_MAX_LEN
        && code.bytes().all(|b| b.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_code_format() {
        assert!(is_valid_param_cd("00010"));
        assert!(!is_valid_param_cd("0010"));
        assert!(!is_valid_param_cd("000100"));
        assert!(!is_valid_param_cd("00a10"));
    }

    #[test]
    fn normalize_pads_short_codes() {
        assert_eq!(normalize_param_cd("10").unwrap(), "00010");
        assert_eq!(normalize_param_cd(" 00400 ").unwrap(), "00400");
        assert!(normalize_param_cd("").is_err());
        assert!(normalize_param_cd("123456").is_err());
        assert!(normalize_param_cd("Parameter Code").is_err());
    }

    #[test]
    fn medium_code_format() {
        assert!(is_valid_medium_cd("WS"));
        assert!(is_valid_medium_cd("WG"));
        assert!(!is_valid_medium_cd("WATER"));
        assert!(!is_valid_medium_cd(""));
    }
}
