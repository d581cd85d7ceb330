//! Laboratory sample results keyed by sample location, parameter and date.

use super::{blank_to_none, is_valid_param_cd, nullable, patch_field};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SampleResult {
    pub result_id: i32,
    pub lab_id: Option<String>,
    pub facility_id: i32,
    pub sample_id: i32,
    pub sample_name: String,
    pub param_cd: String,
    pub parameter_description: Option<String>,
    pub medium_cd: Option<String>,
    pub sample_date: DateTime<Utc>,
    pub prep_method: Option<String>,
    pub analysis_method: Option<String>,
    pub analysis_flag: Option<String>,
    pub analysis_result: Option<f64>,
    pub analysis_unit: Option<String>,
    pub detection_limit: Option<f64>,
    pub reporting_limit: Option<f64>,
    pub analysis_qualifier: Option<String>,
    pub disclaimer: Option<String>,
    pub analysis_date: Option<DateTime<Utc>>,
    pub order_comment: Option<String>,
    pub analysis_comment: Option<String>,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_sample_result"))]
pub struct SampleResultInput {
    pub lab_id: Option<String>,
    pub sample_id: i32,
    pub param_cd: String,
    #[validate(length(min = 1, max = 3))]
    pub medium_cd: Option<String>,
    pub sample_date: DateTime<Utc>,
    pub prep_method: Option<String>,
    pub analysis_method: Option<String>,
    #[validate(length(equal = 1))]
    pub analysis_flag: Option<String>,
    pub analysis_result: Option<f64>,
    pub analysis_unit: Option<String>,
    #[validate(range(min = 0.0))]
    pub detection_limit: Option<f64>,
    #[validate(range(min = 0.0))]
    pub reporting_limit: Option<f64>,
    #[validate(length(equal = 1))]
    pub analysis_qualifier: Option<String>,
    pub disclaimer: Option<String>,
    pub analysis_date: Option<DateTime<Utc>>,
    pub order_comment: Option<String>,
    pub analysis_comment: Option<String>,
}

fn validate_sample_result(input: &SampleResultInput) -> Result<(), validator::ValidationError> {
    if !is_valid_param_cd(&input.param_cd) {
        return Err(validator::ValidationError::new("param_cd_format"));
    }
    if let Some(analysis_date) = input.analysis_date {
        if analysis_date < input.sample_date {
            return Err(validator::ValidationError::new("analysis_before_sampling"));
        }
    }
    Ok(())
}

impl SampleResultInput {
    pub fn normalized(self) -> Self {
        Self {
            lab_id: blank_to_none(self.lab_id),
            param_cd: self.param_cd.trim().to_string(),
            medium_cd: blank_to_none(self.medium_cd).map(|m| m.to_ascii_uppercase()),
            analysis_flag: blank_to_none(self.analysis_flag),
            analysis_qualifier: blank_to_none(self.analysis_qualifier),
            ..self
        }
    }
}

impl From<&SampleResult> for SampleResultInput {
    fn from(r: &SampleResult) -> Self {
        Self {
            lab_id: r.lab_id.clone(),
            sample_id: r.sample_id,
            param_cd: r.param_cd.clone(),
            medium_cd: r.medium_cd.clone(),
            sample_date: r.sample_date,
            prep_method: r.prep_method.clone(),
            analysis_method: r.analysis_method.clone(),
            analysis_flag: r.analysis_flag.clone(),
            analysis_result: r.analysis_result,
            analysis_unit: r.analysis_unit.clone(),
            detection_limit: r.detection_limit,
            reporting_limit: r.reporting_limit,
            analysis_qualifier: r.analysis_qualifier.clone(),
            disclaimer: r.disclaimer.clone(),
            analysis_date: r.analysis_date,
            order_comment: r.order_comment.clone(),
            analysis_comment: r.analysis_comment.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SampleResultPatch {
    #[serde(default, deserialize_with = "nullable")]
    pub lab_id: Option<Option<String>>,
    pub sample_id: Option<i32>,
    pub param_cd: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub medium_cd: Option<Option<String>>,
    pub sample_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "nullable")]
    pub prep_method: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub analysis_method: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub analysis_flag: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub analysis_result: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub analysis_unit: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub detection_limit: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub reporting_limit: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub analysis_qualifier: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub disclaimer: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub analysis_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "nullable")]
    pub order_comment: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub analysis_comment: Option<Option<String>>,
}

impl SampleResultPatch {
    pub fn apply(self, current: &SampleResult) -> SampleResultInput {
        let c = SampleResultInput::from(current);
        SampleResultInput {
            lab_id: patch_field(self.lab_id, c.lab_id),
            sample_id: self.sample_id.unwrap_or(c.sample_id),
            param_cd: self.param_cd.unwrap_or(c.param_cd),
            medium_cd: patch_field(self.medium_cd, c.medium_cd),
            sample_date: self.sample_date.unwrap_or(c.sample_date),
            prep_method: patch_field(self.prep_method, c.prep_method),
            analysis_method: patch_field(self.analysis_method, c.analysis_method),
            analysis_flag: patch_field(self.analysis_flag, c.analysis_flag),
            analysis_result: patch_field(self.analysis_result, c.analysis_result),
            analysis_unit: patch_field(self.analysis_unit, c.analysis_unit),
            detection_limit: patch_field(self.detection_limit, c.detection_limit),
            reporting_limit: patch_field(self.reporting_limit, c.reporting_limit),
            analysis_qualifier: patch_field(self.analysis_qualifier, c.analysis_qualifier),
            disclaimer: patch_field(self.disclaimer, c.disclaimer),
            analysis_date: patch_field(self.analysis_date, c.analysis_date),
            order_comment: patch_field(self.order_comment, c.order_comment),
            analysis_comment: patch_field(self.analysis_comment, c.analysis_comment),
        }
    }
}

/// Query filters for `GET /sample-results/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SampleResultFilter {
    pub facility_id: Option<i32>,
    pub sample_id: Option<i32>,
    pub param_cd: Option<String>,
    /// Inclusive lower bound on `sample_date`.
    pub start: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `sample_date`.
    pub end: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
