//! Sample locations ("sample IDs").
//!
//! Joined-table inheritance: every location has a `sample_ids` row; wells
//! and piezometers additionally own a row in `monitoring_wells` or
//! `piezometers` holding their construction details.

use super::{blank_to_none, nullable, patch_field, validate_coordinates, Feature, ToFeature};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::str::FromStr;
use validator::Validate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleIdType {
    /// Plain sampling point without a subtype table (surface water, soil, ...)
    #[default]
    SampleId,
    MonitoringWell,
    Piezometer,
}

impl SampleIdType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SampleId => "sample_id",
            Self::MonitoringWell => "monitoring_well",
            Self::Piezometer => "piezometer",
        }
    }

    /// Subtype table holding the construction row, if any.
    pub fn subtype_table(&self) -> Option<&'static str> {
        match self {
            Self::SampleId => None,
            Self::MonitoringWell => Some("monitoring_wells"),
            Self::Piezometer => Some("piezometers"),
        }
    }
}

impl FromStr for SampleIdType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sample_id" => Ok(Self::SampleId),
            "monitoring_well" | "well" => Ok(Self::MonitoringWell),
            "piezometer" => Ok(Self::Piezometer),
            other => Err(format!("unknown sample id type '{other}'")),
        }
    }
}

impl TryFrom<String> for SampleIdType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Construction details shared by monitoring wells and piezometers.
/// Depths are in feet below top of riser, diameter in inches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, sqlx::FromRow)]
#[validate(schema(function = "validate_screen_interval"))]
pub struct WellConstruction {
    #[validate(range(min = 0.0))]
    pub top_riser: Option<f64>,
    #[validate(range(min = 0.0))]
    pub top_screen: Option<f64>,
    #[validate(range(min = 0.0))]
    pub bottom_screen: Option<f64>,
    #[validate(range(min = 0.0))]
    pub bottom_well: Option<f64>,
    #[validate(range(min = 0.0))]
    pub well_diameter: Option<f64>,
    pub screen_type: Option<String>,
    pub riser_pipe_desc: Option<String>,
}

fn validate_screen_interval(c: &WellConstruction) -> Result<(), validator::ValidationError> {
    if let (Some(top), Some(bottom)) = (c.top_screen, c.bottom_screen) {
        if bottom < top {
            return Err(validator::ValidationError::new("bottom_screen_above_top_screen"));
        }
    }
    if let (Some(bottom_screen), Some(bottom_well)) = (c.bottom_screen, c.bottom_well) {
        if bottom_well < bottom_screen {
            return Err(validator::ValidationError::new("bottom_well_above_bottom_screen"));
        }
    }
    Ok(())
}

/// Flat row produced by joining the base table with both subtype tables.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SampleIdRow {
    pub sample_id: i32,
    pub facility_id: i32,
    pub facility_name: String,
    pub name: String,
    pub description: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub geometry: Option<JsonValue>,
    #[sqlx(try_from = "String")]
    pub sample_id_type: SampleIdType,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
    #[sqlx(flatten)]
    pub construction: WellConstruction,
}

#[derive(Debug, Clone, Serialize)]
pub struct SampleId {
    pub sample_id: i32,
    pub facility_id: i32,
    pub facility_name: String,
    pub name: String,
    pub description: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub geometry: Option<JsonValue>,
    pub sample_id_type: SampleIdType,
    pub construction: Option<WellConstruction>,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

impl From<SampleIdRow> for SampleId {
    fn from(row: SampleIdRow) -> Self {
        let construction = match row.sample_id_type {
            SampleIdType::SampleId => None,
            _ => Some(row.construction),
        };
        Self {
            sample_id: row.sample_id,
            facility_id: row.facility_id,
            facility_name: row.facility_name,
            name: row.name,
            description: row.description,
            longitude: row.longitude,
            latitude: row.latitude,
            geometry: row.geometry,
            sample_id_type: row.sample_id_type,
            construction,
            created_on: row.created_on,
            updated_on: row.updated_on,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SampleIdProperties {
    pub facility: String,
    pub sample_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub sample_id_type: SampleIdType,
}

impl ToFeature for SampleId {
    type Properties = SampleIdProperties;

    fn to_feature(&self) -> Feature<SampleIdProperties> {
        Feature::new(
            SampleIdProperties {
                facility: self.facility_name.clone(),
                sample_id: self.sample_id,
                name: self.name.clone(),
                description: self.description.clone(),
                sample_id_type: self.sample_id_type,
            },
            self.geometry.clone(),
        )
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_sample_id"))]
pub struct SampleIdInput {
    pub facility_id: i32,
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    pub description: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    #[serde(default)]
    pub sample_id_type: SampleIdType,
    #[validate(nested)]
    pub construction: Option<WellConstruction>,
}

fn validate_sample_id(input: &SampleIdInput) -> Result<(), validator::ValidationError> {
    if input.sample_id_type == SampleIdType::SampleId && input.construction.is_some() {
        return Err(validator::ValidationError::new(
            "construction_requires_well_type",
        ));
    }
    validate_coordinates(input.longitude, input.latitude)
}

impl SampleIdInput {
    pub fn normalized(self) -> Self {
        let construction = match self.sample_id_type {
            // Wells always get a subtype row, even when no details are known yet.
            SampleIdType::MonitoringWell | SampleIdType::Piezometer => {
                Some(self.construction.unwrap_or_default())
            }
            SampleIdType::SampleId => self.construction,
        };
        Self {
            name: self.name.trim().to_string(),
            description: blank_to_none(self.description),
            construction,
            ..self
        }
    }
}

impl From<&SampleId> for SampleIdInput {
    fn from(sample: &SampleId) -> Self {
        Self {
            facility_id: sample.facility_id,
            name: sample.name.clone(),
            description: sample.description.clone(),
            longitude: sample.longitude,
            latitude: sample.latitude,
            sample_id_type: sample.sample_id_type,
            construction: sample.construction.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SampleIdPatch {
    pub facility_id: Option<i32>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub longitude: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub latitude: Option<Option<f64>>,
    pub sample_id_type: Option<SampleIdType>,
    #[serde(default, deserialize_with = "nullable")]
    pub construction: Option<Option<WellConstruction>>,
}

impl SampleIdPatch {
    pub fn apply(self, current: &SampleId) -> SampleIdInput {
        let current = SampleIdInput::from(current);
        let sample_id_type = self.sample_id_type.unwrap_or(current.sample_id_type);
        // Downgrading to a plain sample point drops the construction details.
        let construction = if sample_id_type == SampleIdType::SampleId && self.construction.is_none()
        {
            None
        } else {
            patch_field(self.construction, current.construction)
        };
        SampleIdInput {
            facility_id: self.facility_id.unwrap_or(current.facility_id),
            name: self.name.unwrap_or(current.name),
            description: patch_field(self.description, current.description),
            longitude: patch_field(self.longitude, current.longitude),
            latitude: patch_field(self.latitude, current.latitude),
            sample_id_type,
            construction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn well() -> SampleId {
        SampleId {
            sample_id: 9,
            facility_id: 1,
            facility_name: "test site".into(),
            name: "MW-1".into(),
            description: None,
            longitude: Some(-80.0),
            latitude: Some(40.0),
            geometry: None,
            sample_id_type: SampleIdType::MonitoringWell,
            construction: Some(WellConstruction {
                top_screen: Some(10.0),
                bottom_screen: Some(20.0),
                bottom_well: Some(21.0),
                well_diameter: Some(2.0),
                ..Default::default()
            }),
            created_on: Utc::now(),
            updated_on: Utc::now(),
        }
    }

    #[test]
    fn row_without_subtype_has_no_construction() {
        let row = SampleIdRow {
            sample_id: 1,
            facility_id: 1,
            facility_name: "f".into(),
            name: "SW-1".into(),
            description: None,
            longitude: None,
            latitude: None,
            geometry: None,
            sample_id_type: SampleIdType::SampleId,
            created_on: Utc::now(),
            updated_on: Utc::now(),
            construction: WellConstruction::default(),
        };
        assert!(SampleId::from(row).construction.is_none());
    }

    #[test]
    fn screen_interval_must_be_ordered() {
        let construction = WellConstruction {
            top_screen: Some(20.0),
            bottom_screen: Some(10.0),
            ..Default::default()
        };
        assert!(construction.validate().is_err());
    }

    #[test]
    fn plain_sample_id_rejects_construction() {
        let input: SampleIdInput = serde_json::from_value(json!({
            "facility_id": 1,
            "name": "SW-1",
            "construction": {"top_riser": 1.0}
        }))
        .unwrap();
        assert_eq!(input.sample_id_type, SampleIdType::SampleId);
        assert!(input.validate().is_err());
    }

    #[test]
    fn nested_construction_is_validated() {
        let input: SampleIdInput = serde_json::from_value(json!({
            "facility_id": 1,
            "name": "PZ-1",
            "sample_id_type": "piezometer",
            "construction": {"bottom_well": -4.0}
        }))
        .unwrap();
        assert!(input.validate().is_err());
    }

    #[test]
    fn well_input_gets_default_construction() {
        let input: SampleIdInput = serde_json::from_value(json!({
            "facility_id": 1,
            "name": "MW-2",
            "sample_id_type": "monitoring_well"
        }))
        .unwrap();
        assert_eq!(
            input.normalized().construction,
            Some(WellConstruction::default())
        );
    }

    #[test]
    fn patch_to_plain_type_drops_construction() {
        let patch: SampleIdPatch =
            serde_json::from_value(json!({"sample_id_type": "sample_id"})).unwrap();
        let merged = patch.apply(&well());
        assert_eq!(merged.sample_id_type, SampleIdType::SampleId);
        assert!(merged.construction.is_none());
        assert!(merged.validate().is_ok());
    }

    #[test]
    fn patch_to_piezometer_keeps_construction() {
        let patch: SampleIdPatch =
            serde_json::from_value(json!({"sample_id_type": "piezometer"})).unwrap();
        let merged = patch.apply(&well());
        assert_eq!(merged.sample_id_type, SampleIdType::Piezometer);
        assert_eq!(merged.construction.unwrap().well_diameter, Some(2.0));
    }

    #[test]
    fn serialized_sample_id_exposes_type_and_construction() {
        let value = serde_json::to_value(well()).unwrap();
        assert_eq!(value["sample_id_type"], "monitoring_well");
        assert_eq!(value["construction"]["top_screen"], 10.0);
    }
}
