//! Waste units: land-based containment features. Landfills and surface
//! impoundments share one table keyed by the `unit_type` discriminator.

use super::{geojson::check_geometry, nullable, patch_field, Feature, ToFeature};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::str::FromStr;
use validator::Validate;

/// Geometry types accepted on input; stored as MULTIPOLYGON.
pub const WASTE_UNIT_GEOMETRY_TYPES: &[&str] = &["Polygon", "MultiPolygon"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitType {
    Landfill,
    Impoundment,
}

impl UnitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Landfill => "landfill",
            Self::Impoundment => "impoundment",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Landfill => "Landfill",
            Self::Impoundment => "Surface impoundment",
        }
    }
}

impl FromStr for UnitType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "landfill" => Ok(Self::Landfill),
            "impoundment" | "surface_impoundment" => Ok(Self::Impoundment),
            other => Err(format!("unknown waste unit type '{other}'")),
        }
    }
}

impl TryFrom<String> for UnitType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct WasteUnit {
    pub unit_id: i32,
    pub name: String,
    pub facility_id: i32,
    pub facility_name: String,
    pub constructed_date: Option<NaiveDate>,
    #[sqlx(try_from = "String")]
    pub unit_type: UnitType,
    pub geometry: Option<JsonValue>,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WasteUnitProperties {
    pub facility: String,
    pub unit_id: i32,
    pub name: String,
    pub constructed_date: Option<NaiveDate>,
    pub unit_type: UnitType,
}

impl ToFeature for WasteUnit {
    type Properties = WasteUnitProperties;

    fn to_feature(&self) -> Feature<WasteUnitProperties> {
        Feature::new(
            WasteUnitProperties {
                facility: self.facility_name.clone(),
                unit_id: self.unit_id,
                name: self.name.clone(),
                constructed_date: self.constructed_date,
                unit_type: self.unit_type,
            },
            self.geometry.clone(),
        )
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_waste_unit"))]
pub struct WasteUnitInput {
    pub facility_id: i32,
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    pub constructed_date: Option<NaiveDate>,
    pub unit_type: UnitType,
    /// GeoJSON Polygon or MultiPolygon.
    pub geometry: Option<JsonValue>,
}

fn validate_waste_unit(input: &WasteUnitInput) -> Result<(), validator::ValidationError> {
    if let Some(geometry) = &input.geometry {
        check_geometry(geometry, WASTE_UNIT_GEOMETRY_TYPES).map_err(|msg| {
            let mut err = validator::ValidationError::new("geometry");
            err.message = Some(msg.into());
            err
        })?;
    }
    Ok(())
}

impl WasteUnitInput {
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            ..self
        }
    }
}

impl From<&WasteUnit> for WasteUnitInput {
    fn from(unit: &WasteUnit) -> Self {
        Self {
            facility_id: unit.facility_id,
            name: unit.name.clone(),
            constructed_date: unit.constructed_date,
            unit_type: unit.unit_type,
            geometry: unit.geometry.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WasteUnitPatch {
    pub facility_id: Option<i32>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub constructed_date: Option<Option<NaiveDate>>,
    pub unit_type: Option<UnitType>,
    #[serde(default, deserialize_with = "nullable")]
    pub geometry: Option<Option<JsonValue>>,
}

impl WasteUnitPatch {
    pub fn apply(self, current: &WasteUnit) -> WasteUnitInput {
        let current = WasteUnitInput::from(current);
        WasteUnitInput {
            facility_id: self.facility_id.unwrap_or(current.facility_id),
            name: self.name.unwrap_or(current.name),
            constructed_date: patch_field(self.constructed_date, current.constructed_date),
            unit_type: self.unit_type.unwrap_or(current.unit_type),
            geometry: patch_field(self.geometry, current.geometry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn input_accepts_polygon_geometry() {
        let input: WasteUnitInput = serde_json::from_value(json!({
            "facility_id": 1,
            "name": "Cell 1",
            "unit_type": "landfill",
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[-80.0, 40.0], [-80.01, 40.0], [-80.01, 40.01], [-80.0, 40.0]]]
            }
        }))
        .unwrap();
        assert!(input.validate().is_ok());
    }

    #[test]
    fn input_rejects_point_geometry() {
        let input: WasteUnitInput = serde_json::from_value(json!({
            "facility_id": 1,
            "name": "Pond A",
            "unit_type": "impoundment",
            "geometry": {"type": "Point", "coordinates": [-80.0, 40.0]}
        }))
        .unwrap();
        assert!(input.validate().is_err());
    }

    #[test]
    fn input_rejects_name_over_64_chars() {
        let input = WasteUnitInput {
            facility_id: 1,
            name: "x".repeat(65),
            constructed_date: None,
            unit_type: UnitType::Landfill,
            geometry: None,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn unit_type_accepts_long_impoundment_name() {
        assert_eq!(
            "surface_impoundment".parse::<UnitType>().unwrap(),
            UnitType::Impoundment
        );
    }
}
