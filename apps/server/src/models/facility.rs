//! Facility: a regulated site that owns tanks, waste units and sample points.

use super::{blank_to_none, nullable, patch_field, validate_coordinates, Feature, ToFeature};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use validator::Validate;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Facility {
    pub facility_id: i32,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    /// GeoJSON produced by PostGIS from the stored geography.
    pub geometry: Option<JsonValue>,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FacilityProperties {
    pub facility_id: i32,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
}

impl ToFeature for Facility {
    type Properties = FacilityProperties;

    fn to_feature(&self) -> Feature<FacilityProperties> {
        Feature::new(
            FacilityProperties {
                facility_id: self.facility_id,
                name: self.name.clone(),
                address: self.address.clone(),
                city: self.city.clone(),
                state: self.state.clone(),
                zipcode: self.zipcode.clone(),
            },
            self.geometry.clone(),
        )
    }
}

/// Full set of writable facility columns.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[validate(schema(function = "validate_facility_coordinates"))]
pub struct FacilityInput {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[validate(length(max = 100))]
    pub address: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 2))]
    pub state: Option<String>,
    #[validate(length(max = 10))]
    pub zipcode: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
}

fn validate_facility_coordinates(input: &FacilityInput) -> Result<(), validator::ValidationError> {
    validate_coordinates(input.longitude, input.latitude)
}

impl FacilityInput {
    /// Trim text fields and turn blanks into NULLs before validation.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            address: blank_to_none(self.address),
            city: blank_to_none(self.city),
            state: blank_to_none(self.state).map(|s| s.to_ascii_uppercase()),
            zipcode: blank_to_none(self.zipcode),
            longitude: self.longitude,
            latitude: self.latitude,
        }
    }
}

impl From<&Facility> for FacilityInput {
    fn from(facility: &Facility) -> Self {
        Self {
            name: facility.name.clone(),
            address: facility.address.clone(),
            city: facility.city.clone(),
            state: facility.state.clone(),
            zipcode: facility.zipcode.clone(),
            longitude: facility.longitude,
            latitude: facility.latitude,
        }
    }
}

/// Partial update: absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FacilityPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub city: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub state: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub zipcode: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub longitude: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub latitude: Option<Option<f64>>,
}

impl FacilityPatch {
    pub fn apply(self, current: &Facility) -> FacilityInput {
        let current = FacilityInput::from(current);
        FacilityInput {
            name: self.name.unwrap_or(current.name),
            address: patch_field(self.address, current.address),
            city: patch_field(self.city, current.city),
            state: patch_field(self.state, current.state),
            zipcode: patch_field(self.zipcode, current.zipcode),
            longitude: patch_field(self.longitude, current.longitude),
            latitude: patch_field(self.latitude, current.latitude),
        }
    }
}
