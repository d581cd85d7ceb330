//! Storage tanks. Underground (UST) and aboveground (AST) tanks share one
//! table; the subtype is the `tank_type` discriminator.

use super::{blank_to_none, nullable, patch_field, validate_coordinates, Feature, ToFeature};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TankType {
    /// Underground storage tank
    Ust,
    /// Aboveground storage tank
    Ast,
}

impl TankType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ust => "ust",
            Self::Ast => "ast",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Ust => "UST",
            Self::Ast => "AST",
        }
    }
}

impl FromStr for TankType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ust" | "underground" => Ok(Self::Ust),
            "ast" | "aboveground" => Ok(Self::Ast),
            other => Err(format!("unknown tank type '{other}'")),
        }
    }
}

impl TryFrom<String> for TankType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for TankType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TankStatus {
    #[default]
    Active,
    Inactive,
    Closed,
}

impl TankStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Closed => "closed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::Closed => "Closed",
        }
    }
}

impl FromStr for TankStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "closed" => Ok(Self::Closed),
            other => Err(format!("unknown tank status '{other}'")),
        }
    }
}

impl TryFrom<String> for TankStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StorageTank {
    pub tank_id: i32,
    pub tank_registration_id: Option<String>,
    pub facility_id: i32,
    pub facility_name: String,
    pub date_installed: Option<NaiveDate>,
    pub date_removed: Option<NaiveDate>,
    pub capacity: Option<i32>,
    pub stored_substance: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: TankStatus,
    #[sqlx(try_from = "String")]
    pub tank_type: TankType,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub geometry: Option<JsonValue>,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StorageTankProperties {
    pub facility: String,
    pub tank_id: i32,
    pub tank_registration_id: Option<String>,
    pub capacity: Option<i32>,
    pub stored_substance: Option<String>,
    pub status: TankStatus,
    pub tank_type: TankType,
}

impl ToFeature for StorageTank {
    type Properties = StorageTankProperties;

    fn to_feature(&self) -> Feature<StorageTankProperties> {
        Feature::new(
            StorageTankProperties {
                facility: self.facility_name.clone(),
                tank_id: self.tank_id,
                tank_registration_id: self.tank_registration_id.clone(),
                capacity: self.capacity,
                stored_substance: self.stored_substance.clone(),
                status: self.status,
                tank_type: self.tank_type,
            },
            self.geometry.clone(),
        )
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_storage_tank"))]
pub struct StorageTankInput {
    pub facility_id: i32,
    #[validate(length(max = 12))]
    pub tank_registration_id: Option<String>,
    pub date_installed: Option<NaiveDate>,
    pub date_removed: Option<NaiveDate>,
    #[validate(range(min = 0))]
    pub capacity: Option<i32>,
    #[validate(length(max = 64))]
    pub stored_substance: Option<String>,
    #[serde(default)]
    pub status: TankStatus,
    pub tank_type: TankType,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
}

fn validate_storage_tank(input: &StorageTankInput) -> Result<(), validator::ValidationError> {
    if let (Some(installed), Some(removed)) = (input.date_installed, input.date_removed) {
        if removed < installed {
            return Err(validator::ValidationError::new("removed_before_installed"));
        }
    }
    validate_coordinates(input.longitude, input.latitude)
}

impl StorageTankInput {
    pub fn normalized(self) -> Self {
        Self {
            tank_registration_id: blank_to_none(self.tank_registration_id),
            stored_substance: blank_to_none(self.stored_substance),
            ..self
        }
    }
}

impl From<&StorageTank> for StorageTankInput {
    fn from(tank: &StorageTank) -> Self {
        Self {
            facility_id: tank.facility_id,
            tank_registration_id: tank.tank_registration_id.clone(),
            date_installed: tank.date_installed,
            date_removed: tank.date_removed,
            capacity: tank.capacity,
            stored_substance: tank.stored_substance.clone(),
            status: tank.status,
            tank_type: tank.tank_type,
            longitude: tank.longitude,
            latitude: tank.latitude,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageTankPatch {
    pub facility_id: Option<i32>,
    #[serde(default, deserialize_with = "nullable")]
    pub tank_registration_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub date_installed: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "nullable")]
    pub date_removed: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "nullable")]
    pub capacity: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub stored_substance: Option<Option<String>>,
    pub status: Option<TankStatus>,
    pub tank_type: Option<TankType>,
    #[serde(default, deserialize_with = "nullable")]
    pub longitude: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub latitude: Option<Option<f64>>,
}

impl StorageTankPatch {
    pub fn apply(self, current: &StorageTank) -> StorageTankInput {
        let current = StorageTankInput::from(current);
        StorageTankInput {
            facility_id: self.facility_id.unwrap_or(current.facility_id),
            tank_registration_id: patch_field(
                self.tank_registration_id,
                current.tank_registration_id,
            ),
            date_installed: patch_field(self.date_installed, current.date_installed),
            date_removed: patch_field(self.date_removed, current.date_removed),
            capacity: patch_field(self.capacity, current.capacity),
            stored_substance: patch_field(self.stored_substance, current.stored_substance),
            status: self.status.unwrap_or(current.status),
            tank_type: self.tank_type.unwrap_or(current.tank_type),
            longitude: patch_field(self.longitude, current.longitude),
            latitude: patch_field(self.latitude, current.latitude),
        }
    }
}
