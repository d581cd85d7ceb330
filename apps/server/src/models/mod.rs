//! Domain models: row types read from PostgreSQL, validated input payloads
//! and partial-update patches for every entity in the hierarchy.

pub mod facility;
pub mod geojson;
pub mod pagination;
pub mod reference;
pub mod sample_id;
pub mod sample_result;
pub mod storage_tank;
pub mod waste_unit;

pub use facility::{Facility, FacilityInput, FacilityPatch, FacilityProperties};
pub use geojson::{Feature, FeatureCollection, ToFeature};
pub use pagination::{ListQuery, Page};
pub use reference::{is_valid_param_cd, normalize_param_cd, MediumCode, SampleParameter};
pub use sample_id::{SampleId, SampleIdInput, SampleIdPatch, SampleIdType, WellConstruction};
pub use sample_result::{SampleResult, SampleResultFilter, SampleResultInput, SampleResultPatch};
pub use storage_tank::{
    StorageTank, StorageTankInput, StorageTankPatch, TankStatus, TankType,
};
pub use waste_unit::{UnitType, WasteUnit, WasteUnitInput, WasteUnitPatch};

use serde::{Deserialize, Deserializer};

/// Deserialize a field that distinguishes "absent" from "explicitly null".
///
/// Use with `#[serde(default, deserialize_with = "nullable")]` on an
/// `Option<Option<T>>`: absent keeps the stored value, `null` clears it.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Resolve a nullable patch field against the current value.
pub(crate) fn patch_field<T>(patch: Option<Option<T>>, current: Option<T>) -> Option<T> {
    match patch {
        Some(value) => value,
        None => current,
    }
}

/// Blank strings coming from forms and loose clients are stored as NULL.
pub(crate) fn blank_to_none(value: Option<String>) -> Option<String> {
    value.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Shared validator for optional longitude/latitude pairs.
pub(crate) fn validate_coordinates(
    longitude: Option<f64>,
    latitude: Option<f64>,
) -> Result<(), validator::ValidationError> {
    if let Some(lon) = longitude {
        if !(-180.0..=180.0).contains(&lon) {
            return Err(validator::ValidationError::new("longitude_range"));
        }
    }
    if let Some(lat) = latitude {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(validator::ValidationError::new("latitude_range"));
        }
    }
    Ok(())
}
