//! HTML form payloads.
//!
//! Browsers submit every field as a string, so each form keeps the raw text
//! (for re-rendering) and converts it into the typed API input, collecting
//! per-field messages instead of failing on the first problem.

use crate::models::{
    FacilityInput, StorageTankInput, TankStatus, TankType, UnitType, WasteUnitInput,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, str::FromStr};
use validator::{Validate, ValidationErrors};

/// Field name → messages. Errors not tied to a field use `form`.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub const FORM_WIDE: &str = "form";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FacilityForm {
    #[serde(skip_serializing)]
    pub csrf_token: Option<String>,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub longitude: String,
    pub latitude: String,
}

impl FacilityForm {
    pub fn from_input(input: &FacilityInput) -> Self {
        Self {
            csrf_token: None,
            name: input.name.clone(),
            address: input.address.clone().unwrap_or_default(),
            city: input.city.clone().unwrap_or_default(),
            state: input.state.clone().unwrap_or_default(),
            zipcode: input.zipcode.clone().unwrap_or_default(),
            longitude: display_opt(input.longitude),
            latitude: display_opt(input.latitude),
        }
    }

    pub fn to_input(&self) -> Result<FacilityInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let longitude = parse_opt::<f64>(&self.longitude, "longitude", &mut errors);
        let latitude = parse_opt::<f64>(&self.latitude, "latitude", &mut errors);

        let input = FacilityInput {
            name: self.name.clone(),
            address: text_opt(&self.address),
            city: text_opt(&self.city),
            state: text_opt(&self.state),
            zipcode: text_opt(&self.zipcode),
            longitude,
            latitude,
        }
        .normalized();

        if input.name.is_empty() {
            push_error(&mut errors, "name", "This field is required.");
        }
        finish(input, errors)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageTankForm {
    #[serde(skip_serializing)]
    pub csrf_token: Option<String>,
    pub tank_registration_id: String,
    pub capacity: String,
    pub stored_substance: String,
    pub status: String,
    pub tank_type: String,
    pub date_installed: String,
    pub longitude: String,
    pub latitude: String,
}

impl Default for StorageTankForm {
    fn default() -> Self {
        Self {
            csrf_token: None,
            tank_registration_id: String::new(),
            capacity: String::new(),
            stored_substance: String::new(),
            status: TankStatus::Active.as_str().to_string(),
            tank_type: TankType::Ust.as_str().to_string(),
            date_installed: String::new(),
            longitude: String::new(),
            latitude: String::new(),
        }
    }
}

impl StorageTankForm {
    pub fn to_input(&self, facility_id: i32) -> Result<StorageTankInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let capacity = parse_opt::<i32>(&self.capacity, "capacity", &mut errors);
        let date_installed = parse_opt::<NaiveDate>(&self.date_installed, "date_installed", &mut errors);
        let longitude = parse_opt::<f64>(&self.longitude, "longitude", &mut errors);
        let latitude = parse_opt::<f64>(&self.latitude, "latitude", &mut errors);
        let status = parse_choice::<TankStatus>(&self.status, "status", &mut errors);
        let tank_type = parse_choice::<TankType>(&self.tank_type, "tank_type", &mut errors);

        let (Some(status), Some(tank_type)) = (status, tank_type) else {
            return Err(errors);
        };

        let input = StorageTankInput {
            facility_id,
            tank_registration_id: text_opt(&self.tank_registration_id),
            date_installed,
            date_removed: None,
            capacity,
            stored_substance: text_opt(&self.stored_substance),
            status,
            tank_type,
            longitude,
            latitude,
        }
        .normalized();
        finish(input, errors)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WasteUnitForm {
    #[serde(skip_serializing)]
    pub csrf_token: Option<String>,
    pub name: String,
    pub unit_type: String,
    pub constructed_date: String,
}

impl Default for WasteUnitForm {
    fn default() -> Self {
        Self {
            csrf_token: None,
            name: String::new(),
            unit_type: UnitType::Landfill.as_str().to_string(),
            constructed_date: String::new(),
        }
    }
}

impl WasteUnitForm {
    pub fn to_input(&self, facility_id: i32) -> Result<WasteUnitInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let constructed_date =
            parse_opt::<NaiveDate>(&self.constructed_date, "constructed_date", &mut errors);
        let Some(unit_type) = parse_choice::<UnitType>(&self.unit_type, "unit_type", &mut errors)
        else {
            return Err(errors);
        };

        let input = WasteUnitInput {
            facility_id,
            name: self.name.clone(),
            constructed_date,
            unit_type,
            geometry: None,
        }
        .normalized();

        if input.name.is_empty() {
            push_error(&mut errors, "name", "This field is required.");
        }
        finish(input, errors)
    }
}

/// Form submitting nothing but the CSRF token (delete buttons).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenForm {
    pub csrf_token: Option<String>,
}

fn finish<T: Validate>(input: T, mut errors: FieldErrors) -> Result<T, FieldErrors> {
    if let Err(validation) = input.validate() {
        merge_validation_errors(&mut errors, &validation);
    }
    if errors.is_empty() {
        Ok(input)
    } else {
        Err(errors)
    }
}

fn merge_validation_errors(errors: &mut FieldErrors, validation: &ValidationErrors) {
    for (field, field_errors) in validation.field_errors() {
        for err in field_errors {
            // Parse failures already explain the problem with this field.
            if errors.contains_key::<str>(field.as_ref()) {
                continue;
            }
            let message = err
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| describe(err));
            push_error(errors, field.as_ref(), &message);
        }
    }
}

fn describe(err: &validator::ValidationError) -> String {
    match err.code.as_ref() {
        "length" => match err.params.get("max") {
            Some(max) => format!("Field cannot be longer than {max} characters."),
            None => "Field is too short.".to_string(),
        },
        "range" => "Value is out of range.".to_string(),
        "removed_before_installed" => "Removal date precedes installation date.".to_string(),
        "longitude_range" => "Longitude must lie between -180 and 180.".to_string(),
        "latitude_range" => "Latitude must lie between -90 and 90.".to_string(),
        other => other.replace('_', " "),
    }
}

fn push_error(errors: &mut FieldErrors, field: &str, message: &str) {
    let key = if field.is_empty() { FORM_WIDE } else { field };
    errors
        .entry(key.to_string())
        .or_default()
        .push(message.to_string());
}

fn text_opt(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_opt<T: FromStr>(raw: &str, field: &str, errors: &mut FieldErrors) -> Option<T> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            push_error(errors, field, "Not a valid value.");
            None
        }
    }
}

fn parse_choice<T: FromStr>(raw: &str, field: &str, errors: &mut FieldErrors) -> Option<T> {
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            push_error(errors, field, "Not a valid choice.");
            None
        }
    }
}

fn display_opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facility_form(name: &str) -> FacilityForm {
        FacilityForm {
            name: name.into(),
            ..Default::default()
        }
    }

    #[test]
    fn blank_optional_fields_become_none() {
        let mut form = facility_form("Acme Plant");
        form.city = "   ".into();
        form.state = "pa".into();
        let input = form.to_input().unwrap();
        assert_eq!(input.city, None);
        assert_eq!(input.state.as_deref(), Some("PA"));
        assert_eq!(input.longitude, None);
    }

    #[test]
    fn name_is_required() {
        let errors = facility_form("  ").to_input().unwrap_err();
        assert!(errors.contains_key("name"));
    }

    #[test]
    fn bad_number_reports_the_field() {
        let mut form = facility_form("Acme");
        form.longitude = "west".into();
        form.latitude = "40.5".into();
        let errors = form.to_input().unwrap_err();
        assert_eq!(errors["longitude"], vec!["Not a valid value.".to_string()]);
    }

    #[test]
    fn long_state_is_rejected() {
        let mut form = facility_form("Acme");
        form.state = "PENN".into();
        let errors = form.to_input().unwrap_err();
        assert!(errors.contains_key("state"));
    }

    #[test]
    fn tank_form_parses_choices_and_capacity() {
        let form = StorageTankForm {
            capacity: "10000".into(),
            tank_type: "ast".into(),
            status: "closed".into(),
            ..Default::default()
        };
        let input = form.to_input(3).unwrap();
        assert_eq!(input.facility_id, 3);
        assert_eq!(input.capacity, Some(10000));
        assert_eq!(input.tank_type, TankType::Ast);
        assert_eq!(input.status, TankStatus::Closed);
    }

    #[test]
    fn tank_form_rejects_unknown_type() {
        let form = StorageTankForm {
            tank_type: "silo".into(),
            ..Default::default()
        };
        let errors = form.to_input(1).unwrap_err();
        assert!(errors.contains_key("tank_type"));
    }

    #[test]
    fn waste_unit_form_requires_name() {
        let errors = WasteUnitForm::default().to_input(1).unwrap_err();
        assert!(errors.contains_key("name"));

        let form = WasteUnitForm {
            name: "Cell 1".into(),
            unit_type: "impoundment".into(),
            constructed_date: "1985-06-01".into(),
            ..Default::default()
        };
        let input = form.to_input(1).unwrap();
        assert_eq!(input.unit_type, UnitType::Impoundment);
        assert!(input.constructed_date.is_some());
    }

    #[test]
    fn form_round_trips_from_input() {
        let input = facility_form("Acme").to_input().unwrap();
        let form = FacilityForm::from_input(&input);
        assert_eq!(form.name, "Acme");
        assert_eq!(form.longitude, "");
    }
}
