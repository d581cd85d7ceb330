//! HTML page handlers.
//!
//! Every POST verifies the CSRF token before reading or writing anything.
//! Invalid forms are re-rendered with field errors (422); successful
//! submissions redirect with `303 See Other`.

use super::parse_id;
use crate::{
    csrf::CsrfToken,
    models::{
        reference::ParameterQuery, Facility, FacilityInput, TankStatus, TankType, UnitType,
    },
    state::AppState,
    views::{
        forms::FORM_WIDE, html_response, see_other, FacilityForm, FieldErrors, HtmlError, PageResult,
        StorageTankForm, TokenForm, WasteUnitForm,
    },
    Error,
};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Form,
};
use serde::{Deserialize, Serialize};
use tera::Context;

#[derive(Debug, Default, Deserialize)]
pub struct IndexQuery {
    pub page: Option<u32>,
}

/// Select option rendered by the form templates.
#[derive(Debug, Serialize)]
struct Choice {
    value: &'static str,
    label: &'static str,
}

fn render(
    state: &AppState,
    template: &str,
    context: &Context,
    status: StatusCode,
    csrf: Option<&CsrfToken>,
) -> PageResult {
    let mut context = context.clone();
    context.insert("admin_email", &state.config.app.admin_email);
    let body = state.templates.render(template, &context)?;
    Ok(html_response(status, body, csrf))
}

fn issue_token(state: &AppState, headers: &HeaderMap, context: &mut Context) -> Result<CsrfToken, HtmlError> {
    let token = state.csrf.issue(headers)?;
    context.insert("csrf_token", &token.token);
    Ok(token)
}

fn verify_token(state: &AppState, headers: &HeaderMap, token: Option<&str>) -> Result<(), HtmlError> {
    state.csrf.verify(headers, token).map_err(|e| {
        tracing::warn!(error = %e, "Rejected form post");
        HtmlError(e)
    })
}

/// Errors a user can fix by editing the form are shown on the form.
fn form_error(err: Error) -> Result<(StatusCode, FieldErrors), HtmlError> {
    match err {
        Error::Validation(_) | Error::Conflict(_) | Error::InvalidReference(_) => {
            let mut errors = FieldErrors::new();
            errors.insert(FORM_WIDE.to_string(), vec![err.to_string()]);
            Ok((err.status_code(), errors))
        }
        other => Err(HtmlError(other)),
    }
}

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<IndexQuery>,
) -> PageResult {
    let page = state
        .facility_service
        .page(query.page.unwrap_or(1))
        .await?;
    let mut context = Context::new();
    context.insert("page", &page);
    render(&state, "index.html", &context, StatusCode::OK, None)
}

// Facilities

fn facility_form_context(
    title: &str,
    action: &str,
    values: &FacilityForm,
    errors: &FieldErrors,
    facility: Option<&Facility>,
) -> Context {
    let mut context = Context::new();
    context.insert("title", title);
    context.insert("action", action);
    context.insert("values", values);
    context.insert("errors", errors);
    if let Some(facility) = facility {
        context.insert("facility", facility);
    }
    context
}

pub async fn new_facility_form(State(state): State<AppState>, headers: HeaderMap) -> PageResult {
    let mut context = facility_form_context(
        "New facility",
        "/facilities/new",
        &FacilityForm::default(),
        &FieldErrors::new(),
        None,
    );
    let token = issue_token(&state, &headers, &mut context)?;
    render(&state, "facility_form.html", &context, StatusCode::OK, Some(&token))
}

pub async fn create_facility(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<FacilityForm>,
) -> PageResult {
    verify_token(&state, &headers, form.csrf_token.as_deref())?;

    let (status, errors) = match form.to_input() {
        Ok(input) => match state.facility_service.create(input).await {
            Ok(facility) => return Ok(see_other(&format!("/facilities/{}", facility.facility_id))),
            Err(err) => form_error(err)?,
        },
        Err(errors) => (StatusCode::UNPROCESSABLE_ENTITY, errors),
    };

    let mut context = facility_form_context("New facility", "/facilities/new", &form, &errors, None);
    let token = issue_token(&state, &headers, &mut context)?;
    render(&state, "facility_form.html", &context, status, Some(&token))
}

pub async fn facility_detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> PageResult {
    let facility_id = parse_id("Facility", &id)?;
    let detail = state.facility_service.detail(facility_id).await?;

    let mut context = Context::new();
    context.insert("facility", &detail.facility);
    context.insert("storage_tanks", &detail.storage_tanks);
    context.insert("waste_units", &detail.waste_units);
    context.insert("sample_ids", &detail.sample_ids);
    let token = issue_token(&state, &headers, &mut context)?;
    render(&state, "facility_detail.html", &context, StatusCode::OK, Some(&token))
}

pub async fn edit_facility_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> PageResult {
    let facility_id = parse_id("Facility", &id)?;
    let facility = state.facility_service.get(facility_id).await?;
    let values = FacilityForm::from_input(&FacilityInput::from(&facility));

    let mut context = facility_form_context(
        "Edit facility",
        &format!("/facilities/{facility_id}/edit"),
        &values,
        &FieldErrors::new(),
        Some(&facility),
    );
    let token = issue_token(&state, &headers, &mut context)?;
    render(&state, "facility_form.html", &context, StatusCode::OK, Some(&token))
}

pub async fn update_facility(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Form(form): Form<FacilityForm>,
) -> PageResult {
    verify_token(&state, &headers, form.csrf_token.as_deref())?;
    let facility_id = parse_id("Facility", &id)?;
    let facility = state.facility_service.get(facility_id).await?;

    let (status, errors) = match form.to_input() {
        Ok(input) => match state.facility_service.replace(facility_id, input).await {
            Ok(_) => return Ok(see_other(&format!("/facilities/{facility_id}"))),
            Err(err) => form_error(err)?,
        },
        Err(errors) => (StatusCode::UNPROCESSABLE_ENTITY, errors),
    };

    let mut context = facility_form_context(
        "Edit facility",
        &format!("/facilities/{facility_id}/edit"),
        &form,
        &errors,
        Some(&facility),
    );
    let token = issue_token(&state, &headers, &mut context)?;
    render(&state, "facility_form.html", &context, status, Some(&token))
}

pub async fn delete_facility(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Form(form): Form<TokenForm>,
) -> PageResult {
    verify_token(&state, &headers, form.csrf_token.as_deref())?;
    let facility_id = parse_id("Facility", &id)?;
    state.facility_service.delete(facility_id).await?;
    Ok(see_other("/"))
}

// Storage tanks

fn tank_form_context(facility: &Facility, values: &StorageTankForm, errors: &FieldErrors) -> Context {
    let statuses: Vec<Choice> = [TankStatus::Active, TankStatus::Inactive, TankStatus::Closed]
        .into_iter()
        .map(|s| Choice {
            value: s.as_str(),
            label: s.label(),
        })
        .collect();
    let tank_types: Vec<Choice> = [TankType::Ust, TankType::Ast]
        .into_iter()
        .map(|t| Choice {
            value: t.as_str(),
            label: t.label(),
        })
        .collect();

    let mut context = Context::new();
    context.insert("facility", facility);
    context.insert("action", &format!("/facilities/{}/storage-tanks/new", facility.facility_id));
    context.insert("values", values);
    context.insert("errors", errors);
    context.insert("statuses", &statuses);
    context.insert("tank_types", &tank_types);
    context
}

pub async fn new_storage_tank_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> PageResult {
    let facility = state.facility_service.get(parse_id("Facility", &id)?).await?;
    let mut context = tank_form_context(&facility, &StorageTankForm::default(), &FieldErrors::new());
    let token = issue_token(&state, &headers, &mut context)?;
    render(&state, "storage_tank_form.html", &context, StatusCode::OK, Some(&token))
}

pub async fn create_storage_tank(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Form(form): Form<StorageTankForm>,
) -> PageResult {
    verify_token(&state, &headers, form.csrf_token.as_deref())?;
    let facility = state.facility_service.get(parse_id("Facility", &id)?).await?;

    let (status, errors) = match form.to_input(facility.facility_id) {
        Ok(input) => match state.storage_tank_service.create(input).await {
            Ok(_) => return Ok(see_other(&format!("/facilities/{}", facility.facility_id))),
            Err(err) => form_error(err)?,
        },
        Err(errors) => (StatusCode::UNPROCESSABLE_ENTITY, errors),
    };

    let mut context = tank_form_context(&facility, &form, &errors);
    let token = issue_token(&state, &headers, &mut context)?;
    render(&state, "storage_tank_form.html", &context, status, Some(&token))
}

// Waste units

fn unit_form_context(facility: &Facility, values: &WasteUnitForm, errors: &FieldErrors) -> Context {
    let unit_types: Vec<Choice> = [UnitType::Landfill, UnitType::Impoundment]
        .into_iter()
        .map(|u| Choice {
            value: u.as_str(),
            label: u.label(),
        })
        .collect();

    let mut context = Context::new();
    context.insert("facility", facility);
    context.insert("action", &format!("/facilities/{}/waste-units/new", facility.facility_id));
    context.insert("values", values);
    context.insert("errors", errors);
    context.insert("unit_types", &unit_types);
    context
}

pub async fn new_waste_unit_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> PageResult {
    let facility = state.facility_service.get(parse_id("Facility", &id)?).await?;
    let mut context = unit_form_context(&facility, &WasteUnitForm::default(), &FieldErrors::new());
    let token = issue_token(&state, &headers, &mut context)?;
    render(&state, "waste_unit_form.html", &context, StatusCode::OK, Some(&token))
}

pub async fn create_waste_unit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Form(form): Form<WasteUnitForm>,
) -> PageResult {
    verify_token(&state, &headers, form.csrf_token.as_deref())?;
    let facility = state.facility_service.get(parse_id("Facility", &id)?).await?;

    let (status, errors) = match form.to_input(facility.facility_id) {
        Ok(input) => match state.waste_unit_service.create(input).await {
            Ok(_) => return Ok(see_other(&format!("/facilities/{}", facility.facility_id))),
            Err(err) => form_error(err)?,
        },
        Err(errors) => (StatusCode::UNPROCESSABLE_ENTITY, errors),
    };

    let mut context = unit_form_context(&facility, &form, &errors);
    let token = issue_token(&state, &headers, &mut context)?;
    render(&state, "waste_unit_form.html", &context, status, Some(&token))
}

// Reference pages

pub async fn parameters(
    State(state): State<AppState>,
    Query(query): Query<ParameterQuery>,
) -> PageResult {
    let group = query.group.as_deref().map(str::trim).filter(|g| !g.is_empty());
    let (parameters, groups) = tokio::try_join!(
        state.reference_service.parameter_table(group),
        state.reference_service.parameter_groups(),
    )?;

    let mut context = Context::new();
    context.insert("parameters", &parameters);
    context.insert("groups", &groups);
    context.insert("selected_group", &group);
    render(&state, "parameters.html", &context, StatusCode::OK, None)
}

pub async fn map(State(state): State<AppState>) -> PageResult {
    render(&state, "map.html", &Context::new(), StatusCode::OK, None)
}
