use crate::api::handlers::pages;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::index))
        .route(
            "/facilities/new",
            get(pages::new_facility_form).post(pages::create_facility),
        )
        .route("/facilities/:id", get(pages::facility_detail))
        .route(
            "/facilities/:id/edit",
            get(pages::edit_facility_form).post(pages::update_facility),
        )
        .route("/facilities/:id/delete", post(pages::delete_facility))
        .route(
            "/facilities/:id/storage-tanks/new",
            get(pages::new_storage_tank_form).post(pages::create_storage_tank),
        )
        .route(
            "/facilities/:id/waste-units/new",
            get(pages::new_waste_unit_form).post(pages::create_waste_unit),
        )
        .route("/parameters", get(pages::parameters))
        .route("/map", get(pages::map))
}
