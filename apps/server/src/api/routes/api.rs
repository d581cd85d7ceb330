use crate::api::handlers::{facilities, reference, sample_ids, sample_results, storage_tanks, waste_units};
use crate::state::AppState;
use axum::{routing::get, Router};

/// JSON/GeoJSON API, nested under `/api/v1`. Collection routes answer with
/// and without the trailing slash.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Facilities
        .route(
            "/facilities",
            get(facilities::list_facilities).post(facilities::create_facility),
        )
        .route(
            "/facilities/",
            get(facilities::list_facilities).post(facilities::create_facility),
        )
        .route(
            "/facilities/:segment",
            get(facilities::get_facility)
                .put(facilities::update_facility)
                .delete(facilities::delete_facility),
        )
        .route(
            "/facilities/:segment/storage-tanks",
            get(facilities::list_facility_storage_tanks),
        )
        .route(
            "/facilities/:segment/waste-units",
            get(facilities::list_facility_waste_units),
        )
        .route(
            "/facilities/:segment/sample-ids",
            get(facilities::list_facility_sample_ids),
        )
        // Storage tanks
        .route(
            "/storage-tanks",
            get(storage_tanks::list_storage_tanks).post(storage_tanks::create_storage_tank),
        )
        .route(
            "/storage-tanks/",
            get(storage_tanks::list_storage_tanks).post(storage_tanks::create_storage_tank),
        )
        .route(
            "/storage-tanks/:id",
            get(storage_tanks::get_storage_tank)
                .put(storage_tanks::update_storage_tank)
                .delete(storage_tanks::delete_storage_tank),
        )
        // Waste units
        .route(
            "/waste-units",
            get(waste_units::list_waste_units).post(waste_units::create_waste_unit),
        )
        .route(
            "/waste-units/",
            get(waste_units::list_waste_units).post(waste_units::create_waste_unit),
        )
        .route(
            "/waste-units/:id",
            get(waste_units::get_waste_unit)
                .put(waste_units::update_waste_unit)
                .delete(waste_units::delete_waste_unit),
        )
        // Sample IDs
        .route(
            "/sample-ids",
            get(sample_ids::list_sample_ids).post(sample_ids::create_sample_id),
        )
        .route(
            "/sample-ids/",
            get(sample_ids::list_sample_ids).post(sample_ids::create_sample_id),
        )
        .route(
            "/sample-ids/:id",
            get(sample_ids::get_sample_id)
                .put(sample_ids::update_sample_id)
                .delete(sample_ids::delete_sample_id),
        )
        // Sample results
        .route(
            "/sample-results",
            get(sample_results::list_sample_results).post(sample_results::create_sample_result),
        )
        .route(
            "/sample-results/",
            get(sample_results::list_sample_results).post(sample_results::create_sample_result),
        )
        .route(
            "/sample-results/:id",
            get(sample_results::get_sample_result)
                .put(sample_results::update_sample_result)
                .delete(sample_results::delete_sample_result),
        )
        // Reference vocabularies (read-only)
        .route("/sample-parameters", get(reference::list_parameters))
        .route("/sample-parameters/", get(reference::list_parameters))
        .route("/sample-parameters/:param_cd", get(reference::get_parameter))
        .route("/medium-codes", get(reference::list_medium_codes))
        .route("/medium-codes/", get(reference::list_medium_codes))
        .route("/medium-codes/:medium_cd", get(reference::get_medium_code))
}
