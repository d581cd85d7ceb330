//! Envirobase - environmental regulatory data server
//!
//! Tracks facilities and the regulated features they own (storage tanks,
//! waste units, sample locations) together with laboratory sample results.
//! Data is served as HTML views and as a JSON/GeoJSON REST API backed by
//! PostgreSQL with the PostGIS extension.

pub mod api;
pub mod config;
pub mod csrf;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;
pub mod views;

pub use config::Config;
pub use error::{Error, Result};
