//! Database access layer
//!
//! Repositories own a `PgPool` and issue plain SQL through `sqlx`. Spatial
//! work is delegated to PostGIS: points are built with `ST_MakePoint`,
//! incoming GeoJSON is parsed by `ST_GeomFromGeoJSON` and every read emits
//! its geometry with `ST_AsGeoJSON`.

pub mod facilities;
pub mod reference;
pub mod sample_ids;
pub mod sample_results;
pub mod storage_tanks;
pub mod waste_units;

pub use facilities::FacilityRepository;
pub use reference::ReferenceRepository;
pub use sample_ids::SampleIdRepository;
pub use sample_results::SampleResultRepository;
pub use storage_tanks::StorageTankRepository;
pub use waste_units::WasteUnitRepository;

use crate::{config::DatabaseConfig, Error, Result};
use sqlx::PgPool;

/// Embedded migrations from `apps/server/migrations`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    tracing::info!("Creating database connection pool...");

    let statement_timeout = config.statement_timeout_seconds;
    let lock_timeout = config.lock_timeout_seconds;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .min_connections(config.pool_min_size)
        .max_connections(config.pool_max_size)
        .acquire_timeout(std::time::Duration::from_secs(config.pool_timeout_seconds))
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                sqlx::query(&format!("SET statement_timeout = '{}s'", statement_timeout))
                    .execute(&mut *conn)
                    .await?;
                sqlx::query(&format!("SET lock_timeout = '{}s'", lock_timeout))
                    .execute(&mut *conn)
                    .await?;
                Ok(())
            })
        })
        .connect(&config.url)
        .await
        .map_err(Error::Database)?;

    tracing::info!(
        "Database pool created (min: {}, max: {})",
        config.pool_min_size,
        config.pool_max_size
    );

    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    tracing::info!("Running database migrations...");
    MIGRATOR.run(pool).await?;
    Ok(())
}

pub async fn ping(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Escape `%`, `_` and `\` so user text matches literally inside ILIKE.
pub(crate) fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// `%term%` pattern for substring matching.
pub(crate) fn contains_pattern(term: &str) -> String {
    format!("%{}%", escape_like(term.trim()))
}

/// SQL building a geography point from two float parameters, NULL unless
/// both are present.
pub(crate) fn point_sql(lon_param: usize, lat_param: usize) -> String {
    format!(
        "CASE WHEN ${lon}::float8 IS NOT NULL AND ${lat}::float8 IS NOT NULL \
         THEN ST_SetSRID(ST_MakePoint(${lon}::float8, ${lat}::float8), 4326)::geography END",
        lon = lon_param,
        lat = lat_param
    )
}
