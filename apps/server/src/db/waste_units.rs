//! Waste unit repository

use crate::{
    models::{WasteUnit, WasteUnitInput},
    Result,
};
use sqlx::PgPool;

const UNIT_SELECT: &str = "SELECT w.unit_id, w.name, w.facility_id, f.name AS facility_name,
        w.constructed_date, w.unit_type, ST_AsGeoJSON(w.geog)::jsonb AS geometry,
        w.created_on, w.updated_on
     FROM waste_units w
     JOIN facilities f ON f.facility_id = w.facility_id";

/// Polygons are promoted to MULTIPOLYGON to match the column type.
const GEOMETRY_FROM_JSON: &str =
    "ST_Multi(ST_SetSRID(ST_GeomFromGeoJSON(CAST($5 AS jsonb)::text), 4326))::geography";

#[derive(Clone)]
pub struct WasteUnitRepository {
    pool: PgPool,
}

impl WasteUnitRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// `limit: None` returns every row from `offset` on (`LIMIT NULL`).
    pub async fn list(&self, limit: Option<i64>, offset: i64) -> Result<Vec<WasteUnit>> {
        let sql = format!("{UNIT_SELECT} ORDER BY w.unit_id LIMIT $1 OFFSET $2");
        let rows = sqlx::query_as::<_, WasteUnit>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn list_for_facility(&self, facility_id: i32) -> Result<Vec<WasteUnit>> {
        let sql = format!("{UNIT_SELECT} WHERE w.facility_id = $1 ORDER BY w.name");
        let rows = sqlx::query_as::<_, WasteUnit>(&sql)
            .bind(facility_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get(&self, unit_id: i32) -> Result<Option<WasteUnit>> {
        let sql = format!("{UNIT_SELECT} WHERE w.unit_id = $1");
        let row = sqlx::query_as::<_, WasteUnit>(&sql)
            .bind(unit_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn create(&self, input: &WasteUnitInput) -> Result<i32> {
        let sql = format!(
            "INSERT INTO waste_units (facility_id, name, constructed_date, unit_type, geog)
             VALUES ($1, $2, $3, $4, CASE WHEN $5::jsonb IS NULL THEN NULL ELSE {GEOMETRY_FROM_JSON} END)
             RETURNING unit_id"
        );
        let unit_id: i32 = sqlx::query_scalar(&sql)
            .bind(input.facility_id)
            .bind(&input.name)
            .bind(input.constructed_date)
            .bind(input.unit_type.as_str())
            .bind(&input.geometry)
            .fetch_one(&self.pool)
            .await?;
        Ok(unit_id)
    }

    pub async fn update(&self, unit_id: i32, input: &WasteUnitInput) -> Result<bool> {
        let sql = format!(
            "UPDATE waste_units
             SET facility_id = $1, name = $2, constructed_date = $3, unit_type = $4,
                 geog = CASE WHEN $5::jsonb IS NULL THEN NULL ELSE {GEOMETRY_FROM_JSON} END,
                 updated_on = now()
             WHERE unit_id = $6"
        );
        let result = sqlx::query(&sql)
            .bind(input.facility_id)
            .bind(&input.name)
            .bind(input.constructed_date)
            .bind(input.unit_type.as_str())
            .bind(&input.geometry)
            .bind(unit_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, unit_id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM waste_units WHERE unit_id = $1")
            .bind(unit_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
