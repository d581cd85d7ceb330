//! Facility repository

use super::{contains_pattern, point_sql};
use crate::{
    models::{Facility, FacilityInput},
    Result,
};
use sqlx::PgPool;

const FACILITY_COLUMNS: &str = "facility_id, name, address, city, state, zipcode, \
     longitude, latitude, ST_AsGeoJSON(geog)::jsonb AS geometry, created_on, updated_on";

#[derive(Clone)]
pub struct FacilityRepository {
    pool: PgPool,
}

impl FacilityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// `limit: None` returns every row from `offset` on (`LIMIT NULL`).
    pub async fn list(&self, limit: Option<i64>, offset: i64) -> Result<Vec<Facility>> {
        let sql = format!(
            "SELECT {FACILITY_COLUMNS} FROM facilities ORDER BY facility_id LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query_as::<_, Facility>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM facilities")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn get(&self, facility_id: i32) -> Result<Option<Facility>> {
        let sql = format!("SELECT {FACILITY_COLUMNS} FROM facilities WHERE facility_id = $1");
        let row = sqlx::query_as::<_, Facility>(&sql)
            .bind(facility_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn exists(&self, facility_id: i32) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM facilities WHERE facility_id = $1)")
                .bind(facility_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Case-insensitive substring match on the facility name.
    pub async fn search_by_name(&self, name: &str) -> Result<Vec<Facility>> {
        let sql = format!(
            "SELECT {FACILITY_COLUMNS} FROM facilities WHERE name ILIKE $1 ORDER BY name"
        );
        let rows = sqlx::query_as::<_, Facility>(&sql)
            .bind(contains_pattern(name))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn create(&self, input: &FacilityInput) -> Result<Facility> {
        let sql = format!(
            "INSERT INTO facilities (name, address, city, state, zipcode, longitude, latitude, geog)
             VALUES ($1, $2, $3, $4, $5, $6, $7, {geog})
             RETURNING {FACILITY_COLUMNS}",
            geog = point_sql(6, 7)
        );
        let row = sqlx::query_as::<_, Facility>(&sql)
            .bind(&input.name)
            .bind(&input.address)
            .bind(&input.city)
            .bind(&input.state)
            .bind(&input.zipcode)
            .bind(input.longitude)
            .bind(input.latitude)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn update(&self, facility_id: i32, input: &FacilityInput) -> Result<Option<Facility>> {
        let sql = format!(
            "UPDATE facilities
             SET name = $2, address = $3, city = $4, state = $5, zipcode = $6,
                 longitude = $7, latitude = $8, geog = {geog}, updated_on = now()
             WHERE facility_id = $1
             RETURNING {FACILITY_COLUMNS}",
            geog = point_sql(7, 8)
        );
        let row = sqlx::query_as::<_, Facility>(&sql)
            .bind(facility_id)
            .bind(&input.name)
            .bind(&input.address)
            .bind(&input.city)
            .bind(&input.state)
            .bind(&input.zipcode)
            .bind(input.longitude)
            .bind(input.latitude)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Delete a facility; its tanks, waste units, sample IDs and results cascade.
    pub async fn delete(&self, facility_id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM facilities WHERE facility_id = $1")
            .bind(facility_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
