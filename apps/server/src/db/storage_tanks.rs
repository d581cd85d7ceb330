//! Storage tank repository

use super::point_sql;
use crate::{
    models::{StorageTank, StorageTankInput},
    Result,
};
use sqlx::PgPool;

const TANK_SELECT: &str = "SELECT t.tank_id, t.tank_registration_id, t.facility_id,
        f.name AS facility_name, t.date_installed, t.date_removed, t.capacity,
        t.stored_substance, t.status, t.tank_type, t.longitude, t.latitude,
        ST_AsGeoJSON(t.geog)::jsonb AS geometry, t.created_on, t.updated_on
     FROM storage_tanks t
     JOIN facilities f ON f.facility_id = t.facility_id";

#[derive(Clone)]
pub struct StorageTankRepository {
    pool: PgPool,
}

impl StorageTankRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// `limit: None` returns every row from `offset` on (`LIMIT NULL`).
    pub async fn list(&self, limit: Option<i64>, offset: i64) -> Result<Vec<StorageTank>> {
        let sql = format!("{TANK_SELECT} ORDER BY t.tank_id LIMIT $1 OFFSET $2");
        let rows = sqlx::query_as::<_, StorageTank>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn list_for_facility(&self, facility_id: i32) -> Result<Vec<StorageTank>> {
        let sql = format!("{TANK_SELECT} WHERE t.facility_id = $1 ORDER BY t.tank_id");
        let rows = sqlx::query_as::<_, StorageTank>(&sql)
            .bind(facility_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get(&self, tank_id: i32) -> Result<Option<StorageTank>> {
        let sql = format!("{TANK_SELECT} WHERE t.tank_id = $1");
        let row = sqlx::query_as::<_, StorageTank>(&sql)
            .bind(tank_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Insert a tank and return its id.
    pub async fn create(&self, input: &StorageTankInput) -> Result<i32> {
        let sql = format!(
            "INSERT INTO storage_tanks
                (facility_id, tank_registration_id, date_installed, date_removed, capacity,
                 stored_substance, status, tank_type, longitude, latitude, geog)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, {geog})
             RETURNING tank_id",
            geog = point_sql(9, 10)
        );
        let tank_id: i32 = sqlx::query_scalar(&sql)
            .bind(input.facility_id)
            .bind(&input.tank_registration_id)
            .bind(input.date_installed)
            .bind(input.date_removed)
            .bind(input.capacity)
            .bind(&input.stored_substance)
            .bind(input.status.as_str())
            .bind(input.tank_type.as_str())
            .bind(input.longitude)
            .bind(input.latitude)
            .fetch_one(&self.pool)
            .await?;
        Ok(tank_id)
    }

    pub async fn update(&self, tank_id: i32, input: &StorageTankInput) -> Result<bool> {
        let sql = format!(
            "UPDATE storage_tanks
             SET facility_id = $2, tank_registration_id = $3, date_installed = $4,
                 date_removed = $5, capacity = $6, stored_substance = $7, status = $8,
                 tank_type = $9, longitude = $10, latitude = $11, geog = {geog},
                 updated_on = now()
             WHERE tank_id = $1",
            geog = point_sql(10, 11)
        );
        let result = sqlx::query(&sql)
            .bind(tank_id)
            .bind(input.facility_id)
            .bind(&input.tank_registration_id)
            .bind(input.date_installed)
            .bind(input.date_removed)
            .bind(input.capacity)
            .bind(&input.stored_substance)
            .bind(input.status.as_str())
            .bind(input.tank_type.as_str())
            .bind(input.longitude)
            .bind(input.latitude)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, tank_id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM storage_tanks WHERE tank_id = $1")
            .bind(tank_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
