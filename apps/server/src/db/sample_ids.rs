//! Sample ID repository
//!
//! Reads join the base table with both subtype tables; at most one of them
//! holds a row for any sample, so the construction columns are coalesced.
//! Writes touch several tables and always run in one transaction.

use super::point_sql;
use crate::{
    models::{sample_id::SampleIdRow, SampleId, SampleIdInput, WellConstruction},
    Result,
};
use sqlx::{PgPool, Postgres, Transaction};

const SAMPLE_ID_SELECT: &str = "SELECT s.sample_id, s.facility_id, f.name AS facility_name,
        s.name, s.description, s.longitude, s.latitude,
        ST_AsGeoJSON(s.geog)::jsonb AS geometry, s.sample_id_type,
        s.created_on, s.updated_on,
        COALESCE(mw.top_riser, pz.top_riser) AS top_riser,
        COALESCE(mw.top_screen, pz.top_screen) AS top_screen,
        COALESCE(mw.bottom_screen, pz.bottom_screen) AS bottom_screen,
        COALESCE(mw.bottom_well, pz.bottom_well) AS bottom_well,
        COALESCE(mw.well_diameter, pz.well_diameter) AS well_diameter,
        COALESCE(mw.screen_type, pz.screen_type) AS screen_type,
        COALESCE(mw.riser_pipe_desc, pz.riser_pipe_desc) AS riser_pipe_desc
     FROM sample_ids s
     JOIN facilities f ON f.facility_id = s.facility_id
     LEFT JOIN monitoring_wells mw ON mw.sample_id = s.sample_id
     LEFT JOIN piezometers pz ON pz.sample_id = s.sample_id";

#[derive(Clone)]
pub struct SampleIdRepository {
    pool: PgPool,
}

impl SampleIdRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// `limit: None` returns every row from `offset` on (`LIMIT NULL`).
    pub async fn list(&self, limit: Option<i64>, offset: i64) -> Result<Vec<SampleId>> {
        let sql = format!("{SAMPLE_ID_SELECT} ORDER BY s.sample_id LIMIT $1 OFFSET $2");
        let rows = sqlx::query_as::<_, SampleIdRow>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(SampleId::from).collect())
    }

    pub async fn list_for_facility(&self, facility_id: i32) -> Result<Vec<SampleId>> {
        let sql = format!("{SAMPLE_ID_SELECT} WHERE s.facility_id = $1 ORDER BY s.name");
        let rows = sqlx::query_as::<_, SampleIdRow>(&sql)
            .bind(facility_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(SampleId::from).collect())
    }

    pub async fn get(&self, sample_id: i32) -> Result<Option<SampleId>> {
        let sql = format!("{SAMPLE_ID_SELECT} WHERE s.sample_id = $1");
        let row = sqlx::query_as::<_, SampleIdRow>(&sql)
            .bind(sample_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(SampleId::from))
    }

    /// Facility owning a sample location, used to stamp results.
    pub async fn facility_of(&self, sample_id: i32) -> Result<Option<i32>> {
        let facility_id: Option<i32> =
            sqlx::query_scalar("SELECT facility_id FROM sample_ids WHERE sample_id = $1")
                .bind(sample_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(facility_id)
    }

    pub async fn create(&self, input: &SampleIdInput) -> Result<i32> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO sample_ids
                (facility_id, name, description, longitude, latitude, geog, sample_id_type)
             VALUES ($1, $2, $3, $4, $5, {geog}, $6)
             RETURNING sample_id",
            geog = point_sql(4, 5)
        );
        let sample_id: i32 = sqlx::query_scalar(&sql)
            .bind(input.facility_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.longitude)
            .bind(input.latitude)
            .bind(input.sample_id_type.as_str())
            .fetch_one(&mut *tx)
            .await?;

        insert_construction(&mut tx, sample_id, input).await?;

        tx.commit().await?;
        Ok(sample_id)
    }

    /// Update a sample location. A change of `sample_id_type` moves the
    /// construction row between subtype tables; a change of facility
    /// re-stamps the sample's results.
    pub async fn update(&self, sample_id: i32, input: &SampleIdInput) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "UPDATE sample_ids
             SET facility_id = $2, name = $3, description = $4, longitude = $5,
                 latitude = $6, geog = {geog}, sample_id_type = $7, updated_on = now()
             WHERE sample_id = $1",
            geog = point_sql(5, 6)
        );
        let result = sqlx::query(&sql)
            .bind(sample_id)
            .bind(input.facility_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.longitude)
            .bind(input.latitude)
            .bind(input.sample_id_type.as_str())
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(false);
        }

        // Results follow their sample point to its facility.
        let moved = sqlx::query(
            "UPDATE sample_results SET facility_id = $2, updated_on = now()
             WHERE sample_id = $1 AND facility_id <> $2",
        )
        .bind(sample_id)
        .bind(input.facility_id)
        .execute(&mut *tx)
        .await?;
        if moved.rows_affected() > 0 {
            tracing::debug!(
                sample_id,
                facility_id = input.facility_id,
                results = moved.rows_affected(),
                "Moved sample results with their sample ID"
            );
        }

        for table in ["monitoring_wells", "piezometers"] {
            sqlx::query(&format!("DELETE FROM {table} WHERE sample_id = $1"))
                .bind(sample_id)
                .execute(&mut *tx)
                .await?;
        }
        insert_construction(&mut tx, sample_id, input).await?;

        tx.commit().await?;
        Ok(true)
    }

    pub async fn delete(&self, sample_id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sample_ids WHERE sample_id = $1")
            .bind(sample_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

async fn insert_construction(
    tx: &mut Transaction<'_, Postgres>,
    sample_id: i32,
    input: &SampleIdInput,
) -> Result<()> {
    let Some(table) = input.sample_id_type.subtype_table() else {
        return Ok(());
    };
    let default = WellConstruction::default();
    let c = input.construction.as_ref().unwrap_or(&default);

    let sql = format!(
        "INSERT INTO {table}
            (sample_id, top_riser, top_screen, bottom_screen, bottom_well,
             well_diameter, screen_type, riser_pipe_desc)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"
    );
    sqlx::query(&sql)
        .bind(sample_id)
        .bind(c.top_riser)
        .bind(c.top_screen)
        .bind(c.bottom_screen)
        .bind(c.bottom_well)
        .bind(c.well_diameter)
        .bind(&c.screen_type)
        .bind(&c.riser_pipe_desc)
        .execute(&mut **tx)
        .await?;

    tracing::debug!(sample_id, table, "Stored well construction");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SampleIdType;

    #[test]
    fn only_well_types_have_subtype_tables() {
        assert_eq!(SampleIdType::SampleId.subtype_table(), None);
        assert_eq!(
            SampleIdType::MonitoringWell.subtype_table(),
            Some("monitoring_wells")
        );
        assert_eq!(SampleIdType::Piezometer.subtype_table(), Some("piezometers"));
    }

    #[test]
    fn select_coalesces_every_construction_column() {
        for column in [
            "top_riser",
            "top_screen",
            "bottom_screen",
            "bottom_well",
            "well_diameter",
            "screen_type",
            "riser_pipe_desc",
        ] {
            let expr = format!("COALESCE(mw.{column}, pz.{column}) AS {column}");
            assert!(SAMPLE_ID_SELECT.contains(&expr), "missing {column}");
        }
    }
}
