//! Sample result repository

use crate::{
    models::{SampleResult, SampleResultFilter, SampleResultInput},
    Result,
};
use sqlx::{PgPool, Postgres, QueryBuilder};

const RESULT_SELECT: &str = "SELECT r.result_id, r.lab_id, r.facility_id, r.sample_id,
        s.name AS sample_name, r.param_cd, p.description AS parameter_description,
        r.medium_cd, r.sample_date, r.prep_method, r.analysis_method, r.analysis_flag,
        r.analysis_result, r.analysis_unit, r.detection_limit, r.reporting_limit,
        r.analysis_qualifier, r.disclaimer, r.analysis_date, r.order_comment,
        r.analysis_comment, r.created_on, r.updated_on
     FROM sample_results r
     JOIN sample_ids s ON s.sample_id = r.sample_id
     LEFT JOIN sample_parameters p ON p.param_cd = r.param_cd";

#[derive(Clone)]
pub struct SampleResultRepository {
    pool: PgPool,
}

impl SampleResultRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List results matching `filter`, newest sample first.
    pub async fn list(
        &self,
        filter: &SampleResultFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SampleResult>> {
        let mut builder = QueryBuilder::<Postgres>::new(RESULT_SELECT);
        push_filters(&mut builder, filter);
        builder
            .push(" ORDER BY r.sample_date DESC, r.result_id LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = builder
            .build_query_as::<SampleResult>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn count(&self, filter: &SampleResultFilter) -> Result<i64> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM sample_results r");
        push_filters(&mut builder, filter);
        let count: i64 = builder.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count)
    }

    pub async fn get(&self, result_id: i32) -> Result<Option<SampleResult>> {
        let sql = format!("{RESULT_SELECT} WHERE r.result_id = $1");
        let row = sqlx::query_as::<_, SampleResult>(&sql)
            .bind(result_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Insert a result. `facility_id` is copied from the sample location so
    /// the two can never disagree.
    pub async fn create(&self, facility_id: i32, input: &SampleResultInput) -> Result<i32> {
        let result_id: i32 = sqlx::query_scalar(
            "INSERT INTO sample_results
                (facility_id, lab_id, sample_id, param_cd, medium_cd, sample_date,
                 prep_method, analysis_method, analysis_flag, analysis_result, analysis_unit,
                 detection_limit, reporting_limit, analysis_qualifier, disclaimer,
                 analysis_date, order_comment, analysis_comment)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
             RETURNING result_id",
        )
        .bind(facility_id)
        .bind(&input.lab_id)
        .bind(input.sample_id)
        .bind(&input.param_cd)
        .bind(&input.medium_cd)
        .bind(input.sample_date)
        .bind(&input.prep_method)
        .bind(&input.analysis_method)
        .bind(&input.analysis_flag)
        .bind(input.analysis_result)
        .bind(&input.analysis_unit)
        .bind(input.detection_limit)
        .bind(input.reporting_limit)
        .bind(&input.analysis_qualifier)
        .bind(&input.disclaimer)
        .bind(input.analysis_date)
        .bind(&input.order_comment)
        .bind(&input.analysis_comment)
        .fetch_one(&self.pool)
        .await?;
        Ok(result_id)
    }

    pub async fn update(
        &self,
        result_id: i32,
        facility_id: i32,
        input: &SampleResultInput,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE sample_results
             SET facility_id = $2, lab_id = $3, sample_id = $4, param_cd = $5, medium_cd = $6,
                 sample_date = $7, prep_method = $8, analysis_method = $9, analysis_flag = $10,
                 analysis_result = $11, analysis_unit = $12, detection_limit = $13,
                 reporting_limit = $14, analysis_qualifier = $15, disclaimer = $16,
                 analysis_date = $17, order_comment = $18, analysis_comment = $19,
                 updated_on = now()
             WHERE result_id = $1",
        )
        .bind(result_id)
        .bind(facility_id)
        .bind(&input.lab_id)
        .bind(input.sample_id)
        .bind(&input.param_cd)
        .bind(&input.medium_cd)
        .bind(input.sample_date)
        .bind(&input.prep_method)
        .bind(&input.analysis_method)
        .bind(&input.analysis_flag)
        .bind(input.analysis_result)
        .bind(&input.analysis_unit)
        .bind(input.detection_limit)
        .bind(input.reporting_limit)
        .bind(&input.analysis_qualifier)
        .bind(&input.disclaimer)
        .bind(input.analysis_date)
        .bind(&input.order_comment)
        .bind(&input.analysis_comment)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, result_id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sample_results WHERE result_id = $1")
            .bind(result_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &SampleResultFilter) {
    let mut sep = " WHERE ";
    let mut next = |builder: &mut QueryBuilder<'_, Postgres>| {
        builder.push(sep);
        sep = " AND ";
    };

    if let Some(facility_id) = filter.facility_id {
        next(builder);
        builder.push("r.facility_id = ").push_bind(facility_id);
    }
    if let Some(sample_id) = filter.sample_id {
        next(builder);
        builder.push("r.sample_id = ").push_bind(sample_id);
    }
    if let Some(param_cd) = filter.param_cd.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        next(builder);
        builder.push("r.param_cd = ").push_bind(param_cd.to_string());
    }
    if let Some(start) = filter.start {
        next(builder);
        builder.push("r.sample_date >= ").push_bind(start);
    }
    if let Some(end) = filter.end {
        next(builder);
        builder.push("r.sample_date < ").push_bind(end);
    }
}
