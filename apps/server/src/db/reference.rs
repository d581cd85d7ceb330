//! Parameter and medium code repository, including bulk loads used by the CLI.

use super::contains_pattern;
use crate::{
    models::{MediumCode, SampleParameter},
    Error, Result,
};
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

const PARAMETER_COLUMNS: &str = "param_cd, group_name, description, epa_equivalence, \
     statistical_basis, time_basis, weight_basis, particle_size_basis, sample_fraction, \
     temperature_basis, casrn, srsname, parameter_unit";

const MEDIUM_COLUMNS: &str = "medium_cd, medium_name, medium_description, legacy_cd";

/// Rows per multi-row INSERT; keeps bind counts far below the protocol limit.
pub const IMPORT_CHUNK: usize = 1000;

#[derive(Clone)]
pub struct ReferenceRepository {
    pool: PgPool,
}

impl ReferenceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List parameters, optionally restricted to a group and/or a
    /// case-insensitive search over code, description and SRS name.
    pub async fn list_parameters(
        &self,
        group: Option<&str>,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SampleParameter>> {
        let mut builder =
            QueryBuilder::<Postgres>::new(format!("SELECT {PARAMETER_COLUMNS} FROM sample_parameters"));
        push_parameter_filters(&mut builder, group, search);
        builder
            .push(" ORDER BY param_cd LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = builder
            .build_query_as::<SampleParameter>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn count_parameters(&self, group: Option<&str>, search: Option<&str>) -> Result<i64> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM sample_parameters");
        push_parameter_filters(&mut builder, group, search);
        let count: i64 = builder.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count)
    }

    pub async fn get_parameter(&self, param_cd: &str) -> Result<Option<SampleParameter>> {
        let sql = format!("SELECT {PARAMETER_COLUMNS} FROM sample_parameters WHERE param_cd = $1");
        let row = sqlx::query_as::<_, SampleParameter>(&sql)
            .bind(param_cd)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn parameter_groups(&self) -> Result<Vec<String>> {
        let groups: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT group_name FROM sample_parameters
             WHERE group_name IS NOT NULL ORDER BY group_name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(groups)
    }

    pub async fn list_medium_codes(&self) -> Result<Vec<MediumCode>> {
        let sql = format!("SELECT {MEDIUM_COLUMNS} FROM medium_codes ORDER BY medium_cd");
        let rows = sqlx::query_as::<_, MediumCode>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_medium_code(&self, medium_cd: &str) -> Result<Option<MediumCode>> {
        let sql = format!("SELECT {MEDIUM_COLUMNS} FROM medium_codes WHERE medium_cd = $1");
        let row = sqlx::query_as::<_, MediumCode>(&sql)
            .bind(medium_cd)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Load parameter codes. Without `replace` the table must be empty.
    /// Returns the number of rows written.
    pub async fn import_parameters(
        &self,
        parameters: &[SampleParameter],
        replace: bool,
    ) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        ensure_loadable(&mut tx, "sample_parameters", replace).await?;

        let mut written = 0;
        for chunk in parameters.chunks(IMPORT_CHUNK) {
            let mut builder = QueryBuilder::<Postgres>::new(format!(
                "INSERT INTO sample_parameters ({PARAMETER_COLUMNS}) "
            ));
            builder.push_values(chunk, |mut b, p| {
                b.push_bind(&p.param_cd)
                    .push_bind(&p.group_name)
                    .push_bind(&p.description)
                    .push_bind(&p.epa_equivalence)
                    .push_bind(&p.statistical_basis)
                    .push_bind(&p.time_basis)
                    .push_bind(&p.weight_basis)
                    .push_bind(&p.particle_size_basis)
                    .push_bind(&p.sample_fraction)
                    .push_bind(&p.temperature_basis)
                    .push_bind(&p.casrn)
                    .push_bind(&p.srsname)
                    .push_bind(&p.parameter_unit);
            });
            builder.push(
                " ON CONFLICT (param_cd) DO UPDATE SET
                    group_name = EXCLUDED.group_name,
                    description = EXCLUDED.description,
                    epa_equivalence = EXCLUDED.epa_equivalence,
                    statistical_basis = EXCLUDED.statistical_basis,
                    time_basis = EXCLUDED.time_basis,
                    weight_basis = EXCLUDED.weight_basis,
                    particle_size_basis = EXCLUDED.particle_size_basis,
                    sample_fraction = EXCLUDED.sample_fraction,
                    temperature_basis = EXCLUDED.temperature_basis,
                    casrn = EXCLUDED.casrn,
                    srsname = EXCLUDED.srsname,
                    parameter_unit = EXCLUDED.parameter_unit",
            );
            written += builder.build().execute(&mut *tx).await?.rows_affected();
        }

        if replace {
            let codes: Vec<&str> = parameters.iter().map(|p| p.param_cd.as_str()).collect();
            let removed = sqlx::query(
                "DELETE FROM sample_parameters p
                 WHERE NOT (p.param_cd = ANY($1))
                   AND NOT EXISTS (SELECT 1 FROM sample_results r WHERE r.param_cd = p.param_cd)",
            )
            .bind(&codes)
            .execute(&mut *tx)
            .await?
            .rows_affected();
            tracing::info!(removed, "Removed parameter codes absent from the import");
        }

        tx.commit().await?;
        Ok(written)
    }

    /// Load medium codes with the same rules as [`Self::import_parameters`].
    pub async fn import_medium_codes(&self, codes: &[MediumCode], replace: bool) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        ensure_loadable(&mut tx, "medium_codes", replace).await?;

        let mut written = 0;
        for chunk in codes.chunks(IMPORT_CHUNK) {
            let mut builder =
                QueryBuilder::<Postgres>::new(format!("INSERT INTO medium_codes ({MEDIUM_COLUMNS}) "));
            builder.push_values(chunk, |mut b, m| {
                b.push_bind(&m.medium_cd)
                    .push_bind(&m.medium_name)
                    .push_bind(&m.medium_description)
                    .push_bind(&m.legacy_cd);
            });
            builder.push(
                " ON CONFLICT (medium_cd) DO UPDATE SET
                    medium_name = EXCLUDED.medium_name,
                    medium_description = EXCLUDED.medium_description,
                    legacy_cd = EXCLUDED.legacy_cd",
            );
            written += builder.build().execute(&mut *tx).await?.rows_affected();
        }

        if replace {
            let kept: Vec<&str> = codes.iter().map(|m| m.medium_cd.as_str()).collect();
            let removed = sqlx::query(
                "DELETE FROM medium_codes m
                 WHERE NOT (m.medium_cd = ANY($1))
                   AND NOT EXISTS (SELECT 1 FROM sample_results r WHERE r.medium_cd = m.medium_cd)",
            )
            .bind(&kept)
            .execute(&mut *tx)
            .await?
            .rows_affected();
            tracing::info!(removed, "Removed medium codes absent from the import");
        }

        tx.commit().await?;
        Ok(written)
    }
}

async fn ensure_loadable(
    tx: &mut Transaction<'_, Postgres>,
    table: &str,
    replace: bool,
) -> Result<()> {
    if replace {
        return Ok(());
    }
    let existing: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(&mut **tx)
        .await?;
    if existing > 0 {
        return Err(Error::AlreadyExists(format!(
            "{table} data ({existing} rows)"
        )));
    }
    Ok(())
}

fn push_parameter_filters(
    builder: &mut QueryBuilder<'_, Postgres>,
    group: Option<&str>,
    search: Option<&str>,
) {
    let group = group.map(str::trim).filter(|g| !g.is_empty());
    let search = search.map(str::trim).filter(|s| !s.is_empty());

    if let Some(group) = group {
        builder
            .push(" WHERE group_name ILIKE ")
            .push_bind(super::escape_like(group));
    }
    if let Some(search) = search {
        let pattern = contains_pattern(search);
        builder
            .push(if group.is_some() { " AND " } else { " WHERE " })
            .push("(param_cd ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR srsname ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}
