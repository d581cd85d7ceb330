//! Reference vocabulary service (USGS parameter and medium codes).

use super::PageLimits;
use crate::{
    db::ReferenceRepository,
    models::{
        is_valid_param_cd,
        reference::{is_valid_medium_cd, ParameterQuery},
        MediumCode, SampleParameter,
    },
    Error, Result,
};
use serde::Serialize;
use sqlx::PgPool;

/// Paginated list envelope for non-spatial collections.
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

pub struct ReferenceService {
    repo: ReferenceRepository,
    limits: PageLimits,
}

impl ReferenceService {
    pub fn new(pool: PgPool, limits: PageLimits) -> Self {
        Self {
            repo: ReferenceRepository::new(pool),
            limits,
        }
    }

    pub async fn parameters(&self, query: &ParameterQuery) -> Result<ListResponse<SampleParameter>> {
        let (limit, offset) = self.limits.resolve_parts(query.limit, query.offset);
        let group = query.group.as_deref();
        let search = query.q.as_deref();
        let (items, total) = tokio::try_join!(
            self.repo.list_parameters(group, search, limit, offset),
            self.repo.count_parameters(group, search),
        )?;
        Ok(ListResponse {
            items,
            total,
            limit,
            offset,
        })
    }

    /// Every parameter in `group` (or all of them), unpaginated, for the
    /// HTML parameter table.
    pub async fn parameter_table(&self, group: Option<&str>) -> Result<Vec<SampleParameter>> {
        self.repo.list_parameters(group, None, i64::MAX, 0).await
    }

    pub async fn parameter(&self, param_cd: &str) -> Result<SampleParameter> {
        if !is_valid_param_cd(param_cd) {
            return Err(Error::InvalidReference(format!(
                "malformed parameter code '{param_cd}' (expected five digits)"
            )));
        }
        self.repo
            .get_parameter(param_cd)
            .await?
            .ok_or_else(|| Error::not_found("Parameter", param_cd))
    }

    pub async fn parameter_groups(&self) -> Result<Vec<String>> {
        self.repo.parameter_groups().await
    }

    pub async fn medium_codes(&self) -> Result<Vec<MediumCode>> {
        self.repo.list_medium_codes().await
    }

    pub async fn medium_code(&self, medium_cd: &str) -> Result<MediumCode> {
        let code = medium_cd.trim().to_ascii_uppercase();
        if !is_valid_medium_cd(&code) {
            return Err(Error::InvalidReference(format!(
                "malformed medium code '{medium_cd}'"
            )));
        }
        self.repo
            .get_medium_code(&code)
            .await?
            .ok_or_else(|| Error::not_found("Medium code", code))
    }

    pub async fn import_parameters(
        &self,
        parameters: &[SampleParameter],
        replace: bool,
    ) -> Result<u64> {
        let written = self.repo.import_parameters(parameters, replace).await?;
        tracing::info!(written, replace, "Imported parameter codes");
        Ok(written)
    }

    pub async fn import_medium_codes(&self, codes: &[MediumCode], replace: bool) -> Result<u64> {
        let written = self.repo.import_medium_codes(codes, replace).await?;
        tracing::info!(written, replace, "Imported medium codes");
        Ok(written)
    }
}
