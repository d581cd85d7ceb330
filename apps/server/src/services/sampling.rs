//! Sampling service - sample locations and their laboratory results.

use super::{ListResponse, PageLimits};
use crate::{
    db::{FacilityRepository, SampleIdRepository, SampleResultRepository},
    models::{
        geojson::collect_features, sample_id::SampleIdProperties, FeatureCollection, ListQuery,
        SampleId, SampleIdInput, SampleIdPatch, SampleResult, SampleResultFilter,
        SampleResultInput, SampleResultPatch,
    },
    Error, Result,
};
use sqlx::PgPool;
use validator::Validate;

pub struct SamplingService {
    samples: SampleIdRepository,
    results: SampleResultRepository,
    facilities: FacilityRepository,
    limits: PageLimits,
}

impl SamplingService {
    pub fn new(pool: PgPool, limits: PageLimits) -> Self {
        Self {
            samples: SampleIdRepository::new(pool.clone()),
            results: SampleResultRepository::new(pool.clone()),
            facilities: FacilityRepository::new(pool),
            limits,
        }
    }

    // Sample IDs

    pub async fn list_sample_ids(
        &self,
        query: &ListQuery,
    ) -> Result<FeatureCollection<SampleIdProperties>> {
        let (limit, offset) = self.limits.window(query);
        let samples = self.samples.list(limit, offset).await?;
        Ok(collect_features(&samples))
    }

    pub async fn get_sample_id(&self, sample_id: i32) -> Result<SampleId> {
        self.samples
            .get(sample_id)
            .await?
            .ok_or_else(|| Error::not_found("Sample ID", sample_id))
    }

    pub async fn create_sample_id(&self, input: SampleIdInput) -> Result<SampleId> {
        let input = input.normalized();
        input.validate()?;
        self.ensure_facility(input.facility_id).await?;

        let sample_id = self.samples.create(&input).await?;
        tracing::info!(
            sample_id,
            facility_id = input.facility_id,
            sample_id_type = input.sample_id_type.as_str(),
            "Created sample ID"
        );
        self.get_sample_id(sample_id).await
    }

    pub async fn update_sample_id(&self, sample_id: i32, patch: SampleIdPatch) -> Result<SampleId> {
        let current = self.get_sample_id(sample_id).await?;
        let input = patch.apply(&current).normalized();
        input.validate()?;
        if input.facility_id != current.facility_id {
            self.ensure_facility(input.facility_id).await?;
        }

        if !self.samples.update(sample_id, &input).await? {
            return Err(Error::not_found("Sample ID", sample_id));
        }
        if input.sample_id_type != current.sample_id_type {
            tracing::info!(
                sample_id,
                from = current.sample_id_type.as_str(),
                to = input.sample_id_type.as_str(),
                "Changed sample ID type"
            );
        } else {
            tracing::info!(sample_id, "Updated sample ID");
        }
        self.get_sample_id(sample_id).await
    }

    pub async fn delete_sample_id(&self, sample_id: i32) -> Result<()> {
        if !self.samples.delete(sample_id).await? {
            return Err(Error::not_found("Sample ID", sample_id));
        }
        tracing::info!(sample_id, "Deleted sample ID and its results");
        Ok(())
    }

    // Sample results

    pub async fn list_results(
        &self,
        filter: &SampleResultFilter,
    ) -> Result<ListResponse<SampleResult>> {
        if let (Some(start), Some(end)) = (filter.start, filter.end) {
            if end <= start {
                return Err(Error::Validation("end must be after start".to_string()));
            }
        }
        let (limit, offset) = self.limits.resolve_parts(filter.limit, filter.offset);
        let (items, total) = tokio::try_join!(
            self.results.list(filter, limit, offset),
            self.results.count(filter),
        )?;
        Ok(ListResponse {
            items,
            total,
            limit,
            offset,
        })
    }

    pub async fn get_result(&self, result_id: i32) -> Result<SampleResult> {
        self.results
            .get(result_id)
            .await?
            .ok_or_else(|| Error::not_found("Sample result", result_id))
    }

    pub async fn create_result(&self, input: SampleResultInput) -> Result<SampleResult> {
        let input = input.normalized();
        input.validate()?;
        let facility_id = self.facility_of_sample(input.sample_id).await?;

        let result_id = self.results.create(facility_id, &input).await?;
        tracing::info!(
            result_id,
            sample_id = input.sample_id,
            param_cd = %input.param_cd,
            "Created sample result"
        );
        self.get_result(result_id).await
    }

    pub async fn update_result(
        &self,
        result_id: i32,
        patch: SampleResultPatch,
    ) -> Result<SampleResult> {
        let current = self.get_result(result_id).await?;
        let input = patch.apply(&current).normalized();
        input.validate()?;
        let facility_id = self.facility_of_sample(input.sample_id).await?;

        if !self.results.update(result_id, facility_id, &input).await? {
            return Err(Error::not_found("Sample result", result_id));
        }
        tracing::info!(result_id, "Updated sample result");
        self.get_result(result_id).await
    }

    pub async fn delete_result(&self, result_id: i32) -> Result<()> {
        if !self.results.delete(result_id).await? {
            return Err(Error::not_found("Sample result", result_id));
        }
        tracing::info!(result_id, "Deleted sample result");
        Ok(())
    }

    async fn facility_of_sample(&self, sample_id: i32) -> Result<i32> {
        self.samples
            .facility_of(sample_id)
            .await?
            .ok_or_else(|| Error::InvalidReference(format!("sample ID {sample_id} does not exist")))
    }

    async fn ensure_facility(&self, facility_id: i32) -> Result<()> {
        if self.facilities.exists(facility_id).await? {
            Ok(())
        } else {
            Err(Error::InvalidReference(format!(
                "facility {facility_id} does not exist"
            )))
        }
    }
}
