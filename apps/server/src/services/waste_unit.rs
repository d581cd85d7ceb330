//! Waste unit service

use super::PageLimits;
use crate::{
    db::{FacilityRepository, WasteUnitRepository},
    models::{
        geojson::collect_features, waste_unit::WasteUnitProperties, FeatureCollection, ListQuery,
        WasteUnit, WasteUnitInput, WasteUnitPatch,
    },
    Error, Result,
};
use sqlx::PgPool;
use validator::Validate;

pub struct WasteUnitService {
    repo: WasteUnitRepository,
    facilities: FacilityRepository,
    limits: PageLimits,
}

impl WasteUnitService {
    pub fn new(pool: PgPool, limits: PageLimits) -> Self {
        Self {
            repo: WasteUnitRepository::new(pool.clone()),
            facilities: FacilityRepository::new(pool),
            limits,
        }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<FeatureCollection<WasteUnitProperties>> {
        let (limit, offset) = self.limits.window(query);
        let units = self.repo.list(limit, offset).await?;
        Ok(collect_features(&units))
    }

    pub async fn get(&self, unit_id: i32) -> Result<WasteUnit> {
        self.repo
            .get(unit_id)
            .await?
            .ok_or_else(|| Error::not_found("Waste unit", unit_id))
    }

    pub async fn create(&self, input: WasteUnitInput) -> Result<WasteUnit> {
        let input = input.normalized();
        input.validate()?;
        self.ensure_facility(input.facility_id).await?;

        let unit_id = self.repo.create(&input).await?;
        tracing::info!(
            unit_id,
            facility_id = input.facility_id,
            unit_type = input.unit_type.as_str(),
            has_geometry = input.geometry.is_some(),
            "Created waste unit"
        );
        self.get(unit_id).await
    }

    pub async fn update(&self, unit_id: i32, patch: WasteUnitPatch) -> Result<WasteUnit> {
        let current = self.get(unit_id).await?;
        let input = patch.apply(&current).normalized();
        input.validate()?;
        if input.facility_id != current.facility_id {
            self.ensure_facility(input.facility_id).await?;
        }

        if !self.repo.update(unit_id, &input).await? {
            return Err(Error::not_found("Waste unit", unit_id));
        }
        tracing::info!(unit_id, "Updated waste unit");
        self.get(unit_id).await
    }

    pub async fn delete(&self, unit_id: i32) -> Result<()> {
        if !self.repo.delete(unit_id).await? {
            return Err(Error::not_found("Waste unit", unit_id));
        }
        tracing::info!(unit_id, "Deleted waste unit");
        Ok(())
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
