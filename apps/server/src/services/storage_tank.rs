//! Storage tank service

use super::PageLimits;
use crate::{
    db::{FacilityRepository, StorageTankRepository},
    models::{
        geojson::collect_features, storage_tank::StorageTankProperties, FeatureCollection,
        ListQuery, StorageTank, StorageTankInput, StorageTankPatch,
    },
    Error, Result,
};
use sqlx::PgPool;
use validator::Validate;

pub struct StorageTankService {
    repo: StorageTankRepository,
    facilities: FacilityRepository,
    limits: PageLimits,
}

impl StorageTankService {
    pub fn new(pool: PgPool, limits: PageLimits) -> Self {
        Self {
            repo: StorageTankRepository::new(pool.clone()),
            facilities: FacilityRepository::new(pool),
            limits,
        }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<FeatureCollection<StorageTankProperties>> {
        let (limit, offset) = self.limits.window(query);
        let tanks = self.repo.list(limit, offset).await?;
        Ok(collect_features(&tanks))
    }

    pub async fn get(&self, tank_id: i32) -> Result<StorageTank> {
        self.repo
            .get(tank_id)
            .await?
            .ok_or_else(|| Error::not_found("Storage tank", tank_id))
    }

    pub async fn create(&self, input: StorageTankInput) -> Result<StorageTank> {
        let input = input.normalized();
        input.validate()?;
        self.ensure_facility(input.facility_id).await?;

        let tank_id = self.repo.create(&input).await?;
        tracing::info!(
            tank_id,
            facility_id = input.facility_id,
            tank_type = %input.tank_type,
            "Created storage tank"
        );
        self.get(tank_id).await
    }

    pub async fn update(&self, tank_id: i32, patch: StorageTankPatch) -> Result<StorageTank> {
        let current = self.get(tank_id).await?;
        let input = patch.apply(&current).normalized();
        input.validate()?;
        if input.facility_id != current.facility_id {
            self.ensure_facility(input.facility_id).await?;
        }

        if !self.repo.update(tank_id, &input).await? {
            return Err(Error::not_found("Storage tank", tank_id));
        }
        tracing::info!(tank_id, "Updated storage tank");
        self.get(tank_id).await
    }

    pub async fn delete(&self, tank_id: i32) -> Result<()> {
        if !self.repo.delete(tank_id).await? {
            return Err(Error::not_found("Storage tank", tank_id));
        }
        tracing::info!(tank_id, "Deleted storage tank");
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
