//! Facility service - CRUD, id-or-name lookup and child listings.

use super::PageLimits;
use crate::{
    db::{FacilityRepository, SampleIdRepository, StorageTankRepository, WasteUnitRepository},
    models::{
        geojson::collect_features, Facility, FacilityInput, FacilityPatch, FacilityProperties,
        FeatureCollection, ListQuery, Page, SampleId, StorageTank, ToFeature, WasteUnit,
    },
    Error, Result,
};
use sqlx::PgPool;
use validator::Validate;

/// A `/facilities/{segment}` path segment: digits select by id, anything
/// else is a name search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FacilityRef {
    Id(i32),
    Name(String),
}

impl FacilityRef {
    pub fn parse(segment: &str) -> Self {
        let segment = segment.trim();
        match segment.parse::<i32>() {
            Ok(id) if !segment.starts_with(['+', '-']) => Self::Id(id),
            _ => Self::Name(segment.to_string()),
        }
    }
}

/// Everything the facility detail page shows.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FacilityDetail {
    pub facility: Facility,
    pub storage_tanks: Vec<StorageTank>,
    pub waste_units: Vec<WasteUnit>,
    pub sample_ids: Vec<SampleId>,
}

pub struct FacilityService {
    repo: FacilityRepository,
    tanks: StorageTankRepository,
    units: WasteUnitRepository,
    samples: SampleIdRepository,
    limits: PageLimits,
}

impl FacilityService {
    pub fn new(pool: PgPool, limits: PageLimits) -> Self {
        Self {
            repo: FacilityRepository::new(pool.clone()),
            tanks: StorageTankRepository::new(pool.clone()),
            units: WasteUnitRepository::new(pool.clone()),
            samples: SampleIdRepository::new(pool),
            limits,
        }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<FeatureCollection<FacilityProperties>> {
        let (limit, offset) = self.limits.window(query);
        let facilities = self.repo.list(limit, offset).await?;
        Ok(collect_features(&facilities))
    }

    /// One page of facilities for the HTML index.
    pub async fn page(&self, page: u32) -> Result<Page<Facility>> {
        let page = page.max(1);
        let per_page = self.limits.default;
        let total = self.repo.count().await?;
        let items = self
            .repo
            .list(Some(per_page as i64), Page::<Facility>::offset(page, per_page))
            .await?;
        Ok(Page::new(items, page, per_page, total))
    }

    /// Resolve `/facilities/{segment}`. An id that does not exist is a 404;
    /// a name search that matches nothing is an empty collection.
    pub async fn lookup(&self, segment: &str) -> Result<FeatureCollection<FacilityProperties>> {
        match FacilityRef::parse(segment) {
            FacilityRef::Id(id) => {
                let facility = self.get(id).await?;
                Ok(FeatureCollection::new(vec![facility.to_feature()]))
            }
            FacilityRef::Name(name) => {
                let matches = self.repo.search_by_name(&name).await?;
                Ok(collect_features(&matches))
            }
        }
    }

    pub async fn get(&self, facility_id: i32) -> Result<Facility> {
        self.repo
            .get(facility_id)
            .await?
            .ok_or_else(|| Error::not_found("Facility", facility_id))
    }

    pub async fn detail(&self, facility_id: i32) -> Result<FacilityDetail> {
        let facility = self.get(facility_id).await?;
        let (storage_tanks, waste_units, sample_ids) = tokio::try_join!(
            self.tanks.list_for_facility(facility_id),
            self.units.list_for_facility(facility_id),
            self.samples.list_for_facility(facility_id),
        )?;
        Ok(FacilityDetail {
            facility,
            storage_tanks,
            waste_units,
            sample_ids,
        })
    }

    pub async fn create(&self, input: FacilityInput) -> Result<Facility> {
        let input = input.normalized();
        input.validate()?;

        let facility = self.repo.create(&input).await?;
        tracing::info!(
            facility_id = facility.facility_id,
            name = %facility.name,
            "Created facility"
        );
        Ok(facility)
    }

    /// Partial update: fields absent from the patch keep their stored value.
    pub async fn update(&self, facility_id: i32, patch: FacilityPatch) -> Result<Facility> {
        let current = self.get(facility_id).await?;
        self.replace(facility_id, patch.apply(&current)).await
    }

    /// Overwrite every writable column, as the HTML edit form does.
    pub async fn replace(&self, facility_id: i32, input: FacilityInput) -> Result<Facility> {
        let input = input.normalized();
        input.validate()?;

        let facility = self
            .repo
            .update(facility_id, &input)
            .await?
            .ok_or_else(|| Error::not_found("Facility", facility_id))?;
        tracing::info!(facility_id, "Updated facility");
        Ok(facility)
    }

    pub async fn delete(&self, facility_id: i32) -> Result<()> {
        if !self.repo.delete(facility_id).await? {
            return Err(Error::not_found("Facility", facility_id));
        }
        tracing::info!(facility_id, "Deleted facility and its dependents");
        Ok(())
    }

    pub async fn storage_tanks(
        &self,
        facility_id: i32,
    ) -> Result<FeatureCollection<<StorageTank as ToFeature>::Properties>> {
        self.ensure_exists(facility_id).await?;
        let tanks = self.tanks.list_for_facility(facility_id).await?;
        Ok(collect_features(&tanks))
    }

    pub async fn waste_units(
        &self,
        facility_id: i32,
    ) -> Result<FeatureCollection<<WasteUnit as ToFeature>::Properties>> {
        self.ensure_exists(facility_id).await?;
        let units = self.units.list_for_facility(facility_id).await?;
        Ok(collect_features(&units))
    }

    pub async fn sample_ids(
        &self,
        facility_id: i32,
    ) -> Result<FeatureCollection<<SampleId as ToFeature>::Properties>> {
        self.ensure_exists(facility_id).await?;
        let samples = self.samples.list_for_facility(facility_id).await?;
        Ok(collect_features(&samples))
    }

    async fn ensure_exists(&self, facility_id: i32) -> Result<()> {
        if self.repo.exists(facility_id).await? {
            Ok(())
        } else {
            Err(Error::not_found("Facility", facility_id))
        }
    }
}
