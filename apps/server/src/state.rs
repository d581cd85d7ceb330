//! Shared application state

use crate::{
    config::Config,
    csrf::CsrfManager,
    db,
    services::{
        FacilityService, PageLimits, ReferenceService, SamplingService, StorageTankService,
        WasteUnitService,
    },
    views::Templates,
    Result,
};
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db_pool: PgPool,
    pub templates: Arc<Templates>,
    pub csrf: Arc<CsrfManager>,
    pub facility_service: Arc<FacilityService>,
    pub storage_tank_service: Arc<StorageTankService>,
    pub waste_unit_service: Arc<WasteUnitService>,
    pub sampling_service: Arc<SamplingService>,
    pub reference_service: Arc<ReferenceService>,
}

impl AppState {
    /// Connect to the database, apply migrations when configured and wire
    /// up the services.
    pub async fn new(config: Config) -> Result<Self> {
        tracing::info!("Initializing application state...");

        let db_pool = db::create_pool(&config.database).await?;

        if config.database.run_migrations {
            db::run_migrations(&db_pool).await?;
        }

        let state = Self::from_pool(config, db_pool)?;
        tracing::info!("Application state initialized");
        Ok(state)
    }

    /// Build state around an existing pool without touching the database.
    pub fn from_pool(config: Config, db_pool: PgPool) -> Result<Self> {
        let limits = PageLimits::from_config(&config.app);
        let templates = Templates::new()?;
        let csrf = CsrfManager::new(&config.app);

        Ok(Self {
            facility_service: Arc::new(FacilityService::new(db_pool.clone(), limits)),
            storage_tank_service: Arc::new(StorageTankService::new(db_pool.clone(), limits)),
            waste_unit_service: Arc::new(WasteUnitService::new(db_pool.clone(), limits)),
            sampling_service: Arc::new(SamplingService::new(db_pool.clone(), limits)),
            reference_service: Arc::new(ReferenceService::new(db_pool.clone(), limits)),
            templates: Arc::new(templates),
            csrf: Arc::new(csrf),
            config: Arc::new(config),
            db_pool,
        })
    }
}
