//! Business logic layer
//!
//! Services validate and normalize payloads, check parent rows, clamp
//! pagination and assemble GeoJSON before handing data to the handlers.
//! All SQL lives in the repositories under `crate::db`.

pub mod facility;
pub mod reference;
pub mod sampling;
pub mod storage_tank;
pub mod waste_unit;

pub use facility::{FacilityDetail, FacilityRef, FacilityService};
pub use reference::{ListResponse, ReferenceService};
pub use sampling::SamplingService;
pub use storage_tank::StorageTankService;
pub use waste_unit::WasteUnitService;

use crate::{config::AppConfig, models::ListQuery};

/// Default and maximum page sizes applied to list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default: u32,
    pub max: u32,
}

impl PageLimits {
    pub fn from_config(app: &AppConfig) -> Self {
        Self {
            default: app.posts_per_page,
            max: app.max_page_size.max(app.posts_per_page),
        }
    }

    pub fn resolve(&self, query: &ListQuery) -> (i64, i64) {
        query.resolve(self.default, self.max)
    }

    /// Limit and offset for GeoJSON collections, which return every row
    /// unless the client asks for a page.
    pub fn window(&self, query: &ListQuery) -> (Option<i64>, i64) {
        query.window(self.max)
    }

    pub fn resolve_parts(&self, limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
        self.resolve(&ListQuery { limit, offset })
    }
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default: 20,
            max: 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_never_drops_below_default() {
        let mut app = crate::Config::defaults().app;
        app.posts_per_page = 50;
        app.max_page_size = 10;
        let limits = PageLimits::from_config(&app);
        assert_eq!(limits.max, 50);
        assert_eq!(limits.resolve_parts(None, None), (50, 0));
    }

    #[test]
    fn collections_default_to_everything() {
        let limits = PageLimits::default();
        assert_eq!(limits.window(&ListQuery::default()), (None, 0));
        let paged = ListQuery {
            limit: Some(5),
            offset: None,
        };
        assert_eq!(limits.window(&paged), (Some(5), 0));
    }
}
