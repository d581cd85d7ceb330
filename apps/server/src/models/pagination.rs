use serde::Deserialize;

/// `limit`/`offset` query parameters accepted by list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListQuery {
    /// Clamp to `1..=max`, falling back to `default` when unset.
    pub fn resolve(&self, default: u32, max: u32) -> (i64, i64) {
        let limit = self
            .limit
            .unwrap_or(default as i64)
            .clamp(1, max.max(1) as i64);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }

    /// Window for collections that default to the whole set: the limit is
    /// only applied, and clamped to `1..=max`, when the client sends one.
    pub fn window(&self, max: u32) -> (Option<i64>, i64) {
        let limit = self.limit.map(|l| l.clamp(1, max.max(1) as i64));
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

/// One page of an HTML listing.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
    pub pages: u32,
    pub has_prev: bool,
    pub has_next: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: u32, per_page: u32, total: i64) -> Self {
        let per_page = per_page.max(1);
        let pages = ((total.max(0) as u64).div_ceil(per_page as u64)).max(1) as u32;
        Self {
            items,
            page,
            per_page,
            total,
            pages,
            has_prev: page > 1,
            has_next: page < pages,
        }
    }

    /// Row offset of a 1-based page number.
    pub fn offset(page: u32, per_page: u32) -> i64 {
        (page.max(1) as i64 - 1) * per_page as i64
    }
}
