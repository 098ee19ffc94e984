use crate::breed_store::BreedMap;
use serde::Serialize;

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_LIMIT: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

fn parse_positive(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|value| *value > 0)
}

impl PageRequest {
    /// Builds a request from raw query values. Anything missing, non-numeric
    /// or non-positive falls back to the default.
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        PageRequest {
            page: parse_positive(page).unwrap_or(DEFAULT_PAGE),
            limit: parse_positive(limit).unwrap_or(DEFAULT_LIMIT),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreedPage {
    pub data: BreedMap,
    pub total: usize,
    pub page: usize,
    #[serde(rename = "totalPages")]
    pub total_pages: usize,
}

impl BreedPage {
    /// Cuts the window for `request` out of `breeds`, in their stored order.
    pub fn paginate(breeds: BreedMap, request: PageRequest) -> Self {
        let total = breeds.len();
        let data = breeds
            .into_iter()
            .skip(request.offset())
            .take(request.limit)
            .collect();
        BreedPage {
            data,
            total,
            page: request.page,
            total_pages: total.div_ceil(request.limit),
        }
    }
}
