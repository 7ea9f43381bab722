use serde::Deserialize;

use crate::errors::{CoreError, CoreResult};

pub const DEFAULT_LIMIT: u64 = 20;
pub const MAX_PUBLIC_LIMIT: u64 = 100;
pub const MAX_ADMIN_LIMIT: u64 = 500;

/// Raw `limit`/`offset` pair as supplied by a caller.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PageRequest {
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self { limit, offset }
    }
}

/// A validated page window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub limit: u64,
    pub offset: u64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl Page {
    /// Bounds for lists exposed to every caller.
    pub fn public(request: PageRequest) -> CoreResult<Self> {
        Self::bounded(request, MAX_PUBLIC_LIMIT)
    }

    /// Wider bounds for admin-only lists.
    pub fn admin(request: PageRequest) -> CoreResult<Self> {
        Self::bounded(request, MAX_ADMIN_LIMIT)
    }

    fn bounded(request: PageRequest, max_limit: u64) -> CoreResult<Self> {
        let limit = match request.limit {
            None => DEFAULT_LIMIT,
            Some(limit) if limit >= 1 && (limit as u64) <= max_limit => limit as u64,
            Some(_) => {
                return Err(CoreError::invalid_field(
                    "limit",
                    format!("limit must be between 1 and {}", max_limit),
                ))
            }
        };

        let offset = match request.offset {
            None => 0,
            Some(offset) if offset >= 0 => offset as u64,
            Some(_) => {
                return Err(CoreError::invalid_field("offset", "offset cannot be negative"))
            }
        };

        Ok(Self { limit, offset })
    }
}
