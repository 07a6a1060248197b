use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Number of items to skip
    #[serde(default)]
    pub offset: u32,
    /// Maximum number of items to return (1-100)
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    10
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: default_limit(),
        }
    }
}

impl PaginationParams {
    pub fn new(offset: u32, limit: u32) -> Self {
        Self { offset, limit }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.limit < 1 || self.limit > MAX_LIMIT {
            return Err(format!("limit must be between 1 and {}", MAX_LIMIT));
        }
        Ok(())
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.offset)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.limit)
    }
}

/// A page of results in limit/offset form.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: u32,
    pub offset: u32,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, params: &PaginationParams, total: i64) -> Self {
        Self {
            items,
            total,
            limit: params.limit,
            offset: params.offset,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResponse<U> {
        PaginatedResponse {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            limit: self.limit,
            offset: self.offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params: PaginationParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.offset, 0);
        assert_eq!(params.limit, 10);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_limit_bounds() {
        assert!(PaginationParams::new(0, 0).validate().is_err());
        assert!(PaginationParams::new(0, 1).validate().is_ok());
        assert!(PaginationParams::new(0, 100).validate().is_ok());
        assert_eq!(
            PaginationParams::new(0, 101).validate(),
            Err("limit must be between 1 and 100".to_string())
        );
    }

    #[test]
    fn test_map_keeps_metadata() {
        let params = PaginationParams::new(20, 5);
        let page = PaginatedResponse::new(vec![1, 2, 3], &params, 23).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20, 30]);
        assert_eq!(page.total, 23);
        assert_eq!(page.limit, 5);
        assert_eq!(page.offset, 20);
    }
}
