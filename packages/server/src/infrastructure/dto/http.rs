//! HTTP API response DTOs.

use serde::Serialize;

/// Response body of `GET /api/health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthDto {
    pub status: String,
    pub online_count: usize,
}

impl HealthDto {
    pub fn ok(online_count: usize) -> Self {
        Self {
            status: "ok".to_string(),
            online_count,
        }
    }
}
