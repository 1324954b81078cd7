use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Last rate-limit state reported by the remote reference API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitWindow {
    pub limit: u32,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

impl RateLimitWindow {
    pub const fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}
