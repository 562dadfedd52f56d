use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

/// Maximum number of leases a customer may hold at once.
pub const LEASE_LIMIT: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Fromln, AsRefln, Serialize, Deserialize)]
pub struct ActiveLeaseCount(i64);

impl ActiveLeaseCount {
    pub fn new(count: impl Into<i64>) -> Self {
        Self(count.into())
    }

    pub fn reached_limit(&self) -> bool {
        self.0 >= LEASE_LIMIT
    }
}
