use serde::{Deserialize, Serialize};
use time::Date;
use vodca::{AsRefln, Fromln};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Fromln, AsRefln, Serialize,
    Deserialize,
)]
pub struct LeaseStartDate(Date);

impl LeaseStartDate {
    pub fn new(date: impl Into<Date>) -> Self {
        Self(date.into())
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Fromln, AsRefln, Serialize,
    Deserialize,
)]
pub struct LeaseEndDate(Date);

impl LeaseEndDate {
    pub fn new(date: impl Into<Date>) -> Self {
        Self(date.into())
    }
}
