use error_stack::Report;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::KernelError;

const IDLE: &str = "IDLE";
const ON_LEASE: &str = "ON_LEASE";
const ON_SERVICE: &str = "ON_SERVICE";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CarStatus {
    /// Available for lease
    #[default]
    Idle,
    OnLease,
    /// Undergoing service
    OnService,
}

impl CarStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CarStatus::Idle => IDLE,
            CarStatus::OnLease => ON_LEASE,
            CarStatus::OnService => ON_SERVICE,
        }
    }
}

impl Display for CarStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CarStatus {
    type Err = Report<KernelError>;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            IDLE => Ok(Self::Idle),
            ON_LEASE => Ok(Self::OnLease),
            ON_SERVICE => Ok(Self::OnService),
            _ => Err(Report::new(KernelError::Validation)
                .attach_printable(format!("unknown car status: {s}"))),
        }
    }
}
