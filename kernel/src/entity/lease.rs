mod active;
mod count;
mod date;
mod id;

pub use self::{active::*, count::*, date::*, id::*};
use crate::entity::{CarId, CustomerId};
use crate::KernelError;
use destructure::Destructure;
use error_stack::Report;
use serde::{Deserialize, Serialize};
use vodca::References;

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, References, Destructure)]
pub struct Lease {
    id: LeaseId,
    customer_id: CustomerId,
    car_id: CarId,
    start_date: LeaseStartDate,
    end_date: Option<LeaseEndDate>,
    active: IsActive<Lease>,
}

impl Lease {
    pub fn new(
        id: LeaseId,
        customer_id: CustomerId,
        car_id: CarId,
        start_date: LeaseStartDate,
        end_date: Option<LeaseEndDate>,
        active: IsActive<Lease>,
    ) -> Self {
        Self {
            id,
            customer_id,
            car_id,
            start_date,
            end_date,
            active,
        }
    }

    /// Opens a new active lease. The planned end date may not precede the start date.
    pub fn start(
        id: LeaseId,
        customer_id: CustomerId,
        car_id: CarId,
        start_date: LeaseStartDate,
        end_date: Option<LeaseEndDate>,
    ) -> error_stack::Result<Self, KernelError> {
        if let Some(end_date) = &end_date {
            if end_date.as_ref() < start_date.as_ref() {
                return Err(Report::new(KernelError::Validation).attach_printable(format!(
                    "lease end date {} is before start date {}",
                    end_date.as_ref(),
                    start_date.as_ref()
                )));
            }
        }
        Ok(Self::new(
            id,
            customer_id,
            car_id,
            start_date,
            end_date,
            IsActive::new(true),
        ))
    }

    pub fn end(&mut self) -> error_stack::Result<(), KernelError> {
        if !self.is_active() {
            return Err(Report::new(KernelError::StateConflict)
                .attach_printable(format!("lease {} is already ended", self.id)));
        }
        self.active = IsActive::new(false);
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        *self.active.as_ref()
    }
}

#[cfg(test)]
mod test {
    use time::macros::date;
    use uuid::Uuid;

    use crate::entity::{
        ActiveLeaseCount, CarId, CustomerId, Lease, LeaseEndDate, LeaseId, LeaseStartDate,
    };
    use crate::KernelError;

    fn ids() -> (LeaseId, CustomerId, CarId) {
        (
            LeaseId::new(Uuid::new_v4()),
            CustomerId::new(Uuid::new_v4()),
            CarId::new(Uuid::new_v4()),
        )
    }

    #[test]
    fn start_and_end() {
        let (id, customer_id, car_id) = ids();
        let mut lease = Lease::start(
            id,
            customer_id,
            car_id,
            LeaseStartDate::new(date!(2024 - 01 - 01)),
            Some(LeaseEndDate::new(date!(2024 - 06 - 30))),
        )
        .unwrap();
        assert!(lease.is_active());

        lease.end().unwrap();
        assert!(!lease.is_active());

        let error = lease.end().unwrap_err();
        assert_eq!(error.current_context(), &KernelError::StateConflict);
    }

    #[test]
    fn reject_end_before_start() {
        let (id, customer_id, car_id) = ids();
        let error = Lease::start(
            id,
            customer_id,
            car_id,
            LeaseStartDate::new(date!(2024 - 03 - 01)),
            Some(LeaseEndDate::new(date!(2024 - 02 - 01))),
        )
        .unwrap_err();
        assert_eq!(error.current_context(), &KernelError::Validation);
    }

    #[test]
    fn open_ended_lease() {
        let (id, customer_id, car_id) = ids();
        let lease = Lease::start(
            id,
            customer_id,
            car_id,
            LeaseStartDate::new(date!(2024 - 03 - 01)),
            None,
        )
        .unwrap();
        assert!(lease.end_date().is_none());
    }

    #[test]
    fn active_flag_is_plain_bool() {
        let (id, customer_id, car_id) = ids();
        let mut lease = Lease::start(
            id,
            customer_id,
            car_id,
            LeaseStartDate::new(date!(2024 - 03 - 01)),
            None,
        )
        .unwrap();
        lease.end().unwrap();

        let json = serde_json::to_value(&lease).unwrap();
        assert_eq!(json["active"], serde_json::Value::Bool(false));
        let restored: Lease = serde_json::from_value(json).unwrap();
        assert_eq!(restored, lease);
    }

    #[test]
    fn limit() {
        assert!(!ActiveLeaseCount::new(0).reached_limit());
        assert!(!ActiveLeaseCount::new(1).reached_limit());
        assert!(ActiveLeaseCount::new(2).reached_limit());
    }
}
