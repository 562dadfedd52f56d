use kernel::prelude::entity::{DestructLease, Lease};
use time::Date;
use uuid::Uuid;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct LeaseDto {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub car_id: Uuid,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub active: bool,
}

impl From<Lease> for LeaseDto {
    fn from(value: Lease) -> Self {
        let DestructLease {
            id,
            customer_id,
            car_id,
            start_date,
            end_date,
            active,
        } = value.into_destruct();
        Self {
            id: id.into(),
            customer_id: customer_id.into(),
            car_id: car_id.into(),
            start_date: start_date.into(),
            end_date: end_date.map(Date::from),
            active: active.into(),
        }
    }
}

pub struct StartLeaseDto {
    pub customer_id: Uuid,
    pub car_id: Uuid,
    pub start_date: Date,
    pub end_date: Option<Date>,
}

/// Administrative termination: any active lease by id.
pub struct EndLeaseDto {
    pub lease_id: Uuid,
}

/// Customer-initiated termination: the lease must belong to `customer_id`.
pub struct EndCustomerLeaseDto {
    pub lease_id: Uuid,
    pub customer_id: Uuid,
}

pub struct GetLeaseFromCustomerIdDto {
    pub customer_id: Uuid,
}

pub struct GetLeaseFromCarIdDto {
    pub car_id: Uuid,
}

pub struct GetLeaseFromOwnerIdDto {
    pub owner_id: Uuid,
}
