use kernel::prelude::entity::{Car, CarStatus, DestructCar};
use uuid::Uuid;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CarDto {
    pub id: Uuid,
    pub model: String,
    pub make: String,
    pub color: String,
    pub status: CarStatus,
    pub owner_id: Option<Uuid>,
}

impl From<Car> for CarDto {
    fn from(value: Car) -> Self {
        let DestructCar {
            id,
            model,
            make,
            color,
            status,
            owner_id,
        } = value.into_destruct();
        Self {
            id: id.into(),
            model: model.into(),
            make: make.into(),
            color: color.into(),
            status,
            owner_id: owner_id.map(Uuid::from),
        }
    }
}

/// `status` falls back to `IDLE`.
pub struct CreateCarDto {
    pub model: String,
    pub make: String,
    pub color: String,
    pub status: Option<CarStatus>,
}

pub struct CreateOwnerCarDto {
    pub owner_id: Uuid,
    pub model: String,
    pub make: String,
    pub color: String,
    pub status: Option<CarStatus>,
}

pub struct UpdateCarStatusDto {
    pub id: Uuid,
    pub status: CarStatus,
}

pub struct GetCarDto {
    pub id: Uuid,
}

pub struct GetOwnedCarDto {
    pub owner_id: Uuid,
    pub car_id: Uuid,
}
