use kernel::prelude::entity::{CarOwner, DestructCarOwner};
use uuid::Uuid;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CarOwnerDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<CarOwner> for CarOwnerDto {
    fn from(value: CarOwner) -> Self {
        let DestructCarOwner { id, name, email } = value.into_destruct();
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
        }
    }
}

pub struct CreateCarOwnerDto {
    pub name: String,
    pub email: String,
}
