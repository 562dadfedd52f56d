mod email;
mod id;
mod name;

pub use self::{email::*, id::*, name::*};
use destructure::Destructure;
use serde::{Deserialize, Serialize};
use vodca::References;

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, Destructure, References)]
pub struct CarOwner {
    id: CarOwnerId,
    name: CarOwnerName,
    email: CarOwnerEmail,
}

impl CarOwner {
    pub fn new(id: CarOwnerId, name: CarOwnerName, email: CarOwnerEmail) -> Self {
        Self { id, name, email }
    }
}
