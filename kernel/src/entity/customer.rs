mod email;
mod id;
mod name;
mod phone;

pub use self::{email::*, id::*, name::*, phone::*};
use destructure::Destructure;
use serde::{Deserialize, Serialize};
use vodca::References;

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, Destructure, References)]
pub struct Customer {
    id: CustomerId,
    name: CustomerName,
    email: CustomerEmail,
    phone: CustomerPhone,
}

impl Customer {
    pub fn new(
        id: CustomerId,
        name: CustomerName,
        email: CustomerEmail,
        phone: CustomerPhone,
    ) -> Self {
        Self {
            id,
            name,
            email,
            phone,
        }
    }
}
