use kernel::prelude::entity::{Customer, DestructCustomer};
use uuid::Uuid;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CustomerDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl From<Customer> for CustomerDto {
    fn from(value: Customer) -> Self {
        let DestructCustomer {
            id,
            name,
            email,
            phone,
        } = value.into_destruct();
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }
}

pub struct GetCustomerDto {
    pub id: Uuid,
}

pub struct CreateCustomerDto {
    pub name: String,
    pub email: String,
    pub phone: String,
}
