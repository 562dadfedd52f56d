use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::CarOwner;
use crate::KernelError;

#[async_trait::async_trait]
pub trait CarOwnerModifier: 'static + Sync + Send {
    type Transaction: Transaction;
    async fn create(
        &self,
        con: &mut Self::Transaction,
        owner: &CarOwner,
    ) -> error_stack::Result<(), KernelError>;
}

pub trait DependOnCarOwnerModifier: 'static + Sync + Send + DependOnDatabaseConnection {
    type CarOwnerModifier: CarOwnerModifier<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn car_owner_modifier(&self) -> &Self::CarOwnerModifier;
}
