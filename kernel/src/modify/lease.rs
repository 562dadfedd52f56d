use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::Lease;
use crate::KernelError;

#[async_trait::async_trait]
pub trait LeaseModifier: 'static + Sync + Send {
    type Transaction: Transaction;
    async fn create(
        &self,
        con: &mut Self::Transaction,
        lease: &Lease,
    ) -> error_stack::Result<(), KernelError>;
    async fn update(
        &self,
        con: &mut Self::Transaction,
        lease: &Lease,
    ) -> error_stack::Result<(), KernelError>;
}

pub trait DependOnLeaseModifier: 'static + Sync + Send + DependOnDatabaseConnection {
    type LeaseModifier: LeaseModifier<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn lease_modifier(&self) -> &Self::LeaseModifier;
}
