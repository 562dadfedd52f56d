use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{CarOwner, CarOwnerId};
use crate::KernelError;

#[async_trait::async_trait]
pub trait CarOwnerQuery: 'static + Sync + Send {
    type Transaction: Transaction;
    async fn find_by_id(
        &self,
        con: &mut Self::Transaction,
        id: &CarOwnerId,
    ) -> error_stack::Result<Option<CarOwner>, KernelError>;
    async fn exists_by_id(
        &self,
        con: &mut Self::Transaction,
        id: &CarOwnerId,
    ) -> error_stack::Result<bool, KernelError>;
}

pub trait DependOnCarOwnerQuery: 'static + Sync + Send + DependOnDatabaseConnection {
    type CarOwnerQuery: CarOwnerQuery<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn car_owner_query(&self) -> &Self::CarOwnerQuery;
}
