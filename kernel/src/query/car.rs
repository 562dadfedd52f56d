use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{Car, CarId, CarOwnerId, CarStatus};
use crate::KernelError;

#[async_trait::async_trait]
pub trait CarQuery: 'static + Sync + Send {
    type Transaction: Transaction;
    async fn find_by_id(
        &self,
        con: &mut Self::Transaction,
        id: &CarId,
    ) -> error_stack::Result<Option<Car>, KernelError>;
    /// Reads the car and holds it for the rest of the transaction.
    async fn find_by_id_for_update(
        &self,
        con: &mut Self::Transaction,
        id: &CarId,
    ) -> error_stack::Result<Option<Car>, KernelError>;
    async fn find_by_id_and_owner(
        &self,
        con: &mut Self::Transaction,
        id: &CarId,
        owner_id: &CarOwnerId,
    ) -> error_stack::Result<Option<Car>, KernelError>;
    async fn find_all(
        &self,
        con: &mut Self::Transaction,
    ) -> error_stack::Result<Vec<Car>, KernelError>;
    async fn find_by_status(
        &self,
        con: &mut Self::Transaction,
        status: &CarStatus,
    ) -> error_stack::Result<Vec<Car>, KernelError>;
}

pub trait DependOnCarQuery: 'static + Sync + Send + DependOnDatabaseConnection {
    type CarQuery: CarQuery<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn car_query(&self) -> &Self::CarQuery;
}
