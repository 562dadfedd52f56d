use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{ActiveLeaseCount, CarId, CarOwnerId, CustomerId, Lease, LeaseId};
use crate::KernelError;

/// Lease lookups. Every list is returned in creation order.
#[async_trait::async_trait]
pub trait LeaseQuery: 'static + Sync + Send {
    type Transaction: Transaction;
    async fn find_by_id(
        &self,
        con: &mut Self::Transaction,
        id: &LeaseId,
    ) -> error_stack::Result<Option<Lease>, KernelError>;
    /// Reads the lease and holds it for the rest of the transaction.
    async fn find_by_id_for_update(
        &self,
        con: &mut Self::Transaction,
        id: &LeaseId,
    ) -> error_stack::Result<Option<Lease>, KernelError>;
    /// Holds the matching lease like [`LeaseQuery::find_by_id_for_update`].
    async fn find_active_by_id_and_customer(
        &self,
        con: &mut Self::Transaction,
        id: &LeaseId,
        customer_id: &CustomerId,
    ) -> error_stack::Result<Option<Lease>, KernelError>;
    async fn count_active_by_customer(
        &self,
        con: &mut Self::Transaction,
        customer_id: &CustomerId,
    ) -> error_stack::Result<ActiveLeaseCount, KernelError>;
    async fn find_by_customer_id(
        &self,
        con: &mut Self::Transaction,
        customer_id: &CustomerId,
    ) -> error_stack::Result<Vec<Lease>, KernelError>;
    async fn find_by_car_id(
        &self,
        con: &mut Self::Transaction,
        car_id: &CarId,
    ) -> error_stack::Result<Vec<Lease>, KernelError>;
    async fn find_by_owner_id(
        &self,
        con: &mut Self::Transaction,
        owner_id: &CarOwnerId,
    ) -> error_stack::Result<Vec<Lease>, KernelError>;
}

pub trait DependOnLeaseQuery: 'static + Sync + Send + DependOnDatabaseConnection {
    type LeaseQuery: LeaseQuery<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn lease_query(&self) -> &Self::LeaseQuery;
}
