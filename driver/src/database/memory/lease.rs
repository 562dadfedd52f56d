use error_stack::Report;

use kernel::interface::query::LeaseQuery;
use kernel::interface::update::LeaseModifier;
use kernel::prelude::entity::{ActiveLeaseCount, CarId, CarOwnerId, CustomerId, Lease, LeaseId};
use kernel::KernelError;

use crate::database::memory::MemoryTransaction;

pub struct MemoryLeaseRepository;

#[async_trait::async_trait]
impl LeaseQuery for MemoryLeaseRepository {
    type Transaction = MemoryTransaction;

    async fn find_by_id(
        &self,
        con: &mut MemoryTransaction,
        id: &LeaseId,
    ) -> error_stack::Result<Option<Lease>, KernelError> {
        Ok(con.leases.iter().find(|lease| lease.id() == id).cloned())
    }

    async fn find_by_id_for_update(
        &self,
        con: &mut MemoryTransaction,
        id: &LeaseId,
    ) -> error_stack::Result<Option<Lease>, KernelError> {
        self.find_by_id(con, id).await
    }

    async fn find_active_by_id_and_customer(
        &self,
        con: &mut MemoryTransaction,
        id: &LeaseId,
        customer_id: &CustomerId,
    ) -> error_stack::Result<Option<Lease>, KernelError> {
        Ok(con
            .leases
            .iter()
            .find(|lease| {
                lease.id() == id && lease.customer_id() == customer_id && lease.is_active()
            })
            .cloned())
    }

    async fn count_active_by_customer(
        &self,
        con: &mut MemoryTransaction,
        customer_id: &CustomerId,
    ) -> error_stack::Result<ActiveLeaseCount, KernelError> {
        let count = con
            .leases
            .iter()
            .filter(|lease| lease.customer_id() == customer_id && lease.is_active())
            .count();
        let count = i64::try_from(count).map_err(|error| {
            Report::new(error).change_context(KernelError::Internal)
        })?;
        Ok(ActiveLeaseCount::new(count))
    }

    async fn find_by_customer_id(
        &self,
        con: &mut MemoryTransaction,
        customer_id: &CustomerId,
    ) -> error_stack::Result<Vec<Lease>, KernelError> {
        Ok(con
            .leases
            .iter()
            .filter(|lease| lease.customer_id() == customer_id)
            .cloned()
            .collect())
    }

    async fn find_by_car_id(
        &self,
        con: &mut MemoryTransaction,
        car_id: &CarId,
    ) -> error_stack::Result<Vec<Lease>, KernelError> {
        Ok(con
            .leases
            .iter()
            .filter(|lease| lease.car_id() == car_id)
            .cloned()
            .collect())
    }

    async fn find_by_owner_id(
        &self,
        con: &mut MemoryTransaction,
        owner_id: &CarOwnerId,
    ) -> error_stack::Result<Vec<Lease>, KernelError> {
        let owned = con
            .cars
            .iter()
            .filter(|car| car.owner_id().as_ref() == Some(owner_id))
            .map(|car| *car.id())
            .collect::<Vec<CarId>>();
        Ok(con
            .leases
            .iter()
            .filter(|lease| owned.contains(lease.car_id()))
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl LeaseModifier for MemoryLeaseRepository {
    type Transaction = MemoryTransaction;

    async fn create(
        &self,
        con: &mut MemoryTransaction,
        lease: &Lease,
    ) -> error_stack::Result<(), KernelError> {
        if con.leases.iter().any(|stored| stored.id() == lease.id()) {
            return Err(Report::new(KernelError::AlreadyExists)
                .attach_printable(format!("lease {} already exists", lease.id())));
        }
        if !con
            .customers
            .iter()
            .any(|customer| customer.id() == lease.customer_id())
        {
            return Err(Report::new(KernelError::NotFound)
                .attach_printable(format!("customer {} does not exist", lease.customer_id())));
        }
        if !con.cars.iter().any(|car| car.id() == lease.car_id()) {
            return Err(Report::new(KernelError::NotFound)
                .attach_printable(format!("car {} does not exist", lease.car_id())));
        }
        if lease.is_active()
            && con
                .leases
                .iter()
                .any(|stored| stored.car_id() == lease.car_id() && stored.is_active())
        {
            return Err(Report::new(KernelError::AlreadyExists)
                .attach_printable(format!("car {} already has an active lease", lease.car_id())));
        }
        con.leases.push(lease.clone());
        Ok(())
    }

    async fn update(
        &self,
        con: &mut MemoryTransaction,
        lease: &Lease,
    ) -> error_stack::Result<(), KernelError> {
        let stored = con
            .leases
            .iter_mut()
            .find(|stored| stored.id() == lease.id())
            .ok_or_else(|| {
                Report::new(KernelError::NotFound)
                    .attach_printable(format!("lease {} does not exist", lease.id()))
            })?;
        *stored = lease.clone();
        Ok(())
    }
}
