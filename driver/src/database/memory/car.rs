use error_stack::Report;

use kernel::interface::query::CarQuery;
use kernel::interface::update::CarModifier;
use kernel::prelude::entity::{Car, CarId, CarOwnerId, CarStatus};
use kernel::KernelError;

use crate::database::memory::MemoryTransaction;

pub struct MemoryCarRepository;

#[async_trait::async_trait]
impl CarQuery for MemoryCarRepository {
    type Transaction = MemoryTransaction;

    async fn find_by_id(
        &self,
        con: &mut MemoryTransaction,
        id: &CarId,
    ) -> error_stack::Result<Option<Car>, KernelError> {
        Ok(con.cars.iter().find(|car| car.id() == id).cloned())
    }

    async fn find_by_id_for_update(
        &self,
        con: &mut MemoryTransaction,
        id: &CarId,
    ) -> error_stack::Result<Option<Car>, KernelError> {
        self.find_by_id(con, id).await
    }

    async fn find_by_id_and_owner(
        &self,
        con: &mut MemoryTransaction,
        id: &CarId,
        owner_id: &CarOwnerId,
    ) -> error_stack::Result<Option<Car>, KernelError> {
        Ok(con
            .cars
            .iter()
            .find(|car| car.id() == id && car.owner_id().as_ref() == Some(owner_id))
            .cloned())
    }

    async fn find_all(
        &self,
        con: &mut MemoryTransaction,
    ) -> error_stack::Result<Vec<Car>, KernelError> {
        Ok(con.cars.clone())
    }

    async fn find_by_status(
        &self,
        con: &mut MemoryTransaction,
        status: &CarStatus,
    ) -> error_stack::Result<Vec<Car>, KernelError> {
        Ok(con
            .cars
            .iter()
            .filter(|car| car.status() == status)
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl CarModifier for MemoryCarRepository {
    type Transaction = MemoryTransaction;

    async fn create(
        &self,
        con: &mut MemoryTransaction,
        car: &Car,
    ) -> error_stack::Result<(), KernelError> {
        if con.cars.iter().any(|stored| stored.id() == car.id()) {
            return Err(Report::new(KernelError::AlreadyExists)
                .attach_printable(format!("car {} already exists", car.id())));
        }
        if let Some(owner_id) = car.owner_id() {
            if !con.owners.iter().any(|owner| owner.id() == owner_id) {
                return Err(Report::new(KernelError::NotFound)
                    .attach_printable(format!("car owner {owner_id} does not exist")));
            }
        }
        con.cars.push(car.clone());
        Ok(())
    }

    async fn update(
        &self,
        con: &mut MemoryTransaction,
        car: &Car,
    ) -> error_stack::Result<(), KernelError> {
        let stored = con
            .cars
            .iter_mut()
            .find(|stored| stored.id() == car.id())
            .ok_or_else(|| {
                Report::new(KernelError::NotFound)
                    .attach_printable(format!("car {} does not exist", car.id()))
            })?;
        *stored = car.clone();
        Ok(())
    }
}
