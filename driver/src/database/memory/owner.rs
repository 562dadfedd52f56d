use error_stack::Report;

use kernel::interface::query::CarOwnerQuery;
use kernel::interface::update::CarOwnerModifier;
use kernel::prelude::entity::{CarOwner, CarOwnerId};
use kernel::KernelError;

use crate::database::memory::MemoryTransaction;

pub struct MemoryCarOwnerRepository;

#[async_trait::async_trait]
impl CarOwnerQuery for MemoryCarOwnerRepository {
    type Transaction = MemoryTransaction;

    async fn find_by_id(
        &self,
        con: &mut MemoryTransaction,
        id: &CarOwnerId,
    ) -> error_stack::Result<Option<CarOwner>, KernelError> {
        Ok(con.owners.iter().find(|owner| owner.id() == id).cloned())
    }

    async fn exists_by_id(
        &self,
        con: &mut MemoryTransaction,
        id: &CarOwnerId,
    ) -> error_stack::Result<bool, KernelError> {
        Ok(con.owners.iter().any(|owner| owner.id() == id))
    }
}

#[async_trait::async_trait]
impl CarOwnerModifier for MemoryCarOwnerRepository {
    type Transaction = MemoryTransaction;

    async fn create(
        &self,
        con: &mut MemoryTransaction,
        owner: &CarOwner,
    ) -> error_stack::Result<(), KernelError> {
        if con.owners.iter().any(|stored| stored.id() == owner.id()) {
            return Err(Report::new(KernelError::AlreadyExists)
                .attach_printable(format!("car owner {} already exists", owner.id())));
        }
        con.owners.push(owner.clone());
        Ok(())
    }
}
