use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OwnedMutexGuard};

use kernel::interface::database::{DatabaseConnection, Transaction};
use kernel::interface::query::{
    DependOnCarOwnerQuery, DependOnCarQuery, DependOnCustomerQuery, DependOnLeaseQuery,
};
use kernel::interface::update::{
    DependOnCarModifier, DependOnCarOwnerModifier, DependOnCustomerModifier, DependOnLeaseModifier,
};
use kernel::prelude::entity::{Car, CarOwner, Customer, Lease};
use kernel::KernelError;

use crate::error::ConvertError;

pub use self::{car::*, customer::*, lease::*, owner::*};

mod car;
mod customer;
mod lease;
mod owner;

const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Every entity addressed by id. Rows keep insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryArena {
    cars: Vec<Car>,
    customers: Vec<Customer>,
    owners: Vec<CarOwner>,
    leases: Vec<Lease>,
}

/// In-process store. A transaction holds the arena lock from `transact` until it is
/// committed or dropped, so transactions never interleave.
#[derive(Clone)]
pub struct MemoryDatabase {
    arena: Arc<Mutex<MemoryArena>>,
    lock_timeout: Duration,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self {
            arena: Arc::new(Mutex::new(MemoryArena::default())),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    pub fn with_lock_timeout(self, lock_timeout: Duration) -> Self {
        Self {
            lock_timeout,
            ..self
        }
    }
}

impl Default for MemoryDatabase {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes land in a staged copy of the arena and are published on commit.
pub struct MemoryTransaction {
    guard: OwnedMutexGuard<MemoryArena>,
    staged: MemoryArena,
}

#[async_trait::async_trait]
impl DatabaseConnection for MemoryDatabase {
    type Transaction = MemoryTransaction;
    async fn transact(&self) -> error_stack::Result<Self::Transaction, KernelError> {
        let guard = tokio::time::timeout(self.lock_timeout, Arc::clone(&self.arena).lock_owned())
            .await
            .convert_error()?;
        let staged = MemoryArena::clone(&guard);
        Ok(MemoryTransaction { guard, staged })
    }
}

#[async_trait::async_trait]
impl Transaction for MemoryTransaction {
    async fn commit(self) -> error_stack::Result<(), KernelError> {
        let MemoryTransaction { mut guard, staged } = self;
        *guard = staged;
        tracing::debug!("memory transaction committed");
        Ok(())
    }

    async fn roll_back(self) -> error_stack::Result<(), KernelError> {
        tracing::debug!("memory transaction rolled back");
        Ok(())
    }
}

impl Deref for MemoryTransaction {
    type Target = MemoryArena;
    fn deref(&self) -> &Self::Target {
        &self.staged
    }
}

impl DerefMut for MemoryTransaction {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.staged
    }
}

impl DependOnCarQuery for MemoryDatabase {
    type CarQuery = MemoryCarRepository;
    fn car_query(&self) -> &Self::CarQuery {
        &MemoryCarRepository
    }
}

impl DependOnCarModifier for MemoryDatabase {
    type CarModifier = MemoryCarRepository;
    fn car_modifier(&self) -> &Self::CarModifier {
        &MemoryCarRepository
    }
}

impl DependOnCustomerQuery for MemoryDatabase {
    type CustomerQuery = MemoryCustomerRepository;
    fn customer_query(&self) -> &Self::CustomerQuery {
        &MemoryCustomerRepository
    }
}

impl DependOnCustomerModifier for MemoryDatabase {
    type CustomerModifier = MemoryCustomerRepository;
    fn customer_modifier(&self) -> &Self::CustomerModifier {
        &MemoryCustomerRepository
    }
}

impl DependOnCarOwnerQuery for MemoryDatabase {
    type CarOwnerQuery = MemoryCarOwnerRepository;
    fn car_owner_query(&self) -> &Self::CarOwnerQuery {
        &MemoryCarOwnerRepository
    }
}

impl DependOnCarOwnerModifier for MemoryDatabase {
    type CarOwnerModifier = MemoryCarOwnerRepository;
    fn car_owner_modifier(&self) -> &Self::CarOwnerModifier {
        &MemoryCarOwnerRepository
    }
}

impl DependOnLeaseQuery for MemoryDatabase {
    type LeaseQuery = MemoryLeaseRepository;
    fn lease_query(&self) -> &Self::LeaseQuery {
        &MemoryLeaseRepository
    }
}

impl DependOnLeaseModifier for MemoryDatabase {
    type LeaseModifier = MemoryLeaseRepository;
    fn lease_modifier(&self) -> &Self::LeaseModifier {
        &MemoryLeaseRepository
    }
}
