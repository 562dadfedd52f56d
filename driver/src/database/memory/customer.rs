use error_stack::Report;

use kernel::interface::query::CustomerQuery;
use kernel::interface::update::CustomerModifier;
use kernel::prelude::entity::{Customer, CustomerEmail, CustomerId};
use kernel::KernelError;

use crate::database::memory::MemoryTransaction;

pub struct MemoryCustomerRepository;

#[async_trait::async_trait]
impl CustomerQuery for MemoryCustomerRepository {
    type Transaction = MemoryTransaction;

    async fn find_by_id(
        &self,
        con: &mut MemoryTransaction,
        id: &CustomerId,
    ) -> error_stack::Result<Option<Customer>, KernelError> {
        Ok(con
            .customers
            .iter()
            .find(|customer| customer.id() == id)
            .cloned())
    }

    /// The transaction already holds the whole arena.
    async fn find_by_id_for_update(
        &self,
        con: &mut MemoryTransaction,
        id: &CustomerId,
    ) -> error_stack::Result<Option<Customer>, KernelError> {
        self.find_by_id(con, id).await
    }

    async fn find_by_email(
        &self,
        con: &mut MemoryTransaction,
        email: &CustomerEmail,
    ) -> error_stack::Result<Option<Customer>, KernelError> {
        Ok(con
            .customers
            .iter()
            .find(|customer| customer.email() == email)
            .cloned())
    }

    async fn find_all(
        &self,
        con: &mut MemoryTransaction,
    ) -> error_stack::Result<Vec<Customer>, KernelError> {
        Ok(con.customers.clone())
    }
}

#[async_trait::async_trait]
impl CustomerModifier for MemoryCustomerRepository {
    type Transaction = MemoryTransaction;

    async fn create(
        &self,
        con: &mut MemoryTransaction,
        customer: &Customer,
    ) -> error_stack::Result<(), KernelError> {
        if let Some(stored) = con
            .customers
            .iter()
            .find(|stored| stored.id() == customer.id() || stored.email() == customer.email())
        {
            return Err(Report::new(KernelError::AlreadyExists).attach_printable(format!(
                "customer {} already uses id or email",
                stored.id()
            )));
        }
        con.customers.push(customer.clone());
        Ok(())
    }
}
