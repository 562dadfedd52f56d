use error_stack::Report;
use uuid::Uuid;

use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use kernel::interface::query::{CustomerQuery, DependOnCustomerQuery};
use kernel::interface::update::{CustomerModifier, DependOnCustomerModifier};
use kernel::prelude::entity::{Customer, CustomerEmail, CustomerId, CustomerName, CustomerPhone};
use kernel::KernelError;

use crate::service::OrNotFound;
use crate::transfer::{CreateCustomerDto, CustomerDto, GetCustomerDto};

#[async_trait::async_trait]
pub trait RegisterCustomerService:
    'static + Sync + Send + DependOnCustomerQuery + DependOnCustomerModifier
{
    async fn register_customer(
        &self,
        dto: CreateCustomerDto,
    ) -> error_stack::Result<CustomerDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let email = CustomerEmail::new(dto.email);
        if self
            .customer_query()
            .find_by_email(&mut connection, &email)
            .await?
            .is_some()
        {
            return Err(Report::new(KernelError::AlreadyExists)
                .attach_printable(format!("email {} is already registered", email.as_ref())));
        }

        let customer = Customer::new(
            CustomerId::new(Uuid::new_v4()),
            CustomerName::new(dto.name),
            email,
            CustomerPhone::new(dto.phone),
        );
        self.customer_modifier()
            .create(&mut connection, &customer)
            .await?;
        connection.commit().await?;

        Ok(CustomerDto::from(customer))
    }
}

impl<T> RegisterCustomerService for T where T: DependOnCustomerQuery + DependOnCustomerModifier {}

#[async_trait::async_trait]
pub trait GetCustomerService: 'static + Sync + Send + DependOnCustomerQuery {
    async fn get_all_customers(&self) -> error_stack::Result<Vec<CustomerDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let customers = self.customer_query().find_all(&mut connection).await?;
        Ok(customers.into_iter().map(CustomerDto::from).collect())
    }

    async fn get_customer(
        &self,
        dto: GetCustomerDto,
    ) -> error_stack::Result<CustomerDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let id = CustomerId::new(dto.id);
        let customer = self
            .customer_query()
            .find_by_id(&mut connection, &id)
            .await?
            .or_not_found("customer", id)?;
        Ok(CustomerDto::from(customer))
    }
}

impl<T> GetCustomerService for T where T: DependOnCustomerQuery {}

#[cfg(test)]
mod test {
    use driver::database::MemoryDatabase;
    use kernel::KernelError;
    use uuid::Uuid;

    use crate::service::{GetCustomerService, RegisterCustomerService};
    use crate::transfer::{CreateCustomerDto, GetCustomerDto};

    fn create(email: &str) -> CreateCustomerDto {
        CreateCustomerDto {
            name: "Jane Doe".to_string(),
            email: email.to_string(),
            phone: "555-0100".to_string(),
        }
    }

    #[tokio::test]
    async fn register_and_get() -> error_stack::Result<(), KernelError> {
        let db = MemoryDatabase::new();
        let jane = db.register_customer(create("jane@example.com")).await?;
        let john = db.register_customer(create("john@example.com")).await?;
        assert_eq!(jane.email, "jane@example.com");

        let found = db.get_customer(GetCustomerDto { id: john.id }).await?;
        assert_eq!(found, john);
        let all = db.get_all_customers().await?;
        assert_eq!(all, vec![jane, john]);
        Ok(())
    }

    #[tokio::test]
    async fn reject_duplicate_email() {
        let db = MemoryDatabase::new();
        db.register_customer(create("jane@example.com"))
            .await
            .unwrap();
        let error = db
            .register_customer(create("jane@example.com"))
            .await
            .unwrap_err();
        assert_eq!(error.current_context(), &KernelError::AlreadyExists);
        assert_eq!(db.get_all_customers().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_customer() {
        let db = MemoryDatabase::new();
        let error = db
            .get_customer(GetCustomerDto { id: Uuid::new_v4() })
            .await
            .unwrap_err();
        assert_eq!(error.current_context(), &KernelError::NotFound);
    }
}
