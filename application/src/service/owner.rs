use uuid::Uuid;

use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use kernel::interface::update::{CarOwnerModifier, DependOnCarOwnerModifier};
use kernel::prelude::entity::{CarOwner, CarOwnerEmail, CarOwnerId, CarOwnerName};
use kernel::KernelError;

use crate::transfer::{CarOwnerDto, CreateCarOwnerDto};

#[async_trait::async_trait]
pub trait RegisterCarOwnerService: 'static + Sync + Send + DependOnCarOwnerModifier {
    async fn register_owner(
        &self,
        dto: CreateCarOwnerDto,
    ) -> error_stack::Result<CarOwnerDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let owner = CarOwner::new(
            CarOwnerId::new(Uuid::new_v4()),
            CarOwnerName::new(dto.name),
            CarOwnerEmail::new(dto.email),
        );
        self.car_owner_modifier()
            .create(&mut connection, &owner)
            .await?;
        connection.commit().await?;

        Ok(CarOwnerDto::from(owner))
    }
}

impl<T> RegisterCarOwnerService for T where T: DependOnCarOwnerModifier {}
