use error_stack::Report;
use uuid::Uuid;

use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use kernel::interface::query::{CarOwnerQuery, CarQuery, DependOnCarOwnerQuery, DependOnCarQuery};
use kernel::interface::update::{CarModifier, DependOnCarModifier};
use kernel::prelude::entity::{
    Car, CarColor, CarId, CarMake, CarModel, CarOwnerId, CarStatus,
};
use kernel::KernelError;

use crate::service::OrNotFound;
use crate::transfer::{
    CarDto, CreateCarDto, CreateOwnerCarDto, GetCarDto, GetOwnedCarDto, UpdateCarStatusDto,
};

fn initial_status(status: Option<CarStatus>) -> error_stack::Result<CarStatus, KernelError> {
    match status.unwrap_or_default() {
        CarStatus::OnLease => Err(Report::new(KernelError::Validation)
            .attach_printable("a car cannot be registered as ON_LEASE")),
        status => Ok(status),
    }
}

#[async_trait::async_trait]
pub trait RegisterCarService:
    'static + Sync + Send + DependOnCarModifier + DependOnCarOwnerQuery
{
    async fn register_car(&self, dto: CreateCarDto) -> error_stack::Result<CarDto, KernelError> {
        let status = initial_status(dto.status)?;
        let mut connection = self.database_connection().transact().await?;

        let car = Car::new(
            CarId::new(Uuid::new_v4()),
            CarModel::new(dto.model),
            CarMake::new(dto.make),
            CarColor::new(dto.color),
            status,
            None,
        );
        self.car_modifier().create(&mut connection, &car).await?;
        connection.commit().await?;

        Ok(CarDto::from(car))
    }

    async fn register_owner_car(
        &self,
        dto: CreateOwnerCarDto,
    ) -> error_stack::Result<CarDto, KernelError> {
        let status = initial_status(dto.status)?;
        let mut connection = self.database_connection().transact().await?;

        let owner_id = CarOwnerId::new(dto.owner_id);
        if !self
            .car_owner_query()
            .exists_by_id(&mut connection, &owner_id)
            .await?
        {
            return Err(Report::new(KernelError::NotFound)
                .attach_printable(format!("car owner {owner_id} not found")));
        }

        let car = Car::new(
            CarId::new(Uuid::new_v4()),
            CarModel::new(dto.model),
            CarMake::new(dto.make),
            CarColor::new(dto.color),
            status,
            Some(owner_id),
        );
        self.car_modifier().create(&mut connection, &car).await?;
        connection.commit().await?;

        Ok(CarDto::from(car))
    }
}

impl<T> RegisterCarService for T where T: DependOnCarModifier + DependOnCarOwnerQuery {}

#[async_trait::async_trait]
pub trait UpdateCarStatusService:
    'static + Sync + Send + DependOnCarQuery + DependOnCarModifier
{
    async fn update_car_status(
        &self,
        dto: UpdateCarStatusDto,
    ) -> error_stack::Result<CarDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let id = CarId::new(dto.id);
        let mut car = self
            .car_query()
            .find_by_id_for_update(&mut connection, &id)
            .await?
            .or_not_found("car", id)?;
        car.change_status(dto.status)?;

        self.car_modifier().update(&mut connection, &car).await?;
        connection.commit().await?;

        Ok(CarDto::from(car))
    }
}

impl<T> UpdateCarStatusService for T where T: DependOnCarQuery + DependOnCarModifier {}

#[async_trait::async_trait]
pub trait GetCarService: 'static + Sync + Send + DependOnCarQuery + DependOnCarOwnerQuery {
    async fn get_available_cars(&self) -> error_stack::Result<Vec<CarDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let cars = self
            .car_query()
            .find_by_status(&mut connection, &CarStatus::Idle)
            .await?;
        Ok(cars.into_iter().map(CarDto::from).collect())
    }

    async fn get_all_cars(&self) -> error_stack::Result<Vec<CarDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let cars = self.car_query().find_all(&mut connection).await?;
        Ok(cars.into_iter().map(CarDto::from).collect())
    }

    async fn get_car_status(&self, dto: GetCarDto) -> error_stack::Result<CarDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let id = CarId::new(dto.id);
        let car = self
            .car_query()
            .find_by_id(&mut connection, &id)
            .await?
            .or_not_found("car", id)?;
        Ok(CarDto::from(car))
    }

    /// Same as [`GetCarService::get_car_status`], scoped to cars enrolled by `owner_id`.
    async fn get_owned_car_status(
        &self,
        dto: GetOwnedCarDto,
    ) -> error_stack::Result<CarDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let owner_id = CarOwnerId::new(dto.owner_id);
        self.car_owner_query()
            .find_by_id(&mut connection, &owner_id)
            .await?
            .or_not_found("car owner", owner_id)?;

        let car_id = CarId::new(dto.car_id);
        let car = self
            .car_query()
            .find_by_id_and_owner(&mut connection, &car_id, &owner_id)
            .await?
            .or_not_found("owned car", car_id)?;
        Ok(CarDto::from(car))
    }
}

impl<T> GetCarService for T where T: DependOnCarQuery + DependOnCarOwnerQuery {}
