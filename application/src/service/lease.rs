use error_stack::Report;
use uuid::Uuid;

use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use kernel::interface::query::{
    CarOwnerQuery, CarQuery, CustomerQuery, DependOnCarOwnerQuery, DependOnCarQuery,
    DependOnCustomerQuery, DependOnLeaseQuery, LeaseQuery,
};
use kernel::interface::update::{
    CarModifier, DependOnCarModifier, DependOnLeaseModifier, LeaseModifier,
};
use kernel::prelude::entity::{
    CarId, CarOwnerId, CustomerId, Lease, LeaseEndDate, LeaseId, LeaseStartDate,
};
use kernel::KernelError;

use crate::service::OrNotFound;
use crate::transfer::{
    EndCustomerLeaseDto, EndLeaseDto, GetLeaseFromCarIdDto, GetLeaseFromCustomerIdDto,
    GetLeaseFromOwnerIdDto, LeaseDto, StartLeaseDto,
};

#[async_trait::async_trait]
pub trait StartLeaseService:
    'static
    + Sync
    + Send
    + DependOnCustomerQuery
    + DependOnCarQuery
    + DependOnLeaseQuery
    + DependOnCarModifier
    + DependOnLeaseModifier
{
    /// Checks, in order: the customer exists, the car exists, the car is idle and the
    /// customer is below the active lease limit. Nothing is written unless all hold.
    async fn start_lease(&self, dto: StartLeaseDto) -> error_stack::Result<LeaseDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let customer_id = CustomerId::new(dto.customer_id);
        let car_id = CarId::new(dto.car_id);
        let lease = Lease::start(
            LeaseId::new(Uuid::new_v4()),
            customer_id,
            car_id,
            LeaseStartDate::new(dto.start_date),
            dto.end_date.map(LeaseEndDate::new),
        )?;

        self.customer_query()
            .find_by_id_for_update(&mut connection, &customer_id)
            .await?
            .or_not_found("customer", customer_id)?;
        let mut car = self
            .car_query()
            .find_by_id_for_update(&mut connection, &car_id)
            .await?
            .or_not_found("car", car_id)?;
        car.lease()?;

        let active = self
            .lease_query()
            .count_active_by_customer(&mut connection, &customer_id)
            .await?;
        if active.reached_limit() {
            return Err(Report::new(KernelError::LimitExceeded).attach_printable(format!(
                "customer {customer_id} already holds {} active leases",
                active.as_ref()
            )));
        }

        self.car_modifier().update(&mut connection, &car).await?;
        self.lease_modifier()
            .create(&mut connection, &lease)
            .await?;
        connection.commit().await?;

        Ok(LeaseDto::from(lease))
    }
}

impl<T> StartLeaseService for T where
    T: DependOnCustomerQuery
        + DependOnCarQuery
        + DependOnLeaseQuery
        + DependOnCarModifier
        + DependOnLeaseModifier
{
}

#[async_trait::async_trait]
pub trait EndLeaseService:
    'static
    + Sync
    + Send
    + DependOnLeaseQuery
    + DependOnCarQuery
    + DependOnLeaseModifier
    + DependOnCarModifier
{
    /// Administrative path: ends any active lease by id.
    async fn end_lease(&self, dto: EndLeaseDto) -> error_stack::Result<LeaseDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let lease_id = LeaseId::new(dto.lease_id);
        let mut lease = self
            .lease_query()
            .find_by_id_for_update(&mut connection, &lease_id)
            .await?
            .filter(Lease::is_active)
            .or_not_found("active lease", lease_id)?;
        let mut car = self
            .car_query()
            .find_by_id_for_update(&mut connection, lease.car_id())
            .await?
            .or_not_found("car", lease.car_id())?;

        lease.end()?;
        car.release();

        self.lease_modifier()
            .update(&mut connection, &lease)
            .await?;
        self.car_modifier().update(&mut connection, &car).await?;
        connection.commit().await?;

        Ok(LeaseDto::from(lease))
    }
}

impl<T> EndLeaseService for T where
    T: DependOnLeaseQuery + DependOnCarQuery + DependOnLeaseModifier + DependOnCarModifier
{
}

#[async_trait::async_trait]
pub trait EndCustomerLeaseService:
    'static
    + Sync
    + Send
    + DependOnLeaseQuery
    + DependOnCarQuery
    + DependOnLeaseModifier
    + DependOnCarModifier
{
    /// Customer path: the lease must be active and belong to the requesting customer.
    async fn end_customer_lease(
        &self,
        dto: EndCustomerLeaseDto,
    ) -> error_stack::Result<LeaseDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let lease_id = LeaseId::new(dto.lease_id);
        let customer_id = CustomerId::new(dto.customer_id);
        let mut lease = self
            .lease_query()
            .find_active_by_id_and_customer(&mut connection, &lease_id, &customer_id)
            .await?
            .ok_or_else(|| {
                Report::new(KernelError::NotFound).attach_printable(format!(
                    "no active lease {lease_id} for customer {customer_id}"
                ))
            })?;
        let mut car = self
            .car_query()
            .find_by_id_for_update(&mut connection, lease.car_id())
            .await?
            .or_not_found("car", lease.car_id())?;

        lease.end()?;
        car.release();

        self.lease_modifier()
            .update(&mut connection, &lease)
            .await?;
        self.car_modifier().update(&mut connection, &car).await?;
        connection.commit().await?;

        Ok(LeaseDto::from(lease))
    }
}

impl<T> EndCustomerLeaseService for T where
    T: DependOnLeaseQuery + DependOnCarQuery + DependOnLeaseModifier + DependOnCarModifier
{
}

#[async_trait::async_trait]
pub trait GetLeaseHistoryService:
    'static
    + Sync
    + Send
    + DependOnLeaseQuery
    + DependOnCustomerQuery
    + DependOnCarQuery
    + DependOnCarOwnerQuery
{
    async fn get_customer_history(
        &self,
        dto: GetLeaseFromCustomerIdDto,
    ) -> error_stack::Result<Vec<LeaseDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let customer_id = CustomerId::new(dto.customer_id);
        self.customer_query()
            .find_by_id(&mut connection, &customer_id)
            .await?
            .or_not_found("customer", customer_id)?;

        let leases = self
            .lease_query()
            .find_by_customer_id(&mut connection, &customer_id)
            .await?;
        Ok(leases.into_iter().map(LeaseDto::from).collect())
    }

    async fn get_car_history(
        &self,
        dto: GetLeaseFromCarIdDto,
    ) -> error_stack::Result<Vec<LeaseDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let car_id = CarId::new(dto.car_id);
        self.car_query()
            .find_by_id(&mut connection, &car_id)
            .await?
            .or_not_found("car", car_id)?;

        let leases = self
            .lease_query()
            .find_by_car_id(&mut connection, &car_id)
            .await?;
        Ok(leases.into_iter().map(LeaseDto::from).collect())
    }

    async fn get_owner_history(
        &self,
        dto: GetLeaseFromOwnerIdDto,
    ) -> error_stack::Result<Vec<LeaseDto>, KernelError> {
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

        let leases = self
            .lease_query()
            .find_by_owner_id(&mut connection, &owner_id)
            .await?;
        Ok(leases.into_iter().map(LeaseDto::from).collect())
    }
}

impl<T> GetLeaseHistoryService for T where
    T: DependOnLeaseQuery + DependOnCustomerQuery + DependOnCarQuery + DependOnCarOwnerQuery
{
}

#[cfg(test)]
mod test {
    use driver::database::{MemoryDatabase, PostgresDatabase};
    use kernel::prelude::entity::CarStatus;
    use kernel::KernelError;
    use time::macros::date;
    use uuid::Uuid;

    use crate::service::{
        EndCustomerLeaseService, EndLeaseService, GetCarService, GetLeaseHistoryService,
        RegisterCarOwnerService, RegisterCarService, RegisterCustomerService,
        StartLeaseService, UpdateCarStatusService,
    };
    use crate::transfer::{
        CreateCarDto, CreateCarOwnerDto, CreateCustomerDto, CreateOwnerCarDto, EndCustomerLeaseDto,
        EndLeaseDto, GetCarDto, GetLeaseFromCarIdDto, GetLeaseFromCustomerIdDto,
        GetLeaseFromOwnerIdDto, StartLeaseDto, UpdateCarStatusDto,
    };

    async fn customer(db: &impl RegisterCustomerService) -> Uuid {
        let email = format!("{}@example.com", Uuid::new_v4());
        db.register_customer(CreateCustomerDto {
            name: "Customer".to_string(),
            email,
            phone: "555-0100".to_string(),
        })
        .await
        .unwrap()
        .id
    }

    async fn car(db: &impl RegisterCarService) -> Uuid {
        db.register_car(CreateCarDto {
            model: "Corolla".to_string(),
            make: "Toyota".to_string(),
            color: "White".to_string(),
            status: None,
        })
        .await
        .unwrap()
        .id
    }

    fn start(customer_id: Uuid, car_id: Uuid) -> StartLeaseDto {
        StartLeaseDto {
            customer_id,
            car_id,
            start_date: date!(2024 - 01 - 01),
            end_date: Some(date!(2024 - 12 - 31)),
        }
    }

    async fn status(db: &impl GetCarService, car_id: Uuid) -> CarStatus {
        db.get_car_status(GetCarDto { id: car_id })
            .await
            .unwrap()
            .status
    }

    /// A car is ON_LEASE exactly when one active lease references it.
    async fn assert_lease_invariant(db: &MemoryDatabase) {
        for car in db.get_all_cars().await.unwrap() {
            let active = db
                .get_car_history(GetLeaseFromCarIdDto { car_id: car.id })
                .await
                .unwrap()
                .into_iter()
                .filter(|lease| lease.active)
                .count();
            match car.status {
                CarStatus::OnLease => assert_eq!(active, 1, "car {}", car.id),
                _ => assert_eq!(active, 0, "car {}", car.id),
            }
        }
    }

    #[tokio::test]
    async fn lease_end_and_lease_again() {
        let db = MemoryDatabase::new();
        let c1 = customer(&db).await;
        let a = car(&db).await;

        let l1 = db.start_lease(start(c1, a)).await.unwrap();
        assert!(l1.active);
        assert_eq!(status(&db, a).await, CarStatus::OnLease);
        assert_lease_invariant(&db).await;

        let error = db.start_lease(start(c1, a)).await.unwrap_err();
        assert_eq!(error.current_context(), &KernelError::StateConflict);

        let ended = db
            .end_customer_lease(EndCustomerLeaseDto {
                lease_id: l1.id,
                customer_id: c1,
            })
            .await
            .unwrap();
        assert!(!ended.active);
        assert_eq!(status(&db, a).await, CarStatus::Idle);
        assert_lease_invariant(&db).await;

        let l2 = db.start_lease(start(c1, a)).await.unwrap();
        assert_ne!(l1.id, l2.id);

        let history = db
            .get_customer_history(GetLeaseFromCustomerIdDto { customer_id: c1 })
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, l1.id);
        assert!(!history[0].active);
        assert_eq!(history[1].id, l2.id);
        assert!(history[1].active);
        assert_lease_invariant(&db).await;
    }

    #[tokio::test]
    async fn third_lease_exceeds_limit() {
        let db = MemoryDatabase::new();
        let c2 = customer(&db).await;
        let cars = [car(&db).await, car(&db).await, car(&db).await];

        let first = db.start_lease(start(c2, cars[0])).await.unwrap();
        db.start_lease(start(c2, cars[1])).await.unwrap();

        let error = db.start_lease(start(c2, cars[2])).await.unwrap_err();
        assert_eq!(error.current_context(), &KernelError::LimitExceeded);
        assert_eq!(status(&db, cars[2]).await, CarStatus::Idle);
        let history = db
            .get_customer_history(GetLeaseFromCustomerIdDto { customer_id: c2 })
            .await
            .unwrap();
        assert_eq!(history.len(), 2);

        db.end_lease(EndLeaseDto { lease_id: first.id })
            .await
            .unwrap();
        db.start_lease(start(c2, cars[2])).await.unwrap();
        assert_eq!(status(&db, cars[2]).await, CarStatus::OnLease);
        assert_lease_invariant(&db).await;
    }

    #[tokio::test]
    async fn reject_car_on_service() {
        let db = MemoryDatabase::new();
        let c = customer(&db).await;
        let a = car(&db).await;
        db.update_car_status(UpdateCarStatusDto {
            id: a,
            status: CarStatus::OnService,
        })
        .await
        .unwrap();

        let error = db.start_lease(start(c, a)).await.unwrap_err();
        assert_eq!(error.current_context(), &KernelError::StateConflict);
        assert_eq!(status(&db, a).await, CarStatus::OnService);
        let history = db
            .get_car_history(GetLeaseFromCarIdDto { car_id: a })
            .await
            .unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn missing_entities() {
        let db = MemoryDatabase::new();
        let c = customer(&db).await;
        let a = car(&db).await;

        let error = db.start_lease(start(Uuid::new_v4(), a)).await.unwrap_err();
        assert_eq!(error.current_context(), &KernelError::NotFound);
        let error = db.start_lease(start(c, Uuid::new_v4())).await.unwrap_err();
        assert_eq!(error.current_context(), &KernelError::NotFound);
        let error = db
            .end_lease(EndLeaseDto {
                lease_id: Uuid::new_v4(),
            })
            .await
            .unwrap_err();
        assert_eq!(error.current_context(), &KernelError::NotFound);
        assert_eq!(status(&db, a).await, CarStatus::Idle);
    }

    #[tokio::test]
    async fn reject_end_before_start() {
        let db = MemoryDatabase::new();
        let c = customer(&db).await;
        let a = car(&db).await;

        let error = db
            .start_lease(StartLeaseDto {
                customer_id: c,
                car_id: a,
                start_date: date!(2024 - 05 - 01),
                end_date: Some(date!(2024 - 04 - 01)),
            })
            .await
            .unwrap_err();
        assert_eq!(error.current_context(), &KernelError::Validation);
        assert_eq!(status(&db, a).await, CarStatus::Idle);
    }

    #[tokio::test]
    async fn end_twice() {
        let db = MemoryDatabase::new();
        let c = customer(&db).await;
        let a = car(&db).await;
        let lease = db.start_lease(start(c, a)).await.unwrap();

        db.end_lease(EndLeaseDto { lease_id: lease.id })
            .await
            .unwrap();
        assert_eq!(status(&db, a).await, CarStatus::Idle);

        let error = db
            .end_lease(EndLeaseDto { lease_id: lease.id })
            .await
            .unwrap_err();
        assert_eq!(error.current_context(), &KernelError::NotFound);
        let error = db
            .end_customer_lease(EndCustomerLeaseDto {
                lease_id: lease.id,
                customer_id: c,
            })
            .await
            .unwrap_err();
        assert_eq!(error.current_context(), &KernelError::NotFound);
        assert_eq!(status(&db, a).await, CarStatus::Idle);
    }

    #[tokio::test]
    async fn customer_can_only_end_own_lease() {
        let db = MemoryDatabase::new();
        let holder = customer(&db).await;
        let other = customer(&db).await;
        let a = car(&db).await;
        let lease = db.start_lease(start(holder, a)).await.unwrap();

        let error = db
            .end_customer_lease(EndCustomerLeaseDto {
                lease_id: lease.id,
                customer_id: other,
            })
            .await
            .unwrap_err();
        assert_eq!(error.current_context(), &KernelError::NotFound);
        assert_eq!(status(&db, a).await, CarStatus::OnLease);

        // the administrative path is not scoped to a customer
        db.end_lease(EndLeaseDto { lease_id: lease.id })
            .await
            .unwrap();
        assert_eq!(status(&db, a).await, CarStatus::Idle);
        assert_lease_invariant(&db).await;
    }

    #[tokio::test]
    async fn concurrent_leases_on_one_car() {
        let db = MemoryDatabase::new();
        let first = customer(&db).await;
        let second = customer(&db).await;
        let a = car(&db).await;

        let (left, right) = tokio::join!(
            db.start_lease(start(first, a)),
            db.start_lease(start(second, a))
        );
        let succeeded = [&left, &right].iter().filter(|r| r.is_ok()).count();
        assert_eq!(succeeded, 1);
        let error = left.err().or(right.err()).unwrap();
        assert_eq!(error.current_context(), &KernelError::StateConflict);
        assert_lease_invariant(&db).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_leases_respect_limit() {
        let db = MemoryDatabase::new();
        let c = customer(&db).await;
        let held = car(&db).await;
        db.start_lease(start(c, held)).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..4 {
            let db = db.clone();
            let target = car(&db).await;
            handles.push(tokio::spawn(
                async move { db.start_lease(start(c, target)).await },
            ));
        }
        let mut succeeded = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => succeeded += 1,
                Err(error) => {
                    assert_eq!(error.current_context(), &KernelError::LimitExceeded)
                }
            }
        }
        assert_eq!(succeeded, 1);
        assert_lease_invariant(&db).await;
    }

    #[tokio::test]
    async fn history_by_scope() {
        let db = MemoryDatabase::new();
        let owner = db
            .register_owner(CreateCarOwnerDto {
                name: "Fleet Ltd".to_string(),
                email: "fleet@example.com".to_string(),
            })
            .await
            .unwrap();
        let owned = db
            .register_owner_car(CreateOwnerCarDto {
                owner_id: owner.id,
                model: "Model 3".to_string(),
                make: "Tesla".to_string(),
                color: "Black".to_string(),
                status: None,
            })
            .await
            .unwrap();
        let unowned = car(&db).await;
        let c = customer(&db).await;

        let first = db.start_lease(start(c, owned.id)).await.unwrap();
        db.end_lease(EndLeaseDto { lease_id: first.id })
            .await
            .unwrap();
        let second = db.start_lease(start(c, owned.id)).await.unwrap();
        let other = db.start_lease(start(c, unowned)).await.unwrap();

        let by_owner = db
            .get_owner_history(GetLeaseFromOwnerIdDto { owner_id: owner.id })
            .await
            .unwrap();
        assert_eq!(
            by_owner.iter().map(|lease| lease.id).collect::<Vec<_>>(),
            vec![first.id, second.id]
        );
        let by_car = db
            .get_car_history(GetLeaseFromCarIdDto { car_id: unowned })
            .await
            .unwrap();
        assert_eq!(by_car, vec![other.clone()]);
        let by_customer = db
            .get_customer_history(GetLeaseFromCustomerIdDto { customer_id: c })
            .await
            .unwrap();
        assert_eq!(by_customer.len(), 3);

        let error = db
            .get_owner_history(GetLeaseFromOwnerIdDto {
                owner_id: Uuid::new_v4(),
            })
            .await
            .unwrap_err();
        assert_eq!(error.current_context(), &KernelError::NotFound);
        let error = db
            .get_car_history(GetLeaseFromCarIdDto {
                car_id: Uuid::new_v4(),
            })
            .await
            .unwrap_err();
        assert_eq!(error.current_context(), &KernelError::NotFound);
        let error = db
            .get_customer_history(GetLeaseFromCustomerIdDto {
                customer_id: Uuid::new_v4(),
            })
            .await
            .unwrap_err();
        assert_eq!(error.current_context(), &KernelError::NotFound);
    }

    fn lost_race(error: &KernelError, expected: KernelError) -> bool {
        error == &expected || error == &KernelError::Concurrency
    }

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn postgres_concurrent_leases_on_one_car() -> error_stack::Result<(), KernelError> {
        let db = PostgresDatabase::new().await?;
        db.migrate().await?;
        let a = car(&db).await;

        let mut handles = Vec::new();
        for _ in 0..2 {
            let db = db.clone();
            let c = customer(&db).await;
            handles.push(tokio::spawn(async move { db.start_lease(start(c, a)).await }));
        }
        let mut succeeded = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => succeeded += 1,
                Err(error) => assert!(
                    lost_race(error.current_context(), KernelError::StateConflict),
                    "{error:?}"
                ),
            }
        }
        assert_eq!(succeeded, 1);

        assert_eq!(status(&db, a).await, CarStatus::OnLease);
        let active = db
            .get_car_history(GetLeaseFromCarIdDto { car_id: a })
            .await?
            .into_iter()
            .filter(|lease| lease.active)
            .count();
        assert_eq!(active, 1);
        Ok(())
    }

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn postgres_lease_limit() -> error_stack::Result<(), KernelError> {
        let db = PostgresDatabase::new().await?;
        db.migrate().await?;
        let c = customer(&db).await;
        let held = car(&db).await;
        db.start_lease(start(c, held)).await?;

        let mut handles = Vec::new();
        for _ in 0..2 {
            let db = db.clone();
            let target = car(&db).await;
            handles.push(tokio::spawn(
                async move { db.start_lease(start(c, target)).await },
            ));
        }
        let mut succeeded = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => succeeded += 1,
                Err(error) => assert!(
                    lost_race(error.current_context(), KernelError::LimitExceeded),
                    "{error:?}"
                ),
            }
        }
        assert_eq!(succeeded, 1);

        let third = car(&db).await;
        let error = db.start_lease(start(c, third)).await.unwrap_err();
        assert_eq!(error.current_context(), &KernelError::LimitExceeded);
        assert_eq!(status(&db, third).await, CarStatus::Idle);

        let active = db
            .get_customer_history(GetLeaseFromCustomerIdDto { customer_id: c })
            .await?
            .into_iter()
            .filter(|lease| lease.active)
            .count();
        assert_eq!(active, 2);
        Ok(())
    }
}
