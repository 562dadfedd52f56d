use error_stack::Report;
use sqlx::PgConnection;
use uuid::Uuid;

use kernel::interface::query::CarQuery;
use kernel::interface::update::CarModifier;
use kernel::prelude::entity::{Car, CarColor, CarId, CarMake, CarModel, CarOwnerId, CarStatus};
use kernel::KernelError;

use crate::database::postgres::PostgresTransaction;
use crate::error::ConvertError;

pub struct PostgresCarRepository;

#[async_trait::async_trait]
impl CarQuery for PostgresCarRepository {
    type Transaction = PostgresTransaction;

    async fn find_by_id(
        &self,
        con: &mut PostgresTransaction,
        id: &CarId,
    ) -> error_stack::Result<Option<Car>, KernelError> {
        PgCarInternal::find_by_id(con, id).await
    }

    async fn find_by_id_for_update(
        &self,
        con: &mut PostgresTransaction,
        id: &CarId,
    ) -> error_stack::Result<Option<Car>, KernelError> {
        PgCarInternal::find_by_id_for_update(con, id).await
    }

    async fn find_by_id_and_owner(
        &self,
        con: &mut PostgresTransaction,
        id: &CarId,
        owner_id: &CarOwnerId,
    ) -> error_stack::Result<Option<Car>, KernelError> {
        PgCarInternal::find_by_id_and_owner(con, id, owner_id).await
    }

    async fn find_all(
        &self,
        con: &mut PostgresTransaction,
    ) -> error_stack::Result<Vec<Car>, KernelError> {
        PgCarInternal::find_all(con).await
    }

    async fn find_by_status(
        &self,
        con: &mut PostgresTransaction,
        status: &CarStatus,
    ) -> error_stack::Result<Vec<Car>, KernelError> {
        PgCarInternal::find_by_status(con, status).await
    }
}

#[async_trait::async_trait]
impl CarModifier for PostgresCarRepository {
    type Transaction = PostgresTransaction;

    async fn create(
        &self,
        con: &mut PostgresTransaction,
        car: &Car,
    ) -> error_stack::Result<(), KernelError> {
        PgCarInternal::create(con, car).await
    }

    async fn update(
        &self,
        con: &mut PostgresTransaction,
        car: &Car,
    ) -> error_stack::Result<(), KernelError> {
        PgCarInternal::update(con, car).await
    }
}

#[derive(sqlx::FromRow)]
struct CarRow {
    id: Uuid,
    model: String,
    make: String,
    color: String,
    status: String,
    owner_id: Option<Uuid>,
}

impl TryFrom<CarRow> for Car {
    type Error = Report<KernelError>;
    fn try_from(value: CarRow) -> Result<Self, Self::Error> {
        let status = value
            .status
            .parse::<CarStatus>()
            .map_err(|report| report.change_context(KernelError::Internal))?;
        Ok(Car::new(
            CarId::new(value.id),
            CarModel::new(value.model),
            CarMake::new(value.make),
            CarColor::new(value.color),
            status,
            value.owner_id.map(CarOwnerId::new),
        ))
    }
}

fn into_cars(rows: Vec<CarRow>) -> error_stack::Result<Vec<Car>, KernelError> {
    rows.into_iter().map(Car::try_from).collect()
}

pub(in crate::database) struct PgCarInternal;

impl PgCarInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &CarId,
    ) -> error_stack::Result<Option<Car>, KernelError> {
        let row = sqlx::query_as::<_, CarRow>(
            // language=postgresql
            r#"
            SELECT id, model, make, color, status, owner_id
            FROM cars
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        row.map(Car::try_from).transpose()
    }

    async fn find_by_id_for_update(
        con: &mut PgConnection,
        id: &CarId,
    ) -> error_stack::Result<Option<Car>, KernelError> {
        let row = sqlx::query_as::<_, CarRow>(
            // language=postgresql
            r#"
            SELECT id, model, make, color, status, owner_id
            FROM cars
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        row.map(Car::try_from).transpose()
    }

    async fn find_by_id_and_owner(
        con: &mut PgConnection,
        id: &CarId,
        owner_id: &CarOwnerId,
    ) -> error_stack::Result<Option<Car>, KernelError> {
        let row = sqlx::query_as::<_, CarRow>(
            // language=postgresql
            r#"
            SELECT id, model, make, color, status, owner_id
            FROM cars
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id.as_ref())
        .bind(owner_id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        row.map(Car::try_from).transpose()
    }

    async fn find_all(con: &mut PgConnection) -> error_stack::Result<Vec<Car>, KernelError> {
        let rows = sqlx::query_as::<_, CarRow>(
            // language=postgresql
            r#"
            SELECT id, model, make, color, status, owner_id
            FROM cars
            ORDER BY seq
            "#,
        )
        .fetch_all(con)
        .await
        .convert_error()?;
        into_cars(rows)
    }

    async fn find_by_status(
        con: &mut PgConnection,
        status: &CarStatus,
    ) -> error_stack::Result<Vec<Car>, KernelError> {
        let rows = sqlx::query_as::<_, CarRow>(
            // language=postgresql
            r#"
            SELECT id, model, make, color, status, owner_id
            FROM cars
            WHERE status = $1
            ORDER BY seq
            "#,
        )
        .bind(status.as_str())
        .fetch_all(con)
        .await
        .convert_error()?;
        into_cars(rows)
    }

    async fn create(con: &mut PgConnection, car: &Car) -> error_stack::Result<(), KernelError> {
        // language=postgresql
        sqlx::query(
            r#"
            INSERT INTO cars (id, model, make, color, status, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(car.id().as_ref())
        .bind(car.model().as_ref())
        .bind(car.make().as_ref())
        .bind(car.color().as_ref())
        .bind(car.status().as_str())
        .bind(car.owner_id().map(Uuid::from))
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }

    async fn update(con: &mut PgConnection, car: &Car) -> error_stack::Result<(), KernelError> {
        // language=postgresql
        let result = sqlx::query(
            r#"
            UPDATE cars
            SET model = $2, make = $3, color = $4, status = $5, owner_id = $6
            WHERE id = $1
            "#,
        )
        .bind(car.id().as_ref())
        .bind(car.model().as_ref())
        .bind(car.make().as_ref())
        .bind(car.color().as_ref())
        .bind(car.status().as_str())
        .bind(car.owner_id().map(Uuid::from))
        .execute(con)
        .await
        .convert_error()?;
        if result.rows_affected() == 0 {
            return Err(Report::new(KernelError::NotFound)
                .attach_printable(format!("car {} does not exist", car.id())));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use uuid::Uuid;

    use kernel::interface::database::{DatabaseConnection, Transaction};
    use kernel::interface::query::CarQuery;
    use kernel::interface::update::CarModifier;
    use kernel::prelude::entity::{Car, CarColor, CarId, CarMake, CarModel, CarStatus};
    use kernel::KernelError;

    use crate::database::postgres::{PostgresCarRepository, PostgresDatabase};

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn test() -> error_stack::Result<(), KernelError> {
        crate::init_tracing();
        let db = PostgresDatabase::new().await?;
        db.migrate().await?;
        let mut con = db.transact().await?;

        let id = CarId::new(Uuid::new_v4());
        let mut car = Car::new(
            id,
            CarModel::new("Civic"),
            CarMake::new("Honda"),
            CarColor::new("Red"),
            CarStatus::Idle,
            None,
        );
        PostgresCarRepository.create(&mut con, &car).await?;

        let found = PostgresCarRepository.find_by_id(&mut con, &id).await?;
        assert_eq!(found, Some(car.clone()));

        car.change_status(CarStatus::OnService)?;
        PostgresCarRepository.update(&mut con, &car).await?;

        let found = PostgresCarRepository.find_by_id(&mut con, &id).await?;
        assert_eq!(found, Some(car.clone()));

        let idle = PostgresCarRepository
            .find_by_status(&mut con, &CarStatus::Idle)
            .await?;
        assert!(idle.iter().all(|car| car.id() != &id));

        Ok(())
    }

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn plain_read_ignores_row_lock() -> error_stack::Result<(), KernelError> {
        crate::init_tracing();
        let db = PostgresDatabase::new().await?;
        db.migrate().await?;

        let id = CarId::new(Uuid::new_v4());
        let car = Car::new(
            id,
            CarModel::new("Leaf"),
            CarMake::new("Nissan"),
            CarColor::new("Green"),
            CarStatus::Idle,
            None,
        );
        let mut con = db.transact().await?;
        PostgresCarRepository.create(&mut con, &car).await?;
        con.commit().await?;

        let mut writer = db.transact().await?;
        let mut locked = PostgresCarRepository
            .find_by_id_for_update(&mut writer, &id)
            .await?
            .unwrap();
        locked.change_status(CarStatus::OnService)?;
        PostgresCarRepository.update(&mut writer, &locked).await?;

        let mut reader = db.transact().await?;
        let read = tokio::time::timeout(
            Duration::from_secs(2),
            PostgresCarRepository.find_by_id(&mut reader, &id),
        )
        .await
        .expect("read waited on the writer's row lock")?;
        assert_eq!(read, Some(car.clone()));

        writer.commit().await?;
        let read = PostgresCarRepository.find_by_id(&mut reader, &id).await?;
        assert_eq!(read, Some(car));
        reader.commit().await?;

        Ok(())
    }
}
