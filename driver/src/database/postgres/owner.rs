use sqlx::PgConnection;
use uuid::Uuid;

use kernel::interface::query::CarOwnerQuery;
use kernel::interface::update::CarOwnerModifier;
use kernel::prelude::entity::{CarOwner, CarOwnerEmail, CarOwnerId, CarOwnerName};
use kernel::KernelError;

use crate::database::postgres::PostgresTransaction;
use crate::error::ConvertError;

pub struct PostgresCarOwnerRepository;

#[async_trait::async_trait]
impl CarOwnerQuery for PostgresCarOwnerRepository {
    type Transaction = PostgresTransaction;

    async fn find_by_id(
        &self,
        con: &mut PostgresTransaction,
        id: &CarOwnerId,
    ) -> error_stack::Result<Option<CarOwner>, KernelError> {
        PgCarOwnerInternal::find_by_id(con, id).await
    }

    async fn exists_by_id(
        &self,
        con: &mut PostgresTransaction,
        id: &CarOwnerId,
    ) -> error_stack::Result<bool, KernelError> {
        PgCarOwnerInternal::exists_by_id(con, id).await
    }
}

#[async_trait::async_trait]
impl CarOwnerModifier for PostgresCarOwnerRepository {
    type Transaction = PostgresTransaction;

    async fn create(
        &self,
        con: &mut PostgresTransaction,
        owner: &CarOwner,
    ) -> error_stack::Result<(), KernelError> {
        PgCarOwnerInternal::create(con, owner).await
    }
}

#[derive(sqlx::FromRow)]
struct CarOwnerRow {
    id: Uuid,
    name: String,
    email: String,
}

impl From<CarOwnerRow> for CarOwner {
    fn from(value: CarOwnerRow) -> Self {
        CarOwner::new(
            CarOwnerId::new(value.id),
            CarOwnerName::new(value.name),
            CarOwnerEmail::new(value.email),
        )
    }
}

pub(in crate::database) struct PgCarOwnerInternal;

impl PgCarOwnerInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &CarOwnerId,
    ) -> error_stack::Result<Option<CarOwner>, KernelError> {
        let row = sqlx::query_as::<_, CarOwnerRow>(
            // language=postgresql
            r#"
            SELECT id, name, email
            FROM car_owners
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(CarOwner::from))
    }

    async fn exists_by_id(
        con: &mut PgConnection,
        id: &CarOwnerId,
    ) -> error_stack::Result<bool, KernelError> {
        // language=postgresql
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM car_owners WHERE id = $1)
            "#,
        )
        .bind(id.as_ref())
        .fetch_one(con)
        .await
        .convert_error()?;
        Ok(exists)
    }

    async fn create(
        con: &mut PgConnection,
        owner: &CarOwner,
    ) -> error_stack::Result<(), KernelError> {
        // language=postgresql
        sqlx::query(
            r#"
            INSERT INTO car_owners (id, name, email)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(owner.id().as_ref())
        .bind(owner.name().as_ref())
        .bind(owner.email().as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use uuid::Uuid;

    use kernel::interface::database::DatabaseConnection;
    use kernel::interface::query::CarOwnerQuery;
    use kernel::interface::update::CarOwnerModifier;
    use kernel::prelude::entity::{CarOwner, CarOwnerEmail, CarOwnerId, CarOwnerName};
    use kernel::KernelError;

    use crate::database::postgres::{PostgresCarOwnerRepository, PostgresDatabase};

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn test() -> error_stack::Result<(), KernelError> {
        let db = PostgresDatabase::new().await?;
        db.migrate().await?;
        let mut con = db.transact().await?;

        let id = CarOwnerId::new(Uuid::new_v4());
        assert!(!PostgresCarOwnerRepository.exists_by_id(&mut con, &id).await?);

        let owner = CarOwner::new(
            id,
            CarOwnerName::new("Fleet Ltd"),
            CarOwnerEmail::new("fleet@example.com"),
        );
        PostgresCarOwnerRepository.create(&mut con, &owner).await?;

        assert!(PostgresCarOwnerRepository.exists_by_id(&mut con, &id).await?);
        let found = PostgresCarOwnerRepository.find_by_id(&mut con, &id).await?;
        assert_eq!(found, Some(owner));

        Ok(())
    }
}
