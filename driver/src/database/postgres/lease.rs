use error_stack::Report;
use sqlx::PgConnection;
use time::Date;
use uuid::Uuid;

use kernel::interface::query::LeaseQuery;
use kernel::interface::update::LeaseModifier;
use kernel::prelude::entity::{
    ActiveLeaseCount, CarId, CarOwnerId, CustomerId, IsActive, Lease, LeaseEndDate, LeaseId,
    LeaseStartDate,
};
use kernel::KernelError;

use crate::database::postgres::PostgresTransaction;
use crate::error::ConvertError;

pub struct PostgresLeaseRepository;

#[async_trait::async_trait]
impl LeaseQuery for PostgresLeaseRepository {
    type Transaction = PostgresTransaction;

    async fn find_by_id(
        &self,
        con: &mut PostgresTransaction,
        id: &LeaseId,
    ) -> error_stack::Result<Option<Lease>, KernelError> {
        PgLeaseInternal::find_by_id(con, id).await
    }

    async fn find_by_id_for_update(
        &self,
        con: &mut PostgresTransaction,
        id: &LeaseId,
    ) -> error_stack::Result<Option<Lease>, KernelError> {
        PgLeaseInternal::find_by_id_for_update(con, id).await
    }

    async fn find_active_by_id_and_customer(
        &self,
        con: &mut PostgresTransaction,
        id: &LeaseId,
        customer_id: &CustomerId,
    ) -> error_stack::Result<Option<Lease>, KernelError> {
        PgLeaseInternal::find_active_by_id_and_customer(con, id, customer_id).await
    }

    async fn count_active_by_customer(
        &self,
        con: &mut PostgresTransaction,
        customer_id: &CustomerId,
    ) -> error_stack::Result<ActiveLeaseCount, KernelError> {
        PgLeaseInternal::count_active_by_customer(con, customer_id).await
    }

    async fn find_by_customer_id(
        &self,
        con: &mut PostgresTransaction,
        customer_id: &CustomerId,
    ) -> error_stack::Result<Vec<Lease>, KernelError> {
        PgLeaseInternal::find_by_customer_id(con, customer_id).await
    }

    async fn find_by_car_id(
        &self,
        con: &mut PostgresTransaction,
        car_id: &CarId,
    ) -> error_stack::Result<Vec<Lease>, KernelError> {
        PgLeaseInternal::find_by_car_id(con, car_id).await
    }

    async fn find_by_owner_id(
        &self,
        con: &mut PostgresTransaction,
        owner_id: &CarOwnerId,
    ) -> error_stack::Result<Vec<Lease>, KernelError> {
        PgLeaseInternal::find_by_owner_id(con, owner_id).await
    }
}

#[async_trait::async_trait]
impl LeaseModifier for PostgresLeaseRepository {
    type Transaction = PostgresTransaction;

    async fn create(
        &self,
        con: &mut PostgresTransaction,
        lease: &Lease,
    ) -> error_stack::Result<(), KernelError> {
        PgLeaseInternal::create(con, lease).await
    }

    async fn update(
        &self,
        con: &mut PostgresTransaction,
        lease: &Lease,
    ) -> error_stack::Result<(), KernelError> {
        PgLeaseInternal::update(con, lease).await
    }
}

#[derive(sqlx::FromRow)]
struct LeaseRow {
    id: Uuid,
    customer_id: Uuid,
    car_id: Uuid,
    start_date: Date,
    end_date: Option<Date>,
    active: bool,
}

impl From<LeaseRow> for Lease {
    fn from(value: LeaseRow) -> Self {
        Lease::new(
            LeaseId::new(value.id),
            CustomerId::new(value.customer_id),
            CarId::new(value.car_id),
            LeaseStartDate::new(value.start_date),
            value.end_date.map(LeaseEndDate::new),
            IsActive::new(value.active),
        )
    }
}

pub(in crate::database) struct PgLeaseInternal;

impl PgLeaseInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &LeaseId,
    ) -> error_stack::Result<Option<Lease>, KernelError> {
        let row = sqlx::query_as::<_, LeaseRow>(
            // language=postgresql
            r#"
            SELECT id, customer_id, car_id, start_date, end_date, active
            FROM leases
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Lease::from))
    }

    async fn find_by_id_for_update(
        con: &mut PgConnection,
        id: &LeaseId,
    ) -> error_stack::Result<Option<Lease>, KernelError> {
        let row = sqlx::query_as::<_, LeaseRow>(
            // language=postgresql
            r#"
            SELECT id, customer_id, car_id, start_date, end_date, active
            FROM leases
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Lease::from))
    }

    async fn find_active_by_id_and_customer(
        con: &mut PgConnection,
        id: &LeaseId,
        customer_id: &CustomerId,
    ) -> error_stack::Result<Option<Lease>, KernelError> {
        let row = sqlx::query_as::<_, LeaseRow>(
            // language=postgresql
            r#"
            SELECT id, customer_id, car_id, start_date, end_date, active
            FROM leases
            WHERE id = $1 AND customer_id = $2 AND active
            FOR UPDATE
            "#,
        )
        .bind(id.as_ref())
        .bind(customer_id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Lease::from))
    }

    async fn count_active_by_customer(
        con: &mut PgConnection,
        customer_id: &CustomerId,
    ) -> error_stack::Result<ActiveLeaseCount, KernelError> {
        // language=postgresql
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM leases
            WHERE customer_id = $1 AND active
            "#,
        )
        .bind(customer_id.as_ref())
        .fetch_one(con)
        .await
        .convert_error()?;
        Ok(ActiveLeaseCount::new(count))
    }

    async fn find_by_customer_id(
        con: &mut PgConnection,
        customer_id: &CustomerId,
    ) -> error_stack::Result<Vec<Lease>, KernelError> {
        let rows = sqlx::query_as::<_, LeaseRow>(
            // language=postgresql
            r#"
            SELECT id, customer_id, car_id, start_date, end_date, active
            FROM leases
            WHERE customer_id = $1
            ORDER BY seq
            "#,
        )
        .bind(customer_id.as_ref())
        .fetch_all(con)
        .await
        .convert_error()?;
        Ok(rows.into_iter().map(Lease::from).collect())
    }

    async fn find_by_car_id(
        con: &mut PgConnection,
        car_id: &CarId,
    ) -> error_stack::Result<Vec<Lease>, KernelError> {
        let rows = sqlx::query_as::<_, LeaseRow>(
            // language=postgresql
            r#"
            SELECT id, customer_id, car_id, start_date, end_date, active
            FROM leases
            WHERE car_id = $1
            ORDER BY seq
            "#,
        )
        .bind(car_id.as_ref())
        .fetch_all(con)
        .await
        .convert_error()?;
        Ok(rows.into_iter().map(Lease::from).collect())
    }

    async fn find_by_owner_id(
        con: &mut PgConnection,
        owner_id: &CarOwnerId,
    ) -> error_stack::Result<Vec<Lease>, KernelError> {
        let rows = sqlx::query_as::<_, LeaseRow>(
            // language=postgresql
            r#"
            SELECT l.id, l.customer_id, l.car_id, l.start_date, l.end_date, l.active
            FROM leases l
            INNER JOIN cars c ON c.id = l.car_id
            WHERE c.owner_id = $1
            ORDER BY l.seq
            "#,
        )
        .bind(owner_id.as_ref())
        .fetch_all(con)
        .await
        .convert_error()?;
        Ok(rows.into_iter().map(Lease::from).collect())
    }

    async fn create(con: &mut PgConnection, lease: &Lease) -> error_stack::Result<(), KernelError> {
        // language=postgresql
        sqlx::query(
            r#"
            INSERT INTO leases (id, customer_id, car_id, start_date, end_date, active)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(lease.id().as_ref())
        .bind(lease.customer_id().as_ref())
        .bind(lease.car_id().as_ref())
        .bind(lease.start_date().as_ref())
        .bind(lease.end_date().map(Date::from))
        .bind(lease.is_active())
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }

    async fn update(con: &mut PgConnection, lease: &Lease) -> error_stack::Result<(), KernelError> {
        // language=postgresql
        let result = sqlx::query(
            r#"
            UPDATE leases
            SET end_date = $2, active = $3
            WHERE id = $1
            "#,
        )
        .bind(lease.id().as_ref())
        .bind(lease.end_date().map(Date::from))
        .bind(lease.is_active())
        .execute(con)
        .await
        .convert_error()?;
        if result.rows_affected() == 0 {
            return Err(Report::new(KernelError::NotFound)
                .attach_printable(format!("lease {} does not exist", lease.id())));
        }
        Ok(())
    }
}
