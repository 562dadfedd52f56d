use error_stack::{Report, ResultExt};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Error, PgConnection, Pool, Postgres};
use std::ops::{Deref, DerefMut};

use kernel::interface::database::{DatabaseConnection, Transaction};
use kernel::interface::query::{
    DependOnCarOwnerQuery, DependOnCarQuery, DependOnCustomerQuery, DependOnLeaseQuery,
};
use kernel::interface::update::{
    DependOnCarModifier, DependOnCarOwnerModifier, DependOnCustomerModifier, DependOnLeaseModifier,
};
use kernel::KernelError;

use crate::env;
use crate::error::ConvertError;

pub use self::{car::*, customer::*, lease::*, owner::*};

mod car;
mod customer;
mod lease;
mod owner;

static POSTGRES_URL: &str = "POSTGRES_URL";
static POSTGRES_MAX_CONNECTIONS: &str = "POSTGRES_MAX_CONNECTIONS";
const DEFAULT_MAX_CONNECTIONS: u32 = 8;

const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Clone)]
pub struct PostgresDatabase {
    pool: Pool<Postgres>,
}

impl PostgresDatabase {
    pub async fn new() -> error_stack::Result<Self, KernelError> {
        let url = env(POSTGRES_URL)?;
        let max_connections = match dotenvy::var(POSTGRES_MAX_CONNECTIONS) {
            Ok(value) => value
                .parse::<u32>()
                .change_context_lazy(|| KernelError::Internal)
                .attach_printable_lazy(|| format!("{POSTGRES_MAX_CONNECTIONS} is not a number"))?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(&url)
            .await
            .convert_error()?;
        tracing::info!(max_connections, "connected to postgres");
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> error_stack::Result<(), KernelError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .change_context_lazy(|| KernelError::Internal)
            .attach_printable("failed to run migrations")?;
        tracing::info!("postgres migrations applied");
        Ok(())
    }
}

/// Serializable transaction. Dropping it without commit rolls it back.
pub struct PostgresTransaction(sqlx::Transaction<'static, Postgres>);

#[async_trait::async_trait]
impl DatabaseConnection for PostgresDatabase {
    type Transaction = PostgresTransaction;
    async fn transact(&self) -> error_stack::Result<Self::Transaction, KernelError> {
        let mut transaction = self.pool.begin().await.convert_error()?;
        // language=postgresql
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *transaction)
            .await
            .convert_error()?;
        Ok(PostgresTransaction(transaction))
    }
}

#[async_trait::async_trait]
impl Transaction for PostgresTransaction {
    async fn commit(self) -> error_stack::Result<(), KernelError> {
        self.0.commit().await.convert_error()?;
        tracing::debug!("postgres transaction committed");
        Ok(())
    }

    async fn roll_back(self) -> error_stack::Result<(), KernelError> {
        self.0.rollback().await.convert_error()?;
        tracing::debug!("postgres transaction rolled back");
        Ok(())
    }
}

impl Deref for PostgresTransaction {
    type Target = PgConnection;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for PostgresTransaction {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl DependOnCarQuery for PostgresDatabase {
    type CarQuery = PostgresCarRepository;
    fn car_query(&self) -> &Self::CarQuery {
        &PostgresCarRepository
    }
}

impl DependOnCarModifier for PostgresDatabase {
    type CarModifier = PostgresCarRepository;
    fn car_modifier(&self) -> &Self::CarModifier {
        &PostgresCarRepository
    }
}

impl DependOnCustomerQuery for PostgresDatabase {
    type CustomerQuery = PostgresCustomerRepository;
    fn customer_query(&self) -> &Self::CustomerQuery {
        &PostgresCustomerRepository
    }
}

impl DependOnCustomerModifier for PostgresDatabase {
    type CustomerModifier = PostgresCustomerRepository;
    fn customer_modifier(&self) -> &Self::CustomerModifier {
        &PostgresCustomerRepository
    }
}

impl DependOnCarOwnerQuery for PostgresDatabase {
    type CarOwnerQuery = PostgresCarOwnerRepository;
    fn car_owner_query(&self) -> &Self::CarOwnerQuery {
        &PostgresCarOwnerRepository
    }
}

impl DependOnCarOwnerModifier for PostgresDatabase {
    type CarOwnerModifier = PostgresCarOwnerRepository;
    fn car_owner_modifier(&self) -> &Self::CarOwnerModifier {
        &PostgresCarOwnerRepository
    }
}

impl DependOnLeaseQuery for PostgresDatabase {
    type LeaseQuery = PostgresLeaseRepository;
    fn lease_query(&self) -> &Self::LeaseQuery {
        &PostgresLeaseRepository
    }
}

impl DependOnLeaseModifier for PostgresDatabase {
    type LeaseModifier = PostgresLeaseRepository;
    fn lease_modifier(&self) -> &Self::LeaseModifier {
        &PostgresLeaseRepository
    }
}

impl<T> ConvertError for Result<T, Error> {
    type Ok = T;
    fn convert_error(self) -> error_stack::Result<T, KernelError> {
        self.map_err(|error| {
            let context = match &error {
                Error::PoolTimedOut => KernelError::Timeout,
                Error::Database(database) => match database.code().as_deref() {
                    Some(SERIALIZATION_FAILURE | DEADLOCK_DETECTED) => {
                        tracing::warn!("postgres transaction lost a concurrent update: {database}");
                        KernelError::Concurrency
                    }
                    Some(UNIQUE_VIOLATION) => KernelError::AlreadyExists,
                    Some(FOREIGN_KEY_VIOLATION) => KernelError::NotFound,
                    _ => KernelError::Internal,
                },
                _ => KernelError::Internal,
            };
            Report::from(error).change_context(context)
        })
    }
}
