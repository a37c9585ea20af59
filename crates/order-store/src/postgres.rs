use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{PartId, TransactionId, UserId};
use domain::{Money, Order, OrderRecord, OrderStatus};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{OrderId, OrderRepository, RepositoryError, Result, Version};

const PRIMARY_KEY_CONSTRAINT: &str = "orders_pkey";

/// PostgreSQL-backed order repository.
#[derive(Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    /// Creates a new PostgreSQL order repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let order_id = OrderId::from_uuid(row.try_get::<Uuid, _>("id")?);

        let status: String = row.try_get("status")?;
        let status = status
            .parse::<OrderStatus>()
            .map_err(|e| RepositoryError::InvalidRecord {
                order_id,
                reason: e.to_string(),
            })?;

        let part_ids: Vec<Uuid> = row.try_get("part_ids")?;
        let transaction_id: Option<Uuid> = row.try_get("transaction_id")?;

        Ok(Order::restore(OrderRecord {
            id: order_id,
            user_id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
            part_ids: part_ids.into_iter().map(PartId::from_uuid).collect(),
            total_price: Money::from_cents(row.try_get("total_price_cents")?),
            status,
            payment_method: row.try_get("payment_method")?,
            transaction_id: transaction_id.map(TransactionId::from_uuid),
            version: Version::new(row.try_get("version")?),
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
            updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
        }))
    }

    fn part_uuids(order: &Order) -> Vec<Uuid> {
        order.part_ids().iter().map(PartId::as_uuid).collect()
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn create(&self, order: &Order) -> Result<()> {
        let order_id = order.id();

        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, part_ids, total_price_cents, status, payment_method, transaction_id, version, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(order_id.as_uuid())
        .bind(order.user_id().as_uuid())
        .bind(Self::part_uuids(order))
        .bind(order.total_price().cents())
        .bind(order.status().as_str())
        .bind(order.payment_method())
        .bind(order.transaction_id().map(|id| id.as_uuid()))
        .bind(order.version().as_i64())
        .bind(order.created_at())
        .bind(order.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some(PRIMARY_KEY_CONSTRAINT)
            {
                return RepositoryError::DuplicateOrder(order_id);
            }
            RepositoryError::Database(e)
        })?;

        tracing::debug!(%order_id, "order inserted");
        Ok(())
    }

    async fn get(&self, order_id: OrderId) -> Result<Order> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT id, user_id, part_ids, total_price_cents, status, payment_method, transaction_id, version, created_at, updated_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Self::row_to_order(row),
            None => Err(RepositoryError::NotFound(order_id)),
        }
    }

    async fn update(&self, order: &Order) -> Result<Version> {
        let order_id = order.id();
        let expected = order.version();

        let new_version: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE orders
            SET user_id = $2, part_ids = $3, total_price_cents = $4, status = $5,
                payment_method = $6, transaction_id = $7, updated_at = $8,
                version = version + 1
            WHERE id = $1 AND version = $9
            RETURNING version
            "#,
        )
        .bind(order_id.as_uuid())
        .bind(order.user_id().as_uuid())
        .bind(Self::part_uuids(order))
        .bind(order.total_price().cents())
        .bind(order.status().as_str())
        .bind(order.payment_method())
        .bind(order.transaction_id().map(|id| id.as_uuid()))
        .bind(order.updated_at())
        .bind(expected.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        if let Some(version) = new_version {
            tracing::debug!(%order_id, version, "order updated");
            return Ok(Version::new(version));
        }

        // Nothing matched: either the row is gone or its version moved on.
        let actual: Option<i64> = sqlx::query_scalar("SELECT version FROM orders WHERE id = $1")
            .bind(order_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        match actual {
            Some(actual) => Err(RepositoryError::VersionConflict {
                order_id,
                expected,
                actual: Version::new(actual),
            }),
            None => Err(RepositoryError::NotFound(order_id)),
        }
    }
}
