//! Order repository.

use bazaar_core::{ItemId, OrderStatus, StoreId, UserId};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::RepositoryError;
use crate::models::Order;

const ORDER_COLUMNS: &str =
    "id, user_id, store_id, item_id, quantity, time_of_purchase, estimated_delivery, status";

/// A purchase about to be recorded.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub store_id: StoreId,
    pub item_id: ItemId,
    pub quantity: i64,
    pub time_of_purchase: DateTime<Utc>,
    pub estimated_delivery: DateTime<Utc>,
    pub status: OrderStatus,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Record an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::MissingReference` if the user, store or item
    /// does not exist.
    pub async fn create(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let sql = format!(
            "INSERT INTO orders (user_id, store_id, item_id, quantity, time_of_purchase, estimated_delivery, status) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) RETURNING {ORDER_COLUMNS}"
        );
        sqlx::query_as::<_, Order>(&sql)
            .bind(order.user_id)
            .bind(order.store_id)
            .bind(order.item_id)
            .bind(order.quantity)
            .bind(order.time_of_purchase)
            .bind(order.estimated_delivery)
            .bind(&order.status)
            .fetch_one(self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, "order"))
    }

    /// A user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = ?1 ORDER BY time_of_purchase DESC, id DESC"
        );
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;
        Ok(orders)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::db::test_support;

    #[tokio::test]
    async fn test_create_and_list_newest_first() {
        let pool = test_support::pool().await;
        let buyer = test_support::user(&pool, "buyer").await;
        let acme = test_support::store(&pool, buyer, "Acme").await;
        let widget = test_support::item(&pool, acme.id, "Widget", 1).await;
        let repo = OrderRepository::new(&pool);

        let base = Utc::now();
        let order = |at: DateTime<Utc>, quantity| NewOrder {
            user_id: buyer,
            store_id: acme.id,
            item_id: widget.id,
            quantity,
            time_of_purchase: at,
            estimated_delivery: at + Duration::days(7),
            status: OrderStatus::Pending,
        };

        let older = repo.create(&order(base - Duration::hours(1), 1)).await.expect("insert");
        let newer = repo.create(&order(base, 3)).await.expect("insert");
        assert_eq!(newer.status, OrderStatus::Pending);

        let ids: Vec<_> = repo
            .list_for_user(buyer)
            .await
            .expect("list")
            .into_iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(ids, [newer.id, older.id]);
    }

    #[tokio::test]
    async fn test_zero_quantity_rejected_by_schema() {
        let pool = test_support::pool().await;
        let buyer = test_support::user(&pool, "buyer").await;
        let acme = test_support::store(&pool, buyer, "Acme").await;
        let widget = test_support::item(&pool, acme.id, "Widget", 1).await;
        let now = Utc::now();

        let result = OrderRepository::new(&pool)
            .create(&NewOrder {
                user_id: buyer,
                store_id: acme.id,
                item_id: widget.id,
                quantity: 0,
                time_of_purchase: now,
                estimated_delivery: now,
                status: OrderStatus::Pending,
            })
            .await;
        assert!(result.is_err());
    }
}
