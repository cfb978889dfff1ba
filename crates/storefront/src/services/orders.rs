//! Order placement for authenticated users.

use bazaar_core::{ItemId, OrderStatus, UserId};
use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use tracing::info;

use super::ServiceError;
use crate::db::items::ItemRepository;
use crate::db::orders::{NewOrder, OrderRepository};
use crate::models::Order;

/// Days between purchase and estimated delivery.
pub const DELIVERY_DAYS: i64 = 7;

pub struct OrderService<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Place a pending order for `quantity` units of an item.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a non-positive quantity and
    /// `ServiceError::ItemNotFound` for an unknown item.
    pub async fn place(
        &self,
        user_id: UserId,
        item_id: ItemId,
        quantity: i64,
    ) -> Result<Order, ServiceError> {
        if quantity <= 0 {
            return Err(ServiceError::Validation(
                "quantity must be greater than zero".to_owned(),
            ));
        }

        let item = ItemRepository::new(self.pool)
            .get_by_id(item_id)
            .await?
            .ok_or(ServiceError::ItemNotFound(item_id))?;

        let now = Utc::now();
        let order = OrderRepository::new(self.pool)
            .create(&NewOrder {
                user_id,
                store_id: item.store_id,
                item_id: item.id,
                quantity,
                time_of_purchase: now,
                estimated_delivery: now + Duration::days(DELIVERY_DAYS),
                status: OrderStatus::Pending,
            })
            .await
            .map_err(|e| match e {
                crate::db::RepositoryError::MissingReference(_) => ServiceError::UserNotFound(user_id),
                other => other.into(),
            })?;

        info!(order_id = %order.id, user_id = %user_id, item_id = %item.id, "Order placed");
        Ok(order)
    }

    /// A user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the query fails.
    pub async fn for_user(&self, user_id: UserId) -> Result<Vec<Order>, ServiceError> {
        Ok(OrderRepository::new(self.pool).list_for_user(user_id).await?)
    }
}
