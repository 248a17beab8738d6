//! Order Repository
//!
//! 桌台级批量操作 (请求结账、收款) 以单条条件 UPDATE 实现，
//! 靠嵌入式引擎的语句级原子性避免读改写竞态。

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Order, OrderItem};
use crate::utils::time::now_millis;
use shared::types::{GuestInfo, OrderStatus, OrderType};

/// 创建订单所需的全部字段 (lifecycle 层组装、已校验)
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user: Option<RecordId>,
    pub is_guest: bool,
    pub guest_info: Option<GuestInfo>,
    pub restaurant_unit: RecordId,
    pub items: Vec<OrderItem>,
    pub total: f64,
    pub table_number: Option<i64>,
    pub order_type: OrderType,
    pub observations: Option<String>,
    pub split_count: i64,
}

/// 订单部分更新 (lifecycle 层已做状态机校验)
#[derive(Debug, Clone, Default)]
pub struct OrderPatch {
    /// 完整替换后的行列表 (追加逻辑在 lifecycle 层完成)
    pub items: Option<Vec<OrderItem>>,
    /// items 变化时重算的总额
    pub total: Option<f64>,
    pub status: Option<OrderStatus>,
    pub is_paid: Option<bool>,
    pub paid_at: Option<i64>,
    pub observations: Option<String>,
}

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find order by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let thing = BaseRepository::parse_id(id)?;
        let order: Option<Order> = self.base.db().select(thing).await?;
        Ok(order)
    }

    /// All orders of a unit, newest first, optionally filtered by status
    pub async fn find_by_unit(
        &self,
        unit: RecordId,
        status: Option<OrderStatus>,
    ) -> RepoResult<Vec<Order>> {
        let mut result = self
            .base
            .db()
            .query(
                r#"SELECT * FROM orders
                    WHERE restaurant_unit = $unit
                        AND (!$has_status OR status = $status)
                    ORDER BY created_at DESC"#,
            )
            .bind(("unit", unit))
            .bind(("has_status", status.is_some()))
            .bind(("status", status))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        Ok(orders)
    }

    /// All orders placed by a user, newest first
    pub async fn find_by_user(&self, user: RecordId) -> RepoResult<Vec<Order>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM orders WHERE user = $user ORDER BY created_at DESC")
            .bind(("user", user))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        Ok(orders)
    }

    /// All non-cancelled orders of a table, oldest first
    ///
    /// 桌台视图的定义 — 已单独支付的订单仍然在列，
    /// all_paid 标志由调用方在这组订单上推导。
    pub async fn find_by_table(
        &self,
        unit: RecordId,
        table: i64,
    ) -> RepoResult<Vec<Order>> {
        let mut result = self
            .base
            .db()
            .query(
                r#"SELECT * FROM orders
                    WHERE restaurant_unit = $unit
                        AND metadata.table_number = $table
                        AND status != 'cancelled'
                    ORDER BY created_at"#,
            )
            .bind(("unit", unit))
            .bind(("table", table))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        Ok(orders)
    }

    /// Create a new order
    pub async fn create(&self, data: NewOrder) -> RepoResult<Order> {
        let now = now_millis();
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE orders SET
                    user = $user,
                    is_guest = $is_guest,
                    guest_info = $guest_info,
                    restaurant_unit = $unit,
                    items = $items,
                    total = $total,
                    status = 'pending',
                    is_paid = false,
                    paid_at = NONE,
                    metadata = {
                        table_number: $table_number,
                        order_type: $order_type,
                        observations: $observations,
                        payment_method: NONE,
                        payment_requested_at: NONE,
                        processed_by: NONE,
                        split_count: $split_count
                    },
                    created_at = $now,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("user", data.user))
            .bind(("is_guest", data.is_guest))
            .bind(("guest_info", data.guest_info))
            .bind(("unit", data.restaurant_unit))
            .bind(("items", data.items))
            .bind(("total", data.total))
            .bind(("table_number", data.table_number))
            .bind(("order_type", data.order_type))
            .bind(("observations", data.observations))
            .bind(("split_count", data.split_count))
            .bind(("now", now))
            .await?;

        let created: Option<Order> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    /// Apply a validated patch to one order
    pub async fn update(&self, thing: RecordId, patch: OrderPatch) -> RepoResult<Order> {
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    items = IF $has_items THEN $items ELSE items END,
                    total = IF $has_items THEN $total ELSE total END,
                    status = IF $has_status THEN $status ELSE status END,
                    is_paid = IF $has_is_paid THEN $is_paid ELSE is_paid END,
                    paid_at = IF $has_is_paid THEN $paid_at ELSE paid_at END,
                    metadata.observations = $observations OR metadata.observations,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("thing", thing.clone()))
            .bind(("has_items", patch.items.is_some()))
            .bind(("items", patch.items))
            .bind(("total", patch.total))
            .bind(("has_status", patch.status.is_some()))
            .bind(("status", patch.status))
            .bind(("has_is_paid", patch.is_paid.is_some()))
            .bind(("is_paid", patch.is_paid))
            .bind(("paid_at", patch.paid_at))
            .bind(("observations", patch.observations))
            .bind(("now", now_millis()))
            .await?;

        result
            .take::<Option<Order>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", thing)))
    }

    /// Move every open order of a table to `payment_requested`
    ///
    /// 可重复调用：重复请求只刷新时间戳和分账人数。
    pub async fn mark_payment_requested(
        &self,
        unit: RecordId,
        table: i64,
        split_count: Option<i64>,
    ) -> RepoResult<Vec<Order>> {
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE orders SET
                    status = 'payment_requested',
                    metadata.payment_requested_at = $now,
                    metadata.split_count = $split OR metadata.split_count,
                    updated_at = $now
                WHERE restaurant_unit = $unit
                    AND metadata.table_number = $table
                    AND is_paid = false
                    AND status != 'cancelled'
                RETURN AFTER"#,
            )
            .bind(("unit", unit))
            .bind(("table", table))
            .bind(("split", split_count))
            .bind(("now", now_millis()))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        Ok(orders)
    }

    /// Settle every open order of a table in one conditional update
    ///
    /// WHERE 子句同时是双重收款保护：已结清的桌台匹配零行。
    pub async fn settle_table(
        &self,
        unit: RecordId,
        table: i64,
        payment_method: String,
        processed_by: Option<RecordId>,
        split_count: Option<i64>,
    ) -> RepoResult<Vec<Order>> {
        let now = now_millis();
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE orders SET
                    status = 'completed',
                    is_paid = true,
                    paid_at = $now,
                    metadata.payment_method = $method,
                    metadata.processed_by = $processed_by,
                    metadata.split_count = $split OR metadata.split_count,
                    updated_at = $now
                WHERE restaurant_unit = $unit
                    AND metadata.table_number = $table
                    AND is_paid = false
                    AND status != 'cancelled'
                RETURN AFTER"#,
            )
            .bind(("unit", unit))
            .bind(("table", table))
            .bind(("method", payment_method))
            .bind(("processed_by", processed_by))
            .bind(("split", split_count))
            .bind(("now", now))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        Ok(orders)
    }

    /// Hard delete an order
    pub async fn delete(&self, thing: RecordId) -> RepoResult<()> {
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(())
    }
}
