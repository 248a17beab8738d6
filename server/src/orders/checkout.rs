//! 桌台结账协调器
//!
//! 结账操作作用于该门店、该桌号下所有未支付且未取消的订单；
//! 桌台视图则列出所有未取消订单 (含已单独支付的)。
//! 流程：客户请求结账 → 桌号进入门店的 checkout_requests 集合，
//! 订单批量转入 payment_requested → 员工收款 → 订单批量完成，
//! 桌号移出集合。
//!
//! 批量写都是单条条件 UPDATE：收款的 WHERE 子句天然挡住双重收款。

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::Order;
use crate::db::repository::{OrderRepository, UnitRepository};
use crate::utils::time::now_millis;
use crate::utils::{AppError, AppResult};
use shared::request::{CheckoutRequest, ProcessPaymentRequest};
use shared::response::{PaymentSummary, TableOrdersResponse, TableSummary};
use shared::types::OrderStatus;

/// 桌台结账服务
#[derive(Clone)]
pub struct CheckoutCoordinator {
    orders: OrderRepository,
    units: UnitRepository,
}

impl CheckoutCoordinator {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            units: UnitRepository::new(db),
        }
    }

    /// 查询桌台账单 (不改状态)
    ///
    /// 视图含该桌所有未取消订单 — 已单独支付的订单保留在列，
    /// 这样 all_paid 才有判别意义。
    pub async fn table_status(
        &self,
        unit_id: &str,
        table: i64,
    ) -> AppResult<TableOrdersResponse<Order>> {
        let unit_thing = UnitRepository::parse_unit_id(unit_id)?;
        let unit = self
            .units
            .find_by_id(unit_id)
            .await?
            .ok_or_else(|| AppError::not_found("Restaurant unit"))?;

        let orders = self.orders.find_by_table(unit_thing, table).await?;
        let requested = unit.checkout_requests.contains(&table);
        let summary = build_summary(&orders, requested, None);

        Ok(TableOrdersResponse { orders, summary })
    }

    /// 客户请求结账
    ///
    /// 幂等：重复请求不报错，只刷新 payment_requested_at
    /// 和 (如提供的) 分账人数。
    pub async fn request_checkout(
        &self,
        req: CheckoutRequest,
    ) -> AppResult<TableOrdersResponse<Order>> {
        let unit_thing = UnitRepository::parse_unit_id(&req.restaurant_unit_id)?;
        self.units
            .find_by_id(&req.restaurant_unit_id)
            .await?
            .ok_or_else(|| AppError::not_found("Restaurant unit"))?;

        if let Some(split) = req.split_count
            && split < 1
        {
            return Err(AppError::validation("splitCount must be at least 1"));
        }

        let orders = self
            .orders
            .mark_payment_requested(unit_thing.clone(), req.table_number, req.split_count)
            .await?;
        if orders.is_empty() {
            return Err(AppError::not_found(format!(
                "Open orders for table {}",
                req.table_number
            )));
        }

        self.units
            .add_checkout_request(unit_thing, req.table_number)
            .await?;

        tracing::info!(
            unit = %req.restaurant_unit_id,
            table = req.table_number,
            orders = orders.len(),
            "Checkout requested"
        );

        let summary = build_summary(&orders, true, req.split_count);
        Ok(TableOrdersResponse { orders, summary })
    }

    /// 员工收款，整桌结清
    ///
    /// 条件批量 UPDATE 把所有未支付订单一次推到 completed；
    /// 匹配零行说明桌台已结清或没有账单，返回 404 而非重复收款。
    pub async fn process_payment(
        &self,
        req: ProcessPaymentRequest,
        staff_id: Option<String>,
    ) -> AppResult<PaymentSummary> {
        let unit_thing = UnitRepository::parse_unit_id(&req.restaurant_unit_id)?;
        self.units
            .find_by_id(&req.restaurant_unit_id)
            .await?
            .ok_or_else(|| AppError::not_found("Restaurant unit"))?;

        if let Some(split) = req.split_count
            && split < 1
        {
            return Err(AppError::validation("splitCount must be at least 1"));
        }

        let processed_by = match staff_id {
            Some(id) => Some(
                id.parse()
                    .map_err(|_| AppError::validation(format!("Invalid staff ID: {}", id)))?,
            ),
            None => None,
        };

        let settled = self
            .orders
            .settle_table(
                unit_thing.clone(),
                req.table_number,
                req.payment_method.clone(),
                processed_by,
                req.split_count,
            )
            .await?;
        if settled.is_empty() {
            return Err(AppError::not_found(format!(
                "Open orders for table {}",
                req.table_number
            )));
        }

        self.units
            .remove_checkout_request(unit_thing, req.table_number)
            .await?;

        let total: f64 = settled.iter().map(|o| o.total).sum();
        let split_count = effective_split(&settled, req.split_count);

        tracing::info!(
            unit = %req.restaurant_unit_id,
            table = req.table_number,
            orders = settled.len(),
            total,
            method = %req.payment_method,
            "Table settled"
        );

        Ok(PaymentSummary {
            orders_processed: settled.len(),
            total,
            split_count,
            amount_per_person: per_person(total, split_count),
            processed_at: now_millis(),
        })
    }
}

/// 分账人数：显式参数优先，否则取最近一单记录的值，最少 1
fn effective_split(orders: &[Order], requested: Option<i64>) -> i64 {
    requested
        .or_else(|| {
            orders
                .iter()
                .max_by_key(|o| o.created_at)
                .map(|o| o.metadata.split_count)
        })
        .unwrap_or(1)
        .max(1)
}

/// 人均金额，四舍五入到分
fn per_person(total: f64, split: i64) -> f64 {
    ((total / split as f64) * 100.0).round() / 100.0
}

/// 由一组开放订单推导桌台汇总
fn build_summary(orders: &[Order], checkout_requested: bool, split: Option<i64>) -> TableSummary {
    let total: f64 = orders.iter().map(|o| o.total).sum();
    let item_count: i64 = orders
        .iter()
        .flat_map(|o| o.items.iter())
        .map(|i| i.quantity)
        .sum();
    let payment_requested = checkout_requested
        || orders
            .iter()
            .any(|o| o.status == OrderStatus::PaymentRequested);
    let split_count = effective_split(orders, split);

    TableSummary {
        total_amount: total,
        order_count: orders.len(),
        item_count,
        payment_requested,
        all_paid: orders.iter().all(|o| o.is_paid),
        split_count,
        amount_per_person: per_person(total, split_count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{OrderItem, OrderMetadata};
    use shared::types::OrderType;

    fn order(total: f64, quantity: i64, split: i64, status: OrderStatus) -> Order {
        Order {
            id: None,
            user: None,
            is_guest: true,
            guest_info: None,
            restaurant_unit: "restaurant_units:u1".parse().unwrap(),
            items: vec![OrderItem {
                product: None,
                name: "item".into(),
                price: total / quantity as f64,
                quantity,
            }],
            total,
            status,
            is_paid: false,
            paid_at: None,
            metadata: OrderMetadata {
                table_number: Some(4),
                order_type: OrderType::Local,
                split_count: split,
                ..Default::default()
            },
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_summary_totals_and_split() {
        let mut first = order(60.0, 2, 1, OrderStatus::Pending);
        first.created_at = 1;
        let mut latest = order(30.0, 3, 3, OrderStatus::Pending);
        latest.created_at = 2;

        let summary = build_summary(&[first, latest], false, None);
        assert_eq!(summary.total_amount, 90.0);
        assert_eq!(summary.order_count, 2);
        assert_eq!(summary.item_count, 5);
        assert_eq!(summary.split_count, 3);
        assert_eq!(summary.amount_per_person, 30.0);
        assert!(!summary.payment_requested);
        assert!(!summary.all_paid);
    }

    #[test]
    fn test_split_follows_the_latest_order() {
        // 早先一单登记了更多人也不作数，以最近一单为准
        let mut early = order(50.0, 1, 5, OrderStatus::Pending);
        early.created_at = 1;
        let mut latest = order(20.0, 1, 2, OrderStatus::Pending);
        latest.created_at = 2;

        let summary = build_summary(&[early, latest], false, None);
        assert_eq!(summary.split_count, 2);
        assert_eq!(summary.amount_per_person, 35.0);
    }

    #[test]
    fn test_summary_flags_payment_requested() {
        let orders = vec![order(10.0, 1, 1, OrderStatus::PaymentRequested)];
        let summary = build_summary(&orders, false, None);
        assert!(summary.payment_requested);
    }

    #[test]
    fn test_explicit_split_wins() {
        let orders = vec![order(100.0, 1, 2, OrderStatus::Pending)];
        let summary = build_summary(&orders, false, Some(4));
        assert_eq!(summary.split_count, 4);
        assert_eq!(summary.amount_per_person, 25.0);
    }

    #[test]
    fn test_empty_table_is_all_paid() {
        let summary = build_summary(&[], false, None);
        assert_eq!(summary.total_amount, 0.0);
        assert!(summary.all_paid);
        assert_eq!(summary.split_count, 1);
    }
}
