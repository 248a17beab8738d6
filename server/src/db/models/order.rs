//! Order Model

use serde::{Deserialize, Serialize};
use shared::types::{GuestInfo, OrderStatus, OrderType};
use surrealdb::RecordId;

use super::serde_helpers;

/// Order ID type
pub type OrderId = RecordId;

/// One line of an order
///
/// 价格是下单时的快照，后续商品调价不影响已存在的订单。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub product: Option<RecordId>,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
}

impl OrderItem {
    /// 行小计
    pub fn subtotal(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

/// 订单元数据 (桌号、类型、支付信息)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderMetadata {
    #[serde(default)]
    pub table_number: Option<i64>,
    #[serde(default)]
    pub order_type: OrderType,
    #[serde(default)]
    pub observations: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    /// 客户请求结账的时刻
    #[serde(default)]
    pub payment_requested_at: Option<i64>,
    /// 收款员工
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub processed_by: Option<RecordId>,
    /// 分账人数 (>= 1)
    #[serde(default = "default_split")]
    pub split_count: i64,
}

fn default_split() -> i64 {
    1
}

impl Default for OrderMetadata {
    fn default() -> Self {
        Self {
            table_number: None,
            order_type: OrderType::default(),
            observations: None,
            payment_method: None,
            payment_requested_at: None,
            processed_by: None,
            split_count: 1,
        }
    }
}

/// Order model matching SurrealDB schema
///
/// 或者 `user` 指向注册用户，或者 `is_guest = true` 且携带 `guest_info`，
/// 两者互斥 (创建时校验)。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<OrderId>,

    #[serde(default, with = "serde_helpers::option_record_id")]
    pub user: Option<RecordId>,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub is_guest: bool,
    #[serde(default)]
    pub guest_info: Option<GuestInfo>,

    #[serde(with = "serde_helpers::record_id")]
    pub restaurant_unit: RecordId,

    pub items: Vec<OrderItem>,
    /// 服务端计算的总额，永远等于各行小计之和
    pub total: f64,

    pub status: OrderStatus,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub is_paid: bool,
    #[serde(default)]
    pub paid_at: Option<i64>,

    #[serde(default)]
    pub metadata: OrderMetadata,

    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    /// 由订单行重新计算总额
    pub fn compute_total(items: &[OrderItem]) -> f64 {
        items.iter().map(|i| i.subtotal()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_total() {
        let items = vec![
            OrderItem {
                product: None,
                name: "Burger".into(),
                price: 10.0,
                quantity: 2,
            },
            OrderItem {
                product: None,
                name: "Soda".into(),
                price: 2.5,
                quantity: 2,
            },
        ];
        assert_eq!(Order::compute_total(&items), 25.0);
    }

    #[test]
    fn test_empty_order_totals_zero() {
        assert_eq!(Order::compute_total(&[]), 0.0);
    }
}
