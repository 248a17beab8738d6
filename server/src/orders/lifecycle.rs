//! 订单生命周期
//!
//! 状态机：`pending → processing → completed`，
//! 任意非终态可取消，结账路径经 `payment_requested`。
//! 终态订单 (completed / cancelled) 拒绝一切修改。

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

use crate::db::models::{Order, OrderItem};
use crate::db::repository::{
    OrderRepository, ProductRepository, UnitRepository, UserRepository,
    order::{NewOrder, OrderPatch},
};
use crate::utils::time::now_millis;
use crate::utils::{AppError, AppResult};
use shared::request::{CreateOrderRequest, OrderItemInput, OrderPatchRequest};
use shared::types::OrderStatus;

/// 订单生命周期服务
#[derive(Clone)]
pub struct OrderLifecycle {
    orders: OrderRepository,
    products: ProductRepository,
    units: UnitRepository,
    users: UserRepository,
}

impl OrderLifecycle {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            products: ProductRepository::new(db.clone()),
            units: UnitRepository::new(db.clone()),
            users: UserRepository::new(db),
        }
    }

    /// 创建订单 (注册用户或访客)
    ///
    /// 校验：
    /// - `user_id` 与 `guest_info` 必须恰好提供一个
    /// - 访客单要求非空姓名
    /// - 门店存在且启用 (矩阵伪门店被拒绝)
    /// - 至少一个订单行；每行可定价
    /// - `split_count >= 1`
    pub async fn create_order(&self, req: CreateOrderRequest) -> AppResult<Order> {
        if req.user_id.is_some() == req.guest_info.is_some() {
            return Err(AppError::validation(
                "Provide exactly one of userId or guestInfo",
            ));
        }
        if let Some(guest) = &req.guest_info
            && guest.name.trim().is_empty()
        {
            return Err(AppError::validation("guestInfo.name is required"));
        }

        let unit_thing = UnitRepository::parse_unit_id(&req.restaurant_unit_id)?;
        let unit = self
            .units
            .find_by_id(&req.restaurant_unit_id)
            .await?
            .ok_or_else(|| AppError::not_found("Restaurant unit"))?;
        if !unit.is_active {
            return Err(AppError::validation("Restaurant unit is not active"));
        }

        let user = match &req.user_id {
            Some(user_id) => {
                let user = self
                    .users
                    .find_by_id(user_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("User"))?;
                user.id
            }
            None => None,
        };

        if req.items.is_empty() {
            return Err(AppError::validation("Order must have at least one item"));
        }
        let items = self.resolve_items(&unit_thing, &req.items).await?;
        let total = Order::compute_total(&items);

        let split_count = req.split_count.unwrap_or(1);
        if split_count < 1 {
            return Err(AppError::validation("splitCount must be at least 1"));
        }

        let order = self
            .orders
            .create(NewOrder {
                is_guest: user.is_none(),
                guest_info: req.guest_info,
                user,
                restaurant_unit: unit_thing,
                items,
                total,
                table_number: req.table_number,
                order_type: req.order_type.unwrap_or_default(),
                observations: req.observations,
                split_count,
            })
            .await?;

        // 订单本体是事实来源；反向引用推送失败只记日志，不回滚
        if let Some(order_id) = order.id.clone() {
            if let Err(e) = self
                .units
                .add_order(order.restaurant_unit.clone(), order_id.clone())
                .await
            {
                tracing::warn!(order = %order_id, error = %e, "Unit back-reference push failed");
            }
            if let Some(user_id) = order.user.clone()
                && let Err(e) = self.users.add_order(user_id, order_id.clone()).await
            {
                tracing::warn!(order = %order_id, error = %e, "User back-reference push failed");
            }
        }

        tracing::info!(
            order = order.id.as_ref().map(|i| i.to_string()).unwrap_or_default(),
            total = order.total,
            "Order created"
        );
        Ok(order)
    }

    /// 查询单个订单
    pub async fn get_order(&self, id: &str) -> AppResult<Order> {
        self.orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Order"))
    }

    /// 门店订单列表 (可按状态过滤)
    pub async fn list_by_unit(
        &self,
        unit_id: &str,
        status: Option<OrderStatus>,
    ) -> AppResult<Vec<Order>> {
        let unit = UnitRepository::parse_unit_id(unit_id)?;
        Ok(self.orders.find_by_unit(unit, status).await?)
    }

    /// 用户订单列表
    pub async fn list_by_user(&self, user_id: &str) -> AppResult<Vec<Order>> {
        let user: RecordId = user_id
            .parse()
            .map_err(|_| AppError::validation(format!("Invalid user ID: {}", user_id)))?;
        Ok(self.orders.find_by_user(user).await?)
    }

    /// 部分更新订单
    ///
    /// - 终态订单拒绝一切修改 (422)
    /// - `items` 是追加语义，总额随之重算
    /// - `is_paid = true` 或 `status = completed` 都执行完整的
    ///   完成转换：status/is_paid/paid_at 一次写入
    /// - 其余状态变更需通过状态机校验
    pub async fn update_order(&self, id: &str, patch: OrderPatchRequest) -> AppResult<Order> {
        let order = self.get_order(id).await?;
        let thing = order
            .id
            .clone()
            .ok_or_else(|| AppError::internal("Order record missing ID"))?;

        if order.status.is_terminal() {
            return Err(AppError::business_rule(format!(
                "Order is {:?} and can no longer be modified",
                order.status
            )));
        }

        if patch.is_paid == Some(false) {
            return Err(AppError::validation("An order cannot be marked unpaid"));
        }

        // 追加订单行
        let (items, total) = match &patch.items {
            Some(inputs) if !inputs.is_empty() => {
                let new_items = self.resolve_items(&order.restaurant_unit, inputs).await?;
                let mut merged = order.items.clone();
                merged.extend(new_items);
                let total = Order::compute_total(&merged);
                (Some(merged), Some(total))
            }
            _ => (None, None),
        };

        // 完成转换：is_paid 与 status=completed 等价
        let completing =
            patch.is_paid == Some(true) || patch.status == Some(OrderStatus::Completed);

        let (status, is_paid, paid_at) = if completing {
            if !order.status.can_transition(OrderStatus::Completed) {
                return Err(AppError::business_rule(format!(
                    "Cannot complete an order in status {:?}",
                    order.status
                )));
            }
            (Some(OrderStatus::Completed), Some(true), Some(now_millis()))
        } else if let Some(next) = patch.status {
            if next == order.status {
                (None, None, None)
            } else if order.status.can_transition(next) {
                (Some(next), None, None)
            } else {
                return Err(AppError::business_rule(format!(
                    "Invalid status transition {:?} -> {:?}",
                    order.status, next
                )));
            }
        } else {
            (None, None, None)
        };

        let updated = self
            .orders
            .update(
                thing,
                OrderPatch {
                    items,
                    total,
                    status,
                    is_paid,
                    paid_at,
                    observations: patch.observations,
                },
            )
            .await?;
        Ok(updated)
    }

    /// 取消订单
    pub async fn cancel_order(&self, id: &str) -> AppResult<Order> {
        let order = self.get_order(id).await?;
        let thing = order
            .id
            .clone()
            .ok_or_else(|| AppError::internal("Order record missing ID"))?;

        if !order.status.can_transition(OrderStatus::Cancelled) {
            return Err(AppError::business_rule(format!(
                "Cannot cancel an order in status {:?}",
                order.status
            )));
        }

        let cancelled = self
            .orders
            .update(
                thing,
                OrderPatch {
                    status: Some(OrderStatus::Cancelled),
                    ..Default::default()
                },
            )
            .await?;
        Ok(cancelled)
    }

    /// 删除订单 (管理操作，硬删除)
    pub async fn delete_order(&self, id: &str) -> AppResult<()> {
        let order = self.get_order(id).await?;
        let thing = order
            .id
            .ok_or_else(|| AppError::internal("Order record missing ID"))?;
        self.orders.delete(thing.clone()).await?;

        // 反向引用摘除同样 best-effort
        if let Err(e) = self
            .units
            .remove_order(order.restaurant_unit.clone(), thing.clone())
            .await
        {
            tracing::warn!(order = %thing, error = %e, "Unit back-reference pull failed");
        }
        if let Some(user_id) = order.user
            && let Err(e) = self.users.remove_order(user_id, thing.clone()).await
        {
            tracing::warn!(order = %thing, error = %e, "User back-reference pull failed");
        }
        Ok(())
    }

    /// 把请求行解析为带价格快照的订单行
    ///
    /// 引用商品时以目录价为准；内联行要求 name + price。
    async fn resolve_items(
        &self,
        unit: &RecordId,
        inputs: &[OrderItemInput],
    ) -> AppResult<Vec<OrderItem>> {
        let mut items = Vec::with_capacity(inputs.len());
        for input in inputs {
            let quantity = input.quantity.unwrap_or(1);
            if quantity < 1 {
                return Err(AppError::validation("Item quantity must be at least 1"));
            }

            let item = match &input.product_id {
                Some(product_id) => {
                    let product = self
                        .products
                        .find_by_id(product_id)
                        .await?
                        .ok_or_else(|| AppError::not_found("Product"))?;
                    if product.restaurant_unit != *unit {
                        return Err(AppError::validation(
                            "Product belongs to a different unit",
                        ));
                    }
                    if !product.is_available {
                        return Err(AppError::validation(format!(
                            "Product '{}' is not available",
                            product.name
                        )));
                    }
                    OrderItem {
                        product: product.id,
                        name: product.name,
                        price: product.price,
                        quantity,
                    }
                }
                None => {
                    let name = input
                        .name
                        .clone()
                        .filter(|n| !n.is_empty())
                        .ok_or_else(|| {
                            AppError::validation("Item needs a productId or a name and price")
                        })?;
                    let price = input.price.ok_or_else(|| {
                        AppError::validation("Item needs a productId or a name and price")
                    })?;
                    if price < 0.0 {
                        return Err(AppError::validation("Item price cannot be negative"));
                    }
                    OrderItem {
                        product: None,
                        name,
                        price,
                        quantity,
                    }
                }
            };
            items.push(item);
        }
        Ok(items)
    }
}
