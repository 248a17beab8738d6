//! Order Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use validator::Validate;

use crate::AppError;
use crate::auth::{Principal, PrincipalKind};
use crate::core::ServerState;
use crate::db::models::Order;
use crate::db::repository::UnitRepository;
use crate::orders::{CheckoutCoordinator, OrderLifecycle};
use shared::request::{CheckoutRequest, CreateOrderRequest, OrderPatchRequest, ProcessPaymentRequest};
use shared::response::{MessageResponse, PaymentSummary, TableOrdersResponse};

/// Place an order (registered user or guest, no auth required)
pub async fn create(
    State(state): State<ServerState>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<Json<Order>, AppError> {
    let order = OrderLifecycle::new(state.get_db()).create_order(req).await?;
    Ok(Json(order))
}

/// Orders placed by the calling user
pub async fn list_my(
    State(state): State<ServerState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<Order>>, AppError> {
    if principal.kind != PrincipalKind::User {
        return Err(AppError::validation("Restaurant admins do not place orders"));
    }
    let orders = OrderLifecycle::new(state.get_db())
        .list_by_user(&principal.id_string())
        .await?;
    Ok(Json(orders))
}

/// One order (public — guests track their orders by id)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Order>, AppError> {
    let order = OrderLifecycle::new(state.get_db()).get_order(&id).await?;
    Ok(Json(order))
}

/// Partial order update (staff of the order's unit)
pub async fn update(
    State(state): State<ServerState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(req): Json<OrderPatchRequest>,
) -> Result<Json<Order>, AppError> {
    let lifecycle = OrderLifecycle::new(state.get_db());
    let order = lifecycle.get_order(&id).await?;
    ensure_unit_staff(&state, &principal, &order.restaurant_unit).await?;

    let updated = lifecycle.update_order(&id, req).await?;
    Ok(Json(updated))
}

/// Cancel an order (its owner or staff of its unit)
pub async fn cancel(
    State(state): State<ServerState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<Order>, AppError> {
    let lifecycle = OrderLifecycle::new(state.get_db());
    let order = lifecycle.get_order(&id).await?;

    let owner = order.user.as_ref() == Some(&principal.id);
    if !owner {
        ensure_unit_staff(&state, &principal, &order.restaurant_unit).await?;
    }

    let cancelled = lifecycle.cancel_order(&id).await?;
    Ok(Json(cancelled))
}

/// Hard delete an order (staff of the order's unit)
pub async fn delete(
    State(state): State<ServerState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let lifecycle = OrderLifecycle::new(state.get_db());
    let order = lifecycle.get_order(&id).await?;
    ensure_unit_staff(&state, &principal, &order.restaurant_unit).await?;

    lifecycle.delete_order(&id).await?;
    Ok(Json(MessageResponse::new("Order deleted")))
}

/// Bill of a table plus its derived summary (public — the table's QR code
/// shows the running bill)
pub async fn table_status(
    State(state): State<ServerState>,
    Path((unit_id, table)): Path<(String, i64)>,
) -> Result<Json<TableOrdersResponse<Order>>, AppError> {
    let status = CheckoutCoordinator::new(state.get_db())
        .table_status(&unit_id, table)
        .await?;
    Ok(Json(status))
}

/// Request the bill for a whole table (no auth required)
pub async fn request_checkout(
    State(state): State<ServerState>,
    Json(req): Json<CheckoutRequest>,
) -> Result<Json<TableOrdersResponse<Order>>, AppError> {
    let response = CheckoutCoordinator::new(state.get_db())
        .request_checkout(req)
        .await?;
    Ok(Json(response))
}

/// Settle the bill for a whole table (management)
pub async fn process_payment(
    State(state): State<ServerState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<ProcessPaymentRequest>,
) -> Result<Json<PaymentSummary>, AppError> {
    req.validate()?;

    let unit_thing = UnitRepository::parse_unit_id(&req.restaurant_unit_id)?;
    ensure_unit_staff(&state, &principal, &unit_thing).await?;

    // 未显式指定收款人时记认证员工
    let staff_id = req.staff_id.clone().or_else(|| match principal.kind {
        PrincipalKind::User => Some(principal.id_string()),
        PrincipalKind::Restaurant => None,
    });

    let summary = CheckoutCoordinator::new(state.get_db())
        .process_payment(req, staff_id)
        .await?;
    Ok(Json(summary))
}

// ========== Helpers ==========

/// 员工租户边界：管理员须拥有该门店，员工须绑定在该门店
async fn ensure_unit_staff(
    state: &ServerState,
    principal: &Principal,
    unit_thing: &surrealdb::RecordId,
) -> Result<(), AppError> {
    match principal.kind {
        PrincipalKind::Restaurant => {
            let unit = UnitRepository::new(state.get_db())
                .find_by_id(&unit_thing.to_string())
                .await?
                .ok_or_else(|| AppError::not_found("Restaurant unit"))?;
            if unit.restaurant != principal.id {
                return Err(AppError::forbidden("Unit belongs to another restaurant"));
            }
        }
        PrincipalKind::User => {
            if !principal.is_staff() {
                return Err(AppError::forbidden("Staff access required"));
            }
            if principal.restaurant_unit.as_ref() != Some(unit_thing) {
                return Err(AppError::forbidden("You can only access your own unit"));
            }
        }
    }
    Ok(())
}
