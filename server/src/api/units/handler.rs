//! Restaurant Unit Handlers
//!
//! 列表里餐厅本体以 `is_matrix = true` 投影为只读伪门店；
//! 写路径通过 `UnitRepository::parse_unit_id` 拒绝矩阵目标。

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use validator::Validate;

use crate::AppError;
use crate::auth::{Principal, PrincipalKind};
use crate::core::ServerState;
use crate::db::models::{Order, Product, ProductCreate, Restaurant, RestaurantUnit};
use crate::db::repository::{
    ProductRepository, RestaurantRepository, UnitRepository, UserRepository,
};
use crate::orders::OrderLifecycle;
use shared::request::{AddAttendantRequest, UnitCreateRequest, UnitUpdateRequest};
use shared::response::{MessageResponse, UnitView};
use shared::roles::Role;
use shared::types::{Address, OrderStatus};

/// List units visible to the caller
///
/// 管理员：矩阵伪门店 + 全部门店；员工/顾客：绑定的门店。
pub async fn list(
    State(state): State<ServerState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<UnitView>>, AppError> {
    let db = state.get_db();
    let units = UnitRepository::new(db.clone());

    match principal.kind {
        PrincipalKind::Restaurant => {
            let restaurant = RestaurantRepository::new(db)
                .find_by_id(&principal.id_string())
                .await?
                .ok_or_else(|| AppError::not_found("Restaurant"))?;

            let mut views = vec![matrix_view(&restaurant)];
            for unit in units.find_by_restaurant(principal.id.clone()).await? {
                views.push(to_view(unit));
            }
            Ok(Json(views))
        }
        PrincipalKind::User => {
            let mut views = Vec::new();
            if let Some(unit_id) = &principal.restaurant_unit
                && let Some(unit) = units.find_by_id(&unit_id.to_string()).await?
            {
                views.push(to_view(unit));
            }
            Ok(Json(views))
        }
    }
}

/// Create a unit under the caller's restaurant (tenant admin only)
pub async fn create(
    State(state): State<ServerState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<UnitCreateRequest>,
) -> Result<Json<UnitView>, AppError> {
    if !principal.is_admin_context() {
        return Err(AppError::forbidden("Only the tenant admin can create units"));
    }
    req.validate()?;

    let db = state.get_db();
    let restaurants = RestaurantRepository::new(db.clone());
    let restaurant = restaurants
        .find_by_id(&principal.id_string())
        .await?
        .ok_or_else(|| AppError::not_found("Restaurant"))?;

    let name = req
        .name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| format!("{} - {}", restaurant.name, req.address));

    let unit = UnitRepository::new(db)
        .create(
            principal.id.clone(),
            name,
            req.address,
            req.contact,
            req.manager.unwrap_or_default(),
        )
        .await?;

    if let Some(unit_id) = unit.id.clone() {
        restaurants.add_unit(principal.id.clone(), unit_id).await?;
    }

    tracing::info!(
        unit = unit.id.as_ref().map(|i| i.to_string()).unwrap_or_default(),
        "Unit created"
    );
    Ok(Json(to_view(unit)))
}

/// Fetch one unit (the matrix id resolves to the read-only projection)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<UnitView>, AppError> {
    let db = state.get_db();

    // 矩阵伪门店：读允许，仅限本租户管理员
    if let Ok(thing) = id.parse::<surrealdb::RecordId>()
        && thing.table() == "restaurants"
    {
        if !principal.is_admin_context() || principal.id != thing {
            return Err(AppError::forbidden("The matrix unit is private"));
        }
        let restaurant = RestaurantRepository::new(db)
            .find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::not_found("Restaurant"))?;
        return Ok(Json(matrix_view(&restaurant)));
    }

    let unit = UnitRepository::new(db)
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Restaurant unit"))?;

    // 停用门店只对租户和本店员工可见
    let owner = principal.is_admin_context() && unit.restaurant == principal.id;
    let bound = principal.restaurant_unit.as_ref() == unit.id.as_ref();
    if !unit.is_active && !owner && !bound {
        return Err(AppError::not_found("Restaurant unit"));
    }

    Ok(Json(to_view(unit)))
}

/// Partial unit update (tenant admin or the unit's manager)
pub async fn update(
    State(state): State<ServerState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(req): Json<UnitUpdateRequest>,
) -> Result<Json<UnitView>, AppError> {
    let db = state.get_db();
    let units = UnitRepository::new(db);

    let unit_thing = UnitRepository::parse_unit_id(&id)?;
    let unit = units
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Restaurant unit"))?;
    ensure_manage_access(&principal, &unit, &unit_thing)?;

    let updated = units.update(unit_thing, req).await?;
    Ok(Json(to_view(updated)))
}

/// Delete a unit (tenant admin only)
pub async fn delete(
    State(state): State<ServerState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    if !principal.is_admin_context() {
        return Err(AppError::forbidden("Only the tenant admin can delete units"));
    }

    let db = state.get_db();
    let units = UnitRepository::new(db.clone());

    let unit_thing = UnitRepository::parse_unit_id(&id)?;
    let unit = units
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Restaurant unit"))?;
    if unit.restaurant != principal.id {
        return Err(AppError::forbidden("Unit belongs to another restaurant"));
    }

    // 解绑员工、摘除餐厅引用，订单保留
    UserRepository::new(db).unbind_unit(unit_thing.clone()).await?;
    RestaurantRepository::new(state.get_db())
        .remove_unit(principal.id.clone(), unit_thing.clone())
        .await?;
    units.delete(unit_thing).await?;

    tracing::info!(unit = %id, "Unit deleted");
    Ok(Json(MessageResponse::new("Unit deleted")))
}

/// Attach an existing attendant account to a unit
pub async fn add_attendant(
    State(state): State<ServerState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(req): Json<AddAttendantRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let db = state.get_db();
    let units = UnitRepository::new(db.clone());
    let users = UserRepository::new(db);

    let unit_thing = UnitRepository::parse_unit_id(&id)?;
    let unit = units
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Restaurant unit"))?;
    ensure_manage_access(&principal, &unit, &unit_thing)?;

    let user = users
        .find_by_id(&req.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    if user.role != Role::Attendant {
        return Err(AppError::validation("User is not an attendant"));
    }
    let user_thing = user
        .id
        .ok_or_else(|| AppError::internal("User record missing ID"))?;

    users
        .set_unit(user_thing.clone(), Some(unit_thing.clone()))
        .await?;
    units.add_attendant(unit_thing, user_thing).await?;

    Ok(Json(MessageResponse::new("Attendant added")))
}

/// Detach an attendant from a unit
pub async fn remove_attendant(
    State(state): State<ServerState>,
    Extension(principal): Extension<Principal>,
    Path((id, user_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, AppError> {
    let db = state.get_db();
    let units = UnitRepository::new(db.clone());
    let users = UserRepository::new(db);

    let unit_thing = UnitRepository::parse_unit_id(&id)?;
    let unit = units
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Restaurant unit"))?;
    ensure_manage_access(&principal, &unit, &unit_thing)?;

    let user = users
        .find_by_id(&user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    let user_thing = user
        .id
        .ok_or_else(|| AppError::internal("User record missing ID"))?;

    units
        .remove_attendant(unit_thing, user_thing.clone())
        .await?;
    users.set_unit(user_thing, None).await?;

    Ok(Json(MessageResponse::new("Attendant removed")))
}

#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

/// Order board of a unit, optionally filtered by status (staff)
pub async fn list_orders(
    State(state): State<ServerState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<Vec<Order>>, AppError> {
    let unit_thing = UnitRepository::parse_unit_id(&id)?;
    let unit = UnitRepository::new(state.get_db())
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Restaurant unit"))?;
    ensure_manage_access(&principal, &unit, &unit_thing)?;

    let orders = OrderLifecycle::new(state.get_db())
        .list_by_unit(&id, query.status)
        .await?;
    Ok(Json(orders))
}

/// Public product catalog for an active unit
pub async fn list_products(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Product>>, AppError> {
    let db = state.get_db();
    let unit_thing = UnitRepository::parse_unit_id(&id)?;
    let unit = UnitRepository::new(db.clone())
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Restaurant unit"))?;
    if !unit.is_active {
        return Err(AppError::not_found("Restaurant unit"));
    }

    let products = ProductRepository::new(db).find_by_unit(unit_thing).await?;
    Ok(Json(products))
}

/// Add a product to a unit's catalog
pub async fn create_product(
    State(state): State<ServerState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(req): Json<ProductCreate>,
) -> Result<Json<Product>, AppError> {
    if req.name.is_empty() {
        return Err(AppError::validation("Product name is required"));
    }
    if req.price < 0.0 {
        return Err(AppError::validation("Product price cannot be negative"));
    }

    let db = state.get_db();
    let units = UnitRepository::new(db.clone());

    let unit_thing = UnitRepository::parse_unit_id(&id)?;
    let unit = units
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Restaurant unit"))?;
    ensure_manage_access(&principal, &unit, &unit_thing)?;

    let product = ProductRepository::new(db).create(unit_thing, req).await?;
    Ok(Json(product))
}

/// Remove a product from a unit's catalog
pub async fn delete_product(
    State(state): State<ServerState>,
    Extension(principal): Extension<Principal>,
    Path((id, product_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, AppError> {
    let db = state.get_db();
    let units = UnitRepository::new(db.clone());

    let unit_thing = UnitRepository::parse_unit_id(&id)?;
    let unit = units
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Restaurant unit"))?;
    ensure_manage_access(&principal, &unit, &unit_thing)?;

    let products = ProductRepository::new(db);
    let product = products
        .find_by_id(&product_id)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;
    if product.restaurant_unit != unit_thing {
        return Err(AppError::validation("Product belongs to a different unit"));
    }
    let product_thing = product
        .id
        .ok_or_else(|| AppError::internal("Product record missing ID"))?;

    products.delete(product_thing).await?;
    tracing::info!(unit = %id, product = %product_id, "Product deleted");
    Ok(Json(MessageResponse::new("Product deleted")))
}

// ========== Helpers ==========

/// 租户边界：管理员须拥有该门店，经理须绑定在该门店
fn ensure_manage_access(
    principal: &Principal,
    unit: &RestaurantUnit,
    unit_thing: &surrealdb::RecordId,
) -> Result<(), AppError> {
    match principal.kind {
        PrincipalKind::Restaurant => {
            if unit.restaurant != principal.id {
                return Err(AppError::forbidden("Unit belongs to another restaurant"));
            }
        }
        PrincipalKind::User => {
            if principal.restaurant_unit.as_ref() != Some(unit_thing) {
                return Err(AppError::forbidden("You can only manage your own unit"));
            }
        }
    }
    Ok(())
}

fn to_view(unit: RestaurantUnit) -> UnitView {
    UnitView {
        id: unit.id.map(|i| i.to_string()).unwrap_or_default(),
        name: unit.name,
        address: unit.address,
        contact: unit.contact,
        manager: unit.manager,
        is_active: unit.is_active,
        is_matrix: false,
        attendants: unit.attendants.iter().map(|a| a.to_string()).collect(),
    }
}

/// 餐厅本体投影为只读伪门店
fn matrix_view(restaurant: &Restaurant) -> UnitView {
    UnitView {
        id: restaurant.id.as_ref().map(|i| i.to_string()).unwrap_or_default(),
        name: restaurant.name.clone(),
        address: format_address(restaurant.address.as_ref()),
        contact: restaurant
            .phone
            .clone()
            .unwrap_or_else(|| restaurant.email.clone()),
        manager: format!("{} {}", restaurant.first_name, restaurant.last_name),
        is_active: true,
        is_matrix: true,
        attendants: Vec::new(),
    }
}

fn format_address(address: Option<&Address>) -> String {
    match address {
        Some(a) => format!("{}, {} - {}", a.street, a.number, a.zip_code),
        None => String::new(),
    }
}
