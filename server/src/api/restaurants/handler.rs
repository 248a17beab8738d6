//! Restaurant Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::AppError;
use crate::auth::Principal;
use crate::core::ServerState;
use crate::db::models::Restaurant;
use crate::db::repository::RestaurantRepository;
use shared::request::RestaurantUpdateRequest;
use shared::response::MessageResponse;

fn require_tenant(principal: &Principal) -> Result<(), AppError> {
    if !principal.is_admin_context() {
        return Err(AppError::forbidden(
            "Only the restaurant admin can manage the restaurant",
        ));
    }
    Ok(())
}

/// Public restaurant directory
pub async fn list_all(
    State(state): State<ServerState>,
) -> Result<Json<Vec<Restaurant>>, AppError> {
    let restaurants = RestaurantRepository::new(state.get_db()).find_all().await?;
    Ok(Json(restaurants))
}

/// One restaurant by id (public)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Restaurant>, AppError> {
    let restaurant = RestaurantRepository::new(state.get_db())
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Restaurant"))?;
    Ok(Json(restaurant))
}

/// One restaurant by name slug, dash- and case-insensitive (public)
pub async fn get_by_slug(
    State(state): State<ServerState>,
    Path(slug): Path<String>,
) -> Result<Json<Restaurant>, AppError> {
    let wanted = normalize_slug(&slug);
    let restaurant = RestaurantRepository::new(state.get_db())
        .find_all()
        .await?
        .into_iter()
        .find(|r| normalize_slug(&r.name) == wanted)
        .ok_or_else(|| AppError::not_found("Restaurant"))?;
    Ok(Json(restaurant))
}

/// "Cantina-da-Ana" 与 "cantina da ana" 视为同一个 slug
fn normalize_slug(value: &str) -> String {
    value
        .chars()
        .filter_map(|c| match c {
            '-' | ' ' => None,
            c => Some(c.to_ascii_lowercase()),
        })
        .collect()
}

/// Current tenant profile
pub async fn me(
    State(state): State<ServerState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Restaurant>, AppError> {
    require_tenant(&principal)?;

    let restaurant = RestaurantRepository::new(state.get_db())
        .find_by_id(&principal.id_string())
        .await?
        .ok_or_else(|| AppError::not_found("Restaurant"))?;

    Ok(Json(restaurant))
}

/// Partial tenant profile update
pub async fn update(
    State(state): State<ServerState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<RestaurantUpdateRequest>,
) -> Result<Json<Restaurant>, AppError> {
    require_tenant(&principal)?;

    let updated = RestaurantRepository::new(state.get_db())
        .update(principal.id.clone(), req)
        .await?;

    Ok(Json(updated))
}

/// Delete the tenant with cascade
///
/// 门店硬删除，员工解除绑定，历史订单保留。
pub async fn delete(
    State(state): State<ServerState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<MessageResponse>, AppError> {
    require_tenant(&principal)?;

    RestaurantRepository::new(state.get_db())
        .delete_cascade(principal.id.clone())
        .await?;

    tracing::info!(restaurant = %principal.id_string(), "Restaurant deleted");
    Ok(Json(MessageResponse::new("Restaurant deleted")))
}

#[cfg(test)]
mod tests {
    use super::normalize_slug;

    #[test]
    fn test_slug_is_dash_and_case_insensitive() {
        assert_eq!(normalize_slug("Cantina-da-Ana"), normalize_slug("cantina da ana"));
        assert_ne!(normalize_slug("cantina-da-ana"), normalize_slug("cantina-do-ze"));
    }
}
