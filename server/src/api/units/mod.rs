//! Restaurant Unit API 模块
//!
//! 门店管理 (含矩阵投影) 和商品目录。
//! 商品目录公开 (顾客扫码浏览)；其余路由需要认证，
//! 写操作需要 management 角色或租户管理员。

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};
use shared::roles::Role;

use crate::auth::{require_auth, require_role, require_staff};
use crate::core::ServerState;

pub fn router(state: ServerState) -> Router<ServerState> {
    Router::new().nest("/api/units", routes(state))
}

fn routes(state: ServerState) -> Router<ServerState> {
    let public = Router::new().route("/{id}/products", get(handler::list_products));

    let authed = Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id).delete(handler::delete))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let staff = Router::new()
        .route("/{id}/orders", get(handler::list_orders))
        .layer(middleware::from_fn(require_staff))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let management = Router::new()
        .route("/{id}", axum::routing::patch(handler::update))
        .route("/{id}/attendants", post(handler::add_attendant))
        .route(
            "/{id}/attendants/{user_id}",
            delete(handler::remove_attendant),
        )
        .route("/{id}/products", post(handler::create_product))
        .route(
            "/{id}/products/{product_id}",
            delete(handler::delete_product),
        )
        .layer(middleware::from_fn(require_role(Role::MANAGEMENT)))
        .layer(middleware::from_fn_with_state(state, require_auth));

    public.merge(authed).merge(staff).merge(management)
}
