//! Order API 模块
//!
//! 下单、单个订单和桌台账单的读取、请求结账都是公开路由
//! (访客扫码即可使用)；修改和删除要求认证 (处理器内再做
//! 租户边界检查)；收款要求 management 角色。

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};
use shared::roles::Role;

use crate::auth::{require_auth, require_role};
use crate::core::ServerState;

pub fn router(state: ServerState) -> Router<ServerState> {
    Router::new().nest("/api/orders", routes(state))
}

fn routes(state: ServerState) -> Router<ServerState> {
    let public = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", get(handler::get_by_id))
        .route("/table/{unit_id}/{table}", get(handler::table_status))
        .route("/request-checkout", post(handler::request_checkout));

    let authed = Router::new()
        .route("/my", get(handler::list_my))
        .route("/{id}", patch(handler::update).delete(handler::delete))
        .route("/{id}/cancel", post(handler::cancel))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let management = Router::new()
        .route("/process-payment", post(handler::process_payment))
        .layer(middleware::from_fn(require_role(Role::MANAGEMENT)))
        .layer(middleware::from_fn_with_state(state, require_auth));

    public.merge(authed).merge(management)
}
