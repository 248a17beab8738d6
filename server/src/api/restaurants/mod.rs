//! Restaurant API 模块
//!
//! 公开目录 (列表、按 ID / slug 查询) + 租户自管理接口
//! (要求餐厅管理员会话)。

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::require_auth;
use crate::core::ServerState;

pub fn router(state: ServerState) -> Router<ServerState> {
    Router::new().nest("/api/restaurants", routes(state))
}

fn routes(state: ServerState) -> Router<ServerState> {
    let public = Router::new()
        .route("/", get(handler::list_all))
        .route("/slug/{slug}", get(handler::get_by_slug))
        .route("/{id}", get(handler::get_by_id));

    let tenant = Router::new()
        .route(
            "/me",
            get(handler::me)
                .patch(handler::update)
                .delete(handler::delete),
        )
        .layer(middleware::from_fn_with_state(state, require_auth));

    public.merge(tenant)
}
