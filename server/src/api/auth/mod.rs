//! Auth API 模块
//!
//! 登录 / 注册是公开路由；登出、会话校验和员工注册
//! 走认证 + 角色中间件。

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use shared::roles::Role;

use crate::auth::{require_auth, require_role};
use crate::core::ServerState;

pub fn router(state: ServerState) -> Router<ServerState> {
    Router::new().nest("/api/auth", routes(state))
}

fn routes(state: ServerState) -> Router<ServerState> {
    let public = Router::new()
        .route("/login", post(handler::login))
        .route("/register/restaurant", post(handler::register_restaurant))
        .route("/register/client", post(handler::register_client));

    let authed = Router::new()
        .route("/logout", post(handler::logout))
        .route("/validate", get(handler::validate))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let management = Router::new()
        .route("/register/attendant", post(handler::register_attendant))
        .route("/register/manager", post(handler::register_manager))
        .layer(middleware::from_fn(require_role(Role::MANAGEMENT)))
        .layer(middleware::from_fn_with_state(state, require_auth));

    public.merge(authed).merge(management)
}
