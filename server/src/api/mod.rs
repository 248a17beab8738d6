//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 登录、登出、注册、会话校验
//! - [`restaurants`] - 餐厅 (租户) 管理
//! - [`units`] - 门店管理 (含矩阵投影)、商品目录
//! - [`orders`] - 订单与桌台结账

pub mod auth;
pub mod health;
pub mod orders;
pub mod restaurants;
pub mod units;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::core::ServerState;

/// 组装完整路由树
pub fn create_router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(auth::router(state.clone()))
        .merge(restaurants::router(state.clone()))
        .merge(units::router(state.clone()))
        .merge(orders::router(state.clone()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
