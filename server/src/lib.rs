//! Comanda Server - 多租户餐厅点餐与结账平台
//!
//! # 模块结构
//!
//! ```text
//! server/src/
//! ├── core/          # 配置、状态、HTTP 服务器
//! ├── auth/          # 凭证哈希、JWT、身份解析、角色门禁
//! ├── db/            # 嵌入式 SurrealDB、模型、仓储层
//! ├── orders/        # 订单生命周期与桌台结账协调器
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 错误类型、日志、时间工具
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod orders;
pub mod utils;

// Re-export 公共类型
pub use auth::{CredentialService, JwtService, Principal};
pub use core::{Config, Server, ServerState};
pub use orders::{CheckoutCoordinator, OrderLifecycle};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::init_logger_with_file;

// Security logging macro - 结构化安全事件日志
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::warn!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}
