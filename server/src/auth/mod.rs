//! 认证授权模块
//!
//! 提供凭证哈希、JWT 认证、身份解析和中间件：
//! - [`CredentialService`] - HMAC-SHA256 凭证哈希
//! - [`JwtService`] - JWT 令牌服务
//! - [`Principal`] - 当前身份上下文 (餐厅管理员或用户)
//! - [`require_auth`] - 认证中间件 (含会话令牌校验)
//! - [`require_role`] - 角色检查中间件

pub mod credentials;
pub mod jwt;
pub mod middleware;
pub mod principal;

pub use credentials::CredentialService;
pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
pub use middleware::{require_auth, require_role, require_staff};
pub use principal::{Principal, PrincipalKind, resolve_principal};
