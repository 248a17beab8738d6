//! 身份解析
//!
//! JWT Claims 只是身份指针；每次请求都要回库核对
//! `session_token`，保证单会话语义 (新登录/登出即失效旧令牌)。
//!
//! 解析顺序与登录一致：餐厅管理员存储优先，其次用户存储。

use serde::Serialize;
use shared::roles::Role;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::Claims;
use crate::db::repository::{RestaurantRepository, UserRepository};
use crate::utils::{AppError, AppResult};

/// 主体类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalKind {
    /// 餐厅管理员 (租户所有者)
    Restaurant,
    /// 普通用户 (manager / attendant / client)
    User,
}

impl PrincipalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrincipalKind::Restaurant => "restaurant",
            PrincipalKind::User => "user",
        }
    }
}

/// 当前身份上下文 (从 JWT + 数据库解析)
///
/// 由认证中间件创建，注入到请求扩展
#[derive(Debug, Clone)]
pub struct Principal {
    /// 主体类型
    pub kind: PrincipalKind,
    /// 主体记录 ID
    pub id: RecordId,
    /// 邮箱
    pub email: String,
    /// 展示名称
    pub display_name: String,
    /// 用户角色 (餐厅管理员为 None)
    pub role: Option<Role>,
    /// 绑定的门店 (staff / client)
    pub restaurant_unit: Option<RecordId>,
}

impl Principal {
    /// 是否租户管理员上下文
    ///
    /// 餐厅管理员不携带 Role，对自己租户拥有全部权限
    pub fn is_admin_context(&self) -> bool {
        matches!(self.kind, PrincipalKind::Restaurant)
    }

    /// 是否员工 (管理员上下文或 staff 角色)
    pub fn is_staff(&self) -> bool {
        self.is_admin_context() || self.role.map(|r| r.is_staff()).unwrap_or(false)
    }

    /// 角色检查：管理员上下文恒通过，否则角色需在白名单内
    pub fn satisfies(&self, roles: &[Role]) -> bool {
        if self.is_admin_context() {
            return true;
        }
        self.role.map(|r| roles.contains(&r)).unwrap_or(false)
    }

    /// 主体 ID 的字符串形式 ("table:id")
    pub fn id_string(&self) -> String {
        self.id.to_string()
    }
}

/// 解析请求身份
///
/// 1. 按 claims.kind 选择存储 (餐厅优先与登录一致)
/// 2. 记录必须存在
/// 3. 记录上的 `session_token` 必须与本次请求的令牌严格相等
///
/// 任一步失败都返回 401，不区分原因以免泄露账号状态。
pub async fn resolve_principal(
    db: &Surreal<Db>,
    claims: &Claims,
    token: &str,
) -> AppResult<Principal> {
    match claims.kind.as_str() {
        "restaurant" => {
            let repo = RestaurantRepository::new(db.clone());
            let restaurant = repo
                .find_by_id(&claims.sub)
                .await
                .map_err(|_| AppError::InvalidToken)?
                .ok_or(AppError::InvalidToken)?;

            if restaurant.session_token.as_deref() != Some(token) {
                return Err(AppError::InvalidToken);
            }

            let id = restaurant.id.ok_or(AppError::InvalidToken)?;
            Ok(Principal {
                kind: PrincipalKind::Restaurant,
                id,
                email: restaurant.email,
                display_name: restaurant.name,
                role: None,
                restaurant_unit: None,
            })
        }
        "user" => {
            let repo = UserRepository::new(db.clone());
            let user = repo
                .find_by_id(&claims.sub)
                .await
                .map_err(|_| AppError::InvalidToken)?
                .ok_or(AppError::InvalidToken)?;

            if user.session_token.as_deref() != Some(token) {
                return Err(AppError::InvalidToken);
            }

            let id = user.id.ok_or(AppError::InvalidToken)?;
            Ok(Principal {
                kind: PrincipalKind::User,
                id,
                email: user.email,
                display_name: format!("{} {}", user.first_name, user.last_name),
                role: Some(user.role),
                restaurant_unit: user.restaurant_unit,
            })
        }
        _ => Err(AppError::InvalidToken),
    }
}
