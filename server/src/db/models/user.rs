//! User Model
//!
//! 普通用户：manager / attendant / client。
//! 餐厅管理员存储在 restaurants 表，不在这里。

use serde::{Deserialize, Serialize};
use shared::roles::Role;
use surrealdb::RecordId;

use super::serde_helpers;

/// User ID type
pub type UserId = RecordId;

/// User model matching SurrealDB schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<UserId>,

    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub cpf: String,
    #[serde(default)]
    pub phone: Option<String>,

    // 登录凭证
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(skip_serializing)]
    pub salt: String,
    #[serde(default, skip_serializing)]
    pub session_token: Option<String>,

    pub role: Role,

    /// 绑定门店 (staff 必填，client 可选)
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub restaurant_unit: Option<RecordId>,

    /// 下过的订单 (best-effort 反向引用，读路径不依赖它)
    #[serde(default, with = "serde_helpers::vec_record_id")]
    pub orders: Vec<RecordId>,

    pub created_at: i64,
    pub updated_at: i64,
}
