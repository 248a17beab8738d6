//! Restaurant Model
//!
//! 租户记录：餐厅本体 + 管理员账号合一。
//! 管理员的登录凭证直接挂在餐厅记录上，
//! `session_token` 保存当前唯一有效会话。

use serde::{Deserialize, Serialize};
use shared::types::Address;
use surrealdb::RecordId;

use super::serde_helpers;

/// Restaurant ID type
pub type RestaurantId = RecordId;

/// Restaurant model matching SurrealDB schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Restaurant {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RestaurantId>,

    // 管理员个人信息
    pub first_name: String,
    pub last_name: String,
    pub cpf: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,

    // 登录凭证
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(skip_serializing)]
    pub salt: String,
    #[serde(default, skip_serializing)]
    pub session_token: Option<String>,

    // 餐厅信息
    pub name: String,
    pub cnpj: String,
    #[serde(default)]
    pub social_name: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub specialty: Option<String>,

    /// 下属门店
    #[serde(default, with = "serde_helpers::vec_record_id")]
    pub units: Vec<RecordId>,

    pub created_at: i64,
    pub updated_at: i64,
}
