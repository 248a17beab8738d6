//! Restaurant Unit Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// Unit ID type
pub type UnitId = RecordId;

/// Restaurant unit (门店) matching SurrealDB schema
///
/// `checkout_requests` 是请求结账的桌号集合：
/// 客户请求结账时加入 (幂等)，员工收款后移除。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantUnit {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<UnitId>,

    /// 所属餐厅 (租户)
    #[serde(with = "serde_helpers::record_id")]
    pub restaurant: RecordId,

    pub name: String,
    pub address: String,
    pub contact: String,
    #[serde(default)]
    pub manager: String,

    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,

    /// 绑定到本门店的服务员
    #[serde(default, with = "serde_helpers::vec_record_id")]
    pub attendants: Vec<RecordId>,

    /// 请求结账的桌号集合
    #[serde(default)]
    pub checkout_requests: Vec<i64>,

    /// 本店订单 (best-effort 反向引用，读路径不依赖它)
    #[serde(default, with = "serde_helpers::vec_record_id")]
    pub orders: Vec<RecordId>,

    pub created_at: i64,
    pub updated_at: i64,
}

fn default_true() -> bool {
    true
}
