//! 时间工具函数
//!
//! 所有持久化时间戳统一为 `i64` Unix millis，
//! repository 层和模型层不做时区换算。

use chrono::Utc;

/// 当前 Unix 时间戳 (毫秒)
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
