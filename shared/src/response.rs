//! API response payloads

use serde::{Deserialize, Serialize};

use crate::roles::Role;

/// Simple confirmation message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// The authenticated actor as seen by clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalInfo {
    pub id: String,
    /// "restaurant" or "user"
    pub kind: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant_id: Option<String>,
}

/// Minimal unit projection returned alongside login/validate responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitSummary {
    pub id: String,
    pub name: String,
}

/// Login / registration result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub principal: PrincipalInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<UnitSummary>,
}

/// A restaurant unit as listed to clients
///
/// `is_matrix` marks the restaurant's own record projected as a read-only
/// pseudo-unit; mutations against it are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitView {
    pub id: String,
    pub name: String,
    pub address: String,
    pub contact: String,
    pub manager: String,
    pub is_active: bool,
    pub is_matrix: bool,
    pub attendants: Vec<String>,
}

/// Derived state of all open orders on a table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSummary {
    pub total_amount: f64,
    pub order_count: usize,
    pub item_count: i64,
    pub payment_requested: bool,
    pub all_paid: bool,
    pub split_count: i64,
    pub amount_per_person: f64,
}

/// Orders for a table plus the derived summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableOrdersResponse<T> {
    pub orders: Vec<T>,
    pub summary: TableSummary,
}

/// Result of settling a table's bill
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
    pub orders_processed: usize,
    pub total: f64,
    pub split_count: i64,
    pub amount_per_person: f64,
    pub processed_at: i64,
}
