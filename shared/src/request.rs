//! API request payloads
//!
//! All payloads are validated with `validator` at the handler boundary
//! before any business logic runs.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::{Address, GuestInfo, OrderStatus, OrderType};

/// Unified login request — matched against restaurant admins first, then users
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Restaurant (tenant) registration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRestaurantRequest {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(length(min = 1, message = "CPF is required"))]
    pub cpf: String,
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[validate(length(min = 1, message = "Restaurant name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "CNPJ is required"))]
    pub cnpj: String,
    #[serde(default)]
    pub social_name: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub specialty: Option<String>,
}

/// Client self-registration (optionally bound to the unit they scanned in at)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterClientRequest {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "CPF is required"))]
    pub cpf: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub restaurant_unit_id: Option<String>,
}

/// Staff registration (manager or attendant), performed by a privileged caller
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterStaffRequest {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "CPF is required"))]
    pub cpf: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[validate(length(min = 1, message = "Restaurant unit is required"))]
    pub restaurant_unit_id: String,
}

/// One order line as submitted by the client
///
/// Either `product_id` (server re-prices from the catalog) or an inline
/// `name` + `price` snapshot must be provided.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub quantity: Option<i64>,
}

/// Order placement (registered user or guest)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub guest_info: Option<GuestInfo>,
    pub restaurant_unit_id: String,
    pub items: Vec<OrderItemInput>,
    #[serde(default)]
    pub table_number: Option<i64>,
    #[serde(default)]
    pub order_type: Option<OrderType>,
    #[serde(default)]
    pub observations: Option<String>,
    #[serde(default)]
    pub split_count: Option<i64>,
}

/// Partial order update
///
/// `items` are appended, never replaced. `is_paid = true` (or
/// `status = completed`) performs the full completion transition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPatchRequest {
    #[serde(default)]
    pub items: Option<Vec<OrderItemInput>>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub is_paid: Option<bool>,
    #[serde(default)]
    pub observations: Option<String>,
}

/// Ask for the bill for a whole table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub restaurant_unit_id: String,
    pub table_number: i64,
    #[serde(default)]
    pub split_count: Option<i64>,
}

/// Settle the bill for a whole table
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProcessPaymentRequest {
    pub restaurant_unit_id: String,
    pub table_number: i64,
    #[validate(length(min = 1, message = "Payment method is required"))]
    pub payment_method: String,
    /// Defaults to the authenticated staff principal when omitted
    #[serde(default)]
    pub staff_id: Option<String>,
    #[serde(default)]
    pub split_count: Option<i64>,
}

/// Unit creation under the caller's restaurant
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UnitCreateRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
    #[validate(length(min = 1, message = "Contact is required"))]
    pub contact: String,
    #[serde(default)]
    pub manager: Option<String>,
}

/// Partial unit update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitUpdateRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub manager: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Attach an existing attendant account to a unit
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddAttendantRequest {
    pub user_id: String,
}

/// Partial restaurant update (ownership-checked)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantUpdateRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cnpj: Option<String>,
    #[serde(default)]
    pub social_name: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}
