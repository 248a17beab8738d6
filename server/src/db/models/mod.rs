//! Database Models
//!
//! SurrealDB 持久化模型。ID 统一使用 `RecordId`，
//! 序列化为 "table:id" 字符串 (serde_helpers)。

pub mod order;
pub mod product;
pub mod restaurant;
pub mod serde_helpers;
pub mod unit;
pub mod user;

pub use order::{Order, OrderItem, OrderMetadata};
pub use product::{Product, ProductCreate};
pub use restaurant::Restaurant;
pub use unit::RestaurantUnit;
pub use user::User;
