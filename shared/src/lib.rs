//! Shared types for the Comanda platform
//!
//! DTOs and enums used by both the server and its clients:
//!
//! - [`roles`]: staff/client role taxonomy
//! - [`types`]: common value types (addresses, guest info, order enums)
//! - [`request`]: API request payloads
//! - [`response`]: API response payloads

pub mod request;
pub mod response;
pub mod roles;
pub mod types;

pub use roles::Role;
pub use types::{Address, GuestInfo, OrderStatus, OrderType};
