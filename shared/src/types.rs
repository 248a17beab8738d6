//! Common value types shared between persisted models and API payloads

use serde::{Deserialize, Serialize};

/// Postal address (Brazilian format)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub number: i64,
    #[serde(default)]
    pub complement: String,
}

/// Inline contact info carried by guest orders instead of a user reference
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Order status state machine
///
/// `pending → processing → completed`; `pending|processing → cancelled`;
/// `pending|processing → payment_requested → completed` (table checkout).
/// `completed` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
    PaymentRequested,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Whether the state machine permits moving from `self` to `to`
    ///
    /// `Pending → Completed` is permitted because table payment settles
    /// orders that never went through the kitchen-side `processing` step.
    pub fn can_transition(&self, to: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, to),
            (Pending, Processing)
                | (Pending, PaymentRequested)
                | (Pending, Cancelled)
                | (Pending, Completed)
                | (Processing, Completed)
                | (Processing, Cancelled)
                | (Processing, PaymentRequested)
                | (PaymentRequested, Completed)
        )
    }
}

/// Whether the order is consumed at a table or taken away
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    #[default]
    Local,
    Takeaway,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states_have_no_outgoing_transitions() {
        use OrderStatus::*;
        for from in [Completed, Cancelled] {
            for to in [Pending, Processing, Completed, Cancelled, PaymentRequested] {
                assert!(!from.can_transition(to), "{from:?} -> {to:?} must be rejected");
            }
        }
    }

    #[test]
    fn test_checkout_path() {
        use OrderStatus::*;
        assert!(Pending.can_transition(PaymentRequested));
        assert!(PaymentRequested.can_transition(Completed));
        assert!(!PaymentRequested.can_transition(Pending));
    }
}
