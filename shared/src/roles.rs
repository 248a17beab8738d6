//! Staff/client role taxonomy
//!
//! Restaurant admins are a separate principal kind and are not part of this
//! enum; they always satisfy admin-level checks.

use serde::{Deserialize, Serialize};

/// Role carried by a staff or client user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Manager,
    Attendant,
    Client,
}

impl Role {
    /// Any staff role (attendant-or-above)
    pub const STAFF: &'static [Role] = &[Role::Admin, Role::Manager, Role::Attendant];

    /// Management roles (manager-or-above)
    pub const MANAGEMENT: &'static [Role] = &[Role::Admin, Role::Manager];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::Attendant => "ATTENDANT",
            Role::Client => "CLIENT",
        }
    }

    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "ADMIN" => Some(Role::Admin),
            "MANAGER" => Some(Role::Manager),
            "ATTENDANT" => Some(Role::Attendant),
            "CLIENT" => Some(Role::Client),
            _ => None,
        }
    }

    /// Whether this role grants staff access to a unit's order board
    pub fn is_staff(&self) -> bool {
        Self::STAFF.contains(self)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Admin, Role::Manager, Role::Attendant, Role::Client] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("RESTAURANT"), None);
    }

    #[test]
    fn test_staff_groups() {
        assert!(Role::Attendant.is_staff());
        assert!(!Role::Client.is_staff());
        assert!(Role::MANAGEMENT.contains(&Role::Manager));
        assert!(!Role::MANAGEMENT.contains(&Role::Attendant));
    }
}
