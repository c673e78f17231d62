//! Session roles.
//!
//! The role is fixed for the lifetime of a signed-in session and decides
//! which order collection the session reconciles.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Manager,
    Staff,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Manager => "MANAGER",
            Self::Staff => "STAFF",
            Self::Customer => "CUSTOMER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ADMIN" => Some(Self::Admin),
            "MANAGER" => Some(Self::Manager),
            "STAFF" => Some(Self::Staff),
            "CUSTOMER" | "USER" => Some(Self::Customer),
            _ => None,
        }
    }

    /// Whether this role manages a whole workspace (sees every order).
    pub fn is_workspace_operator(&self) -> bool {
        matches!(self, Self::Admin | Self::Manager)
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
    fn role_roundtrip() {
        for r in &[Role::Admin, Role::Manager, Role::Staff, Role::Customer] {
            let json = serde_json::to_string(r).unwrap();
            let back: Role = serde_json::from_str(&json).unwrap();
            assert_eq!(*r, back);
            assert_eq!(Role::parse(r.as_str()), Some(*r));
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Role::parse("staff"), Some(Role::Staff));
        assert_eq!(Role::parse("user"), Some(Role::Customer));
        assert_eq!(Role::parse("root"), None);
    }

    #[test]
    fn workspace_operators() {
        assert!(Role::Admin.is_workspace_operator());
        assert!(Role::Manager.is_workspace_operator());
        assert!(!Role::Staff.is_workspace_operator());
        assert!(!Role::Customer.is_workspace_operator());
    }
}
