//! Staff Model

use serde::{Deserialize, Serialize};

/// Staff role within a restaurant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaffRole {
    Manager,
    Waitstaff,
}

impl StaffRole {
    /// Parse from database string value (lowercase)
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "manager" => Some(Self::Manager),
            "waitstaff" => Some(Self::Waitstaff),
            _ => None,
        }
    }

    /// Database string representation (lowercase)
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Manager => "manager",
            Self::Waitstaff => "waitstaff",
        }
    }
}

/// Staff member (without password)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Staff {
    pub id: i64,
    pub restaurant_id: i64,
    pub email: String,
    pub role: StaffRole,
    pub created_at: i64,
}

/// Create staff payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffCreate {
    pub email: String,
    pub password: String,
    pub role: StaffRole,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_db_round_trip() {
        for role in [StaffRole::Manager, StaffRole::Waitstaff] {
            assert_eq!(StaffRole::from_db(role.as_db()), Some(role));
        }
        assert_eq!(StaffRole::from_db("chef"), None);
    }

    #[test]
    fn test_role_json() {
        let role: StaffRole = serde_json::from_str("\"waitstaff\"").unwrap();
        assert_eq!(role, StaffRole::Waitstaff);
        assert!(serde_json::from_str::<StaffRole>("\"owner\"").is_err());
    }
}
