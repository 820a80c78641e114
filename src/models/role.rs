use serde::{Deserialize, Serialize};

/// Active portal mode. Self-asserted, not an authorization boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Government,
    Ngo,
    #[default]
    Unauthenticated,
}

impl UserRole {
    pub fn is_authenticated(self) -> bool {
        self != UserRole::Unauthenticated
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Government => write!(f, "GOVERNMENT"),
            UserRole::Ngo => write!(f, "NGO"),
            UserRole::Unauthenticated => write!(f, "UNAUTHENTICATED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&UserRole::Ngo).unwrap(), "\"NGO\"");
        let role: UserRole = serde_json::from_str("\"GOVERNMENT\"").unwrap();
        assert_eq!(role, UserRole::Government);
    }

    #[test]
    fn test_default_is_unauthenticated() {
        assert_eq!(UserRole::default(), UserRole::Unauthenticated);
        assert!(!UserRole::default().is_authenticated());
        assert!(UserRole::Ngo.is_authenticated());
    }
}
