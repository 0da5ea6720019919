use strum_macros::{Display, EnumString};

/// Account roles. Stored in the database as their display names, which is
/// also how they travel inside token claims.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Display, EnumString)]
pub enum Role {
    Admin,
    Manager,
    #[strum(serialize = "Office Staff")]
    OfficeStaff,
    Support,
}

impl Role {
    /// Exact-match lookup; anything unrecognized is `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        name.parse().ok()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Manager => "Manager",
            Role::OfficeStaff => "Office Staff",
            Role::Support => "Support",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_names() {
        assert_eq!(Role::from_name("Admin"), Some(Role::Admin));
        assert_eq!(Role::from_name("Manager"), Some(Role::Manager));
        assert_eq!(Role::from_name("Office Staff"), Some(Role::OfficeStaff));
        assert_eq!(Role::from_name("Support"), Some(Role::Support));
    }

    #[test]
    fn rejects_unknown_and_differently_cased_names() {
        assert_eq!(Role::from_name(""), None);
        assert_eq!(Role::from_name("admin"), None);
        assert_eq!(Role::from_name("OfficeStaff"), None);
        assert_eq!(Role::from_name("Superuser"), None);
    }

    #[test]
    fn round_trips_through_display() {
        for role in [Role::Admin, Role::Manager, Role::OfficeStaff, Role::Support] {
            assert_eq!(Role::from_name(role.as_str()), Some(role));
            assert_eq!(role.to_string(), role.as_str());
        }
    }
}
