//! Accounts, roles and the capabilities a role grants.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub surname: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    #[default]
    Client,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Client => "client",
        }
    }

    pub fn capabilities(self) -> CapabilitySet {
        use Capability::*;
        match self {
            Role::Client => CapabilitySet::from_iter([ReadProducts, PlaceOrders]),
            Role::Manager => CapabilitySet::from_iter([
                ReadProducts,
                PlaceOrders,
                ManageProducts,
                ReadOrders,
                ManageOrders,
            ]),
            Role::Admin => CapabilitySet::from_iter(Capability::ALL),
        }
    }

    /// Admin and manager accounts may use the staff login.
    pub fn is_staff(self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "client" => Ok(Role::Client),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// A single permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ReadProducts,
    ManageProducts,
    PlaceOrders,
    ReadOrders,
    ManageOrders,
    DeleteOrders,
    ReadUsers,
}

impl Capability {
    pub const ALL: [Capability; 7] = [
        Capability::ReadProducts,
        Capability::ManageProducts,
        Capability::PlaceOrders,
        Capability::ReadOrders,
        Capability::ManageOrders,
        Capability::DeleteOrders,
        Capability::ReadUsers,
    ];
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    pub fn contains(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_capabilities() {
        let caps = Role::Client.capabilities();
        assert!(caps.contains(Capability::PlaceOrders));
        assert!(caps.contains(Capability::ReadProducts));
        assert!(!caps.contains(Capability::ManageOrders));
        assert!(!caps.contains(Capability::ReadUsers));
    }

    #[test]
    fn test_manager_is_superset_of_client() {
        let manager = Role::Manager.capabilities();
        for cap in Role::Client.capabilities().iter() {
            assert!(manager.contains(cap));
        }
        assert!(manager.contains(Capability::ManageOrders));
        assert!(!manager.contains(Capability::DeleteOrders));
    }

    #[test]
    fn test_admin_has_everything() {
        let admin = Role::Admin.capabilities();
        assert!(Capability::ALL.iter().all(|c| admin.contains(*c)));
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("manager".parse::<Role>(), Ok(Role::Manager));
        assert!("barista".parse::<Role>().is_err());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            surname: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "$2b$secret".to_string(),
            role: Role::Client,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "client");
    }
}
