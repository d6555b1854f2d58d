use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Permission identifier gating one class of user-management operation.
///
/// Permissions are fixed at build time and never stored per user; a user's
/// permissions are always derived from its role.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ViewUsers,
    CreateUsers,
    UpdateUsers,
    DeleteUsers,
    ManageRoles,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown permission '{0}'")]
pub struct UnknownPermission(pub String);

impl Permission {
    pub const ALL: [Permission; 5] = [
        Permission::ViewUsers,
        Permission::CreateUsers,
        Permission::UpdateUsers,
        Permission::DeleteUsers,
        Permission::ManageRoles,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ViewUsers => "view_users",
            Permission::CreateUsers => "create_users",
            Permission::UpdateUsers => "update_users",
            Permission::DeleteUsers => "delete_users",
            Permission::ManageRoles => "manage_roles",
        }
    }
}

impl FromStr for Permission {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPermission(s.to_string()))
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for p in Permission::ALL {
            assert_eq!(p.as_str().parse::<Permission>(), Ok(p));
        }
    }

    #[test]
    fn serde_matches_as_str() {
        let json = serde_json::to_string(&Permission::ManageRoles).unwrap();
        assert_eq!(json, "\"manage_roles\"");
    }

    #[test]
    fn unknown_names_are_rejected() {
        let err = "drop_tables".parse::<Permission>().unwrap_err();
        assert_eq!(err.to_string(), "unknown permission 'drop_tables'");
    }
}
