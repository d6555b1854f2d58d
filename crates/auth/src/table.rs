//! Role → permission mapping.
//!
//! The table is built once at process start (built-in or loaded from a JSON
//! document) and shared read-only afterwards. There is no mutation API:
//! changing what a role may do means shipping a new table.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use thiserror::Error;

use crate::{Permission, Role};

static EMPTY: BTreeSet<Permission> = BTreeSet::new();

#[derive(Debug, Error)]
pub enum TableError {
    #[error("malformed role-permission document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown role '{0}' in role-permission document")]
    UnknownRole(String),

    #[error("unknown permission '{permission}' granted to role '{role}'")]
    UnknownPermission { role: String, permission: String },
}

/// Static mapping from [`Role`] to the set of [`Permission`]s it holds.
///
/// Every role has an entry, possibly empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePermissionTable {
    entries: HashMap<Role, BTreeSet<Permission>>,
}

impl RolePermissionTable {
    /// The built-in table.
    ///
    /// Admin's entry lists every permission, but the authorizer never consults
    /// it: Admin is granted through an unconditional bypass.
    pub fn standard() -> Self {
        Self::from_entries([
            (Role::Admin, Permission::ALL.to_vec()),
            (
                Role::Manager,
                vec![
                    Permission::ViewUsers,
                    Permission::CreateUsers,
                    Permission::UpdateUsers,
                ],
            ),
            (Role::User, Vec::new()),
        ])
    }

    /// Build a table from explicit entries. Roles not mentioned get an empty set.
    pub fn from_entries<I, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Role, P)>,
        P: IntoIterator<Item = Permission>,
    {
        let mut map: HashMap<Role, BTreeSet<Permission>> =
            Role::ALL.into_iter().map(|r| (r, BTreeSet::new())).collect();
        for (role, perms) in entries {
            map.entry(role).or_default().extend(perms);
        }
        Self { entries: map }
    }

    /// Parse a JSON document of the form `{"Manager": ["view_users", ...], ...}`.
    pub fn from_json(document: &str) -> Result<Self, TableError> {
        let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(document)?;

        let mut entries = Vec::with_capacity(raw.len());
        for (role_name, perm_names) in raw {
            let role: Role = role_name
                .parse()
                .map_err(|_| TableError::UnknownRole(role_name.clone()))?;

            let perms = perm_names
                .into_iter()
                .map(|p| {
                    p.parse::<Permission>().map_err(|_| TableError::UnknownPermission {
                        role: role_name.clone(),
                        permission: p,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            entries.push((role, perms));
        }

        Ok(Self::from_entries(entries))
    }

    /// Permissions held by `role`. Never fails; a missing entry reads as empty.
    pub fn permissions_for(&self, role: Role) -> &BTreeSet<Permission> {
        self.entries.get(&role).unwrap_or(&EMPTY)
    }

    /// Lookup by role name. Unrecognized names yield the empty set, so a
    /// non-empty result must not be taken as proof the name is valid.
    pub fn permissions_for_name(&self, role: &str) -> &BTreeSet<Permission> {
        match role.parse::<Role>() {
            Ok(role) => self.permissions_for(role),
            Err(_) => &EMPTY,
        }
    }

    pub fn grants(&self, role: Role, permission: Permission) -> bool {
        self.permissions_for(role).contains(&permission)
    }
}

impl Default for RolePermissionTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_matches_documented_grants() {
        let table = RolePermissionTable::standard();

        assert_eq!(table.permissions_for(Role::Admin).len(), Permission::ALL.len());
        assert!(table.grants(Role::Manager, Permission::CreateUsers));
        assert!(table.grants(Role::Manager, Permission::UpdateUsers));
        assert!(!table.grants(Role::Manager, Permission::DeleteUsers));
        assert!(!table.grants(Role::Manager, Permission::ManageRoles));
        assert!(table.permissions_for(Role::User).is_empty());
    }

    #[test]
    fn every_role_has_an_entry() {
        let table = RolePermissionTable::from_entries([(Role::Manager, vec![Permission::ViewUsers])]);
        for role in Role::ALL {
            assert!(table.entries.contains_key(&role), "missing entry for {role}");
        }
        assert!(table.permissions_for(Role::Admin).is_empty());
    }

    #[test]
    fn unknown_role_name_yields_empty_set() {
        let table = RolePermissionTable::standard();
        assert!(table.permissions_for_name("Superuser").is_empty());
        assert!(table.permissions_for_name("Manager").contains(&Permission::ViewUsers));
    }

    #[test]
    fn loads_from_json() {
        let table = RolePermissionTable::from_json(
            r#"{ "Manager": ["view_users"], "User": ["view_users"] }"#,
        )
        .unwrap();

        assert!(table.grants(Role::User, Permission::ViewUsers));
        assert!(!table.grants(Role::Manager, Permission::CreateUsers));
        assert!(table.permissions_for(Role::Admin).is_empty());
    }

    #[test]
    fn json_with_unknown_names_is_rejected() {
        let err = RolePermissionTable::from_json(r#"{ "Owner": [] }"#).unwrap_err();
        assert!(matches!(err, TableError::UnknownRole(r) if r == "Owner"));

        let err = RolePermissionTable::from_json(r#"{ "User": ["fly"] }"#).unwrap_err();
        assert!(matches!(err, TableError::UnknownPermission { permission, .. } if permission == "fly"));
    }
}
