use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use roster_auth::{ProfileUpdate, Role, StoreError, User, UserStore};
use roster_core::UserId;

/// In-memory user table.
///
/// Every operation takes the lock once, so each read or write is atomic with
/// respect to the others (including the username uniqueness check).
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    rows: RwLock<BTreeMap<UserId, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<UserId, User>> {
        self.rows.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<UserId, User>> {
        self.rows.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn modify<F>(&self, id: &UserId, f: F) -> Result<User, StoreError>
    where
        F: FnOnce(&mut User),
    {
        let mut rows = self.write();
        let row = rows.get_mut(id).ok_or(StoreError::NotFound)?;
        f(row);
        Ok(row.clone())
    }
}

fn username_taken(rows: &BTreeMap<UserId, User>, username: &str, except: Option<&UserId>) -> bool {
    rows.values()
        .any(|u| u.username == username && Some(&u.id) != except)
}

impl UserStore for InMemoryUserStore {
    fn insert(&self, user: User) -> Result<User, StoreError> {
        let mut rows = self.write();
        if username_taken(&rows, &user.username, None) {
            return Err(StoreError::DuplicateUsername(user.username));
        }
        rows.insert(user.id, user.clone());
        tracing::debug!(user_id = %user.id, "user row inserted");
        Ok(user)
    }

    fn get(&self, id: &UserId) -> Option<User> {
        self.read().get(id).cloned()
    }

    fn find_by_username(&self, username: &str) -> Option<User> {
        self.read().values().find(|u| u.username == username).cloned()
    }

    fn list(&self) -> Vec<User> {
        self.read().values().cloned().collect()
    }

    fn update_profile(&self, id: &UserId, update: ProfileUpdate) -> Result<User, StoreError> {
        let mut rows = self.write();
        if let Some(username) = &update.username {
            if username_taken(&rows, username, Some(id)) {
                return Err(StoreError::DuplicateUsername(username.clone()));
            }
        }

        let row = rows.get_mut(id).ok_or(StoreError::NotFound)?;
        if let Some(username) = update.username {
            row.username = username;
        }
        if let Some(email) = update.email {
            row.email = email;
        }
        Ok(row.clone())
    }

    fn set_role(&self, id: &UserId, role: Role) -> Result<User, StoreError> {
        self.modify(id, |row| row.role = role)
    }

    fn set_password_hash(&self, id: &UserId, password_hash: String) -> Result<User, StoreError> {
        self.modify(id, |row| row.password_hash = password_hash)
    }

    fn delete(&self, id: &UserId) -> Result<User, StoreError> {
        let removed = self.write().remove(id).ok_or(StoreError::NotFound)?;
        tracing::debug!(user_id = %id, "user row deleted");
        Ok(removed)
    }
}
