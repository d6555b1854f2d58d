use std::sync::Arc;

use thiserror::Error;

use roster_core::{DomainError, UserId};

use crate::user::{ProfileUpdate, User};
use crate::Role;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("user not found")]
    NotFound,

    #[error("username '{0}' is already taken")]
    DuplicateUsername(String),
}

impl From<StoreError> for DomainError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound => DomainError::NotFound,
            StoreError::DuplicateUsername(_) => {
                DomainError::validation("username", "a user with that username already exists")
            }
        }
    }
}

/// Persistence port for user rows.
///
/// Implementations serialize writes per row; every method is one atomic
/// read or write.
pub trait UserStore: Send + Sync {
    fn insert(&self, user: User) -> Result<User, StoreError>;
    fn get(&self, id: &UserId) -> Option<User>;
    fn find_by_username(&self, username: &str) -> Option<User>;
    fn list(&self) -> Vec<User>;
    fn update_profile(&self, id: &UserId, update: ProfileUpdate) -> Result<User, StoreError>;
    fn set_role(&self, id: &UserId, role: Role) -> Result<User, StoreError>;
    fn set_password_hash(&self, id: &UserId, password_hash: String) -> Result<User, StoreError>;
    fn delete(&self, id: &UserId) -> Result<User, StoreError>;
}

impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    fn insert(&self, user: User) -> Result<User, StoreError> {
        (**self).insert(user)
    }

    fn get(&self, id: &UserId) -> Option<User> {
        (**self).get(id)
    }

    fn find_by_username(&self, username: &str) -> Option<User> {
        (**self).find_by_username(username)
    }

    fn list(&self) -> Vec<User> {
        (**self).list()
    }

    fn update_profile(&self, id: &UserId, update: ProfileUpdate) -> Result<User, StoreError> {
        (**self).update_profile(id, update)
    }

    fn set_role(&self, id: &UserId, role: Role) -> Result<User, StoreError> {
        (**self).set_role(id, role)
    }

    fn set_password_hash(&self, id: &UserId, password_hash: String) -> Result<User, StoreError> {
        (**self).set_password_hash(id, password_hash)
    }

    fn delete(&self, id: &UserId) -> Result<User, StoreError> {
        (**self).delete(id)
    }
}
