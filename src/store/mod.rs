//! User storage
//!
//! The token layer never touches storage; handlers use a [`UserStore`] to
//! resolve credentials into an identity before issuing tokens.

use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;
use uuid::Uuid;

use crate::models::User;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Email already registered")]
    EmailTaken,

    #[error("Username already taken")]
    UsernameTaken,
}

/// Lookup and persistence of users
pub trait UserStore: Send + Sync {
    fn find_by_email(&self, email: &str) -> Option<User>;

    fn find_by_id(&self, id: Uuid) -> Option<User>;

    fn insert(&self, user: User) -> Result<User, StoreError>;
}

/// Process-local store; contents are lost on restart
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for InMemoryUserStore {
    fn find_by_email(&self, email: &str) -> Option<User> {
        let users = self.users.read().unwrap_or_else(|e| e.into_inner());
        users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned()
    }

    fn find_by_id(&self, id: Uuid) -> Option<User> {
        let users = self.users.read().unwrap_or_else(|e| e.into_inner());
        users.get(&id).cloned()
    }

    fn insert(&self, user: User) -> Result<User, StoreError> {
        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());

        if users.values().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(StoreError::EmailTaken);
        }
        if users.values().any(|u| u.username == user.username) {
            return Err(StoreError::UsernameTaken);
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }
}
