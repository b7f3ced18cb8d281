//! Mock identity: nothing is verified and no password is kept.

use crate::model::User;
use crate::store::{KeyValueStore, StoreError, USER_KEY};
use thiserror::Error;

/// Name given to users who log in without registering.
pub const DEMO_USER_NAME: &str = "Demo User";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

#[derive(Debug, Clone, Default)]
pub struct AuthForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Please fill in all required fields")]
    MissingFields,
    #[error("Name is required")]
    MissingName,
}

#[derive(Debug, Error)]
pub enum UserStoreError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("serialize user")]
    Serialize(#[from] serde_json::Error),
}

pub fn authenticate(mode: AuthMode, form: &AuthForm) -> Result<User, AuthError> {
    let email = form.email.trim();
    if email.is_empty() || form.password.is_empty() {
        return Err(AuthError::MissingFields);
    }
    let name = match mode {
        AuthMode::Register => {
            let name = form.name.trim();
            if name.is_empty() {
                return Err(AuthError::MissingName);
            }
            name.to_string()
        }
        AuthMode::Login => DEMO_USER_NAME.to_string(),
    };
    Ok(User {
        email: email.to_string(),
        name,
    })
}

/// A missing, unreadable or corrupt record means nobody is signed in.
pub fn load_user(store: &impl KeyValueStore) -> Option<User> {
    let raw = match store.get(USER_KEY) {
        Ok(raw) => raw?,
        Err(err) => {
            tracing::warn!(error = %err, "failed to read saved user");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(user) => Some(user),
        Err(err) => {
            tracing::warn!(error = %err, "discarding corrupt saved user");
            None
        }
    }
}

pub fn save_user(store: &impl KeyValueStore, user: &User) -> Result<(), UserStoreError> {
    let json = serde_json::to_string(user)?;
    store.set(USER_KEY, &json)?;
    Ok(())
}

pub fn clear_user(store: &impl KeyValueStore) -> Result<(), UserStoreError> {
    store.remove(USER_KEY)?;
    Ok(())
}
