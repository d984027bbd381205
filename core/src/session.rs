//! Authentication state shared by the API client and the account stores.
//!
//! # Design
//! The API client needs the bearer token and must be able to tear the
//! session down on a 401, while the auth store establishes it. Both hold the
//! same `Arc<Session>` instead of looking each other up, which breaks the
//! client/store cycle.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::hooks::{Navigator, LOGIN_ROUTE};
use crate::storage::Persistence;
use crate::types::{Person, SessionGrant};

pub const USER_KEY: &str = "user";
pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const ACCESS_TOKEN_EXPIRY_KEY: &str = "accessTokenExpiry";

/// Snapshot of the session fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionData {
    pub user: Option<Person>,
    pub access_token: Option<String>,
    pub access_token_expiry: Option<serde_json::Value>,
}

pub struct Session {
    data: Mutex<SessionData>,
    storage: Persistence,
    navigator: Arc<dyn Navigator>,
}

impl Session {
    /// Builds a session from whatever was persisted last time.
    pub fn restore(storage: Persistence, navigator: Arc<dyn Navigator>) -> Self {
        let data = SessionData {
            user: storage.get_item(USER_KEY),
            access_token: storage.get_item(ACCESS_TOKEN_KEY),
            access_token_expiry: storage.get_item(ACCESS_TOKEN_EXPIRY_KEY),
        };
        Self {
            data: Mutex::new(data),
            storage,
            navigator,
        }
    }

    pub async fn snapshot(&self) -> SessionData {
        self.data.lock().await.clone()
    }

    pub async fn user(&self) -> Option<Person> {
        self.data.lock().await.user.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.data.lock().await.user.is_some()
    }

    /// Token to send, present only for an authenticated session.
    pub async fn bearer_token(&self) -> Option<String> {
        let data = self.data.lock().await;
        if data.user.is_some() {
            data.access_token.clone()
        } else {
            None
        }
    }

    /// Stores a grant. Token and expiry are kept when the grant omits them.
    pub async fn establish(&self, grant: SessionGrant) {
        let mut data = self.data.lock().await;
        data.user = grant.person;
        self.persist_user(data.user.as_ref());
        if let Some(token) = grant.access_token {
            self.persist(ACCESS_TOKEN_KEY, &token);
            data.access_token = Some(token);
        }
        if let Some(expiry) = grant.expiry {
            self.persist(ACCESS_TOKEN_EXPIRY_KEY, &expiry);
            data.access_token_expiry = Some(expiry);
        }
    }

    /// Replaces the stored user without touching the token.
    pub async fn set_user(&self, user: Option<Person>) {
        let mut data = self.data.lock().await;
        data.user = user;
        self.persist_user(data.user.as_ref());
    }

    /// Clears persisted and in-memory state and sends the user to login.
    pub async fn end(&self) {
        {
            let mut data = self.data.lock().await;
            *data = SessionData::default();
        }
        if let Err(err) = self.storage.clear() {
            warn!(%err, "failed to clear persisted session");
        }
        info!("session ended");
        self.navigator.navigate(LOGIN_ROUTE);
    }

    fn persist_user(&self, user: Option<&Person>) {
        match user {
            Some(user) => self.persist(USER_KEY, user),
            None => {
                if let Err(err) = self.storage.remove_item(USER_KEY) {
                    warn!(%err, "failed to remove persisted user");
                }
            }
        }
    }

    fn persist<T: serde::Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(err) = self.storage.set_item(key, value) {
            warn!(key, %err, "failed to persist session field");
        }
    }
}
