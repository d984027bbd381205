//! Wiring for one application session.
//!
//! `AppContext` is built once and handed to whatever drives the UI. Stores
//! share the session and API client through it rather than through any
//! global registry.

use std::sync::Arc;

use crate::account::AccountClient;
use crate::api::ApiClient;
use crate::client::TaskClient;
use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::hooks::{Navigator, Notifier, TracingNavigator, TracingNotifier};
use crate::http::Transport;
use crate::session::Session;
use crate::storage::Persistence;
use crate::store::{AuthStore, TaskListStore, UserStore};
use crate::transport::ReqwestTransport;

pub struct AppContext {
    session: Arc<Session>,
    tasks: TaskListStore,
    auth: AuthStore,
    user: UserStore,
}

impl AppContext {
    pub fn new(
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
        storage: Persistence,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let session = Arc::new(Session::restore(storage, navigator.clone()));
        let api = ApiClient::new(transport, session.clone(), notifier.clone());
        let accounts = AccountClient::new(&config.base_url);

        Self {
            tasks: TaskListStore::new(
                api.clone(),
                TaskClient::new(&config.base_url),
                notifier.clone(),
                config.per_page,
            ),
            auth: AuthStore::new(api.clone(), accounts.clone(), notifier.clone(), navigator),
            user: UserStore::new(api, accounts, notifier),
            session,
        }
    }

    /// Production wiring: `reqwest` transport and log-only collaborators.
    pub fn connect(config: &ClientConfig, storage: Persistence) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::new(
            config,
            Arc::new(transport),
            storage,
            Arc::new(TracingNotifier),
            Arc::new(TracingNavigator),
        ))
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn tasks(&self) -> &TaskListStore {
        &self.tasks
    }

    pub fn auth(&self) -> &AuthStore {
        &self.auth
    }

    pub fn user(&self) -> &UserStore {
        &self.user
    }
}
