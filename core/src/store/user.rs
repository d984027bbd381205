//! Profile editing for the signed-in person.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::warn;

use crate::account::AccountClient;
use crate::api::ApiClient;
use crate::error::ApiError;
use crate::hooks::{Notification, Notifier};
use crate::types::{Person, ProfileUpdate};

const UPDATE_FAILED: &str = "Failed to update profile";
pub const PROFILE_UPDATED: &str = "Profile updated successfully";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserState {
    /// Profile as last returned by the server.
    pub user: Option<Person>,
    pub loading: bool,
    pub error: Option<String>,
}

pub struct UserStore {
    api: ApiClient,
    client: AccountClient,
    notifier: Arc<dyn Notifier>,
    state: Mutex<UserState>,
}

impl UserStore {
    pub fn new(api: ApiClient, client: AccountClient, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            client,
            notifier,
            state: Mutex::new(UserState::default()),
        }
    }

    pub async fn state(&self) -> UserState {
        self.state.lock().await.clone()
    }

    /// Saves new names. On success the session's user picks them up too.
    pub async fn update_profile(&self, first_name: &str, last_name: &str) -> bool {
        {
            let mut state = self.state.lock().await;
            state.loading = true;
            state.error = None;
        }
        let update = ProfileUpdate {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        };
        let result: Result<Option<Person>, ApiError> = async {
            let request = self.client.build_update_profile(&update)?;
            let response = self.api.send(request).await?;
            self.client.parse_profile(response)
        }
        .await;

        let mut state = self.state.lock().await;
        state.loading = false;
        match result {
            Ok(user) => {
                state.user = user;
                drop(state);

                let session = self.api.session();
                if let Some(mut current) = session.user().await {
                    current.first_name = Some(update.first_name);
                    current.last_name = Some(update.last_name);
                    session.set_user(Some(current)).await;
                }
                self.notifier.notify(Notification::positive(PROFILE_UPDATED));
                true
            }
            Err(err) => {
                warn!(%err, "profile update failed");
                let message = err.user_message(UPDATE_FAILED);
                state.error = Some(message.clone());
                drop(state);
                self.notifier.notify(Notification::negative(message));
                false
            }
        }
    }
}
