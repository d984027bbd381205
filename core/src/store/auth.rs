//! Sign-in, sign-up, and password recovery.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::warn;

use crate::account::AccountClient;
use crate::api::ApiClient;
use crate::error::ApiError;
use crate::hooks::{Navigator, Notification, Notifier, DASHBOARD_ROUTE};
use crate::http::HttpRequest;
use crate::types::{Credentials, NewPassword, Person, SignupRequest};

pub const UNKNOWN_ERROR: &str = "An unknown error occurred";
pub const RESET_LINK_SENT: &str = "Password reset link has been sent to your email";
const RESET_REQUEST_FAILED: &str = "An error occurred while processing your request";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthStatus {
    pub loading: bool,
    pub error: Option<String>,
}

/// Every operation reports its outcome as a `bool` and surfaces failures
/// through the notifier; nothing is returned as an error.
pub struct AuthStore {
    api: ApiClient,
    client: AccountClient,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    status: Mutex<AuthStatus>,
}

impl AuthStore {
    pub fn new(
        api: ApiClient,
        client: AccountClient,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            api,
            client,
            notifier,
            navigator,
            status: Mutex::new(AuthStatus::default()),
        }
    }

    pub async fn user(&self) -> Option<Person> {
        self.api.session().user().await
    }

    pub async fn is_authenticated(&self) -> bool {
        self.api.session().is_authenticated().await
    }

    pub async fn access_token(&self) -> Option<String> {
        self.api.session().snapshot().await.access_token
    }

    pub async fn status(&self) -> AuthStatus {
        self.status.lock().await.clone()
    }

    /// Refreshes the signed-in person from `GET /person/me`.
    pub async fn fetch_user(&self) -> bool {
        let request = self.client.build_fetch_me();
        self.authenticate(Ok(request), false).await
    }

    pub async fn login(&self, credentials: &Credentials) -> bool {
        let request = self.client.build_login(credentials);
        self.authenticate(request, true).await
    }

    /// Registers an account. The new account is not signed in.
    pub async fn signup(&self, payload: &SignupRequest) -> bool {
        let request = self.client.build_signup(payload);
        match self.acknowledge(request).await {
            Ok(()) => true,
            Err(err) => {
                let message = auth_message(&err);
                self.fail(&err, message).await
            }
        }
    }

    pub async fn forgot_password(&self, email: &str) -> bool {
        let request = self.client.build_forgot_password(email);
        match self.acknowledge(request).await {
            Ok(()) => {
                self.notifier.notify(Notification::positive(RESET_LINK_SENT));
                true
            }
            Err(err) => {
                let message = err.user_message(RESET_REQUEST_FAILED);
                self.fail(&err, message).await
            }
        }
    }

    /// Completes a password reset; a successful reset signs the person in.
    pub async fn set_password(&self, token: &str, uidb64: &str, payload: &NewPassword) -> bool {
        let request = self.client.build_set_password(token, uidb64, payload);
        self.authenticate(request, true).await
    }

    pub async fn logout(&self) {
        self.api.session().end().await;
    }

    async fn authenticate(&self, request: Result<HttpRequest, ApiError>, redirect: bool) -> bool {
        self.begin().await;
        let result = match request {
            Ok(request) => match self.api.send(request).await {
                Ok(response) => self.client.parse_session(response),
                Err(err) => Err(err),
            },
            Err(err) => Err(err),
        };
        self.status.lock().await.loading = false;

        match result {
            Ok(grant) => {
                self.api.session().establish(grant).await;
                if redirect {
                    self.navigator.navigate(DASHBOARD_ROUTE);
                }
                true
            }
            Err(err) => {
                let message = auth_message(&err);
                self.fail(&err, message).await
            }
        }
    }

    async fn acknowledge(&self, request: Result<HttpRequest, ApiError>) -> Result<(), ApiError> {
        self.begin().await;
        let result: Result<(), ApiError> = async {
            let response = self.api.send(request?).await?;
            self.client.parse_ack(response)
        }
        .await;
        self.status.lock().await.loading = false;
        result
    }

    async fn begin(&self) {
        let mut status = self.status.lock().await;
        status.loading = true;
        status.error = None;
    }

    async fn fail(&self, err: &ApiError, message: String) -> bool {
        warn!(%err, "account operation failed");
        self.status.lock().await.error = Some(message.clone());
        self.notifier.notify(Notification::negative(message));
        false
    }
}

/// Server rejections keep their message; anything that never produced a
/// readable answer is reported generically.
fn auth_message(err: &ApiError) -> String {
    match err {
        ApiError::Transport(_) | ApiError::Decode(_) | ApiError::Encode(_) => {
            UNKNOWN_ERROR.to_string()
        }
        other => other.user_message(UNKNOWN_ERROR),
    }
}
