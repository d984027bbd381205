//! Authenticated request execution.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::ApiError;
use crate::hooks::{Notification, Notifier};
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::session::Session;

pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please login again.";
const SESSION_EXPIRED_TIMEOUT: Duration = Duration::from_secs(3);

/// Sends requests through a `Transport`, adding the bearer token and ending
/// the session when the server answers 401.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: Arc<Session>,
    notifier: Arc<dyn Notifier>,
}

impl ApiClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        session: Arc<Session>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            transport,
            session,
            notifier,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Executes `request`. Every response, 401 included, comes back as `Ok`
    /// so the resource parser can classify it; only transport failures are
    /// `Err`.
    pub async fn send(&self, mut request: HttpRequest) -> Result<HttpResponse, ApiError> {
        if let Some(token) = self.session.bearer_token().await {
            request
                .headers
                .push(("authorization".to_string(), format!("Bearer {token}")));
        }
        debug!(method = request.method.as_str(), path = %request.path, "sending request");

        let response = self.transport.execute(request).await?;

        if response.status == 401 {
            warn!("server answered 401, ending session");
            self.session.end().await;
            self.notifier.notify(
                Notification::warning(SESSION_EXPIRED_MESSAGE).with_timeout(SESSION_EXPIRED_TIMEOUT),
            );
        }
        Ok(response)
    }
}
