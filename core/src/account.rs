//! Request builders and parsers for the authentication and profile endpoints.

use crate::client::{get, json_request};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Credentials, NewPassword, Person, ProfileUpdate, SessionGrant, SignupRequest};
use crate::wire::{self, Empty, ProfileBody, SessionBody};

#[derive(serde::Serialize)]
struct ForgotPassword<'a> {
    email: &'a str,
}

/// Stateless client for `/auth/*` and `/person/me`.
#[derive(Debug, Clone)]
pub struct AccountClient {
    base_url: String,
}

impl AccountClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn build_fetch_me(&self) -> HttpRequest {
        get(format!("{}/person/me", self.base_url))
    }

    pub fn build_login(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        json_request(HttpMethod::Post, format!("{}/auth/login", self.base_url), credentials)
    }

    pub fn build_signup(&self, payload: &SignupRequest) -> Result<HttpRequest, ApiError> {
        json_request(HttpMethod::Post, format!("{}/auth/signup", self.base_url), payload)
    }

    pub fn build_forgot_password(&self, email: &str) -> Result<HttpRequest, ApiError> {
        json_request(
            HttpMethod::Post,
            format!("{}/auth/forgot_password", self.base_url),
            &ForgotPassword { email },
        )
    }

    pub fn build_set_password(
        &self,
        token: &str,
        uidb64: &str,
        payload: &NewPassword,
    ) -> Result<HttpRequest, ApiError> {
        json_request(
            HttpMethod::Post,
            format!("{}/auth/reset_password/{token}/{uidb64}", self.base_url),
            payload,
        )
    }

    pub fn build_update_profile(&self, update: &ProfileUpdate) -> Result<HttpRequest, ApiError> {
        json_request(HttpMethod::Put, format!("{}/person/me", self.base_url), update)
    }

    /// Parses login, password reset, and `GET /person/me` responses.
    pub fn parse_session(&self, response: HttpResponse) -> Result<SessionGrant, ApiError> {
        wire::open::<SessionBody>(&response).map(wire::session_grant)
    }

    /// Parses endpoints whose only payload is the success flag.
    pub fn parse_ack(&self, response: HttpResponse) -> Result<(), ApiError> {
        wire::open::<Empty>(&response).map(|_| ())
    }

    pub fn parse_profile(&self, response: HttpResponse) -> Result<Option<Person>, ApiError> {
        wire::open::<ProfileBody>(&response).map(|body| body.user)
    }
}
