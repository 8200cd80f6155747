use axum::extract::FromRequestParts;
use axum::http::{StatusCode, header, request::Parts};
use axum::response::{IntoResponse, Response};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Basic};
use subtle::ConstantTimeEq;

use crate::config::UserEntry;
use crate::router::NewsState;

/// In-memory list of accepted `(username, password)` pairs.
///
/// Passwords are kept and compared as plaintext, as configured.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: Vec<UserEntry>,
}

impl UserDirectory {
    pub fn new(users: Vec<UserEntry>) -> Self {
        Self { users }
    }

    /// Exact, case-sensitive match on both fields.
    pub fn authenticate(&self, username: &str, password: &str) -> bool {
        self.users.iter().any(|u| {
            u.username == username && bool::from(u.password.as_bytes().ct_eq(password.as_bytes()))
        })
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// 401 with a Basic challenge; the wrapped handler never runs.
pub fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Basic realm=\"Login Required\"")],
        "Authentication Required\n",
    )
        .into_response()
}

/// Ensure the inbound request carries Basic credentials known to `users`.
/// Returns the authenticated username.
pub fn ensure_authorized(
    credentials: Option<&Authorization<Basic>>,
    users: &UserDirectory,
) -> Result<String, Response> {
    match credentials {
        Some(auth) if users.authenticate(auth.username(), auth.password()) => {
            Ok(auth.username().to_string())
        }
        _ => Err(unauthorized()),
    }
}

/// Extractor guarding every protected handler; yields the username.
#[derive(Debug, Clone)]
pub struct BasicAuthUser(pub String);

impl FromRequestParts<NewsState> for BasicAuthUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &NewsState,
    ) -> Result<Self, Self::Rejection> {
        // A malformed header is treated the same as a missing one.
        let header = TypedHeader::<Authorization<Basic>>::from_request_parts(parts, state)
            .await
            .ok();
        let username = ensure_authorized(header.as_ref().map(|h| &h.0), &state.users)?;
        Ok(Self(username))
    }
}
