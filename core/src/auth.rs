//! Session state, login/logout/probe, and the post-login redirect.
//!
//! # Design
//! `Session` is an explicitly owned value with a single writer: only the
//! [`AuthClient`] parse methods transition it. Hosts that share it across
//! threads must wrap it (mutex or a single owning task); the library only
//! ever takes `&mut Session`.
//!
//! Besides the two-state machine the session carries the `sessionid` and
//! `csrftoken` cookie values captured from responses. [`Session::apply`]
//! echoes them back: the cookie header on every request, and the CSRF token
//! as the `x-csrftoken` header on state-changing requests.
//!
//! Logout clears the session only on a confirmed 200; until the server
//! answers, the state is left untouched.

use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub const LOGIN_PATH: &str = "/rest-auth/login/";
pub const LOGOUT_PATH: &str = "/api-auth/logout/";

/// The session probe asks for a protected collection; a 200 proves the
/// session cookie is still accepted.
const PROBE_PATH: &str = "/employees/";

const SESSION_COOKIE: &str = "sessionid";
const CSRF_COOKIE: &str = "csrftoken";
const CSRF_HEADER: &str = "x-csrftoken";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated,
}

/// Client-side session: the state flag plus the cookies that back it.
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: SessionState,
    session_cookie: Option<String>,
    csrf_token: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    /// Capture `sessionid` and `csrftoken` values from the response's
    /// `set-cookie` headers. Cookies the response does not set are kept.
    pub fn absorb(&mut self, response: &HttpResponse) {
        for raw in response.header_values("set-cookie") {
            let Some((name, value)) = parse_set_cookie(raw) else {
                continue;
            };
            match name {
                SESSION_COOKIE => self.session_cookie = Some(value.to_string()),
                CSRF_COOKIE => self.csrf_token = Some(value.to_string()),
                _ => {}
            }
        }
    }

    /// Attach the session cookies to a request, and on state-changing
    /// methods echo the CSRF cookie as the `x-csrftoken` header.
    pub fn apply(&self, request: &mut HttpRequest) {
        let mut pairs = Vec::new();
        if let Some(token) = &self.csrf_token {
            pairs.push(format!("{CSRF_COOKIE}={token}"));
        }
        if let Some(cookie) = &self.session_cookie {
            pairs.push(format!("{SESSION_COOKIE}={cookie}"));
        }
        if !pairs.is_empty() {
            request.headers.push(("cookie".to_string(), pairs.join("; ")));
        }
        if request.method.is_state_changing() {
            if let Some(token) = &self.csrf_token {
                request.headers.push((CSRF_HEADER.to_string(), token.clone()));
            }
        }
    }

    fn clear(&mut self) {
        *self = Session::default();
    }
}

/// `name=value` from the first segment of a `set-cookie` header.
fn parse_set_cookie(raw: &str) -> Option<(&str, &str)> {
    let first = raw.split(';').next()?;
    let (name, value) = first.split_once('=')?;
    Some((name.trim(), value.trim()))
}

/// Where to navigate after a successful login: the path and query parameters
/// the user was headed for before being diverted to the login view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectTarget {
    pub path: String,
    pub params: Vec<(String, String)>,
}

impl RedirectTarget {
    /// Build the target from the `returnUrl` and `params` entries of the
    /// current query, as already-decoded strings the way a router exposes
    /// them. Missing entries default to `/` and `{}`. `params` must be a
    /// JSON object of scalars; `null` values are dropped.
    pub fn from_query(
        return_url: Option<&str>,
        params: Option<&str>,
    ) -> Result<Self, ApiError> {
        let path = return_url.unwrap_or("/").to_string();
        let raw = params.unwrap_or("{}");
        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(|e| ApiError::DeserializationError(e.to_string()))?;
        let object = value.as_object().ok_or_else(|| {
            ApiError::DeserializationError("redirect params must be a JSON object".to_string())
        })?;

        let mut params = Vec::with_capacity(object.len());
        for (name, value) in object {
            let value = match value {
                serde_json::Value::Null => continue,
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Bool(b) => b.to_string(),
                serde_json::Value::Number(n) => n.to_string(),
                other => {
                    return Err(ApiError::DeserializationError(format!(
                        "redirect param {name} is not a scalar: {other}"
                    )))
                }
            };
            params.push((name.clone(), value));
        }
        Ok(Self { path, params })
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Builds and parses the authentication requests. All session transitions
/// happen in the `parse_*` methods, never in `build_*`.
#[derive(Debug, Clone)]
pub struct AuthClient {
    base_url: String,
}

impl AuthClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn build_login(&self, email: &str, password: &str) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(&LoginRequest { email, password })
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}{LOGIN_PATH}", self.base_url),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    /// A 200 authenticates the session, captures its cookies, and yields the
    /// one redirect the host must perform. Anything else leaves the session
    /// anonymous and fails with the generic [`ApiError::AuthenticationFailed`].
    pub fn parse_login(
        &self,
        response: HttpResponse,
        session: &mut Session,
        return_url: Option<&str>,
        params: Option<&str>,
    ) -> Result<RedirectTarget, ApiError> {
        if response.status != 200 {
            session.clear();
            return Err(ApiError::AuthenticationFailed);
        }
        session.absorb(&response);
        session.state = SessionState::Authenticated;
        RedirectTarget::from_query(return_url, params)
    }

    /// Probe whether an existing session cookie is still valid, once at
    /// application start.
    pub fn build_probe(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}{PROBE_PATH}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    /// A 200 means the session cookie is still valid: the session becomes
    /// authenticated and the redirect is returned. A failed probe surfaces no
    /// error — the session just stays anonymous.
    pub fn parse_probe(
        &self,
        response: HttpResponse,
        session: &mut Session,
        return_url: Option<&str>,
        params: Option<&str>,
    ) -> Result<Option<RedirectTarget>, ApiError> {
        if response.status != 200 {
            session.state = SessionState::Anonymous;
            return Ok(None);
        }
        session.absorb(&response);
        session.state = SessionState::Authenticated;
        RedirectTarget::from_query(return_url, params).map(Some)
    }

    pub fn build_logout(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}{LOGOUT_PATH}", self.base_url),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some("{}".to_string()),
        }
    }

    /// The session is dropped only on a confirmed 200; on any other status
    /// it is left untouched and the HTTP error surfaces.
    pub fn parse_logout(
        &self,
        response: HttpResponse,
        session: &mut Session,
    ) -> Result<(), ApiError> {
        if response.status != 200 {
            return Err(ApiError::HttpError {
                status: response.status,
                body: String::from_utf8_lossy(&response.body).into_owned(),
            });
        }
        session.clear();
        Ok(())
    }
}
