//! Generic CRUD request builder and response parser.
//!
//! # Design
//! `CrudClient<T>` holds a base URL plus one fixed resource path and carries
//! no mutable state between calls. Each of the five operations is split into
//! a `build_*` method that produces an [`HttpRequest`] and a `parse_*` method
//! that consumes an [`HttpResponse`]. The caller executes the actual HTTP
//! round-trip, keeping the core deterministic and free of I/O dependencies.
//!
//! Every operation is single-shot: no retries, no local validation, no
//! caching. A list/get is always a fresh round trip, and failures surface
//! unmodified as [`ApiError`]. Per-id URLs end in a trailing slash — that is
//! part of the wire contract, not a convention.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::Id;

/// A scalar filter value. Its string form matches JavaScript `String(x)`
/// coercion: strings verbatim, decimal integers, `true`/`false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Str(value) => f.write_str(value),
            Scalar::Int(value) => write!(f, "{value}"),
            Scalar::Bool(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Str(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Str(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(i64::from(value))
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

/// Query constraints for a list operation.
///
/// Entries keep insertion order and appear in the query string in that order.
/// An entry holding `None` declares "no constraint" and never reaches the
/// query string. Values are appended verbatim — the wire contract only
/// supports URL-safe scalars, no nested or array encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    entries: Vec<(String, Option<Scalar>)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a constraint.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.entries.push((name.into(), Some(value.into())));
        self
    }

    /// Add a constraint that may be absent. `None` is recorded but excluded
    /// from the query string.
    pub fn set_opt(mut self, name: impl Into<String>, value: Option<impl Into<Scalar>>) -> Self {
        self.entries.push((name.into(), value.map(Into::into)));
        self
    }

    /// The query string without a leading `?`, empty when no entry
    /// constrains anything.
    pub fn query_string(&self) -> String {
        let mut query = String::new();
        for (name, value) in &self.entries {
            let Some(value) = value else { continue };
            if !query.is_empty() {
                query.push('&');
            }
            query.push_str(name);
            query.push('=');
            query.push_str(&value.to_string());
        }
        query
    }
}

/// Stateless client for one resource collection, parameterized over the
/// element type.
///
/// Builds [`HttpRequest`] values and parses [`HttpResponse`] values without
/// touching the network. Use the constructors in [`crate::resources`] to bind
/// it to a concrete resource path.
#[derive(Debug, Clone)]
pub struct CrudClient<T> {
    base_url: String,
    resource_path: &'static str,
    _element: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> CrudClient<T> {
    /// `resource_path` must start and end with `/`, e.g. `/employees/`.
    pub fn new(base_url: &str, resource_path: &'static str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            resource_path,
            _element: PhantomData,
        }
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}{}", self.base_url, self.resource_path)
    }

    fn element_url(&self, id: Id) -> String {
        format!("{}{}{id}/", self.base_url, self.resource_path)
    }

    pub fn build_list(&self, filter: &Filter) -> HttpRequest {
        let query = filter.query_string();
        let path = if query.is_empty() {
            self.collection_url()
        } else {
            format!("{}?{query}", self.collection_url())
        };
        HttpRequest {
            method: HttpMethod::Get,
            path,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_get(&self, id: Id) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.element_url(id),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create<B: Serialize>(&self, input: &B) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: self.collection_url(),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    pub fn build_update<B: Serialize>(&self, id: Id, input: &B) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Patch,
            path: self.element_url(id),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    pub fn build_delete(&self, id: Id) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: self.element_url(id),
            headers: Vec::new(),
            body: None,
        }
    }

    /// The list endpoint returns a bare JSON sequence, never an envelope.
    pub fn parse_list(&self, response: HttpResponse) -> Result<Vec<T>, ApiError> {
        check_status(&response, 200)?;
        serde_json::from_slice(&response.body)
            .map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    pub fn parse_get(&self, response: HttpResponse) -> Result<T, ApiError> {
        check_status(&response, 200)?;
        serde_json::from_slice(&response.body)
            .map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    pub fn parse_create(&self, response: HttpResponse) -> Result<T, ApiError> {
        check_status(&response, 201)?;
        serde_json::from_slice(&response.body)
            .map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    pub fn parse_update(&self, response: HttpResponse) -> Result<T, ApiError> {
        check_status(&response, 200)?;
        serde_json::from_slice(&response.body)
            .map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    pub fn parse_delete(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)?;
        Ok(())
    }
}

/// Map non-success status codes to the appropriate `ApiError` variant.
pub(crate) fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: String::from_utf8_lossy(&response.body).into_owned(),
    })
}
