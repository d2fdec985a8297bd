//! Sans-IO client core for an employee and appointment management backend.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The caller executes the
//! actual HTTP round-trip, making the core fully deterministic and testable
//! with any transport, blocking or async.
//!
//! # Design
//! - `CrudClient<T>` is one generic client over the element type; the four
//!   resources are plain constructors, not subclasses.
//! - Each operation is split into `build_*` (produces request) and `parse_*`
//!   (consumes response), so the I/O boundary is explicit.
//! - `Session` owns the login state and its backing cookies; only the
//!   `AuthClient` parse methods transition it.
//! - No retries, no caching, no local validation — every failure surfaces to
//!   the caller as an `ApiError`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod auth;
pub mod client;
pub mod error;
pub mod http;
pub mod letter;
pub mod resources;
pub mod types;

pub use auth::{AuthClient, RedirectTarget, Session, SessionState};
pub use client::{CrudClient, Filter, Scalar};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use letter::{Confirmation, EditorMode, LetterClient, TemplateEditor};
pub use types::{
    Appointment, Department, Employee, FilledTemplate, Id, NewAppointment, NewDepartment,
    NewEmployee, NewTemplate, Template, UpdateAppointment, UpdateDepartment, UpdateEmployee,
    UpdateTemplate,
};
