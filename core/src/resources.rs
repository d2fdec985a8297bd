//! Bindings of the generic client to the four backend resources.
//!
//! Each constructor fixes the resource path; everything else comes from
//! [`CrudClient`]. The template binding adds the one read that falls outside
//! the CRUD pattern: fetching a template pre-filled for a given employee.

use crate::client::{check_status, CrudClient};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Appointment, Department, Employee, FilledTemplate, Id, Template};

impl CrudClient<Employee> {
    pub fn employees(base_url: &str) -> Self {
        Self::new(base_url, "/employees/")
    }
}

impl CrudClient<Department> {
    pub fn departments(base_url: &str) -> Self {
        Self::new(base_url, "/departments/")
    }
}

impl CrudClient<Appointment> {
    pub fn appointments(base_url: &str) -> Self {
        Self::new(base_url, "/appointments/")
    }
}

impl CrudClient<Template> {
    pub fn templates(base_url: &str) -> Self {
        Self::new(base_url, "/templates/")
    }

    /// Fetch a template with its placeholders filled from one employee's
    /// record. The path puts the template id first and the employee id
    /// second, inverted relative to the argument order.
    pub fn build_filled(&self, employee_id: Id, template_id: Id) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/templates/{template_id}/{employee_id}/", self.base_url()),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_filled(&self, response: HttpResponse) -> Result<FilledTemplate, ApiError> {
        check_status(&response, 200)?;
        serde_json::from_slice(&response.body)
            .map_err(|e| ApiError::DeserializationError(e.to_string()))
    }
}
