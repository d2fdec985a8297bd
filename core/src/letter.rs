//! Letter rendering endpoints and the template editor flow.
//!
//! # Design
//! `LetterClient` covers the four fixed one-off operations that fall outside
//! the CRUD pattern: rendered HTML, generated PDF, and reading/replacing the
//! raw cover-letter template. The PDF endpoint is the reason response bodies
//! are bytes.
//!
//! In the editor flow a dialog's outcome is an explicit [`Confirmation`] the
//! caller branches on, and a confirmed action in the wrong [`EditorMode`] is
//! the locally-raised "operation not permitted" error. Cancellation is never
//! an error.

use std::fmt;

use crate::client::check_status;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::Id;

/// Client for the fixed-path letter endpoints.
#[derive(Debug, Clone)]
pub struct LetterClient {
    base_url: String,
}

impl LetterClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn build_html(&self, employee_id: Id) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/gen-html/{employee_id}/", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_html(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(&response, 200)?;
        text_body(&response)
    }

    pub fn build_pdf(&self, employee_id: Id) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/gen-pdf/{employee_id}/", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_pdf(&self, response: HttpResponse) -> Result<Vec<u8>, ApiError> {
        check_status(&response, 200)?;
        Ok(response.body)
    }

    pub fn build_raw_template(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/get-template/", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_raw_template(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(&response, 200)?;
        text_body(&response)
    }

    /// Replace the raw cover-letter template. The body is the raw text, not
    /// JSON — the backend does a blind write.
    pub fn build_replace_raw_template(&self, template: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/update-template/", self.base_url),
            headers: vec![("content-type".to_string(), "text/html".to_string())],
            body: Some(template.to_string()),
        }
    }

    pub fn parse_replace_raw_template(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 200)?;
        Ok(())
    }
}

fn text_body(response: &HttpResponse) -> Result<String, ApiError> {
    response
        .text()
        .map(str::to_string)
        .map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Outcome of a confirmation dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Cancelled,
}

/// Which document the template editor currently holds: the template itself,
/// or a letter rendered from it for one employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    Template,
    Letter,
}

impl fmt::Display for EditorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorMode::Template => f.write_str("template mode"),
            EditorMode::Letter => f.write_str("letter mode"),
        }
    }
}

/// Mode guard for the template editor. Saving the template back is only
/// permitted in template mode; exporting a letter only in letter mode.
#[derive(Debug, Clone, Copy)]
pub struct TemplateEditor {
    mode: EditorMode,
}

impl TemplateEditor {
    pub fn new(mode: EditorMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    /// `Ok(true)` when the save should proceed, `Ok(false)` when the dialog
    /// was dismissed. A confirmed save outside template mode is an error.
    pub fn confirm_save(&self, confirmation: Confirmation) -> Result<bool, ApiError> {
        self.confirm(confirmation, EditorMode::Template)
    }

    /// Same contract as [`TemplateEditor::confirm_save`], for exporting the
    /// rendered letter; only valid in letter mode.
    pub fn confirm_export(&self, confirmation: Confirmation) -> Result<bool, ApiError> {
        self.confirm(confirmation, EditorMode::Letter)
    }

    fn confirm(&self, confirmation: Confirmation, required: EditorMode) -> Result<bool, ApiError> {
        match confirmation {
            Confirmation::Cancelled => Ok(false),
            Confirmation::Confirmed if self.mode == required => Ok(true),
            Confirmation::Confirmed => Err(ApiError::InvalidMode { required }),
        }
    }
}
