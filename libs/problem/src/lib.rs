//! RFC 9457 Problem Details shared by every HTTP-facing crate of the workspace.
//!
//! Modules declare their failure kinds once as [`ErrDef`] catalog entries and
//! render them through [`ErrDef::to_response`], so the status, title and code
//! of a given failure never drift between handlers.

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Content type for Problem Details as per RFC 9457.
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

/// RFC 9457 Problem Details for HTTP APIs.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(
    title = "Problem",
    description = "RFC 9457 Problem Details for HTTP APIs"
)]
pub struct Problem {
    /// A URI reference that identifies the problem type.
    #[serde(rename = "type")]
    pub type_url: String,
    /// A short, human-readable summary of the problem type.
    pub title: String,
    /// The HTTP status code for this occurrence of the problem.
    pub status: u16,
    /// A human-readable explanation specific to this occurrence of the problem.
    pub detail: String,
    /// A URI reference that identifies the specific occurrence of the problem.
    pub instance: String,
    /// Machine-readable error code from the module catalog.
    pub code: String,
    /// Request id useful for correlating with server logs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Id of the server-side span that produced this problem.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    /// Field-level validation errors for 4xx problems.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ValidationError>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(title = "ValidationError")]
pub struct ValidationError {
    pub detail: String,
    /// JSON Pointer to the invalid location (e.g., "/slots/0/capacity").
    pub pointer: String,
}

impl Problem {
    pub fn new(status: StatusCode, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            type_url: "about:blank".to_string(),
            title: title.into(),
            status: status.as_u16(),
            detail: detail.into(),
            instance: String::new(),
            code: String::new(),
            request_id: None,
            trace_id: None,
            errors: None,
        }
    }

    pub fn with_type(mut self, type_url: impl Into<String>) -> Self {
        self.type_url = type_url.into();
        self
    }

    pub fn with_instance(mut self, uri: impl Into<String>) -> Self {
        self.instance = uri.into();
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = Some(id.into());
        self
    }

    pub fn with_errors(mut self, errors: Vec<ValidationError>) -> Self {
        self.errors = Some(errors);
        self
    }
}

/// Axum response wrapper that renders `Problem` with correct status & content type.
#[derive(Debug, Clone)]
pub struct ProblemResponse(pub Problem);

impl From<Problem> for ProblemResponse {
    fn from(p: Problem) -> Self {
        Self(p)
    }
}

impl IntoResponse for ProblemResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut resp = axum::Json(self.0).into_response();
        *resp.status_mut() = status;
        resp.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            HeaderValue::from_static(APPLICATION_PROBLEM_JSON),
        );
        resp
    }
}

/// Static error definition from a module catalog.
#[derive(Debug, Clone, Copy)]
pub struct ErrDef {
    pub status: u16,
    pub title: &'static str,
    pub code: &'static str,
    pub type_url: &'static str,
}

impl ErrDef {
    /// Convert this error definition into a Problem with the given detail.
    #[inline]
    pub fn to_problem(&self, detail: impl Into<String>) -> Problem {
        Problem::new(
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            self.title,
            detail.into(),
        )
        .with_code(self.code)
        .with_type(self.type_url)
    }

    /// Build a ready-to-return response for the request at `instance`.
    ///
    /// The current span id is attached as `trace_id` when a span is active.
    pub fn to_response(&self, detail: impl Into<String>, instance: &str) -> ProblemResponse {
        let problem = self.to_problem(detail).with_instance(instance);
        let problem = match tracing::Span::current().id() {
            Some(id) => problem.with_trace_id(id.into_u64().to_string()),
            None => problem,
        };
        ProblemResponse(problem)
    }
}

/// 404 for paths no module claimed.
pub fn not_found(detail: impl Into<String>) -> ProblemResponse {
    Problem::new(StatusCode::NOT_FOUND, "Not Found", detail)
        .with_code("NOT_FOUND")
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn problem_into_response_sets_status_and_content_type() {
        let p = Problem::new(StatusCode::CONFLICT, "Slot full", "no seats left");
        let resp = ProblemResponse(p).into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let ct = resp
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        assert_eq!(ct, APPLICATION_PROBLEM_JSON);
    }

    #[test]
    fn err_def_to_problem_works() {
        let def = ErrDef {
            status: 409,
            title: "Slot full",
            code: "TEST_SLOT_FULL",
            type_url: "https://errors.turnstile.dev/TEST_SLOT_FULL",
        };

        let problem = def.to_problem("Morning is full on 2026-01-10");
        assert_eq!(problem.status, 409);
        assert_eq!(problem.title, "Slot full");
        assert_eq!(problem.detail, "Morning is full on 2026-01-10");
        assert_eq!(problem.code, "TEST_SLOT_FULL");
        assert_eq!(
            problem.type_url,
            "https://errors.turnstile.dev/TEST_SLOT_FULL"
        );
    }

    #[test]
    fn err_def_to_response_sets_instance() {
        let def = ErrDef {
            status: 403,
            title: "Forbidden",
            code: "TEST_FORBIDDEN",
            type_url: "about:blank",
        };
        let resp = def.to_response("staff only", "/facility/v1/statistics");
        assert_eq!(resp.0.instance, "/facility/v1/statistics");
        assert_eq!(resp.0.status, 403);
    }

    #[test]
    fn optional_fields_are_omitted_from_json() {
        let p = Problem::new(StatusCode::BAD_REQUEST, "Bad Request", "invalid date");
        let v = serde_json::to_value(&p).expect("serialize");
        assert!(v.get("request_id").is_none());
        assert!(v.get("trace_id").is_none());
        assert!(v.get("errors").is_none());
        assert_eq!(v["type"], "about:blank");

        let p = p.with_errors(vec![ValidationError {
            detail: "capacity must be at least 1".to_string(),
            pointer: "/slots/0/capacity".to_string(),
        }]);
        let v = serde_json::to_value(&p).expect("serialize");
        assert_eq!(v["errors"][0]["pointer"], "/slots/0/capacity");
    }

    #[test]
    fn not_found_carries_its_code() {
        let resp = not_found("No route for /x");
        assert_eq!(resp.0.status, 404);
        assert_eq!(resp.0.code, "NOT_FOUND");
    }
}
