//! Route table of the report service, independent of any HTTP server.
//!
//! | Route                    | Handler                                  |
//! |--------------------------|------------------------------------------|
//! | `GET /health`            | [`ReportService::health`]                |
//! | `GET /student/:id`       | [`ReportService::student`]               |
//! | `GET /student/:id/grades`| [`ReportService::student_grades`]        |
//! | `GET /course/all/grades` | [`ReportService::course_grades`]         |

use serde::Serialize;
use serde_json::{Value, json};
use tracing::{error, warn};

use crate::error::ReportError;
use crate::service::ReportService;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Health,
    Student(String),
    StudentGrades(String),
    CourseGrades,
    NotFound,
}

impl Route {
    /// Matches a request path; a trailing query string is ignored.
    pub fn parse(path: &str) -> Self {
        let path = path.split('?').next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            ["health"] => Route::Health,
            ["student", id] => Route::Student((*id).to_string()),
            ["student", id, "grades"] => Route::StudentGrades((*id).to_string()),
            ["course", "all", "grades"] => Route::CourseGrades,
            _ => Route::NotFound,
        }
    }
}

/// Status code and JSON body of a handled request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    fn ok(body: &impl Serialize) -> Self {
        match serde_json::to_value(body) {
            Ok(body) => Self { status: 200, body },
            Err(e) => {
                error!(error = %e, "Response serialization failed");
                Self::status(500)
            }
        }
    }

    fn status(status: u16) -> Self {
        let reason = match status {
            404 => "Not Found",
            _ => "Internal Server Error",
        };
        Self {
            status,
            body: json!({ "error": reason }),
        }
    }

    fn from_error(e: &ReportError) -> Self {
        let status = e.status_code();
        if status >= 500 {
            error!(error = %e, "Request failed");
        } else {
            warn!(error = %e, "Request rejected");
        }
        Self::status(status)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

fn respond<T: Serialize>(result: crate::error::Result<T>) -> ApiResponse {
    match result {
        Ok(body) => ApiResponse::ok(&body),
        Err(e) => ApiResponse::from_error(&e),
    }
}

/// Ids that are not integers cannot name a student, so they are a 404.
fn parse_id(raw: &str) -> Result<i64, ReportError> {
    raw.parse()
        .map_err(|_| ReportError::StudentNotFound(raw.to_string()))
}

/// Routes `path` to its handler and renders the outcome.
#[tracing::instrument(skip(service))]
pub async fn dispatch(service: &ReportService, path: &str) -> ApiResponse {
    match Route::parse(path) {
        Route::Health => match service.health().await {
            Ok(()) => ApiResponse::ok(&json!({ "success": true })),
            Err(e) => ApiResponse::from_error(&e),
        },
        Route::Student(raw) => match parse_id(&raw) {
            Ok(id) => respond(service.student(id).await),
            Err(e) => ApiResponse::from_error(&e),
        },
        Route::StudentGrades(raw) => match parse_id(&raw) {
            Ok(id) => respond(service.student_grades(id).await),
            Err(e) => ApiResponse::from_error(&e),
        },
        Route::CourseGrades => respond(service.course_grades().await),
        Route::NotFound => ApiResponse::status(404),
    }
}
