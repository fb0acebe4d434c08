//! Error types shared by the record sources, the stats engine and the service.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    /// The grade input is not a sequence of well-formed records.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The grade record source could not be read or parsed.
    #[error("Grade source unavailable: {0}")]
    SourceUnavailable(String),

    /// The student store could not be reached.
    #[error("Student store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Student with ID {0} not found")]
    StudentNotFound(String),

    /// The computation was cancelled at a chunk boundary.
    #[error("Computation cancelled after {chunks_done} chunk(s)")]
    Cancelled { chunks_done: usize },

    /// A background chunk task panicked or was aborted.
    #[error("Aggregation task failed: {0}")]
    TaskFailed(String),
}

impl ReportError {
    /// Status code the HTTP surface reports for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ReportError::StudentNotFound(_) => 404,
            _ => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ReportError::StudentNotFound("7".into()).status_code(), 404);
        assert_eq!(ReportError::InvalidInput("x".into()).status_code(), 500);
        assert_eq!(ReportError::SourceUnavailable("x".into()).status_code(), 500);
        assert_eq!(ReportError::StoreUnavailable("x".into()).status_code(), 500);
        assert_eq!(ReportError::Cancelled { chunks_done: 2 }.status_code(), 500);
    }

    #[test]
    fn test_not_found_message() {
        let err = ReportError::StudentNotFound("42".into());
        assert_eq!(err.to_string(), "Student with ID 42 not found");
    }
}
