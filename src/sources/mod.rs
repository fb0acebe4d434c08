//! Collaborators the report service reads from.
//!
//! [`GradeRecordSource`] hands over the full, ordered list of grade records.
//! [`StudentStore`] is a key-value lookup of student rows by id.
//! Both come with a file-backed and an in-memory implementation.

mod grades;
mod students;

pub use grades::{JsonFileGradeSource, MemoryGradeSource};
pub use students::{CsvStudentStore, MemoryStudentStore, Student};

use crate::course_stats::GradeRecord;
use crate::error::Result;

/// Supplies every grade record, in a stable order.
///
/// Order matters: it decides first-seen tie-breaks and the course order of
/// the aggregated report.
#[async_trait::async_trait]
pub trait GradeRecordSource: Send + Sync {
    /// # Errors
    ///
    /// [`ReportError::SourceUnavailable`](crate::error::ReportError::SourceUnavailable)
    /// when the backing data cannot be read or parsed.
    async fn load_all(&self) -> Result<Vec<GradeRecord>>;
}

/// Lookup of student rows by id.
#[async_trait::async_trait]
pub trait StudentStore: Send + Sync {
    async fn find(&self, id: i64) -> Result<Option<Student>>;

    /// Succeeds when the store can be read; backs the health check.
    async fn ping(&self) -> Result<()>;
}
