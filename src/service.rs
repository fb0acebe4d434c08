//! Request handlers behind the four report routes.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Config;
use crate::course_stats::{CancelToken, CourseStatsEngine, CourseStatsReport};
use crate::error::{ReportError, Result};
use crate::report::{StudentGradeReport, student_with_grades};
use crate::sources::{
    CsvStudentStore, GradeRecordSource, JsonFileGradeSource, Student, StudentStore,
};

/// Read-only reporting over a student store and a grade record source.
///
/// Holds no aggregation state: every course report allocates its own
/// accumulator, so concurrent calls never share anything mutable.
#[derive(Clone)]
pub struct ReportService {
    students: Arc<dyn StudentStore>,
    grades: Arc<dyn GradeRecordSource>,
    chunk_size: usize,
    cancel: Option<CancelToken>,
}

impl ReportService {
    pub fn new(
        students: Arc<dyn StudentStore>,
        grades: Arc<dyn GradeRecordSource>,
        chunk_size: usize,
    ) -> Self {
        Self {
            students,
            grades,
            chunk_size,
            cancel: None,
        }
    }

    /// CSV student table and JSON grade file, as named by `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(CsvStudentStore::new(&config.students_path)),
            Arc::new(JsonFileGradeSource::new(&config.grades_path)),
            config.chunk_size,
        )
    }

    /// Course reports started from this service stop at the next chunk
    /// boundary once `cancel` fires.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Fails only when the student store is unreachable.
    #[tracing::instrument(skip(self))]
    pub async fn health(&self) -> Result<()> {
        self.students.ping().await
    }

    #[tracing::instrument(skip(self))]
    pub async fn student(&self, id: i64) -> Result<Student> {
        self.students
            .find(id)
            .await?
            .ok_or_else(|| ReportError::StudentNotFound(id.to_string()))
    }

    #[tracing::instrument(skip(self))]
    pub async fn student_grades(&self, id: i64) -> Result<StudentGradeReport> {
        let student = self.student(id).await?;
        let records = self.grades.load_all().await?;
        let report = student_with_grades(student, &records);

        info!(grades = report.grades.len(), "Student grade report assembled");
        Ok(report)
    }

    #[tracing::instrument(skip(self))]
    pub async fn course_grades(&self) -> Result<CourseStatsReport> {
        let records = self.grades.load_all().await?;

        let mut engine = CourseStatsEngine::new().with_chunk_size(self.chunk_size)?;
        if let Some(token) = &self.cancel {
            engine = engine.with_cancel(token.clone());
        }

        engine.compute(&records).await.inspect_err(|e| {
            warn!(error = %e, "Course statistics aborted");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course_stats::GradeRecord;
    use crate::sources::{MemoryGradeSource, MemoryStudentStore};

    fn service(store: MemoryStudentStore, records: Vec<GradeRecord>) -> ReportService {
        ReportService::new(
            Arc::new(store),
            Arc::new(MemoryGradeSource::new(records)),
            2,
        )
    }

    fn records() -> Vec<GradeRecord> {
        vec![
            GradeRecord::new(1, "Calculus", 50.0),
            GradeRecord::new(2, "Calculus", 9.0),
            GradeRecord::new(1, "Astronomy", 63.0),
        ]
    }

    #[tokio::test]
    async fn test_health_reflects_student_store() {
        let ok = service(MemoryStudentStore::new([]), vec![]);
        assert!(ok.health().await.is_ok());

        let down = service(MemoryStudentStore::unavailable(), records());
        assert!(matches!(
            down.health().await,
            Err(ReportError::StoreUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_student_not_found() {
        let svc = service(MemoryStudentStore::new([Student::with_id(1)]), records());
        assert_eq!(svc.student(1).await.unwrap().id, 1);
        assert!(matches!(
            svc.student(3).await,
            Err(ReportError::StudentNotFound(_))
        ));
        assert!(matches!(
            svc.student_grades(3).await,
            Err(ReportError::StudentNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_student_grades_filters_by_id() {
        let svc = service(MemoryStudentStore::new([Student::with_id(1)]), records());
        let report = svc.student_grades(1).await.unwrap();

        let courses: Vec<_> = report.grades.iter().map(|g| g.course.as_str()).collect();
        assert_eq!(courses, ["Calculus", "Astronomy"]);
    }

    #[tokio::test]
    async fn test_course_grades() {
        let svc = service(MemoryStudentStore::new([]), records());
        let report = svc.course_grades().await.unwrap();

        assert_eq!(report.highest_grade[0], GradeRecord::new(1, "Calculus", 50.0));
        assert_eq!(report.lowest_grade[0], GradeRecord::new(2, "Calculus", 9.0));
        assert_eq!(report.average_grade[0].average, 29.5);
        assert_eq!(report.average_grade[1].course, "Astronomy");
    }

    #[tokio::test]
    async fn test_course_grades_independent_of_student_store() {
        let svc = service(MemoryStudentStore::unavailable(), records());
        assert!(svc.course_grades().await.is_ok());
    }

    #[tokio::test]
    async fn test_cancelled_course_grades() {
        let token = CancelToken::new();
        token.cancel();
        let svc = service(MemoryStudentStore::new([]), records()).with_cancel(token);

        assert!(matches!(
            svc.course_grades().await,
            Err(ReportError::Cancelled { .. })
        ));
    }

    #[tokio::test]
    async fn test_concurrent_reports_are_independent() {
        let svc = service(MemoryStudentStore::new([]), records());
        let (a, b) = tokio::join!(svc.course_grades(), svc.course_grades());
        assert_eq!(a.unwrap(), b.unwrap());
    }
}
