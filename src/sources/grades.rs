use std::path::PathBuf;

use tracing::debug;

use super::GradeRecordSource;
use crate::course_stats::{GradeRecord, records_from_json};
use crate::error::{ReportError, Result};

/// Reads grade records from a JSON array on disk, re-reading it on every call.
///
/// ```json
/// [
///   { "id": 1, "course": "Calculus", "grade": 50 },
///   { "id": 1, "course": "Microeconomics", "grade": 30 }
/// ]
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileGradeSource {
    path: PathBuf,
}

impl JsonFileGradeSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl GradeRecordSource for JsonFileGradeSource {
    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    async fn load_all(&self) -> Result<Vec<GradeRecord>> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            ReportError::SourceUnavailable(format!("reading {}: {e}", self.path.display()))
        })?;

        let value: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
            ReportError::SourceUnavailable(format!("parsing {}: {e}", self.path.display()))
        })?;

        let records = records_from_json(value)?;
        debug!(records = records.len(), "Grade records loaded");
        Ok(records)
    }
}

/// Fixed in-memory record list.
#[derive(Debug, Clone, Default)]
pub struct MemoryGradeSource {
    records: Vec<GradeRecord>,
}

impl MemoryGradeSource {
    pub fn new(records: Vec<GradeRecord>) -> Self {
        Self { records }
    }
}

#[async_trait::async_trait]
impl GradeRecordSource for MemoryGradeSource {
    async fn load_all(&self) -> Result<Vec<GradeRecord>> {
        Ok(self.records.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(name)
    }

    #[tokio::test]
    async fn test_load_json_array() {
        let path = temp_path("grade_report_test_grades_ok.json");
        fs::write(
            &path,
            r#"[{"id":1,"course":"Calculus","grade":50},{"id":4,"course":"Calculus","grade":1}]"#,
        )
        .unwrap();

        let records = JsonFileGradeSource::new(&path).load_all().await.unwrap();
        assert_eq!(
            records,
            vec![
                GradeRecord::new(1, "Calculus", 50.0),
                GradeRecord::new(4, "Calculus", 1.0),
            ]
        );

        fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_is_source_unavailable() {
        let path = temp_path("grade_report_test_does_not_exist.json");
        let _ = fs::remove_file(&path);

        let err = JsonFileGradeSource::new(&path).load_all().await.unwrap_err();
        assert!(matches!(err, ReportError::SourceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_broken_json_is_source_unavailable() {
        let path = temp_path("grade_report_test_grades_broken.json");
        fs::write(&path, r#"[{"id":1,"course":"#).unwrap();

        let err = JsonFileGradeSource::new(&path).load_all().await.unwrap_err();
        assert!(matches!(err, ReportError::SourceUnavailable(_)));

        fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_non_array_document_is_invalid_input() {
        let path = temp_path("grade_report_test_grades_null.json");
        fs::write(&path, "null").unwrap();

        let err = JsonFileGradeSource::new(&path).load_all().await.unwrap_err();
        assert!(matches!(err, ReportError::InvalidInput(_)));

        fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_memory_source_returns_records() {
        let source = MemoryGradeSource::new(vec![GradeRecord::new(2, "Astronomy", 70.0)]);
        assert_eq!(source.load_all().await.unwrap().len(), 1);
    }
}
