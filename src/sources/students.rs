use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::StudentStore;
use crate::error::{ReportError, Result};

/// A row of the student table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub is_registered: Option<bool>,
    pub city: Option<String>,
    pub state: Option<String>,
}

impl Student {
    /// A student with only an id, as used by tests and fixtures.
    pub fn with_id(id: i64) -> Self {
        Self {
            id,
            first_name: None,
            last_name: None,
            email: None,
            is_registered: None,
            city: None,
            state: None,
        }
    }
}

/// Student table kept as a header-ed CSV file.
///
/// The file is read on every call, so edits are visible without a restart.
#[derive(Debug, Clone)]
pub struct CsvStudentStore {
    path: PathBuf,
}

impl CsvStudentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read(&self) -> Result<Vec<u8>> {
        tokio::fs::read(&self.path).await.map_err(|e| {
            ReportError::StoreUnavailable(format!("reading {}: {e}", self.path.display()))
        })
    }
}

#[async_trait::async_trait]
impl StudentStore for CsvStudentStore {
    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    async fn find(&self, id: i64) -> Result<Option<Student>> {
        let bytes = self.read().await?;
        let mut rdr = csv::Reader::from_reader(bytes.as_slice());

        for (line, result) in rdr.deserialize().enumerate() {
            let student: Student = result.map_err(|e| {
                ReportError::StoreUnavailable(format!("row {}: {e}", line + 1))
            })?;
            if student.id == id {
                return Ok(Some(student));
            }
        }

        debug!(id, "Student not in store");
        Ok(None)
    }

    async fn ping(&self) -> Result<()> {
        let bytes = self.read().await?;
        let mut rdr = csv::Reader::from_reader(bytes.as_slice());
        let headers = rdr
            .headers()
            .map_err(|e| ReportError::StoreUnavailable(format!("reading headers: {e}")))?;

        if !headers.iter().any(|h| h == "id") {
            return Err(ReportError::StoreUnavailable(
                "student table has no id column".to_string(),
            ));
        }
        Ok(())
    }
}

/// In-memory student table.
#[derive(Debug, Clone, Default)]
pub struct MemoryStudentStore {
    students: HashMap<i64, Student>,
    available: bool,
}

impl MemoryStudentStore {
    pub fn new(students: impl IntoIterator<Item = Student>) -> Self {
        Self {
            students: students.into_iter().map(|s| (s.id, s)).collect(),
            available: true,
        }
    }

    /// A store whose every call fails with `StoreUnavailable`.
    pub fn unavailable() -> Self {
        Self {
            students: HashMap::new(),
            available: false,
        }
    }

    fn check(&self) -> Result<()> {
        if self.available {
            Ok(())
        } else {
            Err(ReportError::StoreUnavailable("store is offline".to_string()))
        }
    }
}

#[async_trait::async_trait]
impl StudentStore for MemoryStudentStore {
    async fn find(&self, id: i64) -> Result<Option<Student>> {
        self.check()?;
        Ok(self.students.get(&id).cloned())
    }

    async fn ping(&self) -> Result<()> {
        self.check()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    const CSV: &str = "\
id,first_name,last_name,email,is_registered,city,state
1,Scotty,Bashirian,Scotty.Bashirian@yahoo.com,true,Lake Roscoe,KS
2,Cierra,Huels,,false,,
";

    fn write_temp(name: &str, content: &str) -> PathBuf {
        let path = env::temp_dir().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_find_existing_student() {
        let path = write_temp("grade_report_test_students_find.csv", CSV);
        let store = CsvStudentStore::new(&path);

        let student = store.find(1).await.unwrap().unwrap();
        assert_eq!(student.first_name.as_deref(), Some("Scotty"));
        assert_eq!(student.is_registered, Some(true));

        let sparse = store.find(2).await.unwrap().unwrap();
        assert_eq!(sparse.email, None);
        assert_eq!(sparse.city, None);

        fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_find_missing_student() {
        let path = write_temp("grade_report_test_students_missing.csv", CSV);
        let store = CsvStudentStore::new(&path);

        assert_eq!(store.find(99).await.unwrap(), None);

        fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_ping() {
        let path = write_temp("grade_report_test_students_ping.csv", CSV);
        assert!(CsvStudentStore::new(&path).ping().await.is_ok());
        fs::remove_file(&path).unwrap();

        let err = CsvStudentStore::new(&path).ping().await.unwrap_err();
        assert!(matches!(err, ReportError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_ping_rejects_table_without_id() {
        let path = write_temp("grade_report_test_students_noid.csv", "name\nAda\n");
        let err = CsvStudentStore::new(&path).ping().await.unwrap_err();
        assert!(matches!(err, ReportError::StoreUnavailable(_)));
        fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryStudentStore::new([Student::with_id(5)]);
        assert_eq!(store.find(5).await.unwrap(), Some(Student::with_id(5)));
        assert_eq!(store.find(6).await.unwrap(), None);

        let offline = MemoryStudentStore::unavailable();
        assert!(offline.ping().await.is_err());
        assert!(offline.find(5).await.is_err());
    }
}
