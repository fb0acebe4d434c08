//! Per-student grade report.

use serde::Serialize;

use crate::course_stats::GradeRecord;
use crate::sources::Student;

/// A student row with that student's grade records, serialized flat:
/// `{ "id": .., "first_name": .., ..., "grades": [..] }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentGradeReport {
    #[serde(flatten)]
    pub student: Student,
    pub grades: Vec<GradeRecord>,
}

/// Keeps the records belonging to `student`, in source order.
pub fn student_with_grades(student: Student, records: &[GradeRecord]) -> StudentGradeReport {
    let grades = records
        .iter()
        .filter(|r| r.student_id == student.id)
        .cloned()
        .collect();

    StudentGradeReport { student, grades }
}
