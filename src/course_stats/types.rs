//! Data types consumed and produced by the course statistics engine.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{ReportError, Result};

/// Largest magnitude below which every integral `f64` is exactly an `i64`.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Writes integral values without a fractional part (`50`, not `50.0`).
fn serialize_number<S: Serializer>(
    value: &f64,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < MAX_EXACT_INTEGER {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// A single student/course/grade row as delivered by a grade source.
///
/// Fields other than `id`, `course` and `grade` are kept in `extra` and
/// written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeRecord {
    #[serde(rename = "id", alias = "studentId")]
    pub student_id: i64,
    pub course: String,
    #[serde(serialize_with = "serialize_number")]
    pub grade: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GradeRecord {
    pub fn new(student_id: i64, course: impl Into<String>, grade: f64) -> Self {
        Self {
            student_id,
            course: course.into(),
            grade,
            extra: Map::new(),
        }
    }
}

/// Snapshot of the record holding the highest or lowest grade of a course.
pub type CourseExtremum = GradeRecord;

/// Finalized mean grade of a course, rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseAverage {
    pub course: String,
    #[serde(serialize_with = "serialize_number")]
    pub average: f64,
}

/// Response body of `/course/all/grades`.
///
/// Each list holds one entry per distinct course, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseStatsReport {
    pub highest_grade: Vec<CourseExtremum>,
    pub lowest_grade: Vec<CourseExtremum>,
    pub average_grade: Vec<CourseAverage>,
}

/// Interprets an already-parsed JSON document as an ordered list of grade records.
///
/// # Errors
///
/// Returns [`ReportError::InvalidInput`] when the document is not an array or
/// any element lacks one of the `id`, `course` and numeric `grade` fields.
pub fn records_from_json(value: Value) -> Result<Vec<GradeRecord>> {
    let Value::Array(items) = value else {
        return Err(ReportError::InvalidInput(format!(
            "expected an array of grade records, got {}",
            json_kind(&value)
        )));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item)
                .map_err(|e| ReportError::InvalidInput(format!("record {index}: {e}")))
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
