//! Course grade aggregation.
//!
//! Scans every student-grade record once and reports, per course, the record
//! holding the highest grade, the record holding the lowest grade, and the mean
//! grade rounded to two decimals. Work is split into fixed-size chunks with a
//! cooperative yield between them.

pub mod accumulator;
pub mod engine;
pub mod schedule;
pub mod types;
pub mod utility;

pub use accumulator::CourseAccumulator;
pub use engine::{CourseStatsEngine, DEFAULT_CHUNK_SIZE};
pub use schedule::{CancelToken, NoYield, TokioYield, Yielder};
pub use types::{CourseAverage, CourseExtremum, CourseStatsReport, GradeRecord, records_from_json};

use crate::error::Result;

/// Aggregates `records` with the default chunk size, yielding to tokio between chunks.
pub async fn compute_course_stats(records: &[GradeRecord]) -> Result<CourseStatsReport> {
    CourseStatsEngine::new().compute(records).await
}
