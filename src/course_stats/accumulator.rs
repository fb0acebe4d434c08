//! Course-keyed running state for one aggregation call.

use indexmap::IndexMap;

use crate::course_stats::types::{CourseAverage, CourseExtremum, CourseStatsReport, GradeRecord};
use crate::course_stats::utility::{mean, round_to};
use crate::error::{ReportError, Result};

/// Decimal places kept in the finalized averages.
const AVERAGE_PLACES: u32 = 2;

/// Running tally for a single course.
#[derive(Debug, Clone, PartialEq)]
struct CourseTally {
    highest: CourseExtremum,
    lowest: CourseExtremum,
    sum: f64,
    count: usize,
}

impl CourseTally {
    fn start(record: &GradeRecord) -> Self {
        Self {
            highest: record.clone(),
            lowest: record.clone(),
            sum: record.grade,
            count: 1,
        }
    }

    fn observe(&mut self, record: &GradeRecord) {
        // Strict comparisons: ties keep the earlier holder.
        if record.grade > self.highest.grade {
            self.highest = record.clone();
        }
        if record.grade < self.lowest.grade {
            self.lowest = record.clone();
        }
        self.sum += record.grade;
        self.count += 1;
    }

    fn absorb(&mut self, later: CourseTally) {
        if later.highest.grade > self.highest.grade {
            self.highest = later.highest;
        }
        if later.lowest.grade < self.lowest.grade {
            self.lowest = later.lowest;
        }
        self.sum += later.sum;
        self.count += later.count;
    }
}

/// Highest, lowest and sum/count per course, in first-seen course order.
///
/// Owned by exactly one computation; never shared between calls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseAccumulator {
    courses: IndexMap<String, CourseTally>,
    records_seen: usize,
}

impl CourseAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct courses seen so far.
    pub fn course_count(&self) -> usize {
        self.courses.len()
    }

    pub fn records_seen(&self) -> usize {
        self.records_seen
    }

    /// Folds one record into the running state.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::InvalidInput`] for a NaN or infinite grade.
    pub fn observe(&mut self, record: &GradeRecord) -> Result<()> {
        if !record.grade.is_finite() {
            return Err(ReportError::InvalidInput(format!(
                "grade for student {} in {} is not a finite number",
                record.student_id, record.course
            )));
        }

        match self.courses.get_mut(&record.course) {
            Some(tally) => tally.observe(record),
            None => {
                self.courses
                    .insert(record.course.clone(), CourseTally::start(record));
            }
        }
        self.records_seen += 1;
        Ok(())
    }

    /// Folds a contiguous slice of records, stopping at the first invalid one.
    pub fn observe_all(&mut self, records: &[GradeRecord]) -> Result<()> {
        records.iter().try_for_each(|record| self.observe(record))
    }

    /// Merges the partial state of records that come *after* this one's in input order.
    ///
    /// Earlier holders win ties and courses first seen in `later` are appended,
    /// so merging partials in input order equals a single sequential pass.
    pub fn merge(&mut self, later: CourseAccumulator) {
        for (course, tally) in later.courses {
            match self.courses.get_mut(&course) {
                Some(existing) => existing.absorb(tally),
                None => {
                    self.courses.insert(course, tally);
                }
            }
        }
        self.records_seen += later.records_seen;
    }

    /// Consumes the running state and builds the report, rounding the averages.
    pub fn finish(self) -> CourseStatsReport {
        let mut report = CourseStatsReport {
            highest_grade: Vec::with_capacity(self.courses.len()),
            lowest_grade: Vec::with_capacity(self.courses.len()),
            average_grade: Vec::with_capacity(self.courses.len()),
        };

        for (course, tally) in self.courses {
            report.average_grade.push(CourseAverage {
                average: round_to(mean(tally.sum, tally.count), AVERAGE_PLACES),
                course,
            });
            report.highest_grade.push(tally.highest);
            report.lowest_grade.push(tally.lowest);
        }

        report
    }
}
