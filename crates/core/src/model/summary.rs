use std::collections::HashMap;
use thiserror::Error;

use super::catalog::CourseInfo;
use super::ids::CourseId;
use super::progress::ProgressRow;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CourseSummaryError {
    #[error("started count ({started}) exceeds enrolled count ({enrolled})")]
    StartedExceedsEnrolled { started: u32, enrolled: u32 },

    #[error("completed count ({completed}) exceeds enrolled count ({enrolled})")]
    CompletedExceedsEnrolled { completed: u32, enrolled: u32 },

    #[error("average progress out of range: {value}")]
    AverageOutOfRange { value: u32 },
}

/// Per-course roll-up over the filtered row set.
///
/// Derived, never persisted. `enrolled_count` is the number of matching rows
/// for the course, `started_count` those with progress above zero,
/// `completed_count` those flagged completed, and `avg_progress_percentage`
/// the mean progress rounded to the nearest whole percentage.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseSummary {
    course: CourseInfo,
    enrolled_count: u32,
    started_count: u32,
    completed_count: u32,
    avg_progress_percentage: u8,
}

impl CourseSummary {
    /// Rehydrate a summary from counts reported elsewhere.
    ///
    /// # Errors
    ///
    /// Returns an error when the counts cannot describe a real group, for
    /// example more completions than enrollments.
    pub fn from_counts(
        course: CourseInfo,
        enrolled_count: u32,
        started_count: u32,
        completed_count: u32,
        avg_progress_percentage: u32,
    ) -> Result<Self, CourseSummaryError> {
        if started_count > enrolled_count {
            return Err(CourseSummaryError::StartedExceedsEnrolled {
                started: started_count,
                enrolled: enrolled_count,
            });
        }
        if completed_count > enrolled_count {
            return Err(CourseSummaryError::CompletedExceedsEnrolled {
                completed: completed_count,
                enrolled: enrolled_count,
            });
        }
        let avg = u8::try_from(avg_progress_percentage).map_err(|_| {
            CourseSummaryError::AverageOutOfRange {
                value: avg_progress_percentage,
            }
        })?;
        if avg > 100 {
            return Err(CourseSummaryError::AverageOutOfRange {
                value: avg_progress_percentage,
            });
        }

        Ok(Self {
            course,
            enrolled_count,
            started_count,
            completed_count,
            avg_progress_percentage: avg,
        })
    }

    #[must_use]
    pub fn course(&self) -> &CourseInfo {
        &self.course
    }

    #[must_use]
    pub fn enrolled_count(&self) -> u32 {
        self.enrolled_count
    }

    #[must_use]
    pub fn started_count(&self) -> u32 {
        self.started_count
    }

    #[must_use]
    pub fn completed_count(&self) -> u32 {
        self.completed_count
    }

    #[must_use]
    pub fn avg_progress_percentage(&self) -> u8 {
        self.avg_progress_percentage
    }
}

// ─── Aggregation ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct GroupCounts {
    course: CourseInfo,
    enrolled: u32,
    started: u32,
    completed: u32,
    percentage_sum: f64,
}

impl GroupCounts {
    fn empty(course: CourseInfo) -> Self {
        Self {
            course,
            enrolled: 0,
            started: 0,
            completed: 0,
            percentage_sum: 0.0,
        }
    }

    fn into_summary(self) -> CourseSummary {
        let avg = if self.enrolled == 0 {
            0
        } else {
            (self.percentage_sum / f64::from(self.enrolled)).round() as u8
        };
        CourseSummary {
            course: self.course,
            enrolled_count: self.enrolled,
            started_count: self.started,
            completed_count: self.completed,
            avg_progress_percentage: avg,
        }
    }
}

/// Incremental per-course aggregator over filtered rows.
///
/// Feed it rows one page at a time or all at once; `finish` yields summaries
/// ordered by course title. A scoped accumulator restricts the output to one
/// course and reports it even when no row matched, so a filtered-out course
/// shows up as zeros instead of disappearing.
#[derive(Debug, Clone)]
pub struct SummaryAccumulator {
    scope: Option<CourseId>,
    groups: HashMap<CourseId, GroupCounts>,
}

impl SummaryAccumulator {
    /// Accumulator over every course observed in the rows.
    #[must_use]
    pub fn new() -> Self {
        Self {
            scope: None,
            groups: HashMap::new(),
        }
    }

    /// Accumulator restricted to a single course.
    #[must_use]
    pub fn scoped(course: CourseInfo) -> Self {
        let mut groups = HashMap::new();
        groups.insert(course.id.clone(), GroupCounts::empty(course.clone()));
        Self {
            scope: Some(course.id),
            groups,
        }
    }

    /// Folds one row into its course group.
    ///
    /// Rows outside a scoped course are ignored.
    pub fn observe(&mut self, row: &ProgressRow) {
        if let Some(scope) = &self.scope {
            if row.course.id != *scope {
                return;
            }
        }
        let group = self
            .groups
            .entry(row.course.id.clone())
            .or_insert_with(|| GroupCounts::empty(row.course.clone()));
        group.enrolled = group.enrolled.saturating_add(1);
        if row.progress.has_started() {
            group.started = group.started.saturating_add(1);
        }
        if row.progress.completed() {
            group.completed = group.completed.saturating_add(1);
        }
        group.percentage_sum += row.progress.progress_percentage();
    }

    /// Produces the summaries, ordered by course title with course id
    /// breaking ties.
    #[must_use]
    pub fn finish(self) -> Vec<CourseSummary> {
        let mut summaries: Vec<CourseSummary> = self
            .groups
            .into_values()
            .map(GroupCounts::into_summary)
            .collect();
        summaries.sort_by(|a, b| {
            a.course
                .title
                .cmp(&b.course.title)
                .then_with(|| a.course.id.cmp(&b.course.id))
        });
        summaries
    }
}

impl Default for SummaryAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot aggregation over an already-collected, unpaginated row set.
#[must_use]
pub fn summarize_rows(rows: &[ProgressRow], scope: Option<&CourseInfo>) -> Vec<CourseSummary> {
    let mut accumulator = match scope {
        Some(course) => SummaryAccumulator::scoped(course.clone()),
        None => SummaryAccumulator::new(),
    };
    for row in rows {
        accumulator.observe(row);
    }
    accumulator.finish()
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
