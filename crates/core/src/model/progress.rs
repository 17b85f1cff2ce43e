use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use thiserror::Error;

use super::catalog::{CourseInfo, LearnerInfo};
use super::ids::ProgressId;

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ProgressRecordError {
    #[error("progress percentage out of range: {value}")]
    PercentageOutOfRange { value: f64 },

    #[error("average score out of range: {value}")]
    AverageScoreOutOfRange { value: f64 },
}

/// Per-learner progress through a single course, as reported by the provider.
///
/// Read-only from the reporting pipeline's perspective; the backend owns the
/// lifecycle of these records.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRecord {
    id: ProgressId,
    completed_lessons: Option<u32>,
    completed_quizzes: Option<u32>,
    total_lessons: Option<u32>,
    total_quizzes: Option<u32>,
    progress_percentage: f64,
    started_at: Option<DateTime<Utc>>,
    completed: bool,
    completed_at: Option<DateTime<Utc>>,
    average_score: Option<f64>,
    updated_at: DateTime<Utc>,
}

impl ProgressRecord {
    /// Builds a progress record, validating the reported numbers.
    ///
    /// # Errors
    ///
    /// Returns `ProgressRecordError::PercentageOutOfRange` if the percentage
    /// is not within `0..=100`, and `AverageScoreOutOfRange` for a score
    /// outside the same range.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ProgressId,
        completed_lessons: Option<u32>,
        completed_quizzes: Option<u32>,
        total_lessons: Option<u32>,
        total_quizzes: Option<u32>,
        progress_percentage: f64,
        started_at: Option<DateTime<Utc>>,
        completed: bool,
        completed_at: Option<DateTime<Utc>>,
        average_score: Option<f64>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, ProgressRecordError> {
        if !(0.0..=100.0).contains(&progress_percentage) {
            return Err(ProgressRecordError::PercentageOutOfRange {
                value: progress_percentage,
            });
        }
        if let Some(score) = average_score {
            if !(0.0..=100.0).contains(&score) {
                return Err(ProgressRecordError::AverageScoreOutOfRange { value: score });
            }
        }

        Ok(Self {
            id,
            completed_lessons,
            completed_quizzes,
            total_lessons,
            total_quizzes,
            progress_percentage,
            started_at,
            completed,
            completed_at,
            average_score,
            updated_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> &ProgressId {
        &self.id
    }

    #[must_use]
    pub fn completed_lessons(&self) -> Option<u32> {
        self.completed_lessons
    }

    #[must_use]
    pub fn completed_quizzes(&self) -> Option<u32> {
        self.completed_quizzes
    }

    #[must_use]
    pub fn total_lessons(&self) -> Option<u32> {
        self.total_lessons
    }

    #[must_use]
    pub fn total_quizzes(&self) -> Option<u32> {
        self.total_quizzes
    }

    #[must_use]
    pub fn progress_percentage(&self) -> f64 {
        self.progress_percentage
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn average_score(&self) -> Option<f64> {
        self.average_score
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Whether the learner has any recorded progress.
    ///
    /// Started means a strictly positive percentage, not the presence of a
    /// start timestamp.
    #[must_use]
    pub fn has_started(&self) -> bool {
        self.progress_percentage > 0.0
    }
}

// ─── Listing Rows ──────────────────────────────────────────────────────────────

/// One row of the course-progress listing: a learner, a course, and the
/// learner's progress through it.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRow {
    pub user: LearnerInfo,
    pub course: CourseInfo,
    pub progress: ProgressRecord,
}

impl ProgressRow {
    #[must_use]
    pub fn new(user: LearnerInfo, course: CourseInfo, progress: ProgressRecord) -> Self {
        Self {
            user,
            course,
            progress,
        }
    }

    /// Compares two rows by the listing order: course title, then user full
    /// name, with ids breaking any remaining ties.
    #[must_use]
    pub fn listing_cmp(&self, other: &Self) -> Ordering {
        self.course
            .title
            .cmp(&other.course.title)
            .then_with(|| self.user.full_name.cmp(&other.user.full_name))
            .then_with(|| self.course.id.cmp(&other.course.id))
            .then_with(|| self.user.id.cmp(&other.user.id))
    }
}

/// Sorts rows into the listing order shared by every provider.
pub fn sort_for_listing(rows: &mut [ProgressRow]) {
    rows.sort_by(ProgressRow::listing_cmp);
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
