use std::sync::Arc;

use progress_core::model::{CourseSummary, ProgressFilter, ProgressRow};
use provider::{DEFAULT_PAGE_SIZE, ProgressProvider};

use crate::error::ReportError;

/// Read side of the course-progress dashboard: one paginated row listing and
/// one per-course summary strip, both driven by the same filter.
///
/// The two queries are independent; a failure in one does not invalidate the
/// other's result.
pub struct ProgressReportService {
    provider: Arc<dyn ProgressProvider>,
}

impl ProgressReportService {
    #[must_use]
    pub fn new(provider: Arc<dyn ProgressProvider>) -> Self {
        Self { provider }
    }

    /// One page of the progress table. A filter without an explicit limit
    /// gets the dashboard's default page size rather than the full result.
    ///
    /// # Errors
    ///
    /// Surfaces the provider failure unchanged.
    pub async fn rows_page(
        &self,
        filter: &ProgressFilter,
    ) -> Result<Vec<ProgressRow>, ReportError> {
        let mut filter = filter.normalized();
        if filter.limit.is_none() {
            filter.limit = Some(DEFAULT_PAGE_SIZE);
        }
        Ok(self.provider.list_rows(&filter).await?)
    }

    /// Per-course summary cards for every course the filter touches. The
    /// filter's pagination has no effect here.
    ///
    /// # Errors
    ///
    /// Surfaces the provider failure unchanged.
    pub async fn course_summaries(
        &self,
        filter: &ProgressFilter,
    ) -> Result<Vec<CourseSummary>, ReportError> {
        let filter = filter.normalized();
        Ok(self.provider.list_summaries(&filter).await?)
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
