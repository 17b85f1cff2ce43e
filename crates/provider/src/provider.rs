use async_trait::async_trait;
use thiserror::Error;

use progress_core::model::{
    CourseSummary, CourseSummaryError, ProgressFilter, ProgressRecordError, ProgressRow,
};

/// Page size a listing falls back to when the filter carries no `limit`.
///
/// This is the dashboard's default table page, not the export page size.
pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// Errors emitted by progress providers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProviderError {
    #[error("provider request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("{0}")]
    Query(String),
    #[error("malformed provider response: {0}")]
    Decode(String),
    #[error(transparent)]
    InvalidRecord(#[from] ProgressRecordError),
    #[error(transparent)]
    InvalidSummary(#[from] CourseSummaryError),
}

/// Read-only access to a company's course-progress dataset.
///
/// Both operations take the same filter and must agree on its predicate and
/// on row ordering, so callers can swap the remote backend and the synthetic
/// dataset freely. Implementations normalize the filter on entry; a filter
/// built by hand behaves exactly like one that came through the UI
/// normalizer.
#[async_trait]
pub trait ProgressProvider: Send + Sync {
    /// Lists matching rows ordered by course title, then user full name.
    ///
    /// Honors `limit` and `offset`. A returned page shorter than the
    /// requested `limit` means no further data exists beyond it. When
    /// `limit` is absent the full remainder past `offset` is returned.
    async fn list_rows(&self, filter: &ProgressFilter) -> Result<Vec<ProgressRow>, ProviderError>;

    /// Lists per-course aggregates for the same predicate.
    ///
    /// Never paginated; `limit`/`offset` on the filter are ignored. Ordered
    /// by course title ascending.
    async fn list_summaries(
        &self,
        filter: &ProgressFilter,
    ) -> Result<Vec<CourseSummary>, ProviderError>;
}
