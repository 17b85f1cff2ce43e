use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use progress_core::model::ProgressFilter;
use progress_core::time::Clock;
use provider::ProgressProvider;

use super::csv::progress_rows_csv;
use super::driver::{CourseProgressExport, EXPORT_PAGE_SIZE};
use super::sink::DownloadSink;
use super::state::ExportState;
use crate::error::ExportError;

/// Outcome of a completed export request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportDelivery {
    /// The file was handed to the sink.
    Delivered { filename: String, rows: usize },
    /// The export was canceled before finishing; nothing was delivered.
    Canceled { downloaded: usize },
}

/// Runs full exports end to end: drive the paging loop, render the CSV, and
/// deliver the file to the configured sink.
pub struct ExportService {
    provider: Arc<dyn ProgressProvider>,
    sink: Arc<dyn DownloadSink>,
    clock: Clock,
    page_size: u32,
}

impl ExportService {
    #[must_use]
    pub fn new(provider: Arc<dyn ProgressProvider>, sink: Arc<dyn DownloadSink>) -> Self {
        Self {
            provider,
            sink,
            clock: Clock::default_clock(),
            page_size: EXPORT_PAGE_SIZE,
        }
    }

    /// Uses the given clock for filename stamping.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Filename the next export will be delivered under.
    #[must_use]
    pub fn filename(&self) -> String {
        format!("company-course-progress-{}.csv", self.clock.today())
    }

    /// Exports every row matching the filter and delivers the file.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::Failed` when the provider fails mid-export, and
    /// `ExportError::Sink` when the finished file cannot be delivered.
    pub async fn export(&self, filter: &ProgressFilter) -> Result<ExportDelivery, ExportError> {
        self.export_with_cancellation(filter, CancellationToken::new())
            .await
    }

    /// Like [`export`](Self::export), but cancellable through the given
    /// token. Cancellation is not an error; it comes back as
    /// `ExportDelivery::Canceled` with no file delivered.
    pub async fn export_with_cancellation(
        &self,
        filter: &ProgressFilter,
        cancel: CancellationToken,
    ) -> Result<ExportDelivery, ExportError> {
        let mut export = CourseProgressExport::new(self.provider.clone(), filter)
            .with_page_size(self.page_size)
            .with_cancellation(cancel);
        let state = export.run().await?.clone();

        match state {
            ExportState::Done { downloaded } => {
                let document = progress_rows_csv(export.rows());
                let filename = self.filename();
                self.sink.deliver(&filename, &document).await?;
                Ok(ExportDelivery::Delivered {
                    filename,
                    rows: downloaded,
                })
            }
            ExportState::Canceled { downloaded } => Ok(ExportDelivery::Canceled { downloaded }),
            ExportState::Error { message, .. } => Err(ExportError::Failed { message }),
            ExportState::Idle | ExportState::Running { .. } => Err(ExportError::Failed {
                message: "export stopped without reaching a terminal state".to_string(),
            }),
        }
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
