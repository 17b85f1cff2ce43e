use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use progress_core::model::{ProgressFilter, ProgressRow};
use provider::ProgressProvider;

use super::state::ExportState;
use crate::error::ExportError;

/// Fixed page size for full exports, independent of any UI table page size.
pub const EXPORT_PAGE_SIZE: u32 = 100;

type ProgressFn = dyn Fn(usize) + Send + Sync;

/// One full-export invocation: pages through the provider until a short page
/// signals the end of the data, accumulating every matching row.
///
/// The driver owns its accumulator and state; nothing is shared between
/// invocations, and a finished driver cannot be rerun. Cancellation is
/// cooperative: the token is checked between pages and never aborts an
/// in-flight request, so cancel latency is at most one page round-trip.
pub struct CourseProgressExport {
    provider: Arc<dyn ProgressProvider>,
    filter: ProgressFilter,
    page_size: u32,
    cancel: CancellationToken,
    on_progress: Option<Box<ProgressFn>>,
    export_id: Uuid,
    state: ExportState,
    rows: Vec<ProgressRow>,
}

impl CourseProgressExport {
    /// Builds an idle export for the given filter.
    ///
    /// Any `limit`/`offset` on the filter are ignored; the driver stamps its
    /// own page windows.
    #[must_use]
    pub fn new(provider: Arc<dyn ProgressProvider>, filter: &ProgressFilter) -> Self {
        Self {
            provider,
            filter: filter.normalized(),
            page_size: EXPORT_PAGE_SIZE,
            cancel: CancellationToken::new(),
            on_progress: None,
            export_id: Uuid::new_v4(),
            state: ExportState::Idle,
            rows: Vec::new(),
        }
    }

    /// Overrides the export page size. Values below 1 are raised to 1.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Uses an externally owned cancellation token instead of a fresh one.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Registers a callback invoked with the accumulated row count after
    /// every page.
    #[must_use]
    pub fn with_progress(mut self, on_progress: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Box::new(on_progress));
        self
    }

    /// Handle for requesting cancellation between pages.
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    #[must_use]
    pub fn export_id(&self) -> Uuid {
        self.export_id
    }

    #[must_use]
    pub fn state(&self) -> &ExportState {
        &self.state
    }

    /// Rows fetched so far.
    #[must_use]
    pub fn downloaded(&self) -> usize {
        self.state.downloaded()
    }

    /// The accumulated rows. Empty until pages arrive, and cleared again if
    /// the export fails.
    #[must_use]
    pub fn rows(&self) -> &[ProgressRow] {
        &self.rows
    }

    /// Consumes the export, yielding the accumulated rows if it finished
    /// cleanly.
    #[must_use]
    pub fn into_rows(self) -> Option<Vec<ProgressRow>> {
        match self.state {
            ExportState::Done { .. } => Some(self.rows),
            _ => None,
        }
    }

    /// Drives the paging loop to a terminal state.
    ///
    /// Provider failures do not come back as `Err`; they land in the
    /// `Error` arm of the returned state with the accumulator discarded, so
    /// the caller can display the message and offer a retry.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::AlreadyStarted` when called on anything but an
    /// idle export.
    pub async fn run(&mut self) -> Result<&ExportState, ExportError> {
        if self.state != ExportState::Idle {
            return Err(ExportError::AlreadyStarted);
        }
        self.state = ExportState::Running { downloaded: 0 };
        info!(
            target: "export",
            export_id = %self.export_id,
            page_size = self.page_size,
            "starting course progress export"
        );

        loop {
            if self.cancel.is_cancelled() {
                let downloaded = self.rows.len();
                info!(target: "export", export_id = %self.export_id, downloaded, "export canceled");
                self.state = ExportState::Canceled { downloaded };
                return Ok(&self.state);
            }

            let offset = u32::try_from(self.rows.len()).unwrap_or(u32::MAX);
            let page_filter = self.filter.with_page(self.page_size, offset);
            match self.provider.list_rows(&page_filter).await {
                Ok(page) => {
                    let received = page.len();
                    debug!(
                        target: "export",
                        export_id = %self.export_id,
                        offset,
                        received,
                        "fetched export page"
                    );
                    self.rows.extend(page);
                    let downloaded = self.rows.len();
                    self.state = ExportState::Running { downloaded };
                    if let Some(on_progress) = &self.on_progress {
                        on_progress(downloaded);
                    }
                    if u32::try_from(received).unwrap_or(u32::MAX) < self.page_size {
                        info!(target: "export", export_id = %self.export_id, downloaded, "export finished");
                        self.state = ExportState::Done { downloaded };
                        return Ok(&self.state);
                    }
                }
                Err(error) => {
                    let downloaded = self.rows.len();
                    warn!(
                        target: "export",
                        export_id = %self.export_id,
                        downloaded,
                        %error,
                        "export failed"
                    );
                    self.rows.clear();
                    self.state = ExportState::Error {
                        message: error.to_string(),
                        downloaded,
                    };
                    return Ok(&self.state);
                }
            }
        }
    }
}

impl fmt::Debug for CourseProgressExport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CourseProgressExport")
            .field("export_id", &self.export_id)
            .field("page_size", &self.page_size)
            .field("state", &self.state)
            .field("rows", &self.rows.len())
            .finish_non_exhaustive()
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
