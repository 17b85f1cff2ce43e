//! Company course-progress reporting: the dashboard read side and the
//! cancellable full-CSV export pipeline.

#![forbid(unsafe_code)]

pub mod dashboard;
pub mod error;
pub mod export;

pub use dashboard::ProgressReportService;
pub use error::{ExportError, ReportError, SinkError};
pub use export::{ExportDelivery, ExportService, ExportState};
