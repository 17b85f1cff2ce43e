//! Shared error types for the report crate.

use thiserror::Error;

use provider::ProviderError;

/// Errors emitted by download sinks.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SinkError {
    #[error("refusing filename with path separators: {0}")]
    InvalidFilename(String),
    #[error("delivery failed: {0}")]
    Delivery(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors emitted by the export driver and `ExportService`.
///
/// A provider failure during export is not represented here; it lands in the
/// `Error` arm of the export state with the provider's message, and
/// `ExportService` resurfaces it as `Failed`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExportError {
    #[error("export already started; build a fresh export to retry")]
    AlreadyStarted,
    #[error("{message}")]
    Failed { message: String },
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Errors emitted by `ProgressReportService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReportError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
}
