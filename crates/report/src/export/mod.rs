//! Full-export pipeline: page through a provider, render CSV, deliver the
//! file.

mod csv;
mod driver;
mod service;
mod sink;
mod state;

pub use csv::{EXPORT_COLUMNS, progress_rows_csv, project_row};
pub use driver::{CourseProgressExport, EXPORT_PAGE_SIZE};
pub use service::{ExportDelivery, ExportService};
pub use sink::{DownloadSink, FileSink, MemorySink};
pub use state::ExportState;
