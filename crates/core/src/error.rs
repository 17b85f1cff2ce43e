use thiserror::Error;

use crate::model::CourseSummaryError;
use crate::model::ProgressRecordError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    ProgressRecord(#[from] ProgressRecordError),
    #[error(transparent)]
    CourseSummary(#[from] CourseSummaryError),
}
