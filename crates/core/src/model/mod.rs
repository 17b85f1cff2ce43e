mod catalog;
mod filter;
mod ids;
mod progress;
mod summary;

pub use catalog::{CourseCategory, CourseInfo, LearnerInfo};
pub use filter::{ProgressFilter, ProgressFilterDraft};
pub use ids::{CompanyId, CourseId, ParseIdError, ProgressId, UserId};
pub use progress::{ProgressRecord, ProgressRecordError, ProgressRow, sort_for_listing};
pub use summary::{CourseSummary, CourseSummaryError, SummaryAccumulator, summarize_rows};
