//! Request and response shapes for the course-progress query API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use progress_core::model::{
    CourseCategory, CourseId, CourseInfo, CourseSummary, LearnerInfo, ProgressFilter, ProgressId,
    ProgressRecord, ProgressRow, UserId,
};

use crate::provider::ProviderError;

pub(crate) const COURSE_PROGRESS_QUERY: &str = r"
query CompanyCourseProgress($filter: CourseProgressFilter) {
  companyCourseProgress(filter: $filter) {
    user { id fullName email profilePicture }
    course { id title featuredImage category { id name } }
    progress {
      id
      completedLessons
      completedQuizzes
      totalLessons
      totalQuizzes
      progressPercentage
      startedAt
      completed
      completedAt
      averageScore
      updatedAt
    }
  }
}";

pub(crate) const COURSE_SUMMARIES_QUERY: &str = r"
query CompanyCourseSummaries($filter: CourseProgressFilter) {
  companyCourseSummaries(filter: $filter) {
    course { id title featuredImage category { id name } }
    enrolledCount
    startedCount
    completedCount
    avgProgressPercentage
  }
}";

// ─── Request ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct GraphqlRequest {
    query: &'static str,
    variables: Variables,
}

#[derive(Debug, Serialize)]
struct Variables {
    filter: FilterVars,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FilterVars {
    #[serde(skip_serializing_if = "Option::is_none")]
    search_user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    course_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<u32>,
}

impl GraphqlRequest {
    pub(crate) fn new(query: &'static str, filter: &ProgressFilter) -> Self {
        Self {
            query,
            variables: Variables {
                filter: FilterVars {
                    search_user: filter.search_user.clone(),
                    course_id: filter.course_id.as_ref().map(|id| id.as_str().to_string()),
                    completed: filter.completed,
                    limit: filter.limit,
                    offset: filter.offset,
                },
            },
        }
    }
}

// ─── Response ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct GraphqlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

impl<T> GraphqlResponse<T> {
    /// Surfaces the first query error verbatim, otherwise unwraps the data
    /// envelope.
    pub(crate) fn into_data(self) -> Result<T, ProviderError> {
        if let Some(errors) = self.errors {
            if let Some(first) = errors.into_iter().next() {
                return Err(ProviderError::Query(first.message));
            }
        }
        self.data
            .ok_or_else(|| ProviderError::Decode("response carried no data".to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RowListingData {
    #[serde(rename = "companyCourseProgress")]
    rows: Vec<RowDto>,
}

impl RowListingData {
    pub(crate) fn into_rows(self) -> Result<Vec<ProgressRow>, ProviderError> {
        self.rows.into_iter().map(RowDto::into_row).collect()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SummaryListingData {
    #[serde(rename = "companyCourseSummaries")]
    summaries: Vec<SummaryDto>,
}

impl SummaryListingData {
    pub(crate) fn into_summaries(self) -> Result<Vec<CourseSummary>, ProviderError> {
        self.summaries
            .into_iter()
            .map(SummaryDto::into_summary)
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct RowDto {
    user: UserDto,
    course: CourseDto,
    progress: ProgressDto,
}

impl RowDto {
    fn into_row(self) -> Result<ProgressRow, ProviderError> {
        Ok(ProgressRow::new(
            self.user.into_learner(),
            self.course.into_course(),
            self.progress.into_record()?,
        ))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserDto {
    id: String,
    full_name: String,
    email: String,
    profile_picture: Option<String>,
}

impl UserDto {
    fn into_learner(self) -> LearnerInfo {
        LearnerInfo::new(
            UserId::new(self.id),
            self.full_name,
            self.email,
            self.profile_picture,
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CourseDto {
    id: String,
    title: String,
    featured_image: Option<String>,
    category: Option<CategoryDto>,
}

impl CourseDto {
    fn into_course(self) -> CourseInfo {
        CourseInfo::new(
            CourseId::new(self.id),
            self.title,
            self.featured_image,
            self.category
                .map(|category| CourseCategory::new(category.id, category.name)),
        )
    }
}

#[derive(Debug, Deserialize)]
struct CategoryDto {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProgressDto {
    id: String,
    completed_lessons: Option<u32>,
    completed_quizzes: Option<u32>,
    total_lessons: Option<u32>,
    total_quizzes: Option<u32>,
    progress_percentage: f64,
    #[serde(default)]
    started_at: Option<String>,
    completed: bool,
    #[serde(default)]
    completed_at: Option<String>,
    average_score: Option<f64>,
    updated_at: String,
}

impl ProgressDto {
    fn into_record(self) -> Result<ProgressRecord, ProviderError> {
        let started_at = parse_optional_timestamp("startedAt", self.started_at)?;
        let completed_at = parse_optional_timestamp("completedAt", self.completed_at)?;
        let updated_at = parse_timestamp("updatedAt", &self.updated_at)?;
        Ok(ProgressRecord::new(
            ProgressId::new(self.id),
            self.completed_lessons,
            self.completed_quizzes,
            self.total_lessons,
            self.total_quizzes,
            self.progress_percentage,
            started_at,
            self.completed,
            completed_at,
            self.average_score,
            updated_at,
        )?)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDto {
    course: CourseDto,
    enrolled_count: u32,
    started_count: u32,
    completed_count: u32,
    avg_progress_percentage: f64,
}

impl SummaryDto {
    fn into_summary(self) -> Result<CourseSummary, ProviderError> {
        let rounded = self.avg_progress_percentage.round();
        if !(0.0..=100.0).contains(&rounded) {
            return Err(ProviderError::Decode(format!(
                "average progress out of range: {}",
                self.avg_progress_percentage
            )));
        }
        Ok(CourseSummary::from_counts(
            self.course.into_course(),
            self.enrolled_count,
            self.started_count,
            self.completed_count,
            rounded as u32,
        )?)
    }
}

/// Parses a backend timestamp, treating null and empty string as absent.
fn parse_optional_timestamp(
    field: &'static str,
    raw: Option<String>,
) -> Result<Option<DateTime<Utc>>, ProviderError> {
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_timestamp(field, &s).map(Some),
    }
}

fn parse_timestamp(field: &'static str, raw: &str) -> Result<DateTime<Utc>, ProviderError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| ProviderError::Decode(format!("bad {field} timestamp: {raw}")))
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_variables_skip_absent_fields() {
        let filter = ProgressFilter {
            search_user: Some("ana".to_string()),
            limit: Some(2),
            ..Default::default()
        };
        let request = GraphqlRequest::new(COURSE_PROGRESS_QUERY, &filter);
        let value = serde_json::to_value(&request).unwrap();
        let vars = &value["variables"]["filter"];
        assert_eq!(vars["searchUser"], "ana");
        assert_eq!(vars["limit"], 2);
        assert!(vars.get("courseId").is_none());
        assert!(vars.get("completed").is_none());
        assert!(vars.get("offset").is_none());
    }

    #[test]
    fn test_row_listing_maps_to_domain() {
        let body = json!({
            "data": {
                "companyCourseProgress": [
                    {
                        "user": {
                            "id": "u1",
                            "fullName": "Ana Castillo",
                            "email": "ana.castillo@example.test",
                            "profilePicture": null
                        },
                        "course": {
                            "id": "c1",
                            "title": "Customer Data Handling",
                            "featuredImage": null,
                            "category": { "id": "cat-1", "name": "Compliance" }
                        },
                        "progress": {
                            "id": "p1",
                            "completedLessons": 3,
                            "completedQuizzes": 1,
                            "totalLessons": 10,
                            "totalQuizzes": 2,
                            "progressPercentage": 30.0,
                            "startedAt": "2024-02-01T10:00:00Z",
                            "completed": false,
                            "completedAt": null,
                            "averageScore": 88.5,
                            "updatedAt": "2024-02-10T16:30:00Z"
                        }
                    }
                ]
            }
        });
        let response: GraphqlResponse<RowListingData> = serde_json::from_value(body).unwrap();
        let rows = response.into_data().unwrap().into_rows().unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.user.full_name, "Ana Castillo");
        assert_eq!(row.course.category_name(), "Compliance");
        assert_eq!(row.progress.progress_percentage(), 30.0);
        assert!(row.progress.completed_at().is_none());
    }

    #[test]
    fn test_empty_started_at_maps_to_absent() {
        let dto = ProgressDto {
            id: "p1".to_string(),
            completed_lessons: None,
            completed_quizzes: None,
            total_lessons: None,
            total_quizzes: None,
            progress_percentage: 0.0,
            started_at: Some(String::new()),
            completed: false,
            completed_at: None,
            average_score: None,
            updated_at: "2024-02-10T16:30:00Z".to_string(),
        };
        let record = dto.into_record().unwrap();
        assert!(record.started_at().is_none());
    }

    #[test]
    fn test_bad_timestamp_is_a_decode_error() {
        let result = parse_timestamp("updatedAt", "yesterday");
        assert!(matches!(result, Err(ProviderError::Decode(_))));
    }

    #[test]
    fn test_graphql_error_surfaces_message() {
        let body = json!({
            "data": null,
            "errors": [ { "message": "company not found" } ]
        });
        let response: GraphqlResponse<RowListingData> = serde_json::from_value(body).unwrap();
        let error = response.into_data().unwrap_err();
        assert!(matches!(error, ProviderError::Query(ref m) if m == "company not found"));
    }

    #[test]
    fn test_summary_mapping_rounds_average() {
        let body = json!({
            "data": {
                "companyCourseSummaries": [
                    {
                        "course": {
                            "id": "c1",
                            "title": "Customer Data Handling",
                            "featuredImage": null,
                            "category": null
                        },
                        "enrolledCount": 4,
                        "startedCount": 3,
                        "completedCount": 1,
                        "avgProgressPercentage": 62.4
                    }
                ]
            }
        });
        let response: GraphqlResponse<SummaryListingData> = serde_json::from_value(body).unwrap();
        let summaries = response.into_data().unwrap().into_summaries().unwrap();
        assert_eq!(summaries[0].avg_progress_percentage(), 62);
        assert_eq!(summaries[0].enrolled_count(), 4);
    }

    #[test]
    fn test_summary_mapping_rejects_impossible_counts() {
        let dto = SummaryDto {
            course: CourseDto {
                id: "c1".to_string(),
                title: "Customer Data Handling".to_string(),
                featured_image: None,
                category: None,
            },
            enrolled_count: 1,
            started_count: 0,
            completed_count: 5,
            avg_progress_percentage: 10.0,
        };
        assert!(dto.into_summary().is_err());
    }
}
