use super::ids::{CourseId, UserId};

/// Category a course is filed under, as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseCategory {
    pub id: String,
    pub name: String,
}

impl CourseCategory {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Identity and display data for a learner enrolled in company courses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearnerInfo {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
    pub profile_picture: Option<String>,
}

impl LearnerInfo {
    #[must_use]
    pub fn new(
        id: UserId,
        full_name: impl Into<String>,
        email: impl Into<String>,
        profile_picture: Option<String>,
    ) -> Self {
        Self {
            id,
            full_name: full_name.into(),
            email: email.into(),
            profile_picture,
        }
    }
}

/// Identity and display data for a course in the company catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseInfo {
    pub id: CourseId,
    pub title: String,
    pub featured_image: Option<String>,
    pub category: Option<CourseCategory>,
}

impl CourseInfo {
    #[must_use]
    pub fn new(
        id: CourseId,
        title: impl Into<String>,
        featured_image: Option<String>,
        category: Option<CourseCategory>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            featured_image,
            category,
        }
    }

    /// Returns the category name, or an empty string when the course is
    /// uncategorized.
    #[must_use]
    pub fn category_name(&self) -> &str {
        self.category.as_ref().map_or("", |c| c.name.as_str())
    }
}
