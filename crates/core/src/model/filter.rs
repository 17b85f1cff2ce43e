use super::ids::CourseId;
use super::progress::ProgressRow;

/// UI dropdown sentinel meaning "no constraint".
const ALL_SENTINEL: &str = "all";

/// Raw filter fields as they arrive from UI controls, before normalization.
///
/// Strings may be untrimmed and may carry the "all" sentinel; numbers may be
/// negative. `normalize` turns this into a well-formed [`ProgressFilter`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressFilterDraft {
    pub search_user: Option<String>,
    pub course_id: Option<String>,
    pub completed: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ProgressFilterDraft {
    /// Canonicalizes the draft into a query-ready filter.
    ///
    /// Empty and whitespace-only strings become absent, the "all" sentinel
    /// becomes absent, the completion flag stays tri-state, and pagination
    /// bounds are clamped to be non-negative.
    #[must_use]
    pub fn normalize(self) -> ProgressFilter {
        ProgressFilter {
            search_user: normalize_search(self.search_user),
            course_id: self
                .course_id
                .and_then(|raw| normalize_choice(&raw))
                .map(CourseId::new),
            completed: self.completed.and_then(|raw| parse_completed(&raw)),
            limit: self.limit.map(clamp_bound),
            offset: self.offset.map(clamp_bound),
        }
    }
}

fn normalize_search(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Trims a dropdown value and drops empties and the "all" sentinel.
fn normalize_choice(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_SENTINEL) {
        return None;
    }
    Some(trimmed.to_string())
}

/// Resolves the tri-state completion dropdown.
///
/// Unknown values mean "no constraint" rather than an error; the dropdown is
/// not a trusted input.
fn parse_completed(raw: &str) -> Option<bool> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_SENTINEL) {
        return None;
    }
    if trimmed.eq_ignore_ascii_case("completed")
        || trimmed.eq_ignore_ascii_case("true")
        || trimmed.eq_ignore_ascii_case("yes")
    {
        return Some(true);
    }
    if trimmed.eq_ignore_ascii_case("in-progress")
        || trimmed.eq_ignore_ascii_case("in progress")
        || trimmed.eq_ignore_ascii_case("incomplete")
        || trimmed.eq_ignore_ascii_case("false")
        || trimmed.eq_ignore_ascii_case("no")
    {
        return Some(false);
    }
    None
}

fn clamp_bound(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

// ─── Normalized Filter ─────────────────────────────────────────────────────────

/// Canonical filter accepted by every provider operation.
///
/// `completed` is tri-state: `None` places no constraint on completion state
/// and is never collapsed to `false`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressFilter {
    pub search_user: Option<String>,
    pub course_id: Option<CourseId>,
    pub completed: Option<bool>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ProgressFilter {
    /// Re-canonicalizes a filter built by hand.
    ///
    /// Applying this to an already-normalized filter changes nothing.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            search_user: normalize_search(self.search_user.clone()),
            course_id: self
                .course_id
                .as_ref()
                .and_then(|id| normalize_choice(id.as_str()))
                .map(CourseId::new),
            completed: self.completed,
            limit: self.limit,
            offset: self.offset,
        }
    }

    /// Returns the same filter with pagination cleared, as the summary
    /// operation requires.
    #[must_use]
    pub fn without_pagination(&self) -> Self {
        Self {
            limit: None,
            offset: None,
            ..self.clone()
        }
    }

    /// Returns the same filter with pagination pinned to one page window.
    #[must_use]
    pub fn with_page(&self, limit: u32, offset: u32) -> Self {
        Self {
            limit: Some(limit),
            offset: Some(offset),
            ..self.clone()
        }
    }

    /// The single predicate every provider applies to decide whether a row
    /// matches. Pagination plays no part in matching.
    #[must_use]
    pub fn matches(&self, row: &ProgressRow) -> bool {
        if let Some(needle) = &self.search_user {
            let needle = needle.to_lowercase();
            let name_hit = row.user.full_name.to_lowercase().contains(&needle);
            let email_hit = row.user.email.to_lowercase().contains(&needle);
            if !name_hit && !email_hit {
                return false;
            }
        }
        if let Some(course_id) = &self.course_id {
            if row.course.id != *course_id {
                return false;
            }
        }
        if let Some(want) = self.completed {
            if row.progress.completed() != want {
                return false;
            }
        }
        true
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
