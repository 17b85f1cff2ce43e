use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use progress_core::model::{
    CompanyId, CourseCategory, CourseId, CourseInfo, CourseSummary, LearnerInfo, ProgressFilter,
    ProgressId, ProgressRecord, ProgressRow, UserId, sort_for_listing, summarize_rows,
};

use crate::provider::{ProgressProvider, ProviderError};

/// Offline stand-in for the remote provider.
///
/// The dataset is a pure function of the company id: a fixed roster of users
/// crossed with a fixed course catalog, minus a handful of seed-rotated
/// "not enrolled" gaps, with every progress value derived from a hash of
/// `(seed, user, course)`. Filtering, ordering, and aggregation go through
/// the same shared code paths as the remote provider, which makes this the
/// reference implementation of the provider contract.
#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    company: CompanyId,
    courses: Vec<CourseInfo>,
    rows: Vec<ProgressRow>,
}

impl SyntheticProvider {
    #[must_use]
    pub fn new(company: CompanyId) -> Self {
        let seed = company_seed(&company);
        let users = sample_users();
        let courses = sample_courses();

        let mut rows = Vec::new();
        for (user_idx, user) in users.iter().enumerate() {
            for (course_idx, course) in courses.iter().enumerate() {
                if is_excluded(seed, user_idx, course_idx, courses.len()) {
                    continue;
                }
                rows.push(build_row(seed, user_idx as u64, course_idx as u64, user, course));
            }
        }
        sort_for_listing(&mut rows);

        Self {
            company,
            courses,
            rows,
        }
    }

    #[must_use]
    pub fn company(&self) -> &CompanyId {
        &self.company
    }

    /// The full dataset in listing order, before any filtering.
    #[must_use]
    pub fn all_rows(&self) -> &[ProgressRow] {
        &self.rows
    }

    #[must_use]
    pub fn find_course(&self, id: &CourseId) -> Option<&CourseInfo> {
        self.courses.iter().find(|course| course.id == *id)
    }
}

#[async_trait]
impl ProgressProvider for SyntheticProvider {
    async fn list_rows(&self, filter: &ProgressFilter) -> Result<Vec<ProgressRow>, ProviderError> {
        let filter = filter.normalized();
        let offset = filter.offset.unwrap_or(0) as usize;
        let matching = self
            .rows
            .iter()
            .filter(|row| filter.matches(row))
            .skip(offset);
        let rows = match filter.limit {
            Some(limit) => matching.take(limit as usize).cloned().collect(),
            None => matching.cloned().collect(),
        };
        Ok(rows)
    }

    async fn list_summaries(
        &self,
        filter: &ProgressFilter,
    ) -> Result<Vec<CourseSummary>, ProviderError> {
        let filter = filter.normalized().without_pagination();
        let rows: Vec<ProgressRow> = self
            .rows
            .iter()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect();
        let scope = filter
            .course_id
            .as_ref()
            .and_then(|id| self.find_course(id));
        Ok(summarize_rows(&rows, scope))
    }
}

// ─── Dataset Construction ──────────────────────────────────────────────────────

/// Fixed start of the synthetic activity window (2024-01-08T09:00:00Z).
const DATASET_EPOCH: i64 = 1_704_704_400;

fn dataset_epoch() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(DATASET_EPOCH, 0).expect("dataset epoch should be valid")
}

fn sample_users() -> Vec<LearnerInfo> {
    [
        (
            "u1",
            "Ana Castillo",
            "ana.castillo@meridianlearn.test",
            Some("https://cdn.meridianlearn.test/avatars/u1.png"),
        ),
        ("u2", "Bruno Keller", "bruno.keller@meridianlearn.test", None),
        (
            "u3",
            "Chiara Moretti",
            "chiara.moretti@meridianlearn.test",
            Some("https://cdn.meridianlearn.test/avatars/u3.png"),
        ),
        ("u4", "Dmitri Volkov", "dmitri.volkov@meridianlearn.test", None),
        ("u5", "Elif Demir", "elif.demir@meridianlearn.test", None),
        ("u6", "Farid Haddad", "farid.haddad@meridianlearn.test", None),
    ]
    .into_iter()
    .map(|(id, name, email, picture)| {
        LearnerInfo::new(UserId::new(id), name, email, picture.map(str::to_string))
    })
    .collect()
}

fn sample_courses() -> Vec<CourseInfo> {
    [
        (
            "c1",
            "Customer Data Handling",
            Some("https://cdn.meridianlearn.test/covers/c1.jpg"),
            Some(("cat-1", "Compliance")),
        ),
        (
            "c2",
            "Incident Response Basics",
            Some("https://cdn.meridianlearn.test/covers/c2.jpg"),
            Some(("cat-2", "Security")),
        ),
        ("c3", "Effective Code Review", None, Some(("cat-3", "Engineering"))),
        (
            "c4",
            "Onboarding Essentials",
            Some("https://cdn.meridianlearn.test/covers/c4.jpg"),
            None,
        ),
        ("c5", "Workplace Security Awareness", None, Some(("cat-2", "Security"))),
    ]
    .into_iter()
    .map(|(id, title, image, category)| {
        CourseInfo::new(
            CourseId::new(id),
            title,
            image.map(str::to_string),
            category.map(|(cat_id, name)| CourseCategory::new(cat_id, name)),
        )
    })
    .collect()
}

/// Every odd-indexed user sits out exactly one course, rotated by the seed.
fn is_excluded(seed: u64, user_idx: usize, course_idx: usize, course_count: usize) -> bool {
    if user_idx % 2 == 0 {
        return false;
    }
    let rotation = bucket(seed.wrapping_add(user_idx as u64), course_count as u64) as usize;
    course_idx == rotation
}

fn build_row(
    seed: u64,
    user_idx: u64,
    course_idx: u64,
    user: &LearnerInfo,
    course: &CourseInfo,
) -> ProgressRow {
    let h = mix(seed, user_idx, course_idx);

    let completed = bucket(h >> 8, 4) == 0;
    let pct_units = if completed { 100 } else { bucket(h, 100) };
    let started = pct_units > 0;

    let total_lessons = 6 + bucket(course_idx, 4) * 2;
    let completed_lessons = total_lessons * pct_units / 100;
    let total_quizzes = 2 + bucket(course_idx, 3);
    let completed_quizzes = total_quizzes * pct_units / 100;
    let average_score = if completed_quizzes > 0 {
        Some(f64::from(55 + bucket(h >> 16, 46)))
    } else {
        None
    };

    let enrolled_at = dataset_epoch()
        + Duration::days(i64::from(bucket(h >> 24, 45)))
        + Duration::hours(i64::from(bucket(h >> 4, 9)));
    let started_at = started.then(|| enrolled_at + Duration::hours(i64::from(bucket(h >> 12, 72))));
    let updated_at = match started_at {
        Some(at) => at + Duration::days(i64::from(bucket(h >> 32, 30))),
        None => enrolled_at,
    };
    let completed_at = completed.then_some(updated_at);

    let progress = ProgressRecord::new(
        ProgressId::new(format!("p-{}-{}", user.id, course.id)),
        Some(completed_lessons),
        Some(completed_quizzes),
        Some(total_lessons),
        Some(total_quizzes),
        f64::from(pct_units),
        started_at,
        completed,
        completed_at,
        average_score,
        updated_at,
    )
    .expect("synthetic progress values are in range by construction");

    ProgressRow::new(user.clone(), course.clone(), progress)
}

// ─── Hashing ───────────────────────────────────────────────────────────────────

/// FNV-1a over the company id bytes.
fn company_seed(company: &CompanyId) -> u64 {
    let mut hash = 0xcbf2_9ce4_8422_2325_u64;
    for byte in company.as_str().bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x100_0000_01b3);
    }
    hash
}

/// splitmix64 finalizer over the packed inputs.
fn mix(seed: u64, user_idx: u64, course_idx: u64) -> u64 {
    let mut x = seed
        ^ user_idx.wrapping_mul(0x9e37_79b9_7f4a_7c15)
        ^ course_idx.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x ^= x >> 30;
    x = x.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^= x >> 31;
    x
}

/// Reduces a hash to `0..modulo`. `modulo` must fit in `u32`.
fn bucket(h: u64, modulo: u64) -> u32 {
    u32::try_from(h % modulo).unwrap_or(0)
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> SyntheticProvider {
        SyntheticProvider::new(CompanyId::new("meridian-works"))
    }

    #[test]
    fn test_dataset_is_deterministic_per_company() {
        let a = provider();
        let b = provider();
        assert_eq!(a.all_rows(), b.all_rows());
    }

    #[test]
    fn test_different_companies_differ_in_progress() {
        let a = SyntheticProvider::new(CompanyId::new("meridian-works"));
        let b = SyntheticProvider::new(CompanyId::new("other-company"));
        let a_pcts: Vec<f64> = a
            .all_rows()
            .iter()
            .map(|r| r.progress.progress_percentage())
            .collect();
        let b_pcts: Vec<f64> = b
            .all_rows()
            .iter()
            .map(|r| r.progress.progress_percentage())
            .collect();
        assert_ne!(a_pcts, b_pcts);
    }

    #[test]
    fn test_exclusions_leave_three_gaps() {
        // 6 users x 5 courses, odd-indexed users each sit out one course.
        assert_eq!(provider().all_rows().len(), 27);
    }

    #[test]
    fn test_rows_come_out_in_listing_order() {
        let rows = provider().all_rows().to_vec();
        let mut sorted = rows.clone();
        sort_for_listing(&mut sorted);
        assert_eq!(rows, sorted);
    }

    #[test]
    fn test_even_indexed_users_keep_every_course() {
        let provider = provider();
        let ana_rows = provider
            .all_rows()
            .iter()
            .filter(|r| r.user.full_name == "Ana Castillo")
            .count();
        assert_eq!(ana_rows, 5);
    }

    #[test]
    fn test_progress_values_respect_invariants() {
        for row in provider().all_rows() {
            let progress = &row.progress;
            let pct = progress.progress_percentage();
            assert!((0.0..=100.0).contains(&pct));
            if progress.completed() {
                assert_eq!(pct, 100.0);
                assert!(progress.completed_at().is_some());
            } else {
                assert!(progress.completed_at().is_none());
            }
            if pct == 0.0 {
                assert!(progress.started_at().is_none());
            } else {
                assert!(progress.started_at().is_some());
            }
            assert!(progress.completed_lessons() <= progress.total_lessons());
            assert!(progress.completed_quizzes() <= progress.total_quizzes());
            if let Some(started) = progress.started_at() {
                assert!(progress.updated_at() >= started);
            }
        }
    }

    #[test]
    fn test_find_course_knows_the_catalog() {
        let provider = provider();
        assert!(provider.find_course(&CourseId::new("c1")).is_some());
        assert!(provider.find_course(&CourseId::new("missing")).is_none());
    }
}
