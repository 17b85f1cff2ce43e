use chrono::{DateTime, SecondsFormat, Utc};

use progress_core::model::ProgressRow;

/// Column order of the exported file. The header row is spelled exactly like
/// this, and `project_row` yields values in the same order.
pub const EXPORT_COLUMNS: [&str; 12] = [
    "user_name",
    "user_email",
    "course_title",
    "category",
    "progress_pct",
    "completed",
    "lessons",
    "quizzes",
    "avg_score",
    "started_at",
    "updated_at",
    "completed_at",
];

/// Renders rows as a CSV document. The header line is always present, even
/// for an empty export.
#[must_use]
pub fn progress_rows_csv(rows: &[ProgressRow]) -> String {
    let mut out = String::new();
    write_line(&mut out, EXPORT_COLUMNS.iter().map(|c| (*c).to_string()));
    for row in rows {
        write_line(&mut out, project_row(row).into_iter());
    }
    out
}

/// Flattens one row into the twelve export columns. Absent values become
/// empty strings; lesson and quiz progress are rendered as
/// `<completed>/<total>` fractions.
#[must_use]
pub fn project_row(row: &ProgressRow) -> [String; 12] {
    let progress = &row.progress;
    [
        row.user.full_name.clone(),
        row.user.email.clone(),
        row.course.title.clone(),
        row.course.category_name().to_string(),
        progress.progress_percentage().to_string(),
        progress.completed().to_string(),
        format!(
            "{}/{}",
            progress.completed_lessons().unwrap_or(0),
            progress.total_lessons().unwrap_or(0)
        ),
        format!(
            "{}/{}",
            progress.completed_quizzes().unwrap_or(0),
            progress.total_quizzes().unwrap_or(0)
        ),
        progress
            .average_score()
            .map(|score| score.to_string())
            .unwrap_or_default(),
        format_timestamp(progress.started_at()),
        format_timestamp(Some(progress.updated_at())),
        format_timestamp(progress.completed_at()),
    ]
}

fn format_timestamp(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

fn write_line(out: &mut String, fields: impl Iterator<Item = String>) {
    for (index, field) in fields.enumerate() {
        if index > 0 {
            out.push(',');
        }
        out.push_str(&escape_field(&field));
    }
    out.push('\n');
}

/// Quotes a field when it contains a delimiter, quote, or line break, with
/// inner quotes doubled.
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        let mut escaped = String::with_capacity(field.len() + 2);
        escaped.push('"');
        for ch in field.chars() {
            if ch == '"' {
                escaped.push('"');
            }
            escaped.push(ch);
        }
        escaped.push('"');
        escaped
    } else {
        field.to_string()
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use progress_core::model::{
        CourseCategory, CourseId, CourseInfo, LearnerInfo, ProgressId, ProgressRecord, UserId,
    };

    fn timestamp(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn build_row(name: &str, title: &str) -> ProgressRow {
        let user = LearnerInfo::new(UserId::new("u1"), name, "rosa@example.test", None);
        let course = CourseInfo::new(
            CourseId::new("c1"),
            title,
            None,
            Some(CourseCategory::new("cat-1", "Compliance")),
        );
        let progress = ProgressRecord::new(
            ProgressId::new("p1"),
            Some(3),
            Some(1),
            Some(8),
            Some(2),
            37.5,
            Some(timestamp(1_700_000_000)),
            false,
            None,
            Some(81.5),
            timestamp(1_700_100_000),
        )
        .unwrap();
        ProgressRow::new(user, course, progress)
    }

    /// Minimal quoted-field reader used to check the writer against a
    /// standard CSV interpretation.
    fn parse_line(line: &str) -> Vec<String> {
        let mut fields = Vec::new();
        let mut current = String::new();
        let mut chars = line.chars().peekable();
        let mut quoted = false;
        while let Some(ch) = chars.next() {
            if quoted {
                if ch == '"' {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        current.push('"');
                    } else {
                        quoted = false;
                    }
                } else {
                    current.push(ch);
                }
            } else if ch == '"' {
                quoted = true;
            } else if ch == ',' {
                fields.push(std::mem::take(&mut current));
            } else {
                current.push(ch);
            }
        }
        fields.push(current);
        fields
    }

    #[test]
    fn header_line_matches_the_export_columns() {
        let csv = progress_rows_csv(&[]);
        assert_eq!(
            csv,
            "user_name,user_email,course_title,category,progress_pct,completed,\
             lessons,quizzes,avg_score,started_at,updated_at,completed_at\n"
        );
    }

    #[test]
    fn plain_row_is_projected_in_column_order() {
        let row = build_row("Rosa Vidal", "Incident Response Basics");
        let csv = progress_rows_csv(&[row]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "Rosa Vidal,rosa@example.test,Incident Response Basics,Compliance,\
             37.5,false,3/8,1/2,81.5,2023-11-14T22:13:20Z,2023-11-16T02:00:00Z,"
        );
    }

    #[test]
    fn fields_with_delimiters_are_quoted_and_round_trip() {
        let row = build_row("Vidal, Rosa \"Ro\"\nnight shift", "Incident Response Basics");
        let csv = progress_rows_csv(&[row.clone()]);

        // The embedded newline stays inside the quoted field, so the record
        // runs to the final terminator.
        let body = csv.split_once('\n').unwrap().1;
        let record = body.strip_suffix('\n').unwrap();
        let fields = parse_line(record);
        assert_eq!(fields[0], "Vidal, Rosa \"Ro\"\nnight shift");
        assert_eq!(fields[1], row.user.email);
        assert!(csv.contains("\"Vidal, Rosa \"\"Ro\"\"\nnight shift\""));
    }

    #[test]
    fn absent_values_render_as_empty_fields() {
        let user = LearnerInfo::new(UserId::new("u2"), "Bruno Keller", "bruno@example.test", None);
        let course = CourseInfo::new(CourseId::new("c2"), "Onboarding Essentials", None, None);
        let progress = ProgressRecord::new(
            ProgressId::new("p2"),
            None,
            None,
            None,
            None,
            0.0,
            None,
            false,
            None,
            None,
            timestamp(1_700_000_000),
        )
        .unwrap();
        let fields = project_row(&ProgressRow::new(user, course, progress));

        assert_eq!(fields[3], "");
        assert_eq!(fields[4], "0");
        assert_eq!(fields[6], "0/0");
        assert_eq!(fields[7], "0/0");
        assert_eq!(fields[8], "");
        assert_eq!(fields[9], "");
        assert_eq!(fields[10], "2023-11-14T22:13:20Z");
        assert_eq!(fields[11], "");
    }

    #[test]
    fn whole_percentages_drop_the_fraction() {
        let user = LearnerInfo::new(UserId::new("u3"), "Chiara Moretti", "chiara@example.test", None);
        let course = CourseInfo::new(CourseId::new("c3"), "Effective Code Review", None, None);
        let progress = ProgressRecord::new(
            ProgressId::new("p3"),
            Some(8),
            Some(2),
            Some(8),
            Some(2),
            100.0,
            Some(timestamp(1_700_000_000)),
            true,
            Some(timestamp(1_700_200_000)),
            Some(90.0),
            timestamp(1_700_200_000),
        )
        .unwrap();
        let fields = project_row(&ProgressRow::new(user, course, progress));

        assert_eq!(fields[4], "100");
        assert_eq!(fields[8], "90");
        assert_eq!(fields[11], "2023-11-17T05:46:40Z");
    }
}
