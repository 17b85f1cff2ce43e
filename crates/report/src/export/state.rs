use std::fmt;

/// Lifecycle of a single export invocation.
///
/// Exactly one variant is active at a time and transitions are one-way:
/// `Idle` moves to `Running`, which ends in `Done`, `Error`, or `Canceled`.
/// A finished export is never resumed; retrying means building a fresh one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportState {
    Idle,
    Running { downloaded: usize },
    Done { downloaded: usize },
    Error { message: String, downloaded: usize },
    Canceled { downloaded: usize },
}

impl ExportState {
    /// Rows fetched so far in this invocation.
    #[must_use]
    pub fn downloaded(&self) -> usize {
        match self {
            ExportState::Idle => 0,
            ExportState::Running { downloaded }
            | ExportState::Done { downloaded }
            | ExportState::Error { downloaded, .. }
            | ExportState::Canceled { downloaded } => *downloaded,
        }
    }

    /// Whether the invocation has ended, in any way.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ExportState::Idle | ExportState::Running { .. })
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            ExportState::Idle => "idle",
            ExportState::Running { .. } => "running",
            ExportState::Done { .. } => "done",
            ExportState::Error { .. } => "error",
            ExportState::Canceled { .. } => "canceled",
        }
    }
}

impl fmt::Display for ExportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportState::Idle => write!(f, "idle"),
            ExportState::Running { downloaded } => write!(f, "running ({downloaded} rows)"),
            ExportState::Done { downloaded } => write!(f, "done ({downloaded} rows)"),
            ExportState::Error {
                message,
                downloaded,
            } => write!(f, "error after {downloaded} rows: {message}"),
            ExportState::Canceled { downloaded } => write!(f, "canceled ({downloaded} rows)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downloaded_per_variant() {
        assert_eq!(ExportState::Idle.downloaded(), 0);
        assert_eq!(ExportState::Running { downloaded: 3 }.downloaded(), 3);
        assert_eq!(ExportState::Done { downloaded: 27 }.downloaded(), 27);
        assert_eq!(
            ExportState::Error {
                message: "boom".to_string(),
                downloaded: 12
            }
            .downloaded(),
            12
        );
        assert_eq!(ExportState::Canceled { downloaded: 5 }.downloaded(), 5);
    }

    #[test]
    fn test_terminal_variants() {
        assert!(!ExportState::Idle.is_terminal());
        assert!(!ExportState::Running { downloaded: 1 }.is_terminal());
        assert!(ExportState::Done { downloaded: 1 }.is_terminal());
        assert!(
            ExportState::Error {
                message: String::new(),
                downloaded: 0
            }
            .is_terminal()
        );
        assert!(ExportState::Canceled { downloaded: 0 }.is_terminal());
    }

    #[test]
    fn test_display_mentions_row_count() {
        let state = ExportState::Error {
            message: "company not found".to_string(),
            downloaded: 12,
        };
        assert_eq!(state.to_string(), "error after 12 rows: company not found");
    }
}
