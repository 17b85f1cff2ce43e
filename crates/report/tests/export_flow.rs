//! End-to-end export flows: synthetic data in, CSV files out.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use progress_core::model::{CompanyId, CourseSummary, ProgressFilter, ProgressRow};
use progress_core::time::fixed_clock;
use provider::{ProgressProvider, ProviderError, SyntheticProvider};
use report::export::{FileSink, MemorySink};
use report::{ExportDelivery, ExportError, ExportService};

const HEADER: &str = "user_name,user_email,course_title,category,progress_pct,completed,\
                      lessons,quizzes,avg_score,started_at,updated_at,completed_at";

fn synthetic() -> Arc<SyntheticProvider> {
    Arc::new(SyntheticProvider::new(CompanyId::new("meridian-works")))
}

/// Serves pages normally and fires the cancellation token after each one.
struct CancelingProvider {
    inner: Arc<SyntheticProvider>,
    cancel: CancellationToken,
}

#[async_trait]
impl ProgressProvider for CancelingProvider {
    async fn list_rows(&self, filter: &ProgressFilter) -> Result<Vec<ProgressRow>, ProviderError> {
        let rows = self.inner.list_rows(filter).await?;
        self.cancel.cancel();
        Ok(rows)
    }

    async fn list_summaries(
        &self,
        filter: &ProgressFilter,
    ) -> Result<Vec<CourseSummary>, ProviderError> {
        self.inner.list_summaries(filter).await
    }
}

struct OfflineProvider;

#[async_trait]
impl ProgressProvider for OfflineProvider {
    async fn list_rows(
        &self,
        _filter: &ProgressFilter,
    ) -> Result<Vec<ProgressRow>, ProviderError> {
        Err(ProviderError::Query("progress backend offline".to_string()))
    }

    async fn list_summaries(
        &self,
        _filter: &ProgressFilter,
    ) -> Result<Vec<CourseSummary>, ProviderError> {
        Err(ProviderError::Query("progress backend offline".to_string()))
    }
}

#[tokio::test]
async fn full_export_lands_in_the_sink() {
    let sink = MemorySink::new();
    let service = ExportService::new(synthetic(), Arc::new(sink.clone()))
        .with_clock(fixed_clock())
        .with_page_size(10);

    let delivery = service.export(&ProgressFilter::default()).await.unwrap();
    assert_eq!(
        delivery,
        ExportDelivery::Delivered {
            filename: "company-course-progress-2023-11-14.csv".to_string(),
            rows: 27,
        }
    );

    let delivered = sink.delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].0, "company-course-progress-2023-11-14.csv");

    let lines: Vec<&str> = delivered[0].1.lines().collect();
    assert_eq!(lines.len(), 28);
    assert_eq!(lines[0], HEADER);
}

#[tokio::test]
async fn filtered_export_only_contains_matching_rows() {
    let sink = MemorySink::new();
    let service = ExportService::new(synthetic(), Arc::new(sink.clone()))
        .with_clock(fixed_clock())
        .with_page_size(2);

    let filter = ProgressFilter {
        search_user: Some("ana".to_string()),
        ..Default::default()
    };
    let delivery = service.export(&filter).await.unwrap();
    assert_eq!(
        delivery,
        ExportDelivery::Delivered {
            filename: "company-course-progress-2023-11-14.csv".to_string(),
            rows: 5,
        }
    );

    let delivered = sink.delivered();
    let lines: Vec<&str> = delivered[0].1.lines().collect();
    assert_eq!(lines.len(), 6);
    for line in &lines[1..] {
        assert!(line.starts_with("Ana Castillo,"), "unexpected row: {line}");
    }
}

#[tokio::test]
async fn cancellation_mid_export_delivers_nothing() {
    let cancel = CancellationToken::new();
    let provider = Arc::new(CancelingProvider {
        inner: synthetic(),
        cancel: cancel.clone(),
    });
    let sink = MemorySink::new();
    let service = ExportService::new(provider, Arc::new(sink.clone()))
        .with_clock(fixed_clock())
        .with_page_size(10);

    let delivery = service
        .export_with_cancellation(&ProgressFilter::default(), cancel)
        .await
        .unwrap();
    assert_eq!(delivery, ExportDelivery::Canceled { downloaded: 10 });
    assert!(sink.delivered().is_empty());
}

#[tokio::test]
async fn provider_failure_surfaces_its_message() {
    let sink = MemorySink::new();
    let service =
        ExportService::new(Arc::new(OfflineProvider), Arc::new(sink.clone())).with_clock(fixed_clock());

    let error = service
        .export(&ProgressFilter::default())
        .await
        .unwrap_err();
    match &error {
        ExportError::Failed { message } => assert_eq!(message, "progress backend offline"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(error.to_string(), "progress backend offline");
    assert!(sink.delivered().is_empty());
}

#[tokio::test]
async fn file_sink_export_writes_a_real_file() {
    let dir = tempfile::tempdir().unwrap();
    let service = ExportService::new(synthetic(), Arc::new(FileSink::new(dir.path())))
        .with_clock(fixed_clock());

    let delivery = service.export(&ProgressFilter::default()).await.unwrap();
    let ExportDelivery::Delivered { filename, rows } = delivery else {
        panic!("export did not deliver");
    };
    assert_eq!(rows, 27);

    let written = std::fs::read_to_string(dir.path().join(&filename)).unwrap();
    assert!(written.starts_with(HEADER));
    assert_eq!(written.lines().count(), 28);
}
