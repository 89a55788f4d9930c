use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::workflows::assessment::domain::{CategoryId, FacilityInfo, Rating};
use crate::workflows::assessment::repository::{
    AssessmentRecord, AssessmentStore, MailerError, OutboundReport, ReportMailer, StoreError,
};
use crate::workflows::assessment::service::AssessmentService;

pub(super) const STORE_BUDGET: Duration = Duration::from_millis(250);

pub(super) fn facility() -> FacilityInfo {
    FacilityInfo {
        name: "Acme DC".to_string(),
        location: Some("Des Moines, IA".to_string()),
        contact_name: "Jane".to_string(),
        email: "a@b.com".to_string(),
        company: Some("Acme Holdings".to_string()),
        target_mw: Some("40".to_string()),
    }
}

pub(super) fn build_service() -> (
    Arc<AssessmentService<MemoryStore, RecordingMailer>>,
    Arc<MemoryStore>,
    Arc<RecordingMailer>,
) {
    let store = Arc::new(MemoryStore::default());
    let mailer = Arc::new(RecordingMailer::default());
    let service = Arc::new(AssessmentService::new(
        store.clone(),
        mailer.clone(),
        STORE_BUDGET,
    ));
    (service, store, mailer)
}

/// Walk a started session through all nine categories at the given rating.
pub(super) async fn rate_everything(
    service: &AssessmentService<MemoryStore, RecordingMailer>,
    email: &str,
    rating: Rating,
) -> crate::workflows::assessment::service::StepView {
    let mut last = None;
    for category in CategoryId::ordered() {
        service
            .rate(email, category, rating)
            .expect("rating recorded");
        last = Some(service.advance(email).await.expect("advance succeeds"));
    }
    last.expect("at least one advance ran")
}

/// Store that remembers every upsert, in order.
#[derive(Default)]
pub(super) struct MemoryStore {
    pub(super) upserts: Mutex<Vec<AssessmentRecord>>,
}

impl MemoryStore {
    pub(super) fn records(&self) -> Vec<AssessmentRecord> {
        self.upserts.lock().expect("store mutex poisoned").clone()
    }
}

#[async_trait]
impl AssessmentStore for MemoryStore {
    async fn upsert(&self, record: AssessmentRecord) -> Result<(), StoreError> {
        self.upserts
            .lock()
            .expect("store mutex poisoned")
            .push(record);
        Ok(())
    }

    async fn fetch(&self, email: &str) -> Result<Option<AssessmentRecord>, StoreError> {
        let guard = self.upserts.lock().expect("store mutex poisoned");
        Ok(guard
            .iter()
            .rev()
            .find(|record| record.email == email)
            .cloned())
    }
}

/// Store that refuses every call, simulating a backend outage.
pub(super) struct FailingStore;

#[async_trait]
impl AssessmentStore for FailingStore {
    async fn upsert(&self, _record: AssessmentRecord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("backend offline".to_string()))
    }

    async fn fetch(&self, _email: &str) -> Result<Option<AssessmentRecord>, StoreError> {
        Err(StoreError::Unavailable("backend offline".to_string()))
    }
}

/// Store that never answers, for exercising the time budget.
pub(super) struct HangingStore;

#[async_trait]
impl AssessmentStore for HangingStore {
    async fn upsert(&self, _record: AssessmentRecord) -> Result<(), StoreError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(())
    }

    async fn fetch(&self, _email: &str) -> Result<Option<AssessmentRecord>, StoreError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(None)
    }
}

/// Mailer that captures outbound reports and hands out sequential ids.
#[derive(Default)]
pub(super) struct RecordingMailer {
    pub(super) sent: Mutex<Vec<OutboundReport>>,
}

impl RecordingMailer {
    pub(super) fn deliveries(&self) -> Vec<OutboundReport> {
        self.sent.lock().expect("mailer mutex poisoned").clone()
    }
}

#[async_trait]
impl ReportMailer for RecordingMailer {
    async fn send(&self, report: OutboundReport) -> Result<String, MailerError> {
        let mut guard = self.sent.lock().expect("mailer mutex poisoned");
        guard.push(report);
        Ok(format!("msg-{:03}", guard.len()))
    }
}

/// Mailer whose transport is down.
pub(super) struct FailingMailer;

#[async_trait]
impl ReportMailer for FailingMailer {
    async fn send(&self, _report: OutboundReport) -> Result<String, MailerError> {
        Err(MailerError::Transport("smtp relay offline".to_string()))
    }
}
