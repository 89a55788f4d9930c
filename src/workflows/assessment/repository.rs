use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{is_valid_email, FacilityInfo, RatingSet, Scores};
use super::session::AssessmentOutcome;

/// Quadrant label stored on the placeholder record written at the start of
/// a session, before any scores exist.
pub const IN_PROGRESS_QUADRANT: &str = "In Progress";

/// Persisted shape of one assessment, keyed by submitter email. A retake
/// from the same address overwrites the previous record wholesale; no
/// history is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub email: String,
    pub facility_name: String,
    pub location: Option<String>,
    pub contact_name: String,
    pub company: Option<String>,
    pub target_mw: Option<String>,
    pub ratings: RatingSet,
    pub readiness_score: f64,
    pub scalability_score: f64,
    pub operational_score: f64,
    pub overall_score: f64,
    pub quadrant_label: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl AssessmentRecord {
    /// Record written at intro -> assessing: empty ratings, zero scores,
    /// sentinel quadrant.
    pub fn placeholder(facility: &FacilityInfo, started_at: DateTime<Utc>) -> Self {
        Self::build(
            facility,
            RatingSet::new(),
            Scores::zero(),
            IN_PROGRESS_QUADRANT.to_string(),
            started_at,
            None,
        )
    }

    /// Record written at assessing -> results, replacing the placeholder.
    pub fn completed(
        facility: &FacilityInfo,
        ratings: RatingSet,
        outcome: &AssessmentOutcome,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self::build(
            facility,
            ratings,
            outcome.scores,
            outcome.quadrant.label().to_string(),
            started_at,
            Some(outcome.completed_at),
        )
    }

    fn build(
        facility: &FacilityInfo,
        ratings: RatingSet,
        scores: Scores,
        quadrant_label: String,
        started_at: DateTime<Utc>,
        completed_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            email: facility.email_key(),
            facility_name: facility.name.trim().to_string(),
            location: facility.location.clone(),
            contact_name: facility.contact_name.trim().to_string(),
            company: facility.company.clone(),
            target_mw: facility.target_mw.clone(),
            ratings,
            readiness_score: scores.readiness,
            scalability_score: scores.scalability,
            operational_score: scores.operational,
            overall_score: scores.overall,
            quadrant_label,
            started_at,
            completed_at,
        }
    }
}

/// Storage abstraction over the backing lead store. `upsert` carries
/// insert-or-update semantics on the email key; `Conflict` exists for
/// callers (the contact-form flow shares this gateway technology) that use
/// plain inserts against unique columns and need to tell a duplicate apart
/// from an outage.
#[async_trait]
pub trait AssessmentStore: Send + Sync {
    async fn upsert(&self, record: AssessmentRecord) -> Result<(), StoreError>;
    async fn fetch(&self, email: &str) -> Result<Option<AssessmentRecord>, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("a record with this key already exists")]
    Conflict,
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store call exceeded the {0}ms budget")]
    TimedOut(u64),
}

/// Outbound delivery of a rendered report to the respondent.
#[async_trait]
pub trait ReportMailer: Send + Sync {
    /// Send the report. Implementations validate the recipient address
    /// before attempting transport and return the provider-assigned message
    /// id on success.
    async fn send(&self, report: OutboundReport) -> Result<String, MailerError>;
}

/// Payload handed to the mailer: recipient, subject, HTML body, and the
/// rendered PDF as a binary attachment.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundReport {
    pub recipient: String,
    pub subject: String,
    pub html_body: String,
    pub attachment_name: String,
    pub attachment: Vec<u8>,
}

/// Mail dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("'{0}' is not a deliverable address")]
    InvalidRecipient(String),
    #[error("mail transport unavailable: {0}")]
    Transport(String),
}

/// In-process store used by the service binary and demos. Upserts overwrite
/// by normalized email, matching the remote gateway's conflict-key
/// semantics.
#[derive(Debug, Default)]
pub struct MemoryAssessmentStore {
    records: Mutex<HashMap<String, AssessmentRecord>>,
}

#[async_trait]
impl AssessmentStore for MemoryAssessmentStore {
    async fn upsert(&self, record: AssessmentRecord) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        guard.insert(record.email.clone(), record);
        Ok(())
    }

    async fn fetch(&self, email: &str) -> Result<Option<AssessmentRecord>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.get(&email.trim().to_ascii_lowercase()).cloned())
    }
}

/// Mailer that logs instead of sending, for local runs without an email
/// provider configured. Still enforces the recipient syntax contract.
#[derive(Debug, Default)]
pub struct LogMailer {
    sequence: AtomicU64,
}

#[async_trait]
impl ReportMailer for LogMailer {
    async fn send(&self, report: OutboundReport) -> Result<String, MailerError> {
        if !is_valid_email(report.recipient.trim()) {
            return Err(MailerError::InvalidRecipient(report.recipient));
        }

        let message_id = format!("log-{:06}", self.sequence.fetch_add(1, Ordering::Relaxed));
        info!(
            recipient = %report.recipient,
            subject = %report.subject,
            attachment = %report.attachment_name,
            attachment_bytes = report.attachment.len(),
            %message_id,
            "report delivery logged (no mail provider configured)"
        );
        Ok(message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn facility() -> FacilityInfo {
        FacilityInfo {
            name: " Acme DC ".to_string(),
            location: None,
            contact_name: "Jane".to_string(),
            email: "Jane@Acme.Example ".to_string(),
            company: Some("Acme".to_string()),
            target_mw: None,
        }
    }

    fn started_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap()
    }

    #[test]
    fn placeholder_records_carry_the_sentinel_quadrant() {
        let record = AssessmentRecord::placeholder(&facility(), started_at());

        assert_eq!(record.email, "jane@acme.example");
        assert_eq!(record.facility_name, "Acme DC");
        assert_eq!(record.quadrant_label, IN_PROGRESS_QUADRANT);
        assert!(record.ratings.is_empty());
        assert_eq!(record.overall_score, 0.0);
        assert!(record.completed_at.is_none());
    }

    #[tokio::test]
    async fn memory_store_upsert_overwrites_by_email() {
        let store = MemoryAssessmentStore::default();
        let first = AssessmentRecord::placeholder(&facility(), started_at());
        let mut second = first.clone();
        second.quadrant_label = "Develop".to_string();
        second.overall_score = 50.0;

        store.upsert(first).await.expect("first upsert succeeds");
        store.upsert(second).await.expect("second upsert succeeds");

        let stored = store
            .fetch("jane@acme.example")
            .await
            .expect("fetch succeeds")
            .expect("record present");
        assert_eq!(stored.quadrant_label, "Develop");
        assert_eq!(stored.overall_score, 50.0);
    }

    #[tokio::test]
    async fn log_mailer_rejects_malformed_recipients() {
        let mailer = LogMailer::default();
        let report = OutboundReport {
            recipient: "not-an-address".to_string(),
            subject: "Your readiness report".to_string(),
            html_body: "<p>attached</p>".to_string(),
            attachment_name: "report.pdf".to_string(),
            attachment: vec![1, 2, 3],
        };

        match mailer.send(report).await {
            Err(MailerError::InvalidRecipient(recipient)) => {
                assert_eq!(recipient, "not-an-address");
            }
            other => panic!("expected invalid recipient, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn log_mailer_assigns_message_ids() {
        let mailer = LogMailer::default();
        let report = OutboundReport {
            recipient: "jane@acme.example".to_string(),
            subject: "Your readiness report".to_string(),
            html_body: "<p>attached</p>".to_string(),
            attachment_name: "report.pdf".to_string(),
            attachment: Vec::new(),
        };

        let first = mailer.send(report.clone()).await.expect("send succeeds");
        let second = mailer.send(report).await.expect("send succeeds");
        assert_ne!(first, second);
    }
}
