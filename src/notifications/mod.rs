//! Outbound notifications: investor notices (updates, milestones, capital
//! calls, distributions, new documents) and inquiry acknowledgements.
//!
//! Delivery is best effort: callers log failures and carry on.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::errors::CoreResult;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// A new update was posted on a project the investor is linked to.
    ProjectUpdate {
        to: String,
        investor_name: String,
        project_name: String,
        update_title: String,
    },
    Milestone {
        to: String,
        investor_name: String,
        project_name: String,
        milestone_name: String,
        completion_date: NaiveDate,
    },
    /// Request to fund part of an outstanding commitment.
    CapitalCall {
        to: String,
        investor_name: String,
        project_name: String,
        amount: f64,
        call_percentage: f64,
        due_date: NaiveDate,
    },
    /// The investor's share of a payout.
    Distribution {
        to: String,
        investor_name: String,
        project_name: String,
        amount: f64,
        distribution_date: NaiveDate,
    },
    DocumentUploaded {
        to: String,
        investor_name: String,
        project_name: String,
        document_title: String,
        document_type: String,
    },
    /// Confirmation sent to whoever submitted a contact inquiry.
    InquiryAcknowledgement { to: String, name: String },
    /// Internal notice that a new inquiry is waiting for triage.
    InquiryReceived {
        contact_id: i32,
        name: String,
        email: String,
        inquiry_type: String,
    },
}

impl Notification {
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::ProjectUpdate { .. } => "project_update",
            Notification::Milestone { .. } => "milestone",
            Notification::CapitalCall { .. } => "capital_call",
            Notification::Distribution { .. } => "distribution",
            Notification::DocumentUploaded { .. } => "document_uploaded",
            Notification::InquiryAcknowledgement { .. } => "inquiry_acknowledgement",
            Notification::InquiryReceived { .. } => "inquiry_received",
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: Notification) -> CoreResult<()>;
}

/// Emits notifications as structured log events.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: Notification) -> CoreResult<()> {
        let payload = serde_json::to_string(&notification).unwrap_or_default();
        info!(kind = notification.kind(), payload = %payload, "notification dispatched");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Collects notifications for assertions.
    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<Notification>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, notification: Notification) -> CoreResult<()> {
            if let Ok(mut sent) = self.sent.lock() {
                sent.push(notification);
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn records_in_order() {
        let notifier = RecordingNotifier::default();
        notifier
            .send(Notification::InquiryAcknowledgement {
                to: "a@example.com".to_string(),
                name: "A".to_string(),
            })
            .await
            .expect("send");
        let sent = notifier.sent.lock().expect("lock");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind(), "inquiry_acknowledgement");
    }

    #[test]
    fn payload_is_tagged_with_kind() {
        let notice = Notification::CapitalCall {
            to: "lp@example.com".to_string(),
            investor_name: "Oak Partners".to_string(),
            project_name: "Harbor Point".to_string(),
            amount: 25_000.0,
            call_percentage: 25.0,
            due_date: NaiveDate::from_ymd_opt(2025, 6, 30).expect("date"),
        };
        let payload = serde_json::to_value(&notice).expect("serialize");
        assert_eq!(payload["kind"], notice.kind());
        assert_eq!(payload["due_date"], "2025-06-30");
    }
}
