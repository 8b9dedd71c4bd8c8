//! Batch dispatch with per-recipient failure isolation
//!
//! Iterates a recipient list, submits one message per recipient through a
//! [`Mailer`], and aggregates per-recipient outcomes. One recipient's
//! failure never affects another's chance to succeed, and the batch always
//! runs to completion.

use std::future::Future;
use std::pin::Pin;

use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{info, warn};

use super::{Attachment, EmailContent, Mailer};

/// The outcome of one dispatch attempt for one recipient
///
/// Created by the mailer's single attempt, consumed by the batch outcome,
/// never mutated afterward. Serializes to
/// `{"email", "status": "sent", "messageId"}` or
/// `{"email", "status": "failed", "error"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchResult {
    /// The recipient address this result belongs to
    pub email: String,

    /// Sent-or-failed tag with its payload
    #[serde(flatten)]
    pub status: DispatchStatus,
}

/// Sent-or-failed tag for one recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DispatchStatus {
    /// The provider accepted the message
    Sent {
        /// Provider-assigned message id
        #[serde(rename = "messageId")]
        message_id: String,
    },
    /// The provider rejected or failed the message
    Failed {
        /// Human-readable failure detail from the provider
        error: String,
    },
}

impl DispatchResult {
    /// A successful result carrying the provider message id
    #[must_use]
    pub fn sent(email: impl Into<String>, message_id: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            status: DispatchStatus::Sent {
                message_id: message_id.into(),
            },
        }
    }

    /// A failed result carrying the provider's error detail
    #[must_use]
    pub fn failed(email: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            status: DispatchStatus::Failed {
                error: error.into(),
            },
        }
    }

    /// Whether this recipient's message was accepted
    #[must_use]
    pub const fn is_sent(&self) -> bool {
        matches!(self.status, DispatchStatus::Sent { .. })
    }
}

/// Aggregated per-recipient results for one batch, plus derived counts
///
/// Invariant: `sent + failed == results.len() == recipients.len()`, with
/// results in recipient input order.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// One result per recipient, in input order
    pub results: Vec<DispatchResult>,

    /// Number of results tagged sent
    pub sent: usize,

    /// Number of results tagged failed
    pub failed: usize,
}

impl BatchOutcome {
    fn from_results(results: Vec<DispatchResult>) -> Self {
        let sent = results.iter().filter(|r| r.is_sent()).count();
        let failed = results.len() - sent;
        Self {
            results,
            sent,
            failed,
        }
    }

    /// Total number of recipients in the batch
    #[must_use]
    pub const fn total(&self) -> usize {
        self.sent + self.failed
    }

    /// Whether every recipient's message was accepted
    #[must_use]
    pub const fn all_sent(&self) -> bool {
        self.failed == 0
    }
}

/// Bounded worker pool dispatching one batch
///
/// The concurrency limit bounds how many provider calls are in flight at
/// once; the default of 1 preserves strictly sequential sending. Raising
/// the limit keeps the contract unchanged: results stay in input order and
/// failures stay isolated per recipient.
#[derive(Debug, Clone, Copy)]
pub struct BatchDispatcher {
    concurrency: usize,
}

impl Default for BatchDispatcher {
    fn default() -> Self {
        Self::sequential()
    }
}

impl BatchDispatcher {
    /// Create a dispatcher with the given in-flight limit (clamped to ≥ 1)
    #[must_use]
    pub const fn new(concurrency: usize) -> Self {
        Self {
            concurrency: if concurrency == 0 { 1 } else { concurrency },
        }
    }

    /// Create a strictly sequential dispatcher, one send in flight at a time
    #[must_use]
    pub const fn sequential() -> Self {
        Self::new(1)
    }

    /// Dispatch one message per recipient and collect every outcome
    ///
    /// Invokes the mailer exactly once per recipient, in input order. A
    /// per-recipient failure is recorded as a `failed` result and the batch
    /// continues; nothing short-circuits. The attachment is shared across
    /// all recipients; load it once before calling this.
    pub async fn dispatch_batch(
        self,
        mailer: &dyn Mailer,
        recipients: &[String],
        content: &EmailContent,
        attachment: Option<&Attachment>,
    ) -> BatchOutcome {
        info!(
            recipients = recipients.len(),
            concurrency = self.concurrency,
            "Dispatching batch"
        );

        let pending: Vec<Pin<Box<dyn Future<Output = DispatchResult> + Send + '_>>> = recipients
            .iter()
            .map(|to| Box::pin(dispatch_one(mailer, to, content, attachment)) as _)
            .collect();
        let results: Vec<DispatchResult> = stream::iter(pending)
            .buffered(self.concurrency)
            .collect()
            .await;

        let outcome = BatchOutcome::from_results(results);
        info!(
            sent = outcome.sent,
            failed = outcome.failed,
            "Batch dispatch complete"
        );
        outcome
    }
}

/// Dispatch one message to one recipient, mapping the mailer result into a
/// [`DispatchResult`]. Extracted into a named async fn so the per-recipient
/// future resolves its higher-ranked borrow of `to` cleanly inside the
/// buffered stream.
async fn dispatch_one(
    mailer: &dyn Mailer,
    to: &String,
    content: &EmailContent,
    attachment: Option<&Attachment>,
) -> DispatchResult {
    match mailer.dispatch(to, content, attachment).await {
        Ok(message_id) => DispatchResult::sent(to.as_str(), message_id),
        Err(e) => {
            warn!(to = %to, error = %e, "Dispatch failed for recipient");
            DispatchResult::failed(to.as_str(), e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::MockMailer;

    use super::*;

    fn recipients(addresses: &[&str]) -> Vec<String> {
        addresses.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn test_every_recipient_gets_one_result_in_order() {
        let mailer = MockMailer::new();
        let content = EmailContent::new("Hi", "<p>hi</p>");
        let batch = recipients(&["a@x.com", "b@x.com", "c@x.com"]);

        let outcome = BatchDispatcher::sequential()
            .dispatch_batch(&mailer, &batch, &content, None)
            .await;

        assert_eq!(outcome.results.len(), 3);
        assert_eq!(outcome.sent + outcome.failed, batch.len());
        let order: Vec<&str> = outcome.results.iter().map(|r| r.email.as_str()).collect();
        assert_eq!(order, vec!["a@x.com", "b@x.com", "c@x.com"]);
    }

    #[tokio::test]
    async fn test_happy_path_counts_and_distinct_ids() {
        let mailer = MockMailer::new();
        let content = EmailContent::new("Hi", "<p>hi</p>");
        let batch = recipients(&["a@x.com", "b@x.com"]);

        let outcome = BatchDispatcher::sequential()
            .dispatch_batch(&mailer, &batch, &content, None)
            .await;

        assert_eq!(outcome.sent, 2);
        assert_eq!(outcome.failed, 0);
        assert!(outcome.all_sent());

        let ids: Vec<String> = outcome
            .results
            .iter()
            .map(|r| match &r.status {
                DispatchStatus::Sent { message_id } => message_id.clone(),
                DispatchStatus::Failed { .. } => panic!("expected sent"),
            })
            .collect();
        assert_ne!(ids[0], ids[1]);
    }

    #[tokio::test]
    async fn test_failure_is_isolated_regardless_of_position() {
        let addresses = ["a@x.com", "b@x.com", "c@x.com"];
        let content = EmailContent::new("Hi", "<p>hi</p>");

        for failing_index in 0..addresses.len() {
            let mailer = MockMailer::new();
            mailer.fail_for(addresses[failing_index]);

            let batch = recipients(&addresses);
            let outcome = BatchDispatcher::sequential()
                .dispatch_batch(&mailer, &batch, &content, None)
                .await;

            assert_eq!(outcome.sent, 2);
            assert_eq!(outcome.failed, 1);
            for (index, result) in outcome.results.iter().enumerate() {
                assert_eq!(result.is_sent(), index != failing_index);
            }
        }
    }

    #[tokio::test]
    async fn test_duplicates_are_not_deduplicated() {
        let mailer = MockMailer::new();
        let content = EmailContent::new("Hi", "<p>hi</p>");
        let batch = recipients(&["a@x.com", "a@x.com"]);

        let outcome = BatchDispatcher::sequential()
            .dispatch_batch(&mailer, &batch, &content, None)
            .await;

        assert_eq!(outcome.results.len(), 2);
        assert_eq!(mailer.dispatch_count(), 2);
    }

    #[tokio::test]
    async fn test_parallel_dispatch_preserves_input_order() {
        let mailer = MockMailer::new();
        // The first recipient finishes last; order must still hold.
        mailer.delay_for("a@x.com", 50);
        mailer.delay_for("b@x.com", 20);
        let content = EmailContent::new("Hi", "<p>hi</p>");
        let batch = recipients(&["a@x.com", "b@x.com", "c@x.com"]);

        let outcome = BatchDispatcher::new(3)
            .dispatch_batch(&mailer, &batch, &content, None)
            .await;

        let order: Vec<&str> = outcome.results.iter().map(|r| r.email.as_str()).collect();
        assert_eq!(order, vec!["a@x.com", "b@x.com", "c@x.com"]);
        assert_eq!(outcome.sent, 3);
    }

    #[tokio::test]
    async fn test_zero_concurrency_is_clamped_to_sequential() {
        let mailer = MockMailer::new();
        let content = EmailContent::new("Hi", "<p>hi</p>");
        let batch = recipients(&["a@x.com"]);

        let outcome = BatchDispatcher::new(0)
            .dispatch_batch(&mailer, &batch, &content, None)
            .await;

        assert_eq!(outcome.total(), 1);
    }

    #[test]
    fn test_result_serialization_shapes() {
        let sent = DispatchResult::sent("a@x.com", "msg-1");
        let failed = DispatchResult::failed("b@x.com", "mailbox full");

        assert_eq!(
            serde_json::to_value(&sent).unwrap(),
            serde_json::json!({"email": "a@x.com", "status": "sent", "messageId": "msg-1"})
        );
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            serde_json::json!({"email": "b@x.com", "status": "failed", "error": "mailbox full"})
        );
    }
}
