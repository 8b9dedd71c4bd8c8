//! Testing utilities
//!
//! Provides a mock mailer that captures dispatches in memory, in-memory
//! stores, and a pre-wired [`TestState`] for handler tests. No network, no
//! database.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::audit::{AuditError, AuditStore, EmailLog, EmailLogPage, NewEmailLog};
use crate::auth::CurrentUser;
use crate::config::SendfolioConfig;
use crate::email::{
    Attachment, EmailContent, EmailError, Mailer, MailerFactory, SenderCredentials,
};
use crate::state::AppState;
use crate::store::{Resume, ResumeStore, StoreError, Template, TemplateStore};

/// The authenticated caller used across handler tests
#[must_use]
pub fn test_user() -> CurrentUser {
    CurrentUser {
        id: 7,
        email: "me@example.com".to_string(),
        access_token: "test-access-token".to_string(),
        refresh_token: "test-refresh-token".to_string(),
    }
}

/// One captured dispatch attempt
#[derive(Debug, Clone)]
pub struct MockDispatch {
    /// Recipient address
    pub to: String,

    /// Subject the message was composed with
    pub subject: String,

    /// Whether an attachment was supplied
    pub had_attachment: bool,
}

/// Mock mailer capturing dispatches in memory
///
/// Failures and per-address delays are programmable, so tests can exercise
/// partial-failure isolation and ordering under parallel dispatch.
#[derive(Debug, Clone, Default)]
pub struct MockMailer {
    sent: Arc<Mutex<Vec<MockDispatch>>>,
    failing: Arc<Mutex<HashSet<String>>>,
    delays: Arc<Mutex<HashMap<String, u64>>>,
    counter: Arc<AtomicUsize>,
}

impl MockMailer {
    /// Create a new mock mailer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every dispatch to this address fail
    pub fn fail_for(&self, address: &str) {
        self.failing.lock().unwrap().insert(address.to_string());
    }

    /// Delay dispatches to this address by the given number of milliseconds
    pub fn delay_for(&self, address: &str, millis: u64) {
        self.delays
            .lock()
            .unwrap()
            .insert(address.to_string(), millis);
    }

    /// Number of dispatch attempts, including failed ones
    #[must_use]
    pub fn dispatch_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// All captured dispatch attempts, in attempt order
    #[must_use]
    pub fn dispatched(&self) -> Vec<MockDispatch> {
        self.sent.lock().unwrap().clone()
    }

    /// Whether a dispatch was attempted to the given address
    #[must_use]
    pub fn was_dispatched_to(&self, address: &str) -> bool {
        self.sent.lock().unwrap().iter().any(|d| d.to == address)
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn dispatch(
        &self,
        to: &str,
        content: &EmailContent,
        attachment: Option<&Attachment>,
    ) -> Result<String, EmailError> {
        let delay = self.delays.lock().unwrap().get(to).copied();
        if let Some(millis) = delay {
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }

        self.sent.lock().unwrap().push(MockDispatch {
            to: to.to_string(),
            subject: content.subject.clone(),
            had_attachment: attachment.is_some(),
        });

        if self.failing.lock().unwrap().contains(to) {
            return Err(EmailError::dispatch("simulated provider rejection"));
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(format!("mock-msg-{n}"))
    }
}

/// Factory handing the same mock mailer to every batch
#[derive(Debug, Clone)]
pub struct MockMailerFactory {
    mailer: MockMailer,
}

impl MockMailerFactory {
    /// Wrap a mock mailer
    #[must_use]
    pub const fn new(mailer: MockMailer) -> Self {
        Self { mailer }
    }
}

impl MailerFactory for MockMailerFactory {
    fn mailer_for(&self, _credentials: SenderCredentials) -> Arc<dyn Mailer> {
        Arc::new(self.mailer.clone())
    }
}

/// In-memory audit store
#[derive(Debug, Default)]
pub struct InMemoryAuditStore {
    rows: Mutex<Vec<EmailLog>>,
    next_id: AtomicI64,
    fail_writes: AtomicBool,
}

impl InMemoryAuditStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail, as a closed pool would
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    /// All stored rows, in insertion order
    #[must_use]
    pub fn rows(&self) -> Vec<EmailLog> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditStore for InMemoryAuditStore {
    async fn record(&self, entry: NewEmailLog) -> Result<EmailLog, AuditError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AuditError::Database(sqlx::Error::PoolClosed));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let log = EmailLog {
            id,
            user_id: entry.user_id,
            template_id: entry.template_id,
            resume_id: entry.resume_id,
            recipients: entry.recipients,
            subject: entry.subject,
            status: entry.status,
            error_message: entry.error_message,
            created_at: Utc::now(),
        };

        self.rows.lock().unwrap().push(log.clone());
        Ok(log)
    }

    async fn list_for_user(
        &self,
        user_id: i64,
        page: u32,
        limit: u32,
    ) -> Result<EmailLogPage, AuditError> {
        let rows = self.rows.lock().unwrap();
        let mine: Vec<EmailLog> = rows
            .iter()
            .filter(|log| log.user_id == user_id)
            .cloned()
            .collect();

        let total = i64::try_from(mine.len()).unwrap();
        let offset = (page.max(1) - 1) as usize * limit as usize;
        let logs = mine
            .into_iter()
            .rev()
            .skip(offset)
            .take(limit as usize)
            .collect();

        Ok(EmailLogPage { logs, total })
    }

    async fn find_for_user(
        &self,
        id: i64,
        user_id: i64,
    ) -> Result<Option<EmailLog>, AuditError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|log| log.id == id && log.user_id == user_id)
            .cloned())
    }
}

/// In-memory template lookup
#[derive(Debug, Default)]
pub struct InMemoryTemplateStore {
    templates: Mutex<Vec<(i64, Template)>>,
}

impl InMemoryTemplateStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a template owned by the given user
    pub fn insert(&self, user_id: i64, template: Template) {
        self.templates.lock().unwrap().push((user_id, template));
    }
}

#[async_trait]
impl TemplateStore for InMemoryTemplateStore {
    async fn find_for_user(&self, id: i64, user_id: i64) -> Result<Option<Template>, StoreError> {
        Ok(self
            .templates
            .lock()
            .unwrap()
            .iter()
            .find(|(owner, template)| *owner == user_id && template.id == id)
            .map(|(_, template)| template.clone()))
    }
}

/// In-memory résumé lookup
#[derive(Debug, Default)]
pub struct InMemoryResumeStore {
    resumes: Mutex<Vec<(i64, Resume)>>,
}

impl InMemoryResumeStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a résumé owned by the given user
    pub fn insert(&self, user_id: i64, resume: Resume) {
        self.resumes.lock().unwrap().push((user_id, resume));
    }
}

#[async_trait]
impl ResumeStore for InMemoryResumeStore {
    async fn find_for_user(&self, id: i64, user_id: i64) -> Result<Option<Resume>, StoreError> {
        Ok(self
            .resumes
            .lock()
            .unwrap()
            .iter()
            .find(|(owner, resume)| *owner == user_id && resume.id == id)
            .map(|(_, resume)| resume.clone()))
    }
}

/// Pre-wired application state over the in-memory fakes
///
/// Keeps handles to every fake so tests can program failures and make
/// assertions after driving the handlers.
pub struct TestState {
    /// The mock mailer every batch dispatches through
    pub mailer: MockMailer,

    /// In-memory audit store
    pub audit: Arc<InMemoryAuditStore>,

    /// In-memory template lookup
    pub templates: Arc<InMemoryTemplateStore>,

    /// In-memory résumé lookup
    pub resumes: Arc<InMemoryResumeStore>,
}

impl Default for TestState {
    fn default() -> Self {
        Self::new()
    }
}

impl TestState {
    /// Create fresh fakes with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            mailer: MockMailer::new(),
            audit: Arc::new(InMemoryAuditStore::new()),
            templates: Arc::new(InMemoryTemplateStore::new()),
            resumes: Arc::new(InMemoryResumeStore::new()),
        }
    }

    /// Assemble an [`AppState`] over the fakes
    #[must_use]
    pub fn app_state(&self) -> AppState {
        AppState::new(
            SendfolioConfig::default(),
            self.audit.clone(),
            self.templates.clone(),
            self.resumes.clone(),
            Arc::new(MockMailerFactory::new(self.mailer.clone())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_mailer_records_and_fails_on_demand() {
        let mailer = MockMailer::new();
        mailer.fail_for("bad@x.com");
        let content = EmailContent::new("Test", "<p>hi</p>");

        let ok = mailer.dispatch("good@x.com", &content, None).await;
        let err = mailer.dispatch("bad@x.com", &content, None).await;

        assert!(ok.is_ok());
        assert!(err.is_err());
        assert_eq!(mailer.dispatch_count(), 2);
        assert!(mailer.was_dispatched_to("bad@x.com"));
    }

    #[tokio::test]
    async fn test_mock_mailer_ids_are_distinct() {
        let mailer = MockMailer::new();
        let content = EmailContent::new("Test", "<p>hi</p>");

        let first = mailer.dispatch("a@x.com", &content, None).await.unwrap();
        let second = mailer.dispatch("b@x.com", &content, None).await.unwrap();
        assert_ne!(first, second);
    }
}
