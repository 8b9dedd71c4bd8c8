//! Application state
//!
//! One [`AppState`] per process, cloned into every handler. The stores and
//! the mailer factory sit behind trait objects so tests can swap in
//! in-memory implementations.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

use crate::audit::{AuditStore, PgAuditStore};
use crate::config::SendfolioConfig;
use crate::email::{BatchDispatcher, GmailMailerFactory, MailerFactory};
use crate::store::{PgResumeStore, PgTemplateStore, ResumeStore, TemplateStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    config: Arc<SendfolioConfig>,
    audit: Arc<dyn AuditStore>,
    templates: Arc<dyn TemplateStore>,
    resumes: Arc<dyn ResumeStore>,
    mailers: Arc<dyn MailerFactory>,
}

impl AppState {
    /// Assemble state from its parts
    ///
    /// Used directly by tests; production code goes through
    /// [`AppState::from_config`].
    #[must_use]
    pub fn new(
        config: SendfolioConfig,
        audit: Arc<dyn AuditStore>,
        templates: Arc<dyn TemplateStore>,
        resumes: Arc<dyn ResumeStore>,
        mailers: Arc<dyn MailerFactory>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            audit,
            templates,
            resumes,
            mailers,
        }
    }

    /// Connect the database pool and wire the production stores
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot connect or the provider HTTP
    /// client cannot be built.
    pub async fn from_config(config: SendfolioConfig) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .connect(&config.database.url)
            .await?;

        let mailers = GmailMailerFactory::new(
            config.google.clone(),
            Duration::from_secs(config.dispatch.request_timeout_secs),
        )?;

        Ok(Self::new(
            config,
            Arc::new(PgAuditStore::new(pool.clone())),
            Arc::new(PgTemplateStore::new(pool.clone())),
            Arc::new(PgResumeStore::new(pool)),
            Arc::new(mailers),
        ))
    }

    /// Service configuration
    #[must_use]
    pub fn config(&self) -> &SendfolioConfig {
        &self.config
    }

    /// Audit persistence boundary
    #[must_use]
    pub fn audit(&self) -> &dyn AuditStore {
        self.audit.as_ref()
    }

    /// Template lookups
    #[must_use]
    pub fn templates(&self) -> &dyn TemplateStore {
        self.templates.as_ref()
    }

    /// Résumé lookups
    #[must_use]
    pub fn resumes(&self) -> &dyn ResumeStore {
        self.resumes.as_ref()
    }

    /// Per-batch mailer factory
    #[must_use]
    pub fn mailers(&self) -> &dyn MailerFactory {
        self.mailers.as_ref()
    }

    /// A batch dispatcher honoring the configured concurrency limit
    #[must_use]
    pub fn dispatcher(&self) -> BatchDispatcher {
        BatchDispatcher::new(self.config.dispatch.concurrency)
    }
}
