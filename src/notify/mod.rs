use anyhow::Result;
use log::info;
use std::future::Future;

use crate::config::settings::AppConfig;

pub mod mail;

pub use mail::MailNotifier;

/// Outbound notification sink
pub trait Notifier {
    fn send(
        &self,
        recipient: &str,
        subject: &str,
        html_body: &str,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Writes notifications to the log instead of delivering them
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> Result<()> {
        info!(
            "Notification for {} skipped (no mail endpoint): {} ({} bytes)",
            recipient,
            subject,
            html_body.len()
        );
        Ok(())
    }
}

pub enum NotifierBackend {
    Mail(MailNotifier),
    Log(LogNotifier),
}

impl NotifierBackend {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        match &config.notify.endpoint {
            Some(_) => Ok(NotifierBackend::Mail(MailNotifier::new(&config.notify, &config.http)?)),
            None => Ok(NotifierBackend::Log(LogNotifier)),
        }
    }
}

impl Notifier for NotifierBackend {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> Result<()> {
        match self {
            NotifierBackend::Mail(notifier) => notifier.send(recipient, subject, html_body).await,
            NotifierBackend::Log(notifier) => notifier.send(recipient, subject, html_body).await,
        }
    }
}
