use anyhow::{bail, Context, Result};
use log::info;
use serde::Serialize;

use super::Notifier;
use crate::config::settings::{HttpSettings, NotifySettings};
use crate::http::HttpClient;

/// Sends HTML mail through an HTTP mail API (`POST {from, to, subject, html}`)
pub struct MailNotifier {
    client: HttpClient,
    endpoint: String,
    from: String,
}

#[derive(Serialize)]
struct MailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

impl MailNotifier {
    pub fn new(settings: &NotifySettings, http: &HttpSettings) -> Result<Self> {
        let Some(endpoint) = settings.endpoint.clone() else {
            bail!("NOTIFY_ENDPOINT is required for mail delivery");
        };

        Ok(Self {
            client: HttpClient::new(http, settings.api_key.clone())?,
            endpoint,
            from: settings.from.clone(),
        })
    }
}

impl Notifier for MailNotifier {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> Result<()> {
        let request = MailRequest {
            from: &self.from,
            to: [recipient],
            subject,
            html: html_body,
        };

        let response = self
            .client
            .post_json(&self.endpoint, &request)
            .await
            .with_context(|| format!("Failed to deliver mail to {}", recipient))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Mail API returned {}: {}", status, body);
        }

        info!("Sent '{}' to {}", subject, recipient);
        Ok(())
    }
}
