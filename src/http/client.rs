use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use std::time::Duration;

use crate::config::settings::HttpSettings;

/// HTTP client with a fixed user agent, timeout and optional bearer token
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    bearer: Option<String>,
}

impl HttpClient {
    pub fn new(settings: &HttpSettings, bearer: Option<String>) -> Result<Self> {
        let client = Self::build_client(settings.user_agent, settings.timeout_secs)?;
        Ok(Self { client, bearer })
    }

    pub async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Response> {
        let request = self.client.get(url).query(query);
        self.send(request, "GET").await
    }

    pub async fn put_json<T: Serialize>(&self, url: &str, body: &T) -> Result<Response> {
        let request = self.client.put(url).json(body);
        self.send(request, "PUT").await
    }

    pub async fn post_json<T: Serialize>(&self, url: &str, body: &T) -> Result<Response> {
        let request = self.client.post(url).json(body);
        self.send(request, "POST").await
    }

    fn build_client(user_agent: &str, timeout_secs: u64) -> Result<Client> {
        Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build HTTP client")
    }

    async fn send(&self, request: RequestBuilder, method: &str) -> Result<Response> {
        let request = match &self.bearer {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        request
            .send()
            .await
            .with_context(|| format!("Failed to send {} request", method))
    }
}
