use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use log::{debug, info};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::BlobStore;
use crate::config::settings::{HttpSettings, StoreSettings};
use crate::errors::{read_context, write_context};
use crate::http::HttpClient;

/// Store backed by a GitHub repository through the contents API
pub struct GithubStore {
    client: HttpClient,
    api_url: String,
    owner: String,
    repo: String,
    branch: String,
}

/// Current file as returned by the contents API
struct RemoteFile {
    sha: String,
    content: Vec<u8>,
}

#[derive(Deserialize)]
struct ContentsResponse {
    sha: String,
    #[serde(default)]
    content: String,
}

#[derive(Serialize)]
struct PutContentsRequest<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<String>,
}

impl GithubStore {
    pub fn new(settings: &StoreSettings, http: &HttpSettings) -> Result<Self> {
        let Some(token) = settings.github_token.clone() else {
            bail!("GITHUB_TOKEN is required for the github store");
        };
        if settings.github_owner.is_empty() || settings.github_repo.is_empty() {
            bail!("GITHUB_OWNER and GITHUB_REPO are required for the github store");
        }

        Ok(Self {
            client: HttpClient::new(http, Some(token))?,
            api_url: settings.github_api_url.trim_end_matches('/').to_string(),
            owner: settings.github_owner.clone(),
            repo: settings.github_repo.clone(),
            branch: settings.github_branch.clone(),
        })
    }

    /// Public address of a published file when the repository is served by GitHub Pages
    pub fn pages_url(&self, key: &str) -> String {
        format!("https://{}.github.io/{}/{}", self.owner, self.repo, key)
    }

    async fn fetch(&self, key: &str) -> Result<Option<RemoteFile>> {
        let url = self.build_contents_url(key);
        let response = self
            .client
            .get(&url, &[("ref", self.branch.as_str())])
            .await
            .with_context(|| read_context(key))?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => return Ok(None),
            status => {
                let body = response.text().await.unwrap_or_default();
                bail!("GitHub GET failed {}: {}", status, body);
            }
        }

        let file: ContentsResponse = response
            .json()
            .await
            .with_context(|| format!("Failed to parse contents response for {}", key))?;
        let content = decode_content(&file.content)?;

        debug!("Fetched {} ({} bytes, sha {})", key, content.len(), file.sha);
        Ok(Some(RemoteFile {
            sha: file.sha,
            content,
        }))
    }

    fn build_contents_url(&self, key: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_url,
            self.owner,
            self.repo,
            key.trim_start_matches('/')
        )
    }
}

impl BlobStore for GithubStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.fetch(key).await?.map(|file| file.content))
    }

    async fn put(&self, key: &str, content: &[u8], message: &str) -> Result<()> {
        // The API treats a put without the current sha as a create.
        let sha = self.fetch(key).await?.map(|file| file.sha);
        let request = PutContentsRequest {
            message,
            content: STANDARD.encode(content),
            branch: &self.branch,
            sha,
        };

        let url = self.build_contents_url(key);
        let response = self
            .client
            .put_json(&url, &request)
            .await
            .with_context(|| write_context(key))?;

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            bail!("GitHub PUT failed {}: {}", status, body);
        }

        info!("Committed {} to {}/{}@{}", key, self.owner, self.repo, self.branch);
        Ok(())
    }

    fn public_url(&self, key: &str) -> Option<String> {
        Some(self.pages_url(key))
    }
}

/// The API wraps base64 content at 60 columns
fn decode_content(encoded: &str) -> Result<Vec<u8>> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact)
        .context("Failed to decode base64 file content")
}
