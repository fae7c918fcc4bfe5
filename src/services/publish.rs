use chrono::{Local, NaiveDate};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::settings::AppConfig;
use crate::domain::{self, CumulativeState, MergeStats, ScheduleEntry};
use crate::errors::PublishError;
use crate::notify::Notifier;
use crate::parsing;
use crate::render::{HtmlRenderer, Renderer, ReportContext, Template};
use crate::store::BlobStore;

/// Which parser the pasted text goes through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResultMode {
    #[default]
    Individual,
    Team,
}

impl ResultMode {
    fn template(&self) -> Template {
        match self {
            ResultMode::Individual => Template::IndividualResults,
            ResultMode::Team => Template::TeamResults,
        }
    }
}

impl fmt::Display for ResultMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultMode::Individual => write!(f, "individual"),
            ResultMode::Team => write!(f, "team"),
        }
    }
}

/// One submission from the operator
#[derive(Debug, Clone)]
pub struct PublishRequest {
    /// Tournament tag; selects the cumulative state
    pub tag: String,
    pub title: Option<String>,
    pub mode: ResultMode,
    pub raw: String,
    /// Next-day schedule blocks, shown in this cycle's report only
    pub schedule: Option<String>,
    pub published_on: NaiveDate,
}

impl PublishRequest {
    pub fn today(tag: &str, mode: ResultMode, raw: &str) -> Self {
        Self {
            tag: tag.to_string(),
            title: None,
            mode,
            raw: raw.to_string(),
            schedule: None,
            published_on: Local::now().date_naive(),
        }
    }
}

/// Rendered result of a dry run
#[derive(Debug, Clone, Serialize)]
pub struct Preview {
    pub html: String,
    pub stats: PublishStats,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PublishStats {
    pub parsed_lines: usize,
    pub added_lines: usize,
    pub duplicate_lines: usize,
    pub schedule_entries: usize,
}

/// Locations written by a publish
#[derive(Debug, Clone, Serialize)]
pub struct PublishReceipt {
    pub state_key: String,
    pub report_key: String,
    pub archive_key: String,
    /// Public address of the latest report, if the store serves one
    pub report_url: Option<String>,
    pub notified: usize,
    pub stats: PublishStats,
}

/// Parsed submission, ready to merge
enum Parsed {
    Individual(domain::ResultBatch),
    Team(domain::TeamReport),
}

impl Parsed {
    fn line_count(&self) -> usize {
        match self {
            Parsed::Individual(batch) => domain::models::batch_line_count(batch),
            Parsed::Team(report) => report.line_count(),
        }
    }
}

/// Outcome of the read-parse-merge half shared by preview and publish
struct Merged {
    state: CumulativeState,
    schedule: Vec<ScheduleEntry>,
    stats: PublishStats,
}

/// Read-modify-write cycle over one tournament's cumulative state
pub struct PublishService<S, N, R = HtmlRenderer> {
    config: AppConfig,
    store: S,
    notifier: N,
    renderer: R,
}

impl<S: BlobStore, N: Notifier> PublishService<S, N, HtmlRenderer> {
    pub fn new(config: AppConfig, store: S, notifier: N) -> Self {
        Self::with_renderer(config, store, notifier, HtmlRenderer)
    }
}

impl<S: BlobStore, N: Notifier, R: Renderer> PublishService<S, N, R> {
    pub fn with_renderer(config: AppConfig, store: S, notifier: N, renderer: R) -> Self {
        Self {
            config,
            store,
            notifier,
            renderer,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Render what a publish would produce without writing anything
    pub async fn preview(&self, request: &PublishRequest) -> Result<Preview, PublishError> {
        let merged = self.parse_and_merge(request).await?;
        let html = self.render(request.mode, &merged)?;
        Ok(Preview {
            html,
            stats: merged.stats,
        })
    }

    /// Merge the submission into the stored state, write state and report, then notify
    pub async fn publish(&self, request: &PublishRequest) -> Result<PublishReceipt, PublishError> {
        info!("=== Publishing {} results for '{}' ===", request.mode, request.tag);

        let merged = self.parse_and_merge(request).await?;
        let state_key = self.state_key(&request.tag);
        let timestamp = Local::now().format("%Y-%m-%dT%H:%M:%S").to_string();

        let json = serde_json::to_vec_pretty(&merged.state)
            .map_err(|e| PublishError::storage(&state_key, e.into()))?;
        self.write(&state_key, &json, &format!("Update {} ({})", state_key, timestamp))
            .await?;
        info!("  → Saved state to {}", state_key);

        let html = self.render(request.mode, &merged)?;
        let report_key = report_key(&request.tag);
        let archive_key = archive_key(&request.tag, request.published_on);
        self.write(&report_key, html.as_bytes(), &format!("Update {} ({})", report_key, timestamp))
            .await?;
        self.write(
            &archive_key,
            html.as_bytes(),
            &format!("Archive results ({})", request.published_on),
        )
        .await?;
        info!("  → Published {} and {}", report_key, archive_key);
        let report_url = self.store.public_url(&report_key);
        if let Some(url) = &report_url {
            info!("  → {}", url);
        }

        let notified = self.notify(&merged.state, request.published_on, &html).await?;

        info!("=== Publish Complete ===");
        Ok(PublishReceipt {
            state_key,
            report_key,
            archive_key,
            report_url,
            notified,
            stats: merged.stats,
        })
    }

    async fn parse_and_merge(&self, request: &PublishRequest) -> Result<Merged, PublishError> {
        validate_tag(&request.tag)?;

        let parsed = parse_submission(request)?;
        let schedule = request
            .schedule
            .as_deref()
            .map(parsing::parse_schedule)
            .unwrap_or_default();
        info!(
            "  → Parsed {} lines, {} schedule entries",
            parsed.line_count(),
            schedule.len()
        );

        let title = self.resolve_title(request);
        let mut state = self.load_state(&request.tag, &title).await?;

        let merge_stats = match &parsed {
            Parsed::Individual(batch) => domain::merge_sections(&mut state.sections, batch),
            Parsed::Team(report) => domain::upsert_team_day(&mut state, request.published_on, report),
        };
        if let Some(title) = request.title.as_deref().filter(|t| !t.trim().is_empty()) {
            state.title = title.trim().to_string();
        }
        state.touch(request.published_on);
        info!(
            "  → Merged: {} new, {} already published",
            merge_stats.added, merge_stats.duplicates
        );

        Ok(Merged {
            state,
            stats: stats(&parsed, merge_stats, schedule.len()),
            schedule,
        })
    }

    async fn load_state(&self, tag: &str, title: &str) -> Result<CumulativeState, PublishError> {
        let key = self.state_key(tag);
        let stored = self
            .store
            .get(&key)
            .await
            .map_err(|e| PublishError::storage(&key, e))?;

        match stored {
            Some(bytes) => serde_json::from_slice(&bytes).map_err(|e| PublishError::CorruptState { key, source: e }),
            None => {
                info!("  → No state at {}, starting a new one", key);
                Ok(CumulativeState::new(title))
            }
        }
    }

    async fn write(&self, key: &str, content: &[u8], message: &str) -> Result<(), PublishError> {
        self.store
            .put(key, content, message)
            .await
            .map_err(|e| PublishError::storage(key, e))
    }

    fn render(&self, mode: ResultMode, merged: &Merged) -> Result<String, PublishError> {
        let context = ReportContext {
            state: &merged.state,
            schedule: &merged.schedule,
        };
        self.renderer
            .render(mode.template(), &context)
            .map_err(|e| PublishError::Render(e.into()))
    }

    async fn notify(&self, state: &CumulativeState, date: NaiveDate, html: &str) -> Result<usize, PublishError> {
        let recipients = &self.config.notify.recipients;
        if recipients.is_empty() {
            warn!("No notification recipients configured");
            return Ok(0);
        }

        let subject = format!("{} ({})", state.title, date);
        for recipient in recipients {
            if let Err(e) = self.notifier.send(recipient, &subject, html).await {
                error!("Notification to {} failed after publishing: {:?}", recipient, e);
                return Err(PublishError::notification(recipient, e));
            }
        }

        Ok(recipients.len())
    }

    fn resolve_title(&self, request: &PublishRequest) -> String {
        request
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.config.publish.default_title)
            .to_string()
    }

    fn state_key(&self, tag: &str) -> String {
        format!("{}/{}.json", self.config.publish.state_prefix, tag)
    }
}

fn parse_submission(request: &PublishRequest) -> Result<Parsed, PublishError> {
    let parsed = match request.mode {
        ResultMode::Individual => {
            let batch = parsing::parse_sections(&request.raw);
            if batch.is_empty() {
                return Err(PublishError::EmptyBatch(request.mode));
            }
            Parsed::Individual(batch)
        }
        ResultMode::Team => {
            let report = parsing::parse_team(&request.raw);
            if report.is_empty() {
                return Err(PublishError::EmptyBatch(request.mode));
            }
            Parsed::Team(report)
        }
    };
    Ok(parsed)
}

fn stats(parsed: &Parsed, merge: MergeStats, schedule_entries: usize) -> PublishStats {
    PublishStats {
        parsed_lines: parsed.line_count(),
        added_lines: merge.added,
        duplicate_lines: merge.duplicates,
        schedule_entries,
    }
}

pub fn validate_tag(tag: &str) -> Result<(), PublishError> {
    let valid = !tag.is_empty()
        && tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(PublishError::InvalidTag(tag.to_string()))
    }
}

pub fn report_key(tag: &str) -> String {
    format!("{}/latest.html", tag)
}

pub fn archive_key(tag: &str, date: NaiveDate) -> String {
    format!("{}/archive/{}.html", tag, date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::LogNotifier;
    use crate::store::MemoryStore;

    const RESULTS: &str = "◆男子シングルス本戦1R\n不正な行\n選手A\n6-2/6-3 対戦相手(大学)";

    fn request(raw: &str) -> PublishRequest {
        PublishRequest {
            tag: "spring-2025".to_string(),
            title: Some("春季大会".to_string()),
            mode: ResultMode::Individual,
            raw: raw.to_string(),
            schedule: None,
            published_on: NaiveDate::from_ymd_opt(2025, 4, 20).unwrap(),
        }
    }

    fn service() -> PublishService<MemoryStore, LogNotifier> {
        PublishService::new(AppConfig::new(), MemoryStore::new(), LogNotifier)
    }

    #[test]
    fn test_validate_tag() {
        assert!(validate_tag("spring-2025_a").is_ok());
        assert!(validate_tag("").is_err());
        assert!(validate_tag("../etc").is_err());
        assert!(validate_tag("春").is_err());
    }

    #[test]
    fn test_keys() {
        let date = NaiveDate::from_ymd_opt(2025, 4, 20).unwrap();
        assert_eq!(report_key("spring"), "spring/latest.html");
        assert_eq!(archive_key("spring", date), "spring/archive/2025-04-20.html");
    }

    #[tokio::test]
    async fn test_preview_writes_nothing() {
        let service = service();
        let preview = service.preview(&request(RESULTS)).await.unwrap();

        assert!(preview.html.contains("選手A"));
        assert_eq!(preview.stats.added_lines, 1);
        assert!(service.store().keys().is_empty());
    }

    #[tokio::test]
    async fn test_empty_batch_rejected_before_io() {
        let service = service();
        let err = service.publish(&request("何もない")).await.unwrap_err();

        assert!(matches!(err, PublishError::EmptyBatch(ResultMode::Individual)));
        assert!(service.store().keys().is_empty());
    }

    #[tokio::test]
    async fn test_publish_writes_state_and_reports() {
        let service = service();
        let receipt = service.publish(&request(RESULTS)).await.unwrap();

        assert_eq!(receipt.state_key, "state/spring-2025.json");
        assert_eq!(receipt.report_url, None);
        assert_eq!(receipt.notified, 0);
        assert_eq!(
            service.store().keys(),
            vec![
                "spring-2025/archive/2025-04-20.html",
                "spring-2025/latest.html",
                "state/spring-2025.json",
            ]
        );

        let bytes = service.store().read("state/spring-2025.json").unwrap();
        let state: CumulativeState = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(state.title, "春季大会");
        assert_eq!(state.last_updated, "2025-04-20");
        assert_eq!(state.sections[0].players[0].name, "選手A");
    }

    /// Memory store that also serves its files at a public address
    struct ServedStore(MemoryStore);

    impl BlobStore for ServedStore {
        async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
            self.0.get(key).await
        }

        async fn put(&self, key: &str, content: &[u8], message: &str) -> anyhow::Result<()> {
            self.0.put(key, content, message).await
        }

        fn public_url(&self, key: &str) -> Option<String> {
            Some(format!("https://club.example/{key}"))
        }
    }

    #[tokio::test]
    async fn test_receipt_carries_public_report_url() {
        let service = PublishService::new(AppConfig::new(), ServedStore(MemoryStore::new()), LogNotifier);
        let receipt = service.publish(&request(RESULTS)).await.unwrap();

        assert_eq!(
            receipt.report_url.as_deref(),
            Some("https://club.example/spring-2025/latest.html")
        );
    }

    #[tokio::test]
    async fn test_corrupt_state_is_fatal() {
        let service = service();
        service
            .store()
            .put("state/spring-2025.json", b"not json", "seed")
            .await
            .unwrap();

        let err = service.publish(&request(RESULTS)).await.unwrap_err();
        assert!(matches!(err, PublishError::CorruptState { .. }));
        assert_eq!(service.store().commits(), vec!["seed"]);
    }
}
