use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::services::publish::{Preview, PublishReceipt, PublishRequest, PublishStats, ResultMode};

/// Operator submission posted to `/api/preview` and `/api/publish`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionBody {
    pub tag: String,
    #[serde(default)]
    pub mode: ResultMode,
    pub results: String,
    pub schedule: Option<String>,
    pub title: Option<String>,
    /// Defaults to the server's local date
    pub published_on: Option<NaiveDate>,
}

impl From<SubmissionBody> for PublishRequest {
    fn from(body: SubmissionBody) -> Self {
        PublishRequest {
            tag: body.tag,
            title: body.title,
            mode: body.mode,
            raw: body.results,
            schedule: body.schedule,
            published_on: body
                .published_on
                .unwrap_or_else(|| Local::now().date_naive()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsBody {
    pub parsed_lines: usize,
    pub added_lines: usize,
    pub duplicate_lines: usize,
    pub schedule_entries: usize,
}

impl From<PublishStats> for StatsBody {
    fn from(stats: PublishStats) -> Self {
        StatsBody {
            parsed_lines: stats.parsed_lines,
            added_lines: stats.added_lines,
            duplicate_lines: stats.duplicate_lines,
            schedule_entries: stats.schedule_entries,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    pub html: String,
    pub stats: StatsBody,
}

impl From<Preview> for PreviewResponse {
    fn from(preview: Preview) -> Self {
        PreviewResponse {
            html: preview.html,
            stats: preview.stats.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResponse {
    pub state_key: String,
    pub report_key: String,
    pub archive_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_url: Option<String>,
    pub notified: usize,
    pub stats: StatsBody,
}

impl From<PublishReceipt> for PublishResponse {
    fn from(receipt: PublishReceipt) -> Self {
        PublishResponse {
            state_key: receipt.state_key,
            report_key: receipt.report_key,
            archive_key: receipt.archive_key,
            report_url: receipt.report_url,
            notified: receipt.notified,
            stats: receipt.stats.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    /// Set when the state and report were written before the failure
    pub published: bool,
}
