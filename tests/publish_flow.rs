use anyhow::{bail, Result};
use chrono::NaiveDate;

use results_publisher::config::settings::AppConfig;
use results_publisher::domain::{CumulativeState, LineRecord};
use results_publisher::errors::PublishError;
use results_publisher::notify::{LogNotifier, Notifier};
use results_publisher::services::publish::{PublishRequest, PublishService, ResultMode};
use results_publisher::store::{BlobStore, LocalStore, MemoryStore};

const DAY_ONE: &str = "\
◆男子シングルス本戦1R
山田太郎
6-2/6-3 佐藤次郎(東大)
鈴木一郎
３－６／６－４／７－５ 田中(京大)

◆女子ダブルス予選1R
高橋・伊藤
6-1/6-1 A・B(高校)
";

const DAY_TWO: &str = "\
◆男子シングルス本戦2R
山田太郎
6-4/6-4 渡辺(明治)
";

const TEAM: &str = "\
◆男子 1部リーグ 対 明治大学
S1 早稲田 6-3/6-2 明治
S2 早稲田 4-6/6(4)-7 明治
D1 早稲田 6-4/6-4 明治
";

const SCHEDULE: &str = "\
山田太郎（男子シングルス）
対 中村（10:00、1番コート）
";

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, day).unwrap()
}

fn request(raw: &str, mode: ResultMode, day: u32) -> PublishRequest {
    PublishRequest {
        tag: "spring-2025".to_string(),
        title: Some("春季大会 速報".to_string()),
        mode,
        raw: raw.to_string(),
        schedule: None,
        published_on: date(day),
    }
}

fn memory_service() -> PublishService<MemoryStore, LogNotifier> {
    PublishService::new(AppConfig::new(), MemoryStore::new(), LogNotifier)
}

fn stored_state(store: &MemoryStore) -> CumulativeState {
    let bytes = store.read("state/spring-2025.json").unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

struct FailingNotifier;

impl Notifier for FailingNotifier {
    async fn send(&self, recipient: &str, _subject: &str, _html_body: &str) -> Result<()> {
        bail!("mail service rejected {}", recipient)
    }
}

#[tokio::test]
async fn test_republishing_same_batch_is_idempotent() {
    let service = memory_service();

    let first = service
        .publish(&request(DAY_ONE, ResultMode::Individual, 1))
        .await
        .unwrap();
    let first_html = service.store().read("spring-2025/latest.html").unwrap();
    let second = service
        .publish(&request(DAY_ONE, ResultMode::Individual, 1))
        .await
        .unwrap();
    let second_html = service.store().read("spring-2025/latest.html").unwrap();

    assert_eq!(first.stats.added_lines, 3);
    assert_eq!(second.stats.added_lines, 0);
    assert_eq!(second.stats.duplicate_lines, 3);
    assert_eq!(first_html, second_html);
}

#[tokio::test]
async fn test_results_accumulate_across_days() {
    let service = memory_service();

    service
        .publish(&request(DAY_ONE, ResultMode::Individual, 1))
        .await
        .unwrap();
    service
        .publish(&request(DAY_TWO, ResultMode::Individual, 2))
        .await
        .unwrap();

    let state = stored_state(service.store());
    assert_eq!(state.last_updated, "2025-04-02");
    assert_eq!(state.sections.len(), 2);

    let yamada = &state.sections[0].players[0];
    assert_eq!(yamada.name, "山田太郎");
    assert_eq!(
        yamada.blocks[0].lines,
        vec!["1R 6-2/6-3 佐藤次郎(東大)", "2R 6-4/6-4 渡辺(明治)"]
    );

    let keys = service.store().keys();
    assert!(keys.contains(&"spring-2025/archive/2025-04-01.html".to_string()));
    assert!(keys.contains(&"spring-2025/archive/2025-04-02.html".to_string()));
}

#[tokio::test]
async fn test_schedule_highlights_players() {
    let service = memory_service();
    let mut request = request(DAY_ONE, ResultMode::Individual, 1);
    request.schedule = Some(SCHEDULE.to_string());

    let receipt = service.publish(&request).await.unwrap();
    let html = String::from_utf8(service.store().read("spring-2025/latest.html").unwrap()).unwrap();

    assert_eq!(receipt.stats.schedule_entries, 1);
    assert!(html.contains("<div class=\"player active\">"));
    assert!(html.contains("中村"));

    // The schedule only lives in that cycle's report
    let state = stored_state(service.store());
    let json = serde_json::to_string(&state).unwrap();
    assert!(!json.contains("中村"));
}

#[tokio::test]
async fn test_team_results_upsert_by_day() {
    let service = memory_service();

    service
        .publish(&request(TEAM, ResultMode::Team, 5))
        .await
        .unwrap();
    let receipt = service
        .publish(&request(TEAM, ResultMode::Team, 5))
        .await
        .unwrap();

    let state = stored_state(service.store());
    assert_eq!(state.team_days.len(), 1);
    assert_eq!(receipt.stats.added_lines, 0);

    let mens = state.team_days[0].mens.as_ref().unwrap();
    assert_eq!(
        mens.lines.last(),
        Some(&LineRecord::Note {
            text: "早稲田は2勝1敗で勝利しました。".to_string()
        })
    );
}

#[tokio::test]
async fn test_notification_failure_after_write() {
    let mut config = AppConfig::new();
    config.notify.recipients = vec!["coach@example.com".to_string()];
    let service = PublishService::new(config, MemoryStore::new(), FailingNotifier);

    let err = service
        .publish(&request(DAY_ONE, ResultMode::Individual, 1))
        .await
        .unwrap_err();

    let PublishError::Notification { recipient, .. } = err else {
        panic!("expected a notification error");
    };
    assert_eq!(recipient, "coach@example.com");
    assert_eq!(stored_state(service.store()).sections.len(), 2);
    assert!(service.store().read("spring-2025/latest.html").is_some());
}

#[tokio::test]
async fn test_local_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    let service = PublishService::new(AppConfig::new(), LocalStore::new(dir.path()).unwrap(), LogNotifier);
    service
        .publish(&request(DAY_ONE, ResultMode::Individual, 1))
        .await
        .unwrap();

    let restarted = PublishService::new(AppConfig::new(), LocalStore::new(dir.path()).unwrap(), LogNotifier);
    let receipt = restarted
        .publish(&request(DAY_ONE, ResultMode::Individual, 1))
        .await
        .unwrap();

    assert_eq!(receipt.stats.added_lines, 0);
    let latest = restarted.store().get("spring-2025/latest.html").await.unwrap();
    assert!(latest.is_some());
}
