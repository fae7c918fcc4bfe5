use log::debug;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use super::lines::{split_lines, Tokenization};
use super::normalize::normalize;
use crate::domain::ScheduleEntry;

static PLAYER_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>[^（(]+?)\s*[（(](?P<event>[^）)]+)[）)]$").expect("player line pattern is valid")
});

static OPPONENT_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^対\s*(?P<opp>[^（(]+?)\s*[（(]\s*(?P<time>[^、,，]+?)\s*[、,，]\s*(?P<court>[^）)]+?)\s*[）)]$",
    )
    .expect("opponent line pattern is valid")
});

/// Parse the next-day schedule: blank-line separated blocks of
/// `name（event）` followed by `対 opponent（time、court）`.
///
/// Blocks that don't fit are dropped.
pub fn parse_schedule(text: &str) -> Vec<ScheduleEntry> {
    let normalized = normalize(text);
    let lines = split_lines(&normalized, Tokenization::KeepBlank);

    lines
        .split(|line| line.is_empty())
        .filter_map(parse_block)
        .collect()
}

fn parse_block(block: &[&str]) -> Option<ScheduleEntry> {
    let [first, second, ..] = block else {
        if !block.is_empty() {
            debug!("Schedule block too short: {:?}", block);
        }
        return None;
    };

    let player = PLAYER_LINE_RE.captures(first);
    let opponent = OPPONENT_LINE_RE.captures(second);
    let (Some(player), Some(opponent)) = (player, opponent) else {
        debug!("Schedule block not recognized: {:?}", block);
        return None;
    };

    Some(ScheduleEntry {
        name: player["name"].trim().to_string(),
        event: player["event"].trim().to_string(),
        opponent: opponent["opp"].trim().to_string(),
        time: opponent["time"].to_string(),
        court: opponent["court"].to_string(),
    })
}

/// Unique player names in first-seen order
pub fn active_players(entries: &[ScheduleEntry]) -> Vec<String> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter(|entry| seen.insert(entry.name.as_str()))
        .map(|entry| entry.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_block() {
        let entries = parse_schedule("山田太郎（男子シングルス）\n対 佐藤次郎（9:00、3番コート）");

        assert_eq!(
            entries,
            vec![ScheduleEntry {
                name: "山田太郎".to_string(),
                event: "男子シングルス".to_string(),
                opponent: "佐藤次郎".to_string(),
                time: "9:00".to_string(),
                court: "3番コート".to_string(),
            }]
        );
    }

    #[test]
    fn test_ascii_punctuation_and_bad_blocks() {
        let text = "\
山田太郎(男子シングルス)
対 佐藤次郎(9:00, 3番コート)


壊れたブロック

鈴木花子（女子ダブルス）
対戦相手なし

鈴木花子（女子シングルス）
対 高橋（１１:３０、センターコート）
";
        let entries = parse_schedule(text);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].court, "3番コート");
        assert_eq!(entries[1].name, "鈴木花子");
        assert_eq!(entries[1].time, "11:30");
        assert_eq!(entries[1].court, "センターコート");
    }

    #[test]
    fn test_active_players_unique_in_order() {
        let entry = |name: &str| ScheduleEntry {
            name: name.to_string(),
            event: String::new(),
            opponent: String::new(),
            time: String::new(),
            court: String::new(),
        };
        let entries = vec![entry("B"), entry("A"), entry("B")];

        assert_eq!(active_players(&entries), vec!["B", "A"]);
    }
}
