use log::{debug, warn};
use regex::Regex;
use std::sync::LazyLock;

use super::lines::{split_lines, Tokenization};
use super::normalize::{display_score, normalize};
use crate::domain::{Gender, LineRecord, TeamBucket, TeamReport};

static TEAM_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[◆■]\s*(?P<title>(?P<gender>男子|女子).*)$").expect("team header pattern is valid")
});

static MATCH_ROW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<slot>[A-Za-zＡ-Ｚａ-ｚ]+\d*)\s+(?P<team>\S+)\s+(?P<score>\d[\d\-/(),]*)\s+(?P<opp>.+)$",
    )
    .expect("match row pattern is valid")
});

static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("digit pattern is valid"));

static TIEBREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("tiebreak pattern is valid"));

/// Sets won by each side of one match
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetTally {
    pub home: u32,
    pub away: u32,
}

/// Count set wins in an ASCII score such as `6-3/6(4)-7`.
///
/// Tiebreak detail in parentheses is ignored; the first two numbers of each
/// set are home and away games. Sets with fewer than two numbers are skipped.
pub fn set_tally(score: &str) -> SetTally {
    let mut tally = SetTally::default();

    for set in score.split('/') {
        let set = TIEBREAK_RE.replace_all(set, "");
        let games: Vec<u32> = DIGITS_RE
            .find_iter(&set)
            .filter_map(|m| m.as_str().parse().ok())
            .take(2)
            .collect();

        let [home, away] = games[..] else {
            continue;
        };
        if home > away {
            tally.home += 1;
        } else if away > home {
            tally.away += 1;
        }
    }

    tally
}

/// Whether the home side took the match. Equal set counts go to the away side.
pub fn did_home_team_win(score: &str) -> bool {
    let tally = set_tally(score);
    tally.home > tally.away
}

/// Final result of a bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    HomeWin,
    AwayWin,
    Draw,
}

impl Verdict {
    fn from_tally(home: u32, away: u32) -> Self {
        match home.cmp(&away) {
            std::cmp::Ordering::Greater => Verdict::HomeWin,
            std::cmp::Ordering::Less => Verdict::AwayWin,
            std::cmp::Ordering::Equal => Verdict::Draw,
        }
    }

    pub fn sentence(&self, home_side: &str, home: u32, away: u32) -> String {
        match self {
            Verdict::HomeWin => format!("{home_side}は{home}勝{away}敗で勝利しました。"),
            Verdict::AwayWin => format!("{home_side}は{home}勝{away}敗で敗れました。"),
            Verdict::Draw => format!("{home_side}は{home}勝{away}敗で引き分けました。"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TeamState {
    Idle,
    Open(Gender),
    /// Header repeated a bucket that is already closed
    Skipping,
}

struct TeamParser {
    state: TeamState,
    report: TeamReport,
    /// Home wins / away wins of the open bucket, from its match rows
    tally: (u32, u32),
}

/// Parse a team-results paste into men's and women's buckets.
///
/// Each bucket ends with a verdict note summarizing its match rows.
pub fn parse_team(text: &str) -> TeamReport {
    let normalized = normalize(text);
    let mut parser = TeamParser {
        state: TeamState::Idle,
        report: TeamReport::default(),
        tally: (0, 0),
    };

    for line in split_lines(&normalized, Tokenization::DropBlank) {
        parser.step(line);
    }

    parser.finish()
}

impl TeamParser {
    fn step(&mut self, line: &str) {
        if let Some(caps) = TEAM_HEADER_RE.captures(line) {
            let gender = Gender::from_label(&caps["gender"]);
            if let Some(gender) = gender {
                self.open_bucket(gender, caps["title"].trim());
            }
            return;
        }

        match self.state {
            TeamState::Open(gender) => self.push_row(gender, line),
            TeamState::Idle => debug!("Ignoring line before any team header: {}", line),
            TeamState::Skipping => debug!("Ignoring line of repeated bucket: {}", line),
        }
    }

    fn open_bucket(&mut self, gender: Gender, title: &str) {
        self.close_open_bucket();

        let slot = self.report.bucket_slot(gender);
        if slot.is_some() {
            warn!("Bucket '{}' appears twice; ignoring the repeat", title);
            self.state = TeamState::Skipping;
            return;
        }

        *slot = Some(TeamBucket::new(title));
        self.state = TeamState::Open(gender);
        self.tally = (0, 0);
    }

    fn push_row(&mut self, gender: Gender, line: &str) {
        let record = match MATCH_ROW_RE.captures(line) {
            Some(caps) => {
                let score = &caps["score"];
                if did_home_team_win(score) {
                    self.tally.0 += 1;
                } else {
                    self.tally.1 += 1;
                }
                LineRecord::Match {
                    slot: caps["slot"].to_string(),
                    team: caps["team"].to_string(),
                    score: display_score(score),
                    opponent: caps["opp"].trim().to_string(),
                }
            }
            None => LineRecord::Note {
                text: line.to_string(),
            },
        };

        if let Some(bucket) = self.report.bucket_slot(gender) {
            bucket.lines.push(record);
        }
    }

    fn close_open_bucket(&mut self) {
        let TeamState::Open(gender) = self.state else {
            return;
        };
        let (home, away) = self.tally;

        if let Some(bucket) = self.report.bucket_slot(gender) {
            let home_side = bucket
                .matches()
                .next()
                .map(|(team, _)| team.to_string())
                .unwrap_or_else(|| bucket.title.clone());
            let verdict = Verdict::from_tally(home, away);
            bucket.lines.push(LineRecord::Note {
                text: verdict.sentence(&home_side, home, away),
            });
        }

        self.state = TeamState::Idle;
    }

    fn finish(mut self) -> TeamReport {
        self.close_open_bucket();
        self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notes(bucket: &TeamBucket) -> Vec<&str> {
        bucket
            .lines
            .iter()
            .filter_map(|l| match l {
                LineRecord::Note { text } => Some(text.as_str()),
                LineRecord::Match { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_home_win_in_straight_sets() {
        assert_eq!(set_tally("6-3/6-2"), SetTally { home: 2, away: 0 });
        assert!(did_home_team_win("6-3/6-2"));
    }

    #[test]
    fn test_tiebreak_detail_ignored() {
        assert_eq!(set_tally("4-6/6(4)-7"), SetTally { home: 0, away: 2 });
        assert!(!did_home_team_win("4-6/6(4)-7"));
    }

    #[test]
    fn test_malformed_set_skipped() {
        assert_eq!(set_tally("6-4/RET/3"), SetTally { home: 1, away: 0 });
    }

    #[test]
    fn test_equal_sets_count_as_away_win() {
        assert!(!did_home_team_win("6-4/4-6"));
        assert!(!did_home_team_win(""));
    }

    #[test]
    fn test_parse_buckets_and_verdicts() {
        let text = "\
◆男子 1部リーグ 対 明治大学
S1 早稲田 6-3/6-2 明治
S2 早稲田 4-6/6(4)-7 明治
D1 早稲田 6-4/6-4 明治
雨天のため室内コートで実施
◆女子 1部リーグ 対 慶應義塾
S1 早稲田 ３－６／２－６ 慶應
";
        let report = parse_team(text);

        let mens = report.mens.as_ref().unwrap();
        assert_eq!(mens.title, "男子 1部リーグ 対 明治大学");
        assert_eq!(mens.lines.len(), 5);
        assert_eq!(
            mens.lines[0],
            LineRecord::Match {
                slot: "S1".to_string(),
                team: "早稲田".to_string(),
                score: "6－3／6－2".to_string(),
                opponent: "明治".to_string(),
            }
        );
        assert_eq!(
            notes(mens),
            vec!["雨天のため室内コートで実施", "早稲田は2勝1敗で勝利しました。"]
        );

        let womens = report.womens.as_ref().unwrap();
        assert_eq!(notes(womens), vec!["早稲田は0勝1敗で敗れました。"]);
    }

    #[test]
    fn test_draw_verdict() {
        let report = parse_team("◆男子 練習試合\nS1 A大 6-0 B大\nS2 A大 0-6 B大");
        let mens = report.mens.unwrap();
        assert_eq!(notes(&mens), vec!["A大は1勝1敗で引き分けました。"]);
    }

    #[test]
    fn test_bucket_without_matches_still_closes() {
        let report = parse_team("■女子 対抗戦\n中止となりました");
        let womens = report.womens.unwrap();
        assert_eq!(
            notes(&womens),
            vec!["中止となりました", "女子 対抗戦は0勝0敗で引き分けました。"]
        );
        assert!(report.mens.is_none());
    }

    #[test]
    fn test_repeated_bucket_ignored() {
        let text = "◆男子 A\nS1 X 6-0 Y\n◆女子 B\nS1 X 0-6 Y\n◆男子 C\nS2 X 6-0 Z";
        let report = parse_team(text);
        let mens = report.mens.unwrap();

        assert_eq!(mens.title, "男子 A");
        assert_eq!(mens.matches().count(), 1);
        assert_eq!(notes(&mens).len(), 1);
    }

    #[test]
    fn test_no_header_yields_empty_report() {
        assert!(parse_team("S1 X 6-0 Y").is_empty());
    }
}
