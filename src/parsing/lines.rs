use regex::Regex;
use std::sync::LazyLock;

use crate::domain::{Category, Stage};

pub const HEADER_MARKER: char = '◆';

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^◆\s*(?P<category>男子シングルス|男子ダブルス|女子シングルス|女子ダブルス)\s*(?P<stage>本戦|予選)?\s*(?P<round>.*)$",
    )
    .expect("header pattern is valid")
});

static STRICT_SCORE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<score>[0-9][0-9\-/(),]*)\s+(?P<opp>[^()]+?)\s*(?:\((?P<aff>[^()]*)\))?$")
        .expect("score pattern is valid")
});

const SCORE_PUNCTUATION: &[char] = &['-', '/', '(', ')', ','];

/// How blank lines are treated when splitting pasted text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tokenization {
    /// Blank lines are dropped
    DropBlank,
    /// Blank lines survive as separators
    KeepBlank,
}

/// Split text into stripped lines, trimming blank runs at both ends.
pub fn split_lines(text: &str, mode: Tokenization) -> Vec<&str> {
    let mut lines: Vec<&str> = text.lines().map(str::trim).collect();

    match mode {
        Tokenization::DropBlank => lines.retain(|l| !l.is_empty()),
        Tokenization::KeepBlank => {
            let start = lines.iter().position(|l| !l.is_empty()).unwrap_or(lines.len());
            let end = lines.iter().rposition(|l| !l.is_empty()).map_or(start, |i| i + 1);
            lines = lines[start..end].to_vec();
        }
    }

    lines
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionHeader {
    pub category: Category,
    pub stage: Stage,
    pub round: String,
}

/// Which matcher recognized a score line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreMatcher {
    Strict,
    Loose,
}

/// Score lines are tried against these matchers in order; first hit wins.
pub const SCORE_MATCHERS: [ScoreMatcher; 2] = [ScoreMatcher::Strict, ScoreMatcher::Loose];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreLine {
    pub score: String,
    pub opponent: String,
    pub affiliation: Option<String>,
    pub matcher: ScoreMatcher,
}

impl ScoreLine {
    /// Opponent plus the parenthesized affiliation, if any
    pub fn opponent_token(&self) -> String {
        match &self.affiliation {
            Some(aff) => format!("{}({})", self.opponent, aff),
            None => self.opponent.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    Blank,
    Header(SectionHeader),
    /// Marker glyph present, category not one of the four draws
    UnknownHeader(&'a str),
    Score(ScoreLine),
    Text(&'a str),
}

pub fn classify(line: &str) -> Line<'_> {
    if line.is_empty() {
        return Line::Blank;
    }
    if line.starts_with(HEADER_MARKER) {
        return match parse_header(line) {
            Some(header) => Line::Header(header),
            None => Line::UnknownHeader(line),
        };
    }
    match match_score(line) {
        Some(score) => Line::Score(score),
        None => Line::Text(line),
    }
}

pub fn parse_header(line: &str) -> Option<SectionHeader> {
    let caps = HEADER_RE.captures(line)?;
    let category = Category::from_label(&caps["category"])?;
    let stage = caps
        .name("stage")
        .map_or(Stage::Unspecified, |m| Stage::from_label(m.as_str()));

    Some(SectionHeader {
        category,
        stage,
        round: caps["round"].trim().to_string(),
    })
}

pub fn match_score(line: &str) -> Option<ScoreLine> {
    SCORE_MATCHERS
        .iter()
        .find_map(|matcher| matcher.try_match(line))
}

impl ScoreMatcher {
    pub fn try_match(&self, line: &str) -> Option<ScoreLine> {
        match self {
            ScoreMatcher::Strict => match_strict(line),
            ScoreMatcher::Loose => match_loose(line),
        }
    }
}

fn match_strict(line: &str) -> Option<ScoreLine> {
    let caps = STRICT_SCORE_RE.captures(line)?;
    let opponent = caps["opp"].trim();
    if opponent.is_empty() {
        return None;
    }

    Some(ScoreLine {
        score: caps["score"].to_string(),
        opponent: opponent.to_string(),
        affiliation: caps
            .name("aff")
            .map(|m| m.as_str().trim().to_string())
            .filter(|aff| !aff.is_empty()),
        matcher: ScoreMatcher::Strict,
    })
}

fn match_loose(line: &str) -> Option<ScoreLine> {
    let (score, rest) = line.split_once(char::is_whitespace)?;
    let rest = rest.trim();
    if rest.is_empty() || !is_score_token(score) {
        return None;
    }

    Some(ScoreLine {
        score: score.to_string(),
        opponent: rest.to_string(),
        affiliation: None,
        matcher: ScoreMatcher::Loose,
    })
}

fn is_score_token(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_digit())
        && token
            .chars()
            .all(|c| c.is_ascii_digit() || SCORE_PUNCTUATION.contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_keep_blank_trims_edges_only() {
        let text = "\n\n◆男子シングルス本戦1R\n選手A\n\n選手B\n  \n";
        assert_eq!(
            split_lines(text, Tokenization::KeepBlank),
            vec!["◆男子シングルス本戦1R", "選手A", "", "選手B"]
        );
        assert_eq!(
            split_lines(text, Tokenization::DropBlank),
            vec!["◆男子シングルス本戦1R", "選手A", "選手B"]
        );
    }

    #[test]
    fn test_split_handles_crlf() {
        assert_eq!(split_lines("a\r\nb\r\n", Tokenization::DropBlank), vec!["a", "b"]);
    }

    #[test]
    fn test_header_with_stage_and_round() {
        let header = parse_header("◆女子ダブルス予選F").unwrap();
        assert_eq!(header.category, Category::WomensDoubles);
        assert_eq!(header.stage, Stage::Qualifying);
        assert_eq!(header.round, "F");
    }

    #[test]
    fn test_header_without_stage() {
        let header = parse_header("◆男子シングルス 準決勝").unwrap();
        assert_eq!(header.stage, Stage::Unspecified);
        assert_eq!(header.round, "準決勝");
    }

    #[test]
    fn test_unknown_category_header() {
        assert_eq!(classify("◆混合ダブルス本戦1R"), Line::UnknownHeader("◆混合ダブルス本戦1R"));
    }

    #[test]
    fn test_strict_score_with_affiliation() {
        let score = match_score("4-6/6(4)-7 杉本一樹(明治大学)").unwrap();
        assert_eq!(score.score, "4-6/6(4)-7");
        assert_eq!(score.opponent, "杉本一樹");
        assert_eq!(score.affiliation.as_deref(), Some("明治大学"));
        assert_eq!(score.matcher, ScoreMatcher::Strict);
        assert_eq!(score.opponent_token(), "杉本一樹(明治大学)");
    }

    #[test]
    fn test_loose_fallback_keeps_raw_opponent() {
        let score = match_score("6-2/6-3 山田(A)・佐藤(B)").unwrap();
        assert_eq!(score.matcher, ScoreMatcher::Loose);
        assert_eq!(score.score, "6-2/6-3");
        assert_eq!(score.opponent_token(), "山田(A)・佐藤(B)");
    }

    #[test]
    fn test_non_score_lines() {
        assert_eq!(match_score("選手A"), None);
        assert_eq!(match_score("不正な行"), None);
        assert_eq!(match_score("-/- 棄権"), None);
        assert_eq!(match_score("1R"), None);
        assert_eq!(classify("選手A"), Line::Text("選手A"));
    }
}
