use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One of the four fixed draws of the individual results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "男子シングルス")]
    MensSingles,
    #[serde(rename = "男子ダブルス")]
    MensDoubles,
    #[serde(rename = "女子シングルス")]
    WomensSingles,
    #[serde(rename = "女子ダブルス")]
    WomensDoubles,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::MensSingles,
        Category::MensDoubles,
        Category::WomensSingles,
        Category::WomensDoubles,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::MensSingles => "男子シングルス",
            Category::MensDoubles => "男子ダブルス",
            Category::WomensSingles => "女子シングルス",
            Category::WomensDoubles => "女子ダブルス",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

/// Phase of a draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Stage {
    #[serde(rename = "本戦")]
    Main,
    #[serde(rename = "予選")]
    Qualifying,
    #[default]
    #[serde(rename = "")]
    Unspecified,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Main => "本戦",
            Stage::Qualifying => "予選",
            Stage::Unspecified => "",
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label {
            "本戦" => Stage::Main,
            "予選" => Stage::Qualifying,
            _ => Stage::Unspecified,
        }
    }
}

/// Round lines of one player within one stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageBlock {
    pub stage: Stage,
    pub lines: Vec<String>,
}

impl StageBlock {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            lines: Vec::new(),
        }
    }

    /// Append the line unless it is already present. Returns whether it was added.
    pub fn push_line(&mut self, line: &str) -> bool {
        if self.lines.iter().any(|existing| existing == line) {
            return false;
        }
        self.lines.push(line.to_string());
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
    pub blocks: Vec<StageBlock>,
}

impl PlayerRecord {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            blocks: Vec::new(),
        }
    }

    pub fn block_mut(&mut self, stage: Stage) -> &mut StageBlock {
        let index = match self.blocks.iter().position(|b| b.stage == stage) {
            Some(index) => index,
            None => {
                self.blocks.push(StageBlock::new(stage));
                self.blocks.len() - 1
            }
        };
        &mut self.blocks[index]
    }

    pub fn line_count(&self) -> usize {
        self.blocks.iter().map(|b| b.lines.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub category: Category,
    pub players: Vec<PlayerRecord>,
}

impl CategoryRecord {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            players: Vec::new(),
        }
    }

    pub fn player_mut(&mut self, name: &str) -> &mut PlayerRecord {
        let index = match self.players.iter().position(|p| p.name == name) {
            Some(index) => index,
            None => {
                self.players.push(PlayerRecord::new(name));
                self.players.len() - 1
            }
        };
        &mut self.players[index]
    }

    /// File a round line under `player` / `stage`. Returns whether it was new.
    pub fn insert_line(&mut self, player: &str, stage: Stage, line: &str) -> bool {
        self.player_mut(player).block_mut(stage).push_line(line)
    }
}

/// Freshly parsed individual results of one publish, before merging
pub type ResultBatch = Vec<CategoryRecord>;

pub fn batch_line_count(batch: &[CategoryRecord]) -> usize {
    batch
        .iter()
        .flat_map(|c| c.players.iter())
        .map(PlayerRecord::line_count)
        .sum()
}

/// Men's / women's bucket of a team report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Mens,
    Womens,
}

impl Gender {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "男子" => Some(Gender::Mens),
            "女子" => Some(Gender::Womens),
            _ => None,
        }
    }
}

/// One row of a team report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LineRecord {
    Match {
        slot: String,
        team: String,
        score: String,
        opponent: String,
    },
    Note {
        text: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TeamBucket {
    pub title: String,
    pub lines: Vec<LineRecord>,
}

impl TeamBucket {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            lines: Vec::new(),
        }
    }

    pub fn matches(&self) -> impl Iterator<Item = (&str, &str)> {
        self.lines.iter().filter_map(|line| match line {
            LineRecord::Match { team, score, .. } => Some((team.as_str(), score.as_str())),
            LineRecord::Note { .. } => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TeamReport {
    pub mens: Option<TeamBucket>,
    pub womens: Option<TeamBucket>,
}

impl TeamReport {
    pub fn is_empty(&self) -> bool {
        self.mens.is_none() && self.womens.is_none()
    }

    pub fn bucket(&self, gender: Gender) -> Option<&TeamBucket> {
        match gender {
            Gender::Mens => self.mens.as_ref(),
            Gender::Womens => self.womens.as_ref(),
        }
    }

    pub fn bucket_slot(&mut self, gender: Gender) -> &mut Option<TeamBucket> {
        match gender {
            Gender::Mens => &mut self.mens,
            Gender::Womens => &mut self.womens,
        }
    }

    pub fn line_count(&self) -> usize {
        [&self.mens, &self.womens]
            .into_iter()
            .flatten()
            .map(|b| b.lines.len())
            .sum()
    }
}

/// Team results published on one date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamDay {
    pub date: NaiveDate,
    #[serde(default)]
    pub mens: Option<TeamBucket>,
    #[serde(default)]
    pub womens: Option<TeamBucket>,
}

/// Persisted, ever-growing record of one tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CumulativeState {
    pub title: String,
    pub last_updated: String,
    #[serde(default)]
    pub sections: Vec<CategoryRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub team_days: Vec<TeamDay>,
}

impl CumulativeState {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            last_updated: String::new(),
            sections: Vec::new(),
            team_days: Vec::new(),
        }
    }

    pub fn touch(&mut self, date: NaiveDate) {
        self.last_updated = date.format("%Y-%m-%d").to_string();
    }
}

/// One upcoming match from the next-day schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub name: String,
    pub event: String,
    pub opponent: String,
    pub time: String,
    pub court: String,
}
