use chrono::NaiveDate;
use log::debug;

use super::models::{CategoryRecord, CumulativeState, Gender, TeamDay, TeamReport};

/// Counts of one merge pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub added: usize,
    pub duplicates: usize,
}

impl MergeStats {
    fn record(&mut self, added: bool) {
        if added {
            self.added += 1;
        } else {
            self.duplicates += 1;
        }
    }
}

/// Fold a parsed batch into the cumulative state and hand the same state back.
///
/// Categories, players and stage blocks are looked up by key and appended when
/// missing; round lines already present in their block are skipped, so merging
/// the same batch again changes nothing.
pub fn merge(mut state: CumulativeState, batch: &[CategoryRecord]) -> CumulativeState {
    merge_sections(&mut state.sections, batch);
    state
}

pub fn merge_sections(sections: &mut Vec<CategoryRecord>, batch: &[CategoryRecord]) -> MergeStats {
    let mut stats = MergeStats::default();

    for incoming in batch {
        let target = category_mut(sections, incoming);
        for player in &incoming.players {
            for block in &player.blocks {
                for line in &block.lines {
                    stats.record(target.insert_line(&player.name, block.stage, line));
                }
            }
        }
    }

    debug!(
        "Merged batch: {} new lines, {} duplicates",
        stats.added, stats.duplicates
    );
    stats
}

fn category_mut<'a>(
    sections: &'a mut Vec<CategoryRecord>,
    incoming: &CategoryRecord,
) -> &'a mut CategoryRecord {
    let index = match sections.iter().position(|c| c.category == incoming.category) {
        Some(index) => index,
        None => {
            sections.push(CategoryRecord::new(incoming.category));
            sections.len() - 1
        }
    };
    &mut sections[index]
}

/// Record a team report under its publish date.
///
/// Buckets present in the report replace that day's buckets; absent ones are
/// kept, so the men's and women's results may arrive in separate publishes.
pub fn upsert_team_day(state: &mut CumulativeState, date: NaiveDate, report: &TeamReport) -> MergeStats {
    let mut stats = MergeStats::default();

    if !state.team_days.iter().any(|d| d.date == date) {
        state.team_days.push(TeamDay {
            date,
            mens: None,
            womens: None,
        });
        // Days stay in date order even when an earlier day is published late
        state.team_days.sort_by_key(|d| d.date);
    }
    let Some(day) = state.team_days.iter_mut().find(|d| d.date == date) else {
        return stats;
    };

    for gender in [Gender::Mens, Gender::Womens] {
        let Some(bucket) = report.bucket(gender) else {
            continue;
        };
        let slot = match gender {
            Gender::Mens => &mut day.mens,
            Gender::Womens => &mut day.womens,
        };
        if slot.as_ref() == Some(bucket) {
            stats.duplicates += bucket.lines.len();
        } else {
            stats.added += bucket.lines.len();
            *slot = Some(bucket.clone());
        }
    }

    stats
}
