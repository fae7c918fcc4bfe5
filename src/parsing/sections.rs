use log::debug;

use super::lines::{classify, split_lines, Line, ScoreLine, ScoreMatcher, SectionHeader, Tokenization};
use super::normalize::normalize;
use crate::domain::{Category, CategoryRecord, ResultBatch, Stage};

/// Context opened by the most recent header
#[derive(Debug, Clone)]
struct SectionContext {
    stage: Stage,
    round: String,
    /// Index of the category record receiving lines
    record: usize,
    /// Player whose block is still open (until a blank line or header)
    open_player: Option<String>,
}

#[derive(Debug, Clone)]
enum SectionState {
    NoSection,
    InSection(SectionContext),
}

/// Accumulator threaded through the line fold
struct SectionParser {
    state: SectionState,
    last_header: Option<Category>,
    batch: ResultBatch,
}

/// Parse pasted individual results into a batch of categories, players and round lines.
///
/// Each header opens a section; inside it a name line followed by a score line
/// yields one round line `"{round} {score} {opponent}"`. A name line not
/// followed by a score line is dropped on its own so the pairing recovers on
/// the next line.
pub fn parse_sections(text: &str) -> ResultBatch {
    let normalized = normalize(text);
    let raw = split_lines(&normalized, Tokenization::KeepBlank);
    let lines: Vec<Line> = raw.iter().map(|l| classify(l)).collect();

    let mut parser = SectionParser::new();
    let mut index = 0;
    while index < lines.len() {
        index += parser.step(raw[index], &lines[index], lines.get(index + 1));
    }

    parser.finish()
}

impl SectionParser {
    fn new() -> Self {
        Self {
            state: SectionState::NoSection,
            last_header: None,
            batch: Vec::new(),
        }
    }

    /// Consume the current line (and possibly the next). Returns how many lines were used.
    fn step(&mut self, raw: &str, line: &Line, next: Option<&Line>) -> usize {
        match line {
            Line::Header(header) => {
                self.open_section(header);
                1
            }
            Line::UnknownHeader(text) => {
                debug!("Skipping section with unknown category: {}", text);
                self.state = SectionState::NoSection;
                self.last_header = None;
                1
            }
            Line::Blank => {
                if let SectionState::InSection(ctx) = &mut self.state {
                    ctx.open_player = None;
                }
                1
            }
            Line::Score(score) => self.consume_row(raw, Some(score), next),
            Line::Text(_) => self.consume_row(raw, None, next),
        }
    }

    fn open_section(&mut self, header: &SectionHeader) {
        let continues = self.last_header == Some(header.category) && !self.batch.is_empty();
        if !continues {
            self.batch.push(CategoryRecord::new(header.category));
        }

        self.last_header = Some(header.category);
        self.state = SectionState::InSection(SectionContext {
            stage: header.stage,
            round: header.round.clone(),
            record: self.batch.len() - 1,
            open_player: None,
        });
    }

    fn consume_row(&mut self, raw: &str, score: Option<&ScoreLine>, next: Option<&Line>) -> usize {
        let SectionState::InSection(ctx) = &mut self.state else {
            debug!("Ignoring line outside any section: {}", raw);
            return 1;
        };

        // Only an unambiguous score line extends the open player; a loose
        // match or one followed by another score line is read as a name.
        if let (Some(score), Some(player)) = (score, ctx.open_player.as_deref())
            && score.matcher == ScoreMatcher::Strict
            && !matches!(next, Some(Line::Score(_)))
        {
            let line = round_line(&ctx.round, score);
            self.batch[ctx.record].insert_line(player, ctx.stage, &line);
            return 1;
        }

        match next {
            Some(Line::Score(score)) => {
                let line = round_line(&ctx.round, score);
                self.batch[ctx.record].insert_line(raw, ctx.stage, &line);
                ctx.open_player = Some(raw.to_string());
                2
            }
            _ => {
                debug!("No score line after '{}', resynchronizing", raw);
                ctx.open_player = None;
                1
            }
        }
    }

    fn finish(self) -> ResultBatch {
        self.batch
            .into_iter()
            .filter(|record| !record.players.is_empty())
            .collect()
    }
}

fn round_line(round: &str, score: &ScoreLine) -> String {
    let opponent = score.opponent_token();
    [round, score.score.as_str(), opponent.as_str()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
