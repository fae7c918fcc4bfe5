use anyhow::Result;
use log::debug;
use std::collections::HashSet;
use std::fmt::Write;

use super::{ReportContext, Renderer, Template};
use crate::domain::{CategoryRecord, LineRecord, ScheduleEntry, TeamBucket, TeamDay};
use crate::parsing::active_players;

const STYLE: &str = "body{font-family:system-ui,-apple-system,'Hiragino Sans',sans-serif;margin:24px;line-height:1.5;}\
h2{border-bottom:2px solid #234;padding-bottom:4px;}\
.player.active h3{color:#b00;}\
.badge{font-size:12px;background:#b00;color:#fff;border-radius:4px;padding:1px 6px;margin-left:8px;}\
table{border-collapse:collapse;}td,th{border:1px solid #ccc;padding:4px 8px;}\
.note td{background:#f6f6f6;}";

/// Built-in HTML report renderer
#[derive(Debug, Default, Clone)]
pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn render(&self, template: Template, context: &ReportContext) -> Result<String> {
        let mut out = String::new();
        let state = context.state;
        debug!("Rendering {} for '{}'", template.name(), state.title);

        write_head(&mut out, &state.title)?;
        writeln!(out, "<h1>{}</h1>", escape_html(&state.title))?;
        writeln!(out, "<p class=\"updated\">更新日: {}</p>", escape_html(&state.last_updated))?;

        match template {
            Template::IndividualResults => {
                let active: HashSet<String> = active_players(context.schedule).into_iter().collect();
                for record in &state.sections {
                    write_category(&mut out, record, &active)?;
                }
            }
            Template::TeamResults => {
                for day in state.team_days.iter().rev() {
                    write_team_day(&mut out, day)?;
                }
            }
        }

        write_schedule(&mut out, context.schedule)?;
        out.push_str("</body>\n</html>\n");
        Ok(out)
    }
}

fn write_head(out: &mut String, title: &str) -> Result<()> {
    writeln!(out, "<!doctype html>")?;
    writeln!(out, "<html lang=\"ja\">")?;
    writeln!(out, "<head>")?;
    writeln!(out, "<meta charset=\"utf-8\" />")?;
    writeln!(out, "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />")?;
    writeln!(out, "<title>{}</title>", escape_html(title))?;
    writeln!(out, "<style>{}</style>", STYLE)?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;
    Ok(())
}

fn write_category(out: &mut String, record: &CategoryRecord, active: &HashSet<String>) -> Result<()> {
    writeln!(out, "<section>")?;
    writeln!(out, "<h2>{}</h2>", record.category.label())?;

    for player in &record.players {
        let is_active = active.contains(&player.name);
        let class = if is_active { "player active" } else { "player" };
        writeln!(out, "<div class=\"{}\">", class)?;
        write!(out, "<h3>{}", escape_html(&player.name))?;
        if is_active {
            write!(out, "<span class=\"badge\">明日出場</span>")?;
        }
        writeln!(out, "</h3>")?;

        for block in &player.blocks {
            if !block.stage.label().is_empty() {
                writeln!(out, "<h4>{}</h4>", block.stage.label())?;
            }
            writeln!(out, "<ul>")?;
            for line in &block.lines {
                writeln!(out, "<li>{}</li>", escape_html(line))?;
            }
            writeln!(out, "</ul>")?;
        }
        writeln!(out, "</div>")?;
    }

    writeln!(out, "</section>")?;
    Ok(())
}

fn write_team_day(out: &mut String, day: &TeamDay) -> Result<()> {
    writeln!(out, "<section>")?;
    writeln!(out, "<h2>{}</h2>", day.date.format("%Y-%m-%d"))?;
    for bucket in [&day.mens, &day.womens].into_iter().flatten() {
        write_team_bucket(out, bucket)?;
    }
    writeln!(out, "</section>")?;
    Ok(())
}

fn write_team_bucket(out: &mut String, bucket: &TeamBucket) -> Result<()> {
    writeln!(out, "<h3>{}</h3>", escape_html(&bucket.title))?;
    writeln!(out, "<table>")?;
    for line in &bucket.lines {
        match line {
            LineRecord::Match {
                slot,
                team,
                score,
                opponent,
            } => writeln!(
                out,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(slot),
                escape_html(team),
                escape_html(score),
                escape_html(opponent)
            )?,
            LineRecord::Note { text } => writeln!(
                out,
                "<tr class=\"note\"><td colspan=\"4\">{}</td></tr>",
                escape_html(text)
            )?,
        }
    }
    writeln!(out, "</table>")?;
    Ok(())
}

fn write_schedule(out: &mut String, schedule: &[ScheduleEntry]) -> Result<()> {
    if schedule.is_empty() {
        return Ok(());
    }

    writeln!(out, "<section class=\"schedule\">")?;
    writeln!(out, "<h2>明日の試合</h2>")?;
    writeln!(out, "<table>")?;
    writeln!(
        out,
        "<tr><th>選手</th><th>種目</th><th>対戦相手</th><th>時間</th><th>コート</th></tr>"
    )?;
    for entry in schedule {
        writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&entry.name),
            escape_html(&entry.event),
            escape_html(&entry.opponent),
            escape_html(&entry.time),
            escape_html(&entry.court)
        )?;
    }
    writeln!(out, "</table>")?;
    writeln!(out, "</section>")?;
    Ok(())
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
