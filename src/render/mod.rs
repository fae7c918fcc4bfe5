use anyhow::Result;

use crate::domain::{CumulativeState, ScheduleEntry};

pub mod html;

pub use html::HtmlRenderer;

/// Report layouts a renderer knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    IndividualResults,
    TeamResults,
}

impl Template {
    pub fn name(&self) -> &'static str {
        match self {
            Template::IndividualResults => "individual_results.html",
            Template::TeamResults => "team_results.html",
        }
    }
}

/// Everything a report is rendered from
pub struct ReportContext<'a> {
    pub state: &'a CumulativeState,
    pub schedule: &'a [ScheduleEntry],
}

pub trait Renderer {
    fn render(&self, template: Template, context: &ReportContext) -> Result<String>;
}
