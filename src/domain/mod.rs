pub mod merge;
pub mod models;

pub use merge::{merge, merge_sections, upsert_team_day, MergeStats};
pub use models::*;
