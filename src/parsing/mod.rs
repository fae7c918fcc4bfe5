pub mod lines;
pub mod normalize;
pub mod schedule;
pub mod sections;
pub mod team;

pub use normalize::{display_score, normalize};
pub use schedule::{active_players, parse_schedule};
pub use sections::parse_sections;
pub use team::{did_home_team_win, parse_team, set_tally, SetTally};
