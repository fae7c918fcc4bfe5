use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::services::publish::ResultMode;

#[derive(Parser, Debug)]
#[command(author, version, about = "tournament results publisher")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Start the operator API server
    Serve {
        /// Port number (optional, defaults to 3000)
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
    /// Render the merged report without writing anything
    Preview {
        #[command(flatten)]
        submission: SubmissionArgs,
        /// Write the rendered HTML here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Merge results into the stored state, publish the report and notify
    Publish {
        #[command(flatten)]
        submission: SubmissionArgs,
    },
    /// Parse a next-day schedule and print its entries
    Schedule {
        /// Schedule text file ("-" reads stdin)
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Print a shell completion script
    Completions {
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct SubmissionArgs {
    /// Tournament tag selecting the cumulative state
    #[arg(short, long)]
    pub tag: String,
    /// Result format of the input
    #[arg(short, long, value_enum, default_value_t = ResultMode::Individual)]
    pub mode: ResultMode,
    /// Pasted results file ("-" reads stdin)
    #[arg(short, long)]
    pub input: PathBuf,
    /// Next-day schedule file
    #[arg(short, long)]
    pub schedule: Option<PathBuf>,
    /// Report title (defaults to the stored or configured title)
    #[arg(long)]
    pub title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_publish() {
        let cli = Cli::parse_from([
            "results_publisher",
            "publish",
            "--tag",
            "spring",
            "--mode",
            "team",
            "--input",
            "-",
        ]);
        let Command::Publish { submission } = cli.command else {
            panic!("expected publish");
        };
        assert_eq!(submission.mode, ResultMode::Team);
        assert_eq!(submission.input, PathBuf::from("-"));
        assert_eq!(submission.schedule, None);
    }
}
