use anyhow::Result;

use results_publisher::cli::Command;
use results_publisher::{
    handle_completions, handle_preview, handle_publish, handle_schedule, handle_serve, interpret,
};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Serve { port } => handle_serve(*port),
        Command::Preview { submission, output } => handle_preview(submission, output.as_deref()),
        Command::Publish { submission } => handle_publish(submission),
        Command::Schedule { input } => handle_schedule(input),
        Command::Completions { shell } => handle_completions(*shell),
    }
}
