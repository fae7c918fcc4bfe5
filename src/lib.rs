pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod http;
pub mod notify;
pub mod parsing;
pub mod render;
pub mod services;
pub mod store;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use cli::{Cli, SubmissionArgs};
use colored::Colorize;
use log::info;
use std::io::Read;
use std::path::Path;

use crate::cli::Command;
use crate::config::settings::AppConfig;
use crate::notify::NotifierBackend;
use crate::services::publish::{PublishRequest, PublishService};
use crate::services::server::ServerService;
use crate::store::StoreBackend;

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn handle_serve(port: u16) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let config = AppConfig::from_env();
        let service = ServerService::new(port, config);
        service.run().await
    })
}

pub fn handle_preview(submission: &SubmissionArgs, output: Option<&Path>) -> Result<()> {
    let request = build_request(submission)?;
    let service = build_service(AppConfig::from_env())?;

    let runtime = tokio::runtime::Runtime::new()?;
    let preview = runtime.block_on(service.preview(&request))?;

    match output {
        Some(path) => {
            std::fs::write(path, &preview.html).context("Failed to write preview file")?;
            info!("Preview written to {}", path.display());
        }
        None => println!("{}", preview.html),
    }
    eprintln!(
        "{} {} parsed, {} new, {} already published",
        "preview:".cyan().bold(),
        preview.stats.parsed_lines,
        preview.stats.added_lines.to_string().green(),
        preview.stats.duplicate_lines.to_string().yellow()
    );
    Ok(())
}

pub fn handle_publish(submission: &SubmissionArgs) -> Result<()> {
    let request = build_request(submission)?;
    let service = build_service(AppConfig::from_env())?;

    let runtime = tokio::runtime::Runtime::new()?;
    let receipt = runtime.block_on(service.publish(&request))?;

    println!("{} {}", "published:".green().bold(), receipt.report_key);
    println!("  archive: {}", receipt.archive_key);
    if let Some(url) = &receipt.report_url {
        println!("  url:     {}", url.cyan());
    }
    println!("  state:   {}", receipt.state_key);
    println!(
        "  lines:   {} new, {} already published",
        receipt.stats.added_lines, receipt.stats.duplicate_lines
    );
    println!("  notified {} recipient(s)", receipt.notified);
    Ok(())
}

pub fn handle_schedule(input: &Path) -> Result<()> {
    let text = read_input(input)?;
    let entries = parsing::parse_schedule(&text);

    for entry in &entries {
        println!(
            "{} ({})  対 {}  {} / {}",
            entry.name.bold(),
            entry.event,
            entry.opponent,
            entry.time.cyan(),
            entry.court
        );
    }
    println!(
        "{} entries, {} players",
        entries.len(),
        parsing::active_players(&entries).len()
    );
    Ok(())
}

pub fn handle_completions(shell: clap_complete::Shell) -> Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
    Ok(())
}

fn build_service(config: AppConfig) -> Result<PublishService<StoreBackend, NotifierBackend>> {
    let store = StoreBackend::from_config(&config)?;
    let notifier = NotifierBackend::from_config(&config)?;
    Ok(PublishService::new(config, store, notifier))
}

fn build_request(submission: &SubmissionArgs) -> Result<PublishRequest> {
    let raw = read_input(&submission.input)?;
    let schedule = submission
        .schedule
        .as_deref()
        .map(read_input)
        .transpose()?;

    let mut request = PublishRequest::today(&submission.tag, submission.mode, &raw);
    request.title = submission.title.clone();
    request.schedule = schedule;
    Ok(request)
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
