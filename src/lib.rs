pub mod cli;
pub mod config;
pub mod crm;
pub mod display;
pub mod logging;
pub mod query;

use crate::crm::{ContactHandler, InMemoryRepository, LoggingGateway};
use crate::display::{
    format_counts_text, format_parsed_text, format_predicates_text, format_records_text,
};
use crate::query::{
    ParsedQuery, SearchSession, TranslateOptions, highlight, print_search_warnings, render_ansi,
    render_html, serialize, translate,
};
use anyhow::Context;
use chrono::{DateTime, Utc};
pub use cli::{ColorMode, Commands, OutputFormat, cli_parse};
pub use config::{SearchConfig, load_config};
use serde::Serialize;
use std::io::Read;

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

fn read_input(path: Option<&std::path::Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read '{}'", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn parse_timestamp(raw: &str) -> anyhow::Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("Invalid --modified-since timestamp '{raw}'"))?;
    Ok(parsed.with_timezone(&Utc))
}

pub fn run() -> anyhow::Result<()> {
    let cli = cli_parse();
    logging::init(cli.verbose);

    let config = load_config(cli.config.as_deref()).context("Failed to load config")?;
    let fields = &config.fields;
    let format = cli.format;

    match cli.color {
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Auto => {}
    }

    tracing::info!(profile = %config.profile_name, "config loaded");

    match &cli.command {
        Commands::Parse { query } => {
            let parsed = ParsedQuery::parse_with_fields(query, fields);
            match format {
                OutputFormat::Text => {
                    print_search_warnings(&parsed, fields);
                    print!("{}", format_parsed_text(&parsed));
                }
                OutputFormat::Json => print_json(&parsed)?,
            }
        }
        Commands::Serialize { file } => {
            let raw = read_input(file.as_deref())?;
            let parsed: ParsedQuery =
                serde_json::from_str(&raw).context("Invalid parsed query JSON")?;
            println!("{}", serialize(&parsed));
        }
        Commands::Highlight { query, html } => {
            if *html {
                println!("{}", render_html(query, fields));
            } else {
                let parsed = ParsedQuery::parse_with_fields(query, fields);
                let segments = highlight(&parsed, fields);
                match format {
                    OutputFormat::Text => println!("{}", render_ansi(&segments)),
                    OutputFormat::Json => print_json(&segments)?,
                }
            }
        }
        Commands::Translate { query, strict } => {
            let parsed = ParsedQuery::parse_with_fields(query, fields);
            let translation = translate(&parsed, fields, TranslateOptions { strict: *strict })
                .context("Query rejected")?;
            match format {
                OutputFormat::Text => print!(
                    "{}",
                    format_predicates_text(&translation.predicates, &translation.ignored)
                ),
                OutputFormat::Json => print_json(&translation)?,
            }
        }
        Commands::ToggleActive { query, active } => {
            let mut session =
                SearchSession::new(query).with_min_submit_chars(config.min_submit_chars);
            let action = session.toggle_active(*active);
            tracing::debug!(?action, "toggle submitted");
            match format {
                OutputFormat::Text => {
                    println!("{}", session.search_string);
                    println!("{}", action.as_str());
                }
                OutputFormat::Json => print_json(&serde_json::json!({
                    "searchString": session.search_string,
                    "activeOnly": session.active_only,
                    "action": action.as_str(),
                }))?,
            }
        }
        Commands::Search {
            query,
            records,
            modified_since,
            strict,
            export,
        } => {
            let modified_since = modified_since.as_deref().map(parse_timestamp).transpose()?;
            let repository = InMemoryRepository::load(records)?;
            let handler = ContactHandler::new(repository, LoggingGateway::new(), fields.clone())
                .strict(*strict);

            if *export {
                handler
                    .export(query, modified_since, std::io::stdout().lock())
                    .context("Export failed")?;
                return Ok(());
            }

            let response = handler
                .index(query, modified_since)
                .context("Search failed")?;

            match format {
                OutputFormat::Text => {
                    print_search_warnings(&response.query, fields);
                    print!("{}", format_records_text(&response.records));
                }
                OutputFormat::Json => print_json(&response)?,
            }
        }
        Commands::Count {
            records,
            group_by,
            assignee,
        } => {
            let repository = InMemoryRepository::load(records)?;
            let handler = ContactHandler::new(repository, LoggingGateway::new(), fields.clone());
            let counts = handler
                .count(group_by, assignee.as_deref())
                .context("Count failed")?;

            match format {
                OutputFormat::Text => print!("{}", format_counts_text(group_by, &counts)),
                OutputFormat::Json => print_json(&counts)?,
            }
        }
        Commands::Fields => match format {
            OutputFormat::Text => {
                for keyword in fields.picker_keywords() {
                    println!("{keyword}");
                }
            }
            OutputFormat::Json => print_json(&fields.picker_keywords())?,
        },
    }

    Ok(())
}
