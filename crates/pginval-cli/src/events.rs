use pginval::{
    EventExtractor, ExtractOutcome, InvalidationEvent, PgQueryParser, TableEventDetails,
    get_table_events,
};
use serde::Serialize;

use crate::cli::RunArgs;
use crate::config::{OutputFormat, Settings};
use crate::input::read_sources;
use crate::output::{or_dash, print_json, table};

/// Extractor configured from the resolved settings.
pub fn extractor(settings: &Settings) -> EventExtractor<PgQueryParser> {
    EventExtractor::new(PgQueryParser).default_schema(settings.default_schema.clone())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SourceEvents<'a> {
    source: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_error: Option<String>,
    events: Vec<InvalidationEvent>,
}

#[derive(Debug, Serialize)]
struct SourceTelemetry<'a> {
    source: &'a str,
    events: Vec<TableEventDetails>,
}

pub fn run(args: RunArgs) -> anyhow::Result<()> {
    let settings = Settings::load(&args)?;
    if args.telemetry {
        return run_telemetry(&args, &settings);
    }

    let project_ref = settings.require_project_ref()?;
    let sources = read_sources(&args.files)?;
    let extractor = extractor(&settings);

    let results: Vec<SourceEvents<'_>> = sources
        .iter()
        .map(|source| match extractor.extract(&source.sql, project_ref) {
            ExtractOutcome::Events(events) => SourceEvents {
                source: &source.name,
                parse_error: None,
                events,
            },
            ExtractOutcome::ParseFailed(e) => SourceEvents {
                source: &source.name,
                parse_error: Some(e),
                events: Vec::new(),
            },
        })
        .collect();

    match settings.format {
        OutputFormat::Json => print_json(&results)?,
        OutputFormat::Table => {
            let mut t = table(&["Source", "Entity", "Schema", "Name"]);
            for result in &results {
                for e in &result.events {
                    t.add_row(vec![
                        result.source.to_string(),
                        format!("{:?}", e.entity_type()).to_lowercase(),
                        or_dash(e.event.schema.as_deref()).to_string(),
                        or_dash(e.event.entity_name.as_deref()).to_string(),
                    ]);
                }
            }
            println!("{t}");
        }
    }

    fail_on_parse_errors(results.iter().filter_map(|r| {
        r.parse_error.as_deref().map(|e| (r.source, e))
    }))
}

fn run_telemetry(args: &RunArgs, settings: &Settings) -> anyhow::Result<()> {
    let sources = read_sources(&args.files)?;
    let results: Vec<SourceTelemetry<'_>> = sources
        .iter()
        .map(|source| SourceTelemetry {
            source: &source.name,
            events: get_table_events(&source.sql),
        })
        .collect();

    match settings.format {
        OutputFormat::Json => print_json(&results),
        OutputFormat::Table => {
            let mut t = table(&["Source", "Action", "Schema", "Table"]);
            for result in &results {
                for e in &result.events {
                    t.add_row(vec![
                        result.source.to_string(),
                        format!("{:?}", e.action),
                        or_dash(e.schema.as_deref()).to_string(),
                        or_dash(e.table_name.as_deref()).to_string(),
                    ]);
                }
            }
            println!("{t}");
            Ok(())
        }
    }
}

/// Report every parse failure on stderr, then fail if there was any.
pub fn fail_on_parse_errors<'a>(
    failures: impl Iterator<Item = (&'a str, &'a str)>,
) -> anyhow::Result<()> {
    let mut count = 0;
    for (source, error) in failures {
        eprintln!("{source}: {error}");
        count += 1;
    }
    if count > 0 {
        anyhow::bail!("{count} input(s) could not be parsed");
    }
    Ok(())
}
