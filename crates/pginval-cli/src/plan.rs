use pginval::{GranularInvalidator, InvalError, InvalidationAction, LoggingCache};
use serde::Serialize;

use crate::cli::RunArgs;
use crate::config::{OutputFormat, Settings};
use crate::events::{extractor, fail_on_parse_errors};
use crate::input::read_sources;
use crate::output::{flag, print_json, table};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SourcePlan<'a> {
    source: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_error: Option<String>,
    actions: Vec<InvalidationAction>,
}

pub fn run(args: RunArgs) -> anyhow::Result<()> {
    let settings = Settings::load(&args)?;
    let project_ref = settings.require_project_ref()?;
    let sources = read_sources(&args.files)?;

    // Planning never touches the cache.
    let invalidator = GranularInvalidator::new(extractor(&settings), LoggingCache::new());

    let mut plans: Vec<SourcePlan<'_>> = Vec::with_capacity(sources.len());
    for source in &sources {
        if source.sql.trim().is_empty() {
            tracing::warn!(source = %source.name, "empty input skipped");
            continue;
        }
        let plan = match invalidator.plan(&source.sql, project_ref) {
            Ok(actions) => SourcePlan {
                source: &source.name,
                parse_error: None,
                actions,
            },
            Err(InvalError::Sql(e)) => SourcePlan {
                source: &source.name,
                parse_error: Some(e.to_string()),
                actions: Vec::new(),
            },
            Err(e) => anyhow::bail!("{}: {e}", source.name),
        };
        plans.push(plan);
    }

    match settings.format {
        OutputFormat::Json => print_json(&plans)?,
        OutputFormat::Table => {
            let mut t = table(&["Source", "Key", "Match", "Refetch"]);
            for plan in &plans {
                for action in &plan.actions {
                    t.add_row(vec![
                        plan.source.to_string(),
                        action.key.to_string(),
                        flag(action.exact).to_string(),
                        refetch_label(action),
                    ]);
                }
            }
            println!("{t}");
        }
    }

    fail_on_parse_errors(
        plans
            .iter()
            .filter_map(|p| p.parse_error.as_deref().map(|e| (p.source, e))),
    )
}

pub fn refetch_label(action: &InvalidationAction) -> String {
    action
        .refetch_type
        .map(|r| format!("{r:?}").to_lowercase())
        .unwrap_or_else(|| "-".to_string())
}
