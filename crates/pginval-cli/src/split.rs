use serde::Serialize;

use crate::cli::RunArgs;
use crate::config::{OutputFormat, Settings};
use crate::input::read_sources;
use crate::output::{preview, print_json, table};

#[derive(Debug, Serialize)]
struct StatementRow<'a> {
    source: &'a str,
    index: usize,
    statement: String,
}

/// Comments first, so a quote inside `-- don't` cannot open a string.
fn statements(sql: &str) -> Vec<String> {
    let stripped = pginval::remove_comments(sql);
    pginval::split_statements(&stripped)
        .into_iter()
        .map(str::to_string)
        .collect()
}

pub fn run(args: RunArgs) -> anyhow::Result<()> {
    let settings = Settings::load(&args)?;
    let sources = read_sources(&args.files)?;

    let rows: Vec<StatementRow<'_>> = sources
        .iter()
        .flat_map(|source| {
            statements(&source.sql)
                .into_iter()
                .enumerate()
                .map(move |(idx, statement)| StatementRow {
                    source: &source.name,
                    index: idx + 1,
                    statement,
                })
        })
        .collect();

    match settings.format {
        OutputFormat::Json => print_json(&rows),
        OutputFormat::Table => {
            let mut t = table(&["Source", "#", "Statement"]);
            for row in &rows {
                t.add_row(vec![
                    row.source.to_string(),
                    row.index.to_string(),
                    preview(&row.statement),
                ]);
            }
            println!("{t}");
            println!("{} statement(s)", rows.len());
            Ok(())
        }
    }
}
