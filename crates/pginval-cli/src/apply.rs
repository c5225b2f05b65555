use pginval::{GranularInvalidator, InvalidationReport, InvalidationStatus, LoggingCache};
use serde::Serialize;

use crate::cli::RunArgs;
use crate::config::{OutputFormat, Settings};
use crate::events::extractor;
use crate::input::read_sources;
use crate::output::{print_json, table};

#[derive(Debug, Serialize)]
struct SourceReport<'a> {
    source: &'a str,
    #[serde(flatten)]
    report: InvalidationReport,
}

pub async fn run(args: RunArgs) -> anyhow::Result<()> {
    let settings = Settings::load(&args)?;
    let project_ref = settings.require_project_ref()?;
    let sources = read_sources(&args.files)?;

    let invalidator = GranularInvalidator::new(extractor(&settings), LoggingCache::new());

    let mut reports: Vec<SourceReport<'_>> = Vec::with_capacity(sources.len());
    for source in &sources {
        let report = invalidator.invalidate(&source.sql, project_ref).await;
        reports.push(SourceReport {
            source: &source.name,
            report,
        });
    }

    match settings.format {
        OutputFormat::Json => print_json(&reports),
        OutputFormat::Table => {
            let mut t = table(&["Source", "Status", "Actions", "Succeeded", "Failed"]);
            for r in &reports {
                t.add_row(vec![
                    r.source.to_string(),
                    status_label(&r.report.status),
                    r.report.actions.len().to_string(),
                    r.report.succeeded.to_string(),
                    r.report.failed.to_string(),
                ]);
            }
            println!("{t}");
            Ok(())
        }
    }
}

fn status_label(status: &InvalidationStatus) -> String {
    match status {
        InvalidationStatus::Applied => "applied".to_string(),
        InvalidationStatus::Skipped(reason) => format!("skipped: {reason}"),
        InvalidationStatus::ParseFailed(reason) => format!("parse failed: {reason}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_labels() {
        assert_eq!(status_label(&InvalidationStatus::Applied), "applied");
        assert_eq!(
            status_label(&InvalidationStatus::Skipped("empty SQL".to_string())),
            "skipped: empty SQL"
        );
    }
}
