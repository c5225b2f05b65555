//! Lightweight table-event detection for telemetry.
//!
//! Each statement is matched against an ordered list of detectors; the first
//! matching pattern decides the action and yields the schema/table captures.
//! All patterns are compiled with the `regex` crate, so matching time is linear
//! in the statement length whatever the input looks like.
//!
//! This path does not parse SQL. Statement text is scanned as-is, so a
//! `CREATE TABLE` written inside a literal of another statement is still
//! reported. Identifiers are ASCII-only (`[A-Za-z0-9_]` plus quote characters).

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::split::{remove_comments, split_statements};

/// Telemetry action detected for a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableEventAction {
    TableCreated,
    TableDataAdded,
    #[serde(rename = "table_rls_enabled")]
    TableRlsEnabled,
}

/// One detected table event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableEventDetails {
    #[serde(rename = "type")]
    pub action: TableEventAction,
    pub schema: Option<String>,
    pub table_name: Option<String>,
}

// ASCII mode keeps `(?i)` from folding `k`/`s` into U+212A and U+017F.
const IDENT: &str = r#"(?-u:[A-Za-z0-9_"`'])+"#;
const TABLE_MODIFIERS: &str = r"(?:(?:GLOBAL|LOCAL)\s+)?(?:(?:TEMPORARY|TEMP|UNLOGGED)\s+)?";

fn qualified() -> String {
    format!(r"(?:(?P<schema>{IDENT})\.)?(?P<table>{IDENT})")
}

struct Detector {
    action: TableEventAction,
    patterns: Vec<Regex>,
}

fn detectors() -> &'static [Detector] {
    static DETECTORS: OnceLock<Vec<Detector>> = OnceLock::new();
    DETECTORS.get_or_init(|| {
        let name = qualified();
        let compile = |pattern: String| {
            Regex::new(&format!("(?i){pattern}")).expect("invalid built-in table event regex")
        };

        vec![
            Detector {
                action: TableEventAction::TableCreated,
                patterns: vec![
                    compile(format!(
                        r"\bCREATE\s+{TABLE_MODIFIERS}TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?{name}"
                    )),
                    compile(format!(r"(?s)\bSELECT\b.*?\bINTO\s+{name}")),
                    compile(format!(
                        r"\bCREATE\s+{TABLE_MODIFIERS}TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?{name}\s+AS\s+SELECT\b"
                    )),
                ],
            },
            Detector {
                action: TableEventAction::TableDataAdded,
                patterns: vec![
                    compile(format!(r"\bINSERT\s+INTO\s+{name}")),
                    compile(format!(r"\bCOPY\s+{name}(?:\s*\([^)]*\))?\s+FROM\b")),
                ],
            },
            Detector {
                action: TableEventAction::TableRlsEnabled,
                patterns: vec![compile(format!(
                    r"(?s)\bALTER\s+TABLE\s+(?:IF\s+EXISTS\s+)?(?:ONLY\s+)?{name}\s.*?\bENABLE\s+(?:ROW\s+LEVEL\s+SECURITY|RLS)\b"
                ))],
            },
        ]
    })
}

/// Strip quote characters and a trailing `.` from a captured identifier.
///
/// `"user""table"` becomes `usertable`: quotes are dropped, not unescaped.
fn clean_identifier(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '"' | '`' | '\''))
        .collect();
    let cleaned = cleaned.trim_end_matches('.');
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

fn match_statement(stmt: &str) -> Option<TableEventDetails> {
    for detector in detectors() {
        for re in &detector.patterns {
            let Some(caps) = re.captures(stmt) else {
                continue;
            };
            let Some(table_name) = caps.name("table").and_then(|m| clean_identifier(m.as_str()))
            else {
                continue;
            };
            return Some(TableEventDetails {
                action: detector.action,
                schema: caps.name("schema").and_then(|m| clean_identifier(m.as_str())),
                table_name: Some(table_name),
            });
        }
    }
    None
}

/// Detect table-level telemetry events in a SQL script.
///
/// Comments are stripped, the script is split into statements, and each
/// statement yields at most one event. Duplicates of `(action, schema, table)`
/// are dropped, keeping first-seen order.
///
/// # Example
/// ```
/// use pginval_sql::{get_table_events, TableEventAction};
///
/// let events = get_table_events("CREATE TABLE public.users (id INT); COPY users TO '/tmp/x'");
/// assert_eq!(events.len(), 1);
/// assert_eq!(events[0].action, TableEventAction::TableCreated);
/// assert_eq!(events[0].schema.as_deref(), Some("public"));
/// assert_eq!(events[0].table_name.as_deref(), Some("users"));
/// ```
pub fn get_table_events(sql: &str) -> Vec<TableEventDetails> {
    let stripped = remove_comments(sql);

    let mut seen: HashSet<(TableEventAction, Option<String>, Option<String>)> = HashSet::new();
    let mut events = Vec::new();
    for stmt in split_statements(&stripped) {
        let Some(event) = match_statement(stmt) else {
            continue;
        };
        let key = (event.action, event.schema.clone(), event.table_name.clone());
        if seen.insert(key) {
            events.push(event);
        }
    }
    events
}
