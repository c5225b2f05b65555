use comfy_table::{Cell, Color, Table};
use serde::Serialize;

const PREVIEW_CHARS: usize = 60;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(value)
        .map_err(|e| anyhow::anyhow!("failed to serialize output: {e}"))?;
    println!("{s}");
    Ok(())
}

pub fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_header(
        header
            .iter()
            .map(|h| Cell::new(h).fg(Color::Cyan))
            .collect::<Vec<_>>(),
    );
    table
}

/// One-line preview of a statement for table cells.
pub fn preview(sql: &str) -> String {
    let flat = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    pginval::sql::truncate_sql(&flat, Some(PREVIEW_CHARS)).into_owned()
}

pub fn flag(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "exact",
        Some(false) => "prefix",
        None => "-",
    }
}

pub fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}
