//! Helpers for logging SQL text.

use std::borrow::Cow;

/// Default number of bytes of SQL kept in log events.
pub const DEFAULT_MAX_LOGGED_SQL: usize = 200;

fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// Shorten `sql` for a log event. `None` disables truncation.
pub fn truncate_sql(sql: &str, max_bytes: Option<usize>) -> Cow<'_, str> {
    match max_bytes {
        Some(max) if sql.len() > max => Cow::Owned(format!("{}...", truncate_sql_bytes(sql, max))),
        _ => Cow::Borrowed(sql),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_sql() {
        assert_eq!(truncate_sql("SELECT * FROM users", Some(10)), "SELECT * F...");
        assert_eq!(truncate_sql("SELECT 1", Some(10)), "SELECT 1");
        assert_eq!(truncate_sql("SELECT 1", None), "SELECT 1");
        // "é" is two bytes; never cut inside it.
        assert_eq!(truncate_sql("éé", Some(3)), "é...");
    }
}
