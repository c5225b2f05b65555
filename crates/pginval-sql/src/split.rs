//! Comment stripping and statement splitting.
//!
//! Both functions run in time linear in the input length. The splitter is an
//! explicit single-pass scanner; the comment stripper relies on the `regex`
//! crate, whose matching is guaranteed linear (no backtracking).

use std::sync::OnceLock;

/// Remove `-- ...` line comments and `/* ... */` block comments.
///
/// Line comments are dropped up to (not including) the newline. Block comments
/// are replaced by a single space so the tokens around them stay separate. An
/// unterminated `/*` is left as is.
///
/// Comment markers inside string or dollar-quoted literals are stripped too;
/// this pass does not know about quoting.
///
/// # Example
/// ```
/// use pginval_sql::remove_comments;
///
/// assert_eq!(remove_comments("SELECT 1; -- trailing"), "SELECT 1; ");
/// assert_eq!(remove_comments("INSERT/* x */INTO t"), "INSERT INTO t");
/// ```
pub fn remove_comments(sql: &str) -> String {
    static COMMENT_RE: OnceLock<regex::Regex> = OnceLock::new();
    let re = COMMENT_RE.get_or_init(|| {
        regex::Regex::new(r"--[^\n]*|/\*(?s:.*?)\*/").expect("invalid built-in comment regex")
    });

    re.replace_all(sql, |caps: &regex::Captures<'_>| {
        if caps[0].starts_with("--") { "" } else { " " }
    })
    .into_owned()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Free,
    SingleQuote,
    DoubleQuote,
    /// Inside `$tag$ ... $tag$`; the tag (delimiters included) spans `start..end`.
    DollarQuote { start: usize, end: usize },
}

/// Split a script into statements on semicolons outside quoted regions.
///
/// Opaque regions are single-quoted strings (`''` escapes), double-quoted
/// identifiers (`""` escapes) and dollar-quoted blocks (`$tag$...$tag$`, tag may
/// be empty). An unterminated region runs to the end of the input. Statements
/// are trimmed and empty ones dropped.
///
/// # Example
/// ```
/// use pginval_sql::split_statements;
///
/// let stmts = split_statements("SELECT ';'; CREATE FUNCTION f() AS $$ a; b $$;");
/// assert_eq!(stmts, vec!["SELECT ';'", "CREATE FUNCTION f() AS $$ a; b $$"]);
/// ```
pub fn split_statements(sql: &str) -> Vec<&str> {
    let bytes = sql.as_bytes();
    let len = bytes.len();
    let mut statements = Vec::new();
    let mut state = ScanState::Free;
    let mut start = 0;
    let mut i = 0;

    while i < len {
        match state {
            ScanState::Free => match bytes[i] {
                b'\'' => state = ScanState::SingleQuote,
                b'"' => state = ScanState::DoubleQuote,
                b'$' => {
                    if let Some(end) = dollar_tag_end(bytes, i) {
                        state = ScanState::DollarQuote { start: i, end };
                        i = end;
                        continue;
                    }
                }
                b';' => {
                    push_trimmed(&mut statements, &sql[start..i]);
                    start = i + 1;
                }
                _ => {}
            },
            ScanState::SingleQuote | ScanState::DoubleQuote => {
                let quote = if state == ScanState::SingleQuote {
                    b'\''
                } else {
                    b'"'
                };
                if bytes[i] == quote {
                    if i + 1 < len && bytes[i + 1] == quote {
                        // Doubled quote: escaped, stay inside.
                        i += 2;
                        continue;
                    }
                    state = ScanState::Free;
                }
            }
            ScanState::DollarQuote { start: tag_start, end: tag_end } => {
                let tag = &sql[tag_start..tag_end];
                match sql[i..].find(tag) {
                    Some(offset) => {
                        i += offset + tag.len();
                        state = ScanState::Free;
                    }
                    None => i = len,
                }
                continue;
            }
        }
        i += 1;
    }

    push_trimmed(&mut statements, &sql[start..]);
    statements
}

fn push_trimmed<'a>(statements: &mut Vec<&'a str>, stmt: &'a str) {
    let trimmed = stmt.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed);
    }
}

fn is_ident_byte(b: u8) -> bool {
    is_tag_byte(b) || b == b'$'
}

/// Letters, digits and `_`; any non-ASCII byte counts as a letter, as in Postgres.
fn is_tag_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

/// If a dollar-quote opening tag starts at `pos`, return the index just past it.
///
/// `$1` (positional parameter) and `$` continuing an identifier (`a$b`) are not tags.
/// Tags may contain non-ASCII letters (`$é$`).
fn dollar_tag_end(bytes: &[u8], pos: usize) -> Option<usize> {
    if pos > 0 && is_ident_byte(bytes[pos - 1]) {
        return None;
    }

    let mut j = pos + 1;
    if j < bytes.len() && (bytes[j].is_ascii_digit() || !(is_tag_byte(bytes[j]) || bytes[j] == b'$'))
    {
        return None;
    }
    while j < bytes.len() && is_tag_byte(bytes[j]) {
        j += 1;
    }

    (j < bytes.len() && bytes[j] == b'$').then_some(j + 1)
}
