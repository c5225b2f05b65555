use pginval_sql::{TableEventAction, TableEventDetails, get_table_events};
use std::time::{Duration, Instant};

fn event(action: TableEventAction, schema: Option<&str>, table: &str) -> TableEventDetails {
    TableEventDetails {
        action,
        schema: schema.map(str::to_string),
        table_name: Some(table.to_string()),
    }
}

fn single(sql: &str) -> TableEventDetails {
    let mut results = get_table_events(sql);
    assert_eq!(results.len(), 1, "expected one event for {sql:?}: {results:?}");
    results.remove(0)
}

/// Run `get_table_events` under a wall-clock budget.
fn timed(sql: &str) -> Vec<TableEventDetails> {
    // Compile the built-in patterns outside the measured window.
    get_table_events("SELECT 1");

    let start = Instant::now();
    let results = get_table_events(sql);
    let elapsed = start.elapsed();
    assert!(
        elapsed < Duration::from_millis(100),
        "classification took {elapsed:?}"
    );
    results
}

// ── CREATE TABLE ────────────────────────────────────────────────────

#[test]
fn detects_basic_create_table() {
    assert_eq!(
        single("CREATE TABLE users (id INT PRIMARY KEY)"),
        event(TableEventAction::TableCreated, None, "users")
    );
}

#[test]
fn detects_create_table_with_schema() {
    assert_eq!(
        single("CREATE TABLE public.users (id INT)"),
        event(TableEventAction::TableCreated, Some("public"), "users")
    );
}

#[test]
fn detects_create_table_if_not_exists() {
    assert_eq!(
        single("CREATE TABLE IF NOT EXISTS users (id INT)"),
        event(TableEventAction::TableCreated, None, "users")
    );
}

#[test]
fn create_table_handles_quoted_identifiers() {
    assert_eq!(
        single(r#"CREATE TABLE "public"."user_table" (id INT)"#),
        event(TableEventAction::TableCreated, Some("public"), "user_table")
    );
}

#[test]
fn detects_temporary_and_unlogged_tables() {
    for (sql, table) in [
        ("CREATE TEMPORARY TABLE temp_users (id INT)", "temp_users"),
        ("CREATE TEMP TABLE temp_users (id INT)", "temp_users"),
        ("CREATE UNLOGGED TABLE fast_table (id INT)", "fast_table"),
        ("CREATE TEMP TABLE IF NOT EXISTS temp_users (id INT)", "temp_users"),
        ("create global temporary table gt (id int)", "gt"),
    ] {
        assert_eq!(
            single(sql),
            event(TableEventAction::TableCreated, None, table),
            "{sql}"
        );
    }
}

#[test]
fn plain_select_is_not_an_event() {
    assert!(get_table_events("SELECT * FROM users").is_empty());
}

// ── INSERT / COPY ───────────────────────────────────────────────────

#[test]
fn detects_insert_into() {
    assert_eq!(
        single("INSERT INTO users (name) VALUES ('John')"),
        event(TableEventAction::TableDataAdded, None, "users")
    );
    assert_eq!(
        single("INSERT INTO public.users (name) VALUES ('John')"),
        event(TableEventAction::TableDataAdded, Some("public"), "users")
    );
    assert_eq!(
        single(r#"INSERT INTO "auth"."users" (id) VALUES (1)"#),
        event(TableEventAction::TableDataAdded, Some("auth"), "users")
    );
}

#[test]
fn update_is_not_an_event() {
    assert!(get_table_events(r#"UPDATE users SET name = "John""#).is_empty());
}

#[test]
fn detects_copy_from() {
    assert_eq!(
        single("COPY users FROM '/tmp/users.csv'"),
        event(TableEventAction::TableDataAdded, None, "users")
    );
    assert_eq!(
        single("COPY public.users FROM '/tmp/users.csv' WITH CSV HEADER"),
        event(TableEventAction::TableDataAdded, Some("public"), "users")
    );
    assert_eq!(
        single(r#"COPY "auth"."users" FROM STDIN"#),
        event(TableEventAction::TableDataAdded, Some("auth"), "users")
    );
    assert_eq!(
        single("COPY users (id, name) FROM STDIN"),
        event(TableEventAction::TableDataAdded, None, "users")
    );
}

#[test]
fn copy_to_is_an_export() {
    assert!(get_table_events("COPY users TO '/tmp/users.csv'").is_empty());
    assert!(get_table_events("COPY (SELECT * FROM users) TO STDOUT").is_empty());
}

// ── SELECT INTO / CREATE TABLE AS ───────────────────────────────────

#[test]
fn detects_select_into() {
    assert_eq!(
        single("SELECT * INTO new_users FROM users"),
        event(TableEventAction::TableCreated, None, "new_users")
    );
    assert_eq!(
        single("SELECT id, name INTO public.new_users FROM users"),
        event(TableEventAction::TableCreated, Some("public"), "new_users")
    );
    assert_eq!(
        single(r#"SELECT * INTO "backup"."users_2024" FROM users"#),
        event(TableEventAction::TableCreated, Some("backup"), "users_2024")
    );
}

#[test]
fn detects_create_table_as_select() {
    assert_eq!(
        single("CREATE TABLE new_users AS SELECT * FROM users"),
        event(TableEventAction::TableCreated, None, "new_users")
    );
    assert_eq!(
        single("CREATE TABLE IF NOT EXISTS new_users AS SELECT * FROM users WHERE active = true"),
        event(TableEventAction::TableCreated, None, "new_users")
    );
}

// ── RLS ─────────────────────────────────────────────────────────────

#[test]
fn detects_enable_row_level_security() {
    assert_eq!(
        single("ALTER TABLE users ENABLE ROW LEVEL SECURITY"),
        event(TableEventAction::TableRlsEnabled, None, "users")
    );
    assert_eq!(
        single("ALTER TABLE users ENABLE RLS"),
        event(TableEventAction::TableRlsEnabled, None, "users")
    );
    assert_eq!(
        single("ALTER TABLE public.users ENABLE ROW LEVEL SECURITY"),
        event(TableEventAction::TableRlsEnabled, Some("public"), "users")
    );
}

#[test]
fn rls_tolerates_other_alter_clauses() {
    assert_eq!(
        single("ALTER TABLE users ADD COLUMN test INT, ENABLE ROW LEVEL SECURITY"),
        event(TableEventAction::TableRlsEnabled, None, "users")
    );
}

#[test]
fn disable_rls_is_not_an_event() {
    assert!(get_table_events("ALTER TABLE users DISABLE ROW LEVEL SECURITY").is_empty());
}

// ── Linear-time guarantees ──────────────────────────────────────────

#[test]
fn long_identifier_is_fast() {
    let long_identifier = "a".repeat(10_000);
    let results = timed(&format!("CREATE TABLE {long_identifier} (id INT)"));
    assert_eq!(
        results,
        vec![event(TableEventAction::TableCreated, None, &long_identifier)]
    );
}

#[test]
fn nested_dots_are_fast() {
    let sql = format!("CREATE TABLE {}table (id INT)", "a.".repeat(1000));
    assert!(!timed(&sql).is_empty());
}

#[test]
fn many_words_before_into_are_fast() {
    let sql = format!("SELECT {}INTO table FROM users", "a ".repeat(1000));
    assert_eq!(
        timed(&sql),
        vec![event(TableEventAction::TableCreated, None, "table")]
    );
}

#[test]
fn many_alter_operations_are_fast() {
    let sql = format!(
        "ALTER TABLE users {} ENABLE ROW LEVEL SECURITY",
        "ADD COLUMN test INT, ".repeat(100)
    );
    assert_eq!(
        timed(&sql),
        vec![event(TableEventAction::TableRlsEnabled, None, "users")]
    );
}

#[test]
fn mixed_quotes_and_backticks_are_fast() {
    let sql = format!("CREATE TABLE {}tablename (id INT)", "`\"`.".repeat(100));
    timed(&sql);
}

#[test]
fn many_quotes_are_fast() {
    timed(&"'".repeat(10_001));
    timed(&format!("INSERT INTO t VALUES ({})", "$".repeat(10_000)));
}

// ── Edge cases ──────────────────────────────────────────────────────

#[test]
fn unicode_identifiers_are_not_recognized() {
    assert!(get_table_events("CREATE TABLE 用户表 (id INT)").is_empty());
    assert!(get_table_events("CREATE TABLE ſ (id INT)").is_empty());
    assert!(get_table_events("CREATE TABLE \u{212A} (id INT)").is_empty());
    assert!(get_table_events("INSERT INTO \u{212A}elvin VALUES (1)").is_empty());
}

#[test]
fn identifiers_with_digits_and_underscores() {
    assert_eq!(
        single("CREATE TABLE table123 (id INT)"),
        event(TableEventAction::TableCreated, None, "table123")
    );
    assert_eq!(
        single("CREATE TABLE user_accounts (id INT)"),
        event(TableEventAction::TableCreated, None, "user_accounts")
    );
}

#[test]
fn doubled_quotes_collapse() {
    assert_eq!(
        single(r#"CREATE TABLE "user""table" (id INT)"#),
        event(TableEventAction::TableCreated, None, "usertable")
    );
}

#[test]
fn dollar_quoted_literal_content_is_still_scanned() {
    let sql = "
        CREATE TABLE users (id INT);
        INSERT INTO logs VALUES ($$CREATE TABLE fake$$);
        INSERT INTO users VALUES (1);
    ";
    assert_eq!(
        get_table_events(sql),
        vec![
            event(TableEventAction::TableCreated, None, "users"),
            event(TableEventAction::TableCreated, None, "fake"),
            event(TableEventAction::TableDataAdded, None, "users"),
        ]
    );
}

#[test]
fn injection_attempt_yields_single_event() {
    assert_eq!(
        single("CREATE TABLE users'; DROP TABLE users; -- (id INT)"),
        event(TableEventAction::TableCreated, None, "users")
    );
}

#[test]
fn only_table_events_are_reported() {
    let sql = "
        CREATE TABLE users (id INT);
        CREATE FUNCTION test() RETURNS INT AS $$ BEGIN RETURN 1; END; $$ LANGUAGE plpgsql;
        INSERT INTO users (id) VALUES (1);
        ALTER TABLE users ENABLE RLS;
        CREATE VIEW user_view AS SELECT * FROM users;
    ";
    let actions: Vec<_> = get_table_events(sql).into_iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![
            TableEventAction::TableCreated,
            TableEventAction::TableDataAdded,
            TableEventAction::TableRlsEnabled,
        ]
    );
}

#[test]
fn non_table_sql_yields_nothing() {
    let sql = "
        CREATE FUNCTION test() RETURNS INT AS $$ BEGIN RETURN 1; END; $$ LANGUAGE plpgsql;
        CREATE VIEW user_view AS SELECT * FROM users;
        SELECT * FROM users;
    ";
    assert!(get_table_events(sql).is_empty());
}

#[test]
fn classification_is_deterministic_and_deduplicated() {
    let sql = "INSERT INTO a VALUES (1); insert into a values (2); COPY a FROM STDIN; CREATE TABLE a (id INT)";
    let first = get_table_events(sql);
    assert_eq!(first, get_table_events(sql));
    assert_eq!(
        first,
        vec![
            event(TableEventAction::TableDataAdded, None, "a"),
            event(TableEventAction::TableCreated, None, "a"),
        ]
    );
}

#[test]
fn serializes_with_telemetry_names() {
    let json = serde_json::to_value(single("ALTER TABLE auth.users ENABLE RLS")).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "type": "table_rls_enabled",
            "schema": "auth",
            "tableName": "users",
        })
    );
}
