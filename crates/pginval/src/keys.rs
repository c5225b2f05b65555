//! Query-key layout of the client cache.
//!
//! Keys are hierarchical: project, resource kind, then optional schema and
//! entity. Invalidating a key without `exact` also hits every key nested
//! under it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Resource kind for table lists and single tables.
pub const TABLES: &str = "tables";
/// Resource kind for entity-type metadata (autocomplete, diagrams).
pub const ENTITY_TYPES: &str = "entity-types";
/// Resource kind for the database functions list.
pub const DATABASE_FUNCTIONS: &str = "database-functions";
/// Resource kind for the cron jobs list.
pub const CRON_JOBS: &str = "cron-jobs";

/// One opaque key segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeySegment {
    Text(String),
    Flag(bool),
}

impl From<&str> for KeySegment {
    fn from(s: &str) -> Self {
        KeySegment::Text(s.to_string())
    }
}

impl From<String> for KeySegment {
    fn from(s: String) -> Self {
        KeySegment::Text(s)
    }
}

impl From<bool> for KeySegment {
    fn from(b: bool) -> Self {
        KeySegment::Flag(b)
    }
}

impl fmt::Display for KeySegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySegment::Text(s) => write!(f, "{s:?}"),
            KeySegment::Flag(b) => write!(f, "{b}"),
        }
    }
}

/// A cache key: a path of [`KeySegment`]s.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryKey(Vec<KeySegment>);

impl QueryKey {
    pub fn new(segments: Vec<KeySegment>) -> Self {
        Self(segments)
    }

    pub fn segments(&self) -> &[KeySegment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a segment.
    pub fn push(mut self, segment: impl Into<KeySegment>) -> Self {
        self.0.push(segment.into());
        self
    }

    /// `true` if invalidating `self` with the given exactness hits `candidate`.
    ///
    /// Exact matches only the identical key; otherwise any key that starts with
    /// `self` matches.
    pub fn matches(&self, candidate: &QueryKey, exact: bool) -> bool {
        if exact {
            self == candidate
        } else {
            candidate.0.starts_with(&self.0)
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{segment}")?;
        }
        f.write_str("]")
    }
}

fn project(project_ref: &str) -> QueryKey {
    QueryKey::default().push(project_ref)
}

/// `[project, "tables"]`: every table query of the project.
pub fn tables(project_ref: &str) -> QueryKey {
    project(project_ref).push(TABLES)
}

/// `[project, "tables", schema, include_views]`: the table list of one schema.
pub fn table_list(project_ref: &str, schema: &str, include_views: bool) -> QueryKey {
    tables(project_ref).push(schema).push(include_views)
}

/// `[project, "tables", schema, table]`: a single table.
pub fn table(project_ref: &str, schema: &str, table: &str) -> QueryKey {
    tables(project_ref).push(schema).push(table)
}

/// `[project, "entity-types"]`.
pub fn entity_types(project_ref: &str) -> QueryKey {
    project(project_ref).push(ENTITY_TYPES)
}

/// `[project, "database-functions"]`.
pub fn database_functions(project_ref: &str) -> QueryKey {
    project(project_ref).push(DATABASE_FUNCTIONS)
}

/// `[project, "cron-jobs"]`.
pub fn cron_jobs(project_ref: &str) -> QueryKey {
    project(project_ref).push(CRON_JOBS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        assert_eq!(
            table_list("p", "public", true).segments(),
            &[
                KeySegment::from("p"),
                KeySegment::from("tables"),
                KeySegment::from("public"),
                KeySegment::Flag(true),
            ]
        );
        assert_eq!(table("p", "public", "users").to_string(), r#"["p", "tables", "public", "users"]"#);
        assert_eq!(cron_jobs("p").len(), 2);
    }

    #[test]
    fn test_exact_and_prefix_matching() {
        let broad = tables("p");
        let list = table_list("p", "public", false);
        let single = table("p", "public", "users");

        assert!(broad.matches(&list, false));
        assert!(broad.matches(&single, false));
        assert!(!broad.matches(&list, true));
        assert!(list.matches(&list, true));
        assert!(!list.matches(&single, false));
        assert!(!tables("other").matches(&single, false));
        assert!(!entity_types("p").matches(&single, false));
    }

    #[test]
    fn test_key_serializes_as_array() {
        let json = serde_json::to_value(table_list("p", "auth", false)).unwrap();
        assert_eq!(json, serde_json::json!(["p", "tables", "auth", false]));
    }
}
