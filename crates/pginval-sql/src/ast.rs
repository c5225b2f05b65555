//! Parser-independent statement tree.
//!
//! The extractor only needs a handful of node shapes, so parsers are adapted
//! into [`StatementNode`] behind the [`SqlParser`] trait. The libpg_query
//! adapter ([`PgQueryParser`]) is available with the `sql` feature; tests and
//! other callers can plug in their own implementation.

use crate::error::SqlResult;

/// A possibly schema-qualified relation name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationName {
    pub schema: Option<String>,
    pub name: String,
}

impl RelationName {
    pub fn new(schema: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.map(str::to_string),
            name: name.into(),
        }
    }
}

/// Object kind of a `DROP` statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropObjectKind {
    Table,
    Function,
    Procedure,
    Other,
}

/// One top-level statement, reduced to what event extraction looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementNode {
    /// `CREATE TABLE`.
    CreateTable { relation: Option<RelationName> },
    /// `CREATE TABLE ... AS` (tables only; materialized views are [`StatementNode::Other`]).
    CreateTableAs { relation: Option<RelationName> },
    /// `CREATE [OR REPLACE] FUNCTION | PROCEDURE`; `name` is the qualified name path.
    CreateFunction { name: Vec<String> },
    /// `DROP ...`; one qualified name per dropped object. Argument types are not kept.
    Drop {
        object_kind: DropObjectKind,
        objects: Vec<Vec<String>>,
    },
    /// `SELECT`; `calls` holds the qualified names of function calls in the target list.
    Select {
        into: Option<RelationName>,
        calls: Vec<Vec<String>>,
    },
    /// Anything else, labelled with the parser's statement kind.
    Other { kind: String },
}

impl StatementNode {
    /// Statement kind label used in log events.
    pub fn kind_name(&self) -> &str {
        match self {
            StatementNode::CreateTable { .. } => "CreateStmt",
            StatementNode::CreateTableAs { .. } => "CreateTableAsStmt",
            StatementNode::CreateFunction { .. } => "CreateFunctionStmt",
            StatementNode::Drop { .. } => "DropStmt",
            StatementNode::Select { .. } => "SelectStmt",
            StatementNode::Other { kind } => kind,
        }
    }
}

/// A SQL parser producing top-level [`StatementNode`]s.
pub trait SqlParser {
    /// Parse a whole script. Fails if any part of it is not valid SQL.
    fn parse(&self, sql: &str) -> SqlResult<Vec<StatementNode>>;
}

impl<P: SqlParser + ?Sized> SqlParser for &P {
    fn parse(&self, sql: &str) -> SqlResult<Vec<StatementNode>> {
        (**self).parse(sql)
    }
}

#[cfg(feature = "sql")]
pub use pg::PgQueryParser;

#[cfg(feature = "sql")]
mod pg {
    use super::{DropObjectKind, RelationName, SqlParser, StatementNode};
    use crate::error::{SqlError, SqlResult};
    use pg_query::NodeEnum;
    use pg_query::protobuf::{self, ObjectType};
    use std::fmt::{self, Write as _};

    /// [`SqlParser`] backed by libpg_query (the real Postgres grammar).
    #[derive(Debug, Clone, Copy, Default)]
    pub struct PgQueryParser;

    impl PgQueryParser {
        pub fn new() -> Self {
            Self
        }
    }

    impl SqlParser for PgQueryParser {
        fn parse(&self, sql: &str) -> SqlResult<Vec<StatementNode>> {
            let parsed = pg_query::parse(sql).map_err(|e| SqlError::parse(e.to_string()))?;

            Ok(parsed
                .protobuf
                .stmts
                .iter()
                .filter_map(|raw| raw.stmt.as_ref().and_then(|s| s.node.as_ref()))
                .map(convert_statement)
                .collect())
        }
    }

    fn convert_statement(node: &NodeEnum) -> StatementNode {
        match node {
            NodeEnum::CreateStmt(create) => StatementNode::CreateTable {
                relation: create.relation.as_ref().map(relation_name),
            },
            NodeEnum::CreateTableAsStmt(ctas) if ctas.objtype() == ObjectType::ObjectTable => {
                StatementNode::CreateTableAs {
                    relation: ctas
                        .into
                        .as_ref()
                        .and_then(|into| into.rel.as_ref())
                        .map(relation_name),
                }
            }
            NodeEnum::CreateFunctionStmt(func) => StatementNode::CreateFunction {
                name: string_parts(&func.funcname),
            },
            NodeEnum::DropStmt(drop) => {
                let object_kind = match drop.remove_type() {
                    ObjectType::ObjectTable => DropObjectKind::Table,
                    ObjectType::ObjectFunction => DropObjectKind::Function,
                    ObjectType::ObjectProcedure => DropObjectKind::Procedure,
                    _ => DropObjectKind::Other,
                };
                let objects = drop
                    .objects
                    .iter()
                    .map(|obj| match obj.node.as_ref() {
                        Some(NodeEnum::List(list)) => string_parts(&list.items),
                        Some(NodeEnum::ObjectWithArgs(owa)) => string_parts(&owa.objname),
                        Some(NodeEnum::String(s)) => vec![s.sval.clone()],
                        _ => Vec::new(),
                    })
                    .collect();
                StatementNode::Drop {
                    object_kind,
                    objects,
                }
            }
            NodeEnum::SelectStmt(select) => {
                let calls = select
                    .target_list
                    .iter()
                    .filter_map(|target| match target.node.as_ref() {
                        Some(NodeEnum::ResTarget(rt)) => rt.val.as_ref(),
                        _ => None,
                    })
                    .filter_map(|val| match val.node.as_ref() {
                        Some(NodeEnum::FuncCall(call)) => Some(string_parts(&call.funcname)),
                        _ => None,
                    })
                    .collect();
                StatementNode::Select {
                    into: select
                        .into_clause
                        .as_ref()
                        .and_then(|into| into.rel.as_ref())
                        .map(relation_name),
                    calls,
                }
            }
            other => StatementNode::Other {
                kind: other_kind_name(other),
            },
        }
    }

    fn relation_name(v: &protobuf::RangeVar) -> RelationName {
        RelationName {
            schema: if v.schemaname.is_empty() {
                None
            } else {
                Some(v.schemaname.clone())
            },
            name: v.relname.clone(),
        }
    }

    fn string_parts(nodes: &[protobuf::Node]) -> Vec<String> {
        nodes
            .iter()
            .filter_map(|n| match n.node.as_ref() {
                Some(NodeEnum::String(s)) => Some(s.sval.clone()),
                _ => None,
            })
            .collect()
    }

    /// Collects `Debug` output up to the first `(`, i.e. the variant name.
    struct VariantName(String);

    impl fmt::Write for VariantName {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            match s.find('(') {
                Some(end) => {
                    self.0.push_str(&s[..end]);
                    Err(fmt::Error)
                }
                None => {
                    self.0.push_str(s);
                    Ok(())
                }
            }
        }
    }

    fn other_kind_name(node: &NodeEnum) -> String {
        let mut name = VariantName(String::new());
        // Err only signals that the name is complete.
        let _ = write!(name, "{node:?}");
        name.0
    }
}
