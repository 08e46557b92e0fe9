//! Statement building.
//!
//! [`StatementBuilder`] is the entry point: it owns one [`Dialect`] and one
//! immutable [`StatementOptions`] and turns a request into SQL text. Every
//! verb follows the same skeleton:
//!
//! 1. validate the request (table name, fields, sizes, hints)
//! 2. resolve the field subsets (insertable, updatable, qualifiers, keys)
//! 3. render through [`QueryBuilder`](crate::QueryBuilder) or the dialect hook
//!
//! Errors are raised before any text is produced. A successful build emits a
//! `debug` event on the `stmtkit.sql` target.
//!
//! # Example
//! ```ignore
//! use stmtkit::{FieldSet, OrderField, StatementBuilder, BatchQueryRequest};
//!
//! let builder = StatementBuilder::mysql();
//! let fields = FieldSet::parse(["Id", "Name"])?;
//! let order = [OrderField::asc("Id")?];
//! let sql = builder.create_batch_query(&BatchQueryRequest::new("Table", &fields, 3, 10, &order))?;
//! assert_eq!(sql, "SELECT `Id`, `Name` FROM `Table` ORDER BY `Id` ASC LIMIT 30, 10;");
//! ```

use std::fmt;

use crate::dialect::Dialect;
use crate::error::StatementResult;
use crate::setting::{DbSetting, StatementOptions};

mod delete;
mod insert;
mod merge;
pub mod request;
pub(crate) mod resolve;
pub(crate) mod select;
mod update;

#[cfg(test)]
mod tests;

pub use request::{
    AggregateRequest, BatchQueryRequest, FilterRequest, InsertRequest, MergeRequest, QueryRequest,
    SkipQueryRequest, UpdateRequest,
};

/// The verb a statement was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Query,
    BatchQuery,
    SkipQuery,
    Count,
    CountAll,
    Exists,
    Max,
    MaxAll,
    Min,
    MinAll,
    Sum,
    SumAll,
    Average,
    AverageAll,
    Insert,
    InsertAll,
    Update,
    UpdateAll,
    Merge,
    MergeAll,
    Delete,
    DeleteAll,
    Truncate,
}

impl StatementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StatementKind::Query => "Query",
            StatementKind::BatchQuery => "BatchQuery",
            StatementKind::SkipQuery => "SkipQuery",
            StatementKind::Count => "Count",
            StatementKind::CountAll => "CountAll",
            StatementKind::Exists => "Exists",
            StatementKind::Max => "Max",
            StatementKind::MaxAll => "MaxAll",
            StatementKind::Min => "Min",
            StatementKind::MinAll => "MinAll",
            StatementKind::Sum => "Sum",
            StatementKind::SumAll => "SumAll",
            StatementKind::Average => "Average",
            StatementKind::AverageAll => "AverageAll",
            StatementKind::Insert => "Insert",
            StatementKind::InsertAll => "InsertAll",
            StatementKind::Update => "Update",
            StatementKind::UpdateAll => "UpdateAll",
            StatementKind::Merge => "Merge",
            StatementKind::MergeAll => "MergeAll",
            StatementKind::Delete => "Delete",
            StatementKind::DeleteAll => "DeleteAll",
            StatementKind::Truncate => "Truncate",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds SQL text for one dialect.
///
/// The builder holds no per-call state; one instance can be shared across
/// threads and produces byte-identical output for identical requests.
#[derive(Debug, Clone)]
pub struct StatementBuilder {
    dialect: Dialect,
    options: StatementOptions,
}

impl StatementBuilder {
    /// Create a builder with default options.
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            options: StatementOptions::default(),
        }
    }

    /// Builder for Microsoft SQL Server.
    pub fn sql_server() -> Self {
        Self::new(Dialect::sql_server())
    }

    /// Builder for PostgreSQL.
    pub fn postgres() -> Self {
        Self::new(Dialect::postgres())
    }

    /// Builder for MySQL and MariaDB.
    pub fn mysql() -> Self {
        Self::new(Dialect::mysql())
    }

    /// Replace the statement options.
    pub fn with_options(mut self, options: StatementOptions) -> Self {
        self.options = options;
        self
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    pub fn options(&self) -> &StatementOptions {
        &self.options
    }

    pub fn setting(&self) -> &DbSetting {
        self.dialect.setting()
    }

    fn finish(&self, kind: StatementKind, sql: String) -> StatementResult<String> {
        tracing::debug!(
            target: "stmtkit.sql",
            dialect = self.dialect.name(),
            operation = %kind,
            sql = %sql,
            "statement built"
        );
        Ok(sql)
    }
}
