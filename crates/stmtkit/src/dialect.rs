//! Database dialects.
//!
//! A [`Dialect`] is a capability table: plain data for the fragments that
//! only differ by a keyword (row limit placement, count expression, truncate
//! suffix) and function pointers for the fragments whose shape differs
//! (paging, insert with key retrieval, upsert). The statement builder drives
//! validation and field resolution once and hands the resolved plan to the
//! dialect's hook.

use std::fmt;

use crate::field::{Field, FieldSet};
use crate::ident::Ident;
use crate::query_builder::{QueryBuilder, parameter_name};
use crate::setting::{DbSetting, StatementOptions};
use crate::statement::resolve::{InsertPlan, KeyColumn, MergePlan};
use crate::statement::select::PageRequest;

mod mysql;
mod postgres;
mod sql_server;

/// Discriminator column correlating returned keys with batch rows.
pub const ORDER_COLUMN: &str = "__RepoDb_OrderColumn";

/// Where a row limit is written in a `SELECT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLimit {
    /// `SELECT TOP (n) ..`
    Top,
    /// `.. LIMIT n`
    Limit,
}

pub(crate) type PagingFn = fn(&Dialect, &PageRequest<'_>, &StatementOptions) -> String;
pub(crate) type InsertFn = fn(&Dialect, &InsertPlan<'_>, &StatementOptions) -> String;
pub(crate) type MergeFn = fn(&Dialect, &MergePlan<'_>, &StatementOptions) -> String;

#[derive(Clone, Copy)]
pub(crate) struct DialectHooks {
    pub paging: PagingFn,
    pub insert: InsertFn,
    pub merge: MergeFn,
}

/// SQL flavor of one database engine.
#[derive(Clone)]
pub struct Dialect {
    name: &'static str,
    setting: DbSetting,
    row_limit: RowLimit,
    count_expression: &'static str,
    truncate_suffix: Option<&'static str>,
    hooks: DialectHooks,
}

impl Dialect {
    /// Microsoft SQL Server.
    pub fn sql_server() -> Self {
        sql_server::dialect()
    }

    /// PostgreSQL.
    pub fn postgres() -> Self {
        postgres::dialect()
    }

    /// MySQL and MariaDB.
    pub fn mysql() -> Self {
        mysql::dialect()
    }

    /// Replace the engine settings, keeping the dialect's rendering.
    pub fn with_setting(mut self, setting: DbSetting) -> Self {
        self.setting = setting;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn setting(&self) -> &DbSetting {
        &self.setting
    }

    pub fn row_limit(&self) -> RowLimit {
        self.row_limit
    }

    pub(crate) fn count_expression(&self) -> &'static str {
        self.count_expression
    }

    pub(crate) fn truncate_suffix(&self) -> Option<&'static str> {
        self.truncate_suffix
    }

    pub(crate) fn hooks(&self) -> DialectHooks {
        self.hooks
    }
}

impl fmt::Debug for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dialect")
            .field("name", &self.name)
            .field("setting", &self.setting)
            .field("row_limit", &self.row_limit)
            .finish_non_exhaustive()
    }
}

// ==================== Shared fragments ====================

/// `INSERT INTO tbl [hints] [(cols)]`
fn insert_into(
    qb: &mut QueryBuilder,
    table: &Ident,
    hints: Option<&str>,
    columns: &FieldSet,
    setting: &DbSetting,
) {
    qb.insert().into_().table_name_from(table, setting).hints_from(hints);
    if !columns.is_empty() {
        qb.open_paren().fields_from(columns, setting).close_paren();
    }
}

/// `VALUES (@a, @b)` for one batch row.
fn values_row(qb: &mut QueryBuilder, columns: &FieldSet, index: usize, setting: &DbSetting) {
    qb.values()
        .open_paren()
        .parameters_from(columns, index, setting)
        .close_paren();
}

/// `(@a, @b[, n])` source row of a `MERGE .. USING (VALUES ..)`.
fn source_row(
    qb: &mut QueryBuilder,
    columns: &FieldSet,
    index: usize,
    with_order: bool,
    setting: &DbSetting,
) {
    qb.open_paren().parameters_from(columns, index, setting);
    if with_order {
        qb.comma().write_text(&index.to_string());
    }
    qb.close_paren();
}

/// `Q(k) = @k` style pairs joined by `, `.
fn assignments<'a>(
    fields: impl IntoIterator<Item = &'a Field>,
    mut render: impl FnMut(&Field) -> String,
) -> String {
    fields
        .into_iter()
        .map(|f| render(f))
        .collect::<Vec<_>>()
        .join(", ")
}

/// The parameter holding a supplied key for batch row `index`.
fn key_parameter(key: &KeyColumn, index: usize, setting: &DbSetting) -> String {
    parameter_name(key.field.name(), index, setting)
}
