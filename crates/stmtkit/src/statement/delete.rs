//! Delete and truncate statements.

use super::request::FilterRequest;
use super::resolve::{check_filter, check_hints, table_name};
use super::{StatementBuilder, StatementKind};
use crate::error::StatementResult;
use crate::query_builder::QueryBuilder;

impl StatementBuilder {
    /// `DELETE FROM tbl [hints] [WHERE ..]`.
    pub fn create_delete(&self, request: &FilterRequest<'_>) -> StatementResult<String> {
        let sql = self.delete_from(request)?;
        self.finish(StatementKind::Delete, sql)
    }

    /// `DELETE FROM tbl [hints]` without a filter.
    pub fn create_delete_all(&self, table: &str, hints: Option<&str>) -> StatementResult<String> {
        let request = FilterRequest {
            table,
            filter: None,
            hints,
        };
        let sql = self.delete_from(&request)?;
        self.finish(StatementKind::DeleteAll, sql)
    }

    /// `TRUNCATE TABLE tbl`.
    pub fn create_truncate(&self, table: &str) -> StatementResult<String> {
        let table = table_name(table)?;
        let setting = self.dialect.setting();

        let mut qb = QueryBuilder::new();
        qb.write_text("TRUNCATE TABLE").table_name_from(&table, setting);
        if let Some(suffix) = self.dialect.truncate_suffix() {
            qb.write_text(suffix);
        }
        qb.end();

        self.finish(StatementKind::Truncate, qb.build())
    }

    fn delete_from(&self, request: &FilterRequest<'_>) -> StatementResult<String> {
        let table = table_name(request.table)?;
        check_hints(&self.dialect, request.hints)?;
        let setting = self.dialect.setting();
        check_filter(setting, request.filter, "", 0)?;

        let mut qb = QueryBuilder::new();
        qb.delete()
            .from()
            .table_name_from(&table, setting)
            .hints_from(request.hints)
            .where_from(request.filter, setting, self.options.null_semantics, "")
            .end();
        Ok(qb.build())
    }
}
