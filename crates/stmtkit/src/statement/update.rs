//! Update statements.

use super::request::UpdateRequest;
use super::resolve::{resolve_update, resolve_update_all};
use super::{StatementBuilder, StatementKind};
use crate::error::StatementResult;
use crate::query_builder::{QueryBuilder, parameter_name};

/// WHERE parameters of an update are prefixed so they never collide with
/// the SET parameters of the same column.
const WHERE_PREFIX: &str = "_";

impl StatementBuilder {
    /// `UPDATE tbl SET .. [WHERE ..]`.
    ///
    /// Primary, identity and generated columns are never written. Filter
    /// parameters are named `@_Field`.
    pub fn create_update(&self, request: &UpdateRequest<'_>) -> StatementResult<String> {
        let plan = resolve_update(&self.dialect, request, WHERE_PREFIX)?;
        let setting = self.dialect.setting();

        let mut qb = QueryBuilder::new();
        qb.update()
            .table_name_from(&plan.table, setting)
            .hints_from(plan.hints)
            .set()
            .assignments_from(&plan.updates, 0, setting)
            .where_from(
                request.filter,
                setting,
                self.options.null_semantics,
                WHERE_PREFIX,
            )
            .end();

        self.finish(StatementKind::Update, qb.build())
    }

    /// One `UPDATE .. WHERE <qualifiers>` per batch row.
    pub fn create_update_all(&self, request: &UpdateRequest<'_>) -> StatementResult<String> {
        let plan = resolve_update_all(&self.dialect, request)?;
        let setting = self.dialect.setting();

        let mut qb = QueryBuilder::new();
        for index in 0..plan.batch_size {
            let matches = plan
                .qualifiers
                .iter()
                .map(|q| {
                    format!(
                        "{} = {}",
                        q.to_quoted(setting),
                        parameter_name(q.name(), index, setting)
                    )
                })
                .collect::<Vec<_>>()
                .join(" AND ");
            qb.update()
                .table_name_from(&plan.table, setting)
                .hints_from(plan.hints)
                .set()
                .assignments_from(&plan.updates, index, setting)
                .write_text("WHERE")
                .open_paren()
                .write_text(&matches)
                .close_paren()
                .end();
        }

        self.finish(StatementKind::UpdateAll, qb.build())
    }
}
