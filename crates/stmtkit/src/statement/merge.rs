//! Upsert statements.

use super::request::MergeRequest;
use super::resolve::resolve_merge;
use super::{StatementBuilder, StatementKind};
use crate::error::StatementResult;

impl StatementBuilder {
    /// Insert the row, or update it when a row with the same qualifier
    /// values exists. Qualifiers default to the primary key.
    pub fn create_merge(&self, request: &MergeRequest<'_>) -> StatementResult<String> {
        let plan = resolve_merge(&self.dialect, &self.options, request, 1)?;
        let sql = (self.dialect.hooks().merge)(&self.dialect, &plan, &self.options);
        self.finish(StatementKind::Merge, sql)
    }

    /// Upsert `batch_size` rows.
    pub fn create_merge_all(&self, request: &MergeRequest<'_>) -> StatementResult<String> {
        let plan = resolve_merge(&self.dialect, &self.options, request, request.batch_size)?;
        let sql = (self.dialect.hooks().merge)(&self.dialect, &plan, &self.options);
        self.finish(StatementKind::MergeAll, sql)
    }
}
