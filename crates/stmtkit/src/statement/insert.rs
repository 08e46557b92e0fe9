//! Insert statements.

use super::request::InsertRequest;
use super::resolve::resolve_insert;
use super::{StatementBuilder, StatementKind};
use crate::error::StatementResult;

impl StatementBuilder {
    /// Insert one row and report its key.
    ///
    /// Identity and generated columns are left out unless identity insert is
    /// enabled. `batch_size` is ignored.
    pub fn create_insert(&self, request: &InsertRequest<'_>) -> StatementResult<String> {
        let plan = resolve_insert(&self.dialect, &self.options, request, 1)?;
        let sql = (self.dialect.hooks().insert)(&self.dialect, &plan, &self.options);
        self.finish(StatementKind::Insert, sql)
    }

    /// Insert `batch_size` rows; row `n` binds `@Field_n` (`@Field` for row 0).
    pub fn create_insert_all(&self, request: &InsertRequest<'_>) -> StatementResult<String> {
        let plan = resolve_insert(&self.dialect, &self.options, request, request.batch_size)?;
        let sql = (self.dialect.hooks().insert)(&self.dialect, &plan, &self.options);
        self.finish(StatementKind::InsertAll, sql)
    }
}
