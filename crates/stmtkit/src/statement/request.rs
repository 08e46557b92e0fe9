//! One request struct per statement verb.
//!
//! Requests borrow everything from the caller; building a statement never
//! mutates them. Optional parts default to "absent" and are set with the
//! `with_*` methods.

use crate::condition::QueryGroup;
use crate::db_field::DbFieldCollection;
use crate::field::{Field, FieldSet, OrderField};

/// `SELECT` with optional filter, ordering and row limit.
#[derive(Debug, Clone, Copy)]
pub struct QueryRequest<'a> {
    pub table: &'a str,
    pub fields: &'a FieldSet,
    pub filter: Option<&'a QueryGroup>,
    pub order_by: &'a [OrderField],
    /// Maximum number of rows. `None` returns every row.
    pub top: Option<u64>,
    pub hints: Option<&'a str>,
}

impl<'a> QueryRequest<'a> {
    pub fn new(table: &'a str, fields: &'a FieldSet) -> Self {
        Self {
            table,
            fields,
            filter: None,
            order_by: &[],
            top: None,
            hints: None,
        }
    }

    pub fn with_filter(mut self, filter: &'a QueryGroup) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_order_by(mut self, order_by: &'a [OrderField]) -> Self {
        self.order_by = order_by;
        self
    }

    pub fn with_top(mut self, top: u64) -> Self {
        self.top = Some(top);
        self
    }

    pub fn with_hints(mut self, hints: &'a str) -> Self {
        self.hints = Some(hints);
        self
    }
}

/// Page-numbered `SELECT`: skips `page × rows_per_batch` rows.
#[derive(Debug, Clone, Copy)]
pub struct BatchQueryRequest<'a> {
    pub table: &'a str,
    pub fields: &'a FieldSet,
    /// Zero-based page number.
    pub page: i64,
    pub rows_per_batch: i64,
    pub order_by: &'a [OrderField],
    pub filter: Option<&'a QueryGroup>,
    pub hints: Option<&'a str>,
}

impl<'a> BatchQueryRequest<'a> {
    pub fn new(
        table: &'a str,
        fields: &'a FieldSet,
        page: i64,
        rows_per_batch: i64,
        order_by: &'a [OrderField],
    ) -> Self {
        Self {
            table,
            fields,
            page,
            rows_per_batch,
            order_by,
            filter: None,
            hints: None,
        }
    }

    pub fn with_filter(mut self, filter: &'a QueryGroup) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_hints(mut self, hints: &'a str) -> Self {
        self.hints = Some(hints);
        self
    }
}

/// Offset-based `SELECT`: skips `skip` rows and returns at most `take`.
#[derive(Debug, Clone, Copy)]
pub struct SkipQueryRequest<'a> {
    pub table: &'a str,
    pub fields: &'a FieldSet,
    pub skip: i64,
    pub take: i64,
    pub order_by: &'a [OrderField],
    pub filter: Option<&'a QueryGroup>,
    pub hints: Option<&'a str>,
}

impl<'a> SkipQueryRequest<'a> {
    pub fn new(
        table: &'a str,
        fields: &'a FieldSet,
        skip: i64,
        take: i64,
        order_by: &'a [OrderField],
    ) -> Self {
        Self {
            table,
            fields,
            skip,
            take,
            order_by,
            filter: None,
            hints: None,
        }
    }

    pub fn with_filter(mut self, filter: &'a QueryGroup) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_hints(mut self, hints: &'a str) -> Self {
        self.hints = Some(hints);
        self
    }
}

/// Table plus optional filter; used by count, exists and delete.
#[derive(Debug, Clone, Copy)]
pub struct FilterRequest<'a> {
    pub table: &'a str,
    pub filter: Option<&'a QueryGroup>,
    pub hints: Option<&'a str>,
}

impl<'a> FilterRequest<'a> {
    pub fn new(table: &'a str) -> Self {
        Self {
            table,
            filter: None,
            hints: None,
        }
    }

    pub fn with_filter(mut self, filter: &'a QueryGroup) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_hints(mut self, hints: &'a str) -> Self {
        self.hints = Some(hints);
        self
    }
}

/// `MAX`/`MIN`/`SUM`/`AVG` over one column.
#[derive(Debug, Clone, Copy)]
pub struct AggregateRequest<'a> {
    pub table: &'a str,
    pub field: &'a Field,
    pub filter: Option<&'a QueryGroup>,
    pub hints: Option<&'a str>,
}

impl<'a> AggregateRequest<'a> {
    pub fn new(table: &'a str, field: &'a Field) -> Self {
        Self {
            table,
            field,
            filter: None,
            hints: None,
        }
    }

    pub fn with_filter(mut self, filter: &'a QueryGroup) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_hints(mut self, hints: &'a str) -> Self {
        self.hints = Some(hints);
        self
    }
}

/// `INSERT` of one row, or `batch_size` rows for insert-all.
#[derive(Debug, Clone, Copy)]
pub struct InsertRequest<'a> {
    pub table: &'a str,
    pub fields: &'a FieldSet,
    pub db_fields: &'a DbFieldCollection,
    /// Rows per command. Only read by insert-all.
    pub batch_size: usize,
    pub hints: Option<&'a str>,
}

impl<'a> InsertRequest<'a> {
    pub fn new(table: &'a str, fields: &'a FieldSet, db_fields: &'a DbFieldCollection) -> Self {
        Self {
            table,
            fields,
            db_fields,
            batch_size: 1,
            hints: None,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_hints(mut self, hints: &'a str) -> Self {
        self.hints = Some(hints);
        self
    }
}

/// `UPDATE` by filter, or one `UPDATE` per row for update-all.
///
/// The filter is only used by the single-statement form; update-all
/// matches every row on its qualifiers.
#[derive(Debug, Clone, Copy)]
pub struct UpdateRequest<'a> {
    pub table: &'a str,
    pub fields: &'a FieldSet,
    pub db_fields: &'a DbFieldCollection,
    pub filter: Option<&'a QueryGroup>,
    /// Match columns for update-all. Defaults to the primary key.
    pub qualifiers: Option<&'a FieldSet>,
    /// Columns never written by the SET list.
    pub no_update_fields: Option<&'a FieldSet>,
    pub batch_size: usize,
    pub hints: Option<&'a str>,
}

impl<'a> UpdateRequest<'a> {
    pub fn new(table: &'a str, fields: &'a FieldSet, db_fields: &'a DbFieldCollection) -> Self {
        Self {
            table,
            fields,
            db_fields,
            filter: None,
            qualifiers: None,
            no_update_fields: None,
            batch_size: 1,
            hints: None,
        }
    }

    pub fn with_filter(mut self, filter: &'a QueryGroup) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_qualifiers(mut self, qualifiers: &'a FieldSet) -> Self {
        self.qualifiers = Some(qualifiers);
        self
    }

    pub fn with_no_update_fields(mut self, fields: &'a FieldSet) -> Self {
        self.no_update_fields = Some(fields);
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_hints(mut self, hints: &'a str) -> Self {
        self.hints = Some(hints);
        self
    }
}

/// Upsert of one row, or `batch_size` rows for merge-all.
#[derive(Debug, Clone, Copy)]
pub struct MergeRequest<'a> {
    pub table: &'a str,
    pub fields: &'a FieldSet,
    pub db_fields: &'a DbFieldCollection,
    /// Match columns. Defaults to the primary key.
    pub qualifiers: Option<&'a FieldSet>,
    pub no_update_fields: Option<&'a FieldSet>,
    pub batch_size: usize,
    pub hints: Option<&'a str>,
}

impl<'a> MergeRequest<'a> {
    pub fn new(table: &'a str, fields: &'a FieldSet, db_fields: &'a DbFieldCollection) -> Self {
        Self {
            table,
            fields,
            db_fields,
            qualifiers: None,
            no_update_fields: None,
            batch_size: 1,
            hints: None,
        }
    }

    pub fn with_qualifiers(mut self, qualifiers: &'a FieldSet) -> Self {
        self.qualifiers = Some(qualifiers);
        self
    }

    pub fn with_no_update_fields(mut self, fields: &'a FieldSet) -> Self {
        self.no_update_fields = Some(fields);
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_hints(mut self, hints: &'a str) -> Self {
        self.hints = Some(hints);
        self
    }
}
