//! Convenient imports for typical `stmtkit` usage.
//!
//! ```ignore
//! use stmtkit::prelude::*;
//! ```

pub use crate::{
    AggregateRequest, BatchQueryRequest, DbField, DbFieldCollection, Dialect, Field, FieldSet,
    FilterRequest, InsertRequest, MergeRequest, NullSemantics, OrderField, QueryField, QueryGroup,
    QueryRequest, SkipQueryRequest, StatementBuilder, StatementError, StatementOptions,
    StatementResult, UpdateRequest, Value,
};
