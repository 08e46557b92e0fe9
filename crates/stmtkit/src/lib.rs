//! # stmtkit
//!
//! Dialect-aware SQL statement builder for SQL Server, PostgreSQL and MySQL.
//!
//! ## Features
//!
//! - **Text only**: builds parameterized SQL strings; executing them is up to the caller
//! - **One skeleton, three dialects**: validation and field resolution are shared, the
//!   dialect only renders paging, key retrieval and upserts
//! - **Deterministic**: identical requests produce byte-identical SQL
//! - **Typed failures**: every invalid request maps to a distinct [`StatementError`]
//!   variant raised before any text is produced
//! - **Batch aware**: batch row `n` binds `@Field_n`, and key retrieval is correlated
//!   with input rows through the `__RepoDb_OrderColumn` discriminator
//!
//! ## Example
//!
//! ```ignore
//! use stmtkit::prelude::*;
//!
//! let builder = StatementBuilder::sql_server();
//! let fields = FieldSet::parse(["Id", "Name", "Address"])?;
//! let db_fields = DbFieldCollection::new(vec![DbField::new("Id").primary().identity()]);
//!
//! // INSERT INTO [Person] ([Name], [Address]) OUTPUT INSERTED.[Id] VALUES (@Name, @Address);
//! let sql = builder.create_insert(&InsertRequest::new("Person", &fields, &db_fields))?;
//!
//! // SELECT [Id], [Name], [Address] FROM [Person] WHERE ([Name] = @Name);
//! let filter = QueryGroup::from(QueryField::eq("Name", "Ada")?);
//! let sql = builder.create_query(&QueryRequest::new("Person", &fields).with_filter(&filter))?;
//! let params = filter.parameters();
//! ```
//!
//! ## Logging
//!
//! Every successful build emits a `debug` event on the `stmtkit.sql` target
//! carrying the dialect, the operation and the SQL text. Install any
//! `tracing` subscriber to see them.

pub mod condition;
pub mod config;
pub mod db_field;
pub mod dialect;
pub mod error;
pub mod field;
pub mod ident;
pub mod mapping;
pub mod prelude;
pub mod query_builder;
pub mod setting;
pub mod statement;
pub mod value;

pub use condition::{Conjunction, Operation, QueryField, QueryGroup, QueryItem};
pub use config::{BuilderConfig, DialectName, SettingOverrides};
pub use db_field::{ClientType, DbField, DbFieldCollection};
pub use dialect::{Dialect, ORDER_COLUMN, RowLimit};
pub use error::{ErrorKind, StatementError, StatementResult};
pub use field::{Field, FieldSet, Order, OrderField};
pub use ident::Ident;
pub use mapping::{DbFieldCache, DialectRegistry, EntityMap, EntityMapping, FieldProvider};
pub use query_builder::QueryBuilder;
pub use setting::{DbSetting, NullSemantics, StatementOptions};
pub use statement::{
    AggregateRequest, BatchQueryRequest, FilterRequest, InsertRequest, MergeRequest, QueryRequest,
    SkipQueryRequest, StatementBuilder, StatementKind, UpdateRequest,
};
pub use value::Value;
