//! Physical column metadata.
//!
//! A [`DbFieldCollection`] is produced once per table by schema introspection
//! (outside this crate) and handed to the statement builder by reference. The
//! builder reads the key roles (primary, identity, generated) to decide which
//! columns are inserted, updated, matched on, or returned.

use serde::{Deserialize, Serialize};

use crate::error::StatementResult;
use crate::field::{Field, FieldSet, same_name};

/// Client-side type of a column value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientType {
    Boolean,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Decimal,
    String,
    Bytes,
    Uuid,
    Date,
    Time,
    DateTime,
    Json,
    /// A type without a dedicated variant, by name.
    Other(String),
}

/// Metadata of one physical column.
///
/// Deserialized key columns (primary or identity) are never nullable, no
/// matter what the document says.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DbFieldRepr")]
pub struct DbField {
    pub name: String,
    pub client_type: Option<ClientType>,
    pub database_type: Option<String>,
    pub size: Option<u32>,
    pub is_nullable: bool,
    pub is_primary: bool,
    pub is_identity: bool,
    /// Computed or virtual column; never written to.
    pub is_generated: bool,
    pub has_default_value: bool,
}

#[derive(Deserialize)]
struct DbFieldRepr {
    name: String,
    #[serde(default)]
    client_type: Option<ClientType>,
    #[serde(default)]
    database_type: Option<String>,
    #[serde(default)]
    size: Option<u32>,
    #[serde(default = "default_nullable")]
    is_nullable: bool,
    #[serde(default)]
    is_primary: bool,
    #[serde(default)]
    is_identity: bool,
    #[serde(default)]
    is_generated: bool,
    #[serde(default)]
    has_default_value: bool,
}

fn default_nullable() -> bool {
    true
}

impl From<DbFieldRepr> for DbField {
    fn from(repr: DbFieldRepr) -> Self {
        Self {
            is_nullable: repr.is_nullable && !repr.is_primary && !repr.is_identity,
            name: repr.name,
            client_type: repr.client_type,
            database_type: repr.database_type,
            size: repr.size,
            is_primary: repr.is_primary,
            is_identity: repr.is_identity,
            is_generated: repr.is_generated,
            has_default_value: repr.has_default_value,
        }
    }
}

impl DbField {
    /// Create a nullable, non-key column.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            client_type: None,
            database_type: None,
            size: None,
            is_nullable: true,
            is_primary: false,
            is_identity: false,
            is_generated: false,
            has_default_value: false,
        }
    }

    /// Mark as (part of) the primary key. Primary columns are not nullable.
    pub fn primary(mut self) -> Self {
        self.is_primary = true;
        self.is_nullable = false;
        self
    }

    /// Mark as the identity (auto-increment) column.
    pub fn identity(mut self) -> Self {
        self.is_identity = true;
        self.is_nullable = false;
        self
    }

    /// Mark as a computed column.
    pub fn generated(mut self) -> Self {
        self.is_generated = true;
        self
    }

    /// Mark as having a server-side default.
    pub fn with_default(mut self) -> Self {
        self.has_default_value = true;
        self
    }

    pub fn with_client_type(mut self, ty: ClientType) -> Self {
        self.client_type = Some(ty);
        self
    }

    pub fn with_database_type(mut self, ty: impl Into<String>, size: Option<u32>) -> Self {
        self.database_type = Some(ty.into());
        self.size = size;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.is_nullable = false;
        self
    }

    pub fn name_eq(&self, name: &str) -> bool {
        same_name(&self.name, name)
    }

    /// Convert to a [`Field`], carrying the client type.
    pub fn to_field(&self) -> StatementResult<Field> {
        match &self.client_type {
            Some(ty) => Field::with_type(&self.name, ty.clone()),
            None => Field::new(&self.name),
        }
    }
}

/// Ordered column metadata of one table.
///
/// At most one column is expected to carry the identity role; when several
/// do, the first wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DbFieldCollection {
    fields: Vec<DbField>,
}

impl DbFieldCollection {
    pub fn new(fields: Vec<DbField>) -> Self {
        Self { fields }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DbField> {
        self.fields.iter()
    }

    /// Case-insensitive lookup by column name.
    pub fn get(&self, name: &str) -> Option<&DbField> {
        self.fields.iter().find(|f| f.name_eq(name))
    }

    /// All primary key columns, in table order.
    pub fn primary_fields(&self) -> impl Iterator<Item = &DbField> {
        self.fields.iter().filter(|f| f.is_primary)
    }

    /// The first primary key column.
    pub fn primary(&self) -> Option<&DbField> {
        self.primary_fields().next()
    }

    /// The identity column, if any.
    pub fn identity(&self) -> Option<&DbField> {
        self.fields.iter().find(|f| f.is_identity)
    }

    pub fn is_identity(&self, name: &str) -> bool {
        self.get(name).is_some_and(|f| f.is_identity)
    }

    pub fn is_generated(&self, name: &str) -> bool {
        self.get(name).is_some_and(|f| f.is_generated)
    }

    /// Primary key columns as a field set.
    pub fn primary_field_set(&self) -> StatementResult<FieldSet> {
        self.primary_fields().map(DbField::to_field).collect()
    }

    /// Every column as a field set.
    pub fn to_field_set(&self) -> StatementResult<FieldSet> {
        self.fields.iter().map(DbField::to_field).collect()
    }
}

impl From<Vec<DbField>> for DbFieldCollection {
    fn from(fields: Vec<DbField>) -> Self {
        Self::new(fields)
    }
}

impl<'a> IntoIterator for &'a DbFieldCollection {
    type Item = &'a DbField;
    type IntoIter = std::slice::Iter<'a, DbField>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
