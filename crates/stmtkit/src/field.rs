//! Field value objects.
//!
//! This module provides [`Field`] (a column name with an optional declared
//! type), [`FieldSet`] (an ordered collection deduplicated by case-insensitive
//! name) and [`OrderField`] for ORDER BY clauses.

use std::fmt;

use crate::db_field::ClientType;
use crate::error::{StatementError, StatementResult};
use crate::ident::{unquote, write_quoted_part};
use crate::setting::DbSetting;

/// Compare two names ignoring case.
pub(crate) fn same_name(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
        || a.chars()
            .flat_map(char::to_lowercase)
            .eq(b.chars().flat_map(char::to_lowercase))
}

/// A column name plus an optional declared type.
///
/// Equality compares the name case-sensitively together with the type; use
/// [`Field::name_eq`] or [`FieldSet`] lookups for case-insensitive matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    name: String,
    ty: Option<ClientType>,
}

impl Field {
    /// Create a field. Surrounding quotes are stripped; blank names are rejected.
    pub fn new(name: impl AsRef<str>) -> StatementResult<Self> {
        let raw = name.as_ref().trim();
        let name = unquote(raw).trim();
        if name.is_empty() {
            return Err(StatementError::invalid_argument(
                "name",
                "field name cannot be null or whitespace",
            ));
        }
        Ok(Self {
            name: name.to_string(),
            ty: None,
        })
    }

    /// Create a field with a declared type.
    pub fn with_type(name: impl AsRef<str>, ty: ClientType) -> StatementResult<Self> {
        let mut field = Self::new(name)?;
        field.ty = Some(ty);
        Ok(field)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn client_type(&self) -> Option<&ClientType> {
        self.ty.as_ref()
    }

    /// Case-insensitive name comparison.
    pub fn name_eq(&self, name: &str) -> bool {
        same_name(&self.name, unquote(name.trim()))
    }

    /// Render the quoted column name.
    pub fn to_quoted(&self, setting: &DbSetting) -> String {
        let mut out = String::with_capacity(self.name.len() + 2);
        write_quoted_part(&self.name, setting, &mut out);
        out
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// An ordered collection of fields with case-insensitive unique names.
///
/// Building a set from a sequence silently drops later duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet {
    fields: Vec<Field>,
}

impl FieldSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from field names.
    ///
    /// # Example
    /// ```ignore
    /// let fields = FieldSet::parse(["Id", "Name", "id"])?;
    /// assert_eq!(fields.len(), 2);
    /// ```
    pub fn parse<I, S>(names: I) -> StatementResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for name in names {
            set.push(Field::new(name)?);
        }
        Ok(set)
    }

    /// Append a field. Returns `false` when a field with the same name exists.
    pub fn push(&mut self, field: Field) -> bool {
        if self.contains(field.name()) {
            return false;
        }
        self.fields.push(field);
        true
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    pub fn as_slice(&self) -> &[Field] {
        &self.fields
    }

    /// Names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(Field::name)
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name_eq(name))
    }

    /// Fields for which `keep` returns true, in order.
    pub fn filter(&self, mut keep: impl FnMut(&Field) -> bool) -> FieldSet {
        FieldSet {
            fields: self.fields.iter().filter(|f| keep(f)).cloned().collect(),
        }
    }

    /// Fields of `self` followed by the fields of `other` not already present.
    pub fn union(&self, other: &FieldSet) -> FieldSet {
        let mut out = self.clone();
        for field in other {
            out.push(field.clone());
        }
        out
    }

    /// Fields of `self` that are also in `other`, in `self` order.
    pub fn intersection(&self, other: &FieldSet) -> FieldSet {
        self.filter(|f| other.contains(f.name()))
    }

    /// Fields of `self` that are not in `other`.
    pub fn difference(&self, other: &FieldSet) -> FieldSet {
        self.filter(|f| !other.contains(f.name()))
    }

    pub fn is_subset_of(&self, other: &FieldSet) -> bool {
        self.fields.iter().all(|f| other.contains(f.name()))
    }

    pub fn is_superset_of(&self, other: &FieldSet) -> bool {
        other.is_subset_of(self)
    }

    /// True when at least one name is shared.
    pub fn overlaps(&self, other: &FieldSet) -> bool {
        self.fields.iter().any(|f| other.contains(f.name()))
    }
}

impl FromIterator<Field> for FieldSet {
    fn from_iter<T: IntoIterator<Item = Field>>(iter: T) -> Self {
        let mut set = FieldSet::new();
        for field in iter {
            set.push(field);
        }
        set
    }
}

impl<'a> IntoIterator for &'a FieldSet {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl From<Field> for FieldSet {
    fn from(field: Field) -> Self {
        FieldSet {
            fields: vec![field],
        }
    }
}

// ==================== Ordering ====================

/// Sort direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    #[default]
    Ascending,
    Descending,
}

impl Order {
    pub(crate) fn to_sql(self) -> &'static str {
        match self {
            Order::Ascending => "ASC",
            Order::Descending => "DESC",
        }
    }
}

/// A single ORDER BY item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderField {
    field: Field,
    order: Order,
}

impl OrderField {
    pub fn new(name: impl AsRef<str>, order: Order) -> StatementResult<Self> {
        Ok(Self {
            field: Field::new(name)?,
            order,
        })
    }

    /// Ascending sort on `name`.
    pub fn asc(name: impl AsRef<str>) -> StatementResult<Self> {
        Self::new(name, Order::Ascending)
    }

    /// Descending sort on `name`.
    pub fn desc(name: impl AsRef<str>) -> StatementResult<Self> {
        Self::new(name, Order::Descending)
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn order(&self) -> Order {
        self.order
    }

    pub(crate) fn to_sql(&self, setting: &DbSetting) -> String {
        format!("{} {}", self.field.to_quoted(setting), self.order.to_sql())
    }
}
