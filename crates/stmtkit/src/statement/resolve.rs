//! Argument validation and field/key resolution.
//!
//! Everything here is a pure function of the request and the options: the
//! dialect renderers receive fully resolved plans and never look at the
//! table metadata themselves.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::condition::QueryGroup;
use crate::db_field::DbFieldCollection;
use crate::dialect::Dialect;
use crate::error::{StatementError, StatementResult};
use crate::field::{Field, FieldSet};
use crate::ident::Ident;
use crate::query_builder::{parameter_name, sanitize_parameter};
use crate::setting::{DbSetting, StatementOptions};
use crate::value::Value;

use super::request::{InsertRequest, MergeRequest, UpdateRequest};

// ==================== Argument checks ====================

pub(crate) fn table_name(table: &str) -> StatementResult<Ident> {
    if table.trim().is_empty() {
        return Err(StatementError::invalid_argument(
            "table",
            "table name cannot be null or whitespace",
        ));
    }
    Ident::parse(table)
}

pub(crate) fn check_hints(dialect: &Dialect, hints: Option<&str>) -> StatementResult<()> {
    if hints.is_some() && !dialect.setting().table_hints_supported {
        return Err(StatementError::not_supported(format!(
            "table hints are not supported by {}",
            dialect.name()
        )));
    }
    Ok(())
}

pub(crate) fn check_fields(fields: &FieldSet) -> StatementResult<()> {
    if fields.is_empty() {
        return Err(StatementError::missing_fields(
            "the list of fields cannot be empty",
        ));
    }
    Ok(())
}

pub(crate) fn check_batch_size(batch_size: usize) -> StatementResult<()> {
    if batch_size < 1 {
        return Err(StatementError::out_of_range(
            "batch_size",
            "batch size must be at least 1",
        ));
    }
    Ok(())
}

pub(crate) fn check_parameter_limit(
    setting: &DbSetting,
    per_row: usize,
    batch_size: usize,
) -> StatementResult<()> {
    let count = per_row.saturating_mul(batch_size);
    if count > setting.max_parameter_count {
        return Err(StatementError::ParameterLimitExceeded {
            count,
            max: setting.max_parameter_count,
        });
    }
    Ok(())
}

/// Batch parameters `@Name_n` of different fields must never coincide.
///
/// `Name` at row 1 and `Name_1` at row 0 both render `@Name_1`, and
/// `First Name` sanitizes to the same `@First_Name` as `First_Name`.
pub(crate) fn check_parameter_names(
    setting: &DbSetting,
    fields: &FieldSet,
    batch_size: usize,
) -> StatementResult<()> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for index in 0..batch_size {
        for field in fields {
            let name = parameter_name(field.name(), index, setting);
            match seen.entry(name.to_lowercase()) {
                Entry::Occupied(other) if !field.name_eq(other.get()) => {
                    return Err(StatementError::invalid_argument(
                        "fields",
                        format!(
                            "parameter {name} of '{field}' collides with the parameter of '{}'",
                            other.get()
                        ),
                    ));
                }
                Entry::Occupied(_) => {}
                Entry::Vacant(slot) => {
                    slot.insert(field.name());
                }
            }
        }
    }
    Ok(())
}

/// Validate a WHERE filter and return its bindings.
///
/// `extra` counts the parameters the rest of the statement binds. `IN`
/// lists longer than the setting's array limit are rejected.
pub(crate) fn check_filter(
    setting: &DbSetting,
    filter: Option<&QueryGroup>,
    prefix: &str,
    extra: usize,
) -> StatementResult<Vec<(String, Value)>> {
    let Some(filter) = filter else {
        return Ok(Vec::new());
    };
    if let Some(max) = setting.max_array_parameter_value_count {
        for leaf in filter.fields() {
            if let (Some(items), true) = (leaf.value().as_list(), leaf.operation().is_list()) {
                if items.len() > max {
                    return Err(StatementError::invalid_predicate(format!(
                        "the list of '{}' has {} values, at most {max} are allowed",
                        leaf.field(),
                        items.len()
                    )));
                }
            }
        }
    }

    let bindings = filter.parameters_for(setting, prefix);
    check_parameter_limit(setting, bindings.len() + extra, 1)?;
    Ok(bindings)
}

/// Every non-identity primary key without a server default must be written.
fn check_required_primaries(fields: &FieldSet, db_fields: &DbFieldCollection) -> StatementResult<()> {
    for primary in db_fields.primary_fields() {
        if primary.is_identity || primary.has_default_value || fields.contains(&primary.name) {
            continue;
        }
        return Err(StatementError::PrimaryFieldNotFound(format!(
            "primary key '{}' has no default value and is not among the fields",
            primary.name
        )));
    }
    Ok(())
}

// ==================== Keys ====================

/// Where the value of a returned key comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeySource {
    /// Generated by the identity column.
    Identity,
    /// Written by the statement's own parameters.
    Supplied,
    /// Written by the statement, but the parameter may be NULL and leave the
    /// value to the identity.
    SuppliedOrIdentity,
    /// Filled by a server-side default.
    Server,
}

/// A key column reported back after insert or merge.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct KeyColumn {
    pub field: Field,
    pub source: KeySource,
}

/// The identity column when the table has one, else every primary column.
fn return_keys(
    db_fields: &DbFieldCollection,
    written: &FieldSet,
) -> StatementResult<Vec<KeyColumn>> {
    if let Some(identity) = db_fields.identity() {
        let field = identity.to_field()?;
        let source = if written.contains(field.name()) {
            KeySource::Supplied
        } else {
            KeySource::Identity
        };
        return Ok(vec![KeyColumn { field, source }]);
    }

    db_fields
        .primary_fields()
        .map(|primary| {
            let field = primary.to_field()?;
            let source = if written.contains(field.name()) {
                KeySource::Supplied
            } else {
                KeySource::Server
            };
            Ok(KeyColumn { field, source })
        })
        .collect()
}

/// Explicit qualifiers, or the primary key when none are given.
fn resolve_qualifiers(
    table: &Ident,
    fields: &FieldSet,
    db_fields: &DbFieldCollection,
    qualifiers: Option<&FieldSet>,
) -> StatementResult<FieldSet> {
    if let Some(qualifiers) = qualifiers.filter(|q| !q.is_empty()) {
        if let Some(missing) = qualifiers.iter().find(|q| !fields.contains(q.name())) {
            return Err(StatementError::InvalidQualifiers(format!(
                "qualifier '{missing}' is not among the fields"
            )));
        }
        // Keep the caller's spelling from the field list.
        return Ok(fields.filter(|f| qualifiers.contains(f.name())));
    }

    let primaries = db_fields.primary_field_set()?;
    if primaries.is_empty() {
        return Err(StatementError::PrimaryFieldNotFound(format!(
            "no qualifiers were given and '{}' has no primary key",
            table.name()
        )));
    }
    if let Some(missing) = primaries.iter().find(|p| !fields.contains(p.name())) {
        return Err(StatementError::PrimaryFieldNotFound(format!(
            "primary key '{missing}' is not among the fields"
        )));
    }
    tracing::trace!(
        target: "stmtkit.sql",
        table = table.name(),
        qualifiers = ?primaries.names().collect::<Vec<_>>(),
        "qualifiers defaulted to the primary key"
    );
    Ok(fields.filter(|f| primaries.contains(f.name())))
}

// ==================== Plans ====================

/// A validated insert.
#[derive(Debug, Clone)]
pub(crate) struct InsertPlan<'a> {
    pub table: Ident,
    pub hints: Option<&'a str>,
    /// Columns written by the statement, in request order.
    pub columns: FieldSet,
    pub keys: Vec<KeyColumn>,
    pub batch_size: usize,
    /// The identity column is among `columns`.
    pub identity_insert: bool,
}

pub(crate) fn resolve_insert<'a>(
    dialect: &Dialect,
    options: &StatementOptions,
    request: &InsertRequest<'a>,
    batch_size: usize,
) -> StatementResult<InsertPlan<'a>> {
    let table = table_name(request.table)?;
    check_fields(request.fields)?;
    check_batch_size(batch_size)?;
    check_hints(dialect, request.hints)?;

    let db_fields = request.db_fields;
    check_required_primaries(request.fields, db_fields)?;

    let columns = request.fields.filter(|f| {
        !db_fields.is_generated(f.name())
            && (options.identity_insert || !db_fields.is_identity(f.name()))
    });
    check_parameter_limit(dialect.setting(), columns.len(), batch_size)?;
    check_parameter_names(dialect.setting(), &columns, batch_size)?;

    let identity_insert = columns.iter().any(|f| db_fields.is_identity(f.name()));
    let keys = return_keys(db_fields, &columns)?;

    Ok(InsertPlan {
        table,
        hints: request.hints,
        columns,
        keys,
        batch_size,
        identity_insert,
    })
}

/// A validated upsert.
#[derive(Debug, Clone)]
pub(crate) struct MergePlan<'a> {
    pub table: Ident,
    pub hints: Option<&'a str>,
    /// Every writable requested column (generated columns removed).
    pub source: FieldSet,
    /// Columns of the insert branch; the identity only with identity insert.
    pub columns: FieldSet,
    pub qualifiers: FieldSet,
    /// Columns of the update branch.
    pub updates: FieldSet,
    pub identity: Option<Field>,
    pub keys: Vec<KeyColumn>,
    pub batch_size: usize,
    pub identity_insert: bool,
}

impl MergePlan<'_> {
    /// The identity is one of the match columns.
    pub fn identity_is_qualifier(&self) -> bool {
        self.identity
            .as_ref()
            .is_some_and(|id| self.qualifiers.contains(id.name()))
    }

    /// Insert columns for dialects that write a matched identity value back.
    pub fn columns_with_qualified_identity(&self) -> FieldSet {
        if self.identity_is_qualifier() {
            self.source.clone()
        } else {
            self.columns.clone()
        }
    }
}

pub(crate) fn resolve_merge<'a>(
    dialect: &Dialect,
    options: &StatementOptions,
    request: &MergeRequest<'a>,
    batch_size: usize,
) -> StatementResult<MergePlan<'a>> {
    let table = table_name(request.table)?;
    check_fields(request.fields)?;
    check_batch_size(batch_size)?;
    check_hints(dialect, request.hints)?;

    let db_fields = request.db_fields;
    check_required_primaries(request.fields, db_fields)?;

    let source = request.fields.filter(|f| !db_fields.is_generated(f.name()));
    if source.is_empty() {
        return Err(StatementError::missing_fields(format!(
            "every field of '{}' is generated",
            table.name()
        )));
    }
    let qualifiers = resolve_qualifiers(&table, &source, db_fields, request.qualifiers)?;
    check_parameter_limit(dialect.setting(), source.len(), batch_size)?;
    check_parameter_names(dialect.setting(), &source, batch_size)?;

    let columns = source.filter(|f| options.identity_insert || !db_fields.is_identity(f.name()));
    let identity = db_fields.identity().map(|f| f.to_field()).transpose()?;
    let no_update = request.no_update_fields;
    let updates = source.filter(|f| {
        !qualifiers.contains(f.name())
            && !db_fields.is_identity(f.name())
            && !no_update.is_some_and(|n| n.contains(f.name()))
    });

    let identity_insert = columns.iter().any(|f| db_fields.is_identity(f.name()));
    let mut keys = return_keys(db_fields, &columns)?;
    // A qualifying identity is written even without identity insert.
    if identity.as_ref().is_some_and(|id| qualifiers.contains(id.name())) {
        for key in keys.iter_mut().filter(|k| k.source == KeySource::Identity) {
            key.source = KeySource::SuppliedOrIdentity;
        }
    }

    Ok(MergePlan {
        table,
        hints: request.hints,
        source,
        columns,
        qualifiers,
        updates,
        identity,
        keys,
        batch_size,
        identity_insert,
    })
}

/// A validated update.
#[derive(Debug, Clone)]
pub(crate) struct UpdatePlan<'a> {
    pub table: Ident,
    pub hints: Option<&'a str>,
    /// SET list.
    pub updates: FieldSet,
    /// Match columns of update-all; empty for the filtered form.
    pub qualifiers: FieldSet,
    pub batch_size: usize,
}

/// Update by filter: SET excludes keys and generated columns.
pub(crate) fn resolve_update<'a>(
    dialect: &Dialect,
    request: &UpdateRequest<'a>,
    where_prefix: &str,
) -> StatementResult<UpdatePlan<'a>> {
    let table = table_name(request.table)?;
    check_fields(request.fields)?;
    check_hints(dialect, request.hints)?;

    let db_fields = request.db_fields;
    let no_update = request.no_update_fields;
    let updates = request.fields.filter(|f| {
        let name = f.name();
        !db_fields.get(name).is_some_and(|d| d.is_primary || d.is_identity || d.is_generated)
            && !no_update.is_some_and(|n| n.contains(name))
    });
    if updates.is_empty() {
        return Err(StatementError::missing_fields(format!(
            "no updatable fields remain for '{}'",
            table.name()
        )));
    }

    let setting = dialect.setting();
    check_parameter_names(setting, &updates, 1)?;
    let bindings = check_filter(setting, request.filter, where_prefix, updates.len())?;
    for field in &updates {
        let set_name = sanitize_parameter(field.name());
        if let Some((name, _)) = bindings
            .iter()
            .find(|(name, _)| set_name.to_lowercase() == name.to_lowercase())
        {
            return Err(StatementError::invalid_argument(
                "filter",
                format!("filter parameter {name} collides with the SET parameter of '{field}'"),
            ));
        }
    }

    Ok(UpdatePlan {
        table,
        hints: request.hints,
        updates,
        qualifiers: FieldSet::new(),
        batch_size: 1,
    })
}

/// Update-all: SET excludes qualifiers, identity and generated columns.
pub(crate) fn resolve_update_all<'a>(
    dialect: &Dialect,
    request: &UpdateRequest<'a>,
) -> StatementResult<UpdatePlan<'a>> {
    let table = table_name(request.table)?;
    check_fields(request.fields)?;
    check_batch_size(request.batch_size)?;
    check_hints(dialect, request.hints)?;

    let db_fields = request.db_fields;
    let qualifiers = resolve_qualifiers(&table, request.fields, db_fields, request.qualifiers)?;
    let no_update = request.no_update_fields;
    let updates = request.fields.filter(|f| {
        let name = f.name();
        !qualifiers.contains(name)
            && !db_fields.is_identity(name)
            && !db_fields.is_generated(name)
            && !no_update.is_some_and(|n| n.contains(name))
    });
    if updates.is_empty() {
        return Err(StatementError::missing_fields(format!(
            "no updatable fields remain for '{}'",
            table.name()
        )));
    }
    check_parameter_limit(
        dialect.setting(),
        updates.len() + qualifiers.len(),
        request.batch_size,
    )?;
    check_parameter_names(
        dialect.setting(),
        &updates.union(&qualifiers),
        request.batch_size,
    )?;

    Ok(UpdatePlan {
        table,
        hints: request.hints,
        updates,
        qualifiers,
        batch_size: request.batch_size,
    })
}
