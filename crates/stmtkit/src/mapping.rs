//! Lookup tables consumed by callers of the statement builder.
//!
//! The builder itself never discovers metadata. These registries hold what
//! an application resolved up front: column metadata per table
//! ([`DbFieldCache`] behind the [`FieldProvider`] trait), entity-to-table
//! mappings ([`EntityMap`]) and the builder to use per database provider
//! ([`DialectRegistry`]).

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db_field::DbFieldCollection;
use crate::error::{StatementError, StatementResult};
use crate::field::{Field, FieldSet};
use crate::ident::Ident;
use crate::setting::StatementOptions;
use crate::statement::StatementBuilder;

/// Source of table column metadata.
pub trait FieldProvider {
    /// Column metadata of `table`, if known.
    fn get_fields(&self, table: &str) -> Option<&DbFieldCollection>;
}

/// Case-insensitive key of a possibly quoted, schema-qualified table name.
fn table_key(table: &str) -> StatementResult<String> {
    let ident = Ident::parse(table)?;
    Ok(ident.parts().join(".").to_lowercase())
}

// ==================== DbFieldCache ====================

const CACHE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedTable {
    name: String,
    fields: DbFieldCollection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheFile {
    version: u32,
    retrieved_at: DateTime<Utc>,
    tables: Vec<CachedTable>,
}

/// Column metadata per table, keyed case-insensitively.
///
/// `dbo.Person`, `[dbo].[Person]` and `DBO.PERSON` address the same entry.
/// The cache can be persisted as JSON so introspection only runs once.
#[derive(Debug, Clone, Default)]
pub struct DbFieldCache {
    tables: HashMap<String, CachedTable>,
}

impl DbFieldCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the metadata of `table`, replacing any previous entry.
    pub fn insert(&mut self, table: &str, fields: DbFieldCollection) -> StatementResult<()> {
        let key = table_key(table)?;
        self.tables.insert(
            key,
            CachedTable {
                name: table.trim().to_string(),
                fields,
            },
        );
        Ok(())
    }

    pub fn get(&self, table: &str) -> Option<&DbFieldCollection> {
        let key = table_key(table).ok()?;
        self.tables.get(&key).map(|t| &t.fields)
    }

    pub fn remove(&mut self, table: &str) -> Option<DbFieldCollection> {
        let key = table_key(table).ok()?;
        self.tables.remove(&key).map(|t| t.fields)
    }

    pub fn contains(&self, table: &str) -> bool {
        self.get(table).is_some()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Table names as they were inserted, sorted.
    pub fn tables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.values().map(|t| t.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Parse a cache document.
    pub fn from_json(json: &str) -> StatementResult<Self> {
        let file: CacheFile = serde_json::from_str(json)?;
        if file.version != CACHE_VERSION {
            return Err(StatementError::Config(format!(
                "unsupported field cache version {} (expected {CACHE_VERSION})",
                file.version
            )));
        }
        let mut cache = Self::new();
        for table in file.tables {
            cache.insert(&table.name, table.fields)?;
        }
        Ok(cache)
    }

    /// Serialize the cache, tables sorted by name.
    pub fn to_json(&self) -> StatementResult<String> {
        let mut tables: Vec<CachedTable> = self.tables.values().cloned().collect();
        tables.sort_by(|a, b| a.name.cmp(&b.name));
        let file = CacheFile {
            version: CACHE_VERSION,
            retrieved_at: Utc::now(),
            tables,
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Read a cache file written by [`DbFieldCache::save`].
    pub fn load(path: impl AsRef<Path>) -> StatementResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            StatementError::Config(format!(
                "failed to read field cache {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&raw)
    }

    /// Write the cache, replacing the file atomically.
    pub fn save(&self, path: impl AsRef<Path>) -> StatementResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StatementError::Config(e.to_string()))?;
        }

        let tmp_path = path.with_extension("json.tmp");
        let data = self.to_json()?;
        std::fs::write(&tmp_path, data).map_err(|e| StatementError::Config(e.to_string()))?;
        std::fs::rename(&tmp_path, path).map_err(|e| StatementError::Config(e.to_string()))?;
        Ok(())
    }
}

impl FieldProvider for DbFieldCache {
    fn get_fields(&self, table: &str) -> Option<&DbFieldCollection> {
        self.get(table)
    }
}

// ==================== EntityMap ====================

/// Table name, fields and primary key resolved for one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityMapping {
    table: String,
    fields: FieldSet,
    primary: Option<Field>,
}

impl EntityMapping {
    pub fn new(table: impl Into<String>, fields: FieldSet) -> StatementResult<Self> {
        let table = table.into();
        if table.trim().is_empty() {
            return Err(StatementError::invalid_argument(
                "table",
                "table name cannot be null or whitespace",
            ));
        }
        Ok(Self {
            table,
            fields,
            primary: None,
        })
    }

    /// Override the primary key. It must be one of the mapped fields.
    pub fn with_primary(mut self, name: &str) -> StatementResult<Self> {
        let primary = self.fields.get(name).cloned().ok_or_else(|| {
            StatementError::PrimaryFieldNotFound(format!(
                "primary '{name}' is not a field of '{}'",
                self.table
            ))
        })?;
        self.primary = Some(primary);
        Ok(self)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    pub fn primary(&self) -> Option<&Field> {
        self.primary.as_ref()
    }
}

/// Entity key to [`EntityMapping`].
#[derive(Debug, Clone, Default)]
pub struct EntityMap {
    entries: HashMap<String, EntityMapping>,
}

impl EntityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `mapping` under `key`, returning the mapping it replaced.
    pub fn register(&mut self, key: impl Into<String>, mapping: EntityMapping) -> Option<EntityMapping> {
        self.entries.insert(key.into(), mapping)
    }

    pub fn get(&self, key: &str) -> Option<&EntityMapping> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Primary key of an entity: the explicit override, else the primary
    /// columns reported by `provider` for the mapped table.
    pub fn primary_fields(
        &self,
        key: &str,
        provider: &dyn FieldProvider,
    ) -> StatementResult<FieldSet> {
        let mapping = self.get(key).ok_or_else(|| {
            StatementError::invalid_argument("key", format!("no mapping registered for '{key}'"))
        })?;
        if let Some(primary) = mapping.primary() {
            return Ok(FieldSet::from(primary.clone()));
        }
        let primaries = provider
            .get_fields(mapping.table())
            .map(DbFieldCollection::primary_field_set)
            .transpose()?
            .unwrap_or_default();
        if primaries.is_empty() {
            return Err(StatementError::PrimaryFieldNotFound(format!(
                "entity '{key}' (table '{}') has no primary key",
                mapping.table()
            )));
        }
        Ok(primaries)
    }
}

// ==================== DialectRegistry ====================

/// Provider key to shared [`StatementBuilder`].
///
/// Keys are case-insensitive. [`DialectRegistry::default`] registers the
/// built-in dialects under their usual provider names.
#[derive(Debug, Clone)]
pub struct DialectRegistry {
    builders: HashMap<String, Arc<StatementBuilder>>,
}

impl Default for DialectRegistry {
    fn default() -> Self {
        Self::with_builtin(&StatementOptions::default())
    }
}

impl DialectRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            builders: HashMap::new(),
        }
    }

    /// The built-in dialects, all sharing `options`.
    pub fn with_builtin(options: &StatementOptions) -> Self {
        let sql_server = Arc::new(StatementBuilder::sql_server().with_options(options.clone()));
        let postgres = Arc::new(StatementBuilder::postgres().with_options(options.clone()));
        let mysql = Arc::new(StatementBuilder::mysql().with_options(options.clone()));

        let mut registry = Self::new();
        for key in ["sqlserver", "mssql"] {
            registry.register_shared(key, Arc::clone(&sql_server));
        }
        for key in ["postgres", "postgresql"] {
            registry.register_shared(key, Arc::clone(&postgres));
        }
        for key in ["mysql", "mariadb"] {
            registry.register_shared(key, Arc::clone(&mysql));
        }
        registry
    }

    /// Register `builder` under `key`, returning the builder it replaced.
    pub fn register(
        &mut self,
        key: &str,
        builder: StatementBuilder,
    ) -> Option<Arc<StatementBuilder>> {
        self.register_shared(key, Arc::new(builder))
    }

    pub fn register_shared(
        &mut self,
        key: &str,
        builder: Arc<StatementBuilder>,
    ) -> Option<Arc<StatementBuilder>> {
        self.builders.insert(key.trim().to_lowercase(), builder)
    }

    pub fn get(&self, key: &str) -> Option<Arc<StatementBuilder>> {
        self.builders.get(&key.trim().to_lowercase()).cloned()
    }

    /// Like [`DialectRegistry::get`], failing for unknown providers.
    pub fn resolve(&self, key: &str) -> StatementResult<Arc<StatementBuilder>> {
        self.get(key).ok_or_else(|| {
            StatementError::not_supported(format!(
                "no statement builder is registered for provider '{key}'"
            ))
        })
    }

    pub fn len(&self) -> usize {
        self.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }
}
