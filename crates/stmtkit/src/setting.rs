//! Dialect settings and per-builder statement options.
//!
//! [`DbSetting`] describes the fixed properties of a database engine (quote
//! characters, parameter prefix, limits). [`StatementOptions`] carries the
//! caller-controlled switches that influence statement shape. Both are plain
//! values handed to a [`StatementBuilder`](crate::StatementBuilder); nothing
//! here is read from global state.

use serde::{Deserialize, Serialize};

/// Engine-level properties consumed by the statement builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbSetting {
    /// Character opening a quoted identifier.
    pub opening_quote: char,
    /// Character closing a quoted identifier.
    pub closing_quote: char,
    /// Prefix of named parameters.
    pub parameter_prefix: char,
    /// Whether table hints (e.g. `WITH (NOLOCK)`) can be appended to a table reference.
    pub table_hints_supported: bool,
    /// Type the field is cast to inside `AVG(..)`. `None` means no cast.
    pub average_conversion_type: Option<String>,
    /// Maximum number of parameters a single command may bind.
    pub max_parameter_count: usize,
    /// Use `OFFSET .. FETCH` for paging instead of a `ROW_NUMBER()` CTE.
    ///
    /// Only consulted by dialects that know both forms.
    pub use_offset_fetch: bool,
    /// `IN` lists longer than this bind one array parameter
    /// (`= ANY(@f_In)`) instead of one parameter per value.
    #[serde(default)]
    pub use_array_parameter_threshold: Option<usize>,
    /// `IN` lists longer than this select from a `VALUES` table instead of
    /// listing the parameters inline.
    #[serde(default)]
    pub use_in_values_threshold: Option<usize>,
    /// Largest accepted `IN` list.
    #[serde(default)]
    pub max_array_parameter_value_count: Option<usize>,
}

impl DbSetting {
    /// Settings for Microsoft SQL Server.
    pub fn sql_server() -> Self {
        Self {
            opening_quote: '[',
            closing_quote: ']',
            parameter_prefix: '@',
            table_hints_supported: true,
            average_conversion_type: Some("FLOAT".to_string()),
            max_parameter_count: 2100,
            use_offset_fetch: true,
            use_array_parameter_threshold: None,
            use_in_values_threshold: None,
            max_array_parameter_value_count: None,
        }
    }

    /// Settings for PostgreSQL.
    pub fn postgres() -> Self {
        Self {
            opening_quote: '"',
            closing_quote: '"',
            parameter_prefix: '@',
            table_hints_supported: false,
            average_conversion_type: Some("DOUBLE PRECISION".to_string()),
            max_parameter_count: 32767,
            use_offset_fetch: false,
            use_array_parameter_threshold: None,
            use_in_values_threshold: None,
            max_array_parameter_value_count: None,
        }
    }

    /// Settings for MySQL and MariaDB.
    pub fn mysql() -> Self {
        Self {
            opening_quote: '`',
            closing_quote: '`',
            parameter_prefix: '@',
            table_hints_supported: false,
            average_conversion_type: None,
            max_parameter_count: 65535,
            use_offset_fetch: false,
            use_array_parameter_threshold: None,
            use_in_values_threshold: None,
            max_array_parameter_value_count: None,
        }
    }

    /// Set the maximum parameter count.
    pub fn with_max_parameter_count(mut self, count: usize) -> Self {
        self.max_parameter_count = count;
        self
    }

    /// Set the parameter prefix.
    pub fn with_parameter_prefix(mut self, prefix: char) -> Self {
        self.parameter_prefix = prefix;
        self
    }

    /// Bind `IN` lists longer than `threshold` as one array parameter.
    pub fn with_array_parameter_threshold(mut self, threshold: usize) -> Self {
        self.use_array_parameter_threshold = Some(threshold);
        self
    }

    /// Render `IN` lists longer than `threshold` against a `VALUES` table.
    pub fn with_in_values_threshold(mut self, threshold: usize) -> Self {
        self.use_in_values_threshold = Some(threshold);
        self
    }

    /// Reject `IN` lists with more than `count` values.
    pub fn with_max_array_parameter_value_count(mut self, count: usize) -> Self {
        self.max_array_parameter_value_count = Some(count);
        self
    }

    /// Choose between `OFFSET .. FETCH` and `ROW_NUMBER()` paging.
    pub fn with_offset_fetch(mut self, enabled: bool) -> Self {
        self.use_offset_fetch = enabled;
        self
    }
}

/// How `NotEqual` predicates treat NULL column values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullSemantics {
    /// Plain `<>`: rows whose column is NULL never match.
    #[default]
    Ansi,
    /// A NULL column counts as "not equal" to a non-null value:
    /// `(col <> @p OR col IS NULL)`.
    NullNotEqual,
}

/// Caller-controlled options threaded through every statement build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatementOptions {
    /// Write explicit values into identity columns.
    ///
    /// Insert and merge statements then keep the identity column among the
    /// inserted fields (SQL Server wraps the statement with
    /// `SET IDENTITY_INSERT`, PostgreSQL adds `OVERRIDING SYSTEM VALUE`).
    pub identity_insert: bool,
    /// NULL handling for `NotEqual` predicates.
    pub null_semantics: NullSemantics,
    /// Largest insert-all batch rendered as a multi-row `INSERT` on SQL Server.
    ///
    /// Bigger batches switch to the `MERGE .. ON 1=0` form so returned keys
    /// can be correlated with input rows.
    pub merge_insert_threshold: usize,
}

impl Default for StatementOptions {
    fn default() -> Self {
        Self {
            identity_insert: false,
            null_semantics: NullSemantics::Ansi,
            merge_insert_threshold: 3,
        }
    }
}

impl StatementOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable explicit identity values.
    pub fn with_identity_insert(mut self, enabled: bool) -> Self {
        self.identity_insert = enabled;
        self
    }

    /// Set the NULL semantics of `NotEqual` predicates.
    pub fn with_null_semantics(mut self, semantics: NullSemantics) -> Self {
        self.null_semantics = semantics;
        self
    }

    /// Set the SQL Server insert-all batch threshold.
    pub fn with_merge_insert_threshold(mut self, threshold: usize) -> Self {
        self.merge_insert_threshold = threshold;
        self
    }
}
