//! Predicate trees for WHERE clauses.
//!
//! This module provides [`Operation`], the leaf type [`QueryField`] and the
//! internal node [`QueryGroup`]. A group renders as a parenthesized list of
//! its children joined by its [`Conjunction`]; each leaf renders as a quoted
//! column, an operator and one or more named parameters.
//!
//! Parameter names are assigned while rendering, in depth-first order. When
//! a name (or one derived from it, like `Id_In_0`) is already taken, later
//! leaves are suffixed `_1`, `_2`, …
//! [`QueryGroup::parameters`] runs the same naming pass, so the returned
//! bindings always match the rendered SQL.
//!
//! # Example
//! ```ignore
//! use stmtkit::{QueryField, QueryGroup};
//!
//! let filter = QueryGroup::and(vec![
//!     QueryField::eq("Status", "Active")?.into(),
//!     QueryGroup::or(vec![
//!         QueryField::gt("Age", 18)?.into(),
//!         QueryField::is_null("Age")?.into(),
//!     ])
//!     .into(),
//! ]);
//! // ([Status] = @Status AND ([Age] > @Age OR [Age] IS NULL))
//! ```

use std::collections::HashSet;

use crate::error::{StatementError, StatementResult};
use crate::field::Field;
use crate::query_builder::sanitize_parameter;
use crate::setting::{DbSetting, NullSemantics};
use crate::value::Value;

/// Comparison applied by a [`QueryField`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    Like,
    NotLike,
    /// Requires a two-element list value.
    Between,
    /// Requires a two-element list value.
    NotBetween,
    /// Requires a list value.
    In,
    /// Requires a list value.
    NotIn,
}

impl Operation {
    pub fn to_sql(self) -> &'static str {
        match self {
            Operation::Equal => "=",
            Operation::NotEqual => "<>",
            Operation::LessThan => "<",
            Operation::GreaterThan => ">",
            Operation::LessThanOrEqual => "<=",
            Operation::GreaterThanOrEqual => ">=",
            Operation::Like => "LIKE",
            Operation::NotLike => "NOT LIKE",
            Operation::Between => "BETWEEN",
            Operation::NotBetween => "NOT BETWEEN",
            Operation::In => "IN",
            Operation::NotIn => "NOT IN",
        }
    }

    fn is_range(self) -> bool {
        matches!(self, Operation::Between | Operation::NotBetween)
    }

    pub(crate) fn is_list(self) -> bool {
        matches!(self, Operation::In | Operation::NotIn)
    }
}

/// A predicate leaf: `field <operation> value`.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryField {
    field: Field,
    operation: Operation,
    value: Value,
    parameter: Option<String>,
}

impl QueryField {
    /// Create a leaf, validating the value shape against the operation.
    pub fn new(
        name: impl AsRef<str>,
        operation: Operation,
        value: impl Into<Value>,
    ) -> StatementResult<Self> {
        let field = Field::new(name)?;
        let value = value.into();

        if operation.is_list() {
            if value.as_list().is_none() {
                return Err(StatementError::invalid_predicate(format!(
                    "operation {operation:?} on '{field}' requires a list value"
                )));
            }
        } else if operation.is_range() {
            match value.as_list() {
                Some(items) if items.len() == 2 => {}
                Some(items) => {
                    return Err(StatementError::invalid_predicate(format!(
                        "operation {operation:?} on '{field}' requires exactly 2 values, got {}",
                        items.len()
                    )));
                }
                None => {
                    return Err(StatementError::invalid_predicate(format!(
                        "operation {operation:?} on '{field}' requires a list of 2 values"
                    )));
                }
            }
        } else if value.as_list().is_some() {
            return Err(StatementError::invalid_predicate(format!(
                "operation {operation:?} on '{field}' does not accept a list value"
            )));
        } else if value.is_null()
            && !matches!(operation, Operation::Equal | Operation::NotEqual)
        {
            return Err(StatementError::invalid_predicate(format!(
                "operation {operation:?} on '{field}' does not accept NULL"
            )));
        }

        Ok(Self {
            field,
            operation,
            value,
            parameter: None,
        })
    }

    // ==================== Convenience constructors ====================

    /// `field = value` (`IS NULL` when the value is null)
    pub fn eq(name: impl AsRef<str>, value: impl Into<Value>) -> StatementResult<Self> {
        Self::new(name, Operation::Equal, value)
    }

    /// `field <> value` (`IS NOT NULL` when the value is null)
    pub fn ne(name: impl AsRef<str>, value: impl Into<Value>) -> StatementResult<Self> {
        Self::new(name, Operation::NotEqual, value)
    }

    pub fn lt(name: impl AsRef<str>, value: impl Into<Value>) -> StatementResult<Self> {
        Self::new(name, Operation::LessThan, value)
    }

    pub fn gt(name: impl AsRef<str>, value: impl Into<Value>) -> StatementResult<Self> {
        Self::new(name, Operation::GreaterThan, value)
    }

    pub fn lte(name: impl AsRef<str>, value: impl Into<Value>) -> StatementResult<Self> {
        Self::new(name, Operation::LessThanOrEqual, value)
    }

    pub fn gte(name: impl AsRef<str>, value: impl Into<Value>) -> StatementResult<Self> {
        Self::new(name, Operation::GreaterThanOrEqual, value)
    }

    pub fn like(name: impl AsRef<str>, pattern: impl Into<Value>) -> StatementResult<Self> {
        Self::new(name, Operation::Like, pattern)
    }

    pub fn not_like(name: impl AsRef<str>, pattern: impl Into<Value>) -> StatementResult<Self> {
        Self::new(name, Operation::NotLike, pattern)
    }

    pub fn is_null(name: impl AsRef<str>) -> StatementResult<Self> {
        Self::new(name, Operation::Equal, Value::Null)
    }

    pub fn is_not_null(name: impl AsRef<str>) -> StatementResult<Self> {
        Self::new(name, Operation::NotEqual, Value::Null)
    }

    pub fn in_list<V: Into<Value>>(
        name: impl AsRef<str>,
        values: impl IntoIterator<Item = V>,
    ) -> StatementResult<Self> {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        Self::new(name, Operation::In, Value::List(values))
    }

    pub fn not_in<V: Into<Value>>(
        name: impl AsRef<str>,
        values: impl IntoIterator<Item = V>,
    ) -> StatementResult<Self> {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        Self::new(name, Operation::NotIn, Value::List(values))
    }

    pub fn between(
        name: impl AsRef<str>,
        from: impl Into<Value>,
        to: impl Into<Value>,
    ) -> StatementResult<Self> {
        Self::new(name, Operation::Between, Value::List(vec![from.into(), to.into()]))
    }

    pub fn not_between(
        name: impl AsRef<str>,
        from: impl Into<Value>,
        to: impl Into<Value>,
    ) -> StatementResult<Self> {
        Self::new(
            name,
            Operation::NotBetween,
            Value::List(vec![from.into(), to.into()]),
        )
    }

    /// Bind under `name` instead of the field name.
    pub fn with_parameter_name(mut self, name: impl Into<String>) -> Self {
        self.parameter = Some(name.into());
        self
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    fn parameter_base(&self) -> String {
        sanitize_parameter(self.parameter.as_deref().unwrap_or(self.field.name()))
    }

    /// Shape of an `IN` list under the current setting.
    fn list_form(setting: &DbSetting, len: usize) -> ListForm {
        if setting.use_array_parameter_threshold.is_some_and(|t| len > t) {
            ListForm::Array
        } else if setting.use_in_values_threshold.is_some_and(|t| len > t) {
            ListForm::Values
        } else {
            ListForm::Inline
        }
    }

    /// Suffixes of every parameter this leaf binds.
    fn parameter_suffixes(&self, setting: &DbSetting) -> Vec<String> {
        match (self.operation, &self.value) {
            (Operation::Equal | Operation::NotEqual, Value::Null) => Vec::new(),
            (Operation::In | Operation::NotIn, Value::List(items)) if items.is_empty() => Vec::new(),
            (Operation::In | Operation::NotIn, Value::List(items)) => {
                match Self::list_form(setting, items.len()) {
                    ListForm::Array => vec!["_In".to_string()],
                    _ => (0..items.len()).map(|i| format!("_In_{i}")).collect(),
                }
            }
            (Operation::Between | Operation::NotBetween, _) => {
                vec!["_Left".to_string(), "_Right".to_string()]
            }
            _ => vec![String::new()],
        }
    }

    fn render(&self, cx: &mut Render<'_>) {
        let (setting, prefix) = (cx.setting, cx.prefix);
        let column = self.field.to_quoted(setting);
        let suffixes = self.parameter_suffixes(setting);
        let base = cx.names.assign(&self.parameter_base(), &suffixes);
        let param = |suffix: &str| format!("{}{prefix}{base}{suffix}", setting.parameter_prefix);
        let bind_name = |suffix: &str| format!("{prefix}{base}{suffix}");

        match (self.operation, &self.value) {
            (Operation::Equal, Value::Null) => {
                cx.write(&format!("{column} IS NULL"));
            }
            (Operation::NotEqual, Value::Null) => {
                cx.write(&format!("{column} IS NOT NULL"));
            }
            (Operation::In | Operation::NotIn, Value::List(items)) => {
                if items.is_empty() {
                    // Empty IN matches nothing, empty NOT IN matches everything.
                    cx.write(if self.operation == Operation::In {
                        "1 = 0"
                    } else {
                        "1 = 1"
                    });
                    return;
                }
                let form = Self::list_form(setting, items.len());
                if form == ListForm::Array {
                    let p = param("_In");
                    cx.bind(bind_name("_In"), &self.value);
                    let sql = match self.operation {
                        Operation::In => format!("{column} = ANY({p})"),
                        _ => format!("{column} <> ALL({p})"),
                    };
                    cx.write(&sql);
                    return;
                }

                let mut params = Vec::with_capacity(items.len());
                for (suffix, item) in suffixes.iter().zip(items) {
                    params.push(param(suffix));
                    cx.bind(bind_name(suffix), item);
                }
                let operator = self.operation.to_sql();
                let sql = if form == ListForm::Values {
                    let value = format!("{}Value{}", setting.opening_quote, setting.closing_quote);
                    let rows: Vec<String> = params.iter().map(|p| format!("({p})")).collect();
                    format!(
                        "{column} {operator} (SELECT {value} FROM (VALUES {}) AS Q ({value}))",
                        rows.join(", ")
                    )
                } else {
                    format!("{column} {operator} ({})", params.join(", "))
                };
                cx.write(&sql);
            }
            (Operation::Between | Operation::NotBetween, Value::List(items)) => {
                let (left, right) = (param("_Left"), param("_Right"));
                if let [from, to] = items.as_slice() {
                    cx.bind(bind_name("_Left"), from);
                    cx.bind(bind_name("_Right"), to);
                }
                cx.write(&format!(
                    "{column} {} {left} AND {right}",
                    self.operation.to_sql()
                ));
            }
            (Operation::NotEqual, value) if cx.null_semantics == NullSemantics::NullNotEqual => {
                let p = param("");
                cx.bind(bind_name(""), value);
                cx.write(&format!("({column} <> {p} OR {column} IS NULL)"));
            }
            (operation, value) => {
                let p = param("");
                cx.bind(bind_name(""), value);
                cx.write(&format!("{column} {} {p}", operation.to_sql()));
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListForm {
    Inline,
    Values,
    Array,
}

// ==================== QueryGroup: predicate tree ====================

/// How the children of a [`QueryGroup`] combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Conjunction {
    #[default]
    And,
    Or,
}

impl Conjunction {
    fn to_sql(self) -> &'static str {
        match self {
            Conjunction::And => " AND ",
            Conjunction::Or => " OR ",
        }
    }
}

/// A child of a [`QueryGroup`].
#[derive(Debug, Clone, PartialEq)]
pub enum QueryItem {
    Field(QueryField),
    Group(QueryGroup),
}

impl From<QueryField> for QueryItem {
    fn from(field: QueryField) -> Self {
        QueryItem::Field(field)
    }
}

impl From<QueryGroup> for QueryItem {
    fn from(group: QueryGroup) -> Self {
        QueryItem::Group(group)
    }
}

/// An internal predicate node: children joined by a conjunction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryGroup {
    items: Vec<QueryItem>,
    conjunction: Conjunction,
    negate: bool,
}

impl QueryGroup {
    pub fn new(conjunction: Conjunction) -> Self {
        Self {
            items: Vec::new(),
            conjunction,
            negate: false,
        }
    }

    /// Children joined with AND.
    pub fn and(items: Vec<QueryItem>) -> Self {
        Self {
            items,
            conjunction: Conjunction::And,
            negate: false,
        }
    }

    /// Children joined with OR.
    pub fn or(items: Vec<QueryItem>) -> Self {
        Self {
            items,
            conjunction: Conjunction::Or,
            negate: false,
        }
    }

    /// Build an AND group from a dictionary-shaped JSON object.
    ///
    /// Each key becomes a leaf: scalars compare with `=`, `null` renders
    /// `IS NULL`, arrays render `IN (..)`. Keys follow the map's iteration
    /// order. Anything other than an object of scalars and arrays is rejected.
    pub fn from_json(json: &serde_json::Value) -> StatementResult<Self> {
        let serde_json::Value::Object(map) = json else {
            return Err(StatementError::invalid_predicate(
                "parameter object must be a JSON object of column/value pairs",
            ));
        };

        let mut group = QueryGroup::new(Conjunction::And);
        for (key, raw) in map {
            let value = Value::from_json(raw).ok_or_else(|| {
                StatementError::invalid_predicate(format!(
                    "value of '{key}' must be a scalar or an array of scalars"
                ))
            })?;
            let field = match value {
                Value::List(_) => QueryField::new(key, Operation::In, value)?,
                _ => QueryField::new(key, Operation::Equal, value)?,
            };
            group.push(field);
        }
        Ok(group)
    }

    /// Append a child.
    pub fn push(&mut self, item: impl Into<QueryItem>) -> &mut Self {
        self.items.push(item.into());
        self
    }

    /// Render as `NOT (..)`.
    pub fn negated(mut self) -> Self {
        self.negate = !self.negate;
        self
    }

    pub fn items(&self) -> &[QueryItem] {
        &self.items
    }

    pub fn conjunction(&self) -> Conjunction {
        self.conjunction
    }

    pub fn is_negated(&self) -> bool {
        self.negate
    }

    /// True when the group has no leaf anywhere below it.
    pub fn is_empty(&self) -> bool {
        self.items.iter().all(|item| match item {
            QueryItem::Field(_) => false,
            QueryItem::Group(group) => group.is_empty(),
        })
    }

    /// Every leaf, depth-first.
    pub fn fields(&self) -> Vec<&QueryField> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a QueryField>) {
        for item in &self.items {
            match item {
                QueryItem::Field(field) => out.push(field),
                QueryItem::Group(group) => group.collect_fields(out),
            }
        }
    }

    /// Parameter bindings `(name, value)` in rendering order, without the
    /// dialect's parameter prefix character.
    ///
    /// Update statements prefix every WHERE parameter with `_`; pass that
    /// prefix to [`QueryGroup::parameters_with_prefix`] to match them.
    pub fn parameters(&self) -> Vec<(String, Value)> {
        self.parameters_with_prefix("")
    }

    pub fn parameters_with_prefix(&self, prefix: &str) -> Vec<(String, Value)> {
        self.parameters_for(&DbSetting::sql_server(), prefix)
    }

    /// Bindings as rendered under `setting`, whose `IN` list thresholds
    /// decide between one parameter per value and a single array parameter.
    pub fn parameters_for(&self, setting: &DbSetting, prefix: &str) -> Vec<(String, Value)> {
        let mut cx = Render::new(setting, NullSemantics::Ansi, prefix);
        self.render(&mut cx);
        cx.bindings
    }

    /// Render the group. Returns `None` for an empty group.
    pub(crate) fn to_sql(
        &self,
        setting: &DbSetting,
        null_semantics: NullSemantics,
        prefix: &str,
    ) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let mut cx = Render::new(setting, null_semantics, prefix);
        self.render(&mut cx);
        Some(cx.sql)
    }

    fn render(&self, cx: &mut Render<'_>) {
        if self.is_empty() {
            return;
        }
        if self.negate {
            cx.write("NOT ");
        }
        cx.write("(");
        let mut first = true;
        for item in &self.items {
            if let QueryItem::Group(group) = item {
                if group.is_empty() {
                    continue;
                }
            }
            if !first {
                cx.write(self.conjunction.to_sql());
            }
            first = false;
            match item {
                QueryItem::Field(field) => field.render(cx),
                QueryItem::Group(group) => group.render(cx),
            }
        }
        cx.write(")");
    }
}

impl From<QueryField> for QueryGroup {
    fn from(field: QueryField) -> Self {
        QueryGroup::and(vec![field.into()])
    }
}

// ==================== Rendering ====================

/// Assigns unique, case-insensitive parameter names.
///
/// A leaf reserves every name it binds (`base` plus each suffix), so a
/// derived name such as `Id_In_0` can never be reused by a later leaf.
#[derive(Debug, Default)]
struct ParameterNames {
    used: HashSet<String>,
}

impl ParameterNames {
    fn assign(&mut self, base: &str, suffixes: &[String]) -> String {
        let mut n = 0usize;
        loop {
            let candidate = if n == 0 {
                base.to_string()
            } else {
                format!("{base}_{n}")
            };
            let keys: Vec<String> = suffixes
                .iter()
                .map(|suffix| format!("{candidate}{suffix}").to_lowercase())
                .collect();
            if keys.iter().all(|key| !self.used.contains(key)) {
                self.used.extend(keys);
                return candidate;
            }
            n += 1;
        }
    }
}

struct Render<'a> {
    setting: &'a DbSetting,
    null_semantics: NullSemantics,
    prefix: &'a str,
    names: ParameterNames,
    sql: String,
    bindings: Vec<(String, Value)>,
}

impl<'a> Render<'a> {
    fn new(setting: &'a DbSetting, null_semantics: NullSemantics, prefix: &'a str) -> Self {
        Self {
            setting,
            null_semantics,
            prefix,
            names: ParameterNames::default(),
            sql: String::new(),
            bindings: Vec::new(),
        }
    }

    fn write(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    fn bind(&mut self, name: String, value: &Value) {
        self.bindings.push((name, value.clone()));
    }
}
