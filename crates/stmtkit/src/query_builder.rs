//! SQL text accumulator.
//!
//! [`QueryBuilder`] appends keywords, quoted identifiers and parameter lists
//! to a single buffer. It performs no validation; callers check their inputs
//! before emitting anything.
//!
//! Tokens are separated by one space, except right after `(`. Closing
//! parentheses, commas and statement terminators attach to the previous
//! token, so a second statement appended after [`QueryBuilder::end`] starts
//! one space after the `;`.
//!
//! # Example
//! ```ignore
//! use stmtkit::{DbSetting, FieldSet, Ident, QueryBuilder};
//!
//! let setting = DbSetting::sql_server();
//! let fields = FieldSet::parse(["Id", "Name"])?;
//! let mut qb = QueryBuilder::new();
//! qb.select()
//!     .fields_from(&fields, &setting)
//!     .from()
//!     .table_name_from(&Ident::parse("dbo.Person")?, &setting)
//!     .end();
//! assert_eq!(qb.as_str(), "SELECT [Id], [Name] FROM [dbo].[Person];");
//! ```

use crate::condition::QueryGroup;
use crate::field::{Field, OrderField};
use crate::ident::Ident;
use crate::setting::{DbSetting, NullSemantics};

/// Replace every character that cannot appear in a parameter name with `_`.
pub(crate) fn sanitize_parameter(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// `@Name` for batch index 0, `@Name_n` for index n > 0.
pub(crate) fn parameter_name(name: &str, index: usize, setting: &DbSetting) -> String {
    let base = sanitize_parameter(name);
    if index == 0 {
        format!("{}{base}", setting.parameter_prefix)
    } else {
        format!("{}{base}_{index}", setting.parameter_prefix)
    }
}

/// A chainable SQL text buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryBuilder {
    buf: String,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a token, separated from the previous one by a space.
    fn token(&mut self, text: &str) -> &mut Self {
        if text.is_empty() {
            return self;
        }
        if !self.buf.is_empty() && !self.buf.ends_with(['(', ' ']) {
            self.buf.push(' ');
        }
        self.buf.push_str(text);
        self
    }

    // ==================== Keywords ====================

    pub fn select(&mut self) -> &mut Self {
        self.token("SELECT")
    }

    pub fn from(&mut self) -> &mut Self {
        self.token("FROM")
    }

    pub fn insert(&mut self) -> &mut Self {
        self.token("INSERT")
    }

    pub fn into_(&mut self) -> &mut Self {
        self.token("INTO")
    }

    pub fn update(&mut self) -> &mut Self {
        self.token("UPDATE")
    }

    pub fn delete(&mut self) -> &mut Self {
        self.token("DELETE")
    }

    pub fn values(&mut self) -> &mut Self {
        self.token("VALUES")
    }

    pub fn set(&mut self) -> &mut Self {
        self.token("SET")
    }

    pub fn open_paren(&mut self) -> &mut Self {
        self.token("(")
    }

    pub fn close_paren(&mut self) -> &mut Self {
        self.buf.push(')');
        self
    }

    pub fn comma(&mut self) -> &mut Self {
        self.buf.push(',');
        self
    }

    /// `AS <quoted name>`
    pub fn as_(&mut self, name: &str, setting: &DbSetting) -> &mut Self {
        self.token("AS");
        self.write_quoted(name, setting)
    }

    // ==================== Text ====================

    /// Append literal text as one token.
    pub fn write_text(&mut self, text: &str) -> &mut Self {
        self.token(text)
    }

    /// Append a single quoted name part.
    pub fn write_quoted(&mut self, name: &str, setting: &DbSetting) -> &mut Self {
        let mut quoted = String::with_capacity(name.len() + 2);
        crate::ident::write_quoted_part(name, setting, &mut quoted);
        self.token(&quoted)
    }

    /// Append a (possibly schema-qualified) table name, each part quoted.
    pub fn table_name_from(&mut self, table: &Ident, setting: &DbSetting) -> &mut Self {
        let quoted = table.to_quoted(setting);
        self.token(&quoted)
    }

    /// Append table hints when present.
    pub fn hints_from(&mut self, hints: Option<&str>) -> &mut Self {
        match hints.map(str::trim) {
            Some(hints) => self.token(hints),
            None => self,
        }
    }

    // ==================== Field lists ====================

    /// `[A], [B], [C]`
    pub fn fields_from<'a>(
        &mut self,
        fields: impl IntoIterator<Item = &'a Field>,
        setting: &DbSetting,
    ) -> &mut Self {
        let list = join(fields.into_iter().map(|f| f.to_quoted(setting)));
        self.token(&list)
    }

    /// `S.[A], S.[B]` with the given alias.
    pub fn aliased_fields_from<'a>(
        &mut self,
        fields: impl IntoIterator<Item = &'a Field>,
        alias: &str,
        setting: &DbSetting,
    ) -> &mut Self {
        let list = join(
            fields
                .into_iter()
                .map(|f| format!("{alias}.{}", f.to_quoted(setting))),
        );
        self.token(&list)
    }

    /// `@A, @B` for batch index 0, `@A_n, @B_n` for index n.
    pub fn parameters_from<'a>(
        &mut self,
        fields: impl IntoIterator<Item = &'a Field>,
        index: usize,
        setting: &DbSetting,
    ) -> &mut Self {
        let list = join(
            fields
                .into_iter()
                .map(|f| parameter_name(f.name(), index, setting)),
        );
        self.token(&list)
    }

    /// `[A] = @A, [B] = @B` (with the batch suffix for index n).
    pub fn assignments_from<'a>(
        &mut self,
        fields: impl IntoIterator<Item = &'a Field>,
        index: usize,
        setting: &DbSetting,
    ) -> &mut Self {
        let list = join(fields.into_iter().map(|f| {
            format!(
                "{} = {}",
                f.to_quoted(setting),
                parameter_name(f.name(), index, setting)
            )
        }));
        self.token(&list)
    }

    // ==================== Clauses ====================

    /// `WHERE (..)`; nothing for an absent or empty group.
    ///
    /// `prefix` is prepended to every parameter name (`_` for updates).
    pub fn where_from(
        &mut self,
        filter: Option<&QueryGroup>,
        setting: &DbSetting,
        null_semantics: NullSemantics,
        prefix: &str,
    ) -> &mut Self {
        match filter.and_then(|g| g.to_sql(setting, null_semantics, prefix)) {
            Some(sql) => {
                self.token("WHERE");
                self.token(&sql)
            }
            None => self,
        }
    }

    /// `ORDER BY [A] ASC, [B] DESC`; nothing for an empty list.
    pub fn order_by_from(&mut self, order_by: &[OrderField], setting: &DbSetting) -> &mut Self {
        if order_by.is_empty() {
            return self;
        }
        let list = join(order_by.iter().map(|o| o.to_sql(setting)));
        self.token("ORDER BY");
        self.token(&list)
    }

    /// Terminate the current statement.
    pub fn end(&mut self) -> &mut Self {
        self.buf.push(';');
        self
    }

    // ==================== Output ====================

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    pub fn build(self) -> String {
        self.buf
    }
}

fn join(items: impl Iterator<Item = String>) -> String {
    items.collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::QueryField;
    use crate::field::FieldSet;

    #[test]
    fn tokens_are_space_separated() {
        let setting = DbSetting::sql_server();
        let fields = FieldSet::parse(["Id", "Name"]).unwrap();
        let mut qb = QueryBuilder::new();
        qb.insert()
            .into_()
            .table_name_from(&Ident::parse("dbo.Person").unwrap(), &setting)
            .open_paren()
            .fields_from(&fields, &setting)
            .close_paren()
            .values()
            .open_paren()
            .parameters_from(&fields, 0, &setting)
            .close_paren()
            .end();
        assert_eq!(
            qb.as_str(),
            "INSERT INTO [dbo].[Person] ([Id], [Name]) VALUES (@Id, @Name);"
        );
    }

    #[test]
    fn batch_parameters_are_suffixed() {
        let setting = DbSetting::postgres();
        let fields = FieldSet::parse(["Id", "Name"]).unwrap();
        let mut qb = QueryBuilder::new();
        qb.parameters_from(&fields, 2, &setting);
        assert_eq!(qb.as_str(), "@Id_2, @Name_2");
    }

    #[test]
    fn parameter_names_are_sanitized() {
        let setting = DbSetting::sql_server();
        assert_eq!(parameter_name("First Name", 0, &setting), "@First_Name");
        assert_eq!(parameter_name("a-b", 1, &setting), "@a_b_1");
    }

    #[test]
    fn empty_values_list() {
        let mut qb = QueryBuilder::new();
        qb.values().open_paren().close_paren().end();
        assert_eq!(qb.as_str(), "VALUES ();");
    }

    #[test]
    fn statements_chain_with_one_space() {
        let mut qb = QueryBuilder::new();
        qb.write_text("SELECT 1").end().write_text("SELECT 2").end();
        assert_eq!(qb.build(), "SELECT 1; SELECT 2;");
    }

    #[test]
    fn where_and_order_by() {
        let setting = DbSetting::mysql();
        let filter = QueryGroup::from(QueryField::eq("Id", 1).unwrap());
        let order = [OrderField::desc("Name").unwrap()];
        let mut qb = QueryBuilder::new();
        qb.where_from(Some(&filter), &setting, NullSemantics::Ansi, "")
            .order_by_from(&order, &setting);
        assert_eq!(qb.as_str(), "WHERE (`Id` = @Id) ORDER BY `Name` DESC");
    }

    #[test]
    fn empty_clauses_emit_nothing() {
        let setting = DbSetting::mysql();
        let mut qb = QueryBuilder::new();
        qb.where_from(Some(&QueryGroup::default()), &setting, NullSemantics::Ansi, "")
            .order_by_from(&[], &setting)
            .hints_from(None);
        assert!(qb.is_empty());
    }

    #[test]
    fn as_quotes_alias() {
        let mut qb = QueryBuilder::new();
        qb.write_text("COUNT(*)").as_("CountValue", &DbSetting::postgres());
        assert_eq!(qb.as_str(), r#"COUNT(*) AS "CountValue""#);
    }
}
