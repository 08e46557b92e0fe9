//! SQL identifier handling.
//!
//! This module provides [`Ident`], a schema/table/column name split into its
//! parts with any existing quoting removed. Rendering re-quotes every part with
//! the quote characters of the target dialect, so `dbo.Person`, `[dbo].[Person]`
//! and `"dbo"."Person"` all normalize to the same identifier.
//!
//! - Quoted parts may use `[..]`, `".."` or `` `..` ``; a doubled closing
//!   character inside a quoted part is an escaped literal.
//! - Unquoted parts are trimmed and may not contain quote characters.
//!
//! # Example
//! ```ignore
//! use stmtkit::{DbSetting, Ident};
//!
//! let t = Ident::parse("[dbo].[Person]")?;
//! assert_eq!(t.to_quoted(&DbSetting::postgres()), r#""dbo"."Person""#);
//! # Ok::<(), stmtkit::StatementError>(())
//! ```

use crate::error::{StatementError, StatementResult};
use crate::setting::DbSetting;

const QUOTE_PAIRS: [(char, char); 3] = [('[', ']'), ('"', '"'), ('`', '`')];

fn closing_quote_for(open: char) -> Option<char> {
    QUOTE_PAIRS
        .iter()
        .find(|(o, _)| *o == open)
        .map(|(_, c)| *c)
}

fn is_quote_char(c: char) -> bool {
    QUOTE_PAIRS.iter().any(|(o, c2)| *o == c || *c2 == c)
}

/// A SQL identifier (column, table, or schema-qualified table name).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    parts: Vec<String>,
}

impl Ident {
    /// Parse a possibly schema-qualified name, splitting on `.` outside quotes.
    ///
    /// - Dotted: `schema.table`
    /// - Quoted: `[schema].[table]`, `"schema"."table"`
    /// - Mixed: `dbo."Order Details"`
    pub fn parse(s: &str) -> StatementResult<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(StatementError::invalid_argument(
                "name",
                "identifier cannot be empty",
            ));
        }
        if s.contains('\0') {
            return Err(StatementError::invalid_argument(
                "name",
                "identifier cannot contain NUL character",
            ));
        }

        let mut parts = Vec::new();
        let mut chars = s.chars().peekable();

        while chars.peek().is_some() {
            // Consume '.' between parts (but require there is a next part).
            if !parts.is_empty() {
                while chars.peek().is_some_and(|c| c.is_whitespace()) {
                    chars.next();
                }
                match chars.next() {
                    Some('.') => {
                        if chars.peek().is_none() {
                            return Err(StatementError::invalid_argument(
                                "name",
                                format!("trailing '.' in identifier '{s}'"),
                            ));
                        }
                    }
                    Some(c) => {
                        return Err(StatementError::invalid_argument(
                            "name",
                            format!("expected '.' between identifier parts, got '{c}'"),
                        ));
                    }
                    None => break,
                }
            }
            while chars.peek().is_some_and(|c| c.is_whitespace()) {
                chars.next();
            }

            // Quoted identifier part.
            if let Some(close) = chars.peek().copied().and_then(closing_quote_for) {
                chars.next();
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some(c) if c == close => {
                            if chars.peek() == Some(&close) {
                                chars.next();
                                name.push(close);
                            } else {
                                break;
                            }
                        }
                        Some(c) => name.push(c),
                        None => {
                            return Err(StatementError::invalid_argument(
                                "name",
                                format!("unclosed quoted identifier '{s}'"),
                            ));
                        }
                    }
                }
                if name.is_empty() {
                    return Err(StatementError::invalid_argument(
                        "name",
                        "empty quoted identifier",
                    ));
                }
                parts.push(name);
                continue;
            }

            // Unquoted identifier part.
            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if c == '.' {
                    break;
                }
                if is_quote_char(c) {
                    return Err(StatementError::invalid_argument(
                        "name",
                        format!("unexpected quote character '{c}' in identifier '{s}'"),
                    ));
                }
                name.push(c);
                chars.next();
            }
            let name = name.trim();
            if name.is_empty() {
                return Err(StatementError::invalid_argument(
                    "name",
                    format!("empty identifier segment in '{s}'"),
                ));
            }
            parts.push(name.to_string());
        }

        Ok(Self { parts })
    }

    /// Parse a single-part name (a column). Dots are kept as part of the name.
    pub fn single(s: &str) -> StatementResult<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(StatementError::invalid_argument(
                "name",
                "identifier cannot be empty",
            ));
        }
        if trimmed.contains('\0') {
            return Err(StatementError::invalid_argument(
                "name",
                "identifier cannot contain NUL character",
            ));
        }
        let name = unquote(trimmed).trim();
        if name.is_empty() {
            return Err(StatementError::invalid_argument(
                "name",
                "empty quoted identifier",
            ));
        }
        Ok(Self {
            parts: vec![name.to_string()],
        })
    }

    /// The unquoted parts, outermost first.
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// The last (object) part of the identifier.
    pub fn name(&self) -> &str {
        self.parts.last().map(String::as_str).unwrap_or_default()
    }

    /// Render the identifier with the dialect's quote characters.
    pub fn to_quoted(&self, setting: &DbSetting) -> String {
        let mut out = String::new();
        self.write_quoted(setting, &mut out);
        out
    }

    pub(crate) fn write_quoted(&self, setting: &DbSetting, out: &mut String) {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            write_quoted_part(part, setting, out);
        }
    }
}

/// Strip one level of surrounding quotes (any supported style) from a name.
pub(crate) fn unquote(name: &str) -> &str {
    let mut chars = name.chars();
    if let (Some(first), Some(last)) = (chars.next(), name.chars().last()) {
        if let Some(close) = closing_quote_for(first) {
            if last == close && name.len() >= 2 {
                return &name[first.len_utf8()..name.len() - last.len_utf8()];
            }
        }
    }
    name
}

/// Quote a single name part, doubling any embedded closing quote.
pub(crate) fn write_quoted_part(name: &str, setting: &DbSetting, out: &mut String) {
    out.push(setting.opening_quote);
    for ch in name.chars() {
        if ch == setting.closing_quote {
            out.push(ch);
        }
        out.push(ch);
    }
    out.push(setting.closing_quote);
}
