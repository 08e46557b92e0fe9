//! TOML configuration of a statement builder.
//!
//! ```toml
//! dialect = "sql_server"
//!
//! [options]
//! identity_insert = false
//! null_semantics = "null_not_equal"
//! merge_insert_threshold = 3
//!
//! [setting]
//! max_parameter_count = 2000
//! use_offset_fetch = false
//! ```
//!
//! Every table is optional; missing keys keep the dialect's defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dialect::Dialect;
use crate::error::{StatementError, StatementResult};
use crate::setting::{DbSetting, StatementOptions};
use crate::statement::StatementBuilder;

/// Built-in dialect selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialectName {
    SqlServer,
    Postgres,
    Mysql,
}

impl DialectName {
    pub fn dialect(self) -> Dialect {
        match self {
            DialectName::SqlServer => Dialect::sql_server(),
            DialectName::Postgres => Dialect::postgres(),
            DialectName::Mysql => Dialect::mysql(),
        }
    }
}

/// Partial overrides of the dialect's [`DbSetting`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingOverrides {
    pub parameter_prefix: Option<char>,
    pub max_parameter_count: Option<usize>,
    pub use_offset_fetch: Option<bool>,
    pub average_conversion_type: Option<String>,
    pub use_array_parameter_threshold: Option<usize>,
    pub use_in_values_threshold: Option<usize>,
    pub max_array_parameter_value_count: Option<usize>,
}

impl SettingOverrides {
    fn apply(&self, mut setting: DbSetting) -> DbSetting {
        if let Some(prefix) = self.parameter_prefix {
            setting.parameter_prefix = prefix;
        }
        if let Some(count) = self.max_parameter_count {
            setting.max_parameter_count = count;
        }
        if let Some(enabled) = self.use_offset_fetch {
            setting.use_offset_fetch = enabled;
        }
        if let Some(ty) = &self.average_conversion_type {
            setting.average_conversion_type = Some(ty.clone());
        }
        if let Some(threshold) = self.use_array_parameter_threshold {
            setting.use_array_parameter_threshold = Some(threshold);
        }
        if let Some(threshold) = self.use_in_values_threshold {
            setting.use_in_values_threshold = Some(threshold);
        }
        if let Some(count) = self.max_array_parameter_value_count {
            setting.max_array_parameter_value_count = Some(count);
        }
        setting
    }
}

/// A builder configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuilderConfig {
    pub dialect: DialectName,
    #[serde(default)]
    pub options: StatementOptions,
    #[serde(default)]
    pub setting: SettingOverrides,
}

impl BuilderConfig {
    pub fn new(dialect: DialectName) -> Self {
        Self {
            dialect,
            options: StatementOptions::default(),
            setting: SettingOverrides::default(),
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(raw: &str) -> StatementResult<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> StatementResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            StatementError::Config(format!(
                "failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml(&raw)
    }

    pub fn validate(&self) -> StatementResult<()> {
        if self.options.merge_insert_threshold == 0 {
            return Err(StatementError::Config(
                "options.merge_insert_threshold must be at least 1".to_string(),
            ));
        }
        if self.setting.max_parameter_count == Some(0) {
            return Err(StatementError::Config(
                "setting.max_parameter_count must be at least 1".to_string(),
            ));
        }
        if self.setting.max_array_parameter_value_count == Some(0) {
            return Err(StatementError::Config(
                "setting.max_array_parameter_value_count must be at least 1".to_string(),
            ));
        }
        if let Some(prefix) = self.setting.parameter_prefix {
            if prefix.is_alphanumeric() || prefix.is_whitespace() {
                return Err(StatementError::Config(format!(
                    "setting.parameter_prefix '{prefix}' is not a valid prefix"
                )));
            }
        }
        Ok(())
    }

    /// The dialect with the setting overrides applied.
    pub fn dialect(&self) -> Dialect {
        let dialect = self.dialect.dialect();
        let setting = self.setting.apply(dialect.setting().clone());
        dialect.with_setting(setting)
    }

    pub fn into_builder(self) -> StatementBuilder {
        StatementBuilder::new(self.dialect()).with_options(self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setting::NullSemantics;

    #[test]
    fn minimal_config() {
        let config = BuilderConfig::from_toml(r#"dialect = "postgres""#).unwrap();
        assert_eq!(config, BuilderConfig::new(DialectName::Postgres));
        assert_eq!(config.into_builder().dialect().name(), "PostgreSql");
    }

    #[test]
    fn full_config() {
        let raw = r#"
dialect = "sql_server"

[options]
identity_insert = true
null_semantics = "null_not_equal"
merge_insert_threshold = 10

[setting]
max_parameter_count = 2000
use_offset_fetch = false
"#;
        let builder = BuilderConfig::from_toml(raw).unwrap().into_builder();
        assert!(builder.options().identity_insert);
        assert_eq!(builder.options().null_semantics, NullSemantics::NullNotEqual);
        assert_eq!(builder.options().merge_insert_threshold, 10);
        assert_eq!(builder.setting().max_parameter_count, 2000);
        assert!(!builder.setting().use_offset_fetch);
        assert_eq!(builder.setting().opening_quote, '[');
    }

    #[test]
    fn partial_options_keep_defaults() {
        let raw = "dialect = \"mysql\"\n[options]\nidentity_insert = true\n";
        let config = BuilderConfig::from_toml(raw).unwrap();
        assert_eq!(config.options.merge_insert_threshold, 3);
        assert_eq!(config.options.null_semantics, NullSemantics::Ansi);
    }

    #[test]
    fn rejects_unknown_dialect() {
        let err = BuilderConfig::from_toml(r#"dialect = "oracle""#).unwrap_err();
        assert!(matches!(err, StatementError::Config(_)));
    }

    #[test]
    fn rejects_zero_limits() {
        let raw = "dialect = \"mysql\"\n[setting]\nmax_parameter_count = 0\n";
        assert!(BuilderConfig::from_toml(raw).is_err());

        let raw = "dialect = \"mysql\"\n[options]\nmerge_insert_threshold = 0\n";
        assert!(BuilderConfig::from_toml(raw).is_err());
    }

    #[test]
    fn list_thresholds() {
        let raw = "dialect = \"postgres\"\n[setting]\nuse_array_parameter_threshold = 100\nmax_array_parameter_value_count = 5000\n";
        let builder = BuilderConfig::from_toml(raw).unwrap().into_builder();
        assert_eq!(builder.setting().use_array_parameter_threshold, Some(100));
        assert_eq!(builder.setting().use_in_values_threshold, None);
        assert_eq!(builder.setting().max_array_parameter_value_count, Some(5000));

        let raw = "dialect = \"postgres\"\n[setting]\nmax_array_parameter_value_count = 0\n";
        assert!(BuilderConfig::from_toml(raw).is_err());
    }

    #[test]
    fn rejects_bad_prefix() {
        let raw = "dialect = \"postgres\"\n[setting]\nparameter_prefix = \"a\"\n";
        assert!(BuilderConfig::from_toml(raw).is_err());
    }
}
