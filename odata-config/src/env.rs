// Environment variable loading
//
// Custom formats are declared as `<PREFIX>_FORMAT_<ALIAS>=<content type>`,
// e.g. `ODATA_FORMAT_CSV=text/csv;charset=utf-8`. The alias is lowercased.

use crate::{ConfigError, FormatMappingEntry, Result};
use odata_core::ContentType;
use std::collections::BTreeMap;
use std::env;

/// Default variable prefix.
pub const DEFAULT_PREFIX: &str = "ODATA";

/// Environment variable loader
pub struct EnvLoader {
    prefix: String,
}

impl EnvLoader {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Format mappings declared in the process environment.
    pub fn format_mappings(&self) -> Result<Vec<FormatMappingEntry>> {
        self.mappings_from_pairs(env::vars())
    }

    /// Format mappings from `KEY=value` pairs.
    ///
    /// Keys are matched ignoring case; unrelated keys are skipped. Entries
    /// come back sorted by alias so the result does not depend on the
    /// iteration order of the source.
    pub fn mappings_from_pairs<I, K, V>(&self, pairs: I) -> Result<Vec<FormatMappingEntry>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut by_alias = BTreeMap::new();

        for (key, value) in pairs {
            let Some(rest) = self.strip_prefix(key.as_ref()) else {
                continue;
            };
            let Some(alias) = strip_prefix_ignore_case(rest, "FORMAT_") else {
                continue;
            };
            if alias.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "{} has no alias",
                    key.as_ref()
                )));
            }

            let content_type = ContentType::parse(value.as_ref())?;
            by_alias.insert(alias.to_lowercase(), content_type);
        }

        Ok(by_alias
            .into_iter()
            .map(|(alias, content_type)| FormatMappingEntry::new(alias, content_type))
            .collect())
    }

    fn strip_prefix<'k>(&self, key: &'k str) -> Option<&'k str> {
        strip_prefix_ignore_case(key, &self.prefix)?.strip_prefix('_')
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}
