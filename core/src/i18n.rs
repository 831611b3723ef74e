//! Locale selection and message lookup.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::ShellError;

/// A locale tag such as `en`, `fr` or `pt-BR`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale(String);

impl Locale {
    pub fn parse(tag: &str) -> Result<Self, ShellError> {
        let tag = tag.trim();
        let valid = !tag.is_empty()
            && tag
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(ShellError::InvalidLocale(tag.to_string()));
        }
        Ok(Self(tag.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Locale {
    type Err = ShellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pick the startup locale: a valid stored tag first, then the platform's
/// preference, then `default`.
pub fn resolve_locale(
    stored: Option<&str>,
    platform: Option<&str>,
    default: &str,
) -> Result<Locale, ShellError> {
    stored
        .and_then(|t| Locale::parse(t).ok())
        .or_else(|| platform.and_then(|t| Locale::parse(t).ok()))
        .map_or_else(|| Locale::parse(default), Ok)
}

type Catalog = HashMap<String, String>;

/// Active locale plus the message catalogs it selects between.
#[derive(Debug, Clone)]
pub struct I18n {
    locale: Locale,
    fallback: Locale,
    catalogs: HashMap<Locale, Catalog>,
}

impl I18n {
    pub fn new(locale: Locale, fallback: Locale) -> Self {
        Self {
            locale,
            fallback,
            catalogs: HashMap::new(),
        }
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    pub fn fallback(&self) -> &Locale {
        &self.fallback
    }

    /// Returns whether the active locale actually changed.
    pub fn set_locale(&mut self, locale: Locale) -> bool {
        if locale == self.locale {
            return false;
        }
        self.locale = locale;
        true
    }

    /// Load a catalog from a JSON object. Nested objects become dotted keys
    /// (`{"poll":{"title":"..."}}` defines `poll.title`). Loading the same
    /// locale twice merges, later keys winning.
    pub fn add_catalog(&mut self, locale: Locale, json: &str) -> Result<(), ShellError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| ShellError::Catalog(e.to_string()))?;
        if !value.is_object() {
            return Err(ShellError::Catalog(format!("catalog for `{locale}` is not an object")));
        }
        let mut messages = Catalog::new();
        flatten_into(&mut messages, "", &value)?;
        self.catalogs.entry(locale).or_default().extend(messages);
        Ok(())
    }

    pub fn has_catalog(&self, locale: &Locale) -> bool {
        self.catalogs.contains_key(locale)
    }

    /// Message for `key` in the active locale, then the fallback locale;
    /// the key itself when neither has it.
    pub fn translate<'a>(&'a self, key: &'a str) -> &'a str {
        [&self.locale, &self.fallback]
            .into_iter()
            .find_map(|l| self.catalogs.get(l).and_then(|c| c.get(key)))
            .map_or(key, String::as_str)
    }
}

fn flatten_into(catalog: &mut Catalog, prefix: &str, value: &Value) -> Result<(), ShellError> {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                let key = if prefix.is_empty() {
                    k.clone()
                } else {
                    format!("{prefix}.{k}")
                };
                flatten_into(catalog, &key, v)?;
            }
            Ok(())
        }
        Value::String(s) => {
            catalog.insert(prefix.to_string(), s.clone());
            Ok(())
        }
        other => Err(ShellError::Catalog(format!(
            "message `{prefix}` must be a string, got {other}"
        ))),
    }
}
