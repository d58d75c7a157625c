use std::collections::{HashMap, HashSet};
use std::sync::{Arc, LazyLock, RwLock};

use gpui::SharedString;
use rust_embed::RustEmbed;

const DEFAULT_LOCALE: &str = "en";

#[derive(RustEmbed)]
#[folder = "locales/"]
struct LocaleAssets;

static CATALOG: LazyLock<I18nCatalog> = LazyLock::new(I18nCatalog::load);

#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub enum Locale {
    #[default]
    System,
    Tag(String),
}

impl From<String> for Locale {
    fn from(value: String) -> Self {
        if value.trim().eq_ignore_ascii_case("system") {
            return Self::System;
        }
        Self::Tag(value.trim().to_string())
    }
}

impl From<&str> for Locale {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

/// Localised placeholders, validation messages and chrome strings.
#[derive(Clone, Debug)]
pub struct I18nManager {
    catalog: &'static I18nCatalog,
    locale: Arc<RwLock<Locale>>,
}

impl Default for I18nManager {
    fn default() -> Self {
        Self::new()
    }
}

impl I18nManager {
    pub fn new() -> Self {
        Self::with_locale(Locale::System)
    }

    pub fn with_locale(locale: impl Into<Locale>) -> Self {
        Self {
            catalog: LazyLock::force(&CATALOG),
            locale: Arc::new(RwLock::new(locale.into())),
        }
    }

    pub fn locale(&self) -> Locale {
        match self.locale.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set_locale(&self, locale: impl Into<Locale>) {
        let mut current = match self.locale.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *current = locale.into();
    }

    pub fn default_locale(&self) -> &'static str {
        self.catalog.default_locale
    }

    pub fn resolved_locale(&self) -> &'static str {
        self.catalog
            .resolve_locale(self.requested_locale().as_deref())
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    pub fn t(&self, key: &str) -> SharedString {
        if let Some(value) = self.lookup(key) {
            value.into()
        } else {
            key.to_string().into()
        }
    }

    pub fn t_with(&self, key: &str, params: &[(&str, &str)]) -> SharedString {
        let template = self.lookup(key);
        if params.is_empty() {
            return self.t(key);
        }

        let raw = template.unwrap_or(key);
        format_template(raw, params).into()
    }

    fn requested_locale(&self) -> Option<String> {
        match self.locale() {
            Locale::System => system_locale(),
            Locale::Tag(tag) => Some(tag),
        }
    }

    fn lookup(&self, key: &str) -> Option<&'static str> {
        let resolved = self.resolved_locale();
        self.catalog
            .lookup(resolved, key)
            .or_else(|| self.catalog.lookup(self.catalog.default_locale, key))
    }
}

#[cfg(feature = "i18n")]
fn system_locale() -> Option<String> {
    sys_locale::get_locale()
}

#[cfg(not(feature = "i18n"))]
fn system_locale() -> Option<String> {
    None
}

#[derive(Debug)]
struct I18nCatalog {
    default_locale: &'static str,
    locales: HashMap<&'static str, HashMap<String, &'static str>>,
    normalized_locale_lookup: HashMap<String, &'static str>,
    language_lookup: HashMap<String, &'static str>,
}

impl I18nCatalog {
    fn load() -> Self {
        let mut locales = HashMap::new();
        let mut normalized_locale_lookup = HashMap::new();
        let mut language_lookup = HashMap::new();
        let mut ambiguous_languages = HashSet::new();

        for (locale, entries) in embedded_locales() {
            let normalized = normalize_locale_tag(locale);
            normalized_locale_lookup.insert(normalized.clone(), locale);

            let language = normalized.split('-').next().unwrap_or_default().to_string();
            if let Some(existing) = language_lookup.get(&language) {
                if *existing != locale {
                    ambiguous_languages.insert(language.clone());
                }
            } else {
                language_lookup.insert(language, locale);
            }

            locales.insert(locale, entries);
        }

        for language in ambiguous_languages {
            language_lookup.remove(&language);
        }

        if !locales.contains_key(DEFAULT_LOCALE) {
            tracing::warn!(
                target: "calmform::i18n",
                locale = DEFAULT_LOCALE,
                "default locale catalog missing"
            );
            locales.insert(DEFAULT_LOCALE, HashMap::new());
            normalized_locale_lookup.insert(normalize_locale_tag(DEFAULT_LOCALE), DEFAULT_LOCALE);
            language_lookup
                .entry(DEFAULT_LOCALE.to_string())
                .or_insert(DEFAULT_LOCALE);
        }

        Self {
            default_locale: DEFAULT_LOCALE,
            locales,
            normalized_locale_lookup,
            language_lookup,
        }
    }

    fn resolve_locale(&self, requested: Option<&str>) -> &'static str {
        let Some(requested) = requested else {
            return self.default_locale;
        };

        let normalized = normalize_locale_tag(requested);
        if let Some(locale) = self.normalized_locale_lookup.get(&normalized) {
            return locale;
        }

        let language = normalized.split('-').next().unwrap_or_default();
        if let Some(locale) = self.language_lookup.get(language) {
            return locale;
        }

        self.default_locale
    }

    fn lookup(&self, locale: &'static str, key: &str) -> Option<&'static str> {
        self.locales
            .get(locale)
            .and_then(|entries| entries.get(key).copied())
    }
}

/// Parses every embedded `locales/<tag>.toml` into flat dotted keys.
///
/// The catalog lives for the whole process, so its strings are leaked once.
fn embedded_locales() -> Vec<(&'static str, HashMap<String, &'static str>)> {
    let mut catalogs = Vec::new();
    for path in LocaleAssets::iter() {
        let Some(tag) = path.strip_suffix(".toml") else {
            continue;
        };
        let Some(file) = LocaleAssets::get(&path) else {
            continue;
        };
        let table = match std::str::from_utf8(&file.data)
            .map_err(|error| error.to_string())
            .and_then(|source| {
                toml::from_str::<toml::Table>(source).map_err(|error| error.to_string())
            })
        {
            Ok(table) => table,
            Err(error) => {
                tracing::warn!(
                    target: "calmform::i18n",
                    locale = tag,
                    %error,
                    "skipping unreadable locale catalog"
                );
                continue;
            }
        };

        let mut entries = HashMap::new();
        flatten_table("", &table, &mut entries);
        let tag: &'static str = Box::leak(tag.to_string().into_boxed_str());
        catalogs.push((tag, entries));
    }
    catalogs
}

fn flatten_table(prefix: &str, table: &toml::Table, out: &mut HashMap<String, &'static str>) {
    for (key, value) in table {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            toml::Value::String(text) => {
                out.insert(full_key, Box::leak(text.clone().into_boxed_str()));
            }
            toml::Value::Table(nested) => flatten_table(&full_key, nested, out),
            _ => {}
        }
    }
}

/// `fr_FR.UTF-8` and `fr-fr@euro` both become `fr-fr`.
fn normalize_locale_tag(tag: &str) -> String {
    let base = tag.trim().split(['.', '@']).next().unwrap_or_default();
    base.split(['-', '_'])
        .filter(|segment| !segment.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Substitutes `{name}` tokens; unknown tokens and a dangling `{` stay as written.
fn format_template(template: &str, params: &[(&str, &str)]) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        output.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            output.push_str(&rest[open..]);
            return output;
        };
        let name = &after[..close];
        match params.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => output.push_str(value),
            None => output.push_str(&rest[open..open + close + 2]),
        }
        rest = &after[close + 1..];
    }
    output.push_str(rest);
    output
}
