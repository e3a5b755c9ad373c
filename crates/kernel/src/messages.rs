//! Localized message lookup keyed by message id and locale.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;

use crate::settings::I18nSettings;

/// Lookup capability for user-facing messages.
pub trait MessageSource: Send + Sync {
    /// Find the message for `key`, preferring `locale` when given.
    fn lookup(&self, key: &str, locale: Option<&str>) -> Option<String>;

    /// Like [`MessageSource::lookup`], but falls back to the key itself.
    fn message(&self, key: &str, locale: Option<&str>) -> String {
        self.lookup(key, locale).unwrap_or_else(|| {
            tracing::warn!(key, ?locale, "no message bundle entry");
            key.to_string()
        })
    }
}

/// Message source backed by per-locale key/value bundles.
///
/// Resolution order: the exact locale (`de-at`), its primary language (`de`),
/// then the default locale.
#[derive(Debug, Clone)]
pub struct BundleMessageSource {
    default_locale: String,
    bundles: HashMap<String, HashMap<String, String>>,
}

impl BundleMessageSource {
    pub fn new(default_locale: impl Into<String>) -> Self {
        Self {
            default_locale: normalize(&default_locale.into()),
            bundles: HashMap::new(),
        }
    }

    /// Merge entries into the bundle for `locale`, replacing existing keys.
    pub fn with_bundle<K, V>(
        mut self,
        locale: &str,
        entries: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let bundle = self.bundles.entry(normalize(locale)).or_default();
        bundle.extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Overlay `{locale}.toml` files found in `dir`. Each file is a flat table of
    /// message ids to text.
    pub fn with_bundle_dir(mut self, dir: &Path) -> anyhow::Result<Self> {
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("failed to read message bundle dir {}", dir.display()))?;

        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("toml") {
                continue;
            }
            let Some(locale) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };

            let messages: HashMap<String, String> = config::Config::builder()
                .add_source(config::File::from(path.as_path()))
                .build()
                .and_then(|cfg| cfg.try_deserialize())
                .with_context(|| format!("failed to load message bundle {}", path.display()))?;

            tracing::info!(locale, entries = messages.len(), "loaded message bundle");
            let locale = locale.to_string();
            self = self.with_bundle(&locale, messages);
        }

        Ok(self)
    }

    /// Apply configured overrides on top of the bundles registered so far.
    pub fn configure(self, settings: &I18nSettings) -> anyhow::Result<Self> {
        let mut source = self;
        source.default_locale = normalize(&settings.default_locale);
        match &settings.bundle_dir {
            Some(dir) => source.with_bundle_dir(dir),
            None => Ok(source),
        }
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    fn find(&self, locale: &str, key: &str) -> Option<&String> {
        self.bundles.get(locale).and_then(|bundle| bundle.get(key))
    }
}

impl MessageSource for BundleMessageSource {
    fn lookup(&self, key: &str, locale: Option<&str>) -> Option<String> {
        let requested = locale.map(normalize);

        requested
            .as_deref()
            .and_then(|locale| {
                self.find(locale, key).or_else(|| {
                    let language = locale.split('-').next().unwrap_or(locale);
                    self.find(language, key)
                })
            })
            .or_else(|| self.find(&self.default_locale, key))
            .cloned()
    }
}

fn normalize(locale: &str) -> String {
    locale.trim().replace('_', "-").to_ascii_lowercase()
}
