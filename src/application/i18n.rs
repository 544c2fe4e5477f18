//! Translator: localized text lookup with language fallback.
//!
//! Lookup order for a text code (always upper-cased):
//!
//! 1. the current language, unless it is the default language
//! 2. the default language
//! 3. the code itself
//!
//! Catalogs are fetched once per language through the `TextSource` and kept
//! for the lifetime of the translator.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::I18nConfig;
use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};
use crate::domain::i18n::{normalize_keys, patch_markers, short_language_code, LanguageTexts};
use crate::ports::{KeyValueStore, TextSource};

/// Storage key of the user's chosen language.
pub const LANGUAGE_CODE_KEY: &str = "language_code";

struct TranslatorState {
    current: String,
    texts: HashMap<String, LanguageTexts>,
}

pub struct Translator {
    source: Arc<dyn TextSource>,
    store: Arc<dyn KeyValueStore>,
    default_language: String,
    system_language: Option<String>,
    state: RwLock<TranslatorState>,
}

impl Translator {
    pub fn new(
        source: Arc<dyn TextSource>,
        store: Arc<dyn KeyValueStore>,
        config: &I18nConfig,
    ) -> Self {
        Self {
            source,
            store,
            default_language: config.default_language.clone(),
            system_language: config.system_language.clone(),
            state: RwLock::new(TranslatorState {
                current: config.default_language.clone(),
                texts: HashMap::new(),
            }),
        }
    }

    pub async fn current_language(&self) -> String {
        self.state.read().await.current.clone()
    }

    /// Language the user should see.
    ///
    /// The stored choice wins when it is a two-letter code, then the
    /// system language, then the default language.
    pub async fn user_language(&self) -> String {
        if let Some(stored) = self.stored_language().await {
            if stored.chars().count() == 2 {
                return stored;
            }
        }
        self.system_language
            .as_deref()
            .and_then(short_language_code)
            .unwrap_or_else(|| self.default_language.clone())
    }

    /// Persists `code` (when given) and loads it; otherwise loads the
    /// detected user language.
    pub async fn set_user_language(&self, code: Option<&str>) -> Result<(), DomainError> {
        let code = match code {
            Some(code) => {
                if code.is_empty() {
                    return Err(ValidationError::empty_field("language_code").into());
                }
                let encoded = serde_json::to_string(code).map_err(|e| {
                    DomainError::new(
                        ErrorCode::InternalError,
                        format!("Failed to encode language code: {}", e),
                    )
                })?;
                self.store.set(LANGUAGE_CODE_KEY, encoded).await?;
                code.to_string()
            }
            None => self.user_language().await,
        };
        self.load_language(&code).await
    }

    /// Makes `code` the current language and fetches its texts if needed.
    ///
    /// The language becomes current even when fetching fails, so lookups
    /// fall back to the default language.
    pub async fn load_language(&self, code: &str) -> Result<(), DomainError> {
        {
            let mut state = self.state.write().await;
            state.current = code.to_string();
            if state.texts.contains_key(code) {
                return Ok(());
            }
        }

        let raw = self.source.load(code).await.map_err(|e| {
            tracing::warn!(language = %code, error = %e, "Failed to load language texts");
            e
        })?;
        let texts = normalize_keys(raw);
        tracing::debug!(language = %code, texts = texts.len(), "Loaded language texts");

        self.state.write().await.texts.insert(code.to_string(), texts);
        Ok(())
    }

    /// Text for `code`, or `None` when no loaded language has it.
    pub async fn lookup(&self, code: &str) -> Option<String> {
        let code = code.to_uppercase();
        let state = self.state.read().await;

        let find = |language: &str| {
            state
                .texts
                .get(language)
                .and_then(|texts| texts.get(&code))
                .filter(|text| !text.is_empty())
                .cloned()
        };

        if state.current != self.default_language {
            if let Some(text) = find(&state.current) {
                return Some(text);
            }
        }
        find(&self.default_language)
    }

    /// Text for `code`, falling back to the upper-cased code itself.
    pub async fn text(&self, code: &str) -> String {
        match self.lookup(code).await {
            Some(text) => text,
            None => code.to_uppercase(),
        }
    }

    /// Text for `code` with `#key` markers replaced from `info`.
    pub async fn translate(&self, code: &str, info: &[(&str, &str)]) -> String {
        patch_markers(&self.text(code).await, info)
    }

    async fn stored_language(&self) -> Option<String> {
        match self.store.get(LANGUAGE_CODE_KEY).await {
            Ok(Some(raw)) => serde_json::from_str::<String>(&raw).ok(),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored language");
                None
            }
        }
    }
}
