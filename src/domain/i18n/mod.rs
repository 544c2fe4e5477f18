//! i18n module - pure helpers for localized text catalogs.

mod texts;

pub use texts::{normalize_keys, patch_markers, short_language_code, LanguageTexts};
