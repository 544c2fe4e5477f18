//! Localization configuration

use serde::Deserialize;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct I18nConfig {
    /// Language used when a text is missing in the current language
    #[serde(default = "default_language")]
    pub default_language: String,

    /// Platform language tag (e.g. `ko-KR`), used when the user chose none
    pub system_language: Option<String>,

    /// Folder holding `{code}.json` text catalogs
    #[serde(default = "default_text_folder")]
    pub text_folder: String,
}

impl I18nConfig {
    /// Validate localization configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let code = &self.default_language;
        if code.len() != 2 || !code.chars().all(|c| c.is_ascii_lowercase()) {
            return Err(ValidationError::InvalidLanguageCode(code.clone()));
        }
        if self.text_folder.trim().is_empty() {
            return Err(ValidationError::MissingRequired("I18N__TEXT_FOLDER"));
        }
        Ok(())
    }
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            default_language: default_language(),
            system_language: None,
            text_folder: default_text_folder(),
        }
    }
}

fn default_language() -> String {
    "en".to_string()
}

fn default_text_folder() -> String {
    "assets/lang".to_string()
}
