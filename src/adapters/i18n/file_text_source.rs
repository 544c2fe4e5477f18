//! File-backed text source.
//!
//! Reads one JSON object per language from a folder:
//!
//! ```text
//! {folder}/
//! ├── en.json   {"CLOSE": "Close", "home": "Home"}
//! └── ko.json   {"CLOSE": "닫기"}
//! ```
//!
//! Non-string JSON values are kept in their JSON text form.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::TextSource;

#[derive(Debug, Clone)]
pub struct FileTextSource {
    folder: PathBuf,
}

impl FileTextSource {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    /// Returns the catalog path for `language`.
    fn language_path(&self, language: &str) -> PathBuf {
        self.folder.join(format!("{}.json", language))
    }

    fn validate_language(language: &str) -> Result<(), DomainError> {
        let valid = !language.is_empty()
            && language
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(())
        } else {
            Err(DomainError::validation(
                "language",
                format!("Invalid language code '{}'", language),
            ))
        }
    }
}

#[async_trait]
impl TextSource for FileTextSource {
    async fn load(&self, language: &str) -> Result<HashMap<String, String>, DomainError> {
        Self::validate_language(language)?;
        let path = self.language_path(language);

        let content = fs::read_to_string(&path).await.map_err(|e| {
            let code = if e.kind() == ErrorKind::NotFound {
                ErrorCode::LanguageNotFound
            } else {
                ErrorCode::TextSourceError
            };
            DomainError::new(code, format!("Failed to read {}: {}", path.display(), e))
                .with_detail("language", language)
        })?;

        let parsed: HashMap<String, serde_json::Value> =
            serde_json::from_str(&content).map_err(|e| {
                DomainError::new(
                    ErrorCode::TextSourceError,
                    format!("Invalid text catalog {}: {}", path.display(), e),
                )
                .with_detail("language", language)
            })?;

        Ok(parsed
            .into_iter()
            .map(|(key, value)| {
                let text = match value {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, text)
            })
            .collect())
    }
}
