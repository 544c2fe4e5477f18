//! TextSource port - Fetches the text catalog of a language.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::domain::foundation::DomainError;

/// Loads localized texts for a language code like `en` or `ko`.
#[async_trait]
pub trait TextSource: Send + Sync {
    /// Returns the raw texts of `language`, keyed by text code.
    ///
    /// Fails with `ErrorCode::LanguageNotFound` if the language has no
    /// catalog and `ErrorCode::TextSourceError` if it cannot be read.
    async fn load(&self, language: &str) -> Result<HashMap<String, String>, DomainError>;
}
