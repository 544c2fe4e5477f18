//! Text catalog helpers.

use std::collections::HashMap;

/// Texts of one language, keyed by upper-cased text code.
pub type LanguageTexts = HashMap<String, String>;

/// Upper-cases every key of a freshly loaded text map.
///
/// When two keys differ only by case, the one that sorts last wins
/// (`home` over `Home` over `HOME`).
pub fn normalize_keys(texts: HashMap<String, String>) -> LanguageTexts {
    let mut entries: Vec<(String, String)> = texts.into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
        .into_iter()
        .map(|(k, v)| (k.to_uppercase(), v))
        .collect()
}

/// Replaces `#key` markers in `text` with the matching values.
///
/// Only the first occurrence of each marker is replaced.
pub fn patch_markers(text: &str, info: &[(&str, &str)]) -> String {
    let mut patched = text.to_string();
    for (key, value) in info {
        let marker = format!("#{}", key);
        patched = patched.replacen(&marker, value, 1);
    }
    patched
}

/// Returns the two-letter prefix of a language tag like `ko-KR`.
pub fn short_language_code(tag: &str) -> Option<String> {
    let code: String = tag.chars().take(2).collect();
    if code.chars().count() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(code.to_lowercase())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_keys_uppercases() {
        let texts = HashMap::from([
            ("home".to_string(), "Home".to_string()),
            ("CLOSE".to_string(), "Close".to_string()),
        ]);

        let normalized = normalize_keys(texts);

        assert_eq!(normalized.get("HOME").map(String::as_str), Some("Home"));
        assert_eq!(normalized.get("CLOSE").map(String::as_str), Some("Close"));
        assert!(!normalized.contains_key("home"));
    }

    #[test]
    fn normalize_keys_case_collision_is_deterministic() {
        for _ in 0..16 {
            let texts = HashMap::from([
                ("HOME".to_string(), "upper".to_string()),
                ("Home".to_string(), "title".to_string()),
                ("home".to_string(), "lower".to_string()),
            ]);

            let normalized = normalize_keys(texts);

            assert_eq!(normalized.len(), 1);
            assert_eq!(normalized.get("HOME").map(String::as_str), Some("lower"));
        }
    }

    #[test]
    fn patch_markers_replaces_first_occurrence() {
        let patched = patch_markers("Unknown #no (#no)", &[("no", "123")]);
        assert_eq!(patched, "Unknown 123 (#no)");
    }

    #[test]
    fn patch_markers_without_info_is_identity() {
        assert_eq!(patch_markers("Hello #name", &[]), "Hello #name");
    }

    #[test]
    fn short_language_code_takes_prefix() {
        assert_eq!(short_language_code("ko-KR").as_deref(), Some("ko"));
        assert_eq!(short_language_code("EN").as_deref(), Some("en"));
        assert_eq!(short_language_code("e").as_deref(), None);
        assert_eq!(short_language_code("").as_deref(), None);
    }
}
