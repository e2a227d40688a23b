//! Language filtering for practice
//!
//! Cards carry free-form language names ("Spanish", "spanish"). Filters and
//! the language list compare them case-insensitively.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::card::Flashcard;

const ALL: &str = "all";

/// Which cards a practice view shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LanguageFilter {
    #[default]
    All,
    /// Cards whose source or target language equals this one.
    Only(String),
}

impl LanguageFilter {
    /// `"all"` (any case) or a blank string selects every card.
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL) {
            LanguageFilter::All
        } else {
            LanguageFilter::Only(trimmed.to_string())
        }
    }

    pub fn matches(&self, card: &Flashcard) -> bool {
        match self {
            LanguageFilter::All => true,
            LanguageFilter::Only(language) => {
                let language = language.to_lowercase();
                card.source_lang.to_lowercase() == language
                    || card.target_lang.to_lowercase() == language
            }
        }
    }

    /// Cards from `cards` that pass the filter, order preserved.
    pub fn apply<'a>(&self, cards: impl IntoIterator<Item = &'a Flashcard>) -> Vec<Flashcard> {
        cards
            .into_iter()
            .filter(|card| self.matches(card))
            .cloned()
            .collect()
    }

    pub fn as_str(&self) -> &str {
        match self {
            LanguageFilter::All => ALL,
            LanguageFilter::Only(language) => language,
        }
    }
}

impl fmt::Display for LanguageFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Option<&str>> for LanguageFilter {
    fn from(language: Option<&str>) -> Self {
        language.map_or(LanguageFilter::All, LanguageFilter::parse)
    }
}

// Persisted as the bare string ("all" or the language name), the same shape
// the web front-end keeps under `selectedLanguage`.
impl Serialize for LanguageFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LanguageFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(LanguageFilter::parse(&s))
    }
}

/// Distinct languages across source and target of `cards`.
///
/// Deduplicated case-insensitively, keeping the first spelling seen, sorted.
pub fn available_languages<'a>(cards: impl IntoIterator<Item = &'a Flashcard>) -> Vec<String> {
    let mut seen: HashMap<String, String> = HashMap::new();
    for card in cards {
        for language in [&card.source_lang, &card.target_lang] {
            if language.is_empty() {
                continue;
            }
            seen.entry(language.to_lowercase())
                .or_insert_with(|| language.clone());
        }
    }

    let mut languages: Vec<String> = seen.into_values().collect();
    languages.sort();
    languages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::FlashcardBuilder;

    fn card(id: i64, from: &str, to: &str) -> Flashcard {
        FlashcardBuilder::new()
            .id(id)
            .source_lang(from)
            .target_lang(to)
            .build()
    }

    #[test]
    fn test_parse() {
        assert_eq!(LanguageFilter::parse("all"), LanguageFilter::All);
        assert_eq!(LanguageFilter::parse("ALL"), LanguageFilter::All);
        assert_eq!(LanguageFilter::parse("  "), LanguageFilter::All);
        assert_eq!(
            LanguageFilter::parse(" Spanish "),
            LanguageFilter::Only("Spanish".to_string())
        );
    }

    #[test]
    fn test_matches_source_or_target_case_insensitive() {
        let filter = LanguageFilter::parse("spanish");

        assert!(filter.matches(&card(1, "Spanish", "English")));
        assert!(filter.matches(&card(2, "English", "SPANISH")));
        assert!(!filter.matches(&card(3, "French", "English")));
        assert!(LanguageFilter::All.matches(&card(4, "French", "English")));
    }

    #[test]
    fn test_apply_preserves_order() {
        let cards = vec![
            card(1, "Spanish", "English"),
            card(2, "French", "English"),
            card(3, "German", "Spanish"),
        ];
        let filtered = LanguageFilter::parse("Spanish").apply(&cards);

        let ids: Vec<i64> = filtered.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_available_languages_dedup_first_spelling() {
        let cards = vec![
            card(1, "Spanish", "English"),
            card(2, "spanish", "french"),
            card(3, "English", "German"),
        ];

        assert_eq!(
            available_languages(&cards),
            vec!["English", "German", "Spanish", "french"]
        );
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_value(LanguageFilter::Only("Spanish".into())).unwrap();
        assert_eq!(json, serde_json::json!("Spanish"));

        let filter: LanguageFilter = serde_json::from_value(serde_json::json!("all")).unwrap();
        assert_eq!(filter, LanguageFilter::All);
    }
}
