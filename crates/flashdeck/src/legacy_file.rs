//! Legacy key/value data exported to a JSON file.
//!
//! The file is one JSON object mirroring the old browser storage, e.g.
//! `{"flashcards": "[...]", "selectedLanguage": "Spanish"}`. Values are
//! normally strings holding JSON, exactly as the browser stored them; a
//! non-string value is taken as already-parsed and re-encoded.

use std::collections::HashMap;
use std::path::Path;

use flashdeck_core::{LegacyStorage, StoreResult};
use serde_json::Value;
use tracing::debug;

use crate::error::Result;

#[derive(Debug, Clone, Default)]
pub struct JsonFileLegacyStorage {
    items: HashMap<String, Value>,
}

impl JsonFileLegacyStorage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let items: HashMap<String, Value> = serde_json::from_str(&contents)?;
        debug!(path = %path.display(), keys = items.len(), "loaded legacy file");
        Ok(Self { items })
    }
}

impl LegacyStorage for JsonFileLegacyStorage {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.items.get(key).map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_and_inline_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.json");
        std::fs::write(
            &path,
            r#"{"selectedLanguage":"Spanish","knownCards":[{"id":1}],"flashcards":"[]"}"#,
        )
        .unwrap();

        let legacy = JsonFileLegacyStorage::open(&path).unwrap();
        assert_eq!(
            legacy.get_item("selectedLanguage").unwrap().as_deref(),
            Some("Spanish")
        );
        assert_eq!(
            legacy.get_item("knownCards").unwrap().as_deref(),
            Some(r#"[{"id":1}]"#)
        );
        assert_eq!(legacy.get_item("flashcards").unwrap().as_deref(), Some("[]"));
        assert_eq!(legacy.get_item("unknownCards").unwrap(), None);
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(JsonFileLegacyStorage::open(dir.path().join("absent.json")).is_err());
    }
}
