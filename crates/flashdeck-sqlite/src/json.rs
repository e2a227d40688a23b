//! Column conversion helpers
//!
//! Card rows map onto plain columns; the status column holds the lowercase
//! status name or NULL. Setting values are stored as JSON text.

use flashdeck_core::card::{CardStatus, Flashcard};
use rusqlite::Row;
use serde_json::Value;

use crate::error::{Result, SqliteError};

/// Column list shared by every card query, in [`card_from_row`] order.
pub const CARD_COLUMNS: &str = "id, source_text, translated_text, source_lang, target_lang, status";

pub fn status_to_sql(status: Option<CardStatus>) -> Option<&'static str> {
    status.map(CardStatus::as_str)
}

pub fn status_from_sql(status: Option<String>) -> Result<Option<CardStatus>> {
    match status.as_deref() {
        None => Ok(None),
        Some("known") => Ok(Some(CardStatus::Known)),
        Some("unknown") => Ok(Some(CardStatus::Unknown)),
        Some(other) => Err(SqliteError::InvalidStatus(other.to_string())),
    }
}

/// Read a card from a row selected with [`CARD_COLUMNS`].
pub fn card_from_row(row: &Row<'_>) -> Result<Flashcard> {
    Ok(Flashcard {
        id: row.get(0)?,
        source_text: row.get(1)?,
        translated_text: row.get(2)?,
        source_lang: row.get(3)?,
        target_lang: row.get(4)?,
        status: status_from_sql(row.get(5)?)?,
    })
}

pub fn serialize_value(value: &Value) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

pub fn deserialize_value(json: &str) -> Result<Value> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_round_trip() {
        assert_eq!(status_to_sql(Some(CardStatus::Known)), Some("known"));
        assert_eq!(status_to_sql(None), None);
        assert_eq!(
            status_from_sql(Some("unknown".to_string())).unwrap(),
            Some(CardStatus::Unknown)
        );
        assert_eq!(status_from_sql(None).unwrap(), None);
    }

    #[test]
    fn test_invalid_status() {
        let result = status_from_sql(Some("learning".to_string()));
        assert!(matches!(result, Err(SqliteError::InvalidStatus(s)) if s == "learning"));
    }

    #[test]
    fn test_value_text() {
        let json = serialize_value(&json!({"a": [1, 2]})).unwrap();
        assert_eq!(json, r#"{"a":[1,2]}"#);
        assert_eq!(deserialize_value("false").unwrap(), json!(false));
    }
}
