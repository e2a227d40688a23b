//! Runtime configuration resolved from flags and environment.

use std::path::PathBuf;

use flashdeck_translate::GoogleTranslator;

use crate::cli::Cli;
use crate::error::{Error, Result};

const APP_DIR: &str = "flashdeck";
const DB_FILE: &str = "flashdeck.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub legacy_file: Option<PathBuf>,
    pub api_key: Option<String>,
    pub translate_url: Option<String>,
    pub json: bool,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let db_path = match &cli.db {
            Some(path) => path.clone(),
            None => default_db_path()?,
        };

        Ok(Self {
            db_path,
            legacy_file: cli.legacy_file.clone(),
            api_key: cli.api_key.clone().filter(|k| !k.trim().is_empty()),
            translate_url: cli.translate_url.clone(),
            json: cli.json,
        })
    }

    /// A translator when an API key is configured.
    pub fn translator(&self) -> Result<Option<GoogleTranslator>> {
        let Some(key) = &self.api_key else {
            return Ok(None);
        };

        let translator = GoogleTranslator::new(key.clone())?;
        Ok(Some(match &self.translate_url {
            Some(url) => translator.with_endpoint(url.clone()),
            None => translator,
        }))
    }
}

/// `<data dir>/flashdeck/flashdeck.db`
pub fn default_db_path() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR).join(DB_FILE))
        .ok_or_else(|| Error::Config("no data directory; pass --db".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_explicit_db_and_blank_key() {
        let cli = Cli::try_parse_from([
            "flashdeck",
            "--db",
            "cards.db",
            "--api-key",
            "  ",
            "reset",
        ])
        .unwrap();
        let config = Config::from_cli(&cli).unwrap();

        assert_eq!(config.db_path, PathBuf::from("cards.db"));
        assert_eq!(config.api_key, None);
        assert!(config.translator().unwrap().is_none());
    }

    #[test]
    fn test_translator_uses_endpoint_override() {
        let cli = Cli::try_parse_from([
            "flashdeck",
            "--db",
            "cards.db",
            "--api-key",
            "key",
            "--translate-url",
            "http://localhost:8080/v2",
            "languages",
        ])
        .unwrap();
        let translator = Config::from_cli(&cli).unwrap().translator().unwrap().unwrap();

        assert_eq!(translator.endpoint(), "http://localhost:8080/v2");
    }
}
