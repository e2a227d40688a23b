//! flashdeck command-line front-end
//!
//! Drives the card lifecycle from `flashdeck-core` against a SQLite store,
//! with translation through `flashdeck-translate`. The binary in `main.rs`
//! only parses arguments and wires these modules together.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod legacy_file;
pub mod logging;

pub use cli::{Cli, Command, SettingAction};
pub use config::Config;
pub use error::{Error, Result};
pub use legacy_file::JsonFileLegacyStorage;
