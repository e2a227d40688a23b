//! flashdeck - translate snippets and drill them as flashcards
//!
//! Usage:
//!     flashdeck translate "hola amigo" --from es --to en --save
//!     flashdeck list --collection active
//!     flashdeck mark 1712345678901 known
//!     flashdeck practice --language Spanish --shuffle

use clap::Parser;
use flashdeck::{commands, logging, Cli, Config};
use flashdeck_core::StoreError;
use flashdeck_sqlite::SqliteStore;
use tracing::debug;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_with_filter(&cli.log_level);

    let config = Config::from_cli(&cli)?;
    debug!(db = %config.db_path.display(), "opening card store");
    let store = SqliteStore::open(&config.db_path).map_err(StoreError::from)?;
    let translator = config.translator()?;

    let mut stdin = std::io::stdin().lock();
    let mut stdout = std::io::stdout().lock();
    commands::run(
        &cli.command,
        &store,
        translator.as_ref(),
        &config,
        &mut stdin,
        &mut stdout,
    )
    .await?;
    Ok(())
}
