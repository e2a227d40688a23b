//! Subcommand execution.
//!
//! Commands run against any [`CardStore`] and [`Translator`] and write their
//! result to `out`, as text or as JSON when `--json` is set. Only `practice`
//! reads `input`.

use std::io::{BufRead, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use flashdeck_core::lifecycle::{self, PracticeOutcome};
use flashdeck_core::settings::keys;
use flashdeck_core::{
    migrate_legacy_data, CardId, CardStatus, CardStore, Collection, DeckSnapshot, Flashcard,
    LanguageFilter, MigrationOutcome, PracticeQueue, Settings, StoreError,
};
use flashdeck_translate::{TranslationRequest, Translator};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::cli::{Command, SettingAction};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::legacy_file::JsonFileLegacyStorage;

// Stored when no translation language has been chosen yet.
const UNSET_SOURCE_LANGUAGE: &str = "source";
const UNSET_TARGET_LANGUAGE: &str = "target";

/// Import legacy data if configured, then execute `command`.
///
/// `migrate` skips the bootstrap so it can report what it imported.
pub async fn run<S, T, R, W>(
    command: &Command,
    store: &S,
    translator: Option<&T>,
    config: &Config,
    input: &mut R,
    out: &mut W,
) -> Result<()>
where
    S: CardStore,
    T: Translator,
    R: BufRead,
    W: Write,
{
    if *command != Command::Migrate {
        if let Some(path) = &config.legacy_file {
            bootstrap(store, path).await?;
        }
    }

    execute(command, store, translator, config, input, out).await
}

// Malformed legacy data is logged and skipped here; `migrate` reports it.
async fn bootstrap<S: CardStore>(store: &S, path: &Path) -> Result<()> {
    let legacy = match JsonFileLegacyStorage::open(path) {
        Ok(legacy) => legacy,
        Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "legacy file not found, skipping migration");
            return Ok(());
        }
        Err(Error::Serialization(e)) => {
            warn!(
                path = %path.display(),
                error = %e,
                "legacy file is not a JSON object, skipping migration"
            );
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    match migrate_legacy_data(store, &legacy).await {
        Ok(MigrationOutcome::Migrated(report)) => {
            info!(imported = report.imported, "bootstrapped from legacy file");
        }
        Ok(MigrationOutcome::AlreadyMigrated) => {}
        Err(StoreError::Serialization(e)) => {
            warn!(
                path = %path.display(),
                error = %e,
                "malformed legacy data, skipping migration"
            );
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

pub async fn execute<S, T, R, W>(
    command: &Command,
    store: &S,
    translator: Option<&T>,
    config: &Config,
    input: &mut R,
    out: &mut W,
) -> Result<()>
where
    S: CardStore,
    T: Translator,
    R: BufRead,
    W: Write,
{
    let json = config.json;
    debug!(?command, "executing");
    match command {
        Command::List {
            collection,
            language,
        } => list(store, *collection, language.as_deref(), json, out).await,
        Command::Add {
            source,
            translated,
            from,
            to,
        } => {
            let card = Flashcard::new(source, translated, from, to);
            let card = lifecycle::add_card(store, card).await?;
            if json {
                emit(out, &card)
            } else {
                writeln!(out, "added {}", format_card(&card))?;
                Ok(())
            }
        }
        Command::Translate {
            text,
            from,
            to,
            save,
        } => {
            let translator = translator.ok_or_else(|| {
                Error::Config("no API key; set GOOGLE_TRANSLATE_API_KEY".to_string())
            })?;
            translate(store, translator, text, from.as_deref(), to.as_deref(), *save, json, out)
                .await
        }
        Command::Mark { id, destination } => {
            let card = find_card(store, *id).await?;
            let stored = lifecycle::move_card(store, &card, *destination).await?;
            if json {
                emit(out, &stored)
            } else {
                writeln!(out, "card {} moved to {}", id, short_name(*destination))?;
                Ok(())
            }
        }
        Command::Delete { id } => {
            let deleted = lifecycle::delete_card(store, *id).await?;
            if json {
                emit(out, &json!({ "id": id, "deleted": deleted }))
            } else if deleted {
                writeln!(out, "deleted card {}", id)?;
                Ok(())
            } else {
                writeln!(out, "no card {}", id)?;
                Ok(())
            }
        }
        Command::Reset => {
            let deck = lifecycle::reset_all(store).await?;
            if json {
                emit(out, &deck)
            } else {
                writeln!(out, "{} cards back in practice", deck.active.len())?;
                Ok(())
            }
        }
        Command::PracticeUnknown { language } => {
            let filter = match language {
                Some(language) => LanguageFilter::parse(language),
                None => Settings::new(store).selected_language().await?,
            };
            let outcome = lifecycle::practice_unknown(store, &filter).await?;
            if json {
                let cards: &[Flashcard] = match &outcome {
                    PracticeOutcome::Moved(cards) => cards.as_slice(),
                    PracticeOutcome::NothingToDo => &[],
                };
                return emit(out, &json!({ "moved": outcome.moved(), "cards": cards }));
            }
            match outcome {
                PracticeOutcome::Moved(cards) => {
                    writeln!(out, "{} unknown cards back in practice ({})", cards.len(), filter)?
                }
                PracticeOutcome::NothingToDo => {
                    writeln!(out, "no unknown cards to practice ({})", filter)?
                }
            }
            Ok(())
        }
        Command::Practice { language, shuffle } => {
            let filter = match language {
                Some(language) => LanguageFilter::parse(language),
                None => Settings::new(store).selected_language().await?,
            };
            practice(store, filter, *shuffle, json, input, out).await
        }
        Command::Languages => {
            let languages = lifecycle::snapshot(store).await?.languages();
            if json {
                return emit(out, &languages);
            }
            for language in languages {
                writeln!(out, "{}", language)?;
            }
            Ok(())
        }
        Command::Setting { action } => setting(store, action, out).await,
        Command::Migrate => {
            let path = config.legacy_file.as_deref().ok_or_else(|| {
                Error::Config("migrate needs a legacy file; pass --legacy-file".to_string())
            })?;
            migrate(store, path, json, out).await
        }
    }
}

async fn migrate<S, W>(store: &S, path: &Path, json: bool, out: &mut W) -> Result<()>
where
    S: CardStore,
    W: Write,
{
    let legacy = JsonFileLegacyStorage::open(path)?;
    let outcome = migrate_legacy_data(store, &legacy).await?;

    match (outcome, json) {
        (MigrationOutcome::AlreadyMigrated, true) => emit(out, &json!({ "migrated": false })),
        (MigrationOutcome::AlreadyMigrated, false) => {
            writeln!(out, "legacy data already migrated")?;
            Ok(())
        }
        (MigrationOutcome::Migrated(report), true) => emit(
            out,
            &json!({
                "migrated": true,
                "imported": report.imported,
                "skipped": report.skipped,
                "selectedLanguage": report.selected_language,
            }),
        ),
        (MigrationOutcome::Migrated(report), false) => {
            writeln!(
                out,
                "imported {} cards, skipped {} already stored",
                report.imported, report.skipped
            )?;
            Ok(())
        }
    }
}

async fn list<S, W>(
    store: &S,
    collection: Option<Collection>,
    language: Option<&str>,
    json: bool,
    out: &mut W,
) -> Result<()>
where
    S: CardStore,
    W: Write,
{
    let filter = LanguageFilter::from(language);
    let deck = lifecycle::snapshot(store).await?;
    let deck = DeckSnapshot {
        active: filter.apply(&deck.active),
        known: filter.apply(&deck.known),
        unknown: filter.apply(&deck.unknown),
    };

    if json {
        return match collection {
            Some(collection) => emit(out, deck.cards(collection)),
            None => emit(out, &deck),
        };
    }

    let shown = collection.map_or(Collection::ALL.to_vec(), |c| vec![c]);
    for collection in shown {
        let cards = deck.cards(collection);
        writeln!(out, "{} ({})", short_name(collection), cards.len())?;
        for card in cards {
            writeln!(out, "  {}", format_card(card))?;
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn translate<S, T, W>(
    store: &S,
    translator: &T,
    text: &str,
    from: Option<&str>,
    to: Option<&str>,
    save: bool,
    json: bool,
    out: &mut W,
) -> Result<()>
where
    S: CardStore,
    T: Translator,
    W: Write,
{
    let settings = Settings::new(store);
    let source = match from {
        Some(code) => code.to_string(),
        None => settings.source_language().await?,
    };
    let target = match to {
        Some(code) => code.to_string(),
        None => settings.target_language().await?,
    };
    if source == UNSET_SOURCE_LANGUAGE {
        return Err(Error::Config("no source language; pass --from".to_string()));
    }
    if target == UNSET_TARGET_LANGUAGE {
        return Err(Error::Config("no target language; pass --to".to_string()));
    }

    let request = TranslationRequest::new(text, &source, &target);
    let translation = translator.translate(&request).await?;
    settings.set_source_language(&source).await?;
    settings.set_target_language(&target).await?;

    let card = if save {
        let card = Flashcard::new(text.trim(), &translation.translated_text, &source, &target);
        Some(lifecycle::add_card(store, card).await?)
    } else {
        None
    };

    if json {
        return emit(
            out,
            &json!({ "translatedText": translation.translated_text, "card": card }),
        );
    }
    writeln!(out, "{}", translation.translated_text)?;
    if let Some(card) = card {
        writeln!(out, "saved as card {}", card.id)?;
    }
    Ok(())
}

async fn practice<S, R, W>(
    store: &S,
    filter: LanguageFilter,
    shuffle: bool,
    json: bool,
    input: &mut R,
    out: &mut W,
) -> Result<()>
where
    S: CardStore,
    R: BufRead,
    W: Write,
{
    let active = store.get_all(Collection::Active).await?;
    let mut queue = PracticeQueue::new(&active, filter);
    if shuffle {
        queue.shuffle(&mut StdRng::seed_from_u64(clock_seed()));
    }

    let (mut known, mut unknown) = (0usize, 0usize);
    let mut line = String::new();
    while let Some(card) = queue.current().cloned() {
        if !json {
            write!(
                out,
                "[{}/{}] {}  ({} -> {})\n> ",
                queue.position() + 1,
                queue.len(),
                card.source_text,
                card.source_lang,
                card.target_lang
            )?;
            out.flush()?;
        }

        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let status = match line.trim() {
            "k" | "known" => CardStatus::Known,
            "u" | "unknown" => CardStatus::Unknown,
            "" | "n" | "next" => {
                queue.next();
                continue;
            }
            "p" | "previous" => {
                queue.previous();
                continue;
            }
            "q" | "quit" => break,
            _ => {
                if !json {
                    writeln!(out, "k known, u unknown, n next, p previous, q quit")?;
                }
                continue;
            }
        };

        queue.mark_current(store, status).await?;
        match status {
            CardStatus::Known => known += 1,
            CardStatus::Unknown => unknown += 1,
        }
        if !json {
            writeln!(out, "  {} ({})", card.translated_text, status)?;
        }
    }

    if json {
        return emit(
            out,
            &json!({ "known": known, "unknown": unknown, "remaining": queue.len() }),
        );
    }
    writeln!(
        out,
        "{} known, {} unknown, {} left ({})",
        known,
        unknown,
        queue.len(),
        queue.filter()
    )?;
    Ok(())
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

async fn setting<S, W>(store: &S, action: &SettingAction, out: &mut W) -> Result<()>
where
    S: CardStore,
    W: Write,
{
    let settings = Settings::new(store);
    match action {
        SettingAction::Get { key, default } => {
            let default: Value = serde_json::from_str(default)?;
            let value = settings.get_or_init_value(key, default).await?;
            writeln!(out, "{}", value)?;
        }
        SettingAction::Set { key, value } => {
            if key == keys::LEGACY_MIGRATED {
                warn!("overwriting the legacy migration gate");
            }
            let value: Value = serde_json::from_str(value)?;
            settings.save(key, &value).await?;
        }
    }
    Ok(())
}

async fn find_card<S: CardStore>(store: &S, id: CardId) -> Result<Flashcard> {
    for collection in Collection::ALL {
        if let Some(card) = store.get(collection, id).await? {
            return Ok(card);
        }
    }
    Err(Error::CardNotFound(id))
}

fn emit<W: Write, V: Serialize + ?Sized>(out: &mut W, value: &V) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn format_card(card: &Flashcard) -> String {
    format!(
        "{}  {} -> {}  [{} -> {}]",
        card.id, card.source_text, card.translated_text, card.source_lang, card.target_lang
    )
}

fn short_name(collection: Collection) -> &'static str {
    match collection {
        Collection::Active => "active",
        Collection::Known => "known",
        Collection::Unknown => "unknown",
    }
}
