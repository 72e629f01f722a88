//! Command-line collaborator for the note store.
//!
//! # Responsibility
//! - Translate subcommands into note store commands.
//! - Render the derived view as plain text, one note per line.

use clap::Parser;
use cli::{CliConfig, Command};
use log::info;
use std::process::ExitCode;
use uuid::Uuid;
use worknote_core::config::{ENV_DOCUMENT_PATH, ENV_LOG_DIR, ENV_LOG_LEVEL};
use worknote_core::{
    core_version, init_logging, AccentColor, ConfigError, JsonFileStorage, Note, NoteEdit,
    NoteStatus, NoteStore, SortOrder, StoreConfig,
};

mod cli;

type Store = NoteStore<JsonFileStorage>;

fn main() -> ExitCode {
    let cli_config = CliConfig::parse();
    let config = match resolve_config(&cli_config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = init_logging(&config) {
        eprintln!("logging disabled: {err}");
    }

    match run(cli_config.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Flags win over environment variables.
fn resolve_config(cli_config: &CliConfig) -> Result<StoreConfig, ConfigError> {
    StoreConfig::from_lookup(|key| {
        let flag = match key {
            ENV_DOCUMENT_PATH => cli_config.document.as_deref().map(path_text),
            ENV_LOG_DIR => cli_config.log_dir.as_deref().map(path_text),
            ENV_LOG_LEVEL => cli_config.log_level.clone(),
            _ => None,
        };
        flag.or_else(|| std::env::var(key).ok())
    })
}

fn path_text(path: &std::path::Path) -> String {
    path.to_string_lossy().into_owned()
}

fn run(command: Command, config: &StoreConfig) -> Result<(), String> {
    let mut store = match command {
        Command::Version => {
            println!("worknote_core version={}", core_version());
            return Ok(());
        }
        _ => Store::from_config(config),
    };
    info!(
        "event=cli_start module=cli status=ok notes={}",
        store.len()
    );
    // A load failure still lets `new` overwrite the broken document.
    report_store_error(&store)?;

    match command {
        Command::List {
            search,
            favorites,
            sort,
        } => {
            let order = SortOrder::parse(&sort)
                .ok_or_else(|| format!("unknown sort order `{sort}`"))?;
            store.set_sort_order(order);
            store.set_favorites_only(favorites);
            if let Some(search) = search {
                store.set_search_text(search);
            }
            for note in store.derived_view() {
                println!("{}", render_row(note));
            }
        }
        Command::New { title, body } => {
            let note = store.create_with(NoteEdit {
                title,
                body,
                ..NoteEdit::default()
            });
            println!("{}", note.id);
        }
        Command::Edit {
            id,
            title,
            body,
            status,
            color,
        } => {
            let edit = NoteEdit {
                title,
                body,
                status: status.as_deref().map(parse_status).transpose()?,
                accent_color: color.as_deref().map(parse_color).transpose()?,
            };
            let note = store
                .edit(parse_id(&id)?, edit)
                .map_err(|err| err.to_string())?;
            println!("{}", render_row(&note));
        }
        Command::Show { id } => {
            let note = store
                .record_view(parse_id(&id)?)
                .map_err(|err| err.to_string())?;
            println!("{}", render_row(&note));
            if !note.body.is_empty() {
                println!();
                println!("{}", note.body);
            }
        }
        Command::Favorite { id } => {
            let note = store
                .toggle_favorite(parse_id(&id)?)
                .map_err(|err| err.to_string())?;
            println!("{}", render_row(&note));
        }
        Command::Delete { id } => {
            if !store.delete(parse_id(&id)?) {
                eprintln!("no note with id {id}");
            }
        }
        Command::Version => {}
    }

    report_store_error(&store)
}

fn report_store_error(store: &Store) -> Result<(), String> {
    match store.last_error() {
        Some(err) if err.is_write() => Err(err.to_string()),
        Some(err) => {
            eprintln!("warning: {err}");
            Ok(())
        }
        None => Ok(()),
    }
}

fn render_row(note: &Note) -> String {
    format!(
        "{} {} [{}|{}] {} (used {}x, updated {})",
        note.id,
        if note.is_favorite { "*" } else { " " },
        note.status.label(),
        note.accent_color.token(),
        note.title,
        note.usage_count,
        note.updated_at.format("%Y-%m-%d %H:%M"),
    )
}

fn parse_id(raw: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|err| format!("invalid note id `{raw}`: {err}"))
}

fn parse_status(raw: &str) -> Result<NoteStatus, String> {
    NoteStatus::parse_label(raw).ok_or_else(|| {
        format!("unknown status `{raw}`; expected draft|active|archived|completed")
    })
}

fn parse_color(raw: &str) -> Result<AccentColor, String> {
    AccentColor::parse_token(raw)
        .ok_or_else(|| format!("unknown color `{raw}`; expected black|blue|green|orange|pink"))
}

#[cfg(test)]
mod tests {
    use super::{parse_color, parse_id, parse_status, resolve_config};
    use crate::cli::CliConfig;
    use clap::Parser;
    use std::path::PathBuf;
    use worknote_core::{AccentColor, ConfigError, NoteStatus};

    #[test]
    fn parses_user_facing_names() {
        assert_eq!(parse_status("Archived"), Ok(NoteStatus::Archived));
        assert_eq!(parse_color("PINK"), Ok(AccentColor::Pink));
        assert!(parse_color("purple").is_err());
        assert!(parse_id("nope").is_err());
    }

    #[test]
    fn flags_override_environment_and_are_validated() {
        let cli = CliConfig::parse_from(["worknote", "--document", "/srv/notes.json", "list"]);
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.document_path, PathBuf::from("/srv/notes.json"));

        let cli = CliConfig::parse_from(["worknote", "--log-dir", "logs", "list"]);
        assert_eq!(
            resolve_config(&cli),
            Err(ConfigError::RelativeLogDir(PathBuf::from("logs")))
        );
    }
}
