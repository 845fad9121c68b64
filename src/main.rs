mod cli;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Context};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hquiz::app::App;
use hquiz::cache::{Cache, DirCache};
use hquiz::config::{Config, LogTarget, Settings};
use hquiz::editor::{self, PresetDialog, ZenityDialog};
use hquiz::gateway::{serialize_document, DialogOutcome, FileDialog, MenuCommand, PersistenceGateway};
use hquiz::model::{Questionnaire, DEFAULT_TITLE};
use hquiz::persist::{CacheProgressStore, ProgressStore};
use hquiz::state::Presenter;
use hquiz::timer::format_duration;
use hquiz::validate::parse_document;

use crate::cli::{Cli, Command};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Log to stderr, or to a file in the cache directory while the terminal
/// UI owns the screen.
fn init_tracing(config: &Config, to_file: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "hquiz=info".into()),
    );

    match config.log_target(to_file) {
        LogTarget::File(file) => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init(),
        LogTarget::Stderr => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogTarget::ErrorsToStderr(e) => {
            eprintln!(
                "Warning: cannot open log file {}: {}; only errors will be logged",
                config.log_file().display(),
                e
            );
            tracing_subscriber::registry()
                .with(tracing_subscriber::EnvFilter::new("hquiz=error"))
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::resolve(cli.cache_dir.clone());

    let interactive = matches!(cli.command, Command::Present { .. } | Command::Edit { .. });
    init_tracing(&config, interactive);

    let cache: Arc<dyn Cache> = Arc::new(
        DirCache::open(&config.cache_dir).context("cannot open the local cache")?,
    );

    match cli.command {
        Command::Present { file } => present(cache, &config, file),
        Command::Edit { file } => edit(cache, &config, file),
        Command::New { file, title } => create(cache, file, title),
        Command::Import { file } => import(cache, &file),
        Command::Export { output } => export(cache, output),
        Command::Validate { file } => validate(&file),
        Command::Status => status(cache),
        Command::History => history(cache),
        Command::Reset => reset(cache),
    }
}

fn cached_document<D: FileDialog>(gateway: &mut PersistenceGateway<D>) -> anyhow::Result<Questionnaire> {
    match gateway.restore_cached() {
        Some(doc) => Ok(doc.clone()),
        None => bail!("no questionnaire loaded; pass a file or run `hquiz import <file>`"),
    }
}

fn present(cache: Arc<dyn Cache>, config: &Config, file: Option<PathBuf>) -> anyhow::Result<()> {
    let mut gateway = PersistenceGateway::new(ZenityDialog, Arc::clone(&cache));
    let doc = match file {
        Some(path) => gateway.open_path(&path)?.clone(),
        None => cached_document(&mut gateway)?,
    };

    let store: Arc<dyn ProgressStore> = Arc::new(CacheProgressStore::new(cache));
    let presenter = Presenter::new(doc, store);
    let settings_file = config.settings_file();
    let app = App::new(presenter).with_settings(Settings::load(&settings_file), settings_file);
    hquiz::tui::run_tui(app).context("terminal error")?;
    Ok(())
}

fn edit(cache: Arc<dyn Cache>, config: &Config, file: Option<PathBuf>) -> anyhow::Result<()> {
    let mut gateway = PersistenceGateway::new(PresetDialog::new(file.clone()), cache);
    let doc = match &file {
        Some(path) if path.exists() => gateway.open_path(path)?.clone(),
        Some(_) => gateway.new_document(DEFAULT_TITLE).clone(),
        None => match gateway.restore_cached() {
            Some(doc) => doc.clone(),
            None => gateway.new_document(DEFAULT_TITLE).clone(),
        },
    };

    let original = serialize_document(&doc)?;
    let edited = editor::open_editor(&config.editor, &original)
        .with_context(|| format!("cannot edit with '{}'", config.editor))?;
    if edited.trim() == original.trim() {
        eprintln!("No changes.");
        return Ok(());
    }

    gateway.import(&edited)?;
    if gateway.active_path().is_none() && file.is_some() {
        gateway.handle(MenuCommand::Save)?;
    }

    match gateway.active_path() {
        Some(path) => eprintln!("Saved {}", path.display()),
        None => eprintln!("Saved to the local cache."),
    }
    Ok(())
}

fn create(cache: Arc<dyn Cache>, file: PathBuf, title: Option<String>) -> anyhow::Result<()> {
    let mut gateway = PersistenceGateway::new(PresetDialog::new(Some(file)), cache);
    gateway.new_document(title.as_deref().unwrap_or(DEFAULT_TITLE));
    match gateway.handle(MenuCommand::SaveAs)? {
        DialogOutcome::Completed(()) => {
            if let Some(path) = gateway.active_path() {
                eprintln!("Created {}", path.display());
            }
        }
        DialogOutcome::Canceled => eprintln!("Canceled."),
    }
    Ok(())
}

fn import(cache: Arc<dyn Cache>, file: &Path) -> anyhow::Result<()> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("cannot read {}", file.display()))?;
    let mut gateway = PersistenceGateway::new(PresetDialog::default(), cache);
    gateway.import(&content)?;
    if let Some(doc) = gateway.document() {
        eprintln!("Imported '{}' ({} questions)", doc.title, doc.questions.len());
    }
    Ok(())
}

fn export(cache: Arc<dyn Cache>, output: Option<PathBuf>) -> anyhow::Result<()> {
    let mut gateway = PersistenceGateway::new(PresetDialog::default(), cache);
    let doc = cached_document(&mut gateway)?;
    let exported = gateway.export(&doc)?;
    let path = output.unwrap_or_else(|| PathBuf::from(&exported.file_name));
    fs::write(&path, &exported.content)
        .with_context(|| format!("cannot export to {}", path.display()))?;
    eprintln!("Questionnaire exported to {}", path.display());
    Ok(())
}

fn validate(file: &Path) -> anyhow::Result<()> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("cannot read {}", file.display()))?;
    let doc = parse_document(&content)?;
    println!("{}: OK", file.display());
    println!("  Title: {}", doc.title);
    println!("  Questions: {}", doc.questions.len());
    Ok(())
}

fn status(cache: Arc<dyn Cache>) -> anyhow::Result<()> {
    let mut gateway = PersistenceGateway::new(PresetDialog::default(), Arc::clone(&cache));
    let doc = cached_document(&mut gateway)?;
    let store = CacheProgressStore::new(cache);

    println!("Questionnaire: {}", doc.title);
    println!("Questions: {}", doc.questions.len());
    match store.load() {
        Some(progress) if progress.tracks(&doc) => {
            let summary = progress.summary();
            println!("Session: {}", progress.session_id);
            println!("Started: {}", progress.started_at.to_rfc3339());
            println!(
                "  Answered: {}/{}, Correct: {}, Wrong: {}, Time: {}",
                summary.answered,
                summary.total,
                summary.correct,
                summary.wrong(),
                format_duration(summary.time_spent)
            );
            if progress.completed {
                println!("  Completed");
            }
        }
        Some(_) => println!("Session: stored session belongs to another questionnaire"),
        None => println!("Session: none"),
    }
    Ok(())
}

fn history(cache: Arc<dyn Cache>) -> anyhow::Result<()> {
    let store = CacheProgressStore::new(cache);
    let entries = store.list_history();
    if entries.is_empty() {
        println!("No archived sessions.");
        return Ok(());
    }
    for (i, entry) in entries.iter().enumerate() {
        let summary = entry.session.summary();
        println!(
            "{:>2}. {}  {}/{} answered, {} correct, {}",
            i + 1,
            entry.completed_at.format("%Y-%m-%d %H:%M"),
            summary.answered,
            summary.total,
            summary.correct,
            format_duration(summary.time_spent)
        );
    }
    Ok(())
}

fn reset(cache: Arc<dyn Cache>) -> anyhow::Result<()> {
    let mut gateway = PersistenceGateway::new(PresetDialog::default(), Arc::clone(&cache));
    let doc = cached_document(&mut gateway)?;
    let store: Arc<dyn ProgressStore> = Arc::new(CacheProgressStore::new(cache));

    let mut presenter = Presenter::new(doc, store);
    let archived = presenter.progress().has_answers();
    presenter.reset_session()?;
    if archived {
        eprintln!("Session archived to history and restarted.");
    } else {
        eprintln!("Session restarted.");
    }
    Ok(())
}
