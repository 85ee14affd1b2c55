mod cli;
mod error;

use crate::cli::{Cli, Command};
use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use lifetracker_attachments::{AttachmentStore, SystemOpener};
use lifetracker_config::{AttachmentsConfig, Config};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::Subscriber;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;

fn main() -> ExitCode {
    let cli = Cli::parse();
    // Config decides the final log level, so loading it logs through a
    // provisional subscriber that only knows about -v and RUST_LOG.
    let bootstrap = subscriber(DEFAULT_LOG_LEVEL, cli.verbose, std::io::stderr);
    let loaded = tracing::subscriber::with_default(bootstrap, || Config::load(cli.config.as_deref()));
    let config = match loaded.or_raise(|| ErrorKind::Config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err:?}");
            return ExitCode::FAILURE;
        },
    };
    subscriber(&config.logging.level, cli.verbose, std::io::stderr).init();
    match run(cli, &config) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:?}");
            ExitCode::FAILURE
        },
    }
}

const DEFAULT_LOG_LEVEL: &str = "info";

/// `-v` flags win over `RUST_LOG`, which wins over `default_level`.
fn subscriber<W>(default_level: &str, verbose: u8, writer: W) -> impl Subscriber + Send + Sync + use<W>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(writer).finish()
}

fn open_store(config: &AttachmentsConfig, data_dir: Option<&Path>) -> Result<AttachmentStore> {
    let root = match data_dir {
        Some(dir) => dir.to_path_buf(),
        None => config.data_dir().or_raise(|| ErrorKind::Config)?,
    };
    let store = AttachmentStore::new(&root).or_raise(|| ErrorKind::Storage)?;
    Ok(match &config.opener {
        Some(opener) => {
            tracing::debug!(program = %opener.program.display(), "Using configured opener");
            store.with_opener(Arc::new(SystemOpener::with_command(&opener.program, &opener.args)))
        },
        None => store,
    })
}

fn run(cli: Cli, config: &Config) -> Result<ExitCode> {
    let store = open_store(&config.attachments, cli.data_dir.as_deref())?;
    let strict = cli.strict || config.attachments.strict;
    tracing::debug!(root = %store.root().display(), strict, "Attachment store ready");

    match cli.command {
        Command::Add { date, files } => add(&store, &date, &files, strict),
        Command::List { date } => {
            for attachment in store.list_files(&date).or_raise(|| ErrorKind::Storage)? {
                println!("{}  {}  {}", attachment.name, attachment.size_human, attachment.modified_display);
            }
            Ok(ExitCode::SUCCESS)
        },
        Command::Delete { date, name } => {
            if strict {
                store.try_delete_file(&date, &name).or_raise(|| ErrorKind::Delete(name.clone()))?;
            } else if !store.delete_file(&date, &name) {
                exn::bail!(ErrorKind::Delete(name));
            }
            Ok(ExitCode::SUCCESS)
        },
        Command::Open { date, name } => {
            if strict {
                store.try_open_attachment(&date, &name).or_raise(|| ErrorKind::NoSuchAttachment(name.clone()))?;
            } else if !store.open_attachment(&date, &name) {
                exn::bail!(ErrorKind::NoSuchAttachment(name));
            }
            Ok(ExitCode::SUCCESS)
        },
        Command::Folder { date } => {
            if strict {
                store.try_open_bucket_folder(&date).or_raise(|| ErrorKind::Storage)?;
            } else {
                store.open_bucket_folder(&date);
            }
            Ok(ExitCode::SUCCESS)
        },
    }
}

fn add(store: &AttachmentStore, date: &str, files: &[PathBuf], strict: bool) -> Result<ExitCode> {
    if !strict {
        for dest in store.add_files(date, files).or_raise(|| ErrorKind::Storage)? {
            println!("{}", dest.display());
        }
        return Ok(ExitCode::SUCCESS);
    }

    let outcome = store.add_files_detailed(date, files).or_raise(|| ErrorKind::Storage)?;
    for dest in &outcome.added {
        println!("{}", dest.display());
    }
    for skipped in &outcome.skipped {
        eprintln!("skipped {}: {}", skipped.source.display(), skipped.reason);
    }
    for failed in &outcome.failed {
        let hint = if failed.error.is_retryable() { " (may succeed if retried)" } else { "" };
        eprintln!("failed {}{hint}: {:?}", failed.source.display(), failed.error);
    }
    Ok(if outcome.is_complete() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
