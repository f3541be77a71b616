//! Application execution logic.
//!
//! This module runs one subcommand against the preference store kept in
//! the storage file.

use std::io::Write;

use thiserror::Error;

use cam_prefs::address::{AddressError, format_dotted_quad, parse_dotted_quad};
use cam_prefs::command::{CommandError, DispatchOutcome, Dispatcher};
use cam_prefs::config::{Command, ValidatedConfig};
use cam_prefs::namespace::{FileNamespace, Namespace};
use cam_prefs::prefs::{
    ConfigField, LoadOutcome, PrefsError, PrefsStore, StageOutcome, StageRejection,
};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// The preference section could not be opened.
    #[error("Preference storage unavailable: {reason}")]
    Unavailable {
        /// Reason reported by the namespace
        reason: String,
    },

    /// A staged value was refused.
    #[error("Rejected value for '{key}': {source}")]
    Rejected {
        /// Key as given on the command line
        key: String,
        /// Why the value was refused
        #[source]
        source: StageRejection,
    },

    /// The key names an administrative preference.
    #[error("'{0}' cannot be staged")]
    NotStageable(String),

    /// The key names no preference.
    #[error("Unknown preference key '{0}'")]
    UnknownKey(String),

    /// Writing preferences failed.
    #[error(transparent)]
    Prefs(#[from] PrefsError),

    /// A control request failed.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Address text could not be parsed.
    #[error("Invalid address: {0}")]
    Address(#[from] AddressError),

    /// Writing the report failed.
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Executes a subcommand.
///
/// `init` is handled by the caller before configuration is loaded and is a
/// no-op here.
///
/// # Errors
///
/// Returns an error if storage is unavailable, a value is refused, or
/// committing fails.
pub fn execute(
    config: ValidatedConfig,
    command: Command,
    out: &mut impl Write,
) -> Result<(), RunError> {
    if let Command::ParseAddress {
        text,
        separator,
        radix,
    } = &command
    {
        return parse_address(text, *separator, *radix, out);
    }

    tracing::debug!("Using storage file {}", config.storage_path.display());
    let namespace = FileNamespace::new(&config.storage_path);
    let store = PrefsStore::with_section(namespace, config.section, config.defaults);

    run_command(store, command, out)
}

/// Runs a storage-backed subcommand against `store`.
fn run_command<N: Namespace>(
    mut store: PrefsStore<N>,
    command: Command,
    out: &mut impl Write,
) -> Result<(), RunError> {
    let factory_reset = matches!(command, Command::Show { factory_reset: true });
    let outcome = store.load(factory_reset);
    if let LoadOutcome::Unavailable { reason } = &outcome {
        return Err(RunError::Unavailable {
            reason: reason.clone(),
        });
    }

    match command {
        Command::Init { .. } | Command::ParseAddress { .. } => Ok(()),
        Command::Show { .. } => show(&mut store, &outcome, out),
        Command::Set {
            assignments,
            dry_run,
        } => set(&mut store, &assignments, dry_run, out),
        Command::Request { targets } => request(store, &targets, out),
        Command::Write { key, value } => {
            store.update_single(&key, &value)?;
            writeln!(out, "{key} written")?;
            Ok(())
        }
    }
}

/// Prints the loaded preferences.
fn show<N: Namespace>(
    store: &mut PrefsStore<N>,
    outcome: &LoadOutcome,
    out: &mut impl Write,
) -> Result<(), RunError> {
    match outcome {
        LoadOutcome::Initialized { factory_reset } => {
            let reason = if *factory_reset {
                "factory reset"
            } else {
                "first boot"
            };
            writeln!(out, "Factory defaults written ({reason})")?;
        }
        LoadOutcome::DefaultsUnsaved { reason } => {
            writeln!(out, "Factory defaults in use but not saved: {reason}")?;
        }
        LoadOutcome::Loaded | LoadOutcome::Unavailable { .. } => {}
    }

    write!(out, "{}", store.snapshot())?;

    let network = store.network_config();
    if network.has_static_ip() {
        writeln!(out, "Static addressing is usable")?;
    } else {
        writeln!(out, "Static addressing is incomplete")?;
    }
    Ok(())
}

/// Stages every assignment, then commits unless `dry_run` is set.
///
/// Nothing is written if any assignment is refused.
fn set<N: Namespace>(
    store: &mut PrefsStore<N>,
    assignments: &[(String, String)],
    dry_run: bool,
    out: &mut impl Write,
) -> Result<(), RunError> {
    for (key, value) in assignments {
        match store.stage_key(key, value) {
            StageOutcome::Staged | StageOutcome::Unchanged => {}
            StageOutcome::Rejected(source) => {
                return Err(RunError::Rejected {
                    key: key.clone(),
                    source,
                });
            }
            StageOutcome::Unrecognized => {
                return Err(if ConfigField::from_key(key).is_some() {
                    RunError::NotStageable(key.clone())
                } else {
                    RunError::UnknownKey(key.clone())
                });
            }
        }
    }

    for field in ConfigField::ALL {
        if let Some(value) = store.pending(field) {
            let shown = if field.is_secret() { "********" } else { value };
            writeln!(out, "{} -> {shown}", field.label())?;
        }
    }

    if dry_run {
        let discarded = store.discard();
        writeln!(out, "Dry run: {discarded} change(s) not committed")?;
        return Ok(());
    }

    let committed = store.commit()?;
    writeln!(out, "Committed {committed} change(s)")?;
    Ok(())
}

/// Dispatches control request targets as the camera web server would.
fn request<N: Namespace>(
    store: PrefsStore<N>,
    targets: &[String],
    out: &mut impl Write,
) -> Result<(), RunError> {
    let mut dispatcher = Dispatcher::new(store);

    for target in targets {
        for outcome in dispatcher.dispatch_request(target)? {
            match outcome {
                DispatchOutcome::Handled => {}
                DispatchOutcome::Unhandled => {
                    writeln!(out, "{target}: unhandled command")?;
                }
                DispatchOutcome::Reboot { committed } => {
                    writeln!(out, "Committed {committed} change(s), restart requested")?;
                }
            }
        }
    }

    let dropped = dispatcher.store_mut().discard();
    if dropped > 0 {
        tracing::warn!("{dropped} staged change(s) dropped without reboot");
    }
    Ok(())
}

/// Parses an address and prints its bytes.
fn parse_address(
    text: &str,
    separator: char,
    radix: u32,
    out: &mut impl Write,
) -> Result<(), RunError> {
    let bytes = parse_dotted_quad(text, separator, radix)?;
    writeln!(out, "{}", format_dotted_quad(bytes, '.'))?;
    Ok(())
}
