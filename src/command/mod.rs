//! HTTP API extension commands.
//!
//! The camera web server forwards every `key=value` pair of a control
//! request to a chain of handlers. The preference store is tried first; a
//! handler returning `false` passes the command on to the next one.
//!
//! Staged preference changes become durable only when the `reboot` command
//! arrives, which commits them before the module restarts.

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

use http::Uri;
use thiserror::Error;

use crate::namespace::Namespace;
use crate::prefs::{PrefsError, PrefsStore};

/// Command that commits staged preferences and requests a restart.
pub const REBOOT_COMMAND: &str = "reboot";

/// Query parameter naming the command in `var`/`val` requests.
const VAR_PARAM: &str = "var";

/// Query parameter carrying the value in `var`/`val` requests.
const VAL_PARAM: &str = "val";

/// Errors from parsing or executing commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The request target is not a valid URI.
    #[error("Invalid request target '{target}': {source}")]
    InvalidTarget {
        /// The rejected target
        target: String,
        /// Underlying URI error
        #[source]
        source: http::uri::InvalidUri,
    },

    /// Committing staged preferences failed.
    #[error("Failed to commit preferences: {0}")]
    Commit(#[from] PrefsError),
}

/// Something that may recognize and execute a command.
pub trait CommandHandler {
    /// Executes the command if it belongs to this handler.
    ///
    /// Returns `false` if the key is not recognized, so the caller can try
    /// other handlers.
    fn handle(&mut self, key: &str, value: &str) -> bool;
}

impl<N: Namespace> CommandHandler for PrefsStore<N> {
    fn handle(&mut self, key: &str, value: &str) -> bool {
        self.stage_key(key, value).is_handled()
    }
}

/// A single key/value command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Command name
    pub key: String,
    /// Command argument (may be empty)
    pub value: String,
}

impl Command {
    /// Creates a command.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Extracts the commands carried by a request target, in query order.
///
/// A `var=<key>` parameter is paired with the `val=<value>` that follows it
/// to form one command; every other query pair is a command of its own.
/// A `var` without a `val` before the next `var` or the end of the query
/// becomes a command with an empty value. A `val` without a preceding `var`
/// is ignored. Percent-encoding and `+` are decoded.
///
/// # Errors
///
/// Returns an error if `target` is not a valid URI.
///
/// # Example
///
/// ```
/// use cam_prefs::command::{Command, parse_request_target};
///
/// let commands = parse_request_target("/control?var=net_ssid&val=My%20Net").unwrap();
/// assert_eq!(commands, [Command::new("net_ssid", "My Net")]);
/// ```
pub fn parse_request_target(target: &str) -> Result<Vec<Command>, CommandError> {
    let uri: Uri = target.parse().map_err(|e| CommandError::InvalidTarget {
        target: target.to_string(),
        source: e,
    })?;

    let query = uri.query().unwrap_or_default();
    let mut commands = Vec::new();
    let mut var: Option<String> = None;

    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            VAR_PARAM => {
                if let Some(unpaired) = var.replace(value.into_owned()) {
                    tracing::debug!("'{VAR_PARAM}={unpaired}' has no '{VAL_PARAM}'");
                    commands.push(Command::new(unpaired, ""));
                }
            }
            VAL_PARAM => match var.take() {
                Some(name) => commands.push(Command::new(name, value)),
                None => tracing::warn!("Ignoring '{VAL_PARAM}' without a preceding '{VAR_PARAM}'"),
            },
            _ => {
                if let Some(unpaired) = var.take() {
                    tracing::debug!("'{VAR_PARAM}={unpaired}' has no '{VAL_PARAM}'");
                    commands.push(Command::new(unpaired, ""));
                }
                commands.push(Command::new(key, value));
            }
        }
    }

    if let Some(unpaired) = var {
        commands.push(Command::new(unpaired, ""));
    }

    Ok(commands)
}

/// What happened to a dispatched command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A handler recognized the command.
    Handled,

    /// No handler recognized the command.
    Unhandled,

    /// Staged preferences were committed and a restart was requested.
    Reboot {
        /// Number of preference fields written
        committed: usize,
    },
}

/// Routes commands to the preference store and any extra handlers.
pub struct Dispatcher<N> {
    store: PrefsStore<N>,
    handlers: Vec<Box<dyn CommandHandler>>,
    restart_requested: bool,
}

impl<N: Namespace> Dispatcher<N> {
    /// Creates a dispatcher whose first handler is `store`.
    #[must_use]
    pub fn new(store: PrefsStore<N>) -> Self {
        Self {
            store,
            handlers: Vec::new(),
            restart_requested: false,
        }
    }

    /// Appends a handler tried after the preference store.
    #[must_use]
    pub fn with_handler(mut self, handler: impl CommandHandler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Routes one command.
    ///
    /// # Errors
    ///
    /// Returns an error if a `reboot` command fails to commit.
    pub fn dispatch(&mut self, key: &str, value: &str) -> Result<DispatchOutcome, CommandError> {
        if key == REBOOT_COMMAND {
            let committed = self.store.commit()?;
            self.restart_requested = true;
            tracing::info!("Restart requested after committing {committed} preference change(s)");
            return Ok(DispatchOutcome::Reboot { committed });
        }

        if self.store.handle(key, value) {
            return Ok(DispatchOutcome::Handled);
        }

        for handler in &mut self.handlers {
            if handler.handle(key, value) {
                return Ok(DispatchOutcome::Handled);
            }
        }

        tracing::debug!("Unhandled command: {key}");
        Ok(DispatchOutcome::Unhandled)
    }

    /// Parses a request target and routes every command it carries.
    ///
    /// # Errors
    ///
    /// Returns an error if the target is invalid or a `reboot` command fails
    /// to commit. Commands before the failing one have already been applied.
    pub fn dispatch_request(&mut self, target: &str) -> Result<Vec<DispatchOutcome>, CommandError> {
        parse_request_target(target)?
            .iter()
            .map(|command| self.dispatch(&command.key, &command.value))
            .collect()
    }

    /// Returns `true` once a `reboot` command has been processed.
    #[must_use]
    pub const fn restart_requested(&self) -> bool {
        self.restart_requested
    }

    /// Returns the preference store.
    #[must_use]
    pub const fn store(&self) -> &PrefsStore<N> {
        &self.store
    }

    /// Returns the preference store mutably.
    pub const fn store_mut(&mut self) -> &mut PrefsStore<N> {
        &mut self.store
    }

    /// Consumes the dispatcher, returning the preference store.
    pub fn into_store(self) -> PrefsStore<N> {
        self.store
    }
}
