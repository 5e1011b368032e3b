//! Shell context, dispatch and error reporting.

use std::{io, path::PathBuf};

use chrono::NaiveDate;
use dialoguer::{theme::ColorfulTheme, Confirm};
use thiserror::Error;

use crate::config::{Config, ConfigManager};
use crate::core::{Clock, DaySession, EarningsManager, SystemClock};
use crate::domain::{round_currency, UserId};
use crate::errors::EarningsError;
pub use crate::errors::CliError;

use super::commands;
use super::output;
use super::registry::{CommandEntry, CommandRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Not signed in. Use `login` or `register` first.")]
    NotSignedIn,
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Core(#[from] EarningsError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Core(inner) => CliError::Core(inner),
            other => CliError::Command(other.to_string()),
        }
    }
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub manager: EarningsManager,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub theme: ColorfulTheme,
    pub clock: Box<dyn Clock>,
    pub user: Option<UserId>,
    pub date: NaiveDate,
    pub session: Option<DaySession>,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_config_manager(mode, ConfigManager::new())
    }

    /// Context rooted at an explicit application home.
    pub fn with_home(mode: CliMode, home: impl Into<PathBuf>) -> Result<Self, CliError> {
        Self::with_config_manager(mode, ConfigManager::with_home(home))
    }

    fn with_config_manager(mode: CliMode, config_manager: ConfigManager) -> Result<Self, CliError> {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let config = config_manager.load()?;
        let store = config_manager.open_store(&config)?;
        let manager = EarningsManager::new(Box::new(store), config.policy());
        let clock: Box<dyn Clock> = Box::new(SystemClock);
        let date = clock.today();

        Ok(ShellContext {
            mode,
            registry,
            manager,
            config_manager,
            config,
            theme: ColorfulTheme::default(),
            clock,
            user: None,
            date,
            session: None,
            last_command: None,
            running: true,
        })
    }

    /// Swaps the clock and moves the working date to its today.
    pub fn set_clock(&mut self, clock: Box<dyn Clock>) {
        self.date = clock.today();
        self.clock = clock;
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub fn prompt(&self) -> String {
        match &self.user {
            Some(user) => format!("earnings [{} {}]> ", user, self.date),
            None => "earnings> ".to_string(),
        }
    }

    pub(crate) fn require_user(&self) -> Result<UserId, CommandError> {
        self.user.clone().ok_or(CommandError::NotSignedIn)
    }

    /// The open session for the working date, loading it on first use.
    pub(crate) fn session_mut(&mut self) -> Result<&mut DaySession, CommandError> {
        let user = self.require_user()?;
        let stale = self
            .session
            .as_ref()
            .map_or(true, |session| session.user_id() != &user || session.date() != self.date);
        if stale {
            self.session = Some(self.manager.open_day(&user, self.date)?);
        }
        self.session
            .as_mut()
            .ok_or_else(|| CommandError::InvalidArguments("no open day".into()))
    }

    pub(crate) fn has_pending(&self) -> bool {
        self.session.as_ref().is_some_and(|session| !session.is_empty())
    }

    pub(crate) fn money(&self, amount: f64) -> String {
        format!("{} {:.2}", self.config.currency_symbol, round_currency(amount))
    }

    /// Asks before destructive actions; scripts always proceed.
    pub(crate) fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(false)
            .interact()?)
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        if let Some(name) = self.registry.suggest(input) {
            output::hint(format!("Did you mean `{}`?", name));
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if !self.has_pending() {
            return Ok(true);
        }
        self.confirm("Unclosed trips or expenses will be lost. Exit anyway?")
            .map_err(CliError::from)
    }

    /// Prints a command failure; only failures of the shell itself propagate.
    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
            }
            CommandError::NotSignedIn => {
                output::error(CommandError::NotSignedIn);
                output::hint("Try `register <alias> <pin>` to create an account.");
            }
            CommandError::Core(EarningsError::IncompleteInput(message)) => {
                output::error(format!("Cannot close the day yet: {message}"));
                output::hint("Enter the distance driven, e.g. `close 10 50`.");
            }
            CommandError::Core(
                err @ (EarningsError::StoreUnavailable { .. } | EarningsError::MalformedRow { .. }),
            ) => {
                let collection = err
                    .collection()
                    .map(|collection| collection.to_string())
                    .unwrap_or_default();
                output::error(&err);
                output::hint(format!(
                    "Retry the command once the `{collection}` collection is reachable."
                ));
            }
            other => output::error(other),
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn process_script(home: &std::path::Path, lines: &[&str]) -> Result<ShellContext, CliError> {
    let mut app = ShellContext::with_home(CliMode::Script, home)?;
    for line in lines {
        match super::shell::handle_line(&mut app, line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => app.report_error(err)?,
        }
    }
    Ok(app)
}
