pub mod account;
pub mod budget;
pub mod day;
pub mod report;
pub mod system;

use chrono::NaiveDate;

use crate::cli::core::CommandError;
use crate::cli::registry::{CommandGroup, CommandRegistry};

pub(crate) fn register_all(registry: &mut CommandRegistry) {
    registry.register_group(CommandGroup::Account, account::definitions());
    registry.register_group(CommandGroup::Day, day::definitions());
    registry.register_group(CommandGroup::Reports, report::definitions());
    registry.register_group(CommandGroup::Budget, budget::definitions());
    registry.register_group(CommandGroup::System, system::definitions());
}

pub(crate) fn parse_amount(label: &str, raw: &str) -> Result<f64, CommandError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| CommandError::InvalidArguments(format!("{label} must be a number, got `{raw}`")))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        CommandError::InvalidArguments(format!("`{raw}` is not a YYYY-MM-DD date"))
    })
}

/// Splits `--flag` tokens from positional arguments.
pub(crate) fn split_flags<'a>(args: &[&'a str]) -> (Vec<&'a str>, Vec<String>) {
    let mut positional = Vec::new();
    let mut flags = Vec::new();
    for arg in args {
        match arg.strip_prefix("--") {
            Some(flag) => flags.push(flag.to_ascii_lowercase()),
            None => positional.push(*arg),
        }
    }
    (positional, flags)
}

pub(crate) fn usage(text: &str) -> CommandError {
    CommandError::InvalidArguments(format!("usage: {text}"))
}
