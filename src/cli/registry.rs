use std::{collections::HashMap, fmt};

use strsim::levenshtein;

use crate::cli::core::{CommandResult, ShellContext};

/// Largest edit distance still offered as a "did you mean" suggestion.
const SUGGESTION_DISTANCE: usize = 3;

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

/// Sections of the `help` overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandGroup {
    Account,
    Day,
    Reports,
    Budget,
    System,
}

impl fmt::Display for CommandGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CommandGroup::Account => "Account",
            CommandGroup::Day => "Working day",
            CommandGroup::Reports => "Reports",
            CommandGroup::Budget => "Bills",
            CommandGroup::System => "System",
        };
        f.write_str(label)
    }
}

pub struct CommandEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandEntry {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            handler,
        }
    }
}

/// Commands by name, grouped for `help` in registration order.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandEntry>,
    groups: Vec<(CommandGroup, Vec<&'static str>)>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `entries` under `group`; a name registered twice keeps its first group.
    pub fn register_group(&mut self, group: CommandGroup, entries: Vec<CommandEntry>) {
        for entry in entries {
            let name = entry.name;
            if self.commands.insert(name, entry).is_some() {
                continue;
            }
            match self.groups.iter_mut().find(|(existing, _)| *existing == group) {
                Some((_, names)) => names.push(name),
                None => self.groups.push((group, vec![name])),
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&CommandEntry> {
        self.commands.get(name)
    }

    pub fn grouped(&self) -> Vec<(CommandGroup, Vec<&CommandEntry>)> {
        self.groups
            .iter()
            .map(|(group, names)| {
                let entries = names
                    .iter()
                    .filter_map(|name| self.commands.get(name))
                    .collect();
                (*group, entries)
            })
            .collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.groups.iter().flat_map(|(_, names)| names.iter().copied())
    }

    pub fn handler(&self, name: &str) -> Option<CommandHandler> {
        self.commands.get(name).map(|entry| entry.handler)
    }

    /// Closest known command to a mistyped one, if any is near enough.
    pub fn suggest(&self, input: &str) -> Option<&'static str> {
        let needle = input.to_lowercase();
        self.names()
            .map(|name| (levenshtein(name, &needle), name))
            .min_by_key(|(distance, _)| *distance)
            .filter(|(distance, _)| *distance <= SUGGESTION_DISTANCE)
            .map(|(_, name)| name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut ShellContext, _: &[&str]) -> CommandResult {
        Ok(())
    }

    fn registry() -> CommandRegistry {
        let mut registry = CommandRegistry::new();
        registry.register_group(
            CommandGroup::Day,
            vec![
                CommandEntry::new("trip", "Add a trip", "trip", noop),
                CommandEntry::new("close", "Close the day", "close", noop),
            ],
        );
        registry.register_group(
            CommandGroup::System,
            vec![
                CommandEntry::new("exit", "Leave", "exit", noop),
                CommandEntry::new("trip", "Duplicate", "trip", noop),
            ],
        );
        registry
    }

    #[test]
    fn groups_keep_registration_order() {
        let registry = registry();
        let grouped: Vec<(CommandGroup, Vec<&str>)> = registry
            .grouped()
            .into_iter()
            .map(|(group, entries)| (group, entries.iter().map(|entry| entry.name).collect()))
            .collect();
        assert_eq!(
            grouped,
            vec![
                (CommandGroup::Day, vec!["trip", "close"]),
                (CommandGroup::System, vec!["exit"]),
            ]
        );
        assert_eq!(registry.get("trip").map(|entry| entry.description), Some("Add a trip"));
    }

    #[test]
    fn suggestions_stay_within_three_edits() {
        let registry = registry();
        assert_eq!(registry.suggest("CLOSR"), Some("close"));
        assert_eq!(registry.suggest("summaries"), None);
    }
}
