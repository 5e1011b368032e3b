use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::help;
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::core::services::ScheduleMode;
use crate::utils::build_info;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "config",
            "Show the active configuration",
            "config",
            cmd_config,
        ),
        CommandEntry::new(
            "wipe",
            "Delete all trips, expenses and summaries of the signed-in user",
            "wipe",
            cmd_wipe,
        ),
        CommandEntry::new("version", "Show build metadata", "version", cmd_version),
        CommandEntry::new(
            "help",
            "Show available commands",
            "help [command]",
            cmd_help,
        ),
        CommandEntry::new("exit", "Exit the shell", "exit", cmd_exit),
    ]
}

fn cmd_config(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let config = &context.config;
    output::section("Configuration");
    output::info(format!("  File             : {}", context.config_manager.path().display()));
    output::info(format!(
        "  Data directory   : {}",
        context.config_manager.data_dir(config).display()
    ));
    output::info(format!("  Airport surcharge: {}", context.money(config.airport_surcharge)));
    output::info(format!(
        "  Bonus schedule   : {}",
        match config.bonus_schedule {
            ScheduleMode::Flat => "flat",
            ScheduleMode::Weekday => "weekday",
        }
    ));
    output::info(format!("  Cache TTL        : {}s", config.cache_ttl_secs));
    output::info(format!("  Alert lead days  : {}", config.alert_lead_days));
    Ok(())
}

fn cmd_wipe(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let user = context.require_user()?;
    if !context.confirm(&format!("Delete every trip, expense and summary of `{user}`?"))? {
        output::info("Nothing deleted.");
        return Ok(());
    }
    let report = context.manager.wipe_user(&user)?;
    context.session = None;
    output::success(format!(
        "Removed {} trips, {} expenses and {} summaries.",
        report.trips, report.expenses, report.summaries
    ));
    Ok(())
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let meta = build_info::current();
    output::section(format!("Earnings Core {}", meta.version));
    output::info(format!(
        "  Build hash   : {} ({})",
        meta.git_hash, meta.git_status
    ));
    output::info(format!("  Built at     : {}", meta.timestamp));
    output::info(format!("  Target       : {}", meta.target));
    output::info(format!("  Profile      : {}", meta.profile));
    output::info(format!("  Rustc        : {}", meta.rustc));
    Ok(())
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first() {
        match context.command(&name.to_lowercase()) {
            Some(entry) => help::print_command(entry),
            None => context.suggest_command(name),
        }
        return Ok(());
    }
    help::print_overview(&context.registry);
    Ok(())
}

fn cmd_exit(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if context.has_pending() {
        output::warning("Leaving with unclosed trips or expenses; they were not saved.");
    }
    Err(CommandError::ExitRequested)
}
