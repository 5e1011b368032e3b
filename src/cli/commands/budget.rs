use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::core::services::{AlertKind, BudgetService};
use crate::domain::BudgetCategory;

use super::{parse_amount, parse_date, usage};

const BUDGET_USAGE: &str =
    "budget <add <name> <amount> <due day>|pay <name>|remove <name>|list>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "budget",
            "Manage monthly bills and their due days",
            BUDGET_USAGE,
            cmd_budget,
        ),
        CommandEntry::new(
            "alerts",
            "Show bills due today or soon",
            "alerts [YYYY-MM-DD]",
            cmd_alerts,
        ),
    ]
}

fn cmd_budget(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let user = context.require_user()?;
    let store = context.manager.store();
    let Some(action) = args.first() else {
        return Err(usage(BUDGET_USAGE));
    };
    match (action.to_lowercase().as_str(), &args[1..]) {
        ("add", [name, amount, due_day]) => {
            let due_day = due_day.trim().parse::<u32>().map_err(|_| {
                CommandError::InvalidArguments(format!("due day must be 1-31, got `{due_day}`"))
            })?;
            let amount = parse_amount("monthly amount", amount)?;
            let category =
                BudgetService::add(store, BudgetCategory::new(user, *name, amount, due_day))?;
            output::success(format!(
                "Category `{}` added: {} due on day {}.",
                category.name,
                context.money(category.monthly_amount),
                category.due_day
            ));
        }
        ("pay", [name]) => {
            let category = BudgetService::mark_paid(store, &user, name)?;
            output::success(format!("`{}` marked as paid.", category.name));
        }
        ("remove", [name]) => {
            BudgetService::remove(store, &user, name)?;
            output::success(format!("`{}` removed.", name.trim()));
        }
        ("list", []) => {
            let categories = BudgetService::list(store, &user)?;
            output::section("Budget");
            if categories.is_empty() {
                output::info("No categories yet.");
            }
            for category in &categories {
                output::info(format!(
                    "  {:<18} {:>12}  due day {:>2}  next {}  {}",
                    category.name,
                    context.money(category.monthly_amount),
                    category.due_day,
                    category.next_due_date(context.date),
                    if category.paid { "paid" } else { "unpaid" }
                ));
            }
        }
        _ => return Err(usage(BUDGET_USAGE)),
    }
    Ok(())
}

fn cmd_alerts(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let user = context.require_user()?;
    let today = match args {
        [] => context.clock.today(),
        [raw] => parse_date(raw)?,
        _ => return Err(usage("alerts [YYYY-MM-DD]")),
    };
    let alerts = BudgetService::alerts(
        context.manager.store(),
        &user,
        today,
        context.config.alert_lead_days,
    )?;
    if alerts.is_empty() {
        output::info(format!("No bills need attention on {}.", today));
        return Ok(());
    }
    for alert in alerts {
        let amount = context.money(alert.amount);
        match alert.kind {
            AlertKind::DueToday => {
                output::warning(format!("`{}` ({}) is due today.", alert.category, amount))
            }
            AlertKind::Upcoming => output::info(format!(
                "`{}` ({}) is due in {} days.",
                alert.category, amount, context.config.alert_lead_days
            )),
        }
    }
    Ok(())
}
