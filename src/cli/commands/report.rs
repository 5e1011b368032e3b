use std::fs;

use chrono::NaiveDate;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::domain::{DailySummary, DateWindow};
use crate::export::{self, BalanceChart};

use super::{parse_date, usage};

const EXPORT_USAGE: &str = "export <trips|expenses|summary> [YYYY-MM-DD] [file]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "summaries",
            "List closed days, newest first",
            "summaries [from YYYY-MM-DD] [to YYYY-MM-DD]",
            cmd_summaries,
        ),
        CommandEntry::new(
            "chart",
            "Show the balance chart of a closed day",
            "chart [YYYY-MM-DD]",
            cmd_chart,
        ),
        CommandEntry::new(
            "export",
            "Export a day's trips, expenses or summary",
            EXPORT_USAGE,
            cmd_export,
        ),
    ]
}

fn cmd_summaries(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let user = context.require_user()?;
    let window = match args {
        [] => None,
        [from] => Some(DateWindow::new(parse_date(from)?, NaiveDate::MAX)?),
        [from, to] => Some(DateWindow::new(parse_date(from)?, parse_date(to)?)?),
        _ => return Err(usage("summaries [from] [to]")),
    };
    let summaries = context.manager.summaries(&user, window)?;
    output::section(format!("Summaries for {}", user));
    if summaries.is_empty() {
        output::info("No closed days yet.");
        return Ok(());
    }
    for summary in &summaries {
        output::info(format!(
            "  {}  {:>3} trips  gross {}  bonus {}  net {}",
            summary.date,
            summary.trip_count,
            context.money(summary.gross_earnings),
            context.money(summary.bonus),
            context.money(summary.net_balance)
        ));
    }
    let total: f64 = summaries.iter().map(|summary| summary.net_balance).sum();
    output::info(format!("  Total net: {}", context.money(total)));
    Ok(())
}

fn cmd_chart(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let date = match args {
        [] => context.date,
        [raw] => parse_date(raw)?,
        _ => return Err(usage("chart [YYYY-MM-DD]")),
    };
    let summary = closed_day(context, date)?;
    let user = context.require_user()?;
    let trips = context.manager.day_records(&user, date)?.trips;
    let chart = BalanceChart::from_day(&trips, &summary);

    output::section(format!("Balance {}", date));
    let widest = chart
        .bars
        .iter()
        .map(|bar| bar.value.abs())
        .fold(0.0_f64, f64::max);
    for bar in &chart.bars {
        let width = if widest > 0.0 {
            ((bar.value.abs() / widest) * 30.0).round() as usize
        } else {
            0
        };
        output::info(format!("  {:<16} {:<30} {}", bar.label, "#".repeat(width), bar.value));
    }
    match chart.peak_hour {
        Some(hour) => output::info(format!("  Peak hour: {:02}:00", hour)),
        None => output::info("  Peak hour: none"),
    }
    Ok(())
}

fn cmd_export(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (kind, rest) = match args {
        [kind, rest @ ..] if rest.len() <= 2 => (kind.to_lowercase(), rest),
        _ => return Err(usage(EXPORT_USAGE)),
    };
    let date = match rest.first() {
        Some(raw) => parse_date(raw)?,
        None => context.date,
    };
    let user = context.require_user()?;
    let text = match kind.as_str() {
        "trips" => export::trips_csv(&context.manager.day_records(&user, date)?.trips)?,
        "expenses" => export::expenses_csv(&context.manager.day_records(&user, date)?.expenses)?,
        "summary" => export::summary_json(&closed_day(context, date)?)?,
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "cannot export `{other}`; choose trips, expenses or summary"
            )))
        }
    };
    match rest.get(1) {
        Some(path) => {
            fs::write(path, text)?;
            output::success(format!("Exported {} for {} to {}", kind, date, path));
        }
        None => output::plain(text.trim_end()),
    }
    Ok(())
}

fn closed_day(context: &ShellContext, date: NaiveDate) -> Result<DailySummary, CommandError> {
    let user = context.require_user()?;
    context.manager.summary(&user, date)?.ok_or_else(|| {
        CommandError::InvalidArguments(format!("{date} has not been closed yet"))
    })
}
