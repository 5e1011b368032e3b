use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::core::{ExpenseDraft, TripDraft};
use crate::domain::{DailySummary, TripKind};

use super::{parse_amount, parse_date, split_flags, usage};

const TRIP_USAGE: &str = "trip <start HH:MM> <end HH:MM> <base> [tip] [--airport] [--extra]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "day",
            "Show or change the working day",
            "day [YYYY-MM-DD|today] [--discard]",
            cmd_day,
        ),
        CommandEntry::new("trip", "Record a trip for the working day", TRIP_USAGE, cmd_trip),
        CommandEntry::new(
            "expense",
            "Record an expense for the working day",
            "expense <amount> <concept...>",
            cmd_expense,
        ),
        CommandEntry::new(
            "pending",
            "List records not yet saved",
            "pending",
            cmd_pending,
        ),
        CommandEntry::new(
            "close",
            "Save the working day and compute its summary",
            "close <fuel cost> <distance km>",
            cmd_close,
        ),
    ]
}

fn cmd_day(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (positional, flags) = split_flags(args);
    let Some(raw) = positional.first() else {
        let pending = context
            .session
            .as_ref()
            .map_or((0, 0), |session| {
                (session.pending_trips().len(), session.pending_expenses().len())
            });
        output::info(format!(
            "Working day {} ({} pending trips, {} pending expenses)",
            context.date, pending.0, pending.1
        ));
        return Ok(());
    };

    let date = if raw.eq_ignore_ascii_case("today") {
        context.clock.today()
    } else {
        parse_date(raw)?
    };
    if date != context.date && context.has_pending() {
        if !flags.iter().any(|flag| flag == "discard") {
            return Err(CommandError::InvalidArguments(format!(
                "{} has pending records; `close` it first or pass --discard",
                context.date
            )));
        }
        output::warning(format!("Discarded pending records of {}.", context.date));
    }
    if date != context.date {
        context.session = None;
    }
    context.date = date;
    output::info(format!("Working day set to {}.", date));
    Ok(())
}

fn cmd_trip(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (positional, flags) = split_flags(args);
    let (start, end, base, tip) = match positional.as_slice() {
        [start, end, base] => (*start, *end, *base, None),
        [start, end, base, tip] => (*start, *end, *base, Some(*tip)),
        _ => return Err(usage(TRIP_USAGE)),
    };
    let mut airport = false;
    let mut kind = TripKind::Normal;
    for flag in &flags {
        match flag.as_str() {
            "airport" => airport = true,
            "extra" => kind = TripKind::Extra,
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown trip flag `--{other}`"
                )))
            }
        }
    }
    let draft = TripDraft {
        kind,
        start_time: start.to_string(),
        end_time: end.to_string(),
        base_earning: parse_amount("base earning", base)?,
        airport,
        tip: tip.map(|raw| parse_amount("tip", raw)).transpose()?.unwrap_or(0.0),
    };
    if kind == TripKind::Extra && airport {
        output::warning("Extra trips never carry the airport surcharge.");
    }

    let policy = context.manager.policy().trip;
    let trip = context.session_mut()?.add_trip(draft, &policy)?.clone();
    output::success(format!(
        "Trip {} #{} added: {} ({} min, {}/h)",
        trip.kind,
        trip.sequence,
        context.money(trip.total_earning),
        trip.duration_minutes,
        context.money(trip.earnings_per_hour)
    ));
    Ok(())
}

fn cmd_expense(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [amount, concept @ ..] = args else {
        return Err(usage("expense <amount> <concept...>"));
    };
    let draft = ExpenseDraft {
        concept: concept.join(" "),
        amount: parse_amount("amount", amount)?,
    };
    let expense = context.session_mut()?.add_expense(draft)?.clone();
    output::success(format!(
        "Expense `{}` added: {}",
        expense.concept,
        context.money(expense.amount)
    ));
    Ok(())
}

fn cmd_pending(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let session = context.session_mut()?.clone();
    output::section(format!("Pending for {}", session.date()));
    if session.is_empty() {
        output::info("Nothing pending.");
        return Ok(());
    }
    for trip in session.pending_trips() {
        output::info(format!(
            "  {} #{:<3} {}-{}  {}",
            trip.kind,
            trip.sequence,
            trip.start_time.format("%H:%M"),
            trip.end_time.format("%H:%M"),
            context.money(trip.total_earning)
        ));
    }
    for expense in session.pending_expenses() {
        output::info(format!(
            "  expense  {:<16} {}",
            expense.concept,
            context.money(expense.amount)
        ));
    }
    Ok(())
}

fn cmd_close(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [fuel, distance] = args else {
        return Err(usage("close <fuel cost> <distance km>"));
    };
    let fuel = parse_amount("fuel cost", fuel)?;
    let distance = parse_amount("distance", distance)?;

    context.session_mut()?;
    let Some(session) = context.session.as_ref() else {
        return Err(CommandError::InvalidArguments("no open day".into()));
    };
    let summary = context.manager.close_day(session, fuel, distance)?;
    context.session = None;

    output::success(format!("Day {} closed.", summary.date));
    print_summary(context, &summary);
    Ok(())
}

pub(crate) fn print_summary(context: &ShellContext, summary: &DailySummary) {
    output::info(format!("  Trips        : {}", summary.trip_count));
    output::info(format!("  Gross        : {}", context.money(summary.gross_earnings)));
    output::info(format!("  Bonus        : {}", context.money(summary.bonus)));
    output::info(format!("  Expenses     : {}", context.money(summary.total_expenses)));
    output::info(format!("  Fuel         : {}", context.money(summary.fuel_cost)));
    output::info(format!("  Distance     : {} km", summary.distance_km));
    output::info(format!("  Net balance  : {}", context.money(summary.net_balance)));
}
