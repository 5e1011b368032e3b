use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::domain::UserId;
use crate::identity::{FederatedIdentity, IdentityProvider, PinIdentity};

use super::usage;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "register",
            "Create an alias protected by a 4-6 digit PIN",
            "register <alias> <pin>",
            cmd_register,
        ),
        CommandEntry::new(
            "login",
            "Sign in with alias and PIN, or with a verified email",
            "login <alias> <pin> | login --email <address>",
            cmd_login,
        ),
        CommandEntry::new("logout", "Sign out", "logout", cmd_logout),
        CommandEntry::new("whoami", "Show the signed-in user", "whoami", cmd_whoami),
    ]
}

fn cmd_register(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [alias, pin] = args else {
        return Err(usage("register <alias> <pin>"));
    };
    let user = PinIdentity::new(context.manager.store()).register(alias, pin)?;
    output::success(format!("User `{}` created.", user));
    sign_in(context, user)
}

fn cmd_login(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let user = match args {
        ["--email", email] => FederatedIdentity::new(context.manager.store()).resolve(*email)?,
        [alias, pin] => PinIdentity::new(context.manager.store()).login(alias, pin)?,
        _ => return Err(usage("login <alias> <pin> | login --email <address>")),
    };
    output::success(format!("Signed in as `{}`.", user));
    sign_in(context, user)
}

fn cmd_logout(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if context.has_pending() {
        return Err(CommandError::InvalidArguments(
            "close the day before signing out; pending records would be lost".into(),
        ));
    }
    match context.user.take() {
        Some(user) => output::info(format!("Signed out `{}`.", user)),
        None => output::info("Nobody is signed in."),
    }
    context.session = None;
    Ok(())
}

fn cmd_whoami(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let user = context.require_user()?;
    output::info(format!("{} (working day {})", user, context.date));
    Ok(())
}

fn sign_in(context: &mut ShellContext, user: UserId) -> CommandResult {
    if context.user.as_ref() != Some(&user) {
        if context.has_pending() {
            output::warning("Pending records of the previous user were discarded.");
        }
        context.session = None;
    }
    context.user = Some(user);
    Ok(())
}
