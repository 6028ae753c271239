use std::sync::Arc;

use clap::Subcommand;
use evento::client::{AuthOutcome, ChannelNotifier, EventoClient, Notification, RemoteIdentity, SessionContext, TokenStore};
use tokio::sync::mpsc::UnboundedReceiver;

use super::{found, CommandResult};
use crate::output::{self, OutputConfig};

/// Account and session commands
#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Create an account and sign in
    SignUp {
        #[clap(long)]
        email: String,
        #[clap(long, env = "EVENTO_PASSWORD", hide_env_values = true)]
        password: String,
        #[clap(long)]
        name: String,
    },
    /// Sign in and remember the session
    SignIn {
        #[clap(long)]
        email: String,
        #[clap(long, env = "EVENTO_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// End the remembered session
    SignOut,
    /// Show the signed-in user
    Whoami,
}

fn print_notifications(receiver: &mut UnboundedReceiver<Notification>, config: &OutputConfig) {
    while let Ok(notification) = receiver.try_recv() {
        output::print_notification(&notification, config);
    }
}

fn outcome(result: AuthOutcome) -> CommandResult {
    match result {
        AuthOutcome { success: true, .. } => Ok(()),
        AuthOutcome { error, .. } => Err(error.unwrap_or_else(|| "Request failed".to_string()).into()),
    }
}

/// Executes an auth command
pub async fn execute(
    client: &EventoClient,
    store: TokenStore,
    cmd: AuthCommands,
    config: &OutputConfig,
) -> CommandResult {
    let (notifier, mut notifications) = ChannelNotifier::new();
    let identity = Arc::new(RemoteIdentity::new(client.clone(), store));
    let session = SessionContext::start(identity, Arc::new(notifier));
    session.ready().await;

    let signing_out = matches!(cmd, AuthCommands::SignOut);
    let result = match cmd {
        AuthCommands::SignUp { email, password, name } => outcome(session.sign_up(&email, &password, &name).await),
        AuthCommands::SignIn { email, password } => outcome(session.sign_in(&email, &password).await),
        AuthCommands::SignOut => outcome(session.sign_out().await),
        AuthCommands::Whoami => Ok(()),
    };

    print_notifications(&mut notifications, config);
    result?;

    if signing_out {
        output::print_success("Signed out", config);
    } else {
        let user = found(session.user().await, "Not signed in")?;
        output::print_user(&user, config);
    }
    Ok(())
}
