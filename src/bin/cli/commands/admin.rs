use std::sync::Arc;

use clap::{Args, Subcommand};
use evento::client::{AdminSession, ChannelNotifier, EventoClient};

use super::{found, CommandResult};
use crate::output::{self, OutputConfig};

/// Admin dashboard access
#[derive(Args, Debug)]
pub struct AdminArgs {
    #[clap(long, env = "EVENTO_ADMIN_USERNAME")]
    username: String,

    #[clap(long, env = "EVENTO_ADMIN_PASSWORD", hide_env_values = true)]
    password: String,

    #[command(subcommand)]
    command: AdminCommands,
}

#[derive(Subcommand, Debug)]
pub enum AdminCommands {
    /// Check the admin credentials
    Login,
    /// Totals for the dashboard
    Summary,
    /// All users
    Users,
    /// All events
    Events,
    /// All bookings with their events
    Bookings,
    /// All enquiries
    Enquiries,
}

/// Executes an admin command
///
/// The credentials are checked first; every dashboard request then carries them.
pub async fn execute(client: &EventoClient, args: AdminArgs, config: &OutputConfig) -> CommandResult {
    let (notifier, mut notifications) = ChannelNotifier::new();
    let mut admin = AdminSession::new(client.clone(), Arc::new(notifier));

    admin.login(&args.username, &args.password).await;
    while let Ok(notification) = notifications.try_recv() {
        output::print_notification(&notification, config);
    }
    let credentials = found(admin.credentials().cloned(), "Invalid admin credentials")?;
    let client = admin.client();

    match args.command {
        AdminCommands::Login => output::print_success("Admin credentials accepted", config),
        AdminCommands::Summary => {
            let summary = found(client.admin_summary(&credentials).await, "Could not load dashboard summary")?;
            output::print_summary(&summary, config);
        }
        AdminCommands::Users => output::print_users(&client.admin_users(&credentials).await, config),
        AdminCommands::Events => output::print_events(&client.admin_events(&credentials).await, config),
        AdminCommands::Bookings => output::print_bookings(&client.admin_bookings(&credentials).await, config),
        AdminCommands::Enquiries => output::print_enquiries(&client.admin_enquiries(&credentials).await, config),
    }
    Ok(())
}
