use clap::Subcommand;
use evento::client::EventoClient;
use evento::dto::{CreateUserDto, UpdateUserDto};

use super::{found, succeeded, CommandResult};
use crate::output::{self, OutputConfig};

/// User management commands
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// List all users
    List,
    /// Show one user
    Get {
        /// The user ID
        id: String,
    },
    /// Create a new user
    Create {
        #[clap(long)]
        email: String,
        #[clap(long)]
        name: String,
        #[clap(long)]
        avatar_url: Option<String>,
    },
    /// Update a user's details
    Update {
        /// The user ID
        id: String,
        #[clap(long)]
        email: Option<String>,
        #[clap(long)]
        name: Option<String>,
        #[clap(long)]
        avatar_url: Option<String>,
    },
    /// Delete a user; their bookings go with them
    Delete {
        /// The user ID
        id: String,
    },
    /// List a user's bookings
    Bookings {
        /// The user ID
        id: String,
    },
}

/// Executes a user command
pub async fn execute(client: &EventoClient, cmd: UserCommands, config: &OutputConfig) -> CommandResult {
    match cmd {
        UserCommands::List => {
            output::print_users(&client.get_users().await, config);
        }
        UserCommands::Get { id } => {
            let user = found(client.get_user(&id).await, "User not found")?;
            output::print_user(&user, config);
        }
        UserCommands::Create { email, name, avatar_url } => {
            let dto = CreateUserDto { email, name, avatar_url };
            let user = found(client.create_user(&dto).await, "Could not create user")?;
            output::print_user(&user, config);
        }
        UserCommands::Update { id, email, name, avatar_url } => {
            let dto = UpdateUserDto { email, name, avatar_url };
            let user = found(client.update_user(&id, &dto).await, "Could not update user")?;
            output::print_user(&user, config);
        }
        UserCommands::Delete { id } => {
            succeeded(client.delete_user(&id).await, "Could not delete user")?;
            output::print_success(&format!("Deleted user {}", id), config);
        }
        UserCommands::Bookings { id } => {
            output::print_bookings(&client.get_user_bookings(&id).await, config);
        }
    }
    Ok(())
}
