use clap::Subcommand;
use evento::client::EventoClient;
use evento::dto::{CreateEnquiryDto, UpdateEnquiryDto};

use super::{found, succeeded, CommandResult};
use crate::output::{self, OutputConfig};

/// Enquiry (contact form) commands
#[derive(Subcommand, Debug)]
pub enum EnquiryCommands {
    /// Submit an enquiry
    Submit {
        #[clap(long)]
        name: String,
        #[clap(long)]
        email: String,
        #[clap(long)]
        phone: String,
        /// Kind of event asked about, e.g. "Wedding"
        #[clap(long)]
        event_type: String,
        #[clap(long)]
        message: String,
    },
    /// Show one enquiry
    Get {
        /// The enquiry ID
        id: String,
    },
    /// Update an enquiry
    Update {
        /// The enquiry ID
        id: String,
        #[clap(long)]
        name: Option<String>,
        #[clap(long)]
        email: Option<String>,
        #[clap(long)]
        phone: Option<String>,
        #[clap(long)]
        event_type: Option<String>,
        #[clap(long)]
        message: Option<String>,
    },
    /// Delete an enquiry
    Delete {
        /// The enquiry ID
        id: String,
    },
}

/// Executes an enquiry command
pub async fn execute(client: &EventoClient, cmd: EnquiryCommands, config: &OutputConfig) -> CommandResult {
    match cmd {
        EnquiryCommands::Submit { name, email, phone, event_type, message } => {
            let dto = CreateEnquiryDto { name, email, phone, message, event_type };
            let enquiry = found(client.submit_enquiry(&dto).await, "Could not submit enquiry")?;
            output::print_enquiry(&enquiry, config);
        }
        EnquiryCommands::Get { id } => {
            let enquiry = found(client.get_enquiry(&id).await, "Enquiry not found")?;
            output::print_enquiry(&enquiry, config);
        }
        EnquiryCommands::Update { id, name, email, phone, event_type, message } => {
            let dto = UpdateEnquiryDto { name, email, phone, message, event_type };
            let enquiry = found(client.update_enquiry(&id, &dto).await, "Could not update enquiry")?;
            output::print_enquiry(&enquiry, config);
        }
        EnquiryCommands::Delete { id } => {
            succeeded(client.delete_enquiry(&id).await, "Could not delete enquiry")?;
            output::print_success(&format!("Deleted enquiry {}", id), config);
        }
    }
    Ok(())
}
