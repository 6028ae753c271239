use clap::Subcommand;
use evento::client::EventoClient;
use evento::dto::{CreateBookingDto, UpdateBookingDto};
use evento::models::PaymentStatus;

use super::{found, succeeded, CommandResult};
use crate::output::{self, OutputConfig};

/// Booking commands
#[derive(Subcommand, Debug)]
pub enum BookingCommands {
    /// Book seats for an event
    ///
    /// Without --total the price is the event's ticket price times the quantity.
    Create {
        #[clap(long)]
        event_id: String,
        #[clap(long)]
        user_id: String,
        #[clap(long, default_value_t = 1)]
        quantity: i32,
        #[clap(long)]
        total: Option<f64>,
        /// pending, completed or failed
        #[clap(long)]
        payment_status: Option<PaymentStatus>,
    },
    /// Update a booking
    Update {
        /// The booking ID
        id: String,
        #[clap(long)]
        quantity: Option<i32>,
        #[clap(long)]
        total: Option<f64>,
        #[clap(long)]
        payment_status: Option<PaymentStatus>,
    },
    /// Cancel a booking and release its seats
    Delete {
        /// The booking ID
        id: String,
    },
}

/// Executes a booking command
pub async fn execute(client: &EventoClient, cmd: BookingCommands, config: &OutputConfig) -> CommandResult {
    match cmd {
        BookingCommands::Create { event_id, user_id, quantity, total, payment_status } => {
            let total_price = match total {
                Some(total) => total,
                None => {
                    let event = found(client.get_event(&event_id).await, "Event not found")?;
                    event.get_price() * f64::from(quantity)
                }
            };
            let dto = CreateBookingDto { event_id, user_id, quantity, total_price, payment_status };
            let booking = found(client.create_booking(&dto).await, "Could not create booking")?;
            output::print_booking(&booking, config);
        }
        BookingCommands::Update { id, quantity, total, payment_status } => {
            let dto = UpdateBookingDto { quantity, total_price: total, payment_status };
            let booking = found(client.update_booking(&id, &dto).await, "Could not update booking")?;
            output::print_booking(&booking, config);
        }
        BookingCommands::Delete { id } => {
            succeeded(client.delete_booking(&id).await, "Could not delete booking")?;
            output::print_success(&format!("Deleted booking {}", id), config);
        }
    }
    Ok(())
}
