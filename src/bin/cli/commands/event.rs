use chrono::NaiveDate;
use clap::Subcommand;
use evento::client::EventoClient;
use evento::dto::{CreateEventDto, UpdateEventDto};
use evento::models::EventStatus;

use super::{found, succeeded, CommandResult};
use crate::output::{self, OutputConfig};

/// Event commands
#[derive(Subcommand, Debug)]
pub enum EventCommands {
    /// List events, optionally searching upcoming ones by text
    List {
        /// Only active upcoming events whose title or description contains this
        #[clap(long)]
        search: Option<String>,
    },
    /// List active events from today on
    Upcoming,
    /// Show one event
    Get {
        /// The event ID
        id: String,
    },
    /// Create a new event
    Create {
        #[clap(long)]
        title: String,
        #[clap(long, default_value = "")]
        description: String,
        /// Date as YYYY-MM-DD
        #[clap(long)]
        date: NaiveDate,
        /// Start time as shown to visitors, e.g. "09:00 AM"
        #[clap(long)]
        time: String,
        #[clap(long)]
        location: String,
        #[clap(long, default_value = "")]
        address: String,
        #[clap(long)]
        price: f64,
        #[clap(long)]
        category: String,
        #[clap(long)]
        image_url: Option<String>,
        /// The creating user
        #[clap(long)]
        user_id: Option<String>,
        #[clap(long)]
        max_attendees: Option<i32>,
    },
    /// Update an event
    Update {
        /// The event ID
        id: String,
        #[clap(long)]
        title: Option<String>,
        #[clap(long)]
        description: Option<String>,
        #[clap(long)]
        date: Option<NaiveDate>,
        #[clap(long)]
        time: Option<String>,
        #[clap(long)]
        location: Option<String>,
        #[clap(long)]
        price: Option<f64>,
        #[clap(long)]
        max_attendees: Option<i32>,
        /// active or cancelled
        #[clap(long)]
        status: Option<EventStatus>,
    },
    /// Delete an event and its bookings
    Delete {
        /// The event ID
        id: String,
    },
    /// Show how many seats are left
    Availability {
        /// The event ID
        id: String,
    },
    /// Show revenue from completed bookings
    Revenue {
        /// The event ID
        id: String,
    },
    /// Check whether a number of seats can still be booked
    Capacity {
        /// The event ID
        id: String,
        #[clap(long, default_value_t = 1)]
        quantity: i32,
    },
}

/// Executes an event command
pub async fn execute(client: &EventoClient, cmd: EventCommands, config: &OutputConfig) -> CommandResult {
    match cmd {
        EventCommands::List { search } => {
            let events = match search {
                Some(term) => client.search_events(&term).await,
                None => client.get_events().await,
            };
            output::print_events(&events, config);
        }
        EventCommands::Upcoming => {
            output::print_events(&client.get_upcoming_events().await, config);
        }
        EventCommands::Get { id } => {
            let event = found(client.get_event(&id).await, "Event not found")?;
            output::print_event(&event, config);
        }
        EventCommands::Create {
            title,
            description,
            date,
            time,
            location,
            address,
            price,
            category,
            image_url,
            user_id,
            max_attendees,
        } => {
            let dto = CreateEventDto {
                title,
                description,
                date,
                time,
                location,
                address,
                price,
                image_url,
                category,
                user_id,
                max_attendees,
                status: None,
            };
            let event = found(client.create_event(&dto).await, "Could not create event")?;
            output::print_event(&event, config);
        }
        EventCommands::Update { id, title, description, date, time, location, price, max_attendees, status } => {
            let dto = UpdateEventDto {
                title,
                description,
                date,
                time,
                location,
                price,
                max_attendees,
                status,
                ..Default::default()
            };
            let event = found(client.update_event(&id, &dto).await, "Could not update event")?;
            output::print_event(&event, config);
        }
        EventCommands::Delete { id } => {
            succeeded(client.delete_event(&id).await, "Could not delete event")?;
            output::print_success(&format!("Deleted event {}", id), config);
        }
        EventCommands::Availability { id } => {
            let availability = found(client.get_event_availability(&id).await, "Event not found")?;
            output::print_availability(&availability, config);
        }
        EventCommands::Revenue { id } => {
            output::print_value("total_revenue", client.get_event_revenue(&id).await, config);
        }
        EventCommands::Capacity { id, quantity } => {
            output::print_value("available", client.check_capacity(&id, quantity).await, config);
        }
    }
    Ok(())
}
