use std::collections::BTreeMap;

use clap::ValueEnum;
use evento::client::Notification;
use evento::dto::AdminSummary;
use evento::models::{Availability, Booking, BookingWithEvent, Enquiry, Event, User};
use serde::Serialize;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

/// Bundled output configuration passed to all print functions
#[derive(Debug, Clone, Copy)]
pub struct OutputConfig {
    /// The output format
    pub format: OutputFormat,
    /// When true, print minimal output (just IDs or counts)
    pub quiet: bool,
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error: could not encode output: {}", e),
    }
}

/// Prints rows as left-aligned columns sized to their widest cell
fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| rows.iter().map(|r| r[i].chars().count()).chain([h.len()]).max().unwrap_or(0))
        .collect();

    let line = |cells: Vec<String>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    println!("{}", line(headers.iter().map(|h| h.to_string()).collect()));
    for row in rows {
        println!("{}", line(row));
    }
}

/// Shared handling for list output: JSON, quiet ids, empty message or table
fn print_list<T: Serialize>(
    items: &[T],
    config: &OutputConfig,
    empty: &str,
    id: impl Fn(&T) -> String,
    headers: &[&str],
    row: impl Fn(&T) -> Vec<String>,
) {
    match config.format {
        OutputFormat::Json => print_json(items),
        OutputFormat::Human => {
            if items.is_empty() {
                if !config.quiet {
                    println!("{}", empty);
                }
                return;
            }
            if config.quiet {
                for item in items {
                    println!("{}", id(item));
                }
                return;
            }
            print_table(headers, items.iter().map(row).collect());
        }
    }
}

/// Prints a list of users in the specified format
pub fn print_users(users: &[User], config: &OutputConfig) {
    print_list(users, config, "No users found.", User::get_id, &["ID", "NAME", "EMAIL"], |u| {
        vec![u.get_id(), u.get_name(), u.get_email()]
    });
}

/// Prints a single user in the specified format
pub fn print_user(user: &User, config: &OutputConfig) {
    match config.format {
        OutputFormat::Json => print_json(user),
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", user.get_id());
                return;
            }
            println!("ID:      {}", user.get_id());
            println!("Name:    {}", user.get_name());
            println!("Email:   {}", user.get_email());
            if let Some(avatar) = user.get_avatar_url() {
                println!("Avatar:  {}", avatar);
            }
            println!("Created: {}", user.get_created_at());
        }
    }
}

/// Prints a list of events in the specified format
pub fn print_events(events: &[Event], config: &OutputConfig) {
    print_list(
        events,
        config,
        "No events found.",
        Event::get_id,
        &["ID", "DATE", "TITLE", "PRICE", "SEATS", "STATUS"],
        |e| {
            vec![
                e.get_id(),
                e.get_date().to_string(),
                e.get_title(),
                format!("{:.2}", e.get_price()),
                format!("{}/{}", e.get_current_attendees(), e.get_max_attendees()),
                e.get_status().to_string(),
            ]
        },
    );
}

/// Prints a single event in the specified format
pub fn print_event(event: &Event, config: &OutputConfig) {
    match config.format {
        OutputFormat::Json => print_json(event),
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", event.get_id());
                return;
            }
            println!("ID:          {}", event.get_id());
            println!("Title:       {}", event.get_title());
            println!("Description: {}", event.get_description());
            println!("When:        {} {}", event.get_date(), event.get_time());
            println!("Where:       {}, {}", event.get_location(), event.get_address());
            println!("Category:    {}", event.get_category());
            println!("Price:       {:.2}", event.get_price());
            println!("Seats:       {} of {} taken", event.get_current_attendees(), event.get_max_attendees());
            println!("Status:      {}", event.get_status());
            if let Some(user_id) = event.get_user_id() {
                println!("Created by:  {}", user_id);
            }
        }
    }
}

/// Prints bookings together with their events
pub fn print_bookings(bookings: &[BookingWithEvent], config: &OutputConfig) {
    print_list(
        bookings,
        config,
        "No bookings found.",
        |b| b.booking.get_id(),
        &["ID", "EVENT", "QTY", "TOTAL", "PAYMENT"],
        |b| {
            vec![
                b.booking.get_id(),
                b.event.get_title(),
                b.booking.get_quantity().to_string(),
                format!("{:.2}", b.booking.get_total_price()),
                b.booking.get_payment_status().to_string(),
            ]
        },
    );
}

/// Prints a single booking in the specified format
pub fn print_booking(booking: &Booking, config: &OutputConfig) {
    match config.format {
        OutputFormat::Json => print_json(booking),
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", booking.get_id());
                return;
            }
            println!("ID:       {}", booking.get_id());
            println!("Event:    {}", booking.get_event_id());
            println!("User:     {}", booking.get_user_id());
            println!("Quantity: {}", booking.get_quantity());
            println!("Total:    {:.2}", booking.get_total_price());
            println!("Payment:  {}", booking.get_payment_status());
            println!("Created:  {}", booking.get_created_at());
        }
    }
}

/// Prints a list of enquiries in the specified format
pub fn print_enquiries(enquiries: &[Enquiry], config: &OutputConfig) {
    print_list(
        enquiries,
        config,
        "No enquiries found.",
        Enquiry::get_id,
        &["ID", "NAME", "EMAIL", "TYPE"],
        |e| vec![e.get_id(), e.get_name(), e.get_email(), e.get_event_type()],
    );
}

/// Prints a single enquiry in the specified format
pub fn print_enquiry(enquiry: &Enquiry, config: &OutputConfig) {
    match config.format {
        OutputFormat::Json => print_json(enquiry),
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", enquiry.get_id());
                return;
            }
            println!("ID:      {}", enquiry.get_id());
            println!("Name:    {}", enquiry.get_name());
            println!("Email:   {}", enquiry.get_email());
            println!("Phone:   {}", enquiry.get_phone());
            println!("Type:    {}", enquiry.get_event_type());
            println!("Message: {}", enquiry.get_message());
            println!("Sent:    {}", enquiry.get_created_at());
        }
    }
}

pub fn print_availability(availability: &Availability, config: &OutputConfig) {
    match config.format {
        OutputFormat::Json => print_json(availability),
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", availability.available_spots);
                return;
            }
            println!(
                "{} of {} seats available ({} taken)",
                availability.available_spots, availability.max_attendees, availability.current_attendees
            );
        }
    }
}

pub fn print_summary(summary: &AdminSummary, config: &OutputConfig) {
    match config.format {
        OutputFormat::Json => print_json(summary),
        OutputFormat::Human => {
            println!("Users:     {}", summary.users);
            println!("Events:    {}", summary.events);
            println!("Bookings:  {}", summary.bookings);
            println!("Enquiries: {}", summary.enquiries);
            println!("Revenue:   {:.2}", summary.completed_revenue);
        }
    }
}

/// Prints a single labelled value, e.g. revenue or a capacity answer
pub fn print_value<T: Serialize + std::fmt::Display>(label: &str, value: T, config: &OutputConfig) {
    match config.format {
        OutputFormat::Json => print_json(&BTreeMap::from([(label, &value)])),
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", value);
            } else {
                println!("{}: {}", label, value);
            }
        }
    }
}

/// Prints a notification to stderr so it never mixes with JSON output
pub fn print_notification(notification: &Notification, config: &OutputConfig) {
    if config.quiet {
        return;
    }
    let marker = if notification.is_destructive() { "!" } else { "*" };
    eprintln!("{} {}: {}", marker, notification.title, notification.description);
}

pub fn print_success(message: &str, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if !config.quiet {
                println!("{}", message);
            }
        }
        OutputFormat::Json => print_json(&serde_json::json!({"status": "ok", "message": message})),
    }
}
