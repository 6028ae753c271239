pub mod admin;
pub mod auth;
pub mod booking;
pub mod enquiry;
pub mod event;
pub mod user;

/// Error returned by every command
pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Turns a client sentinel into a command error
///
/// The client has already logged the cause; the CLI only needs a short
/// message and a non-zero exit.
pub fn found<T>(value: Option<T>, failure: &str) -> Result<T, Box<dyn std::error::Error>> {
    value.ok_or_else(|| failure.to_string().into())
}

/// Fails the command when a boolean sentinel reports failure
pub fn succeeded(ok: bool, failure: &str) -> CommandResult {
    if ok { Ok(()) } else { Err(failure.to_string().into()) }
}
