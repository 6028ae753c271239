/// Web API Handlers
///
/// This module contains the handlers for the RESTful API endpoints.
/// Each handler is responsible for processing a specific type of HTTP request,
/// extracting the necessary data, calling the appropriate repository,
/// and returning a properly formatted response.

mod health_handlers;
mod user_handlers;
mod event_handlers;
mod booking_handlers;
mod enquiry_handlers;
mod auth_handlers;
mod admin_handlers;

// Re-export all handlers
pub use health_handlers::*;
pub use user_handlers::*;
pub use event_handlers::*;
pub use booking_handlers::*;
pub use enquiry_handlers::*;
pub use auth_handlers::*;
pub use admin_handlers::*;
