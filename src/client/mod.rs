//! Client side of the Evento API
//!
//! [`EventoClient`] is the data access layer front ends call; [`SessionContext`]
//! and [`AdminSession`] keep user and admin login state on top of it.

mod admin;
mod api;
mod notify;
mod session;

pub use admin::AdminSession;
pub use api::{AdminCredentials, ClientError, EventoClient};
pub use notify::{ChannelNotifier, LogNotifier, Notification, Notifier, Variant};
pub use session::{AuthOutcome, IdentityProvider, RemoteIdentity, SessionContext, TokenStore};
