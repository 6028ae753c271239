use std::sync::Arc;

use super::api::{AdminCredentials, EventoClient};
use super::notify::{Notification, Notifier};

/// Admin dashboard login state
///
/// Holds the credential pair after a successful login so later dashboard
/// calls can send it along.
pub struct AdminSession {
    client: EventoClient,
    notifier: Arc<dyn Notifier>,
    credentials: Option<AdminCredentials>,
}

impl AdminSession {
    pub fn new(client: EventoClient, notifier: Arc<dyn Notifier>) -> Self {
        Self { client, notifier, credentials: None }
    }

    pub async fn login(&mut self, username: &str, password: &str) -> bool {
        let credentials = AdminCredentials {
            username: username.to_string(),
            password: password.to_string(),
        };

        if self.client.admin_login(&credentials).await {
            self.credentials = Some(credentials);
            self.notifier.notify(Notification::info("Admin Login Successful", "Welcome to the admin dashboard"));
            true
        } else {
            self.credentials = None;
            self.notifier.notify(Notification::destructive("Admin Login Failed", "Invalid credentials"));
            false
        }
    }

    pub fn logout(&mut self) {
        self.credentials = None;
        self.notifier.notify(Notification::info("Admin Logged Out", "You have been successfully logged out"));
    }

    pub fn is_logged_in(&self) -> bool {
        self.credentials.is_some()
    }

    /// The accepted pair, if logged in
    pub fn credentials(&self) -> Option<&AdminCredentials> {
        self.credentials.as_ref()
    }

    pub fn client(&self) -> &EventoClient {
        &self.client
    }
}
