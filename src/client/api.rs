use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

use crate::admin::{ADMIN_PASSWORD_HEADER, ADMIN_USERNAME_HEADER};
use crate::dto::{
    AdminLoginDto, AdminLoginResponse, AdminSummary, CapacityResponse, CreateBookingDto, CreateEnquiryDto,
    CreateEventDto, CreateUserDto, HealthResponse, SessionResponse, SignInDto, SignUpDto, UpdateBookingDto, UpdateEnquiryDto,
    UpdateEventDto, UpdateUserDto,
};
use crate::models::{Availability, Booking, BookingWithEvent, Enquiry, Event, Revenue, User};

/// Error type for client operations
#[derive(Error, Debug)]
pub enum ClientError {
    /// Server returned an error status with a message body
    #[error("Server error ({}): {message}", .status.as_u16())]
    Server { status: StatusCode, message: String },
    /// Network/connection/decoding error
    #[error("{0}")]
    Request(#[from] reqwest::Error),
    /// The session token could not be read or written locally
    #[error("Token storage error: {0}")]
    Storage(#[from] std::io::Error),
    /// The configured server URL cannot carry API paths
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// The message to show a user: the server's own text when there is one
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Server { message, .. } => message.clone(),
            ClientError::Request(_) => "Could not reach the server. Please try again later.".to_string(),
            ClientError::Storage(_) => "Could not store your session on this device.".to_string(),
            ClientError::InvalidUrl(_) => "The server address is not valid.".to_string(),
        }
    }
}

/// Extension trait for checking HTTP responses and extracting server error messages
trait ResponseExt {
    /// Checks for error status and extracts the server's error message body
    async fn check(self) -> Result<reqwest::Response, ClientError>;
}

impl ResponseExt for reqwest::Response {
    async fn check(self) -> Result<reqwest::Response, ClientError> {
        if self.status().is_success() {
            return Ok(self);
        }
        let status = self.status();
        let message = match self.json::<serde_json::Value>().await {
            Ok(body) => body.get("error")
                .and_then(|e| e.as_str())
                .unwrap_or("Unknown error")
                .to_string(),
            Err(_) => format!("HTTP {}", status),
        };
        Err(ClientError::Server { status, message })
    }
}

/// Logs a failed call and substitutes the caller's fallback value
fn or_sentinel<T>(operation: &str, result: Result<T, ClientError>, sentinel: T) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            error!(operation, error = %err, "Remote call failed");
            sentinel
        }
    }
}

/// Username and password sent with every admin request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

/// HTTP client for the Evento API
///
/// Every data call is a single request. Failures never surface as errors:
/// lookups yield `None`, listings an empty `Vec`, deletes and checks `false`
/// and revenue `0.0`, with the cause logged. Only the session calls return
/// `Result`, so sign-in forms can show the server's message.
#[derive(Debug, Clone)]
pub struct EventoClient {
    /// The base URL of the server (e.g. "http://localhost:3000")
    base_url: String,
    client: Client,
}

impl EventoClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL of an API route, given one element per path segment
    ///
    /// Each segment is percent-encoded, so an id containing `/`, `?` or `#`
    /// stays inside its own segment.
    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ClientError> {
        let url = self.url(segments)?;
        debug!("{} {}", method, url.path());
        Ok(self.client.request(method, url))
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await?.check().await?;
        Ok(response.json().await?)
    }

    async fn send_empty(request: RequestBuilder) -> Result<(), ClientError> {
        request.send().await?.check().await?;
        Ok(())
    }

    async fn get<T: DeserializeOwned>(&self, path: &[&str]) -> Result<T, ClientError> {
        Self::send_json(self.request(Method::GET, path)?).await
    }

    async fn get_with_query<T, Q>(&self, path: &[&str], query: &Q) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        Self::send_json(self.request(Method::GET, path)?.query(query)).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &[&str], body: &B) -> Result<T, ClientError> {
        Self::send_json(self.request(Method::POST, path)?.json(body)).await
    }

    async fn put<B: Serialize, T: DeserializeOwned>(&self, path: &[&str], body: &B) -> Result<T, ClientError> {
        Self::send_json(self.request(Method::PUT, path)?.json(body)).await
    }

    async fn delete(&self, path: &[&str]) -> Result<(), ClientError> {
        Self::send_empty(self.request(Method::DELETE, path)?).await
    }

    async fn admin_get<T: DeserializeOwned>(&self, path: &[&str], credentials: &AdminCredentials) -> Result<T, ClientError> {
        let request = self
            .request(Method::GET, path)?
            .header(ADMIN_USERNAME_HEADER, &credentials.username)
            .header(ADMIN_PASSWORD_HEADER, &credentials.password);
        Self::send_json(request).await
    }

    /// Liveness check against `GET /api/health`
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        self.get(&["health"]).await
    }

    // ── Users ────────────────────────────────────────────────────────

    pub async fn get_users(&self) -> Vec<User> {
        or_sentinel("get_users", self.get(&["users"]).await, Vec::new())
    }

    pub async fn get_user(&self, id: &str) -> Option<User> {
        or_sentinel("get_user", self.get(&["users", id]).await.map(Some), None)
    }

    pub async fn create_user(&self, dto: &CreateUserDto) -> Option<User> {
        or_sentinel("create_user", self.post(&["users"], dto).await.map(Some), None)
    }

    pub async fn update_user(&self, id: &str, dto: &UpdateUserDto) -> Option<User> {
        or_sentinel("update_user", self.put(&["users", id], dto).await.map(Some), None)
    }

    pub async fn delete_user(&self, id: &str) -> bool {
        or_sentinel("delete_user", self.delete(&["users", id]).await.map(|_| true), false)
    }

    /// A user's bookings, each with the event it is for
    pub async fn get_user_bookings(&self, user_id: &str) -> Vec<BookingWithEvent> {
        or_sentinel("get_user_bookings", self.get(&["users", user_id, "bookings"]).await, Vec::new())
    }

    // ── Events ───────────────────────────────────────────────────────

    pub async fn get_events(&self) -> Vec<Event> {
        or_sentinel("get_events", self.get(&["events"]).await, Vec::new())
    }

    /// Active, upcoming events whose title or description contains `term`
    pub async fn search_events(&self, term: &str) -> Vec<Event> {
        or_sentinel("search_events", self.get_with_query(&["events"], &[("search", term)]).await, Vec::new())
    }

    pub async fn get_upcoming_events(&self) -> Vec<Event> {
        or_sentinel("get_upcoming_events", self.get(&["events", "upcoming"]).await, Vec::new())
    }

    pub async fn get_event(&self, id: &str) -> Option<Event> {
        or_sentinel("get_event", self.get(&["events", id]).await.map(Some), None)
    }

    pub async fn create_event(&self, dto: &CreateEventDto) -> Option<Event> {
        or_sentinel("create_event", self.post(&["events"], dto).await.map(Some), None)
    }

    pub async fn update_event(&self, id: &str, dto: &UpdateEventDto) -> Option<Event> {
        or_sentinel("update_event", self.put(&["events", id], dto).await.map(Some), None)
    }

    pub async fn delete_event(&self, id: &str) -> bool {
        or_sentinel("delete_event", self.delete(&["events", id]).await.map(|_| true), false)
    }

    pub async fn get_event_availability(&self, id: &str) -> Option<Availability> {
        or_sentinel("get_event_availability", self.get(&["events", id, "availability"]).await.map(Some), None)
    }

    /// Sum of completed booking totals; `0.0` when the call fails
    pub async fn get_event_revenue(&self, id: &str) -> f64 {
        let revenue = self.get::<Revenue>(&["events", id, "revenue"]).await;
        or_sentinel("get_event_revenue", revenue.map(|r| r.total_revenue), 0.0)
    }

    /// Whether `quantity` more seats fit; `false` when the call fails
    pub async fn check_capacity(&self, event_id: &str, quantity: i32) -> bool {
        let answer = self
            .get_with_query::<CapacityResponse, _>(&["events", event_id, "capacity"], &[("quantity", quantity)])
            .await;
        or_sentinel("check_capacity", answer.map(|a| a.available), false)
    }

    // ── Bookings ─────────────────────────────────────────────────────

    pub async fn create_booking(&self, dto: &CreateBookingDto) -> Option<Booking> {
        or_sentinel("create_booking", self.post(&["bookings"], dto).await.map(Some), None)
    }

    pub async fn update_booking(&self, id: &str, dto: &UpdateBookingDto) -> Option<Booking> {
        or_sentinel("update_booking", self.put(&["bookings", id], dto).await.map(Some), None)
    }

    pub async fn delete_booking(&self, id: &str) -> bool {
        or_sentinel("delete_booking", self.delete(&["bookings", id]).await.map(|_| true), false)
    }

    // ── Enquiries ────────────────────────────────────────────────────

    pub async fn submit_enquiry(&self, dto: &CreateEnquiryDto) -> Option<Enquiry> {
        or_sentinel("submit_enquiry", self.post(&["enquiries"], dto).await.map(Some), None)
    }

    pub async fn get_enquiry(&self, id: &str) -> Option<Enquiry> {
        or_sentinel("get_enquiry", self.get(&["enquiries", id]).await.map(Some), None)
    }

    pub async fn update_enquiry(&self, id: &str, dto: &UpdateEnquiryDto) -> Option<Enquiry> {
        or_sentinel("update_enquiry", self.put(&["enquiries", id], dto).await.map(Some), None)
    }

    pub async fn delete_enquiry(&self, id: &str) -> bool {
        or_sentinel("delete_enquiry", self.delete(&["enquiries", id]).await.map(|_| true), false)
    }

    // ── Admin ────────────────────────────────────────────────────────

    /// Checks an admin credential pair against the server
    pub async fn admin_login(&self, credentials: &AdminCredentials) -> bool {
        let dto = AdminLoginDto {
            username: credentials.username.clone(),
            password: credentials.password.clone(),
        };
        let response = self.post::<_, AdminLoginResponse>(&["admin", "login"], &dto).await;
        or_sentinel("admin_login", response.map(|r| r.success), false)
    }

    pub async fn admin_summary(&self, credentials: &AdminCredentials) -> Option<AdminSummary> {
        let result = self.admin_get(&["admin", "summary"], credentials).await;
        or_sentinel("admin_summary", result.map(Some), None)
    }

    pub async fn admin_users(&self, credentials: &AdminCredentials) -> Vec<User> {
        or_sentinel("admin_users", self.admin_get(&["admin", "users"], credentials).await, Vec::new())
    }

    pub async fn admin_events(&self, credentials: &AdminCredentials) -> Vec<Event> {
        or_sentinel("admin_events", self.admin_get(&["admin", "events"], credentials).await, Vec::new())
    }

    pub async fn admin_bookings(&self, credentials: &AdminCredentials) -> Vec<BookingWithEvent> {
        or_sentinel("admin_bookings", self.admin_get(&["admin", "bookings"], credentials).await, Vec::new())
    }

    pub async fn admin_enquiries(&self, credentials: &AdminCredentials) -> Vec<Enquiry> {
        or_sentinel("admin_enquiries", self.admin_get(&["admin", "enquiries"], credentials).await, Vec::new())
    }

    // ── Sessions ─────────────────────────────────────────────────────

    pub async fn sign_up(&self, dto: &SignUpDto) -> Result<SessionResponse, ClientError> {
        self.post(&["auth", "sign-up"], dto).await
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SessionResponse, ClientError> {
        let dto = SignInDto { email: email.to_string(), password: password.to_string() };
        self.post(&["auth", "sign-in"], &dto).await
    }

    pub async fn sign_out(&self, token: &str) -> Result<(), ClientError> {
        Self::send_empty(self.request(Method::POST, &["auth", "sign-out"])?.bearer_auth(token)).await
    }

    /// The session behind `token`, with its user
    pub async fn current_session(&self, token: &str) -> Result<SessionResponse, ClientError> {
        Self::send_json(self.request(Method::GET, &["auth", "session"])?.bearer_auth(token)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Nothing listens on the discard port, so every call fails fast
    fn unreachable_client() -> EventoClient {
        EventoClient::new("http://127.0.0.1:9/")
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = EventoClient::new("http://localhost:3000/");
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(client.url(&["events"]).unwrap().as_str(), "http://localhost:3000/api/events");
    }

    #[test]
    fn test_path_segments_are_encoded() {
        let client = EventoClient::new("http://localhost:3000");
        let url = client.url(&["events", "a/b?c#d", "availability"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/events/a%2Fb%3Fc%23d/availability");

        let nested = EventoClient::new("http://localhost:3000/evento/");
        assert_eq!(nested.url(&["users"]).unwrap().as_str(), "http://localhost:3000/evento/api/users");
    }

    #[tokio::test]
    async fn test_invalid_base_url() {
        let client = EventoClient::new("not a url");
        assert!(matches!(client.url(&["events"]), Err(ClientError::InvalidUrl(_))));
        assert!(client.get_events().await.is_empty());
        assert!(matches!(client.health().await, Err(ClientError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_unreachable_server_yields_sentinels() {
        let client = unreachable_client();
        let admin = AdminCredentials { username: "admin".to_string(), password: "admin".to_string() };

        assert!(client.get_events().await.is_empty());
        assert!(client.search_events("music").await.is_empty());
        assert!(client.get_event("evt_1").await.is_none());
        assert!(!client.delete_booking("bk_1").await);
        assert_eq!(client.get_event_revenue("evt_1").await, 0.0);
        assert!(!client.check_capacity("evt_1", 1).await);
        assert!(!client.admin_login(&admin).await);
        assert!(client.admin_summary(&admin).await.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_server_session_calls_return_errors() {
        let client = unreachable_client();

        let err = client.sign_in("a@example.com", "pw").await.unwrap_err();
        assert!(matches!(err, ClientError::Request(_)));
        assert!(err.user_message().contains("Could not reach"));
        assert!(matches!(client.health().await, Err(ClientError::Request(_))));
    }

    #[test]
    fn test_server_error_display() {
        let err = ClientError::Server { status: StatusCode::CONFLICT, message: "Not enough seats available".to_string() };
        assert_eq!(err.to_string(), "Server error (409): Not enough seats available");
        assert_eq!(err.user_message(), "Not enough seats available");
    }
}
