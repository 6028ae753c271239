//! Session state for front ends
//!
//! A [`SessionContext`] is created once at the application root and handed to
//! whatever needs the signed-in user. It asks an [`IdentityProvider`] for the
//! current session, then follows the provider's change channel so the cached
//! user stays current after sign-in and sign-out.

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use super::api::{ClientError, EventoClient};
use super::notify::{Notification, Notifier};
use crate::dto::{SessionResponse, SignUpDto};
use crate::models::User;

/// Remote authority over users and sessions
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The live session, or `None` when nobody is signed in
    async fn current_session(&self) -> Result<Option<SessionResponse>, ClientError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionResponse, ClientError>;

    async fn sign_up(&self, dto: &SignUpDto) -> Result<SessionResponse, ClientError>;

    async fn sign_out(&self) -> Result<(), ClientError>;

    /// Receives every session change made through this provider
    fn subscribe(&self) -> watch::Receiver<Option<SessionResponse>>;
}

/// Where the bearer token survives between runs
#[derive(Debug)]
pub enum TokenStore {
    File(PathBuf),
    Memory(Mutex<Option<String>>),
}

impl TokenStore {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        TokenStore::File(path.into())
    }

    pub fn memory() -> Self {
        TokenStore::Memory(Mutex::new(None))
    }

    /// The stored token; a missing or blank file means no token
    pub async fn load(&self) -> io::Result<Option<String>> {
        match self {
            TokenStore::File(path) => match tokio::fs::read_to_string(path).await {
                Ok(content) => {
                    let token = content.trim();
                    Ok((!token.is_empty()).then(|| token.to_string()))
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e),
            },
            TokenStore::Memory(slot) => Ok(lock(slot)?.clone()),
        }
    }

    pub async fn save(&self, token: &str) -> io::Result<()> {
        match self {
            TokenStore::File(path) => {
                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::write(path, token).await
            }
            TokenStore::Memory(slot) => {
                *lock(slot)? = Some(token.to_string());
                Ok(())
            }
        }
    }

    pub async fn clear(&self) -> io::Result<()> {
        match self {
            TokenStore::File(path) => match tokio::fs::remove_file(path).await {
                Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
                _ => Ok(()),
            },
            TokenStore::Memory(slot) => {
                *lock(slot)? = None;
                Ok(())
            }
        }
    }
}

fn lock(slot: &Mutex<Option<String>>) -> io::Result<std::sync::MutexGuard<'_, Option<String>>> {
    slot.lock().map_err(|_| io::Error::other("token store lock poisoned"))
}

/// [`IdentityProvider`] backed by the Evento server
pub struct RemoteIdentity {
    client: EventoClient,
    store: TokenStore,
    changes: watch::Sender<Option<SessionResponse>>,
}

impl RemoteIdentity {
    pub fn new(client: EventoClient, store: TokenStore) -> Self {
        let (changes, _) = watch::channel(None);
        Self { client, store, changes }
    }

    async fn adopt(&self, session: SessionResponse) -> Result<SessionResponse, ClientError> {
        self.store.save(&session.token).await?;
        self.changes.send_replace(Some(session.clone()));
        Ok(session)
    }
}

#[async_trait]
impl IdentityProvider for RemoteIdentity {
    async fn current_session(&self) -> Result<Option<SessionResponse>, ClientError> {
        let Some(token) = self.store.load().await? else {
            return Ok(None);
        };

        match self.client.current_session(&token).await {
            Ok(session) => Ok(Some(session)),
            Err(ClientError::Server { status: StatusCode::UNAUTHORIZED, .. }) => {
                debug!("Stored session is no longer valid");
                self.store.clear().await?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionResponse, ClientError> {
        let session = self.client.sign_in(email, password).await?;
        self.adopt(session).await
    }

    async fn sign_up(&self, dto: &SignUpDto) -> Result<SessionResponse, ClientError> {
        let session = self.client.sign_up(dto).await?;
        self.adopt(session).await
    }

    /// Ends the remote session, then forgets the local token
    ///
    /// If the server cannot be told, the token is kept so the session can
    /// still be ended later. A 401 means the server already dropped it.
    async fn sign_out(&self) -> Result<(), ClientError> {
        if let Some(token) = self.store.load().await? {
            match self.client.sign_out(&token).await {
                Ok(()) => {}
                Err(ClientError::Server { status: StatusCode::UNAUTHORIZED, .. }) => {
                    debug!("Session was already gone on the server");
                }
                Err(e) => return Err(e),
            }
        }

        self.store.clear().await?;
        self.changes.send_replace(None);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Option<SessionResponse>> {
        self.changes.subscribe()
    }
}

/// Result of a sign-in or sign-up attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    pub success: bool,
    pub error: Option<String>,
}

impl AuthOutcome {
    fn ok() -> Self {
        Self { success: true, error: None }
    }

    fn failed(error: impl Into<String>) -> Self {
        Self { success: false, error: Some(error.into()) }
    }
}

/// Clears the submitting flag when an attempt finishes
struct Submitting<'a>(&'a AtomicBool);

impl<'a> Submitting<'a> {
    fn begin(flag: &'a AtomicBool) -> Option<Self> {
        (!flag.swap(true, Ordering::AcqRel)).then_some(Self(flag))
    }
}

impl Drop for Submitting<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The signed-in user and the actions that change it
pub struct SessionContext {
    provider: Arc<dyn IdentityProvider>,
    notifier: Arc<dyn Notifier>,
    user: Arc<RwLock<Option<User>>>,
    ready: watch::Receiver<bool>,
    submitting: AtomicBool,
    listener: JoinHandle<()>,
}

impl SessionContext {
    /// Starts loading the current session in the background
    ///
    /// Must be called from within a tokio runtime. The context reports
    /// `is_loading() == true` until the first lookup finishes; afterwards it
    /// follows the provider's session changes until dropped.
    pub fn start(provider: Arc<dyn IdentityProvider>, notifier: Arc<dyn Notifier>) -> Self {
        let user = Arc::new(RwLock::new(None));
        let (ready_tx, ready) = watch::channel(false);
        // Subscribe before the lookup so no change slips between the two
        let mut changes = provider.subscribe();

        let listener = tokio::spawn({
            let provider = provider.clone();
            let notifier = notifier.clone();
            let user = user.clone();
            async move {
                match provider.current_session().await {
                    Ok(session) => *user.write().await = session.map(|s| s.user),
                    Err(e) => {
                        error!(error = %e, "Error checking session");
                        notifier.notify(Notification::destructive(
                            "Authentication Error",
                            "Could not connect to authentication service. Please check your connection or try again later.",
                        ));
                    }
                }
                ready_tx.send_replace(true);

                while changes.changed().await.is_ok() {
                    let session = changes.borrow_and_update().clone();
                    *user.write().await = session.map(|s| s.user);
                }
            }
        });

        Self {
            provider,
            notifier,
            user,
            ready,
            submitting: AtomicBool::new(false),
            listener,
        }
    }

    /// Whether the initial session lookup is still running
    pub fn is_loading(&self) -> bool {
        !*self.ready.borrow()
    }

    /// Waits for the initial session lookup to finish
    pub async fn ready(&self) {
        let mut ready = self.ready.clone();
        // An error means the listener is gone, so there is nothing left to wait for
        let _ = ready.wait_for(|done| *done).await;
    }

    pub async fn user(&self) -> Option<User> {
        self.user.read().await.clone()
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AuthOutcome {
        if email.trim().is_empty() || password.is_empty() {
            return self.fail("Login Failed", "Email and password are required");
        }
        let Some(_submitting) = Submitting::begin(&self.submitting) else {
            return AuthOutcome::failed("A request is already in progress");
        };

        match self.provider.sign_in(email, password).await {
            Ok(session) => {
                *self.user.write().await = Some(session.user);
                self.notifier.notify(Notification::info("Login Successful", "Welcome back!"));
                AuthOutcome::ok()
            }
            Err(e) => {
                warn!(error = %e, "Sign in failed");
                self.fail("Login Failed", &e.user_message())
            }
        }
    }

    pub async fn sign_up(&self, email: &str, password: &str, name: &str) -> AuthOutcome {
        if email.trim().is_empty() || password.is_empty() || name.trim().is_empty() {
            return self.fail("Registration Failed", "Name, email and password are required");
        }
        let Some(_submitting) = Submitting::begin(&self.submitting) else {
            return AuthOutcome::failed("A request is already in progress");
        };

        let dto = SignUpDto {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
        };

        match self.provider.sign_up(&dto).await {
            Ok(session) => {
                *self.user.write().await = Some(session.user);
                self.notifier.notify(Notification::info("Registration Successful", "Your account has been created!"));
                AuthOutcome::ok()
            }
            Err(e) => {
                warn!(error = %e, "Sign up failed");
                self.fail("Registration Failed", &e.user_message())
            }
        }
    }

    pub async fn sign_out(&self) -> AuthOutcome {
        match self.provider.sign_out().await {
            Ok(()) => {
                *self.user.write().await = None;
                self.notifier.notify(Notification::info("Logged Out", "You have been successfully logged out."));
                AuthOutcome::ok()
            }
            Err(e) => {
                error!(error = %e, "Sign out failed");
                self.fail("Error", "Could not log out. Please try again.")
            }
        }
    }

    fn fail(&self, title: &str, description: &str) -> AuthOutcome {
        self.notifier.notify(Notification::destructive(title, description));
        AuthOutcome::failed(description)
    }
}

impl Drop for SessionContext {
    fn drop(&mut self) {
        self.listener.abort();
    }
}
