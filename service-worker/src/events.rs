//! Service Worker Events
//!
//! The two lifecycle events the worker reacts to. Each event carries the
//! settled result of the reaction back to the host.

use core::sync::atomic::{AtomicU64, Ordering};

use crate::fetch::{Request, Response};
use crate::handler::{FetchError, InstallError};

/// Fetch event ID counter
static NEXT_FETCH_ID: AtomicU64 = AtomicU64::new(1);

/// Event type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    /// Install event
    Install,
    /// Fetch event
    Fetch,
}

/// Extendable event trait
pub trait ExtendableEvent {
    /// Get event type
    fn event_type(&self) -> EventType;

    /// Whether the reaction has settled
    fn is_settled(&self) -> bool;
}

/// Install event
///
/// The host must not activate the worker before the outcome passed to
/// [`InstallEvent::wait_until`] is known.
#[derive(Debug, Default)]
pub struct InstallEvent {
    outcome: Option<Result<(), InstallError>>,
}

impl InstallEvent {
    /// Create new install event
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome the install waits on. Only the first call counts.
    pub fn wait_until(&mut self, outcome: Result<(), InstallError>) {
        if self.outcome.is_none() {
            self.outcome = Some(outcome);
        }
    }

    /// Take the settled outcome
    pub fn take_outcome(&mut self) -> Option<Result<(), InstallError>> {
        self.outcome.take()
    }
}

impl ExtendableEvent for InstallEvent {
    fn event_type(&self) -> EventType {
        EventType::Install
    }

    fn is_settled(&self) -> bool {
        self.outcome.is_some()
    }
}

/// Fetch event ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchEventId(u64);

impl FetchEventId {
    /// Create a new ID
    pub fn new() -> Self {
        Self(NEXT_FETCH_ID.fetch_add(1, Ordering::SeqCst))
    }
}

impl Default for FetchEventId {
    fn default() -> Self {
        Self::new()
    }
}

/// Fetch event
#[derive(Debug)]
pub struct FetchEvent {
    id: FetchEventId,
    request: Request,
    response: Option<Result<Response, FetchError>>,
}

impl FetchEvent {
    /// Create a new fetch event
    pub fn new(request: Request) -> Self {
        Self {
            id: FetchEventId::new(),
            request,
            response: None,
        }
    }

    /// Get the event ID
    pub fn id(&self) -> FetchEventId {
        self.id
    }

    /// Get the request
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Check if respondWith was called
    pub fn responded(&self) -> bool {
        self.response.is_some()
    }

    /// Respond with a result. Returns `false` if a response was already set.
    pub fn respond_with(&mut self, response: Result<Response, FetchError>) -> bool {
        if self.response.is_some() {
            return false;
        }
        self.response = Some(response);
        true
    }

    /// Take the response
    pub fn take_response(&mut self) -> Option<Result<Response, FetchError>> {
        self.response.take()
    }
}

impl ExtendableEvent for FetchEvent {
    fn event_type(&self) -> EventType {
        EventType::Fetch
    }

    fn is_settled(&self) -> bool {
        self.responded()
    }
}
