//! Service Worker Lifecycle
//!
//! Host side of the worker: tracks the state machine, dispatches events to
//! the handler and decides whether a fetch is intercepted at all. The
//! handler itself stays stateless.

use alloc::boxed::Box;
use alloc::sync::Arc;
use core::fmt;

use crate::events::{FetchEvent, InstallEvent};
use crate::fetch::{Request, Response};
use crate::handler::{FetchError, InstallError, LifecycleHandler};
use crate::network::Network;

/// Service Worker states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Initial state, being parsed
    Parsed,
    /// Installing (install event fired)
    Installing,
    /// Installed, waiting to activate
    Installed,
    /// Activating (activate event fired)
    Activating,
    /// Active and controlling pages
    Activated,
    /// Install failed or worker replaced
    Redundant,
}

impl Default for WorkerState {
    fn default() -> Self {
        Self::Parsed
    }
}

/// Service Worker error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceWorkerError {
    /// State transition invalid
    InvalidStateTransition {
        from: WorkerState,
        to: WorkerState,
    },
    /// Install reaction failed
    Install(InstallError),
}

impl fmt::Display for ServiceWorkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceWorkerError::InvalidStateTransition { from, to } => {
                write!(f, "invalid state transition {:?} -> {:?}", from, to)
            }
            ServiceWorkerError::Install(e) => write!(f, "install failed: {}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ServiceWorkerError {}

/// Check whether a state transition is allowed.
fn is_valid_transition(from: WorkerState, to: WorkerState) -> bool {
    use WorkerState::*;
    matches!(
        (from, to),
        (Parsed, Installing)
            | (Installing, Installed)
            | (Installing, Redundant)
            | (Installed, Activating)
            | (Installed, Redundant)
            | (Activating, Activated)
            | (Activating, Redundant)
            | (Activated, Redundant)
            | (Redundant, Parsed)
    )
}

/// A registered worker as seen by the host.
pub struct ServiceWorker {
    handler: Box<dyn LifecycleHandler>,
    network: Arc<dyn Network>,
    state: WorkerState,
}

impl ServiceWorker {
    /// Create a new service worker in the `Parsed` state
    pub fn new(handler: Box<dyn LifecycleHandler>, network: Arc<dyn Network>) -> Self {
        Self {
            handler,
            network,
            state: WorkerState::Parsed,
        }
    }

    /// Get current state
    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Check if the worker is active
    pub fn is_active(&self) -> bool {
        self.state == WorkerState::Activated
    }

    fn transition(&mut self, to: WorkerState) -> Result<(), ServiceWorkerError> {
        let from = self.state;
        if !is_valid_transition(from, to) {
            return Err(ServiceWorkerError::InvalidStateTransition { from, to });
        }
        log::debug!("[SW Lifecycle] {:?} -> {:?}", from, to);
        self.state = to;
        Ok(())
    }

    /// Run the install reaction and wait for it to settle.
    ///
    /// A failed install leaves the worker `Redundant`.
    pub fn install(&mut self) -> Result<(), ServiceWorkerError> {
        self.transition(WorkerState::Installing)?;

        let mut event = InstallEvent::new();
        self.handler.on_install(&mut event);

        match event.take_outcome() {
            Some(Err(e)) => {
                self.transition(WorkerState::Redundant)?;
                Err(ServiceWorkerError::Install(e))
            }
            // No wait_until: install completes as soon as the handler returns.
            Some(Ok(())) | None => self.transition(WorkerState::Installed),
        }
    }

    /// Host retry after a failed install.
    pub fn retry_install(&mut self) -> Result<(), ServiceWorkerError> {
        self.transition(WorkerState::Parsed)?;
        self.install()
    }

    /// Activate an installed worker.
    pub fn activate(&mut self) -> Result<(), ServiceWorkerError> {
        self.transition(WorkerState::Activating)?;
        self.transition(WorkerState::Activated)
    }

    /// Route a page request.
    ///
    /// Only an activated worker intercepts; otherwise, or when the handler
    /// leaves the event unanswered, the request goes straight to the network.
    pub fn fetch(&self, request: Request) -> Result<Response, FetchError> {
        if self.is_active() {
            let mut event = FetchEvent::new(request);
            self.handler.on_fetch(&mut event);
            if let Some(result) = event.take_response() {
                return result;
            }
            return self.network.fetch(event.request()).map_err(FetchError::Network);
        }
        self.network.fetch(&request).map_err(FetchError::Network)
    }
}
