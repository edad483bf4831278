//! Skyhop Request Gate
//! Copyright (c) 2026 Mamy Ratsimbazafy
//! Licensed and distributed under either of
//!   * MIT license (license terms at the root of the package or at http://opensource.org/licenses/MIT).
//!   * Apache v2 license (license terms at the root of the package or at http://www.apache.org/licenses/LICENSE-2.0).
//! at your option. This file may not be copied, modified, or distributed except according to those terms.

//! skyhop-internals/request-gate
//! A single in-flight gate for user-triggered requests, tracking an explicit request state.

use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use thiserror::Error;

/// Error returned when the gate refuses a new request
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GateError {
    #[error("a request is already in flight")]
    Busy,
}

/// Lifecycle of the most recent request issued through a gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum RequestState {
    #[default]
    Idle = 0,
    Pending = 1,
    Succeeded = 2,
    Failed = 3,
}

impl RequestState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Pending,
            2 => Self::Succeeded,
            3 => Self::Failed,
            _ => Self::Idle,
        }
    }

    /// True once the last request resolved, successfully or not
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// Allows at most one request in flight at a time.
///
/// Clones share the same state, so a gate can be handed to every task that
/// may trigger the guarded request. There is no queue: a request attempted
/// while another one is pending is refused with [`GateError::Busy`].
///
/// # Examples
///
/// ```ignore
/// let gate = RequestGate::new();
/// let flight = gate.try_begin()?;
/// assert_eq!(gate.state(), RequestState::Pending);
/// flight.succeed();
/// assert_eq!(gate.state(), RequestState::Succeeded);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestGate {
    state: Arc<AtomicU8>,
}

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RequestState {
        RequestState::from_u8(self.state.load(Ordering::SeqCst))
    }

    pub fn is_pending(&self) -> bool {
        self.state() == RequestState::Pending
    }

    /// Move to `Pending` unless a request is already pending.
    ///
    /// The returned guard settles the gate. Dropping it without calling
    /// [`InFlight::succeed`] or [`InFlight::fail`] records a failure.
    pub fn try_begin(&self) -> Result<InFlight, GateError> {
        let pending = RequestState::Pending as u8;
        self.state
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |cur| {
                (cur != pending).then_some(pending)
            })
            .map_err(|_| GateError::Busy)?;
        Ok(InFlight {
            state: Arc::clone(&self.state),
            settled: false,
        })
    }

    /// Run `f` behind the gate and settle the state from its outcome.
    ///
    /// The outer `Result` reports whether the gate admitted the request, the
    /// inner one is the request's own outcome.
    pub async fn run<T, E, F, Fut>(&self, f: F) -> Result<Result<T, E>, GateError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let flight = self.try_begin()?;
        let outcome = f().await;
        match &outcome {
            Ok(_) => flight.succeed(),
            Err(_) => flight.fail(),
        }
        Ok(outcome)
    }
}

/// Guard for an admitted request
#[derive(Debug)]
pub struct InFlight {
    state: Arc<AtomicU8>,
    settled: bool,
}

impl InFlight {
    pub fn succeed(mut self) {
        self.settle(RequestState::Succeeded);
    }

    pub fn fail(mut self) {
        self.settle(RequestState::Failed);
    }

    fn settle(&mut self, outcome: RequestState) {
        self.state.store(outcome as u8, Ordering::SeqCst);
        self.settled = true;
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        // Cancelled or panicked before settling
        if !self.settled {
            self.settle(RequestState::Failed);
        }
    }
}
