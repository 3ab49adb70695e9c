//! Process-wide session cache with single-flight bootstrap.
//!
//! At most one bootstrap runs at a time. Callers arriving while one is in
//! flight await the same shared future and all see its outcome. A successful
//! outcome is stored; a failed one leaves the cache empty so the next call
//! starts afresh.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use sphere_types::error::BrokerError;
use sphere_types::session::Session;
use tokio::sync::Mutex;

use crate::bootstrap::SessionBootstrapper;
use crate::ledger::LedgerClient;

type SharedBootstrap = Shared<BoxFuture<'static, Result<Session, BrokerError>>>;

enum CacheState {
    Empty,
    InFlight { flight: u64, future: SharedBootstrap },
    Ready(Session),
}

/// Holds the active [`Session`], bootstrapping it on first use.
pub struct SessionCache<L> {
    bootstrapper: Arc<SessionBootstrapper<L>>,
    state: Mutex<CacheState>,
    next_flight: AtomicU64,
}

impl<L: LedgerClient + 'static> SessionCache<L> {
    pub fn new(bootstrapper: SessionBootstrapper<L>) -> Self {
        Self {
            bootstrapper: Arc::new(bootstrapper),
            state: Mutex::new(CacheState::Empty),
            next_flight: AtomicU64::new(1),
        }
    }

    pub fn bootstrapper(&self) -> &SessionBootstrapper<L> {
        &self.bootstrapper
    }

    /// The cached session, bootstrapping one if the cache is empty.
    pub async fn get(&self) -> Result<Session, BrokerError> {
        let (flight, future) = {
            let mut state = self.state.lock().await;
            match &*state {
                CacheState::Ready(session) => return Ok(session.clone()),
                CacheState::InFlight { flight, future } => {
                    tracing::debug!(flight, "joining in-flight bootstrap");
                    (*flight, future.clone())
                }
                CacheState::Empty => {
                    let flight = self.next_flight.fetch_add(1, Ordering::Relaxed);
                    let bootstrapper = Arc::clone(&self.bootstrapper);
                    let future = async move { bootstrapper.bootstrap().await }
                        .boxed()
                        .shared();
                    tracing::debug!(flight, "starting bootstrap");
                    *state = CacheState::InFlight {
                        flight,
                        future: future.clone(),
                    };
                    (flight, future)
                }
            }
        };

        let outcome = future.await;

        let mut state = self.state.lock().await;
        let still_current =
            matches!(&*state, CacheState::InFlight { flight: current, .. } if *current == flight);
        if still_current {
            *state = match &outcome {
                Ok(session) => CacheState::Ready(session.clone()),
                Err(_) => CacheState::Empty,
            };
        }
        outcome
    }

    /// The cached session, if any, without bootstrapping.
    pub async fn peek(&self) -> Option<Session> {
        match &*self.state.lock().await {
            CacheState::Ready(session) => Some(session.clone()),
            _ => None,
        }
    }

    /// Drop the cached session if it is still `stale`.
    ///
    /// Returns `false` when the cache already holds a different session (or
    /// none), so concurrent callers that saw the same refusal trigger one
    /// re-bootstrap between them.
    pub async fn invalidate(&self, stale: &Session) -> bool {
        let mut state = self.state.lock().await;
        match &*state {
            CacheState::Ready(current) if current == stale => {
                tracing::info!(provider = %stale.provider_address, "invalidating cached session");
                *state = CacheState::Empty;
                true
            }
            _ => false,
        }
    }
}
