//! Accept loop
//!
//! Runs as one task per listener. Each accept wait is bounded by the accept
//! deadline and raced against the shutdown signal, so a close request is
//! noticed promptly even when no clients connect.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use arc_swap::ArcSwap;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::datapoint::Datapoint;
use crate::deconstructor::MetricDeconstructor;
use crate::metrics::ListenerMetrics;
use crate::session::{CarbonSession, ReaderFactory};

/// Lifecycle of a listener's accept loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ListenerState {
    /// Accepting connections
    Running = 0,
    /// Shutdown requested, loop not yet exited
    Closing = 1,
    /// Loop exited and the listening socket is closed
    Stopped = 2,
}

impl ListenerState {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Running,
            1 => Self::Closing,
            _ => Self::Stopped,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Closing => "closing",
            Self::Stopped => "stopped",
        }
    }
}

impl std::fmt::Display for ListenerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// [`ListenerState`] shared between the handle and the accept task
#[derive(Debug)]
pub(crate) struct SharedState(AtomicU8);

impl SharedState {
    pub(crate) fn new() -> Self {
        Self(AtomicU8::new(ListenerState::Running as u8))
    }

    pub(crate) fn get(&self) -> ListenerState {
        ListenerState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn set(&self, state: ListenerState) {
        self.0.store(state as u8, Ordering::Release);
    }

    /// Move from `Running` to `Closing`. Returns false if already past running.
    pub(crate) fn begin_closing(&self) -> bool {
        self.0
            .compare_exchange(
                ListenerState::Running as u8,
                ListenerState::Closing as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}

/// Everything the accept task owns
pub(crate) struct AcceptLoop {
    pub(crate) name: String,
    pub(crate) listener: TcpListener,
    pub(crate) deadline: Duration,
    pub(crate) metrics: ListenerMetrics,
    pub(crate) deconstructor: Arc<ArcSwap<MetricDeconstructor>>,
    pub(crate) sink: mpsc::Sender<Datapoint>,
    pub(crate) reader_factory: ReaderFactory,
    pub(crate) close_sessions: bool,
    pub(crate) shutdown: watch::Receiver<bool>,
    pub(crate) state: Arc<SharedState>,
}

impl AcceptLoop {
    pub(crate) async fn run(mut self) {
        loop {
            if *self.shutdown.borrow_and_update() || self.state.get() != ListenerState::Running {
                break;
            }

            let accepted = tokio::select! {
                biased;
                // A dropped handle also ends the loop
                _ = self.shutdown.changed() => break,
                accepted = tokio::time::timeout(self.deadline, self.listener.accept()) => accepted,
            };

            match accepted {
                // Deadline passed with no client; re-check state
                Err(_) => continue,
                Ok(Ok((stream, peer))) => self.spawn_session(stream, peer),
                Ok(Err(e)) => {
                    if *self.shutdown.borrow() {
                        break;
                    }
                    warn!("Listener {} failed to accept connection: {}", self.name, e);
                }
            }
        }

        let Self {
            name,
            listener,
            state,
            metrics,
            ..
        } = self;
        drop(listener);
        state.set(ListenerState::Stopped);
        info!(
            "Listener {} stopped ({} connections still open)",
            name,
            metrics.active_connections()
        );
    }

    fn spawn_session(&self, stream: TcpStream, peer: SocketAddr) {
        self.metrics.connection_opened();
        debug!("Listener {} accepted connection from {}", self.name, peer);

        let reader = (self.reader_factory)(stream);
        let mut session = CarbonSession::new(
            reader,
            peer,
            self.metrics.clone(),
            self.deconstructor.clone(),
            self.sink.clone(),
        );
        if self.close_sessions {
            session = session.with_shutdown(self.shutdown.clone());
        }

        tokio::spawn(session.run());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_transitions() {
        let state = SharedState::new();
        assert_eq!(state.get(), ListenerState::Running);

        assert!(state.begin_closing());
        assert_eq!(state.get(), ListenerState::Closing);
        assert!(!state.begin_closing());

        state.set(ListenerState::Stopped);
        assert_eq!(state.get(), ListenerState::Stopped);
        assert!(!state.begin_closing());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ListenerState::Running.to_string(), "running");
        assert_eq!(ListenerState::Closing.to_string(), "closing");
        assert_eq!(ListenerState::Stopped.to_string(), "stopped");
    }

    #[test]
    fn test_state_from_u8() {
        for state in [
            ListenerState::Running,
            ListenerState::Closing,
            ListenerState::Stopped,
        ] {
            assert_eq!(ListenerState::from_u8(state as u8), state);
        }
    }
}
