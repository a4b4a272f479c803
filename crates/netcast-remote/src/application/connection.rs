//! ConnectionManager: the TV authentication state machine and reconnect loop.
//!
//! # Lifecycle
//!
//! ```text
//! start(ip, token)
//!  └─ spawn connect loop ──> status stream (mpsc)
//!       │
//!       ├─ token held: authorized liveness GET
//!       │     200        -> Connected, probe again after ~1.5 s
//!       │     otherwise  -> fall through to handshake
//!       ├─ handshake: POST pairing document
//!       │     AuthReq accepted  -> Connected, probe after ~0.8 s
//!       │     needs PIN         -> WaitingForPinConfirmation, loop ends
//!       └─ transport failure -> Connecting, sleep backoff (300 ms … 5 s), retry
//! ```
//!
//! The loop runs as one spawned task per `start` call.  Starting again
//! *supersedes*: the previous loop is cancelled and awaited before the new
//! one exists, so two loops never race on the same TV.  Cancellation is
//! cooperative and interrupts in-progress sleeps via `tokio::select!`, which
//! keeps `stop()` latency at one scheduling tick rather than a full backoff.
//!
//! `WaitingForPinConfirmation` is terminal for a loop instance: the TV is
//! showing a PIN and only the caller can obtain it, so the loop falls back to
//! the caller instead of burning retries.
//!
//! Key dispatch (`send_key`) is a separate short-lived operation sharing only
//! the transport with the loop; its failures are returned to the caller and
//! never disturb loop or backoff state.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use netcast_core::protocol::{self, build_key_command, build_pairing_request};
use netcast_core::{ConnectionStatus, RemoteKey};
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Error type for a single TV request.
///
/// Every variant is recoverable: the connect loop answers with backoff and
/// retry, never by giving up.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The TV did not answer within the request budget.
    #[error("request timed out")]
    Timeout,
    /// TCP connect failed (TV off, wrong network, refused).
    #[error("connection failed: {0}")]
    Connect(String),
    /// The target IP could not be formed into a request URL.
    #[error("invalid target address: {0}")]
    InvalidAddress(String),
    /// Any other transport-level failure.
    #[error("request failed: {0}")]
    Request(String),
}

/// Error type for a single key dispatch.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command never reached the TV.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The TV answered but refused the command (typically a stale token).
    #[error("TV rejected the command with HTTP {status}")]
    Rejected { status: u16 },
}

/// Transport seam between the state machine and the network.
///
/// The production implementation lives in the infrastructure layer
/// (`HttpTransport`); tests inject a recording mock.  Requests are
/// self-contained, so implementations must be safe to share between the
/// connect loop and concurrent `send_key` calls.
#[async_trait]
pub trait TvTransport: Send + Sync {
    /// POSTs an XML document to `path` on the TV, returning the HTTP status.
    async fn post(
        &self,
        ip: &str,
        path: &str,
        token: Option<&str>,
        body: String,
        timeout: Duration,
    ) -> Result<u16, TransportError>;

    /// GETs `path` on the TV, returning the HTTP status.  Bodies are ignored.
    async fn get(
        &self,
        ip: &str,
        path: &str,
        token: Option<&str>,
        timeout: Duration,
    ) -> Result<u16, TransportError>;
}

/// Timing knobs for the connect loop.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Budget for the authorized liveness GET.
    pub liveness_timeout: Duration,
    /// Budget for pairing and key-command POSTs.
    pub command_timeout: Duration,
    /// Pause between liveness probes while connected.
    pub idle_poll: Duration,
    /// Pause before the first probe right after an accepted handshake.
    pub post_handshake_poll: Duration,
    /// First retry delay after a transport failure.
    pub backoff_floor: Duration,
    /// Retry delay ceiling.
    pub backoff_cap: Duration,
    /// Capacity of the status channel handed to the caller.
    pub status_buffer: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            liveness_timeout: Duration::from_millis(1500),
            command_timeout: Duration::from_millis(2000),
            idle_poll: Duration::from_millis(1500),
            post_handshake_poll: Duration::from_millis(800),
            backoff_floor: Duration::from_millis(300),
            backoff_cap: Duration::from_millis(5000),
            status_buffer: 32,
        }
    }
}

/// Exponential retry delay: starts at the floor, doubles per failure, capped,
/// reset to the floor on every successful `Connected` transition.
#[derive(Debug, Clone)]
pub struct Backoff {
    floor: Duration,
    cap: Duration,
    current: Duration,
}

impl Backoff {
    /// Creates a backoff starting at `floor`.
    pub fn new(floor: Duration, cap: Duration) -> Self {
        Self {
            floor,
            cap,
            current: floor,
        }
    }

    /// Returns the delay to sleep now and doubles the stored interval.
    pub fn next(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.cap);
        delay
    }

    /// Returns to the floor.  Called on every successful connection.
    pub fn reset(&mut self) {
        self.current = self.floor;
    }

    /// The delay the next failure would sleep for.
    pub fn current(&self) -> Duration {
        self.current
    }
}

/// Outcome of one pairing exchange.
enum Handshake {
    /// The TV accepted the supplied PIN; it is now a usable bearer token.
    Accepted,
    /// The TV is (or should now be) displaying a PIN for the user.
    NeedsPin,
}

/// Status sink with duplicate suppression.
///
/// Consecutive identical statuses are dropped here so steady-state heartbeats
/// stay externally `Connected` and retry iterations do not spam `Connecting`.
struct StatusEmitter {
    tx: mpsc::Sender<ConnectionStatus>,
    last: Option<ConnectionStatus>,
}

impl StatusEmitter {
    fn new(tx: mpsc::Sender<ConnectionStatus>) -> Self {
        Self { tx, last: None }
    }

    /// Emits `status` unless it equals the previous emission.
    ///
    /// Returns `false` when the loop should stop: either the receiver is gone
    /// or cancellation fired while the channel was full.
    async fn emit(&mut self, cancel: &CancellationToken, status: ConnectionStatus) -> bool {
        if self.last.as_ref() == Some(&status) {
            return true;
        }
        self.last = Some(status.clone());
        tokio::select! {
            _ = cancel.cancelled() => false,
            sent = self.tx.send(status) => sent.is_ok(),
        }
    }
}

/// One running connect loop: its cancellation token and task handle.
struct LoopHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl LoopHandle {
    /// Cancels the loop and waits for the task to finish, so that no status
    /// event of the old loop can appear after this returns.
    async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(err) = self.task.await {
            if err.is_panic() {
                warn!("connect loop task panicked: {err}");
            }
        }
    }
}

/// Drives a TV through authentication and reports live status.
///
/// Owns at most one running connect loop; `start` supersedes, `stop` cancels.
/// The transport is shared, reentrant, and also used by `send_key`.
pub struct ConnectionManager {
    transport: Arc<dyn TvTransport>,
    config: ConnectionConfig,
    active: Mutex<Option<LoopHandle>>,
}

impl ConnectionManager {
    /// Creates a manager with default timing.
    pub fn new(transport: Arc<dyn TvTransport>) -> Self {
        Self::with_config(transport, ConnectionConfig::default())
    }

    /// Creates a manager with explicit timing (tests shrink the intervals).
    pub fn with_config(transport: Arc<dyn TvTransport>, config: ConnectionConfig) -> Self {
        Self {
            transport,
            config,
            active: Mutex::new(None),
        }
    }

    /// Starts the connect loop against `ip`, superseding any previous loop.
    ///
    /// The previous loop (if any) is cancelled and awaited *before* the new
    /// task is spawned: no event from the old loop is delivered after the new
    /// loop's first event.  Returns the status stream for this loop instance;
    /// the channel closes when the loop ends.
    pub async fn start(
        &self,
        ip: &str,
        pairing_token: Option<&str>,
    ) -> mpsc::Receiver<ConnectionStatus> {
        let mut active = self.active.lock().await;
        if let Some(previous) = active.take() {
            debug!("superseding running connect loop");
            previous.shutdown().await;
        }

        let ip = ip.trim().to_string();
        let token = pairing_token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let (tx, rx) = mpsc::channel(self.config.status_buffer);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_loop(
            Arc::clone(&self.transport),
            self.config.clone(),
            ip,
            token,
            tx,
            cancel.clone(),
        ));
        *active = Some(LoopHandle { cancel, task });
        rx
    }

    /// Cancels the active loop, waiting until it has fully stopped.
    ///
    /// No status event is emitted after this returns.  A no-op when no loop
    /// is running.
    pub async fn stop(&self) {
        let handle = self.active.lock().await.take();
        if let Some(handle) = handle {
            handle.shutdown().await;
        }
    }

    /// Sends a single key press to the TV.
    ///
    /// Fire-and-forget relative to the connect loop: shares only the
    /// transport with it, and a failure here is returned to the caller
    /// without touching loop or backoff state.  Callers gate this on the last
    /// observed status being `Connected`.
    ///
    /// # Errors
    ///
    /// [`CommandError::Transport`] when the TV could not be reached,
    /// [`CommandError::Rejected`] when it answered with a non-200 status.
    pub async fn send_key(
        &self,
        ip: &str,
        pairing_token: Option<&str>,
        key: RemoteKey,
    ) -> Result<(), CommandError> {
        let token = pairing_token.map(str::trim).filter(|t| !t.is_empty());
        let body = build_key_command(key);
        let status = self
            .transport
            .post(
                ip.trim(),
                protocol::COMMAND_PATH,
                token,
                body,
                self.config.command_timeout,
            )
            .await?;
        if status == 200 {
            Ok(())
        } else {
            Err(CommandError::Rejected { status })
        }
    }
}

// ── Connect loop ──────────────────────────────────────────────────────────────

/// The unattended connect loop; one spawned task per `start` call.
async fn run_loop(
    transport: Arc<dyn TvTransport>,
    config: ConnectionConfig,
    ip: String,
    token: Option<String>,
    tx: mpsc::Sender<ConnectionStatus>,
    cancel: CancellationToken,
) {
    let mut emitter = StatusEmitter::new(tx);

    if ip.is_empty() {
        // Nothing to dial; tell the caller and end immediately.
        let _ = emitter.emit(&cancel, ConnectionStatus::Idle).await;
        return;
    }

    let mut backoff = Backoff::new(config.backoff_floor, config.backoff_cap);

    if !emitter.emit(&cancel, ConnectionStatus::Connecting).await {
        return;
    }

    loop {
        if cancel.is_cancelled() {
            debug!(%ip, "connect loop cancelled");
            return;
        }

        // Heartbeat path: an already-held token is probed with a cheap
        // authorized GET before any pairing traffic.
        if let Some(token) = token.as_deref() {
            if probe_authorized(transport.as_ref(), &ip, token, &config).await {
                if !emitter.emit(&cancel, ConnectionStatus::Connected).await {
                    return;
                }
                backoff.reset();
                if !wait(&cancel, config.idle_poll).await {
                    return;
                }
                continue;
            }
        }

        if cancel.is_cancelled() {
            return;
        }
        // A failed probe while connected is a real drop; announce it.
        if !emitter.emit(&cancel, ConnectionStatus::Connecting).await {
            return;
        }

        match handshake(transport.as_ref(), &ip, token.as_deref(), &config).await {
            Ok(Handshake::Accepted) => {
                info!(%ip, "pairing accepted");
                if !emitter.emit(&cancel, ConnectionStatus::Connected).await {
                    return;
                }
                backoff.reset();
                if !wait(&cancel, config.post_handshake_poll).await {
                    return;
                }
            }
            Ok(Handshake::NeedsPin) => {
                info!(%ip, "TV is displaying a PIN; waiting for the caller");
                let _ = emitter
                    .emit(&cancel, ConnectionStatus::WaitingForPinConfirmation)
                    .await;
                return;
            }
            Err(err) => {
                let delay = backoff.next();
                debug!(%ip, error = %err, ?delay, "transport failure; backing off");
                if !emitter.emit(&cancel, ConnectionStatus::Connecting).await {
                    return;
                }
                if !wait(&cancel, delay).await {
                    return;
                }
            }
        }
    }
}

/// Authorized liveness probe.  Any non-200 answer or transport failure counts
/// as "not alive" and routes the loop to the handshake path.
async fn probe_authorized(
    transport: &dyn TvTransport,
    ip: &str,
    token: &str,
    config: &ConnectionConfig,
) -> bool {
    match transport
        .get(ip, protocol::LIVENESS_PATH, Some(token), config.liveness_timeout)
        .await
    {
        Ok(status) => status == 200,
        Err(err) => {
            debug!(%ip, error = %err, "liveness probe failed");
            false
        }
    }
}

/// One pairing exchange against the TV.
///
/// With a PIN, a 200 means the TV accepted it and the PIN is now a bearer
/// token; anything else means the token is invalid or expired and the user
/// must re-pair.  Without a PIN the request only makes the TV display one,
/// so the outcome is always [`Handshake::NeedsPin`].
async fn handshake(
    transport: &dyn TvTransport,
    ip: &str,
    pin: Option<&str>,
    config: &ConnectionConfig,
) -> Result<Handshake, TransportError> {
    let pin = pin.map(str::trim).filter(|p| !p.is_empty());
    let body = build_pairing_request(pin);
    let status = transport
        .post(ip, protocol::PAIRING_PATH, None, body, config.command_timeout)
        .await?;

    match pin {
        Some(_) if status == 200 => Ok(Handshake::Accepted),
        _ => Ok(Handshake::NeedsPin),
    }
}

/// Cancellable sleep.  Returns `false` when cancellation interrupted it.
async fn wait(cancel: &CancellationToken, period: Duration) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = time::sleep(period) => true,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
