//! NetCast Remote CLI entry point.
//!
//! Wires the connection manager to an interactive terminal session: status
//! transitions stream to stdout, and stdin lines become IP / PIN entry or
//! remote key presses.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()            -- last-known IP + pairing key
//!  └─ ConnectionManager::start -- background connect loop
//!  └─ status pump (task)       -- prints transitions, remembers the latest
//!  └─ hint timer (task)        -- "TV on?" nudge after 30 s not connected
//!  └─ stdin dispatch loop
//!       ├─ no IP yet                  -> line is the TV's IP address
//!       ├─ waiting for PIN            -> line is the PIN from the TV screen
//!       └─ otherwise                  -> line is a key name ("up", "ok", …)
//! ```
//!
//! Key presses are only dispatched while the last observed status is
//! `Connected`; the manager itself does not gate this.  A failed dispatch is
//! shown as an action-scoped error line and never disturbs the background
//! loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use netcast_core::{ConnectionStatus, RemoteKey};
use netcast_remote::application::connection::ConnectionManager;
use netcast_remote::infrastructure::http::HttpTransport;
use netcast_remote::infrastructure::storage::config::{load_config, save_config, RemoteConfig};

/// How long after a (re)start before nudging the user about the TV.
const NOT_CONNECTED_HINT_AFTER: Duration = Duration::from_secs(30);

/// Interactive session state shared with the status pump.
struct RemoteCli {
    manager: Arc<ConnectionManager>,
    /// Latest status emitted by the running loop; gates key dispatch.
    status: Arc<Mutex<ConnectionStatus>>,
    config: RemoteConfig,
    /// Cancels the previous hint timer when the loop is restarted.
    hint_cancel: CancellationToken,
}

impl RemoteCli {
    fn new(manager: Arc<ConnectionManager>, config: RemoteConfig) -> Self {
        Self {
            manager,
            status: Arc::new(Mutex::new(ConnectionStatus::Idle)),
            config,
            hint_cancel: CancellationToken::new(),
        }
    }

    /// Persists the current target and (re)starts the connect loop.
    ///
    /// Also restarts the 30-second hint timer, mirroring a fresh attempt.
    async fn restart(&mut self) {
        if let Err(err) = save_config(&self.config) {
            warn!("could not persist config: {err}");
        }

        self.hint_cancel.cancel();
        self.hint_cancel = CancellationToken::new();

        let mut rx = self
            .manager
            .start(&self.config.tv.ip, self.config.tv.pairing_key.as_deref())
            .await;

        // ── Status pump ───────────────────────────────────────────────────────
        // Ends on its own when the superseded loop's channel closes.
        let status_slot = Arc::clone(&self.status);
        tokio::spawn(async move {
            while let Some(status) = rx.recv().await {
                println!("[status] {}", status.title());
                if status == ConnectionStatus::WaitingForPinConfirmation {
                    println!("Type the PIN shown on the TV and press enter.");
                }
                *status_slot.lock().await = status;
            }
        });

        // ── Hint timer ────────────────────────────────────────────────────────
        let status_slot = Arc::clone(&self.status);
        let cancel = self.hint_cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(NOT_CONNECTED_HINT_AFTER) => {
                    let status = status_slot.lock().await.clone();
                    if !status.is_connected() {
                        println!("Still not connected. TV on? Same Wi-Fi?");
                    }
                }
            }
        });
    }

    /// Sends one key press if the loop currently reports `Connected`.
    async fn dispatch_key(&self, key: RemoteKey) {
        let status = self.status.lock().await.clone();
        if !status.is_connected() {
            println!("Not connected ({}); key ignored.", status.title());
            return;
        }

        let result = self
            .manager
            .send_key(&self.config.tv.ip, self.config.tv.pairing_key.as_deref(), key)
            .await;
        match result {
            Ok(()) => info!(key = key.name(), "key sent"),
            // Action-scoped failure: shown to the user, loop left alone.
            Err(err) => println!("[status] {}", ConnectionStatus::Error(err.to_string()).title()),
        }
    }

    /// Routes one stdin line based on where the session currently stands.
    async fn handle_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }

        if line == "help" {
            print_help();
            return;
        }

        if let Some(rest) = line.strip_prefix("ip ") {
            let ip = rest.trim();
            if !ip.is_empty() {
                self.config.tv.ip = ip.to_string();
                println!("Connecting to {}…", self.config.tv.ip);
                self.restart().await;
            }
            return;
        }

        if self.config.tv.ip.is_empty() {
            self.config.tv.ip = line.to_string();
            println!("Connecting to {}…", self.config.tv.ip);
            self.restart().await;
            return;
        }

        let waiting_for_pin =
            *self.status.lock().await == ConnectionStatus::WaitingForPinConfirmation;
        if waiting_for_pin {
            self.config.tv.pairing_key = Some(line.to_string());
            self.restart().await;
            return;
        }

        match line.parse::<RemoteKey>() {
            Ok(key) => self.dispatch_key(key).await,
            Err(err) => println!("{err}; type `help` for the key list."),
        }
    }
}

fn print_help() {
    println!("Keys:");
    for chunk in RemoteKey::ALL.chunks(6) {
        let names: Vec<&str> = chunk.iter().map(|k| k.name()).collect();
        println!("  {}", names.join("  "));
    }
    println!("Commands: help, ip <address>, quit");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging.  Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let config = load_config().unwrap_or_else(|err| {
        warn!("could not load config: {err}; starting fresh");
        RemoteConfig::default()
    });

    let transport = Arc::new(HttpTransport::new());
    let manager = Arc::new(ConnectionManager::new(transport));
    let mut cli = RemoteCli::new(manager, config);

    println!("NetCast Remote. Type `help` for keys, `quit` to exit.");
    if cli.config.tv.ip.trim().is_empty() {
        println!("[status] {}", ConnectionStatus::Idle.title());
        println!("Enter the TV's IP address:");
    } else {
        println!("Connecting to {}…", cli.config.tv.ip);
        cli.restart().await;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
            line = lines.next_line() => {
                match line? {
                    Some(line) if line.trim() == "quit" || line.trim() == "q" => break,
                    Some(line) => cli.handle_line(&line).await,
                    None => break, // stdin closed
                }
            }
        }
    }

    cli.manager.stop().await;
    println!("Bye.");
    Ok(())
}
