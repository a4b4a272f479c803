//! Integration tests for the connect loop and pairing lifecycle.
//!
//! # Purpose
//!
//! These tests exercise the `ConnectionManager` through its *public* API the
//! same way the CLI uses it, with a scripted mock transport in place of a
//! television.  They verify:
//!
//! - The happy paths: a held token probes straight to `Connected`; an
//!   accepted PIN handshake reaches `Connected`.
//! - The pairing fallback: no token (or a rejected one) ends the loop in
//!   `WaitingForPinConfirmation` after the pairing POST.
//! - The retry policy: transport failures sleep 300 ms, 600 ms, 1200 ms, …
//!   capped at 5 s, and the delay resets to 300 ms after a reconnect.
//! - Supersede and stop semantics: a superseded loop emits nothing after the
//!   replacement's first event, and `stop()` interrupts in-progress waits.
//!
//! # What is the pairing flow?
//!
//! ```text
//! Remote                               TV
//! ──────                               ──
//! POST /udap/api/pairing AuthKeyReq
//!                                      displays a PIN on screen
//! (user reads the PIN, restarts with it)
//! POST /udap/api/pairing AuthReq{pin}
//!                                      200 → the PIN is now a bearer token
//! GET /udap/api/data?target=volume_info  (X-Auth-Token: pin)
//!                                      200 → still alive, probe again later
//! ```
//!
//! Timing-sensitive tests run under `start_paused = true`: the Tokio clock
//! only advances when every task is parked on a timer, so virtual elapsed
//! time measures the loop's sleep schedule exactly, with no real waiting.

use std::sync::Arc;
use std::time::Duration;

use netcast_core::ConnectionStatus;
use netcast_remote::application::connection::{ConnectionManager, TransportError, TvTransport};
use netcast_remote::infrastructure::http::mock::MockTvTransport;

fn make_manager(transport: &Arc<MockTvTransport>) -> ConnectionManager {
    let transport = Arc::clone(transport) as Arc<dyn TvTransport>;
    ConnectionManager::new(transport)
}

// ── Pairing lifecycle ─────────────────────────────────────────────────────────

/// Without a stored token the loop announces `Connecting`, POSTs an
/// `AuthKeyReq` pairing document, and ends in `WaitingForPinConfirmation`
/// even though the TV answered 200; a PIN is now on the TV screen and only
/// the caller can supply it.
#[tokio::test]
async fn test_no_token_ends_in_waiting_for_pin() {
    // Arrange
    let transport = Arc::new(MockTvTransport::new());
    transport.set_post_default(Ok(200));
    let manager = make_manager(&transport);

    // Act
    let mut rx = manager.start("192.168.1.50", None).await;

    // Assert – ordered, with Connecting never skipped
    assert_eq!(rx.recv().await, Some(ConnectionStatus::Connecting));
    assert_eq!(
        rx.recv().await,
        Some(ConnectionStatus::WaitingForPinConfirmation)
    );
    assert_eq!(rx.recv().await, None, "loop must end after the PIN fallback");

    let posts = transport.posts.lock().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].ip, "192.168.1.50");
    assert_eq!(posts[0].path, "/udap/api/pairing");
    assert_eq!(posts[0].token, None, "pairing POSTs carry no auth header");
    assert!(posts[0].body.as_deref().unwrap().contains("AuthKeyReq"));
    assert_eq!(transport.get_count(), 0, "no token, so no liveness probe");
}

/// With a valid stored token the loop goes `Connecting` → `Connected` off a
/// single authorized liveness GET, then keeps probing every ~1.5 s without
/// re-announcing `Connected`.
#[tokio::test(start_paused = true)]
async fn test_valid_token_connects_and_heartbeats() {
    // Arrange
    let transport = Arc::new(MockTvTransport::new());
    transport.set_get_default(Ok(200));
    let manager = make_manager(&transport);

    // Act
    let mut rx = manager.start("192.168.1.50", Some("1234")).await;

    // Assert – Connecting is never skipped, even on the fast path
    assert_eq!(rx.recv().await, Some(ConnectionStatus::Connecting));
    assert_eq!(rx.recv().await, Some(ConnectionStatus::Connected));

    let gets = transport.gets.lock().unwrap();
    assert_eq!(gets[0].path, "/udap/api/data?target=volume_info");
    assert_eq!(gets[0].token.as_deref(), Some("1234"));
    drop(gets);

    // Let two idle periods elapse on the virtual clock: more probes fire…
    tokio::time::sleep(Duration::from_millis(3100)).await;
    assert!(
        transport.get_count() >= 3,
        "expected steady ~1.5 s heartbeats, saw {} probes",
        transport.get_count()
    );

    // …but the steady state is not re-announced.
    assert!(
        rx.try_recv().is_err(),
        "repeated Connected must not be re-emitted"
    );

    manager.stop().await;
}

/// A stored token the TV no longer accepts: the liveness probe fails, the
/// pairing handshake answers 401, and the loop falls back to PIN entry
/// instead of retrying on a timer.
#[tokio::test]
async fn test_rejected_token_requires_repairing() {
    // Arrange
    let transport = Arc::new(MockTvTransport::new());
    transport.set_get_default(Ok(401));
    transport.set_post_default(Ok(401));
    let manager = make_manager(&transport);

    // Act
    let mut rx = manager.start("192.168.1.50", Some("9999")).await;

    // Assert
    assert_eq!(rx.recv().await, Some(ConnectionStatus::Connecting));
    assert_eq!(
        rx.recv().await,
        Some(ConnectionStatus::WaitingForPinConfirmation)
    );
    assert_eq!(rx.recv().await, None);

    let posts = transport.posts.lock().unwrap();
    assert_eq!(posts.len(), 1);
    let body = posts[0].body.as_deref().unwrap();
    assert!(body.contains("AuthReq"), "held token is retried as AuthReq");
    assert!(body.contains("<value>9999</value>"));
}

/// An accepted PIN handshake reaches `Connected` and schedules the first
/// liveness probe ~0.8 s later (shorter than the steady 1.5 s idle period).
#[tokio::test(start_paused = true)]
async fn test_accepted_pin_connects_then_probes() {
    // Arrange: liveness fails once (no session yet), the AuthReq succeeds,
    // and every probe after that succeeds.
    let transport = Arc::new(MockTvTransport::new());
    transport.enqueue_get(Err(TransportError::Connect("no session".to_string())));
    transport.set_get_default(Ok(200));
    transport.set_post_default(Ok(200));
    let manager = make_manager(&transport);

    // Act
    let started = tokio::time::Instant::now();
    let mut rx = manager.start("192.168.1.50", Some("5417")).await;

    assert_eq!(rx.recv().await, Some(ConnectionStatus::Connecting));
    assert_eq!(rx.recv().await, Some(ConnectionStatus::Connected));
    assert_eq!(started.elapsed(), Duration::ZERO, "handshake path sleeps nowhere");

    // The post-handshake probe fires after ~0.8 s.
    tokio::time::sleep(Duration::from_millis(850)).await;
    assert_eq!(transport.get_count(), 2, "expected the 0.8 s follow-up probe");

    manager.stop().await;
}

// ── Retry policy ──────────────────────────────────────────────────────────────

/// Three consecutive transport timeouts sleep 300 ms, 600 ms, then 1200 ms
/// before the next attempt: strict doubling from the floor, observed here as
/// virtual elapsed time on the paused clock.
#[tokio::test(start_paused = true)]
async fn test_repeated_timeouts_follow_backoff_schedule() {
    // Arrange
    let transport = Arc::new(MockTvTransport::new());
    transport.enqueue_post(Err(TransportError::Timeout));
    transport.enqueue_post(Err(TransportError::Timeout));
    transport.enqueue_post(Err(TransportError::Timeout));
    transport.set_post_default(Ok(200));
    let manager = make_manager(&transport);

    // Act
    let started = tokio::time::Instant::now();
    let mut rx = manager.start("192.168.1.50", None).await;

    assert_eq!(rx.recv().await, Some(ConnectionStatus::Connecting));
    assert_eq!(
        rx.recv().await,
        Some(ConnectionStatus::WaitingForPinConfirmation)
    );

    // Assert – 300 + 600 + 1200 = 2100 ms of backoff before the 4th attempt
    let elapsed = started.elapsed();
    assert!(
        elapsed >= Duration::from_millis(2100) && elapsed <= Duration::from_millis(2150),
        "expected ~2100 ms of accumulated backoff, got {elapsed:?}"
    );
    assert_eq!(transport.post_count(), 4);
}

/// The retry delay resets to the 300 ms floor after a successful reconnect:
/// after two failures (300 + 600 ms) and a reconnect, the next failure waits
/// 300 ms again rather than continuing the doubling at 1200 ms.
#[tokio::test(start_paused = true)]
async fn test_backoff_resets_after_reconnect() {
    // Arrange: liveness always fails, so every iteration goes through the
    // AuthReq handshake; its outcomes are scripted per attempt.
    let transport = Arc::new(MockTvTransport::new());
    transport.set_get_default(Err(TransportError::Timeout));
    transport.enqueue_post(Err(TransportError::Timeout)); // attempt 1 → sleep 300
    transport.enqueue_post(Err(TransportError::Timeout)); // attempt 2 → sleep 600
    transport.enqueue_post(Ok(200)); // attempt 3 → Connected (resets backoff)
    transport.enqueue_post(Err(TransportError::Timeout)); // attempt 4 → sleep 300 again
    transport.enqueue_post(Ok(200)); // attempt 5 → Connected
    let manager = make_manager(&transport);

    // Act – timestamp every emission on the virtual clock
    let started = tokio::time::Instant::now();
    let mut rx = manager.start("192.168.1.50", Some("5417")).await;

    let mut timeline = Vec::new();
    for _ in 0..4 {
        let status = rx.recv().await.expect("loop is still running");
        timeline.push((status, started.elapsed()));
    }

    // Assert
    // t=0     Connecting, then failures at 300 and 600 ms of backoff
    // t=900   Connected (attempt 3)
    // t=1700  Connecting (post-handshake probe at +800 ms fails)
    // t=2000  Connected (attempt 5, 300 ms later: the backoff was reset)
    assert_eq!(timeline[0].0, ConnectionStatus::Connecting);
    assert_eq!(timeline[1], (ConnectionStatus::Connected, Duration::from_millis(900)));
    assert_eq!(timeline[2], (ConnectionStatus::Connecting, Duration::from_millis(1700)));
    assert_eq!(timeline[3], (ConnectionStatus::Connected, Duration::from_millis(2000)));

    manager.stop().await;
}

// ── Supersede and stop ────────────────────────────────────────────────────────

/// Calling `start` twice supersedes: the first loop is cancelled and fully
/// stopped before the second exists, so its channel closes and no first-loop
/// event can trail the second loop's stream.
#[tokio::test(start_paused = true)]
async fn test_start_supersedes_previous_loop() {
    // Arrange – an unreachable TV keeps the first loop retrying forever
    let transport = Arc::new(MockTvTransport::new());
    transport.set_post_default(Err(TransportError::Connect("refused".to_string())));
    let manager = make_manager(&transport);

    // Act
    let mut first = manager.start("192.168.1.50", None).await;
    assert_eq!(first.recv().await, Some(ConnectionStatus::Connecting));

    let mut second = manager.start("192.168.1.60", None).await;

    // Assert – the first stream is closed; anything still buffered predates
    // the second loop, and the channel then reports disconnect.
    loop {
        match first.try_recv() {
            Ok(status) => assert_eq!(status, ConnectionStatus::Connecting),
            Err(tokio::sync::mpsc::error::TryRecvError::Disconnected) => break,
            Err(tokio::sync::mpsc::error::TryRecvError::Empty) => {
                panic!("first loop's channel must be closed once superseded")
            }
        }
    }

    assert_eq!(second.recv().await, Some(ConnectionStatus::Connecting));
    manager.stop().await;
}

/// `stop()` interrupts an in-progress backoff sleep instead of letting it run
/// out: on the paused clock it completes in zero virtual time even though the
/// loop was mid-way through a multi-second wait.
#[tokio::test(start_paused = true)]
async fn test_stop_interrupts_backoff_wait() {
    // Arrange – every attempt times out, driving the loop into long backoffs
    let transport = Arc::new(MockTvTransport::new());
    transport.set_post_default(Err(TransportError::Timeout));
    let manager = make_manager(&transport);

    let mut rx = manager.start("192.168.1.50", None).await;
    assert_eq!(rx.recv().await, Some(ConnectionStatus::Connecting));

    // Let a few failures accumulate so the current wait is 1200 ms.
    tokio::time::sleep(Duration::from_millis(1000)).await;

    // Act
    let before = tokio::time::Instant::now();
    manager.stop().await;

    // Assert – no virtual time passed: the sleep was abandoned, not served.
    assert_eq!(before.elapsed(), Duration::ZERO);
    assert_eq!(
        rx.recv().await,
        None,
        "no status may be emitted after stop() returns"
    );
}

/// Stopping an idle manager is a no-op rather than an error.
#[tokio::test]
async fn test_stop_without_start_is_harmless() {
    let transport = Arc::new(MockTvTransport::new());
    let manager = make_manager(&transport);
    manager.stop().await;
    assert_eq!(transport.post_count(), 0);
}
