//! End-to-end tests against a fake OpenDeck server.
//!
//! Each test binds a real WebSocket listener on an ephemeral loopback port,
//! points the bridge at it via the `server_addr` override, and asserts on
//! the exact frames crossing the wire in both directions.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, WebSocketStream};

use opendeck_bridge::infrastructure::host::mock::{MockDeckHost, RecordingSurface};
use opendeck_bridge::infrastructure::host::{DeckHost, PageChange};
use opendeck_bridge::{
    spawn_bridge, BridgeConfig, ConnectionState, DeckButton, DeviceDescriptor, ImageAssignment,
};

const WAIT: Duration = Duration::from_secs(5);

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ── Fake OpenDeck server ──────────────────────────────────────────────────────

struct FakeServer {
    listener: TcpListener,
}

struct ServerSide {
    ws: WebSocketStream<TcpStream>,
}

impl FakeServer {
    async fn bind() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        Self { listener }
    }

    fn addr(&self) -> std::net::SocketAddr {
        self.listener.local_addr().unwrap()
    }

    /// Accepts the next bridge connection and completes the WS handshake.
    async fn accept(&self) -> ServerSide {
        let (stream, _) = timeout(WAIT, self.listener.accept()).await.unwrap().unwrap();
        let ws = timeout(WAIT, accept_async(stream)).await.unwrap().unwrap();
        ServerSide { ws }
    }
}

impl ServerSide {
    /// Reads the next text frame and parses it as JSON.
    async fn recv_json(&mut self) -> Value {
        loop {
            let msg = timeout(WAIT, self.ws.next())
                .await
                .expect("timed out waiting for a frame")
                .expect("connection closed while a frame was expected")
                .unwrap();
            if let Message::Text(text) = msg {
                return serde_json::from_str(&text).unwrap();
            }
        }
    }

    async fn send_text(&mut self, text: &str) {
        self.ws.send(Message::Text(text.to_string())).await.unwrap();
    }

    async fn close(mut self) {
        let _ = self.ws.close(None).await;
    }
}

// ── Fixtures ──────────────────────────────────────────────────────────────────

fn test_config(server: &FakeServer) -> BridgeConfig {
    BridgeConfig {
        server_addr: Some(server.addr()),
        register_settle: Duration::ZERO,
        reconnect_cooldown: Duration::from_millis(50),
        ..BridgeConfig::default()
    }
}

fn scenario_host() -> Arc<MockDeckHost> {
    Arc::new(MockDeckHost::new().with_controller(
        DeviceDescriptor::from_serial("ABC123", "Stream Deck Original", 3, 5, 0),
        "Main",
    ))
}

/// Drains the three-frame replay sequence a fresh connection always starts
/// with and returns it.
async fn drain_replay(conn: &mut ServerSide) -> [Value; 3] {
    [
        conn.recv_json().await,
        conn.recv_json().await,
        conn.recv_json().await,
    ]
}

/// Polls `check` until it passes or the deadline expires.
async fn eventually(what: &str, check: impl Fn() -> bool) {
    for _ in 0..250 {
        if check() {
            return;
        }
        sleep(Duration::from_millis(20)).await;
    }
    panic!("condition never became true: {what}");
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_first_exchange_is_register_plugin_then_device_then_profile() {
    init_tracing();

    // Arrange: one live deck, page "Main"
    let server = FakeServer::bind().await;
    let (_page_tx, page_rx) = mpsc::channel(8);
    let (_handle, task) = spawn_bridge(scenario_host(), test_config(&server), page_rx);

    // Act
    let mut conn = server.accept().await;
    let [first, second, third] = drain_replay(&mut conn).await;

    // Assert: the exact wire shapes, in order
    assert_eq!(
        first,
        json!({
            "event": "registerPlugin",
            "uuid": "opendeck_alternative_elgato_implementation",
        })
    );
    assert_eq!(
        second,
        json!({
            "event": "registerDevice",
            "payload": {
                "id": "sd-ABC123",
                "name": "Stream Deck Original (StreamController)",
                "rows": 3,
                "columns": 5,
                "encoders": 0,
                "type": 0,
            },
        })
    );
    assert_eq!(
        third,
        json!({
            "event": "switchProfile",
            "device": "sd-ABC123",
            "profile": "Main",
        })
    );

    task.abort();
}

#[tokio::test]
async fn test_button_lifecycle_events_reach_the_server() {
    init_tracing();

    let server = FakeServer::bind().await;
    let (_page_tx, page_rx) = mpsc::channel(8);
    let (handle, task) = spawn_bridge(scenario_host(), test_config(&server), page_rx);
    let mut conn = server.accept().await;
    drain_replay(&mut conn).await;
    assert_eq!(handle.connection_state(), ConnectionState::Connected);

    // Act: the host element loads, then the user presses and releases it
    let surface = Arc::new(RecordingSurface::new("ABC123", "Main", 4));
    let button = DeckButton::new(Arc::clone(&handle), surface.clone());
    button.on_ready();
    button.on_key_down();
    button.on_key_up();

    // Assert: placeholder applied locally before any server round-trip
    assert!(matches!(
        surface.last_image(),
        Some(ImageAssignment::Placeholder(_))
    ));
    // Assert: the three corresponding frames arrive, in callback order
    assert_eq!(
        conn.recv_json().await,
        json!({ "event": "rerenderImages", "payload": "sd-ABC123" })
    );
    assert_eq!(
        conn.recv_json().await,
        json!({ "event": "keyDown", "payload": { "device": "sd-ABC123", "position": 4 } })
    );
    assert_eq!(
        conn.recv_json().await,
        json!({ "event": "keyUp", "payload": { "device": "sd-ABC123", "position": 4 } })
    );

    task.abort();
}

#[tokio::test]
async fn test_set_image_reaches_the_bound_surface_even_after_garbage() {
    init_tracing();

    let server = FakeServer::bind().await;
    let (_page_tx, page_rx) = mpsc::channel(8);
    let (handle, task) = spawn_bridge(scenario_host(), test_config(&server), page_rx);
    let mut conn = server.accept().await;
    drain_replay(&mut conn).await;

    let surface = Arc::new(RecordingSurface::new("ABC123", "Main", 4));
    let button = DeckButton::new(Arc::clone(&handle), surface.clone());
    button.on_ready();
    conn.recv_json().await; // rerenderImages

    // Act: garbage first — the bridge must survive it — then a real command
    conn.send_text("this is not json").await;
    conn.send_text(r#"{"event":"unheardOf","device":"sd-ABC123"}"#)
        .await;
    // base64 of b"opendeck"
    conn.send_text(
        r#"{"event":"setImage","device":"sd-ABC123","controller":"Keypad","position":4,"image":"data:image/png;base64,b3BlbmRlY2s="}"#,
    )
    .await;

    // Assert: the decoded bytes land on the surface
    eventually("surface received the decoded image", || {
        surface.last_image() == Some(ImageAssignment::Decoded(b"opendeck".to_vec()))
    })
    .await;

    task.abort();
}

#[tokio::test]
async fn test_set_image_without_position_clears_every_slot_of_the_device() {
    init_tracing();

    let server = FakeServer::bind().await;
    let (_page_tx, page_rx) = mpsc::channel(8);
    let (handle, task) = spawn_bridge(scenario_host(), test_config(&server), page_rx);
    let mut conn = server.accept().await;
    drain_replay(&mut conn).await;

    // Arrange: two bound buttons, both carrying a real image
    let a = Arc::new(RecordingSurface::new("ABC123", "Main", 0));
    let b = Arc::new(RecordingSurface::new("ABC123", "Main", 1));
    let button_a = DeckButton::new(Arc::clone(&handle), a.clone());
    let button_b = DeckButton::new(Arc::clone(&handle), b.clone());
    button_a.on_ready();
    button_b.on_ready();
    conn.recv_json().await;
    conn.recv_json().await;
    for position in [0, 1] {
        conn.send_text(&format!(
            r#"{{"event":"setImage","device":"sd-ABC123","controller":"Keypad","position":{position},"image":"data:image/png;base64,AAAA"}}"#,
        ))
        .await;
    }
    eventually("both surfaces carry decoded images", || {
        matches!(a.last_image(), Some(ImageAssignment::Decoded(_)))
            && matches!(b.last_image(), Some(ImageAssignment::Decoded(_)))
    })
    .await;

    // Act: device-wide clear
    conn.send_text(r#"{"event":"setImage","device":"sd-ABC123","controller":"Keypad"}"#)
        .await;

    // Assert
    eventually("both surfaces fell back to the placeholder", || {
        matches!(a.last_image(), Some(ImageAssignment::Placeholder(_)))
            && matches!(b.last_image(), Some(ImageAssignment::Placeholder(_)))
    })
    .await;

    task.abort();
}

#[tokio::test]
async fn test_set_image_for_unbound_position_is_ignored() {
    init_tracing();

    let server = FakeServer::bind().await;
    let (_page_tx, page_rx) = mpsc::channel(8);
    let (handle, task) = spawn_bridge(scenario_host(), test_config(&server), page_rx);
    let mut conn = server.accept().await;
    drain_replay(&mut conn).await;

    let surface = Arc::new(RecordingSurface::new("ABC123", "Main", 0));
    let button = DeckButton::new(Arc::clone(&handle), surface.clone());
    button.on_ready();
    conn.recv_json().await;
    let baseline = surface.images().len();

    // Act: position 9 was never bound
    conn.send_text(
        r#"{"event":"setImage","device":"sd-ABC123","controller":"Keypad","position":9,"image":"data:image/png;base64,AAAA"}"#,
    )
    .await;
    sleep(Duration::from_millis(200)).await;

    // Assert: the bound surface saw nothing new
    assert_eq!(surface.images().len(), baseline);

    task.abort();
}

#[tokio::test]
async fn test_page_change_registers_once_then_switches_profile() {
    init_tracing();

    let server = FakeServer::bind().await;
    let (page_tx, page_rx) = mpsc::channel(8);
    let host = scenario_host();
    let (_handle, task) = spawn_bridge(
        Arc::clone(&host) as Arc<dyn DeckHost>,
        test_config(&server),
        page_rx,
    );
    let mut conn = server.accept().await;
    drain_replay(&mut conn).await;

    // Act: the host switches to "Media" on the already-registered device
    host.set_active_page("sd-ABC123", "Media");
    page_tx
        .send(PageChange {
            descriptor: DeviceDescriptor::from_serial("ABC123", "Stream Deck Original", 3, 5, 0),
            page: "Media".to_string(),
        })
        .await
        .unwrap();

    // Assert: no second registerDevice this epoch, just the profile switch
    assert_eq!(
        conn.recv_json().await,
        json!({
            "event": "switchProfile",
            "device": "sd-ABC123",
            "profile": "Media",
        })
    );

    task.abort();
}

#[tokio::test]
async fn test_reconnect_clears_images_and_replays_registration() {
    init_tracing();

    let server = FakeServer::bind().await;
    let (_page_tx, page_rx) = mpsc::channel(8);
    let (handle, task) = spawn_bridge(scenario_host(), test_config(&server), page_rx);
    let mut conn = server.accept().await;
    drain_replay(&mut conn).await;

    // Arrange: a bound button holding a server-assigned image
    let surface = Arc::new(RecordingSurface::new("ABC123", "Main", 4));
    let button = DeckButton::new(Arc::clone(&handle), surface.clone());
    button.on_ready();
    conn.recv_json().await;
    conn.send_text(
        r#"{"event":"setImage","device":"sd-ABC123","controller":"Keypad","position":4,"image":"data:image/png;base64,AAAA"}"#,
    )
    .await;
    eventually("surface carries the server image", || {
        matches!(surface.last_image(), Some(ImageAssignment::Decoded(_)))
    })
    .await;

    // Act: the server goes away
    conn.close().await;

    // Assert: the stale image is replaced by the placeholder on teardown
    eventually("surface fell back to the placeholder", || {
        matches!(surface.last_image(), Some(ImageAssignment::Placeholder(_)))
    })
    .await;

    // Assert: the next epoch replays the full registration sequence — the
    // per-epoch registration memory was reset
    let mut reconn = server.accept().await;
    let [first, second, third] = drain_replay(&mut reconn).await;
    assert_eq!(first["event"], "registerPlugin");
    assert_eq!(second["event"], "registerDevice");
    assert_eq!(second["payload"]["id"], "sd-ABC123");
    assert_eq!(third["event"], "switchProfile");

    task.abort();
}
