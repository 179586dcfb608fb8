//! TCP server for Reversi sessions
//!
//! Accepts connections and runs one [`GameSession`] per connection on its own
//! task. Uses tokio for async networking.

use std::net::{SocketAddr, ToSocketAddrs};
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};

use crate::core::SimpleRng;
use crate::protocol::{FrameCodec, DEFAULT_HEADER_LEN, DEFAULT_MAX_MESSAGE_LEN};
use crate::session::{GameRecord, GameSession};
use crate::transport::TcpTransport;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Width of the inbound length header in bytes.
    pub header_len: usize,
    pub max_message_len: usize,
    /// Frame outbound messages too (the reference client expects raw text).
    pub frame_outbound: bool,
    pub idle_timeout: Option<Duration>,
    /// Base seed; each session uses `seed + client_id`. `None` seeds from the clock.
    pub seed: Option<u32>,
    /// Append a JSON line per finished game to this file.
    pub log_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            header_len: DEFAULT_HEADER_LEN,
            max_message_len: DEFAULT_MAX_MESSAGE_LEN,
            frame_outbound: false,
            idle_timeout: None,
            seed: None,
            log_path: None,
        }
    }
}

impl ServerConfig {
    /// Create from `REVERSI_*` environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("REVERSI_HOST")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);

        let frame_outbound = lookup("REVERSI_FRAME_OUTBOUND")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(defaults.frame_outbound);

        let idle_timeout = parse_var(&lookup, "REVERSI_IDLE_TIMEOUT_SECS")
            .filter(|secs: &u64| *secs > 0)
            .map(Duration::from_secs);

        let log_path = lookup("REVERSI_LOG_PATH")
            .map(|s| s.trim().to_string())
            .and_then(|s| if s.is_empty() { None } else { Some(s) });

        Self {
            host,
            port: parse_var(&lookup, "REVERSI_PORT").unwrap_or(defaults.port),
            header_len: parse_var(&lookup, "REVERSI_HEADER_LEN")
                .filter(|n: &usize| *n > 0)
                .unwrap_or(defaults.header_len),
            max_message_len: parse_var(&lookup, "REVERSI_MAX_MESSAGE").unwrap_or(defaults.max_message_len),
            frame_outbound,
            idle_timeout,
            seed: parse_var(&lookup, "REVERSI_SEED"),
            log_path,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()?
            .next()
            .with_context(|| format!("no address for {}:{}", self.host, self.port))
    }

    pub fn codec(&self) -> FrameCodec {
        FrameCodec::new(self.header_len, self.max_message_len)
    }

    fn session_rng(&self, client_id: usize) -> SimpleRng {
        match self.seed {
            Some(seed) => SimpleRng::new(seed.wrapping_add(client_id as u32)),
            None => SimpleRng::from_clock(),
        }
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|s| s.trim().parse().ok())
}

/// Fail fast if `host:port` cannot be bound (e.g. already in use).
pub fn check_tcp_listen_available(host: &str, port: u16) -> std::io::Result<()> {
    let listener = std::net::TcpListener::bind((host, port))?;
    drop(listener);
    Ok(())
}

/// Pause after an accept error that is not about a single peer.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// How long to wait before accepting again after `err`.
///
/// Per-peer failures retry at once; anything else (usually descriptor
/// exhaustion) waits [`ACCEPT_BACKOFF`].
fn accept_backoff(err: &std::io::Error) -> Option<Duration> {
    use std::io::ErrorKind;

    match err.kind() {
        ErrorKind::ConnectionAborted | ErrorKind::ConnectionReset | ErrorKind::Interrupted => None,
        _ => Some(ACCEPT_BACKOFF),
    }
}

/// Start the TCP server
///
/// Sends the bound address on `ready_tx` once listening, then accepts
/// connections until the task is dropped. Accept errors are logged and
/// skipped; only binding can fail.
pub async fn run_server(
    config: ServerConfig,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let record_tx = config.log_path.clone().map(spawn_record_log);

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    let bound = listener.local_addr()?;
    tracing::info!(addr = %bound, "server listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let mut client_id_counter = 0usize;

    // Accept incoming connections
    loop {
        let (socket, addr) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!("accept failed: {}", e);
                if let Some(delay) = accept_backoff(&e) {
                    tokio::time::sleep(delay).await;
                }
                continue;
            }
        };
        client_id_counter += 1;
        let client_id = client_id_counter;

        tracing::info!(client_id, %addr, "client connected");

        let config = config.clone();
        let record_tx = record_tx.clone();

        // Spawn task to handle this client
        tokio::spawn(async move {
            handle_client(socket, client_id, &config, record_tx).await;
            tracing::info!(client_id, "client disconnected");
        });
    }
}

/// Run one session to completion on an accepted socket.
async fn handle_client(
    socket: TcpStream,
    client_id: usize,
    config: &ServerConfig,
    record_tx: Option<mpsc::UnboundedSender<GameRecord>>,
) {
    let _ = socket.set_nodelay(true);
    let transport =
        TcpTransport::from_stream(socket, config.codec(), config.frame_outbound, config.idle_timeout);

    let mut session =
        GameSession::new(transport, config.session_rng(client_id)).with_client_id(client_id);
    if let Some(tx) = record_tx {
        session = session.with_record_sink(tx);
    }

    match session.run().await {
        Ok(end) => tracing::info!(client_id, ?end, "session finished"),
        Err(e) if e.is_disconnect() => tracing::info!(client_id, "peer went away: {}", e),
        Err(e) => tracing::error!(client_id, "session error: {}", e),
    }
}

/// Spawn the background writer that appends game records as JSON lines.
fn spawn_record_log(path: String) -> mpsc::UnboundedSender<GameRecord> {
    let (tx, mut rx) = mpsc::unbounded_channel::<GameRecord>();
    tokio::spawn(async move {
        use tokio::fs::OpenOptions;

        let mut file = match OpenOptions::new().create(true).append(true).open(&path).await {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(path = %path, "cannot open game log: {}", e);
                return;
            }
        };

        let mut buf: Vec<u8> = Vec::with_capacity(256);
        while let Some(record) = rx.recv().await {
            buf.clear();
            if serde_json::to_writer(&mut buf, &record).is_err() {
                continue;
            }
            buf.push(b'\n');
            if file.write_all(&buf).await.is_err() || file.flush().await.is_err() {
                tracing::warn!(path = %path, "game log write failed");
                break;
            }
        }
    });
    tx
}
