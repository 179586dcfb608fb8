//! Server module - Reversi over a plain TCP text protocol
//!
//! Each accepted connection gets its own [`GameSession`] running on its own
//! tokio task. The session talks to the player through a [`Transport`], which
//! hides framing and sockets behind `send(text)` / `receive() -> text`.
//!
//! # Protocol Overview
//!
//! 1. **Connection**: Client connects (default: 127.0.0.1:8080)
//! 2. **Greeting**: Server sends `Welcome to Reversi!`
//! 3. **Tile choice**: Server asks `Do you want to be X or O?` until it gets `X` or `O`
//! 4. **Play**: Server sends the board and either `Enter your move` or
//!    `Press Enter to see the computer's move.`
//! 5. **Game over**: Final board, scores, result, then `Do you want to play again? (yes or no)`
//!
//! ## Client → Server
//!
//! Every client message is framed: a 2048-byte header with the decimal body
//! length padded with spaces, then the body.
//!
//! - **tile**: `X` or `O` (case-sensitive)
//! - **move**: two digits `1`-`8`, column then row (e.g. `34`)
//! - **hints**: toggle `.` markers on legal cells
//! - **quit**: leave the game
//! - **!DISCONNECT**: the reference client's goodbye; treated as a hang-up
//!
//! ## Server → Client
//!
//! Raw text by default. A malformed move is answered with two empty messages
//! before the prompt is repeated; an illegal but well-formed move just repeats
//! the prompt.
//!
//! # Environment Variables
//!
//! - `REVERSI_HOST`: Bind address (default: "127.0.0.1")
//! - `REVERSI_PORT`: Port number (default: 8080)
//! - `REVERSI_HEADER_LEN`: Inbound header width (default: 2048)
//! - `REVERSI_MAX_MESSAGE`: Largest inbound body (default: 4096)
//! - `REVERSI_FRAME_OUTBOUND`: "1" or "true" to frame outbound text too
//! - `REVERSI_IDLE_TIMEOUT_SECS`: Drop a session after this long without input
//! - `REVERSI_SEED`: Fixed base seed for reproducible sessions
//! - `REVERSI_LOG_PATH`: Append one JSON line per finished game
//!
//! # Testing
//!
//! Drive a session in-process with [`transport::channel_pair`], or over TCP
//! with [`server::run_server`] on port 0.

pub mod error;
pub mod protocol;
pub mod server;
pub mod session;
pub mod transport;

pub use reversi_net_core as core;
pub use reversi_net_types as types;

pub use error::{SessionError, TransportError};
pub use protocol::{FrameCodec, PlayerInput};
pub use server::{check_tcp_listen_available, run_server, ServerConfig};
pub use session::{GameRecord, GameSession, Outcome, Phase, SessionEnd};
pub use transport::{channel_pair, ChannelPeer, ChannelTransport, TcpTransport, Transport};
