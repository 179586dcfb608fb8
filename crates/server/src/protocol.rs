//! Protocol module - framing and message text for the Reversi text protocol
//!
//! Every inbound message is a fixed-width ASCII header carrying the decimal
//! byte length of the body, padded with spaces, followed by the body:
//!
//! ```text
//! "2" + 2046 spaces | "34"
//! ```
//!
//! The reference client reads server output as raw text, so outbound framing
//! is opt-in (see [`crate::server::ServerConfig::frame_outbound`]). Over-long
//! bodies are truncated rather than rejected.
//!
//! Everything above framing is plain text: prompts, the rendered board, and
//! short commands from the player.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::core::Score;
use crate::error::TransportError;
use crate::types::{Position, Tile, BOARD_SIZE};

/// Header width used by the reference client.
pub const DEFAULT_HEADER_LEN: usize = 2048;

/// Largest inbound body accepted by default. Player input is a few bytes.
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 4096;

/// Sent by the reference client when the user leaves.
pub const DISCONNECT_MESSAGE: &str = "!DISCONNECT";

pub const WELCOME: &str = "Welcome to Reversi!";
pub const CHOOSE_TILE_PROMPT: &str = "Do you want to be X or O?";
pub const MOVE_PROMPT: &str = "Enter your move";
pub const COMPUTER_TURN_PROMPT: &str = "Press Enter to see the computer's move.";
pub const PLAY_AGAIN_PROMPT: &str = "Do you want to play again? (yes or no)";
pub const GOODBYE: &str = "Thanks for playing!";
pub const TIE: &str = "The game was a tie!";

pub const QUIT_COMMAND: &str = "quit";
pub const HINTS_COMMAND: &str = "hints";

/// Length-prefixed frame encoder/decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameCodec {
    header_len: usize,
    max_message_len: usize,
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new(DEFAULT_HEADER_LEN, DEFAULT_MAX_MESSAGE_LEN)
    }
}

impl FrameCodec {
    pub fn new(header_len: usize, max_message_len: usize) -> Self {
        Self {
            header_len: header_len.max(1),
            max_message_len,
        }
    }

    pub fn header_len(&self) -> usize {
        self.header_len
    }

    /// Encode one message as header + body.
    pub fn encode(&self, message: &str) -> Vec<u8> {
        let body = message.as_bytes();
        let mut frame = body.len().to_string().into_bytes();
        if frame.len() < self.header_len {
            frame.resize(self.header_len, b' ');
        }
        frame.extend_from_slice(body);
        frame
    }

    /// Parse a header into the body length.
    pub fn decode_header(&self, header: &[u8]) -> Result<usize, TransportError> {
        let invalid = || TransportError::InvalidHeader {
            header: String::from_utf8_lossy(header).trim().to_string(),
        };

        let text = std::str::from_utf8(header).map_err(|_| invalid())?;
        let digits = text.trim_matches(|c: char| c.is_ascii_whitespace() || c == '\0');
        digits.parse().map_err(|_| invalid())
    }

    /// Read one frame. A clean EOF before or inside a frame is a disconnect.
    ///
    /// A body longer than `max_message_len` is cut to that many bytes and the
    /// remainder is read and dropped, so the stream stays in sync and the
    /// caller sees an over-long (and therefore invalid) reply.
    pub async fn read_frame<R>(&self, reader: &mut R) -> Result<String, TransportError>
    where
        R: AsyncRead + Unpin,
    {
        let mut header = vec![0u8; self.header_len];
        read_exact_or_disconnect(reader, &mut header).await?;
        let len = self.decode_header(&header)?;

        let kept = len.min(self.max_message_len);
        let mut body = vec![0u8; kept];
        read_exact_or_disconnect(reader, &mut body).await?;

        if kept < len {
            let skip = (len - kept) as u64;
            let skipped = tokio::io::copy(&mut reader.take(skip), &mut tokio::io::sink()).await?;
            if skipped < skip {
                return Err(TransportError::Disconnected);
            }
            return Ok(String::from_utf8_lossy(&body).into_owned());
        }

        String::from_utf8(body).map_err(|_| TransportError::InvalidUtf8)
    }

    /// Write one framed message and flush.
    pub async fn write_frame<W>(&self, writer: &mut W, message: &str) -> Result<(), TransportError>
    where
        W: AsyncWrite + Unpin,
    {
        writer.write_all(&self.encode(message)).await?;
        writer.flush().await?;
        Ok(())
    }
}

async fn read_exact_or_disconnect<R>(reader: &mut R, buf: &mut [u8]) -> Result<(), TransportError>
where
    R: AsyncRead + Unpin,
{
    match reader.read_exact(buf).await {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Err(TransportError::Disconnected),
        Err(e) => Err(e.into()),
    }
}

/// What the player typed on their turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerInput {
    Quit,
    Hints,
    Move(Position),
    Invalid,
}

impl PlayerInput {
    /// Parse a move reply.
    ///
    /// Accepts `quit`, `hints`, or exactly two digits `1`-`8` (column then
    /// row), converted to 0-based coordinates.
    ///
    /// ```
    /// use reversi_net_server::protocol::PlayerInput;
    /// use reversi_net_server::types::Position;
    ///
    /// assert_eq!(PlayerInput::parse("34"), PlayerInput::Move(Position::new(2, 3)));
    /// assert_eq!(PlayerInput::parse("hints"), PlayerInput::Hints);
    /// assert_eq!(PlayerInput::parse("90"), PlayerInput::Invalid);
    /// ```
    pub fn parse(s: &str) -> Self {
        match s {
            QUIT_COMMAND => return PlayerInput::Quit,
            HINTS_COMMAND => return PlayerInput::Hints,
            _ => {}
        }

        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(a), Some(b), None) => match (board_digit(a), board_digit(b)) {
                (Some(x), Some(y)) => PlayerInput::Move(Position::new(x, y)),
                _ => PlayerInput::Invalid,
            },
            _ => PlayerInput::Invalid,
        }
    }
}

fn board_digit(c: char) -> Option<u8> {
    let d = c.to_digit(10)? as u8;
    (1..=BOARD_SIZE).contains(&d).then(|| d - 1)
}

/// Parse a tile choice (exact `X` or `O`).
pub fn parse_tile(s: &str) -> Option<Tile> {
    Tile::parse(s)
}

/// Rematch answers starting with `y` or `Y` mean yes.
pub fn wants_rematch(answer: &str) -> bool {
    answer
        .chars()
        .next()
        .is_some_and(|c| c.eq_ignore_ascii_case(&'y'))
}

pub fn first_turn_message(turn: crate::types::Turn) -> String {
    format!("The {} will go first.", turn.as_str())
}

pub fn final_score_message(score: &Score) -> String {
    format!("X scored {} points. O scored {} points.", score.x, score.o)
}

/// Winner/loser/margin line from the player's point of view.
pub fn outcome_message(player: u32, computer: u32) -> String {
    if player > computer {
        format!(
            "You beat the computer by {} points! Congratulations!",
            player - computer
        )
    } else if player < computer {
        format!(
            "You lost. The computer beat you by {} points.",
            computer - player
        )
    } else {
        TIE.to_string()
    }
}
