use reversi_net_types::Tile;

/// Failures talking to the remote peer. All of them end the session.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("peer disconnected")]
    Disconnected,

    #[error("peer idle for longer than the configured timeout")]
    IdleTimeout,

    #[error("invalid frame header: {header:?}")]
    InvalidHeader { header: String },

    #[error("message is not valid UTF-8")]
    InvalidUtf8,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Reasons a session stops early.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The turn logic asked the selector to move for a side with no legal move.
    #[error("no legal move for {tile:?} on the computer's turn")]
    NoLegalMoves { tile: Tile },
}

impl SessionError {
    /// True when the peer simply went away.
    pub fn is_disconnect(&self) -> bool {
        matches!(
            self,
            SessionError::Transport(TransportError::Disconnected)
                | SessionError::Transport(TransportError::IdleTimeout)
        )
    }
}
