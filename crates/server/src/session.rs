//! One player's connection: tile choice, turns, scoring, rematch.
//!
//! ```text
//! ChoosingTile -> Playing(Player | Computer) -> GameOver -> ChoosingTile
//!                                                        \-> Terminated
//! ```
//!
//! A session owns its board, its RNG and its move selector. Nothing here is
//! shared with other sessions, so sessions can run on independent tasks.

use serde::Serialize;
use tokio::sync::mpsc;

use crate::core::{render_board, Board, MoveSelector, SimpleRng};
use crate::error::SessionError;
use crate::protocol::{
    final_score_message, first_turn_message, outcome_message, parse_tile, wants_rematch,
    PlayerInput, CHOOSE_TILE_PROMPT, COMPUTER_TURN_PROMPT, GOODBYE, MOVE_PROMPT,
    PLAY_AGAIN_PROMPT, WELCOME,
};
use crate::transport::Transport;
use crate::types::{Tile, Turn};

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    ChoosingTile,
    Playing(Turn),
    GameOver,
    Terminated(SessionEnd),
}

/// How a session ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The player typed `quit` during a game.
    Quit,
    /// The player answered no to a rematch.
    Declined,
}

/// Result of a finished game from the player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Won,
    Lost,
    Tie,
}

impl Outcome {
    pub fn from_scores(player: u32, computer: u32) -> Self {
        match player.cmp(&computer) {
            std::cmp::Ordering::Greater => Outcome::Won,
            std::cmp::Ordering::Less => Outcome::Lost,
            std::cmp::Ordering::Equal => Outcome::Tie,
        }
    }
}

/// Summary of one completed game, written to the game-record log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameRecord {
    pub client_id: usize,
    pub game: u32,
    pub player_tile: Tile,
    pub computer_tile: Tile,
    pub first_turn: Turn,
    pub x_score: u32,
    pub o_score: u32,
    pub outcome: Outcome,
    pub player_moves: u32,
    pub computer_moves: u32,
}

/// Per-connection game driver.
pub struct GameSession<T> {
    transport: T,
    rng: SimpleRng,
    selector: MoveSelector,
    client_id: usize,
    record_tx: Option<mpsc::UnboundedSender<GameRecord>>,
    records: Vec<GameRecord>,

    phase: Phase,
    board: Board,
    player_tile: Tile,
    computer_tile: Tile,
    first_turn: Turn,
    show_hints: bool,
    player_moves: u32,
    computer_moves: u32,
}

impl<T: Transport> GameSession<T> {
    /// Create a session. The selector's RNG is seeded from `rng`, so one seed
    /// fixes every random choice the session makes.
    pub fn new(transport: T, mut rng: SimpleRng) -> Self {
        let selector = MoveSelector::new(SimpleRng::new(rng.next_u32()));
        Self {
            transport,
            rng,
            selector,
            client_id: 0,
            record_tx: None,
            records: Vec::new(),
            phase: Phase::ChoosingTile,
            board: Board::starting(),
            player_tile: Tile::X,
            computer_tile: Tile::O,
            first_turn: Turn::Player,
            show_hints: false,
            player_moves: 0,
            computer_moves: 0,
        }
    }

    pub fn with_client_id(mut self, client_id: usize) -> Self {
        self.client_id = client_id;
        self
    }

    /// Forward every completed game's record to `tx`.
    pub fn with_record_sink(mut self, tx: mpsc::UnboundedSender<GameRecord>) -> Self {
        self.record_tx = Some(tx);
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Records of the games completed so far.
    pub fn records(&self) -> &[GameRecord] {
        &self.records
    }

    /// Greet the peer and drive the state machine until it terminates.
    pub async fn run(&mut self) -> Result<SessionEnd, SessionError> {
        self.transport.send(WELCOME).await?;
        loop {
            if let Phase::Terminated(end) = self.step().await? {
                return Ok(end);
            }
        }
    }

    /// Perform one transition and return the new phase.
    pub async fn step(&mut self) -> Result<Phase, SessionError> {
        let next = match self.phase {
            Phase::ChoosingTile => self.choose_tile().await?,
            Phase::Playing(Turn::Player) => self.player_turn().await?,
            Phase::Playing(Turn::Computer) => self.computer_turn().await?,
            Phase::GameOver => self.game_over().await?,
            Phase::Terminated(end) => Phase::Terminated(end),
        };
        self.phase = next;
        Ok(next)
    }

    async fn choose_tile(&mut self) -> Result<Phase, SessionError> {
        let tile = loop {
            self.transport.send(CHOOSE_TILE_PROMPT).await?;
            let reply = self.transport.receive().await?;
            if let Some(tile) = parse_tile(&reply) {
                break tile;
            }
        };

        let first = if self.rng.next_bool() {
            Turn::Player
        } else {
            Turn::Computer
        };
        self.start_game(tile, first);
        self.transport.send(&first_turn_message(first)).await?;

        tracing::info!(
            client_id = self.client_id,
            player_tile = tile.as_str(),
            first = first.as_str(),
            "game started"
        );
        Ok(Phase::Playing(first))
    }

    fn start_game(&mut self, player_tile: Tile, first: Turn) {
        self.board = Board::starting();
        self.player_tile = player_tile;
        self.computer_tile = player_tile.opponent();
        self.first_turn = first;
        self.show_hints = false;
        self.player_moves = 0;
        self.computer_moves = 0;
    }

    async fn player_turn(&mut self) -> Result<Phase, SessionError> {
        let tile = self.player_tile;
        let view = if self.show_hints {
            let hints = self.board.legal_moves(tile);
            render_board(&self.board, Some(hints.as_slice()))
        } else {
            render_board(&self.board, None)
        };
        self.transport.send(&view).await?;

        let pos = loop {
            self.transport.send(MOVE_PROMPT).await?;
            let reply = self.transport.receive().await?;
            match PlayerInput::parse(&reply) {
                PlayerInput::Quit => {
                    tracing::info!(client_id = self.client_id, "player quit");
                    self.transport.send(GOODBYE).await?;
                    return Ok(Phase::Terminated(SessionEnd::Quit));
                }
                PlayerInput::Hints => {
                    self.show_hints = !self.show_hints;
                    return Ok(Phase::Playing(Turn::Player));
                }
                PlayerInput::Move(pos) if self.board.is_legal(tile, pos.x as i8, pos.y as i8) => {
                    break pos;
                }
                PlayerInput::Move(_) => {}
                PlayerInput::Invalid => {
                    self.transport.send("").await?;
                    self.transport.send("").await?;
                }
            }
        };

        self.board.apply_move(tile, pos.x as i8, pos.y as i8);
        self.player_moves += 1;
        tracing::debug!(client_id = self.client_id, x = pos.x, y = pos.y, "player moved");

        Ok(self.after_move(Turn::Player))
    }

    async fn computer_turn(&mut self) -> Result<Phase, SessionError> {
        let tile = self.computer_tile;
        self.transport.send(&render_board(&self.board, None)).await?;
        self.transport.send(COMPUTER_TURN_PROMPT).await?;
        self.transport.receive().await?;

        let pos = self
            .selector
            .select(&self.board, tile)
            .ok_or(SessionError::NoLegalMoves { tile })?;
        self.board.apply_move(tile, pos.x as i8, pos.y as i8);
        self.computer_moves += 1;
        tracing::debug!(client_id = self.client_id, x = pos.x, y = pos.y, "computer moved");

        Ok(self.after_move(Turn::Computer))
    }

    /// The game ends as soon as the side to move next has no legal move.
    fn after_move(&self, mover: Turn) -> Phase {
        let next = mover.other();
        if self.board.has_legal_move(self.tile_for(next)) {
            Phase::Playing(next)
        } else {
            Phase::GameOver
        }
    }

    fn tile_for(&self, turn: Turn) -> Tile {
        match turn {
            Turn::Player => self.player_tile,
            Turn::Computer => self.computer_tile,
        }
    }

    async fn game_over(&mut self) -> Result<Phase, SessionError> {
        let score = self.board.score();
        let player = score[self.player_tile];
        let computer = score[self.computer_tile];

        self.transport.send(&render_board(&self.board, None)).await?;
        self.transport.send(&final_score_message(&score)).await?;
        self.transport.send(&outcome_message(player, computer)).await?;

        let record = GameRecord {
            client_id: self.client_id,
            game: self.records.len() as u32 + 1,
            player_tile: self.player_tile,
            computer_tile: self.computer_tile,
            first_turn: self.first_turn,
            x_score: score.x,
            o_score: score.o,
            outcome: Outcome::from_scores(player, computer),
            player_moves: self.player_moves,
            computer_moves: self.computer_moves,
        };
        tracing::info!(
            client_id = self.client_id,
            x = score.x,
            o = score.o,
            outcome = ?record.outcome,
            "game over"
        );
        if let Some(tx) = &self.record_tx {
            let _ = tx.send(record.clone());
        }
        self.records.push(record);

        self.transport.send(PLAY_AGAIN_PROMPT).await?;
        let answer = self.transport.receive().await?;
        if wants_rematch(&answer) {
            Ok(Phase::ChoosingTile)
        } else {
            self.transport.send(GOODBYE).await?;
            Ok(Phase::Terminated(SessionEnd::Declined))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{channel_pair, ChannelPeer, ChannelTransport};
    use crate::types::Position;

    fn session_with(board: Board, player: Tile) -> (GameSession<ChannelTransport>, ChannelPeer) {
        let (transport, peer) = channel_pair();
        let mut session = GameSession::new(transport, SimpleRng::new(11));
        session.start_game(player, Turn::Player);
        session.board = board;
        (session, peer)
    }

    fn drain(peer: &mut ChannelPeer) -> Vec<String> {
        std::iter::from_fn(|| peer.try_recv()).collect()
    }

    #[tokio::test]
    async fn game_ends_when_next_side_is_blocked_even_if_mover_is_not() {
        // X takes (2,0) by playing (3,0). The lone O left at (1,7) can never
        // close a run, but X can still play (2,7).
        let board = Board::from_rows([
            ".XO.....",
            "........",
            "........",
            "........",
            "........",
            "........",
            "........",
            "XO......",
        ]);
        let (mut session, peer) = session_with(board, Tile::X);
        session.phase = Phase::Playing(Turn::Player);
        assert!(peer.send("41"));

        let phase = session.step().await.unwrap();
        assert_eq!(session.board().at(Position::new(2, 0)), Some(Some(Tile::X)));
        assert!(!session.board().has_legal_move(Tile::O));
        assert!(session.board().has_legal_move(Tile::X));
        assert_eq!(phase, Phase::GameOver);
    }

    #[tokio::test]
    async fn game_ends_after_computer_move_that_blocks_the_player() {
        // O's best move (4,0) flips two and leaves X without a move, while O
        // could still play (5,7).
        let board = Board::from_rows([
            ".OXX....",
            "........",
            "........",
            "........",
            "........",
            "........",
            "........",
            "......XO",
        ]);
        let (mut session, peer) = session_with(board, Tile::X);
        session.phase = Phase::Playing(Turn::Computer);
        assert!(peer.send(""));

        let phase = session.step().await.unwrap();
        assert_eq!(session.board().at(Position::new(4, 0)), Some(Some(Tile::O)));
        assert!(!session.board().has_legal_move(Tile::X));
        assert!(session.board().has_legal_move(Tile::O));
        assert_eq!(phase, Phase::GameOver);
        assert_eq!(session.computer_moves, 1);
    }

    #[tokio::test]
    async fn turn_passes_when_opponent_can_move() {
        let (mut session, peer) = session_with(Board::starting(), Tile::O);
        session.phase = Phase::Playing(Turn::Player);
        assert!(peer.send("34"));

        let phase = session.step().await.unwrap();
        assert_eq!(phase, Phase::Playing(Turn::Computer));
        assert_eq!(session.board().score()[Tile::O], 4);
    }

    #[tokio::test]
    async fn illegal_coordinate_reprompts_without_blanks() {
        let (mut session, mut peer) = session_with(Board::starting(), Tile::O);
        session.phase = Phase::Playing(Turn::Player);
        assert!(peer.send("11"));
        assert!(peer.send("34"));

        session.step().await.unwrap();
        let sent = drain(&mut peer);
        // board, prompt, (illegal 11) prompt again
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[1], MOVE_PROMPT);
        assert_eq!(sent[2], MOVE_PROMPT);
        assert_eq!(session.player_moves, 1);
    }

    #[tokio::test]
    async fn computer_with_no_move_is_an_internal_error() {
        let board = Board::from_rows([
            "XXXXXXXX", "XXXXXXXX", "XXXXXXXX", "XXXXXXXX", "XXXXXXXX", "XXXXXXXX",
            "XXXXXXXX", "XXXXXXX.",
        ]);
        let (mut session, peer) = session_with(board, Tile::X);
        session.phase = Phase::Playing(Turn::Computer);
        assert!(peer.send(""));

        let err = session.step().await.unwrap_err();
        assert!(matches!(err, SessionError::NoLegalMoves { tile: Tile::O }));
    }

    #[test]
    fn outcome_from_scores() {
        assert_eq!(Outcome::from_scores(33, 31), Outcome::Won);
        assert_eq!(Outcome::from_scores(1, 63), Outcome::Lost);
        assert_eq!(Outcome::from_scores(32, 32), Outcome::Tie);
    }
}
