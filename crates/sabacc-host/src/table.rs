//! Game table management: the lobby roster and the started game.
//!
//! A table maps external player handles (UUIDs owned by the Presentation
//! Adapter) to engine seats. Seat order is join order; seating shuffles are
//! the adapter's concern.

use sabacc_core::{GameAction, GameError, GameEvent, GamePhase, GameState, PlayerId, Standings};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Lobby-stage errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LobbyError {
    #[error("You are already in the game")]
    AlreadyJoined,

    #[error("The maximum number of players has been reached")]
    Full,

    #[error("The game has already started")]
    AlreadyStarted,
}

/// Errors starting a game.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartError {
    #[error("Only players in the game can start the game")]
    NotAMember,

    #[error("The game has already started")]
    AlreadyStarted,

    #[error("Not enough players to start the game")]
    TooFewPlayers,

    #[error(transparent)]
    Config(#[from] sabacc_core::ConfigError),
}

/// Errors from any table entrypoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("No such table")]
    UnknownTable,

    #[error("The game has not started")]
    NotStarted,

    #[error(transparent)]
    Lobby(#[from] LobbyError),

    #[error(transparent)]
    Start(#[from] StartError),

    #[error(transparent)]
    Action(#[from] GameError),
}

/// What an entrypoint hands back for rendering: the emitted events plus a
/// snapshot of where the game stands.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub events: Vec<GameEvent>,
    pub phase: GamePhase,
    /// External handle of whoever the game is waiting on: the acting seat,
    /// or the holder of the live Impostor prompt. `None` for the practice
    /// opponent or a finished game.
    pub awaiting: Option<Uuid>,
    pub round: u32,
    pub game_over: bool,
}

/// One table: a lobby roster that becomes a running game.
pub struct Table {
    pub id: Uuid,
    pub config: sabacc_core::VariantConfig,
    /// (handle, display name) in join order; join order is seat order.
    seats: Vec<(Uuid, String)>,
    game: Option<GameState>,
}

impl Table {
    /// The registry validates the configuration before constructing tables.
    pub fn new(id: Uuid, config: sabacc_core::VariantConfig) -> Self {
        Table {
            id,
            config,
            seats: Vec::new(),
            game: None,
        }
    }

    pub fn player_count(&self) -> usize {
        self.seats.len()
    }

    pub fn is_started(&self) -> bool {
        self.game.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.game.as_ref().is_some_and(GameState::is_finished)
    }

    pub fn join(&mut self, player: Uuid, name: String) -> Result<(), LobbyError> {
        if self.game.is_some() {
            return Err(LobbyError::AlreadyStarted);
        }
        if self.seats.iter().any(|(id, _)| *id == player) {
            return Err(LobbyError::AlreadyJoined);
        }
        if self.seats.len() >= self.config.player_limit as usize {
            return Err(LobbyError::Full);
        }
        self.seats.push((player, name));
        Ok(())
    }

    pub fn start(&mut self, requester: Uuid) -> Result<TurnOutcome, StartError> {
        if self.game.is_some() {
            return Err(StartError::AlreadyStarted);
        }
        if self.seats.is_empty() {
            return Err(StartError::TooFewPlayers);
        }
        if !self.seats.iter().any(|(id, _)| *id == requester) {
            return Err(StartError::NotAMember);
        }

        let names = self.seats.iter().map(|(_, name)| name.clone()).collect();
        let game = GameState::new(self.config.clone(), names)?;
        let events = game.opening_events();
        self.game = Some(game);
        Ok(self.outcome(events))
    }

    pub fn submit_action(
        &mut self,
        player: Uuid,
        action: GameAction,
    ) -> Result<TurnOutcome, TableError> {
        let seat = self.seat_of(player).ok_or(GameError::NotYourTurn)?;
        let game = self.game.as_mut().ok_or(TableError::NotStarted)?;
        let events = game.apply_action(seat, action)?;
        Ok(self.outcome(events))
    }

    pub fn force_timeout(&mut self) -> Result<TurnOutcome, TableError> {
        let game = self.game.as_mut().ok_or(TableError::NotStarted)?;
        let events = game.force_timeout();
        Ok(self.outcome(events))
    }

    pub fn resolve_impostor_choice(
        &mut self,
        player: Uuid,
        value: i32,
    ) -> Result<TurnOutcome, TableError> {
        let seat = self.seat_of(player).ok_or(GameError::NotYourTurn)?;
        let game = self.game.as_mut().ok_or(TableError::NotStarted)?;
        let events = game.resolve_impostor(seat, value)?;
        Ok(self.outcome(events))
    }

    /// Final results; `Some` only once the game is over.
    pub fn standings(&self) -> Option<Standings> {
        self.game.as_ref().and_then(|game| game.standings().cloned())
    }

    /// Legal actions for a player right now, for adapters rendering buttons.
    pub fn valid_actions(&self, player: Uuid) -> Vec<GameAction> {
        match (self.seat_of(player), &self.game) {
            (Some(seat), Some(game)) => game.valid_actions(seat),
            _ => Vec::new(),
        }
    }

    pub fn game(&self) -> Option<&GameState> {
        self.game.as_ref()
    }

    fn seat_of(&self, player: Uuid) -> Option<PlayerId> {
        self.seats
            .iter()
            .position(|(id, _)| *id == player)
            .map(|seat| seat as PlayerId)
    }

    fn handle_of_seat(&self, seat: PlayerId) -> Option<Uuid> {
        self.seats.get(seat as usize).map(|(id, _)| *id)
    }

    fn outcome(&self, events: Vec<GameEvent>) -> TurnOutcome {
        let game = self.game.as_ref();
        let awaiting_seat = game.and_then(|game| {
            game.current_player_id()
                .or_else(|| game.pending_impostor().map(|prompt| prompt.player))
        });
        TurnOutcome {
            events,
            phase: game.map_or(GamePhase::AwaitingAction, |game| game.phase),
            awaiting: awaiting_seat.and_then(|seat| self.handle_of_seat(seat)),
            round: game.map_or(0, |game| game.round),
            game_over: game.is_some_and(GameState::is_finished),
        }
    }
}
