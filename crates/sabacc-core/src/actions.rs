//! Player actions and the events they produce.
//!
//! Actions are what the Presentation Adapter submits on behalf of the acting
//! player; events are what it renders back. Which actions are legal depends
//! on the variant and the current phase; see `GameState::valid_actions`.

use crate::card::{Card, Slot};
use crate::player::PlayerId;
use serde::{Deserialize, Serialize};

/// Everything a player can do on their turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameAction {
    // ==================== Two-slot variant ====================
    /// Draw from the positive or negative deck; stages the card and forces
    /// an immediate keep choice.
    DrawFrom(Slot),
    /// Keep the staged card, returning the replaced card to its deck.
    KeepDrawn,
    /// Keep the committed card, returning the staged card to its deck.
    KeepExisting,

    // ==================== Open variants ====================
    /// Draw one card from the shared deck into the hand.
    Draw,
    /// Discard the card at this hand position to the bottom of the deck.
    Discard(usize),
    /// Discard the card at this hand position and draw a replacement.
    Replace(usize),
    /// Keep exactly the cards at these positions, dropping the rest from
    /// play (suited variant).
    ConfirmSelection(Vec<usize>),

    // ==================== Always available ====================
    /// End the turn without touching the hand.
    Stand,
    /// Forfeit and leave the game.
    Junk,
    /// Trigger the final round; every other player gets one more turn.
    CallAlderaan,
}

/// What happened as a result of an action (or a timeout).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Cards are dealt and the first turn begins.
    GameStarted { player_order: Vec<PlayerId> },

    /// A full turn cycle completed.
    RoundAdvanced { round: u32 },

    /// It is now this seat's turn.
    TurnBegan { player: PlayerId },

    /// An open-variant draw.
    CardDrawn { player: PlayerId, card: Card },

    /// A two-slot draw now awaiting the keep choice.
    CardStaged {
        player: PlayerId,
        card: Card,
        slot: Slot,
    },

    /// The keep choice resolved; `returned` went back to its deck.
    StagedResolved {
        player: PlayerId,
        kept: Card,
        returned: Card,
    },

    /// A card left the hand for the bottom of the deck.
    CardDiscarded { player: PlayerId, card: Card },

    /// A card was swapped for a fresh draw.
    CardReplaced {
        player: PlayerId,
        discarded: Card,
        drawn: Card,
    },

    /// A suited-variant selection was confirmed; dropped cards left play.
    SelectionConfirmed {
        player: PlayerId,
        kept: usize,
        dropped: usize,
    },

    /// Suited-variant hands locked and refilled at a round boundary.
    HandsRefilled { round: u32 },

    PlayerStood { player: PlayerId },

    /// The seat forfeited and is out for the rest of the game.
    PlayerJunked { player: PlayerId },

    /// The final round was called; play ends when the cycle returns to the
    /// caller.
    FinalRoundCalled { player: PlayerId },

    /// The adapter timed the acting player out; a default action follows.
    TurnTimedOut { player: PlayerId },

    /// Phase A prompt: two dice rolled for an Impostor slot.
    ImpostorDiceRolled {
        player: PlayerId,
        slot: Slot,
        dice: (i32, i32),
    },

    /// An Impostor value was fixed, by choice or by timeout.
    ImpostorResolved {
        player: PlayerId,
        slot: Slot,
        value: i32,
        by_timeout: bool,
    },

    /// Phase B: a Sylop value was computed.
    SylopResolved {
        player: PlayerId,
        slot: Slot,
        value: i32,
    },

    /// The practice opponent joined a solo table and was dealt a hand.
    SyntheticOpponentDealt { player: PlayerId },

    /// Standings are final; `GameState::standings` is now available.
    GameEnded,
}
