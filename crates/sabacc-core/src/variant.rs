//! Variant configuration.
//!
//! The four games share one engine; everything that differs between them is
//! captured here: deck multisets, hand shape, round structure, the action
//! set toggles, and the dice-target roll of the suited variant.

use crate::card::Suit;
use crate::deck::DeckSpec;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hard cap on seats at a table.
pub const MAX_PLAYERS: u8 = 8;

/// Faces of the gold target die.
const GOLD_DIE: [i32; 6] = [-10, 10, -5, 5, 0, 0];

/// Faces of the silver target die.
const SILVER_DIE: [Suit; 6] = [
    Suit::Circles,
    Suit::Circles,
    Suit::Triangles,
    Suit::Triangles,
    Suit::Squares,
    Suit::Squares,
];

/// The four supported games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Variant {
    /// Two-card fixed-slot game over parallel positive/negative decks.
    Kessel,
    /// Open-hand zero-target game with the rich specialty-hand ladder.
    CorellianSpike,
    /// Suited select-and-lock game scored against rolled targets.
    CoruscantShift,
    /// Open-hand ±23 game ended by calling "Alderaan".
    Traditional,
}

impl Variant {
    pub fn name(&self) -> &'static str {
        match self {
            Variant::Kessel => "Kessel Sabacc",
            Variant::CorellianSpike => "Corellian Spike Sabacc",
            Variant::CoruscantShift => "Coruscant Shift Sabacc",
            Variant::Traditional => "Traditional Sabacc",
        }
    }

    /// Whether hands are fixed two-slot rather than open.
    pub fn uses_slots(&self) -> bool {
        matches!(self, Variant::Kessel)
    }
}

/// How many full turn cycles a game runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rounds {
    Fixed(u32),
    /// Play continues until a player calls the end.
    Unbounded,
}

/// Timeout fallback for a drawn card awaiting its keep-or-discard choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StagedTimeout {
    KeepExisting,
    KeepDrawn,
}

/// Pre-round dice result the suited variant scores against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub number: i32,
    pub suit: Suit,
}

impl Target {
    /// Roll the gold and silver dice.
    pub fn roll<R: Rng>(rng: &mut R) -> Self {
        Target {
            number: *GOLD_DIE
                .choose(rng)
                .unwrap_or(&0),
            suit: *SILVER_DIE
                .choose(rng)
                .unwrap_or(&Suit::Circles),
        }
    }

    /// Fixed target used when randomization is disabled.
    pub fn fixed() -> Self {
        Target {
            number: 0,
            suit: Suit::Circles,
        }
    }
}

/// Errors rejected at table creation, before any game state exists.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ConfigError {
    #[error("round count must be at least 1")]
    ZeroRounds,

    #[error("unbounded rounds require the call-to-end variant")]
    UnboundedRounds,

    #[error("starting card count must be at least 1")]
    ZeroStartingCards,

    #[error("the two-slot variant always starts with exactly 2 cards")]
    SlotHandSize,

    #[error("player limit must be between 1 and {}", MAX_PLAYERS)]
    PlayerLimitOutOfRange,

    #[error("player count must be between 1 and the table's limit")]
    PlayerCountOutOfRange,
}

/// Full per-table configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantConfig {
    pub variant: Variant,
    pub rounds: Rounds,
    pub starting_cards: u32,
    pub player_limit: u8,
    /// Whether the open variant offers a plain discard action.
    pub allow_discard: bool,
    /// Whether the suited variant rolls its target dice.
    pub target_randomization: bool,
    pub staged_timeout: StagedTimeout,
}

impl VariantConfig {
    /// The defaults each game shipped with.
    pub fn new(variant: Variant) -> Self {
        let (rounds, starting_cards) = match variant {
            Variant::Kessel => (Rounds::Fixed(3), 2),
            Variant::CorellianSpike => (Rounds::Fixed(3), 2),
            Variant::CoruscantShift => (Rounds::Fixed(2), 5),
            Variant::Traditional => (Rounds::Unbounded, 2),
        };
        VariantConfig {
            variant,
            rounds,
            starting_cards,
            player_limit: MAX_PLAYERS,
            allow_discard: matches!(variant, Variant::CorellianSpike),
            target_randomization: matches!(variant, Variant::CoruscantShift),
            staged_timeout: StagedTimeout::KeepExisting,
        }
    }

    /// Validate before any game state is created.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.rounds {
            Rounds::Fixed(0) => return Err(ConfigError::ZeroRounds),
            Rounds::Unbounded if self.variant != Variant::Traditional => {
                return Err(ConfigError::UnboundedRounds)
            }
            _ => {}
        }
        if self.starting_cards == 0 {
            return Err(ConfigError::ZeroStartingCards);
        }
        if self.variant.uses_slots() && self.starting_cards != 2 {
            return Err(ConfigError::SlotHandSize);
        }
        if self.player_limit == 0 || self.player_limit > MAX_PLAYERS {
            return Err(ConfigError::PlayerLimitOutOfRange);
        }
        Ok(())
    }

    /// Deck multiset for one of the parallel signed decks.
    pub fn slot_deck_spec(&self, positive: bool) -> DeckSpec {
        let sign = if positive { 1 } else { -1 };
        DeckSpec {
            pips: (1..=6).map(|v| (sign * v, 3)).collect(),
            suits: None,
            impostors: 3,
            sylops: 1,
        }
    }

    /// Deck multiset for the single-deck variants.
    pub fn single_deck_spec(&self) -> DeckSpec {
        match self.variant {
            Variant::CorellianSpike => {
                let mut pips: Vec<(i32, u32)> = (1..=10).map(|v| (v, 3)).collect();
                pips.extend((1..=10).map(|v| (-v, 3)));
                DeckSpec {
                    pips,
                    suits: None,
                    impostors: 0,
                    sylops: 2,
                }
            }
            Variant::CoruscantShift => {
                let mut pips: Vec<(i32, u32)> = (1..=10).map(|v| (v, 1)).collect();
                pips.extend((1..=10).map(|v| (-v, 1)));
                DeckSpec {
                    pips,
                    suits: Some(Suit::ALL.to_vec()),
                    impostors: 0,
                    sylops: 2,
                }
            }
            Variant::Traditional => {
                let mut pips: Vec<(i32, u32)> = (1..=15).map(|v| (v, 4)).collect();
                // Two copies each of the eight specials: the Idiot, the Queen
                // of Air and Darkness, Endurance, Balance, Demise, Moderation,
                // the Evil One, the Star.
                for special in [0, -2, -8, -11, -13, -14, -15, -17] {
                    pips.push((special, 2));
                }
                DeckSpec {
                    pips,
                    suits: None,
                    impostors: 0,
                    sylops: 0,
                }
            }
            // Kessel never uses a single deck.
            Variant::Kessel => DeckSpec {
                pips: Vec::new(),
                suits: None,
                impostors: 0,
                sylops: 0,
            },
        }
    }

    /// Roll (or fix) the target for the suited variant.
    pub fn roll_target<R: Rng>(&self, rng: &mut R) -> Option<Target> {
        if self.variant != Variant::CoruscantShift {
            return None;
        }
        Some(if self.target_randomization {
            Target::roll(rng)
        } else {
            Target::fixed()
        })
    }
}
