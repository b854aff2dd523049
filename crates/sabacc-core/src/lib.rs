//! Sabacc - a turn-based engine for four multiplayer card-game variants
//!
//! This crate provides the core game logic for Sabacc tables, including:
//! - Deck construction for each variant's exact card multiset
//! - Fixed-slot and open hand models with draw/discard/replace mechanics
//! - Two-phase Impostor/Sylop wildcard resolution
//! - Deterministic hand ranking with per-variant category ladders
//! - The per-player turn state machine and table/round controller
//!
//! # Architecture
//!
//! The engine is platform-agnostic and synchronous: it emits abstract
//! [`GameEvent`]s and consumes already-authenticated player choices. The
//! chat/rendering side lives in a separate Presentation Adapter (see the
//! `sabacc-host` crate), which also owns wall-clock timing and calls
//! [`GameState::force_timeout`] when the acting player goes quiet.
//!
//! # Modules
//!
//! - [`card`]: card, suit, and slot primitives
//! - [`deck`]: deck multisets and the draw/return stack
//! - [`hand`]: fixed two-slot and open hand models
//! - [`player`]: seats, identities, resolved wildcard values
//! - [`variant`]: per-variant configuration and validation
//! - [`score`]: hand evaluation and rank keys
//! - [`wildcards`]: the end-of-game resolution barrier
//! - [`game`]: the turn state machine and table controller

pub mod actions;
pub mod card;
pub mod deck;
pub mod game;
pub mod hand;
pub mod player;
pub mod score;
pub mod variant;
pub mod wildcards;

// Re-export commonly used types
pub use actions::{GameAction, GameEvent};
pub use card::{Card, Face, Slot, Suit};
pub use deck::{Deck, DeckLayout, DeckSpec};
pub use game::{GameError, GamePhase, GameState, StandingEntry, Standings};
pub use hand::{Hand, OpenHand, SlotHand, StagedDraw};
pub use player::{PlayerId, PlayerIdentity, PlayerState};
pub use score::{evaluate, HandCategory, HandScore, RankKey};
pub use variant::{
    ConfigError, Rounds, StagedTimeout, Target, Variant, VariantConfig, MAX_PLAYERS,
};
pub use wildcards::{ImpostorPrompt, WildcardResolution};
