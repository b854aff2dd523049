//! The turn state machine and table/round controller.
//!
//! One parameterized engine drives all four variants. A table submits
//! actions for the seat whose turn it is; every entrypoint re-validates the
//! acting seat, rejects invalid actions without mutating state, and returns
//! the events the Presentation Adapter should render.

use crate::actions::{GameAction, GameEvent};
use crate::card::{Card, Slot};
use crate::deck::DeckLayout;
use crate::hand::{Hand, OpenHand, SlotHand};
use crate::player::{PlayerId, PlayerIdentity, PlayerState};
use crate::score::{evaluate, HandCategory, RankKey};
use crate::variant::{ConfigError, Rounds, StagedTimeout, Target, Variant, VariantConfig};
use crate::wildcards::WildcardResolution;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where the table is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// The current seat owes exactly one action.
    AwaitingAction,
    /// A two-slot draw is staged; the same seat owes the keep choice.
    ChoosingKeptCard { slot: Slot },
    /// Hands are frozen; Impostor prompts are being answered.
    ResolvingImpostors,
    /// Standings are final.
    Finished,
}

/// Errors that can occur when applying actions. The action is rejected and
/// state is unchanged; nothing here is fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("Not your turn")]
    NotYourTurn,

    #[error("That action is not valid right now")]
    InvalidForState,

    #[error("The deck is empty. Cannot draw more cards")]
    DeckEmpty,

    #[error("You cannot discard when you have only one card")]
    CannotDiscardLast,

    #[error("No card at that position")]
    NotInHand,

    #[error("You cannot drop a card locked in from a previous round")]
    LockedCard,

    #[error("The final round has already been called")]
    FinalRoundAlreadyCalled,

    #[error("That value was not one of the rolled dice")]
    ChoiceNotRolled,

    #[error("The game is over")]
    GameOver,
}

/// One row of the final results, best hand first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingEntry {
    pub player: PlayerId,
    pub name: String,
    pub synthetic: bool,
    /// Stable hand rendering with resolved wildcard values.
    pub hand: String,
    pub category: HandCategory,
    pub total: Option<i32>,
    pub key: RankKey,
}

/// Final results of a finished game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standings {
    /// Every seat still in at the end, sorted best first.
    pub entries: Vec<StandingEntry>,
    /// Seats sharing the minimal rank key; more than one means a tie.
    pub winners: Vec<PlayerId>,
    /// Players who junked, informational only.
    pub forfeited: Vec<String>,
}

/// The complete state of one running game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub config: VariantConfig,
    /// Seats still in the game, turn order. Junked seats are removed.
    pub players: Vec<PlayerState>,
    /// Index into `players` of the seat whose turn it is.
    pub turn_index: usize,
    pub phase: GamePhase,
    pub decks: DeckLayout,
    /// Cards permanently out of play: junked hands, dropped selections.
    pub discard: Vec<Card>,
    /// Current round, 1-based.
    pub round: u32,
    /// Rolled target of the suited variant.
    pub target: Option<Target>,
    /// Seat index the final-round caller occupies, adjusted as seats junk.
    final_round_caller: Option<usize>,
    resolution: Option<WildcardResolution>,
    standings: Option<Standings>,
    forfeited: Vec<String>,
    /// Whether the table started with exactly one human.
    solo_game: bool,
    next_seat_id: PlayerId,
}

impl GameState {
    /// Validate the configuration, build and shuffle the deck(s), seat the
    /// players in the given order, and deal opening hands.
    pub fn new(config: VariantConfig, names: Vec<String>) -> Result<Self, ConfigError> {
        config.validate()?;
        if names.is_empty() || names.len() > config.player_limit as usize {
            return Err(ConfigError::PlayerCountOutOfRange);
        }

        let mut rng = rand::thread_rng();
        let mut decks = match config.variant {
            Variant::Kessel => DeckLayout::Split {
                positive: config.slot_deck_spec(true).build(&mut rng),
                negative: config.slot_deck_spec(false).build(&mut rng),
            },
            _ => DeckLayout::Single(config.single_deck_spec().build(&mut rng)),
        };
        let target = config.roll_target(&mut rng);

        let solo_game = names.len() == 1;
        let next_seat_id = names.len() as PlayerId;
        let players = names
            .into_iter()
            .enumerate()
            .map(|(seat, name)| {
                let mut player = PlayerState::new(
                    seat as PlayerId,
                    PlayerIdentity::Human { name },
                    empty_hand(config.variant),
                );
                deal(&config, &mut decks, &mut player);
                player
            })
            .collect();

        Ok(GameState {
            config,
            players,
            turn_index: 0,
            phase: GamePhase::AwaitingAction,
            decks,
            discard: Vec::new(),
            round: 1,
            target,
            final_round_caller: None,
            resolution: None,
            standings: None,
            forfeited: Vec::new(),
            solo_game,
            next_seat_id,
        })
    }

    /// Seat whose turn it is, `None` once no action is awaited.
    pub fn current_player_id(&self) -> Option<PlayerId> {
        match self.phase {
            GamePhase::AwaitingAction | GamePhase::ChoosingKeptCard { .. } => {
                self.players.get(self.turn_index).map(|player| player.id)
            }
            _ => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, GamePhase::Finished)
    }

    /// Final results; `Some` only after the game ends.
    pub fn standings(&self) -> Option<&Standings> {
        self.standings.as_ref()
    }

    /// The live Impostor prompt awaiting a choice, if any.
    pub fn pending_impostor(&self) -> Option<crate::wildcards::ImpostorPrompt> {
        self.resolution
            .as_ref()
            .and_then(WildcardResolution::current)
    }

    pub fn get_player(&self, id: PlayerId) -> Option<&PlayerState> {
        self.players.iter().find(|player| player.id == id)
    }

    /// Events announcing the deal and the first turn.
    pub fn opening_events(&self) -> Vec<GameEvent> {
        let mut events = vec![GameEvent::GameStarted {
            player_order: self.players.iter().map(|player| player.id).collect(),
        }];
        if let Some(player) = self.current_player_id() {
            events.push(GameEvent::TurnBegan { player });
        }
        events
    }

    /// Actions the seat may take right now. Empty when it is not that
    /// seat's turn (Impostor prompts are answered through
    /// [`GameState::resolve_impostor`], not actions).
    pub fn valid_actions(&self, player: PlayerId) -> Vec<GameAction> {
        if self.current_player_id() != Some(player) {
            return Vec::new();
        }
        match self.phase {
            GamePhase::ChoosingKeptCard { .. } => {
                vec![GameAction::KeepDrawn, GameAction::KeepExisting]
            }
            GamePhase::AwaitingAction => self.open_turn_actions(),
            _ => Vec::new(),
        }
    }

    fn open_turn_actions(&self) -> Vec<GameAction> {
        let mut actions = Vec::new();
        match (&self.config.variant, &self.decks) {
            (Variant::Kessel, DeckLayout::Split { positive, negative }) => {
                if !positive.is_empty() {
                    actions.push(GameAction::DrawFrom(Slot::Positive));
                }
                if !negative.is_empty() {
                    actions.push(GameAction::DrawFrom(Slot::Negative));
                }
            }
            (Variant::CorellianSpike | Variant::Traditional, DeckLayout::Single(deck)) => {
                let hand_len = self
                    .players
                    .get(self.turn_index)
                    .and_then(|player| player.hand.as_open())
                    .map_or(0, OpenHand::len);
                if !deck.is_empty() {
                    actions.push(GameAction::Draw);
                    for index in 0..hand_len {
                        actions.push(GameAction::Replace(index));
                    }
                }
                if self.config.variant == Variant::CorellianSpike
                    && self.config.allow_discard
                    && hand_len > 1
                {
                    for index in 0..hand_len {
                        actions.push(GameAction::Discard(index));
                    }
                }
                if self.config.variant == Variant::Traditional && self.final_round_caller.is_none()
                {
                    actions.push(GameAction::CallAlderaan);
                }
            }
            (Variant::CoruscantShift, _) => {
                // Keep-everything selection as the representative choice; the
                // adapter enumerates subsets itself.
                let hand_len = self
                    .players
                    .get(self.turn_index)
                    .and_then(|player| player.hand.as_open())
                    .map_or(0, OpenHand::len);
                actions.push(GameAction::ConfirmSelection((0..hand_len).collect()));
            }
            _ => {}
        }
        actions.push(GameAction::Stand);
        actions.push(GameAction::Junk);
        actions
    }

    /// Apply an action for the acting seat.
    pub fn apply_action(
        &mut self,
        player: PlayerId,
        action: GameAction,
    ) -> Result<Vec<GameEvent>, GameError> {
        match self.phase {
            GamePhase::Finished => return Err(GameError::GameOver),
            GamePhase::ResolvingImpostors => return Err(GameError::InvalidForState),
            _ => {}
        }
        // Adapter races can deliver stale actions; re-check the seat on
        // every entry.
        if self.current_player_id() != Some(player) {
            return Err(GameError::NotYourTurn);
        }

        let mut events = Vec::new();
        if let GamePhase::ChoosingKeptCard { .. } = self.phase {
            let keep_drawn = match action {
                GameAction::KeepDrawn => true,
                GameAction::KeepExisting => false,
                _ => return Err(GameError::InvalidForState),
            };
            self.resolve_staged(keep_drawn, &mut events);
            return Ok(events);
        }

        match action {
            GameAction::DrawFrom(slot) => self.draw_from_slot_deck(slot, &mut events)?,
            GameAction::Draw => self.draw_from_single_deck(&mut events)?,
            GameAction::Discard(index) => self.discard_card(index, &mut events)?,
            GameAction::Replace(index) => self.replace_card(index, &mut events)?,
            GameAction::ConfirmSelection(keep) => self.confirm_selection(keep, &mut events)?,
            GameAction::Stand => {
                events.push(GameEvent::PlayerStood { player });
                self.advance_turn(&mut events);
            }
            GameAction::Junk => self.junk_current(&mut events),
            GameAction::CallAlderaan => self.call_final_round(&mut events)?,
            GameAction::KeepDrawn | GameAction::KeepExisting => {
                return Err(GameError::InvalidForState)
            }
        }
        Ok(events)
    }

    /// Answer the live Impostor prompt with one of its rolled values.
    pub fn resolve_impostor(
        &mut self,
        player: PlayerId,
        value: i32,
    ) -> Result<Vec<GameEvent>, GameError> {
        if self.is_finished() {
            return Err(GameError::GameOver);
        }
        if self.phase != GamePhase::ResolvingImpostors {
            return Err(GameError::InvalidForState);
        }
        let prompt = self
            .resolution
            .as_ref()
            .and_then(WildcardResolution::current)
            .ok_or(GameError::InvalidForState)?;
        if prompt.player != player {
            return Err(GameError::NotYourTurn);
        }
        if !prompt.offers(value) {
            return Err(GameError::ChoiceNotRolled);
        }

        let mut events = Vec::new();
        self.accept_impostor_value(value, false, &mut events);
        Ok(events)
    }

    /// Adapter-driven timeout: substitute the default action for the
    /// current suspension point so the game always makes progress.
    pub fn force_timeout(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        match self.phase {
            GamePhase::Finished => {}
            GamePhase::AwaitingAction => {
                if let Some(player) = self.current_player_id() {
                    events.push(GameEvent::TurnTimedOut { player });
                    events.push(GameEvent::PlayerStood { player });
                    self.advance_turn(&mut events);
                }
            }
            GamePhase::ChoosingKeptCard { .. } => {
                if let Some(player) = self.current_player_id() {
                    events.push(GameEvent::TurnTimedOut { player });
                }
                let keep_drawn = self.config.staged_timeout == StagedTimeout::KeepDrawn;
                self.resolve_staged(keep_drawn, &mut events);
            }
            GamePhase::ResolvingImpostors => {
                if let Some(prompt) = self.resolution.as_ref().and_then(WildcardResolution::current)
                {
                    let mut rng = rand::thread_rng();
                    let value = prompt.random_choice(&mut rng);
                    self.accept_impostor_value(value, true, &mut events);
                }
            }
        }
        events
    }

    /// Physical cards accounted for across decks, hands, staging, and the
    /// discard pile. Constant for the lifetime of a game.
    pub fn card_census(&self) -> usize {
        let held: usize = self
            .players
            .iter()
            .map(|player| player.hand.card_count())
            .sum();
        self.decks.remaining() + held + self.discard.len()
    }

    /// JSON snapshot of the full game state.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Restore a snapshot produced by [`GameState::to_json`].
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    // ==================== Turn actions ====================

    fn draw_from_slot_deck(
        &mut self,
        slot: Slot,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), GameError> {
        if self.config.variant != Variant::Kessel {
            return Err(GameError::InvalidForState);
        }
        let DeckLayout::Split { positive, negative } = &mut self.decks else {
            return Err(GameError::InvalidForState);
        };
        let deck = match slot {
            Slot::Positive => positive,
            Slot::Negative => negative,
        };
        let card = deck.draw().ok_or(GameError::DeckEmpty)?;

        let player = &mut self.players[self.turn_index];
        if let Some(hand) = player.hand.as_slots_mut() {
            hand.stage(card, slot);
        }
        events.push(GameEvent::CardStaged {
            player: player.id,
            card,
            slot,
        });
        self.phase = GamePhase::ChoosingKeptCard { slot };
        Ok(())
    }

    fn resolve_staged(&mut self, keep_drawn: bool, events: &mut Vec<GameEvent>) {
        let GamePhase::ChoosingKeptCard { slot } = self.phase else {
            return;
        };
        let player = &mut self.players[self.turn_index];
        let id = player.id;
        let returned = player
            .hand
            .as_slots_mut()
            .and_then(|hand| hand.resolve_staged(keep_drawn));
        let kept = player
            .hand
            .as_slots()
            .and_then(|hand| hand.slot(slot));

        if let (Some(kept), Some(returned)) = (kept, returned) {
            events.push(GameEvent::StagedResolved {
                player: id,
                kept,
                returned,
            });
            if let DeckLayout::Split { positive, negative } = &mut self.decks {
                match slot {
                    Slot::Positive => positive.return_to_bottom(returned),
                    Slot::Negative => negative.return_to_bottom(returned),
                }
            }
        }
        self.phase = GamePhase::AwaitingAction;
        self.advance_turn(events);
    }

    fn draw_from_single_deck(&mut self, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
        if !matches!(
            self.config.variant,
            Variant::CorellianSpike | Variant::Traditional
        ) {
            return Err(GameError::InvalidForState);
        }
        let DeckLayout::Single(deck) = &mut self.decks else {
            return Err(GameError::InvalidForState);
        };
        let card = deck.draw().ok_or(GameError::DeckEmpty)?;

        let player = &mut self.players[self.turn_index];
        if let Some(hand) = player.hand.as_open_mut() {
            hand.add(card);
        }
        events.push(GameEvent::CardDrawn {
            player: player.id,
            card,
        });
        self.advance_turn(events);
        Ok(())
    }

    fn discard_card(&mut self, index: usize, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
        if self.config.variant != Variant::CorellianSpike || !self.config.allow_discard {
            return Err(GameError::InvalidForState);
        }
        let player = &mut self.players[self.turn_index];
        let id = player.id;
        let hand = player.hand.as_open_mut().ok_or(GameError::InvalidForState)?;
        if hand.len() <= 1 {
            return Err(GameError::CannotDiscardLast);
        }
        let card = hand.remove(index).ok_or(GameError::NotInHand)?;
        if let DeckLayout::Single(deck) = &mut self.decks {
            deck.return_to_bottom(card);
        }
        events.push(GameEvent::CardDiscarded { player: id, card });
        self.advance_turn(events);
        Ok(())
    }

    fn replace_card(&mut self, index: usize, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
        if !matches!(
            self.config.variant,
            Variant::CorellianSpike | Variant::Traditional
        ) {
            return Err(GameError::InvalidForState);
        }
        let hand_len = self.players[self.turn_index]
            .hand
            .as_open()
            .map_or(0, OpenHand::len);
        if index >= hand_len {
            return Err(GameError::NotInHand);
        }
        let DeckLayout::Single(deck) = &mut self.decks else {
            return Err(GameError::InvalidForState);
        };
        if deck.is_empty() {
            return Err(GameError::DeckEmpty);
        }

        let player = &mut self.players[self.turn_index];
        let id = player.id;
        let hand = player.hand.as_open_mut().ok_or(GameError::InvalidForState)?;
        let discarded = hand.remove(index).ok_or(GameError::NotInHand)?;
        deck.return_to_bottom(discarded);
        // Non-empty was checked above and the discard went to the bottom, so
        // this draw cannot hand the same card straight back.
        let drawn = deck.draw().ok_or(GameError::DeckEmpty)?;
        hand.add(drawn);

        events.push(GameEvent::CardReplaced {
            player: id,
            discarded,
            drawn,
        });
        self.advance_turn(events);
        Ok(())
    }

    fn confirm_selection(
        &mut self,
        keep: Vec<usize>,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), GameError> {
        if self.config.variant != Variant::CoruscantShift {
            return Err(GameError::InvalidForState);
        }
        let player = &mut self.players[self.turn_index];
        let id = player.id;
        let hand = player.hand.as_open_mut().ok_or(GameError::InvalidForState)?;

        let mut keep = keep;
        keep.sort_unstable();
        keep.dedup();
        if keep.is_empty() {
            return Err(GameError::CannotDiscardLast);
        }
        if keep.iter().any(|&index| index >= hand.len()) {
            return Err(GameError::NotInHand);
        }
        for index in 0..hand.len() {
            if hand.is_locked(index) && !keep.contains(&index) {
                return Err(GameError::LockedCard);
            }
        }

        let dropped = hand.retain_selection(&keep);
        let dropped_count = dropped.len();
        self.discard.extend(dropped);
        events.push(GameEvent::SelectionConfirmed {
            player: id,
            kept: keep.len(),
            dropped: dropped_count,
        });
        self.advance_turn(events);
        Ok(())
    }

    fn call_final_round(&mut self, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
        if self.config.variant != Variant::Traditional {
            return Err(GameError::InvalidForState);
        }
        if self.final_round_caller.is_some() {
            return Err(GameError::FinalRoundAlreadyCalled);
        }
        self.final_round_caller = Some(self.turn_index);
        events.push(GameEvent::FinalRoundCalled {
            player: self.players[self.turn_index].id,
        });
        self.advance_turn(events);
        Ok(())
    }

    // ==================== Turn order ====================

    fn advance_turn(&mut self, events: &mut Vec<GameEvent>) {
        if self.players.is_empty() {
            return;
        }
        self.turn_index = (self.turn_index + 1) % self.players.len();
        if self.turn_index == 0 && self.complete_cycle(events) {
            return;
        }
        if self.reached_final_round_caller() {
            self.end_game(events);
            return;
        }
        events.push(GameEvent::TurnBegan {
            player: self.players[self.turn_index].id,
        });
    }

    /// A full cycle over the live seat list finished. Returns true when the
    /// game ended.
    fn complete_cycle(&mut self, events: &mut Vec<GameEvent>) -> bool {
        self.round += 1;
        if let Rounds::Fixed(limit) = self.config.rounds {
            if self.round > limit {
                self.end_game(events);
                return true;
            }
        }
        events.push(GameEvent::RoundAdvanced { round: self.round });
        if self.config.variant == Variant::CoruscantShift {
            self.lock_and_refill(events);
        }
        false
    }

    /// Between suited-variant rounds: kept cards lock in and hands top back
    /// up, drawing as many cards as the deck still has.
    fn lock_and_refill(&mut self, events: &mut Vec<GameEvent>) {
        let DeckLayout::Single(deck) = &mut self.decks else {
            return;
        };
        for player in &mut self.players {
            if let Some(hand) = player.hand.as_open_mut() {
                hand.lock_all();
                while hand.len() < self.config.starting_cards as usize {
                    match deck.draw() {
                        Some(card) => hand.add(card),
                        None => break,
                    }
                }
            }
        }
        events.push(GameEvent::HandsRefilled { round: self.round });
    }

    fn reached_final_round_caller(&self) -> bool {
        self.final_round_caller == Some(self.turn_index)
    }

    fn junk_current(&mut self, events: &mut Vec<GameEvent>) {
        let junked = self.players.remove(self.turn_index);
        events.push(GameEvent::PlayerJunked { player: junked.id });
        self.discard.extend(hand_cards(&junked.hand));
        self.forfeited
            .push(junked.identity.display_name().to_string());

        if let Some(caller) = &mut self.final_round_caller {
            if *caller > self.turn_index {
                *caller -= 1;
            }
        }

        // Fewer than two seats left: the game cannot continue.
        if self.players.len() < 2 {
            self.end_game(events);
            return;
        }
        // The successor slid into the removed seat's index, so the turn
        // pointer already names the next player; only a wrap needs the
        // cycle bookkeeping.
        if self.turn_index >= self.players.len() {
            self.turn_index = 0;
            if self.complete_cycle(events) {
                return;
            }
        }
        if self.reached_final_round_caller() {
            self.end_game(events);
            return;
        }
        events.push(GameEvent::TurnBegan {
            player: self.players[self.turn_index].id,
        });
    }

    // ==================== Game end ====================

    fn end_game(&mut self, events: &mut Vec<GameEvent>) {
        if self.is_finished() {
            return;
        }
        let mut rng = rand::thread_rng();

        if self.players.is_empty() {
            // Everyone junked; nobody wins.
            self.standings = Some(Standings {
                entries: Vec::new(),
                winners: Vec::new(),
                forfeited: self.forfeited.clone(),
            });
            self.phase = GamePhase::Finished;
            events.push(GameEvent::GameEnded);
            return;
        }

        if self.solo_game && !self.players.iter().any(|p| p.identity.is_synthetic()) {
            self.deal_synthetic_opponent(events);
        }

        if self.config.variant == Variant::Kessel {
            let mut resolution = WildcardResolution::begin(&self.players, &mut rng);
            self.pump_resolution(&mut resolution, events);
            if !resolution.is_complete() {
                self.resolution = Some(resolution);
                self.phase = GamePhase::ResolvingImpostors;
                return;
            }
        }
        self.finish_evaluation(events);
    }

    /// A solo table gets a freshly dealt practice opponent at game end.
    fn deal_synthetic_opponent(&mut self, events: &mut Vec<GameEvent>) {
        let id = self.next_seat_id;
        self.next_seat_id += 1;
        let mut opponent = PlayerState::new(
            id,
            PlayerIdentity::Synthetic,
            empty_hand(self.config.variant),
        );
        deal(&self.config, &mut self.decks, &mut opponent);
        self.players.push(opponent);
        events.push(GameEvent::SyntheticOpponentDealt { player: id });
    }

    /// Store the chosen value for the live prompt and surface the next one.
    fn accept_impostor_value(&mut self, value: i32, by_timeout: bool, events: &mut Vec<GameEvent>) {
        let Some(mut resolution) = self.resolution.take() else {
            return;
        };
        let mut rng = rand::thread_rng();
        if let Some(prompt) = resolution.current() {
            resolution.accept(&mut self.players, value, &mut rng);
            events.push(GameEvent::ImpostorResolved {
                player: prompt.player,
                slot: prompt.slot,
                value,
                by_timeout,
            });
        }
        self.pump_resolution(&mut resolution, events);
        if resolution.is_complete() {
            self.resolution = None;
            self.finish_evaluation(events);
        } else {
            self.resolution = Some(resolution);
        }
    }

    /// Announce the next prompt, auto-resolving any held by the practice
    /// opponent, until a human prompt is live or phase A completes.
    fn pump_resolution(&mut self, resolution: &mut WildcardResolution, events: &mut Vec<GameEvent>) {
        let mut rng = rand::thread_rng();
        while let Some(prompt) = resolution.current() {
            events.push(GameEvent::ImpostorDiceRolled {
                player: prompt.player,
                slot: prompt.slot,
                dice: prompt.dice,
            });
            let synthetic = self
                .get_player(prompt.player)
                .map(|player| player.identity.is_synthetic())
                .unwrap_or(false);
            if !synthetic {
                return;
            }
            let value = prompt.random_choice(&mut rng);
            resolution.accept(&mut self.players, value, &mut rng);
            events.push(GameEvent::ImpostorResolved {
                player: prompt.player,
                slot: prompt.slot,
                value,
                by_timeout: true,
            });
        }
    }

    /// Phase B plus ranking: compute Sylop values, score every remaining
    /// seat, and freeze the standings.
    fn finish_evaluation(&mut self, events: &mut Vec<GameEvent>) {
        if self.config.variant == Variant::Kessel {
            crate::wildcards::assign_sylop_values(&mut self.players);
            for player in &self.players {
                for slot in Slot::BOTH {
                    if let Some(&value) = player.sylop_values.get(&slot) {
                        events.push(GameEvent::SylopResolved {
                            player: player.id,
                            slot,
                            value,
                        });
                    }
                }
            }
        }

        let mut entries: Vec<StandingEntry> = self
            .players
            .iter()
            .map(|player| {
                let score = evaluate(self.config.variant, player, self.target);
                StandingEntry {
                    player: player.id,
                    name: player.identity.display_name().to_string(),
                    synthetic: player.identity.is_synthetic(),
                    hand: player.hand_display(true),
                    category: score.category,
                    total: score.total,
                    key: score.key,
                }
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));

        let winners = match entries.first() {
            Some(best) => entries
                .iter()
                .filter(|entry| entry.key == best.key)
                .map(|entry| entry.player)
                .collect(),
            None => Vec::new(),
        };

        self.standings = Some(Standings {
            entries,
            winners,
            forfeited: self.forfeited.clone(),
        });
        self.phase = GamePhase::Finished;
        events.push(GameEvent::GameEnded);
    }
}

/// Fresh hand of the right shape for the variant.
fn empty_hand(variant: Variant) -> Hand {
    if variant.uses_slots() {
        Hand::Slots(SlotHand::new())
    } else {
        Hand::Open(OpenHand::new())
    }
}

/// Opening deal for one seat, drawing as many cards as the deck(s) allow.
fn deal(config: &VariantConfig, decks: &mut DeckLayout, player: &mut PlayerState) {
    match (decks, &mut player.hand) {
        (DeckLayout::Split { positive, negative }, Hand::Slots(hand)) => {
            if let Some(card) = positive.draw() {
                hand.set_slot(Slot::Positive, card);
            }
            if let Some(card) = negative.draw() {
                hand.set_slot(Slot::Negative, card);
            }
        }
        (DeckLayout::Single(deck), Hand::Open(hand)) => {
            for _ in 0..config.starting_cards {
                match deck.draw() {
                    Some(card) => hand.add(card),
                    None => break,
                }
            }
        }
        _ => {}
    }
}

fn hand_cards(hand: &Hand) -> Vec<Card> {
    match hand {
        Hand::Slots(slots) => {
            let mut cards: Vec<Card> = slots.cards().into_iter().map(|(_, card)| card).collect();
            if let Some(staged) = slots.staged() {
                cards.push(staged.card);
            }
            cards
        }
        Hand::Open(open) => open.cards().to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("Player {}", i + 1)).collect()
    }

    fn new_game(variant: Variant, count: usize) -> GameState {
        GameState::new(VariantConfig::new(variant), names(count)).unwrap()
    }

    #[test]
    fn test_new_game_deals_opening_hands() {
        let game = new_game(Variant::Kessel, 3);
        for player in &game.players {
            let hand = player.hand.as_slots().unwrap();
            assert!(hand.positive.is_some());
            assert!(hand.negative.is_some());
        }
        assert_eq!(game.phase, GamePhase::AwaitingAction);
        assert_eq!(game.round, 1);

        let spike = new_game(Variant::CorellianSpike, 4);
        for player in &spike.players {
            assert_eq!(player.hand.as_open().unwrap().len(), 2);
        }
    }

    #[test]
    fn test_round_robin_turn_order() {
        let mut game = new_game(Variant::CorellianSpike, 3);
        let mut acted = Vec::new();
        for _ in 0..6 {
            let player = game.current_player_id().unwrap();
            acted.push(player);
            game.apply_action(player, GameAction::Stand).unwrap();
        }
        assert_eq!(acted, vec![0, 1, 2, 0, 1, 2]);
        assert_eq!(game.round, 3);
    }

    #[test]
    fn test_out_of_turn_action_rejected() {
        let mut game = new_game(Variant::CorellianSpike, 3);
        let snapshot = game.players.clone();
        assert_eq!(
            game.apply_action(2, GameAction::Stand),
            Err(GameError::NotYourTurn)
        );
        assert_eq!(game.players, snapshot);
        assert_eq!(game.current_player_id(), Some(0));
    }

    #[test]
    fn test_junk_removes_seat_without_skipping() {
        let mut game = new_game(Variant::CorellianSpike, 4);
        game.apply_action(0, GameAction::Stand).unwrap();
        game.apply_action(1, GameAction::Junk).unwrap();

        // Seat 2 follows immediately; seat 1 never acts again.
        assert_eq!(game.current_player_id(), Some(2));
        assert_eq!(game.players.len(), 3);
        game.apply_action(2, GameAction::Stand).unwrap();
        game.apply_action(3, GameAction::Stand).unwrap();
        assert_eq!(game.current_player_id(), Some(0));
        assert_eq!(game.round, 2);
    }

    #[test]
    fn test_junk_to_single_player_ends_game() {
        let mut game = new_game(Variant::CorellianSpike, 2);
        game.apply_action(0, GameAction::Junk).unwrap();
        assert!(game.is_finished());
        let standings = game.standings().unwrap();
        assert_eq!(standings.winners, vec![1]);
        assert_eq!(standings.forfeited, vec!["Player 1".to_string()]);
    }

    #[test]
    fn test_solo_junk_leaves_nobody_to_win() {
        // The practice opponent only sits down against a player who stayed
        // in; a solo human who junks ends the game with no winner.
        let mut game = new_game(Variant::CorellianSpike, 1);
        game.apply_action(0, GameAction::Junk).unwrap();
        assert!(game.is_finished());
        let standings = game.standings().unwrap();
        assert!(standings.entries.is_empty());
        assert!(standings.winners.is_empty());
        assert_eq!(standings.forfeited, vec!["Player 1".to_string()]);
    }

    #[test]
    fn test_three_player_table_survives_one_junk() {
        let mut game = new_game(Variant::CorellianSpike, 3);
        game.apply_action(0, GameAction::Junk).unwrap();
        assert!(!game.is_finished());
        assert_eq!(game.players.len(), 2);
        assert_eq!(game.current_player_id(), Some(1));
    }

    #[test]
    fn test_kessel_draw_forces_keep_choice() {
        let mut game = new_game(Variant::Kessel, 2);
        let before = game.card_census();
        game.apply_action(0, GameAction::DrawFrom(Slot::Positive))
            .unwrap();
        assert!(matches!(
            game.phase,
            GamePhase::ChoosingKeptCard {
                slot: Slot::Positive
            }
        ));
        // Still seat 0's turn; other actions are rejected.
        assert_eq!(
            game.apply_action(0, GameAction::Stand),
            Err(GameError::InvalidForState)
        );

        game.apply_action(0, GameAction::KeepDrawn).unwrap();
        assert_eq!(game.phase, GamePhase::AwaitingAction);
        assert_eq!(game.current_player_id(), Some(1));
        assert_eq!(game.card_census(), before);
    }

    #[test]
    fn test_discard_respects_config_and_floor() {
        let mut game = new_game(Variant::CorellianSpike, 2);
        // Draw one so the hand has three cards, then discard is legal.
        game.apply_action(0, GameAction::Draw).unwrap();
        game.apply_action(1, GameAction::Stand).unwrap();
        game.apply_action(0, GameAction::Discard(0)).unwrap();

        let mut no_discard = GameState::new(
            {
                let mut config = VariantConfig::new(Variant::CorellianSpike);
                config.allow_discard = false;
                config
            },
            names(2),
        )
        .unwrap();
        assert_eq!(
            no_discard.apply_action(0, GameAction::Discard(0)),
            Err(GameError::InvalidForState)
        );
    }

    #[test]
    fn test_replace_conserves_cards() {
        let mut game = new_game(Variant::Traditional, 2);
        let before = game.card_census();
        game.apply_action(0, GameAction::Replace(1)).unwrap();
        assert_eq!(game.card_census(), before);
        assert_eq!(game.players[0].hand.as_open().unwrap().len(), 2);
    }

    #[test]
    fn test_alderaan_gives_one_more_cycle() {
        let mut game = new_game(Variant::Traditional, 3);
        game.apply_action(0, GameAction::CallAlderaan).unwrap();
        assert!(!game.is_finished());

        // A second call is rejected outright.
        assert_eq!(
            game.apply_action(1, GameAction::CallAlderaan),
            Err(GameError::FinalRoundAlreadyCalled)
        );

        game.apply_action(1, GameAction::Stand).unwrap();
        assert!(!game.is_finished());
        game.apply_action(2, GameAction::Stand).unwrap();
        assert!(game.is_finished());
    }

    #[test]
    fn test_timeout_stands_for_the_acting_player() {
        let mut game = new_game(Variant::CorellianSpike, 2);
        let events = game.force_timeout();
        assert!(events
            .iter()
            .any(|event| matches!(event, GameEvent::TurnTimedOut { player: 0 })));
        assert_eq!(game.current_player_id(), Some(1));
    }

    #[test]
    fn test_census_constant_through_play() {
        let mut game = new_game(Variant::CorellianSpike, 3);
        let expected = game.card_census();
        for _ in 0..4 {
            let player = game.current_player_id().unwrap();
            game.apply_action(player, GameAction::Draw).unwrap();
            assert_eq!(game.card_census(), expected);
        }
    }

    #[test]
    fn test_snapshot_round_trip() {
        let game = new_game(Variant::Kessel, 2);
        let json = game.to_json().unwrap();
        let restored = GameState::from_json(&json).unwrap();
        assert_eq!(restored.players, game.players);
        assert_eq!(restored.phase, game.phase);
    }
}
