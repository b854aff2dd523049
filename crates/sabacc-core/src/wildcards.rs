//! End-of-game wildcard resolution.
//!
//! Resolution is a two-phase barrier. Phase A: every Impostor in the game
//! gets a value. Two dice are rolled per card, the holder picks one, and a
//! hand with two Impostors resolves the positive slot before the negative.
//! Phase B: Sylop values are computed from the now-complete partner values.
//! No Sylop is computed while any Impostor prompt is outstanding.

use crate::card::Slot;
use crate::player::{PlayerId, PlayerState};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Roll both dice for an Impostor slot. Sign matches the slot: positive slot
/// values land in 1..=6, negative slot values in -6..=-1.
pub fn roll_impostor_dice<R: Rng>(slot: Slot, rng: &mut R) -> (i32, i32) {
    let sign = slot.sign();
    (sign * rng.gen_range(1..=6), sign * rng.gen_range(1..=6))
}

/// One live Impostor decision: the dice are rolled, the holder must pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpostorPrompt {
    pub player: PlayerId,
    pub slot: Slot,
    pub dice: (i32, i32),
}

impl ImpostorPrompt {
    /// Whether `value` is one of the two rolled values.
    pub fn offers(&self, value: i32) -> bool {
        value == self.dice.0 || value == self.dice.1
    }

    /// Uniform pick between the two rolled values, used when the holder
    /// never answers.
    pub fn random_choice<R: Rng>(&self, rng: &mut R) -> i32 {
        if rng.gen_bool(0.5) {
            self.dice.0
        } else {
            self.dice.1
        }
    }
}

/// Phase A state: the queue of seats still owing Impostor choices and the
/// single prompt currently on the table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WildcardResolution {
    pending: VecDeque<PlayerId>,
    current: Option<ImpostorPrompt>,
}

impl WildcardResolution {
    /// Collect every seat holding an unresolved Impostor (turn order) and
    /// roll the first prompt.
    pub fn begin<R: Rng>(players: &[PlayerState], rng: &mut R) -> Self {
        let pending = players
            .iter()
            .filter(|player| player.holds_unresolved_impostor())
            .map(|player| player.id)
            .collect();
        let mut resolution = WildcardResolution {
            pending,
            current: None,
        };
        resolution.advance(players, rng);
        resolution
    }

    /// The prompt awaiting an answer, if any.
    pub fn current(&self) -> Option<ImpostorPrompt> {
        self.current
    }

    /// Phase A is done once no prompt is live and no seat is queued.
    pub fn is_complete(&self) -> bool {
        self.current.is_none() && self.pending.is_empty()
    }

    /// Record the chosen value for the live prompt and roll the next one.
    /// The caller has already validated the chooser and the value.
    pub fn accept<R: Rng>(&mut self, players: &mut [PlayerState], value: i32, rng: &mut R) {
        if let Some(prompt) = self.current.take() {
            if let Some(player) = players.iter_mut().find(|p| p.id == prompt.player) {
                player.impostor_values.insert(prompt.slot, value);
            }
        }
        self.advance(players, rng);
    }

    fn advance<R: Rng>(&mut self, players: &[PlayerState], rng: &mut R) {
        while let Some(&seat) = self.pending.front() {
            let slot = players
                .iter()
                .find(|player| player.id == seat)
                .and_then(next_unresolved_slot);
            match slot {
                Some(slot) => {
                    self.current = Some(ImpostorPrompt {
                        player: seat,
                        slot,
                        dice: roll_impostor_dice(slot, rng),
                    });
                    return;
                }
                None => {
                    self.pending.pop_front();
                }
            }
        }
    }
}

/// Positive slot resolves before negative.
fn next_unresolved_slot(player: &PlayerState) -> Option<Slot> {
    let hand = player.hand.as_slots()?;
    Slot::BOTH.into_iter().find(|&slot| {
        matches!(hand.slot(slot), Some(card) if card.is_impostor())
            && !player.impostor_values.contains_key(&slot)
    })
}

/// Phase B: fix Sylop values from the partner card. Both slots Sylop means
/// both are 0; a lone Sylop takes the partner's absolute value with the sign
/// of its own slot.
pub fn assign_sylop_values(players: &mut [PlayerState]) {
    for player in players {
        let Some(hand) = player.hand.as_slots() else {
            continue;
        };
        let positive_sylop = matches!(hand.slot(Slot::Positive), Some(card) if card.is_sylop());
        let negative_sylop = matches!(hand.slot(Slot::Negative), Some(card) if card.is_sylop());

        if positive_sylop && negative_sylop {
            player.sylop_values.insert(Slot::Positive, 0);
            player.sylop_values.insert(Slot::Negative, 0);
        } else if positive_sylop {
            let other = player.slot_value(Slot::Negative).unwrap_or(0);
            player.sylop_values.insert(Slot::Positive, other.abs());
        } else if negative_sylop {
            let other = player.slot_value(Slot::Positive).unwrap_or(0);
            player.sylop_values.insert(Slot::Negative, -other.abs());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Card;
    use crate::hand::{Hand, SlotHand};
    use crate::player::PlayerIdentity;

    fn seat(id: PlayerId, positive: Card, negative: Card) -> PlayerState {
        let mut hand = SlotHand::new();
        hand.set_slot(Slot::Positive, positive);
        hand.set_slot(Slot::Negative, negative);
        PlayerState::new(
            id,
            PlayerIdentity::Human {
                name: format!("p{id}"),
            },
            Hand::Slots(hand),
        )
    }

    #[test]
    fn test_dice_signs_match_slot() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let (a, b) = roll_impostor_dice(Slot::Positive, &mut rng);
            assert!((1..=6).contains(&a) && (1..=6).contains(&b));
            let (a, b) = roll_impostor_dice(Slot::Negative, &mut rng);
            assert!((-6..=-1).contains(&a) && (-6..=-1).contains(&b));
        }
    }

    #[test]
    fn test_sylop_mirrors_partner() {
        let mut players = vec![
            seat(0, Card::sylop(), Card::pip(-4)),
            seat(1, Card::pip(3), Card::sylop()),
            seat(2, Card::sylop(), Card::sylop()),
        ];
        assign_sylop_values(&mut players);

        assert_eq!(players[0].sylop_values.get(&Slot::Positive), Some(&4));
        assert_eq!(players[1].sylop_values.get(&Slot::Negative), Some(&-3));
        assert_eq!(players[2].sylop_values.get(&Slot::Positive), Some(&0));
        assert_eq!(players[2].sylop_values.get(&Slot::Negative), Some(&0));
    }

    #[test]
    fn test_sylop_uses_resolved_impostor_value() {
        let mut players = vec![seat(0, Card::impostor(), Card::sylop())];
        players[0].impostor_values.insert(Slot::Positive, 5);
        assign_sylop_values(&mut players);
        assert_eq!(players[0].sylop_values.get(&Slot::Negative), Some(&-5));
    }

    #[test]
    fn test_resolution_sequences_prompts() {
        let mut rng = rand::thread_rng();
        let mut players = vec![
            seat(0, Card::impostor(), Card::impostor()),
            seat(1, Card::pip(2), Card::impostor()),
            seat(2, Card::pip(1), Card::pip(-1)),
        ];

        let mut resolution = WildcardResolution::begin(&players, &mut rng);

        // Seat 0, positive slot first.
        let prompt = resolution.current().unwrap();
        assert_eq!((prompt.player, prompt.slot), (0, Slot::Positive));
        resolution.accept(&mut players, prompt.dice.0, &mut rng);

        // Seat 0 again, negative slot.
        let prompt = resolution.current().unwrap();
        assert_eq!((prompt.player, prompt.slot), (0, Slot::Negative));
        resolution.accept(&mut players, prompt.dice.1, &mut rng);

        // Then seat 1; seat 2 holds no Impostor.
        let prompt = resolution.current().unwrap();
        assert_eq!((prompt.player, prompt.slot), (1, Slot::Negative));
        resolution.accept(&mut players, prompt.dice.0, &mut rng);

        assert!(resolution.is_complete());
        assert_eq!(players[0].impostor_values.len(), 2);
        assert_eq!(players[1].impostor_values.len(), 1);
    }

    #[test]
    fn test_no_impostors_completes_immediately() {
        let players = vec![seat(0, Card::pip(1), Card::pip(-2))];
        let mut rng = rand::thread_rng();
        let resolution = WildcardResolution::begin(&players, &mut rng);
        assert!(resolution.is_complete());
        assert!(resolution.current().is_none());
    }
}
