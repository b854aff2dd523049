//! Hand evaluation and ranking.
//!
//! Every finished hand maps to a [`HandScore`]: a lexicographically ordered
//! rank key (smaller sorts first and wins), a named category, and the
//! resolved total. Categories bucket hands before any magnitude comparison,
//! so a specialty hand always beats a coincidentally-equal-total generic one.

use crate::card::Slot;
use crate::player::PlayerState;
use crate::variant::{Target, Variant};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Ordered tie-break key. Compared lexicographically ascending; the minimal
/// key across the table wins the game.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RankKey(pub Vec<i64>);

impl RankKey {
    /// Key ranking an unresolved hand after every complete one.
    pub fn incomplete() -> Self {
        RankKey(vec![i64::MAX])
    }
}

/// Named hand types across all variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandCategory {
    PureSabacc,
    PrimeSabacc,
    CheapSabacc,
    StandardSabacc,
    SarlaccSabacc,
    FullSabacc,
    Fleet,
    TwinSun,
    YeeHa,
    KesselRun,
    Squadron,
    BanthasWild,
    RuleOfTwo,
    SabaccPair,
    Sabacc,
    IdiotsArray,
    FairyEmpress,
    Nulrhek,
    Incomplete,
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HandCategory::PureSabacc => "Pure Sabacc",
            HandCategory::PrimeSabacc => "Prime Sabacc",
            HandCategory::CheapSabacc => "Cheap Sabacc",
            HandCategory::StandardSabacc => "Standard Sabacc",
            HandCategory::SarlaccSabacc => "Sarlacc Sabacc",
            HandCategory::FullSabacc => "Full Sabacc",
            HandCategory::Fleet => "Fleet",
            HandCategory::TwinSun => "Twin Sun",
            HandCategory::YeeHa => "Yee-Ha",
            HandCategory::KesselRun => "Kessel Run",
            HandCategory::Squadron => "Squadron",
            HandCategory::BanthasWild => "Bantha's Wild",
            HandCategory::RuleOfTwo => "Rule of Two",
            HandCategory::SabaccPair => "Sabacc Pair",
            HandCategory::Sabacc => "Sabacc",
            HandCategory::IdiotsArray => "Idiot's Array",
            HandCategory::FairyEmpress => "Fairy Empress",
            HandCategory::Nulrhek => "Nulrhek",
            HandCategory::Incomplete => "Incomplete Hand",
        };
        f.write_str(name)
    }
}

/// Result of evaluating one frozen hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandScore {
    pub key: RankKey,
    pub category: HandCategory,
    pub total: Option<i32>,
}

impl HandScore {
    fn new(key: Vec<i64>, category: HandCategory, total: i32) -> Self {
        HandScore {
            key: RankKey(key),
            category,
            total: Some(total),
        }
    }

    fn incomplete() -> Self {
        HandScore {
            key: RankKey::incomplete(),
            category: HandCategory::Incomplete,
            total: None,
        }
    }
}

/// Evaluate a frozen hand. Pure over the player's resolved state; calling it
/// twice yields the same score.
pub fn evaluate(variant: Variant, player: &PlayerState, target: Option<Target>) -> HandScore {
    match variant {
        Variant::Kessel => evaluate_kessel(player),
        Variant::CorellianSpike => evaluate_spike(player),
        Variant::CoruscantShift => evaluate_shift(player, target.unwrap_or_else(Target::fixed)),
        Variant::Traditional => evaluate_traditional(player),
    }
}

fn evaluate_kessel(player: &PlayerState) -> HandScore {
    // A double Sylop needs no resolution: it is forced to 0 and outranks
    // every coincidentally-zero hand.
    let both_sylop = player
        .hand
        .as_slots()
        .map(|hand| {
            Slot::BOTH
                .iter()
                .all(|&slot| matches!(hand.slot(slot), Some(card) if card.is_sylop()))
        })
        .unwrap_or(false);
    if both_sylop {
        return HandScore::new(vec![1], HandCategory::PureSabacc, 0);
    }

    let (positive, negative) = match (
        player.slot_value(Slot::Positive),
        player.slot_value(Slot::Negative),
    ) {
        (Some(p), Some(n)) => (p, n),
        _ => return HandScore::incomplete(),
    };

    let total = positive + negative;
    let min_abs = positive.abs().min(negative.abs()) as i64;

    if total == 0 && positive.abs() == 1 {
        HandScore::new(vec![2, 1], HandCategory::PrimeSabacc, 0)
    } else if total == 0 && positive.abs() == 6 {
        HandScore::new(vec![3, 6], HandCategory::CheapSabacc, 0)
    } else if total == 0 {
        HandScore::new(vec![4, min_abs], HandCategory::StandardSabacc, 0)
    } else {
        let key = vec![
            10,
            total.abs() as i64,
            if total > 0 { 0 } else { 1 },
            -(positive.max(negative) as i64),
        ];
        HandScore::new(key, HandCategory::Nulrhek, total)
    }
}

fn evaluate_spike(player: &PlayerState) -> HandScore {
    let values = player.open_values();
    let total: i32 = values.iter().sum();
    let zeros = values.iter().filter(|&&v| v == 0).count();

    let mut abs_counts: HashMap<i32, usize> = HashMap::new();
    for &value in &values {
        *abs_counts.entry(value.abs()).or_insert(0) += 1;
    }
    let pairs: Vec<i32> = abs_counts
        .iter()
        .filter(|(_, &count)| count >= 2)
        .map(|(&value, _)| value)
        .collect();
    let lowest_pair = pairs.iter().copied().min();
    let lowest_trip = abs_counts
        .iter()
        .filter(|(_, &count)| count >= 3)
        .map(|(&value, _)| value)
        .min();
    let lowest_quad = abs_counts
        .iter()
        .filter(|(_, &count)| count >= 4)
        .map(|(&value, _)| value)
        .min();
    let has_nonzero_pair = abs_counts
        .iter()
        .any(|(&value, &count)| value != 0 && count >= 2);
    let two_pairs = pairs.len() >= 2;

    let min_abs = values.iter().map(|v| v.abs()).min().unwrap_or(0) as i64;
    let min_abs_nonzero = values
        .iter()
        .filter(|&&v| v != 0)
        .map(|v| v.abs())
        .min()
        .unwrap_or(0) as i64;

    if total != 0 {
        let mut key = vec![
            13,
            total.abs() as i64,
            if total > 0 { 0 } else { 1 },
        ];
        key.extend(generic_tiebreaks(&values));
        return HandScore::new(key, HandCategory::Nulrhek, total);
    }

    if zeros == 2 && values.len() == 2 {
        HandScore::new(vec![1], HandCategory::PureSabacc, 0)
    } else if zeros >= 2 {
        HandScore::new(vec![2], HandCategory::SarlaccSabacc, 0)
    } else if is_full_sabacc(&values) {
        HandScore::new(vec![3], HandCategory::FullSabacc, 0)
    } else if zeros == 1 && lowest_quad.is_some() {
        let tie = lowest_quad.map(i64::from).unwrap_or(min_abs_nonzero);
        HandScore::new(vec![4, tie], HandCategory::Fleet, 0)
    } else if zeros == 1 && two_pairs {
        let tie = lowest_pair.map(i64::from).unwrap_or(min_abs_nonzero);
        HandScore::new(vec![5, tie], HandCategory::TwinSun, 0)
    } else if zeros == 1 && values.len() == 3 && has_nonzero_pair {
        let tie = lowest_pair.map(i64::from).unwrap_or(min_abs_nonzero);
        HandScore::new(vec![6, tie], HandCategory::YeeHa, 0)
    } else if zeros == 1 && has_nonzero_pair {
        let tie = lowest_pair.map(i64::from).unwrap_or(min_abs_nonzero);
        HandScore::new(vec![7, tie], HandCategory::KesselRun, 0)
    } else if lowest_quad.is_some() {
        let tie = lowest_quad.map(i64::from).unwrap_or(min_abs);
        HandScore::new(vec![8, tie], HandCategory::Squadron, 0)
    } else if lowest_trip.is_some() {
        let tie = lowest_trip.map(i64::from).unwrap_or(min_abs);
        HandScore::new(vec![9, tie], HandCategory::BanthasWild, 0)
    } else if two_pairs {
        let tie = pairs.iter().copied().min().map(i64::from).unwrap_or(min_abs);
        HandScore::new(vec![10, tie], HandCategory::RuleOfTwo, 0)
    } else if lowest_pair.is_some() {
        let tie = lowest_pair.map(i64::from).unwrap_or(min_abs);
        HandScore::new(vec![11, tie], HandCategory::SabaccPair, 0)
    } else {
        let mut key = vec![12, min_abs];
        key.extend(generic_tiebreaks(&values));
        HandScore::new(key, HandCategory::Sabacc, 0)
    }
}

/// The one five-card zero hand with its own name: +10 +10 0 -10 -10.
fn is_full_sabacc(values: &[i32]) -> bool {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    sorted == [-10, -10, 0, 10, 10]
}

/// Shared trailing keys: most cards held, highest positive sum, highest
/// single positive card. A hand with no positive card ranks last on the
/// final key.
fn generic_tiebreaks(values: &[i32]) -> Vec<i64> {
    let positive_sum: i32 = values.iter().filter(|&&v| v > 0).sum();
    let max_positive = values.iter().filter(|&&v| v > 0).max();
    vec![
        -(values.len() as i64),
        -(positive_sum as i64),
        max_positive.map(|&v| -(v as i64)).unwrap_or(i64::MAX),
    ]
}

fn evaluate_shift(player: &PlayerState, target: Target) -> HandScore {
    let cards = match player.hand.as_open() {
        Some(hand) => hand.cards(),
        None => return HandScore::incomplete(),
    };

    if cards.len() == 2 && cards.iter().all(|card| card.is_sylop()) {
        return HandScore::new(vec![1], HandCategory::PureSabacc, 0);
    }

    let values = player.open_values();
    let total: i32 = values.iter().sum();
    let suit_matches = cards
        .iter()
        .filter(|card| card.matches_suit(target.suit))
        .count() as i64;
    let max_positive = values.iter().filter(|&&v| v > 0).max().copied().unwrap_or(0);

    let key = vec![
        2,
        (total - target.number).abs() as i64,
        -suit_matches,
        -(total as i64),
        -(max_positive as i64),
    ];
    HandScore::new(key, HandCategory::Nulrhek, total)
}

fn evaluate_traditional(player: &PlayerState) -> HandScore {
    let values = player.open_values();
    let total: i32 = values.iter().sum();

    let mut sorted = values.clone();
    sorted.sort_unstable();
    if sorted == [0, 2, 3] {
        return HandScore::new(vec![1], HandCategory::IdiotsArray, total);
    }
    if total.abs() == 23 {
        return HandScore::new(vec![2], HandCategory::Sabacc, total);
    }
    if values.len() == 2 && values.iter().all(|&v| v == -2) {
        return HandScore::new(vec![3], HandCategory::FairyEmpress, total);
    }

    let distance = (23 - total).abs().min((-23 - total).abs()) as i64;
    let max_abs = values.iter().map(|v| v.abs()).max().unwrap_or(0) as i64;
    let key = vec![
        4,
        distance,
        if total > 0 { 0 } else { 1 },
        -(values.len() as i64),
        -(total.abs() as i64),
        -max_abs,
    ];
    HandScore::new(key, HandCategory::Nulrhek, total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Card, Suit};
    use crate::hand::{Hand, OpenHand, SlotHand};
    use crate::player::PlayerIdentity;
    use pretty_assertions::assert_eq;

    fn slot_player(positive: Card, negative: Card) -> PlayerState {
        let mut hand = SlotHand::new();
        hand.set_slot(Slot::Positive, positive);
        hand.set_slot(Slot::Negative, negative);
        PlayerState::new(
            0,
            PlayerIdentity::Human { name: "test".into() },
            Hand::Slots(hand),
        )
    }

    fn open_player(cards: &[Card]) -> PlayerState {
        let mut hand = OpenHand::new();
        for &card in cards {
            hand.add(card);
        }
        PlayerState::new(
            0,
            PlayerIdentity::Human { name: "test".into() },
            Hand::Open(hand),
        )
    }

    fn spike(values: &[i32]) -> HandScore {
        let cards: Vec<Card> = values
            .iter()
            .map(|&v| if v == 0 { Card::sylop() } else { Card::pip(v) })
            .collect();
        evaluate(Variant::CorellianSpike, &open_player(&cards), None)
    }

    #[test]
    fn test_kessel_pair_ladder() {
        // Dealt (+3, -3) vs (+1, -1): the prime pair wins outright.
        let generic = evaluate(Variant::Kessel, &slot_player(Card::pip(3), Card::pip(-3)), None);
        let prime = evaluate(Variant::Kessel, &slot_player(Card::pip(1), Card::pip(-1)), None);
        assert_eq!(generic.category, HandCategory::StandardSabacc);
        assert_eq!(prime.category, HandCategory::PrimeSabacc);
        assert!(prime.key < generic.key);
    }

    #[test]
    fn test_kessel_cheap_pair_beats_nulrhek_only() {
        let cheap = evaluate(Variant::Kessel, &slot_player(Card::pip(6), Card::pip(-6)), None);
        let nulrhek = evaluate(Variant::Kessel, &slot_player(Card::pip(2), Card::pip(-1)), None);
        assert_eq!(cheap.category, HandCategory::CheapSabacc);
        assert_eq!(nulrhek.category, HandCategory::Nulrhek);
        assert!(cheap.key < nulrhek.key);
    }

    #[test]
    fn test_kessel_pure_sabacc_tops_everything() {
        let pure = evaluate(Variant::Kessel, &slot_player(Card::sylop(), Card::sylop()), None);
        let prime = evaluate(Variant::Kessel, &slot_player(Card::pip(1), Card::pip(-1)), None);
        assert_eq!(pure.category, HandCategory::PureSabacc);
        assert_eq!(pure.total, Some(0));
        assert!(pure.key < prime.key);
    }

    #[test]
    fn test_kessel_nulrhek_positive_beats_negative() {
        let plus = evaluate(Variant::Kessel, &slot_player(Card::pip(3), Card::pip(-2)), None);
        let minus = evaluate(Variant::Kessel, &slot_player(Card::pip(2), Card::pip(-3)), None);
        assert!(plus.key < minus.key);
    }

    #[test]
    fn test_kessel_unresolved_hand_ranks_last() {
        let incomplete = evaluate(
            Variant::Kessel,
            &slot_player(Card::impostor(), Card::pip(-2)),
            None,
        );
        assert_eq!(incomplete.category, HandCategory::Incomplete);
        assert_eq!(incomplete.total, None);
        let worst_nulrhek =
            evaluate(Variant::Kessel, &slot_player(Card::pip(6), Card::pip(-1)), None);
        assert!(worst_nulrhek.key < incomplete.key);
    }

    #[test]
    fn test_evaluate_is_deterministic() {
        let player = slot_player(Card::pip(4), Card::pip(-4));
        let first = evaluate(Variant::Kessel, &player, None);
        let second = evaluate(Variant::Kessel, &player, None);
        assert_eq!(first, second);
    }

    #[test]
    fn test_spike_category_ladder() {
        assert_eq!(spike(&[0, 0]).category, HandCategory::PureSabacc);
        assert_eq!(spike(&[0, 0, 5, -5]).category, HandCategory::SarlaccSabacc);
        assert_eq!(
            spike(&[10, 10, 0, -10, -10]).category,
            HandCategory::FullSabacc
        );
        assert_eq!(spike(&[0, 4, 4, -4, -4]).category, HandCategory::Fleet);
        assert_eq!(spike(&[0, 3, -3, 5, -5]).category, HandCategory::TwinSun);
        assert_eq!(spike(&[0, 7, -7]).category, HandCategory::YeeHa);
        assert_eq!(spike(&[0, 7, -7, 2, -2, 9, -9]).category, HandCategory::TwinSun);
        assert_eq!(spike(&[0, 6, -6, 8, -8, 1, -1]).category, HandCategory::TwinSun);
        assert_eq!(spike(&[5, 5, -5, -5]).category, HandCategory::Squadron);
        assert_eq!(spike(&[2, 2, -2, 1, -3]).category, HandCategory::BanthasWild);
        assert_eq!(spike(&[3, -3, 8, -8]).category, HandCategory::RuleOfTwo);
        assert_eq!(spike(&[4, -4, 7, -7, 9, -9]).category, HandCategory::RuleOfTwo);
        assert_eq!(spike(&[6, -6, 1, -1]).category, HandCategory::RuleOfTwo);
        assert_eq!(spike(&[2, -2, 9]).category, HandCategory::Nulrhek);
        assert_eq!(spike(&[5, -5, 3]).category, HandCategory::Nulrhek);
        assert_eq!(spike(&[5, -5]).category, HandCategory::SabaccPair);
        assert_eq!(spike(&[1, 2, -3]).category, HandCategory::Sabacc);
        assert_eq!(spike(&[4]).category, HandCategory::Nulrhek);
    }

    #[test]
    fn test_spike_kessel_run_needs_more_than_three_cards() {
        let score = spike(&[0, 3, 3, -2, -4]);
        assert_eq!(score.category, HandCategory::KesselRun);
    }

    #[test]
    fn test_spike_category_beats_magnitude() {
        // Four of a kind at zero outranks a plain zero hand with lower
        // magnitudes: the bucket is compared before any tie-break.
        let squadron = spike(&[5, 5, -5, -5]);
        let plain = spike(&[1, 2, -3]);
        assert_eq!(squadron.category, HandCategory::Squadron);
        assert_eq!(plain.category, HandCategory::Sabacc);
        assert!(squadron.key < plain.key);
    }

    #[test]
    fn test_spike_pair_magnitude_monotonicity() {
        // Same bucket: the lower shared magnitude sorts strictly better.
        let low = spike(&[2, -2]);
        let high = spike(&[9, -9]);
        assert_eq!(low.category, high.category);
        assert!(low.key < high.key);
    }

    #[test]
    fn test_spike_nulrhek_tiebreaks() {
        // Equal distance, positive total wins.
        let plus = spike(&[4, -2]);
        let minus = spike(&[2, -4]);
        assert!(plus.key < minus.key);

        // Same total, more cards wins.
        let many = spike(&[1, 1, 1]);
        let few = spike(&[2, 1]);
        assert!(many.key < few.key);
    }

    #[test]
    fn test_shift_pure_sabacc_auto_wins() {
        let target = Target {
            number: 0,
            suit: Suit::Circles,
        };
        let pure = evaluate(
            Variant::CoruscantShift,
            &open_player(&[Card::wild_sylop(), Card::wild_sylop()]),
            Some(target),
        );
        let close = evaluate(
            Variant::CoruscantShift,
            &open_player(&[Card::suited(1, Suit::Circles), Card::suited(-1, Suit::Circles)]),
            Some(target),
        );
        assert_eq!(pure.category, HandCategory::PureSabacc);
        assert!(pure.key < close.key);
    }

    #[test]
    fn test_shift_suit_count_breaks_distance_tie() {
        // Target 5: totals 4 and 6 are both distance 1; two matching suits
        // beat one.
        let target = Target {
            number: 5,
            suit: Suit::Triangles,
        };
        let two_matches = evaluate(
            Variant::CoruscantShift,
            &open_player(&[
                Card::suited(1, Suit::Triangles),
                Card::suited(3, Suit::Triangles),
            ]),
            Some(target),
        );
        let one_match = evaluate(
            Variant::CoruscantShift,
            &open_player(&[
                Card::suited(4, Suit::Triangles),
                Card::suited(2, Suit::Circles),
            ]),
            Some(target),
        );
        assert_eq!(two_matches.key.0[1], one_match.key.0[1]);
        assert!(two_matches.key < one_match.key);
    }

    #[test]
    fn test_shift_wild_suit_counts_as_match() {
        let target = Target {
            number: 0,
            suit: Suit::Squares,
        };
        let with_sylop = evaluate(
            Variant::CoruscantShift,
            &open_player(&[
                Card::suited(3, Suit::Circles),
                Card::suited(-3, Suit::Circles),
                Card::wild_sylop(),
            ]),
            Some(target),
        );
        // Distance 0, one (wild) suit match.
        assert_eq!(with_sylop.key.0[1], 0);
        assert_eq!(with_sylop.key.0[2], -1);
    }

    #[test]
    fn test_traditional_special_hands() {
        let idiots = evaluate(
            Variant::Traditional,
            &open_player(&[Card::pip(0), Card::pip(2), Card::pip(3)]),
            None,
        );
        assert_eq!(idiots.category, HandCategory::IdiotsArray);

        let sabacc = evaluate(
            Variant::Traditional,
            &open_player(&[Card::pip(15), Card::pip(8)]),
            None,
        );
        assert_eq!(sabacc.category, HandCategory::Sabacc);

        let negative_sabacc = evaluate(
            Variant::Traditional,
            &open_player(&[Card::pip(-15), Card::pip(-8)]),
            None,
        );
        assert_eq!(negative_sabacc.category, HandCategory::Sabacc);

        let empress = evaluate(
            Variant::Traditional,
            &open_player(&[Card::pip(-2), Card::pip(-2)]),
            None,
        );
        assert_eq!(empress.category, HandCategory::FairyEmpress);

        assert!(idiots.key < sabacc.key);
        assert!(sabacc.key < empress.key);
    }

    #[test]
    fn test_traditional_nulrhek_distance() {
        // 22 is distance 1 from +23; -20 is distance 3 from -23.
        let near = evaluate(
            Variant::Traditional,
            &open_player(&[Card::pip(14), Card::pip(8)]),
            None,
        );
        let far = evaluate(
            Variant::Traditional,
            &open_player(&[Card::pip(-13), Card::pip(-7)]),
            None,
        );
        assert_eq!(near.category, HandCategory::Nulrhek);
        assert!(near.key < far.key);
    }
}
