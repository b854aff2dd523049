//! Console reference adapter for the Sabacc engine.
//!
//! A minimal Presentation Adapter: seats named players at one table, relays
//! typed commands as actions, and prints the resulting events. Variant is
//! selected with the `SABACC_VARIANT` environment variable
//! (kessel | spike | shift | traditional; default spike).

use std::collections::HashMap;
use std::io::{self, BufRead, Write};

use sabacc_core::{GameAction, GameEvent, GamePhase, Slot, Variant, VariantConfig};
use sabacc_host::TableRegistry;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let variant = match std::env::var("SABACC_VARIANT").as_deref() {
        Ok("kessel") => Variant::Kessel,
        Ok("shift") => Variant::CoruscantShift,
        Ok("traditional") => Variant::Traditional,
        _ => Variant::CorellianSpike,
    };

    let registry = TableRegistry::new();
    let table = registry.create_table(VariantConfig::new(variant))?;
    println!("{} table open.", variant.name());

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut handles: HashMap<String, Uuid> = HashMap::new();

    println!("Enter player names, one per line; blank line to start.");
    loop {
        let line = read_line(&mut lines)?;
        let name = line.trim();
        if name.is_empty() {
            break;
        }
        let player = Uuid::new_v4();
        match registry.join(table, player, name.to_string()) {
            Ok(()) => {
                handles.insert(name.to_string(), player);
                println!("{name} joined ({} seated).", handles.len());
            }
            Err(err) => println!("{err}"),
        }
    }

    let Some(&host) = handles.values().next() else {
        println!("Nobody joined; closing the table.");
        registry.close_table(table);
        return Ok(());
    };

    let seats: Vec<(Uuid, String)> = handles
        .iter()
        .map(|(name, &id)| (id, name.clone()))
        .collect();
    let mut outcome = registry.start(table, host)?;
    render_events(&outcome.events, &seats);

    while !outcome.game_over {
        let Some(awaiting) = outcome.awaiting else {
            break;
        };
        let name = name_of(&seats, awaiting);
        let prompt = match outcome.phase {
            GamePhase::ResolvingImpostors => format!("{name}, pick a die value (or `timeout`):"),
            _ => format!("{name}, your action (or `help`, `timeout`):"),
        };
        print!("{prompt} ");
        io::stdout().flush()?;
        let line = read_line(&mut lines)?;
        let input = line.trim();

        let result = if input == "timeout" {
            registry.force_timeout(table)
        } else if outcome.phase == GamePhase::ResolvingImpostors {
            match input.parse::<i32>() {
                Ok(value) => registry.resolve_impostor_choice(table, awaiting, value),
                Err(_) => {
                    println!("Enter one of the rolled values.");
                    continue;
                }
            }
        } else {
            match parse_action(input) {
                Some(action) => registry.submit_action(table, awaiting, action),
                None => {
                    print_help();
                    continue;
                }
            }
        };

        match result {
            Ok(next) => {
                render_events(&next.events, &seats);
                outcome = next;
            }
            Err(err) => println!("{err}"),
        }
    }

    if let Some(standings) = registry.get_standings(table)? {
        println!("{}", serde_json::to_string_pretty(&standings)?);
    }
    registry.close_table(table);
    Ok(())
}

fn read_line(lines: &mut impl Iterator<Item = io::Result<String>>) -> anyhow::Result<String> {
    match lines.next() {
        Some(line) => Ok(line?),
        None => Ok(String::new()),
    }
}

fn parse_action(input: &str) -> Option<GameAction> {
    let mut parts = input.split_whitespace();
    let verb = parts.next()?;
    let index = parts.next().and_then(|raw| raw.parse::<usize>().ok());
    match (verb, index) {
        ("draw", None) => Some(GameAction::Draw),
        ("draw+", None) => Some(GameAction::DrawFrom(Slot::Positive)),
        ("draw-", None) => Some(GameAction::DrawFrom(Slot::Negative)),
        ("keep", None) => Some(GameAction::KeepDrawn),
        ("keepold", None) => Some(GameAction::KeepExisting),
        ("discard", Some(index)) => Some(GameAction::Discard(index)),
        ("replace", Some(index)) => Some(GameAction::Replace(index)),
        ("select", _) => {
            let indices: Option<Vec<usize>> = input
                .split_whitespace()
                .skip(1)
                .map(|raw| raw.parse::<usize>().ok())
                .collect();
            indices.map(GameAction::ConfirmSelection)
        }
        ("stand", None) => Some(GameAction::Stand),
        ("junk", None) => Some(GameAction::Junk),
        ("alderaan", None) => Some(GameAction::CallAlderaan),
        _ => None,
    }
}

fn print_help() {
    println!(
        "Commands: draw | draw+ | draw- | keep | keepold | discard <i> | \
         replace <i> | select <i..> | stand | junk | alderaan | timeout"
    );
}

fn name_of(seats: &[(Uuid, String)], handle: Uuid) -> String {
    seats
        .iter()
        .find(|(id, _)| *id == handle)
        .map(|(_, name)| name.clone())
        .unwrap_or_else(|| "?".to_string())
}

fn render_events(events: &[GameEvent], _seats: &[(Uuid, String)]) {
    for event in events {
        match event {
            GameEvent::GameStarted { player_order } => {
                println!("Cards dealt to {} players.", player_order.len())
            }
            GameEvent::RoundAdvanced { round } => println!("-- Round {round} --"),
            GameEvent::TurnBegan { player } => println!("Seat {player} to act."),
            GameEvent::CardDrawn { player, card } => println!("Seat {player} drew {card}."),
            GameEvent::CardStaged { player, card, .. } => {
                println!("Seat {player} drew {card}; keep it or keep the old card?")
            }
            GameEvent::StagedResolved { player, kept, returned } => {
                println!("Seat {player} kept {kept}, returned {returned}.")
            }
            GameEvent::CardDiscarded { player, card } => {
                println!("Seat {player} discarded {card}.")
            }
            GameEvent::CardReplaced {
                player,
                discarded,
                drawn,
            } => println!("Seat {player} replaced {discarded} with {drawn}."),
            GameEvent::SelectionConfirmed { player, kept, dropped } => {
                println!("Seat {player} kept {kept} cards, dropped {dropped}.")
            }
            GameEvent::HandsRefilled { .. } => println!("Hands locked in and refilled."),
            GameEvent::PlayerStood { player } => println!("Seat {player} stands."),
            GameEvent::PlayerJunked { player } => println!("Seat {player} junked."),
            GameEvent::FinalRoundCalled { player } => {
                println!("Seat {player} called Alderaan! One more turn each.")
            }
            GameEvent::TurnTimedOut { player } => println!("Seat {player} timed out."),
            GameEvent::ImpostorDiceRolled { player, dice, .. } => {
                println!("Seat {player}: dice show {} and {}.", dice.0, dice.1)
            }
            GameEvent::ImpostorResolved { player, value, .. } => {
                println!("Seat {player}'s Impostor is now {value}.")
            }
            GameEvent::SylopResolved { player, value, .. } => {
                println!("Seat {player}'s Sylop mirrors to {value}.")
            }
            GameEvent::SyntheticOpponentDealt { player } => {
                println!("Lando Calrissian AI sits down as seat {player}.")
            }
            GameEvent::GameEnded => println!("Game over."),
        }
    }
}
