//! The table registry: every running table, keyed by id.
//!
//! This is the one structure shared across tables. Tables are inserted on
//! creation and removed by [`TableRegistry::close_table`] once the adapter
//! is done with them; a finished table stays queryable so standings remain
//! available after the final turn.

use crate::table::{Table, TableError, TurnOutcome};
use dashmap::DashMap;
use sabacc_core::{ConfigError, GameAction, Standings, VariantConfig};
use tracing::{debug, info};
use uuid::Uuid;

/// Identifier for one table.
pub type TableId = Uuid;

/// All active tables.
#[derive(Default)]
pub struct TableRegistry {
    tables: DashMap<TableId, Table>,
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration and open a fresh lobby.
    pub fn create_table(&self, config: VariantConfig) -> Result<TableId, ConfigError> {
        config.validate()?;
        let id = Uuid::new_v4();
        info!(table = %id, variant = config.variant.name(), "table created");
        self.tables.insert(id, Table::new(id, config));
        Ok(id)
    }

    /// Seat a player in a lobby.
    pub fn join(&self, table: TableId, player: Uuid, name: String) -> Result<(), TableError> {
        let mut table_ref = self.tables.get_mut(&table).ok_or(TableError::UnknownTable)?;
        table_ref.join(player, name.clone())?;
        info!(table = %table, %player, name = %name, "player joined");
        Ok(())
    }

    /// Start the game; any seated player may do so.
    pub fn start(&self, table: TableId, requester: Uuid) -> Result<TurnOutcome, TableError> {
        let mut table_ref = self.tables.get_mut(&table).ok_or(TableError::UnknownTable)?;
        let outcome = table_ref.start(requester)?;
        info!(
            table = %table,
            players = table_ref.player_count(),
            "game started"
        );
        Ok(outcome)
    }

    /// Apply one action for the acting player.
    pub fn submit_action(
        &self,
        table: TableId,
        player: Uuid,
        action: GameAction,
    ) -> Result<TurnOutcome, TableError> {
        let mut table_ref = self.tables.get_mut(&table).ok_or(TableError::UnknownTable)?;
        let outcome = table_ref.submit_action(player, action)?;
        debug!(table = %table, %player, events = outcome.events.len(), "action applied");
        Ok(outcome)
    }

    /// Adapter-driven timeout of whatever the game is waiting on.
    pub fn force_timeout(&self, table: TableId) -> Result<TurnOutcome, TableError> {
        let mut table_ref = self.tables.get_mut(&table).ok_or(TableError::UnknownTable)?;
        let outcome = table_ref.force_timeout()?;
        debug!(table = %table, "timeout applied");
        Ok(outcome)
    }

    /// Answer a pending Impostor prompt.
    pub fn resolve_impostor_choice(
        &self,
        table: TableId,
        player: Uuid,
        value: i32,
    ) -> Result<TurnOutcome, TableError> {
        let mut table_ref = self.tables.get_mut(&table).ok_or(TableError::UnknownTable)?;
        table_ref.resolve_impostor_choice(player, value)
    }

    /// Final standings, `Some` only after the game ended.
    pub fn get_standings(&self, table: TableId) -> Result<Option<Standings>, TableError> {
        let table_ref = self.tables.get(&table).ok_or(TableError::UnknownTable)?;
        Ok(table_ref.standings())
    }

    /// Legal actions for a player right now.
    pub fn valid_actions(&self, table: TableId, player: Uuid) -> Result<Vec<GameAction>, TableError> {
        let table_ref = self.tables.get(&table).ok_or(TableError::UnknownTable)?;
        Ok(table_ref.valid_actions(player))
    }

    /// Release a table, terminal or abandoned. Returns whether it existed.
    pub fn close_table(&self, table: TableId) -> bool {
        let removed = self.tables.remove(&table).is_some();
        if removed {
            info!(table = %table, "table closed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::LobbyError;
    use sabacc_core::{GameEvent, Variant};

    fn seated_table(registry: &TableRegistry, players: &[(&str, Uuid)]) -> TableId {
        let table = registry
            .create_table(VariantConfig::new(Variant::CorellianSpike))
            .unwrap();
        for (name, id) in players {
            registry.join(table, *id, name.to_string()).unwrap();
        }
        table
    }

    #[test]
    fn test_lobby_rejects_duplicates_and_late_joins() {
        let registry = TableRegistry::new();
        let han = Uuid::new_v4();
        let leia = Uuid::new_v4();
        let table = seated_table(&registry, &[("Han", han), ("Leia", leia)]);

        assert!(matches!(
            registry.join(table, han, "Han".into()),
            Err(TableError::Lobby(LobbyError::AlreadyJoined))
        ));

        registry.start(table, han).unwrap();
        assert!(matches!(
            registry.join(table, Uuid::new_v4(), "Lando".into()),
            Err(TableError::Lobby(LobbyError::AlreadyStarted))
        ));
    }

    #[test]
    fn test_full_lobby_rejected() {
        let registry = TableRegistry::new();
        let mut config = VariantConfig::new(Variant::CorellianSpike);
        config.player_limit = 2;
        let table = registry.create_table(config).unwrap();
        registry.join(table, Uuid::new_v4(), "a".into()).unwrap();
        registry.join(table, Uuid::new_v4(), "b".into()).unwrap();
        assert!(matches!(
            registry.join(table, Uuid::new_v4(), "c".into()),
            Err(TableError::Lobby(LobbyError::Full))
        ));
    }

    #[test]
    fn test_invalid_config_rejected_before_state_exists() {
        let registry = TableRegistry::new();
        let mut config = VariantConfig::new(Variant::CorellianSpike);
        config.starting_cards = 0;
        assert_eq!(
            registry.create_table(config),
            Err(ConfigError::ZeroStartingCards)
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_standings_only_after_game_end() {
        let registry = TableRegistry::new();
        let han = Uuid::new_v4();
        let leia = Uuid::new_v4();
        let table = seated_table(&registry, &[("Han", han), ("Leia", leia)]);

        registry.start(table, leia).unwrap();
        assert_eq!(registry.get_standings(table).unwrap(), None);

        // Junking down to one player ends the game immediately.
        let outcome = registry
            .submit_action(table, han, GameAction::Junk)
            .unwrap();
        assert!(outcome.game_over);
        assert!(outcome
            .events
            .iter()
            .any(|event| matches!(event, GameEvent::GameEnded)));

        let standings = registry.get_standings(table).unwrap().unwrap();
        assert_eq!(standings.entries.len(), 1);
        assert_eq!(standings.forfeited, vec!["Han".to_string()]);

        assert!(registry.close_table(table));
        assert!(matches!(
            registry.get_standings(table),
            Err(TableError::UnknownTable)
        ));
    }

    #[test]
    fn test_stale_action_from_wrong_player_rejected() {
        let registry = TableRegistry::new();
        let han = Uuid::new_v4();
        let leia = Uuid::new_v4();
        let table = seated_table(&registry, &[("Han", han), ("Leia", leia)]);
        registry.start(table, han).unwrap();

        // Han acts; a stale press from Han arrives again while it is Leia's
        // turn and must be rejected without touching state.
        registry
            .submit_action(table, han, GameAction::Stand)
            .unwrap();
        assert!(matches!(
            registry.submit_action(table, han, GameAction::Stand),
            Err(TableError::Action(sabacc_core::GameError::NotYourTurn))
        ));
        let outcome = registry
            .submit_action(table, leia, GameAction::Stand)
            .unwrap();
        assert_eq!(outcome.round, 2);
    }
}
