//! Game registry: one table per chat group.

use std::collections::HashMap;
use std::sync::Arc;

use lupine_core::{GameConfig, PlayerProfile};
use lupine_protocol::{Command, GroupId, PlayerId, Verb};

use crate::table::spawn_table;
use crate::{NotificationSink, TableError, TableHandle, TableInfo};

/// Default command channel size for table actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Tracks the running table of every group.
///
/// This is the entry point for table operations from the chat adapter:
/// routed [`Command`]s go through [`GameRegistry::dispatch`].
pub struct GameRegistry {
    tables: HashMap<GroupId, TableHandle>,
    channel_size: usize,
}

impl GameRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            tables: HashMap::new(),
            channel_size: DEFAULT_CHANNEL_SIZE,
        }
    }

    /// Opens a lobby for `group`.
    ///
    /// `config` is resolved once here and stays fixed for the table's
    /// lifetime.
    pub fn create(
        &mut self,
        group: GroupId,
        config: GameConfig,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<TableHandle, TableError> {
        if self.tables.contains_key(&group) {
            return Err(TableError::AlreadyExists(group));
        }
        let handle = spawn_table(group, config, sink, self.channel_size);
        self.tables.insert(group, handle.clone());
        tracing::info!(%group, "table created");
        Ok(handle)
    }

    pub fn get(&self, group: GroupId) -> Option<TableHandle> {
        self.tables.get(&group).cloned()
    }

    pub fn has(&self, group: GroupId) -> bool {
        self.tables.contains_key(&group)
    }

    /// Shuts the group's table down and forgets it.
    pub async fn remove(&mut self, group: GroupId) -> Result<(), TableError> {
        let handle = self
            .tables
            .remove(&group)
            .ok_or(TableError::NotFound(group))?;

        // The actor may already be gone; the table is removed either way.
        let _ = handle.shutdown().await;

        tracing::info!(%group, "table removed");
        Ok(())
    }

    fn table(&self, group: GroupId) -> Result<&TableHandle, TableError> {
        self.tables.get(&group).ok_or(TableError::NotFound(group))
    }

    pub async fn join(&self, group: GroupId, profile: PlayerProfile) -> Result<(), TableError> {
        self.table(group)?.join(profile).await
    }

    pub async fn leave(&self, group: GroupId, player: PlayerId) -> Result<bool, TableError> {
        self.table(group)?.leave(player).await
    }

    pub async fn start(&self, group: GroupId) -> Result<(), TableError> {
        self.table(group)?.start().await
    }

    pub async fn info(&self, group: GroupId) -> Result<TableInfo, TableError> {
        self.table(group)?.info().await
    }

    pub async fn submit(
        &self,
        group: GroupId,
        actor: PlayerId,
        verb: Verb,
        raw: impl Into<String>,
    ) -> Result<(), TableError> {
        self.table(group)?.submit(actor, verb, raw).await
    }

    /// Routes a parsed player command to its group's table.
    pub async fn dispatch(&self, command: Command) -> Result<(), TableError> {
        self.submit(command.group, command.actor, command.verb, command.argument)
            .await
    }

    /// Returns the number of tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Lists all groups with a table.
    pub fn groups(&self) -> Vec<GroupId> {
        self.tables.keys().copied().collect()
    }
}

impl Default for GameRegistry {
    fn default() -> Self {
        Self::new()
    }
}
