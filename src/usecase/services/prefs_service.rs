use std::sync::Arc;

use tracing::warn;

use crate::domain::entities::table_state::{ColumnId, RouteKey};
use crate::usecase::ports::prefs::{PrefsError, ViewPrefsRepository};
use crate::usecase::services::table_state_store::TableViewStore;

/// Keeps the persisted column order in step with the in-memory store.
pub struct ViewPrefsService {
    repo: Arc<dyn ViewPrefsRepository>,
}

impl ViewPrefsService {
    pub fn new(repo: Arc<dyn ViewPrefsRepository>) -> Self {
        Self { repo }
    }

    pub fn init(&self) -> Result<(), PrefsError> {
        self.repo.init()
    }

    /// Loads the stored order for `route` unless the session already has one.
    pub fn restore(&self, store: &mut TableViewStore, route: &RouteKey) -> Result<(), PrefsError> {
        if store
            .get_state(route)
            .is_some_and(|state| !state.column_order.is_empty())
        {
            return Ok(());
        }
        let order = self.repo.load_column_order(route)?;
        if !order.is_empty() {
            store.set_column_order(route, order);
        }
        Ok(())
    }

    pub fn save_order(
        &self,
        store: &mut TableViewStore,
        route: &RouteKey,
        order: Vec<ColumnId>,
    ) -> Result<(), PrefsError> {
        self.repo.save_column_order(route, &order).map_err(|err| {
            warn!(route = %route, error = %err, "failed to persist column order");
            err
        })?;
        store.set_column_order(route, order);
        Ok(())
    }

    /// Clears the in-memory state and the persisted column order.
    pub fn reset(&self, store: &mut TableViewStore, route: &RouteKey) -> Result<(), PrefsError> {
        store.clear(route);
        self.repo.clear_column_order(route)
    }
}
