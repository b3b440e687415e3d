use std::path::PathBuf;

use crate::domain::entities::table_state::{ColumnId, RouteKey};
use crate::infra::sqlite::queries::{clear_column_order, load_column_order, save_column_order};
use crate::infra::sqlite::schema::init_db;
use crate::usecase::ports::prefs::{PrefsError, ViewPrefsRepository};

pub struct SqlitePrefsRepo {
    pub db_path: PathBuf,
}

impl ViewPrefsRepository for SqlitePrefsRepo {
    fn init(&self) -> Result<(), PrefsError> {
        init_db(&self.db_path).map_err(|err| PrefsError::Message(err.to_string()))
    }

    fn load_column_order(&self, route: &RouteKey) -> Result<Vec<ColumnId>, PrefsError> {
        let order = load_column_order(&self.db_path, route.as_str())
            .map_err(|err| PrefsError::Message(err.to_string()))?;
        Ok(order.into_iter().map(ColumnId).collect())
    }

    fn save_column_order(&self, route: &RouteKey, order: &[ColumnId]) -> Result<(), PrefsError> {
        let ids: Vec<String> = order.iter().map(|id| id.0.clone()).collect();
        save_column_order(&self.db_path, route.as_str(), &ids)
            .map_err(|err| PrefsError::Message(err.to_string()))
    }

    fn clear_column_order(&self, route: &RouteKey) -> Result<(), PrefsError> {
        clear_column_order(&self.db_path, route.as_str())
            .map_err(|err| PrefsError::Message(err.to_string()))
    }
}
