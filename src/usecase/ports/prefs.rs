use crate::domain::entities::table_state::{ColumnId, RouteKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefsError {
    Message(String),
}

impl std::fmt::Display for PrefsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrefsError::Message(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for PrefsError {}

/// Per-route view preferences that outlive the session, kept apart from filter state.
pub trait ViewPrefsRepository: Send + Sync {
    fn init(&self) -> Result<(), PrefsError>;

    fn load_column_order(&self, route: &RouteKey) -> Result<Vec<ColumnId>, PrefsError>;
    fn save_column_order(&self, route: &RouteKey, order: &[ColumnId]) -> Result<(), PrefsError>;
    fn clear_column_order(&self, route: &RouteKey) -> Result<(), PrefsError>;
}
