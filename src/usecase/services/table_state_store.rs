use std::collections::BTreeMap;

use tracing::trace;

use crate::domain::entities::table_state::{
    dedup_selection, ColumnId, FilterState, Pagination, RouteKey, RowId, TableViewState,
};

/// Per-route table view state. One record per route key, created on first access.
///
/// Each setter replaces exactly one field group, so updates coming from
/// different owners (filter toolbar, pager, selection, header drag) never
/// overwrite each other.
#[derive(Debug, Clone, PartialEq)]
pub struct TableViewStore {
    default_page_size: usize,
    states: BTreeMap<RouteKey, TableViewState>,
}

impl TableViewStore {
    pub fn new(default_page_size: usize) -> Self {
        Self {
            default_page_size: default_page_size.max(1),
            states: BTreeMap::new(),
        }
    }

    pub fn default_state(&self) -> TableViewState {
        TableViewState::new(self.default_page_size)
    }

    pub fn get_state(&self, route: &RouteKey) -> Option<&TableViewState> {
        self.states.get(route)
    }

    pub fn get_or_init(&mut self, route: &RouteKey) -> &mut TableViewState {
        let default_page_size = self.default_page_size;
        self.states.entry(route.clone()).or_insert_with(|| {
            trace!(route = %route, "initialising table view state");
            TableViewState::new(default_page_size)
        })
    }

    /// Snapshot of the state for `route`, defaults when the route was never visited.
    pub fn snapshot(&self, route: &RouteKey) -> TableViewState {
        self.get_state(route)
            .cloned()
            .unwrap_or_else(|| self.default_state())
    }

    pub fn set_filters(&mut self, route: &RouteKey, filters: FilterState) {
        let FilterState {
            column_filters,
            sorting,
            column_visibility,
            date_range,
        } = filters;
        let state = self.get_or_init(route);
        state.column_filters = column_filters;
        state.sorting = sorting;
        state.column_visibility = column_visibility;
        state.date_range = date_range;
        trace!(route = %route, "filters updated");
    }

    pub fn set_pagination(&mut self, route: &RouteKey, pagination: Pagination) {
        self.get_or_init(route).pagination = Pagination {
            page_index: pagination.page_index,
            page_size: pagination.page_size.max(1),
        };
    }

    pub fn set_selection(&mut self, route: &RouteKey, selected: Vec<RowId>) {
        self.get_or_init(route).selected_row_ids = dedup_selection(selected);
    }

    pub fn set_column_order(&mut self, route: &RouteKey, order: Vec<ColumnId>) {
        self.get_or_init(route).column_order = order;
    }

    pub fn clear(&mut self, route: &RouteKey) {
        let fresh = self.default_state();
        self.states.insert(route.clone(), fresh);
        trace!(route = %route, "table view state reset");
    }

    pub fn selection(&self, route: &RouteKey) -> &[RowId] {
        self.get_state(route)
            .map(|state| state.selected_row_ids.as_slice())
            .unwrap_or(&[])
    }

    pub fn toggle_row(&mut self, route: &RouteKey, row_id: RowId) {
        let state = self.get_or_init(route);
        if let Some(pos) = state.selected_row_ids.iter().position(|id| id == &row_id) {
            state.selected_row_ids.remove(pos);
        } else {
            state.selected_row_ids.push(row_id);
        }
    }
}
