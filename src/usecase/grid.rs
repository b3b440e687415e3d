use std::cmp::Ordering;

use anyhow::{Context, Result};
use tracing::debug;

use crate::domain::column::{
    document_columns, effective_order, fixed_columns, reorder_visible, ColumnSpec,
    ReorderRejected, ACTIONS_COLUMN, SELECT_COLUMN,
};
use crate::domain::date_range::row_in_range;
use crate::domain::entities::document::Document;
use crate::domain::entities::table_state::{
    ColumnFilter, ColumnId, FilterValue, Pagination, RouteKey, RowId, SortSpec, TableViewState,
};
use crate::usecase::services::table_state_store::TableViewStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridColumn {
    pub id: ColumnId,
    pub title: String,
    pub sortable: bool,
    pub filterable: bool,
    pub reorderable: bool,
    /// Position in the active sort, with its direction.
    pub sort: Option<(usize, bool)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRow {
    pub row_id: RowId,
    pub cells: Vec<String>,
    pub highlighted: bool,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridProjection {
    pub columns: Vec<GridColumn>,
    pub rows: Vec<GridRow>,
    pub total_rows: usize,
    pub page_count: usize,
    pub pagination: Pagination,
    pub hidden_column_count: usize,
    pub show_reset: bool,
}

impl GridProjection {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExportOptions {
    pub filename: String,
    pub exclude_columns: Vec<ColumnId>,
}

/// Projects raw rows through a table view state: filter, date window, sort, page.
pub struct TableGrid<T> {
    pub columns: Vec<ColumnSpec<T>>,
    pub row_id: fn(&T) -> RowId,
    pub date_field: Option<fn(&T) -> String>,
    pub highlight: Option<Box<dyn Fn(&T) -> bool + Send + Sync>>,
}

impl<T> TableGrid<T> {
    pub fn new(columns: Vec<ColumnSpec<T>>, row_id: fn(&T) -> RowId) -> Self {
        Self {
            columns,
            row_id,
            date_field: None,
            highlight: None,
        }
    }

    pub fn with_date_field(mut self, date_field: fn(&T) -> String) -> Self {
        self.date_field = Some(date_field);
        self
    }

    /// Presentation-only rule; never consulted by filtering, sorting or selection.
    pub fn with_highlight(mut self, highlight: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.highlight = Some(Box::new(highlight));
        self
    }

    pub fn column(&self, id: &ColumnId) -> Option<&ColumnSpec<T>> {
        self.columns.iter().find(|column| &column.id == id)
    }

    /// Visible leaf columns in display order.
    pub fn visible_columns(&self, state: &TableViewState) -> Vec<&ColumnSpec<T>> {
        effective_order(&self.columns, &state.column_order)
            .iter()
            .filter_map(|id| self.column(id))
            .filter(|column| state.is_column_visible(&column.id, column.visible_by_default))
            .collect()
    }

    fn matches_filter(&self, row: &T, filter: &ColumnFilter) -> bool {
        if filter.value.is_empty() {
            return true;
        }
        let Some(column) = self.column(&filter.column_id) else {
            return true;
        };
        let cell = column.value(row);
        match &filter.value {
            FilterValue::Text(term) => cell
                .to_lowercase()
                .contains(&term.trim().to_lowercase()),
            FilterValue::Range(min, max) => {
                let above_min = min
                    .as_deref()
                    .filter(|bound| !bound.trim().is_empty())
                    .map_or(true, |bound| compare_values(&cell, bound) != Ordering::Less);
                let below_max = max
                    .as_deref()
                    .filter(|bound| !bound.trim().is_empty())
                    .map_or(true, |bound| compare_values(&cell, bound) != Ordering::Greater);
                above_min && below_max
            }
            FilterValue::OneOf(values) => values.iter().any(|value| value == &cell),
        }
    }

    /// Rows surviving filters and the date window, in display order (all pages).
    pub fn filtered_sorted<'a>(&self, rows: &'a [T], state: &TableViewState) -> Vec<&'a T> {
        let mut kept: Vec<&T> = rows
            .iter()
            .filter(|row| {
                state
                    .column_filters
                    .iter()
                    .all(|filter| self.matches_filter(row, filter))
            })
            .filter(|row| match self.date_field {
                Some(date_field) => row_in_range(&state.date_range, &date_field(row)),
                None => true,
            })
            .collect();

        let sort_columns: Vec<(&ColumnSpec<T>, bool)> = state
            .sorting
            .iter()
            .filter_map(|spec| {
                self.column(&spec.column_id)
                    .filter(|column| column.sortable)
                    .map(|column| (column, spec.descending))
            })
            .collect();
        if !sort_columns.is_empty() {
            kept.sort_by(|left, right| {
                for (column, descending) in &sort_columns {
                    let ordering = compare_cells(&column.value(left), &column.value(right));
                    let ordering = if *descending {
                        ordering.reverse()
                    } else {
                        ordering
                    };
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                Ordering::Equal
            });
        }
        kept
    }

    pub fn project(&self, rows: &[T], state: &TableViewState) -> GridProjection {
        let kept = self.filtered_sorted(rows, state);
        let pagination = state.pagination.clamped(kept.len());
        let visible = self.visible_columns(state);

        let columns = visible
            .iter()
            .map(|column| GridColumn {
                id: column.id.clone(),
                title: column.title.clone(),
                sortable: column.sortable,
                filterable: column.filterable,
                reorderable: column.reorderable,
                sort: state
                    .sorting
                    .iter()
                    .position(|spec| spec.column_id == column.id)
                    .map(|pos| (pos, state.sorting[pos].descending)),
            })
            .collect();

        let page_rows = kept
            .iter()
            .skip(pagination.page_index * pagination.page_size)
            .take(pagination.page_size)
            .map(|row| {
                let row_id = (self.row_id)(row);
                GridRow {
                    selected: state.is_selected(&row_id),
                    row_id,
                    cells: visible.iter().map(|column| column.value(row)).collect(),
                    highlighted: self.highlight.as_ref().is_some_and(|rule| rule(*row)),
                }
            })
            .collect();

        GridProjection {
            columns,
            rows: page_rows,
            total_rows: kept.len(),
            page_count: pagination.page_count(kept.len()),
            pagination,
            hidden_column_count: state.hidden_column_count(),
            show_reset: state.is_customized(),
        }
    }

    /// CSV of every filtered, sorted row over the visible exportable columns.
    pub fn export_csv(
        &self,
        rows: &[T],
        state: &TableViewState,
        options: &ExportOptions,
    ) -> Result<String> {
        let columns: Vec<&ColumnSpec<T>> = self
            .visible_columns(state)
            .into_iter()
            .filter(|column| column.exportable)
            .filter(|column| {
                column.id.as_str() != SELECT_COLUMN && column.id.as_str() != ACTIONS_COLUMN
            })
            .filter(|column| !options.exclude_columns.contains(&column.id))
            .collect();

        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        writer
            .write_record(columns.iter().map(|column| column.title.as_str()))
            .context("failed to write csv header")?;
        for row in self.filtered_sorted(rows, state) {
            writer
                .write_record(columns.iter().map(|column| column.value(row)))
                .context("failed to write csv row")?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|err| anyhow::anyhow!("failed to flush csv: {err}"))?;
        let mut text = String::from_utf8(bytes).context("csv output is not utf-8")?;
        if text.ends_with('\n') {
            text.pop();
        }
        Ok(text)
    }
}

fn numeric_cell(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Finite numbers rank before text; numbers compare numerically, text case-insensitively.
/// Range bounds use this directly so `10` and `10.0` are the same bound.
fn compare_values(left: &str, right: &str) -> Ordering {
    match (numeric_cell(left), numeric_cell(right)) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => left.to_lowercase().cmp(&right.to_lowercase()),
    }
}

/// Sort order for cells. Total: ties under `compare_values` fall back to the raw strings.
pub fn compare_cells(left: &str, right: &str) -> Ordering {
    compare_values(left, right).then_with(|| left.cmp(right))
}

/// Header click: ascending, then descending, then off. `additive` keeps other sorts.
pub fn cycle_sort(sorting: &[SortSpec], column_id: &ColumnId, additive: bool) -> Vec<SortSpec> {
    let current = sorting.iter().find(|spec| &spec.column_id == column_id);
    let next = match current {
        None => Some(SortSpec {
            column_id: column_id.clone(),
            descending: false,
        }),
        Some(spec) if !spec.descending => Some(SortSpec {
            column_id: column_id.clone(),
            descending: true,
        }),
        Some(_) => None,
    };

    let mut sorting: Vec<SortSpec> = if additive {
        sorting.to_vec()
    } else {
        sorting
            .iter()
            .filter(|spec| &spec.column_id == column_id)
            .cloned()
            .collect()
    };
    match (sorting.iter().position(|spec| &spec.column_id == column_id), next) {
        (Some(pos), Some(spec)) => sorting[pos] = spec,
        (Some(pos), None) => {
            sorting.remove(pos);
        }
        (None, Some(spec)) => sorting.push(spec),
        (None, None) => {}
    }
    sorting
}

/// Replaces (or removes, when empty) the filter for one column.
pub fn with_column_filter(
    filters: &[ColumnFilter],
    column_id: &ColumnId,
    value: FilterValue,
) -> Vec<ColumnFilter> {
    let mut next: Vec<ColumnFilter> = filters
        .iter()
        .filter(|filter| &filter.column_id != column_id)
        .cloned()
        .collect();
    if !value.is_empty() {
        next.push(ColumnFilter {
            column_id: column_id.clone(),
            value,
        });
    }
    next
}

/// Binds a grid to the store: every render writes a clamped page back.
pub struct GridController<'a, T> {
    pub grid: &'a TableGrid<T>,
    pub route: RouteKey,
}

impl<'a, T> GridController<'a, T> {
    pub fn new(grid: &'a TableGrid<T>, route: RouteKey) -> Self {
        Self { grid, route }
    }

    /// Page the store should move to so the current page exists, if it differs.
    pub fn clamp_target(&self, store: &TableViewStore, rows: &[T]) -> Option<Pagination> {
        let state = store.snapshot(&self.route);
        let visible_rows = self.grid.filtered_sorted(rows, &state).len();
        let clamped = state.pagination.clamped(visible_rows);
        (clamped != state.pagination).then_some(clamped)
    }

    pub fn render(&self, store: &mut TableViewStore, rows: &[T]) -> GridProjection {
        if let Some(pagination) = self.clamp_target(store, rows) {
            debug!(
                route = %self.route,
                page_index = pagination.page_index,
                "clamping page index"
            );
            store.set_pagination(&self.route, pagination);
        }
        let state = store.get_or_init(&self.route).clone();
        self.grid.project(rows, &state)
    }

    /// Header drag of `source` onto `target`. Rejected moves leave the store untouched.
    pub fn reorder(
        &self,
        store: &mut TableViewStore,
        source: &ColumnId,
        target: &ColumnId,
    ) -> Result<Vec<ColumnId>, ReorderRejected> {
        let state = store.get_or_init(&self.route).clone();
        let order = effective_order(&self.grid.columns, &state.column_order);
        let mut visibility = state.column_visibility.clone();
        for column in &self.grid.columns {
            visibility
                .entry(column.id.clone())
                .or_insert(column.visible_by_default);
        }
        let fixed = fixed_columns(&self.grid.columns);

        match reorder_visible(&order, &visibility, &fixed, source, target) {
            Ok(next) => {
                store.set_column_order(&self.route, next.clone());
                Ok(next)
            }
            Err(rejected) => {
                debug!(route = %self.route, reason = %rejected, "column move rejected");
                Err(rejected)
            }
        }
    }

    pub fn go_to_page(&self, store: &mut TableViewStore, page_index: usize) {
        let pagination = store.get_or_init(&self.route).pagination;
        store.set_pagination(
            &self.route,
            Pagination {
                page_index,
                page_size: pagination.page_size,
            },
        );
    }
}

fn document_row_id(document: &Document) -> RowId {
    RowId::from(document.id.0)
}

fn document_received_date(document: &Document) -> String {
    document.received_date.clone()
}

/// Document queue grid. Charts longer than `large_chart_pages` are highlighted.
pub fn document_grid(large_chart_pages: u32) -> TableGrid<Document> {
    TableGrid::new(document_columns(), document_row_id)
        .with_date_field(document_received_date)
        .with_highlight(move |document: &Document| document.page_count > large_chart_pages)
}
