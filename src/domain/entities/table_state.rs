use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::entities::document::Stage;

/// Identifies one table's persisted view state, built from the route segments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RouteKey(pub String);

impl RouteKey {
    pub fn from_segments(segments: &[&str]) -> Self {
        RouteKey(segments.concat())
    }

    pub fn for_stage(stage: Stage) -> Self {
        Self::from_segments(&["documents", stage.slug()])
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RouteKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnId(pub String);

impl ColumnId {
    pub fn new(id: impl Into<String>) -> Self {
        ColumnId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ColumnId {
    fn from(value: &str) -> Self {
        ColumnId(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowId(pub String);

impl From<&str> for RowId {
    fn from(value: &str) -> Self {
        RowId(value.to_string())
    }
}

impl From<i64> for RowId {
    fn from(value: i64) -> Self {
        RowId(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Range(Option<String>, Option<String>),
    OneOf(Vec<String>),
}

impl FilterValue {
    pub fn is_empty(&self) -> bool {
        let blank = |value: &Option<String>| value.as_deref().map_or(true, |v| v.trim().is_empty());
        match self {
            FilterValue::Text(text) => text.trim().is_empty(),
            FilterValue::Range(min, max) => blank(min) && blank(max),
            FilterValue::OneOf(values) => values.is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnFilter {
    pub column_id: ColumnId,
    pub value: FilterValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub column_id: ColumnId,
    pub descending: bool,
}

/// Inclusive date window applied to the grid's date column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn is_active(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => start <= date && date <= end,
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page_index: usize,
    pub page_size: usize,
}

impl Pagination {
    pub fn first(page_size: usize) -> Self {
        Self {
            page_index: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn page_count(&self, row_count: usize) -> usize {
        row_count.div_ceil(self.page_size.max(1))
    }

    /// Keeps `page_index` on an existing page for `row_count` rows.
    pub fn clamped(&self, row_count: usize) -> Self {
        let last_page = self.page_count(row_count).saturating_sub(1);
        Self {
            page_index: self.page_index.min(last_page),
            page_size: self.page_size.max(1),
        }
    }
}

/// Payload of a filter update: everything the filter toolbar owns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    pub column_filters: Vec<ColumnFilter>,
    pub sorting: Vec<SortSpec>,
    pub column_visibility: BTreeMap<ColumnId, bool>,
    pub date_range: DateRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableViewState {
    pub column_filters: Vec<ColumnFilter>,
    pub sorting: Vec<SortSpec>,
    pub column_visibility: BTreeMap<ColumnId, bool>,
    pub column_order: Vec<ColumnId>,
    pub date_range: DateRange,
    pub pagination: Pagination,
    pub selected_row_ids: Vec<RowId>,
}

impl TableViewState {
    pub fn new(default_page_size: usize) -> Self {
        Self {
            column_filters: Vec::new(),
            sorting: Vec::new(),
            column_visibility: BTreeMap::new(),
            column_order: Vec::new(),
            date_range: DateRange::default(),
            pagination: Pagination::first(default_page_size),
            selected_row_ids: Vec::new(),
        }
    }

    pub fn filter_state(&self) -> FilterState {
        FilterState {
            column_filters: self.column_filters.clone(),
            sorting: self.sorting.clone(),
            column_visibility: self.column_visibility.clone(),
            date_range: self.date_range,
        }
    }

    pub fn is_column_visible(&self, column_id: &ColumnId, default_visible: bool) -> bool {
        self.column_visibility
            .get(column_id)
            .copied()
            .unwrap_or(default_visible)
    }

    pub fn hidden_column_count(&self) -> usize {
        self.column_visibility
            .values()
            .filter(|visible| !**visible)
            .count()
    }

    /// Whether the "Reset" affordance should be offered.
    pub fn is_customized(&self) -> bool {
        self.column_filters.iter().any(|filter| !filter.value.is_empty())
            || !self.sorting.is_empty()
            || self.hidden_column_count() > 0
            || self.date_range.is_active()
    }

    pub fn filter_for(&self, column_id: &ColumnId) -> Option<&FilterValue> {
        self.column_filters
            .iter()
            .find(|filter| &filter.column_id == column_id)
            .map(|filter| &filter.value)
    }

    pub fn is_selected(&self, row_id: &RowId) -> bool {
        self.selected_row_ids.contains(row_id)
    }
}

/// Normalises a selection: first occurrence wins, duplicates are dropped.
pub fn dedup_selection(ids: Vec<RowId>) -> Vec<RowId> {
    let mut seen = std::collections::BTreeSet::new();
    ids.into_iter()
        .filter(|id| seen.insert(id.clone()))
        .collect()
}
